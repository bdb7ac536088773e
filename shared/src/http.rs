//! HTTP helpers for Lambda functions.

use lambda_http::http::response::Builder;
use lambda_http::{Body, Response};
use serde::Serialize;

use crate::error::Error;

/// Shared-cache directive for successful responses: 60s fresh, 300s
/// stale-while-revalidate.
pub const CACHE_CONTROL: &str = "public, s-maxage=60, stale-while-revalidate=300";

/// Error response body: a machine-readable code, an optional remediation
/// hint, and the underlying message.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hint: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

fn with_cors(builder: Builder) -> Builder {
    builder
        .header("Access-Control-Allow-Origin", "*")
        .header("Access-Control-Allow-Methods", "GET, OPTIONS")
        .header("Access-Control-Allow-Headers", "Content-Type")
}

/// Create a JSON response with CORS headers.
pub fn json_response<T: Serialize>(
    status: u16,
    data: &T,
) -> Result<Response<Body>, lambda_http::Error> {
    Ok(with_cors(Response::builder())
        .status(status)
        .header("content-type", "application/json")
        .body(Body::from(serde_json::to_string(data)?))
        .map_err(Box::new)?)
}

/// Create a cacheable 200 JSON response with CORS headers.
pub fn cached_json_response<T: Serialize>(
    data: &T,
) -> Result<Response<Body>, lambda_http::Error> {
    Ok(with_cors(Response::builder())
        .status(200)
        .header("content-type", "application/json")
        .header("Cache-Control", CACHE_CONTROL)
        .body(Body::from(serde_json::to_string(data)?))
        .map_err(Box::new)?)
}

/// Create an error response with the given status code and message.
pub fn error_response(
    status: u16,
    code: impl Into<String>,
    message: impl Into<String>,
) -> Result<Response<Body>, lambda_http::Error> {
    json_response(
        status,
        &ErrorBody {
            error: code.into(),
            hint: None,
            message: Some(message.into()),
        },
    )
}

/// Map a domain error onto its response: status code, error code, hint, and
/// the underlying message.
pub fn error_response_for(error: &Error) -> Result<Response<Body>, lambda_http::Error> {
    json_response(
        error.status_code(),
        &ErrorBody {
            error: error.code().to_string(),
            hint: error.hint().map(str::to_string),
            message: Some(error.to_string()),
        },
    )
}

/// Empty CORS preflight response.
pub fn preflight_response() -> Result<Response<Body>, lambda_http::Error> {
    Ok(with_cors(Response::builder())
        .status(204)
        .body(Body::Empty)
        .map_err(Box::new)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn responses_carry_cors_headers() {
        let response = json_response(200, &serde_json::json!({"ok": true})).unwrap();
        assert_eq!(
            response.headers()["Access-Control-Allow-Origin"],
            "*"
        );
    }

    #[test]
    fn cached_response_sets_cache_control() {
        let response = cached_json_response(&serde_json::json!({"ok": true})).unwrap();
        assert_eq!(response.headers()["Cache-Control"], CACHE_CONTROL);
    }

    #[test]
    fn error_response_maps_status_and_hint() {
        let response = error_response_for(&Error::NotFound("gone".to_string())).unwrap();
        assert_eq!(response.status(), 404);

        let body: serde_json::Value = match response.body() {
            Body::Text(text) => serde_json::from_str(text).unwrap(),
            _ => panic!("expected text body"),
        };
        assert_eq!(body["error"], "not_found");
        assert!(body["hint"].as_str().unwrap().contains("NOTION_DATABASE_ID"));
    }

    #[test]
    fn config_error_is_a_500() {
        let response = error_response_for(&Error::Config("NOTION_API_TOKEN not set".to_string()))
            .unwrap();
        assert_eq!(response.status(), 500);
    }
}
