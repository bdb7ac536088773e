//! Events Lambda - Handles the /events endpoint.
//!
//! Endpoints:
//! - GET /events - Normalized event list for the calendar UI
//! - GET /events?debug=1 - Raw property names/types of one sample record
//! - OPTIONS /events - CORS preflight

use lambda_http::{run, service_fn, Body, Error, Request, RequestExt, Response};
use serde::Serialize;
use shared::http::{cached_json_response, error_response, error_response_for, preflight_response};
use shared::{assemble, Config, EventsResponse, NotionClient, PageSource};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

/// One property of the sampled record, as stored upstream.
#[derive(Debug, Serialize)]
struct DebugProperty {
    name: String,
    #[serde(rename = "type")]
    kind: String,
}

/// Debug payload for diagnosing candidate-name drift in the source database.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct DebugResponse {
    page_id: String,
    created_time: String,
    has_cover: bool,
    properties: Vec<DebugProperty>,
}

fn debug_requested(event: &Request) -> bool {
    event
        .query_string_parameters()
        .first("debug")
        .map(|v| v == "1" || v == "true")
        .unwrap_or(false)
}

/// Fetch one query page and report the sample record's raw property layout.
async fn debug_sample(client: &NotionClient) -> Result<Response<Body>, Error> {
    let batch = match client.query_page(None).await {
        Ok(batch) => batch,
        Err(e) => {
            error!("Debug sample fetch failed: {}", e);
            return error_response_for(&e);
        }
    };

    let Some(page) = batch.results.first() else {
        return error_response(404, "not_found", "Database contains no records");
    };

    let mut properties: Vec<DebugProperty> = page
        .properties
        .iter()
        .map(|(name, property)| DebugProperty {
            name: name.clone(),
            kind: property.type_name().to_string(),
        })
        .collect();
    properties.sort_by(|a, b| a.name.cmp(&b.name));

    cached_json_response(&DebugResponse {
        page_id: page.id.clone(),
        created_time: page.created_time.clone(),
        has_cover: page.cover.is_some(),
        properties,
    })
}

async fn get_events(event: &Request) -> Result<Response<Body>, Error> {
    // Config is read per invocation so a missing variable surfaces as a
    // configuration error response instead of an init crash. No upstream
    // call happens before this check passes.
    let config = match Config::from_env() {
        Ok(config) => config,
        Err(e) => {
            error!("Configuration error: {}", e);
            return error_response_for(&e);
        }
    };
    let client = NotionClient::new(&config);

    if debug_requested(event) {
        return debug_sample(&client).await;
    }

    let pages = match client.query_all().await {
        Ok(pages) => pages,
        Err(e) => {
            error!("Upstream query failed: {}", e);
            return error_response_for(&e);
        }
    };

    let events = assemble(&pages);
    info!("Serving {} events from {} records", events.len(), pages.len());

    cached_json_response(&EventsResponse::new(events))
}

async fn handler(event: Request) -> Result<Response<Body>, Error> {
    let method = event.method().as_str().to_string();
    info!("Received request: method={}", method);

    match method.as_str() {
        "OPTIONS" => preflight_response(),
        "GET" => get_events(&event).await,
        _ => error_response(
            405,
            "method_not_allowed",
            format!("{} is not supported, use GET", method),
        ),
    }
}

#[tokio::main]
async fn main() -> Result<(), Error> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .json()
        .init();

    run(service_fn(handler)).await
}
