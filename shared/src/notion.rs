//! Client and wire types for the upstream "pages with typed properties" API.
//!
//! The relay only ever issues one kind of call: a paginated query against a
//! single database, authenticated with a static bearer token. Properties the
//! relay does not model deserialize permissively into
//! [`Property::Unsupported`] so one odd column never fails a request.

use std::collections::HashMap;
use std::future::Future;

use serde::Deserialize;
use serde_json::json;
use tracing::{info, warn};

use crate::config::Config;
use crate::error::{Error, Result};

const NOTION_API_VERSION: &str = "2022-06-28";
const PAGE_SIZE: u32 = 100;

/// Primary start-date candidate; used for the best-effort upstream sort.
pub const SORT_PROPERTY: &str = "開催日";

/// One fragment of a title or rich-text property.
#[derive(Debug, Clone, Deserialize)]
pub struct RichTextFragment {
    #[serde(default)]
    pub plain_text: String,
}

/// A select / multi-select option.
#[derive(Debug, Clone, Deserialize)]
pub struct SelectOption {
    pub name: String,
}

/// A date property's value: a start with an optional end.
#[derive(Debug, Clone, Deserialize)]
pub struct DateRange {
    #[serde(default)]
    pub start: Option<String>,
    #[serde(default)]
    pub end: Option<String>,
}

/// A URL wrapper shared by hosted files, external files, and covers.
#[derive(Debug, Clone, Deserialize)]
pub struct FileUrl {
    pub url: String,
}

/// One entry of a files property, hosted upstream or externally linked.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum FileRef {
    File { file: FileUrl },
    External { external: FileUrl },
}

impl FileRef {
    pub fn url(&self) -> &str {
        match self {
            FileRef::File { file } => &file.url,
            FileRef::External { external } => &external.url,
        }
    }
}

/// Page-level cover image, distinct from any image-typed property.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Cover {
    File { file: FileUrl },
    External { external: FileUrl },
}

impl Cover {
    /// Hosted-file URL first, external URL otherwise.
    pub fn url(&self) -> &str {
        match self {
            Cover::File { file } => &file.url,
            Cover::External { external } => &external.url,
        }
    }
}

/// The property kinds the relay extracts from, tagged by the wire `type`.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum PropertyValue {
    Title { title: Vec<RichTextFragment> },
    RichText { rich_text: Vec<RichTextFragment> },
    Select { select: Option<SelectOption> },
    MultiSelect { multi_select: Vec<SelectOption> },
    Date { date: Option<DateRange> },
    Url { url: Option<String> },
    Files { files: Vec<FileRef> },
    Number { number: Option<f64> },
}

impl PropertyValue {
    pub fn type_name(&self) -> &'static str {
        match self {
            PropertyValue::Title { .. } => "title",
            PropertyValue::RichText { .. } => "rich_text",
            PropertyValue::Select { .. } => "select",
            PropertyValue::MultiSelect { .. } => "multi_select",
            PropertyValue::Date { .. } => "date",
            PropertyValue::Url { .. } => "url",
            PropertyValue::Files { .. } => "files",
            PropertyValue::Number { .. } => "number",
        }
    }
}

/// A property as stored: a kind we understand, or anything else kept as raw
/// JSON. Accessors treat `Unsupported` the same as an absent property.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum Property {
    Value(PropertyValue),
    Unsupported(serde_json::Value),
}

impl Property {
    /// Wire type tag, best effort for unsupported kinds.
    pub fn type_name(&self) -> &str {
        match self {
            Property::Value(value) => value.type_name(),
            Property::Unsupported(raw) => {
                raw.get("type").and_then(|t| t.as_str()).unwrap_or("unknown")
            }
        }
    }
}

/// One record of the upstream database.
#[derive(Debug, Clone, Deserialize)]
pub struct Page {
    pub id: String,
    #[serde(default)]
    pub created_time: String,
    #[serde(default)]
    pub cover: Option<Cover>,
    #[serde(default)]
    pub properties: HashMap<String, Property>,
}

/// One page of query results.
#[derive(Debug, Clone, Deserialize)]
pub struct QueryPage {
    #[serde(default)]
    pub results: Vec<Page>,
    #[serde(default)]
    pub has_more: bool,
    #[serde(default)]
    pub next_cursor: Option<String>,
}

/// Anything that can serve one page of query results for a cursor.
///
/// The production implementation is [`NotionClient`]; tests drive the
/// pagination loop with hand-written mocks.
pub trait PageSource {
    fn query_page(
        &self,
        cursor: Option<&str>,
    ) -> impl Future<Output = Result<QueryPage>> + Send;
}

/// Fetch every record via the sequential cursor loop.
pub async fn fetch_all_pages<S: PageSource>(source: &S) -> Result<Vec<Page>> {
    let mut pages = Vec::new();
    let mut cursor: Option<String> = None;

    loop {
        let batch = source.query_page(cursor.as_deref()).await?;
        pages.extend(batch.results);

        if !batch.has_more {
            break;
        }
        match batch.next_cursor {
            Some(next) => cursor = Some(next),
            None => break,
        }
    }

    info!("Fetched {} records from upstream", pages.len());
    Ok(pages)
}

/// Thin client over the upstream database query endpoint.
pub struct NotionClient {
    http: reqwest::Client,
    api_token: String,
    database_id: String,
}

impl NotionClient {
    pub fn new(config: &Config) -> Self {
        Self {
            http: reqwest::Client::new(),
            api_token: config.api_token.clone(),
            database_id: config.database_id.clone(),
        }
    }

    /// Fetch all records of the configured database.
    pub async fn query_all(&self) -> Result<Vec<Page>> {
        fetch_all_pages(self).await
    }

    async fn query_page_inner(&self, cursor: Option<&str>, sorted: bool) -> Result<QueryPage> {
        let url = format!(
            "https://api.notion.com/v1/databases/{}/query",
            self.database_id
        );

        let mut body = json!({ "page_size": PAGE_SIZE });
        if let Some(cursor) = cursor {
            body["start_cursor"] = json!(cursor);
        }
        if sorted {
            body["sorts"] = json!([{
                "property": SORT_PROPERTY,
                "direction": "ascending",
            }]);
        }

        let response = self
            .http
            .post(&url)
            .bearer_auth(&self.api_token)
            .header("Notion-Version", NOTION_API_VERSION)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(match status.as_u16() {
                401 => Error::Unauthorized(text),
                404 => Error::NotFound(text),
                _ => Error::Upstream(text),
            });
        }

        Ok(response.json().await?)
    }
}

impl PageSource for NotionClient {
    /// One query call. The sort is best effort: databases configured without
    /// the sort property reject it with a validation error, in which case the
    /// same query is reissued unsorted.
    async fn query_page(&self, cursor: Option<&str>) -> Result<QueryPage> {
        match self.query_page_inner(cursor, true).await {
            Err(Error::Upstream(message)) if message.contains("validation_error") => {
                warn!("Upstream rejected sort by {:?}, retrying unsorted", SORT_PROPERTY);
                self.query_page_inner(cursor, false).await
            }
            other => other,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn page(id: &str) -> Page {
        Page {
            id: id.to_string(),
            created_time: "2024-04-01T00:00:00.000Z".to_string(),
            cover: None,
            properties: HashMap::new(),
        }
    }

    struct MockSource {
        batches: Vec<QueryPage>,
    }

    impl PageSource for MockSource {
        async fn query_page(&self, cursor: Option<&str>) -> Result<QueryPage> {
            let index = match cursor {
                None => 0,
                Some(c) => c.parse::<usize>().unwrap(),
            };
            Ok(self.batches[index].clone())
        }
    }

    #[tokio::test]
    async fn pagination_concatenates_all_batches() {
        let source = MockSource {
            batches: vec![
                QueryPage {
                    results: vec![page("a"), page("b")],
                    has_more: true,
                    next_cursor: Some("1".to_string()),
                },
                QueryPage {
                    results: vec![page("c")],
                    has_more: false,
                    next_cursor: None,
                },
            ],
        };

        let pages = fetch_all_pages(&source).await.unwrap();
        let ids: Vec<&str> = pages.iter().map(|p| p.id.as_str()).collect();
        assert_eq!(ids, vec!["a", "b", "c"]);
    }

    #[tokio::test]
    async fn pagination_stops_on_missing_cursor() {
        // has_more set but no cursor to follow; the loop must not spin.
        let source = MockSource {
            batches: vec![QueryPage {
                results: vec![page("a")],
                has_more: true,
                next_cursor: None,
            }],
        };

        let pages = fetch_all_pages(&source).await.unwrap();
        assert_eq!(pages.len(), 1);
    }

    #[test]
    fn deserializes_query_page() {
        let raw = serde_json::json!({
            "results": [{
                "id": "page-1",
                "created_time": "2024-04-01T09:00:00.000Z",
                "cover": { "type": "external", "external": { "url": "https://img.example/c.png" } },
                "properties": {
                    "名前": { "type": "title", "title": [
                        { "plain_text": "夏" }, { "plain_text": "祭り" }
                    ]},
                    "開催日": { "type": "date", "date": { "start": "2024-07-20", "end": null } },
                    "人数": { "type": "checkbox", "checkbox": true }
                }
            }],
            "has_more": false,
            "next_cursor": null
        });

        let parsed: QueryPage = serde_json::from_value(raw).unwrap();
        assert_eq!(parsed.results.len(), 1);
        assert!(!parsed.has_more);

        let page = &parsed.results[0];
        assert_eq!(page.cover.as_ref().unwrap().url(), "https://img.example/c.png");
        assert_eq!(page.properties["名前"].type_name(), "title");

        // Unknown property kinds land in Unsupported instead of failing.
        assert!(matches!(page.properties["人数"], Property::Unsupported(_)));
        assert_eq!(page.properties["人数"].type_name(), "checkbox");
    }
}
