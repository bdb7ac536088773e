//! Event normalization: one upstream page in, one canonical event out.

use std::collections::HashSet;

use chrono::{SecondsFormat, Utc};
use serde::Serialize;
use tracing::debug;

use crate::notion::Page;
use crate::properties::{
    any_text, date_end, date_start, first_file_url, multi_select_names, resolve_list,
    resolve_opt, resolve_text, rich_text_text, select_name, title_text, url_value,
    AREA_CANDIDATES, CATEGORY_CANDIDATES, END_DATE_CANDIDATES, IMAGE_CANDIDATES,
    NAME_CANDIDATES, START_DATE_CANDIDATES, URL_CANDIDATES,
};

/// Canonical event record served to the front end.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Event {
    pub id: String,
    pub name: String,
    pub area: String,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub categories: Vec<String>,
    pub image_url: Option<String>,
    pub detail_url: Option<String>,
    pub created_at: String,
}

/// Success payload for the events endpoint.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EventsResponse {
    pub events: Vec<Event>,
    pub total_count: usize,
    pub cached_at: String,
}

impl EventsResponse {
    pub fn new(events: Vec<Event>) -> Self {
        Self {
            total_count: events.len(),
            events,
            cached_at: Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true),
        }
    }
}

fn is_emoji_component(c: char) -> bool {
    matches!(c,
        '\u{200D}'                  // zero width joiner
        | '\u{20E3}'                // combining enclosing keycap
        | '\u{FE00}'..='\u{FE0F}'   // variation selectors
        | '\u{2600}'..='\u{27BF}'   // misc symbols, dingbats
        | '\u{2B00}'..='\u{2BFF}'   // misc symbols and arrows
        | '\u{1F000}'..='\u{1FAFF}' // emoji planes, regional indicators
    )
}

/// Strip a leading run of emoji glyphs (form entries decorate labels with
/// them) and trim surrounding whitespace.
pub fn clean_label(raw: &str) -> String {
    raw.trim_start_matches(is_emoji_component).trim().to_string()
}

fn resolve_area(page: &Page) -> String {
    let area = resolve_text(&page.properties, AREA_CANDIDATES, select_name);
    if !area.is_empty() {
        return clean_label(&area);
    }
    clean_label(&resolve_text(&page.properties, AREA_CANDIDATES, any_text))
}

fn resolve_categories(page: &Page) -> Vec<String> {
    let names = resolve_list(&page.properties, CATEGORY_CANDIDATES, multi_select_names);
    if !names.is_empty() {
        return names.iter().map(|n| clean_label(n)).collect();
    }
    // A single select counts as a one-element category list.
    let single = resolve_text(&page.properties, CATEGORY_CANDIDATES, select_name);
    if single.is_empty() {
        Vec::new()
    } else {
        vec![clean_label(&single)]
    }
}

fn resolve_end_date(page: &Page) -> Option<String> {
    // A dedicated end-date property stores its value as its own start; the
    // end half of a combined start/end property is the fallback.
    resolve_opt(&page.properties, END_DATE_CANDIDATES, date_start)
        .or_else(|| resolve_opt(&page.properties, START_DATE_CANDIDATES, date_end))
}

fn resolve_image_url(page: &Page) -> Option<String> {
    resolve_opt(&page.properties, IMAGE_CANDIDATES, first_file_url)
        .or_else(|| page.cover.as_ref().map(|c| c.url().to_string()))
}

fn resolve_detail_url(page: &Page) -> Option<String> {
    resolve_opt(&page.properties, URL_CANDIDATES, url_value).or_else(|| {
        // A bare URL pasted into a text column is acceptable input.
        let text = resolve_text(&page.properties, URL_CANDIDATES, rich_text_text);
        let text = text.trim();
        if text.is_empty() {
            None
        } else {
            Some(text.to_string())
        }
    })
}

/// Map one raw page onto the canonical event schema. Never fails: fields the
/// page cannot supply come out as their empty values.
pub fn normalize(page: &Page) -> Event {
    Event {
        id: page.id.clone(),
        name: resolve_text(&page.properties, NAME_CANDIDATES, title_text),
        area: resolve_area(page),
        start_date: resolve_opt(&page.properties, START_DATE_CANDIDATES, date_start),
        end_date: resolve_end_date(page),
        categories: resolve_categories(page),
        image_url: resolve_image_url(page),
        detail_url: resolve_detail_url(page),
        created_at: page.created_time.clone(),
    }
}

/// Normalize every page, drop events without a name, and deduplicate by name
/// keeping the first occurrence in fetch order.
pub fn assemble(pages: &[Page]) -> Vec<Event> {
    let mut seen = HashSet::new();
    let mut events = Vec::new();

    for page in pages {
        let event = normalize(page);
        if event.name.is_empty() {
            debug!(page_id = %page.id, "Dropping record with no resolvable name");
            continue;
        }
        if seen.insert(event.name.clone()) {
            events.push(event);
        }
    }

    events
}
