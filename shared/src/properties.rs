//! Property accessors and candidate-name resolution.
//!
//! The source databases are populated through a form tool that renders its
//! column names differently per locale, so the same semantic field shows up
//! under several literal property names (Japanese, English, alternate
//! Japanese). Every accessor is total: a missing property, a kind mismatch,
//! or an unsupported kind yields the kind's natural empty value, never an
//! error.

use std::collections::HashMap;

use crate::notion::{Property, PropertyValue, RichTextFragment};

/// Candidate property names for the event name, in resolution order.
pub const NAME_CANDIDATES: &[&str] = &["名前", "Name", "タイトル", "イベント名"];
/// Candidate property names for the area.
pub const AREA_CANDIDATES: &[&str] = &["エリア", "Area", "地域"];
/// Candidate property names for categories.
pub const CATEGORY_CANDIDATES: &[&str] = &["カテゴリ", "カテゴリー", "Category", "ジャンル"];
/// Candidate property names for the start date. The first entry doubles as
/// the upstream sort property.
pub const START_DATE_CANDIDATES: &[&str] = &["開催日", "日付", "Date", "開始日"];
/// Candidate property names holding a dedicated end date. A combined
/// start/end property from the start candidates also feeds the end.
pub const END_DATE_CANDIDATES: &[&str] = &["終了日", "End Date"];
/// Candidate property names for the event image.
pub const IMAGE_CANDIDATES: &[&str] = &["画像", "イメージ", "Image", "写真", "フライヤー"];
/// Candidate property names for the detail link.
pub const URL_CANDIDATES: &[&str] = &["URL", "リンク", "詳細URL", "Link"];

fn join_fragments(fragments: &[RichTextFragment]) -> String {
    fragments
        .iter()
        .map(|f| f.plain_text.as_str())
        .collect::<String>()
}

fn value(prop: Option<&Property>) -> Option<&PropertyValue> {
    match prop {
        Some(Property::Value(value)) => Some(value),
        _ => None,
    }
}

/// Concatenated plain text of a title property.
pub fn title_text(prop: Option<&Property>) -> String {
    match value(prop) {
        Some(PropertyValue::Title { title }) => join_fragments(title),
        _ => String::new(),
    }
}

/// Concatenated plain text of a rich-text property.
pub fn rich_text_text(prop: Option<&Property>) -> String {
    match value(prop) {
        Some(PropertyValue::RichText { rich_text }) => join_fragments(rich_text),
        _ => String::new(),
    }
}

/// The selected option's name of a select property.
pub fn select_name(prop: Option<&Property>) -> String {
    match value(prop) {
        Some(PropertyValue::Select { select: Some(option) }) => option.name.clone(),
        _ => String::new(),
    }
}

/// All option names of a multi-select property.
pub fn multi_select_names(prop: Option<&Property>) -> Vec<String> {
    match value(prop) {
        Some(PropertyValue::MultiSelect { multi_select }) => {
            multi_select.iter().map(|o| o.name.clone()).collect()
        }
        _ => Vec::new(),
    }
}

/// Start of a date property.
pub fn date_start(prop: Option<&Property>) -> Option<String> {
    match value(prop) {
        Some(PropertyValue::Date { date: Some(range) }) => range.start.clone(),
        _ => None,
    }
}

/// End of a date property.
pub fn date_end(prop: Option<&Property>) -> Option<String> {
    match value(prop) {
        Some(PropertyValue::Date { date: Some(range) }) => range.end.clone(),
        _ => None,
    }
}

/// Value of a url property.
pub fn url_value(prop: Option<&Property>) -> Option<String> {
    match value(prop) {
        Some(PropertyValue::Url { url: Some(url) }) if !url.is_empty() => Some(url.clone()),
        _ => None,
    }
}

/// URL of the first entry of a files property.
pub fn first_file_url(prop: Option<&Property>) -> Option<String> {
    match value(prop) {
        Some(PropertyValue::Files { files }) => files.first().map(|f| f.url().to_string()),
        _ => None,
    }
}

/// Value of a number property.
pub fn number_value(prop: Option<&Property>) -> Option<f64> {
    match value(prop) {
        Some(PropertyValue::Number { number }) => *number,
        _ => None,
    }
}

/// Text of whatever textual kind the property actually is: title, rich text,
/// or a single select's name.
pub fn any_text(prop: Option<&Property>) -> String {
    match value(prop) {
        Some(PropertyValue::Title { title }) => join_fragments(title),
        Some(PropertyValue::RichText { rich_text }) => join_fragments(rich_text),
        Some(PropertyValue::Select { select: Some(option) }) => option.name.clone(),
        _ => String::new(),
    }
}

/// Look up a property by name, tolerating incidental whitespace in the
/// stored key (exact match first, trimmed-key equality as a fallback).
pub fn lookup<'a>(
    properties: &'a HashMap<String, Property>,
    name: &str,
) -> Option<&'a Property> {
    properties.get(name).or_else(|| {
        properties
            .iter()
            .find_map(|(key, value)| (key.trim() == name).then_some(value))
    })
}

/// Resolve a text field: the first candidate whose accessor result is
/// non-empty, NOT the first candidate that merely exists.
pub fn resolve_text(
    properties: &HashMap<String, Property>,
    candidates: &[&str],
    accessor: fn(Option<&Property>) -> String,
) -> String {
    for name in candidates {
        let text = accessor(lookup(properties, name));
        if !text.is_empty() {
            return text;
        }
    }
    String::new()
}

/// Resolve an optional field: the first candidate yielding `Some`.
pub fn resolve_opt(
    properties: &HashMap<String, Property>,
    candidates: &[&str],
    accessor: fn(Option<&Property>) -> Option<String>,
) -> Option<String> {
    candidates
        .iter()
        .find_map(|name| accessor(lookup(properties, name)))
}

/// Resolve a list field: the first candidate yielding a non-empty list.
pub fn resolve_list(
    properties: &HashMap<String, Property>,
    candidates: &[&str],
    accessor: fn(Option<&Property>) -> Vec<String>,
) -> Vec<String> {
    for name in candidates {
        let items = accessor(lookup(properties, name));
        if !items.is_empty() {
            return items;
        }
    }
    Vec::new()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn props(raw: serde_json::Value) -> HashMap<String, Property> {
        serde_json::from_value(raw).unwrap()
    }

    #[test]
    fn title_text_joins_fragments_in_order() {
        let properties = props(serde_json::json!({
            "名前": { "type": "title", "title": [
                { "plain_text": "隅田川" }, { "plain_text": "花火大会" }
            ]}
        }));
        assert_eq!(title_text(lookup(&properties, "名前")), "隅田川花火大会");
    }

    #[test]
    fn kind_mismatch_yields_empty_value() {
        let properties = props(serde_json::json!({
            "名前": { "type": "title", "title": [{ "plain_text": "marche" }] }
        }));
        let prop = lookup(&properties, "名前");
        assert_eq!(select_name(prop), "");
        assert_eq!(date_start(prop), None);
        assert_eq!(first_file_url(prop), None);
        assert!(multi_select_names(prop).is_empty());
    }

    #[test]
    fn unsupported_kind_yields_empty_value() {
        let properties = props(serde_json::json!({
            "済": { "type": "checkbox", "checkbox": true }
        }));
        assert_eq!(title_text(lookup(&properties, "済")), "");
        assert_eq!(any_text(lookup(&properties, "済")), "");
    }

    #[test]
    fn lookup_tolerates_whitespace_in_stored_key() {
        let properties = props(serde_json::json!({
            " エリア ": { "type": "select", "select": { "name": "浅草" } }
        }));
        assert_eq!(select_name(lookup(&properties, "エリア")), "浅草");
    }

    #[test]
    fn resolution_skips_existing_but_empty_candidate() {
        // "名前" exists with an empty title list; "Name" holds the content.
        let properties = props(serde_json::json!({
            "名前": { "type": "title", "title": [] },
            "Name": { "type": "title", "title": [{ "plain_text": "Craft Fair" }] }
        }));
        assert_eq!(resolve_text(&properties, NAME_CANDIDATES, title_text), "Craft Fair");
    }

    #[test]
    fn resolution_returns_empty_when_all_candidates_fail() {
        let properties = props(serde_json::json!({
            "メモ": { "type": "rich_text", "rich_text": [{ "plain_text": "memo" }] }
        }));
        assert_eq!(resolve_text(&properties, NAME_CANDIDATES, title_text), "");
    }

    #[test]
    fn url_value_ignores_empty_string() {
        let properties = props(serde_json::json!({
            "URL": { "type": "url", "url": "" },
            "リンク": { "type": "url", "url": "https://example.com/e/1" }
        }));
        assert_eq!(
            resolve_opt(&properties, URL_CANDIDATES, url_value).as_deref(),
            Some("https://example.com/e/1")
        );
    }

    #[test]
    fn first_file_url_handles_hosted_and_external() {
        let properties = props(serde_json::json!({
            "画像": { "type": "files", "files": [
                { "type": "external", "external": { "url": "https://img.example/a.jpg" } },
                { "type": "file", "file": { "url": "https://files.example/b.jpg" } }
            ]}
        }));
        assert_eq!(
            first_file_url(lookup(&properties, "画像")).as_deref(),
            Some("https://img.example/a.jpg")
        );
    }
}
