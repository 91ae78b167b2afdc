//! Helpers for the few HTML pages the boards still serve: the hh-family search
//! pages embed their state as JSON and carry the frontend build version inline.

use crate::{ScoutError, ScoutResult};
use log::trace;
use regex::Regex;
use scraper::{Html, Selector};
use serde_json::Value;

/// Element id of the JSON state blob on hh-family pages.
pub const EMBEDDED_STATE_ID: &str = "HH-Lux-InitialState";

const BUILD_VERSION_PATTERN: &str = r#"build:\s*"([^"]*)""#;

/// Parses the text of the element with `id` as JSON.
pub fn extract_json_by_id(html: &str, id: &str) -> ScoutResult<Value> {
    let document = Html::parse_document(html);
    let selector = Selector::parse(&format!("#{}", id))
        .map_err(|e| ScoutError::ExtractionError(format!("invalid selector #{}: {}", id, e)))?;

    let element = document
        .select(&selector)
        .next()
        .ok_or_else(|| ScoutError::ExtractionError(format!("no element with id {}", id)))?;
    let text = element.text().collect::<String>();
    trace!("Embedded JSON #{} is {} bytes", id, text.len());

    serde_json::from_str(text.trim()).map_err(|e| {
        ScoutError::ExtractionError(format!("element #{} does not hold JSON: {}", id, e))
    })
}

/// Frontend build version, if the page announces one.
pub fn extract_build_version(html: &str) -> Option<String> {
    let pattern = Regex::new(BUILD_VERSION_PATTERN).ok()?;
    pattern
        .captures(html)
        .and_then(|captures| captures.get(1))
        .map(|version| version.as_str().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_embedded_state() {
        let html = r#"<html><body>
            <div id="app"></div>
            <script type="application/json" id="HH-Lux-InitialState">
                {"areaTree": [{"id": "113", "text": "Россия"}]}
            </script>
        </body></html>"#;

        let state = extract_json_by_id(html, EMBEDDED_STATE_ID).unwrap();
        assert_eq!(state["areaTree"][0]["text"], "Россия");
    }

    #[test]
    fn test_missing_element() {
        let err = extract_json_by_id("<html><body></body></html>", EMBEDDED_STATE_ID).unwrap_err();
        assert!(matches!(err, ScoutError::ExtractionError(_)));
    }

    #[test]
    fn test_element_without_json() {
        let html = r#"<div id="HH-Lux-InitialState">loading…</div>"#;
        let err = extract_json_by_id(html, EMBEDDED_STATE_ID).unwrap_err();
        assert!(matches!(err, ScoutError::ExtractionError(_)));
    }

    #[test]
    fn test_build_version() {
        let html = r#"<script>window.globalVars = { lang: "RU", build: "25.4.1.2", x: 1 };</script>"#;
        assert_eq!(extract_build_version(html).as_deref(), Some("25.4.1.2"));
        assert_eq!(extract_build_version("<html></html>"), None);
    }
}
