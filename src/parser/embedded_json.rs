//! Pulls the JSON document that a page hands to `JSON.parse("...")` in an
//! inline script.
//!
//! Only that exact layout is understood. When the marker line is missing or
//! its argument cannot be decoded this fails instead of guessing.

use crate::common::error::{Result, TrackerError};
use once_cell::sync::Lazy;
use regex::Regex;
use scraper::{Html, Selector};
use serde_json::Value;
use tracing::debug;

const MARKER: &str = "JSON.parse(";

/// Matches the double-quoted string literal passed to `JSON.parse`
static JSON_PARSE_LITERAL: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"JSON\.parse\(\s*("(?:[^"\\]|\\.)*")\s*\)"#).expect("literal regex compiles")
});

/// Locates the first inline-script line calling `JSON.parse` and returns the
/// decoded document it parses.
pub fn extract_json_parse_payload(html: &str) -> Result<Value> {
    let line = find_marker_line(html)?.ok_or(TrackerError::EmbeddedJsonMissing)?;
    debug!("Found {} line of {} bytes", MARKER, line.len());

    let literal = JSON_PARSE_LITERAL
        .captures(&line)
        .and_then(|c| c.get(1))
        .ok_or_else(|| {
            TrackerError::EmbeddedJsonMalformed("JSON.parse argument is not a string literal".into())
        })?;

    let unescaped = unescape_literal(literal.as_str())?;
    serde_json::from_str(&unescaped).map_err(|e| {
        TrackerError::EmbeddedJsonMalformed(format!("embedded document is not valid JSON: {}", e))
    })
}

fn find_marker_line(html: &str) -> Result<Option<String>> {
    let document = Html::parse_document(html);
    let selector = Selector::parse("script")
        .map_err(|e| TrackerError::Config(format!("invalid script selector: {:?}", e)))?;

    for script in document.select(&selector) {
        if script.value().attr("src").is_some() {
            continue;
        }
        let body = script.text().collect::<String>();
        if let Some(line) = body.lines().find(|l| l.contains(MARKER)) {
            return Ok(Some(line.to_string()));
        }
    }
    Ok(None)
}

/// JSON string syntax covers the escapes the page uses (`\"`, `\\`, `\/`, `\uXXXX`).
fn unescape_literal(literal: &str) -> Result<String> {
    serde_json::from_str::<String>(literal)
        .map_err(|e| TrackerError::EmbeddedJsonMalformed(format!("cannot unescape literal: {}", e)))
}
