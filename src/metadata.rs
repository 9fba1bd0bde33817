//! Extension metadata records (`extension.json`).
//!
//! Only a fixed set of top-level fields is translatable. Each may be a plain
//! string (the older format) or a mapping from language code to string.

use std::path::Path;

use serde_json::{Map, Value};

use crate::catalog::Catalog;
use crate::error::Error;
use crate::policy::text_to_translate;
use crate::types::{Location, Message};

/// Fields that are always translated, whatever the caller's designations.
pub const TRANSLATABLE_FIELDS: [&str; 2] = ["name", "description"];

/// Language of the source text in a language-mapped field.
const SOURCE_LANGUAGE: &str = "en";

/// Parse an extension metadata record.
///
/// # Errors
///
/// Returns `Error::MalformedInput` if the content is not a JSON object.
pub fn parse(file: &Path, content: &str) -> Result<Map<String, Value>, Error> {
    let malformed = |reason: String| {
        return Error::MalformedInput { file: file.to_path_buf(), reason };
    };
    let value: Value = serde_json::from_str(content).map_err(|e| return malformed(e.to_string()))?;
    let Value::Object(record) = value else {
        return Err(malformed("root must be an object".to_string()));
    };
    return Ok(record);
}

/// The English source text of `field` and the pointer it was read from.
fn source_text<'a>(record: &'a Map<String, Value>, field: &str) -> (Option<&'a str>, String) {
    return match record.get(field) {
        Some(Value::Object(languages)) => (
            languages.get(SOURCE_LANGUAGE).and_then(Value::as_str),
            format!("/{field}/{SOURCE_LANGUAGE}"),
        ),
        value => (value.and_then(Value::as_str), format!("/{field}")),
    };
}

/// Yield the English text of each translatable field.
pub fn extract(record: &Map<String, Value>) -> Vec<Message> {
    return TRANSLATABLE_FIELDS
        .iter()
        .filter_map(|field| {
            let (value, pointer) = source_text(record, field);
            let text = text_to_translate(value, true)?;
            return Some(Message::new(Location::Pointer(pointer), text));
        })
        .collect();
}

/// Build a translated copy of the record.
///
/// Every translated field is stored as `{language: translation}`, which also
/// upgrades older plain-string fields. Fields without English text are left
/// as they were.
pub fn translate(record: &Map<String, Value>, catalog: &dyn Catalog, language: &str) -> Map<String, Value> {
    let mut translated = record.clone();
    for field in TRANSLATABLE_FIELDS {
        let (value, _) = source_text(record, field);
        let Some(text) = text_to_translate(value, true) else {
            continue;
        };
        let mut languages = Map::new();
        languages.insert(language.to_string(), Value::String(catalog.translate(text).to_string()));
        translated.insert(field.to_string(), Value::Object(languages));
    }
    return translated;
}
