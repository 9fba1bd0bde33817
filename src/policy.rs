//! Translatability policy and placeholder expansion shared by every walker.

use std::sync::LazyLock;

use regex::{Captures, Regex};
use serde_json::Value;

use crate::error::Error;

/// Matches a `{{name}}` placeholder marker.
#[allow(clippy::expect_used, reason = "hardcoded pattern, compile-time invariant")]
static MARKER: LazyLock<Regex> = LazyLock::new(|| {
    return Regex::new(r"\{\{([^{}]+)\}\}").expect("valid regex");
});

/// Decide what text, if any, should be looked up in the catalog.
///
/// The order is fixed: only strings are eligible, surrounding whitespace is
/// trimmed, empty results are rejected, and only then is the designation
/// checked. Extraction and substitution both go through here, so the text an
/// extractor yields is exactly the key the substituter looks up.
pub fn text_to_translate(value: Option<&str>, designated: bool) -> Option<&str> {
    let text = value?.trim();
    if text.is_empty() || !designated {
        return None;
    }
    return Some(text);
}

/// [`text_to_translate`] for tree values: anything but a string is ineligible.
pub fn value_to_translate(value: &Value, designated: bool) -> Option<&str> {
    return text_to_translate(value.as_str(), designated);
}

/// Literal values for `{{name}}` markers, applied after catalog lookup.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Replacements {
    /// Marker name and replacement, in insertion order.
    pairs: Vec<(String, String)>,
}

impl Replacements {
    /// Replace every `{{name}}` marker that has a value. Markers without a
    /// value are left as they are.
    pub fn expand(&self, text: &str) -> String {
        if self.pairs.is_empty() || !text.contains("{{") {
            return text.to_string();
        }
        return MARKER
            .replace_all(text, |caps: &Captures<'_>| {
                let marker = caps.get(0).map_or("", |m| return m.as_str());
                let name = caps.get(1).map_or("", |m| return m.as_str());
                return self.get(name).unwrap_or(marker).to_string();
            })
            .into_owned();
    }

    /// The replacement for `name`, if set.
    pub fn get(&self, name: &str) -> Option<&str> {
        return self
            .pairs
            .iter()
            .find(|(n, _)| return n == name)
            .map(|(_, v)| return v.as_str());
    }

    /// Every `(name, value)` pair, in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        return self.pairs.iter().map(|(n, v)| return (n.as_str(), v.as_str()));
    }

    /// Parse a `name=value` command-line argument and set it.
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidReplacement` if there is no `=` or the name is empty.
    pub fn parse_assignment(&mut self, raw: &str) -> Result<(), Error> {
        let Some((name, value)) = raw.split_once('=') else {
            return Err(Error::InvalidReplacement { raw: raw.to_string() });
        };
        let name = name.trim();
        if name.is_empty() {
            return Err(Error::InvalidReplacement { raw: raw.to_string() });
        }
        self.set(name, value);
        return Ok(());
    }

    /// Set a replacement, overriding an earlier value for the same name.
    pub fn set(&mut self, name: &str, value: &str) {
        if let Some(pair) = self.pairs.iter_mut().find(|(n, _)| return n == name) {
            pair.1 = value.to_string();
            return;
        }
        self.pairs.push((name.to_string(), value.to_string()));
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Replacements {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut replacements = Self::default();
        for (name, value) in iter {
            replacements.set(&name.into(), &value.into());
        }
        return replacements;
    }
}
