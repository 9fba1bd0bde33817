//! Message catalogs: the lookup capability and its loaders.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use crate::error::Error;

/// Maps a normalized source string to its translation.
///
/// A catalog never fails a lookup: when it has no entry for `source` it
/// returns `source` unchanged.
pub trait Catalog {
    /// Translate `source`, or return it as-is when untranslated.
    fn translate<'a>(&'a self, source: &'a str) -> &'a str;
}

/// The catalog for the source language: every string translates to itself.
#[derive(Debug, Clone, Copy, Default)]
pub struct Identity;

impl Catalog for Identity {
    fn translate<'a>(&'a self, source: &'a str) -> &'a str {
        return source;
    }
}

/// A compiled gettext `.mo` catalog.
pub struct GettextCatalog(
    /// The parsed catalog.
    gettext::Catalog,
);

impl Catalog for GettextCatalog {
    fn translate<'a>(&'a self, source: &'a str) -> &'a str {
        return self.0.gettext(source);
    }
}

/// A flat JSON object of `source: translation` pairs.
#[derive(Debug, Clone, Default)]
pub struct JsonCatalog {
    /// Translations keyed by source text. Empty translations are never stored.
    messages: HashMap<String, String>,
}

impl JsonCatalog {
    /// Parse a JSON catalog. Non-string and empty translations are skipped,
    /// which leaves those strings untranslated.
    ///
    /// # Errors
    ///
    /// Returns `Error::CatalogCorrupt` if the content is not a JSON object.
    pub fn parse(path: &Path, content: &str) -> Result<Self, Error> {
        let value: serde_json::Value =
            serde_json::from_str(content).map_err(|e| return Error::CatalogCorrupt {
                path: path.to_path_buf(),
                reason: e.to_string(),
            })?;
        let Some(object) = value.as_object() else {
            return Err(Error::CatalogCorrupt {
                path: path.to_path_buf(),
                reason: "root must be an object".to_string(),
            });
        };

        let messages = object
            .iter()
            .filter_map(|(source, translation)| {
                let translation = translation.as_str().filter(|t| return !t.is_empty())?;
                return Some((source.clone(), translation.to_string()));
            })
            .collect();
        return Ok(Self { messages });
    }
}

impl Catalog for JsonCatalog {
    fn translate<'a>(&'a self, source: &'a str) -> &'a str {
        return self.messages.get(source).map_or(source, String::as_str);
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for JsonCatalog {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let messages = iter.into_iter().map(|(k, v)| return (k.into(), v.into())).collect();
        return Self { messages };
    }
}

/// Path of a catalog file for `domain` in `language`, with the given extension.
fn catalog_path(locale_dir: &Path, language: &str, domain: &str, ext: &str) -> PathBuf {
    return locale_dir
        .join(language)
        .join("LC_MESSAGES")
        .join(format!("{domain}.{ext}"));
}

/// Load the catalog for `domain` in `language` from `locale_dir`.
///
/// Translating into the source language needs no catalog. Otherwise a
/// compiled `.mo` file is preferred over a `.json` one. When neither exists
/// the identity catalog is used and a warning is logged.
///
/// # Errors
///
/// Returns `Error::Io` if a catalog file exists but cannot be read,
/// or `Error::CatalogCorrupt` if it cannot be parsed.
pub fn load(
    locale_dir: &Path,
    domain: &str,
    language: &str,
    source_language: &str,
) -> Result<Box<dyn Catalog>, Error> {
    if language == source_language {
        tracing::debug!(language, domain, "source language, no catalog needed");
        return Ok(Box::new(Identity));
    }

    let mo_path = catalog_path(locale_dir, language, domain, "mo");
    if mo_path.is_file() {
        let file = std::fs::File::open(&mo_path)?;
        let catalog = gettext::Catalog::parse(file).map_err(|e| return Error::CatalogCorrupt {
            path: mo_path.clone(),
            reason: e.to_string(),
        })?;
        tracing::debug!(path = %mo_path.display(), "loaded gettext catalog");
        return Ok(Box::new(GettextCatalog(catalog)));
    }

    let json_path = catalog_path(locale_dir, language, domain, "json");
    if json_path.is_file() {
        let content = std::fs::read_to_string(&json_path)?;
        let catalog = JsonCatalog::parse(&json_path, &content)?;
        tracing::debug!(path = %json_path.display(), "loaded json catalog");
        return Ok(Box::new(catalog));
    }

    tracing::warn!(
        language,
        domain,
        locale_dir = %locale_dir.display(),
        "no catalog found, strings are left untranslated"
    );
    return Ok(Box::new(Identity));
}
