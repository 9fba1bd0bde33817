//! Closed dispatch over the supported document shapes.

use std::path::Path;

use serde_json::{Map, Value};

use crate::catalog::Catalog;
use crate::codelist::{self, Codelist};
use crate::config::Config;
use crate::error::Error;
use crate::markdown::{self, MarkupDocument};
use crate::metadata;
use crate::policy::Replacements;
use crate::tree::{self, Syntax};
use crate::types::Message;

/// File name that marks an extension metadata record.
const METADATA_FILE_NAME: &str = "extension.json";

/// How a file is read, walked and written back.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Format {
    /// CSV codelist with a header row.
    Codelist,
    /// JSON tree, such as a JSON Schema.
    Json,
    /// Markdown prose.
    Markdown,
    /// Extension metadata record.
    Metadata,
    /// YAML tree.
    Yaml,
}

impl Format {
    /// Pick a format from a file's name.
    ///
    /// # Errors
    ///
    /// Returns `Error::UnsupportedFormat` if no format matches.
    pub fn detect(path: &Path) -> Result<Self, Error> {
        let name = path.file_name().and_then(|n| return n.to_str()).unwrap_or("");
        if name == METADATA_FILE_NAME {
            return Ok(Self::Metadata);
        }

        let ext = path.extension().and_then(|e| return e.to_str()).unwrap_or("");
        return match ext {
            "csv" => Ok(Self::Codelist),
            "json" => Ok(Self::Json),
            "md" | "markdown" => Ok(Self::Markdown),
            "yaml" | "yml" => Ok(Self::Yaml),
            _ => Err(Error::UnsupportedFormat { file: path.to_path_buf() }),
        };
    }
}

/// What a substitution needs beyond the document itself.
pub struct Translation<'a> {
    /// Catalog for the target language.
    pub catalog: &'a dyn Catalog,
    /// Target language code.
    pub language: &'a str,
    /// Values for `{{marker}}`s in translated tree strings.
    pub replacements: &'a Replacements,
}

/// A parsed input file of one of the supported shapes.
pub enum Document {
    /// Markdown prose.
    Markup(MarkupDocument),
    /// Extension metadata record.
    Metadata(Map<String, Value>),
    /// CSV codelist.
    Tabular(Codelist),
    /// JSON or YAML tree.
    Tree(Value, Syntax),
}

impl Document {
    /// Parse `content` as `format`.
    ///
    /// # Errors
    ///
    /// Returns `Error::MalformedInput` if the content does not parse,
    /// or `Error::UnknownDirective` for markdown with an unregistered directive.
    pub fn parse(format: Format, file: &Path, content: &str, config: &Config) -> Result<Self, Error> {
        return match format {
            Format::Codelist => Ok(Self::Tabular(codelist::parse(file, content)?)),
            Format::Json => Ok(Self::Tree(tree::parse(file, content, Syntax::Json)?, Syntax::Json)),
            Format::Markdown => Ok(Self::Markup(markdown::parse(file, content, &config.directives)?)),
            Format::Metadata => Ok(Self::Metadata(metadata::parse(file, content)?)),
            Format::Yaml => Ok(Self::Tree(tree::parse(file, content, Syntax::Yaml)?, Syntax::Yaml)),
        };
    }

    /// Every translatable string in the document, in visitation order.
    pub fn extract(&self, file: &Path, config: &Config) -> Vec<Message> {
        return match self {
            Self::Markup(document) => document.extract(),
            Self::Metadata(record) => metadata::extract(record),
            Self::Tabular(codelist) => codelist.extract(&config.headers, config.is_ignored(file)),
            Self::Tree(value, _) => tree::extract(value, &config.keys),
        };
    }

    /// Render the translated document in its original format.
    ///
    /// # Errors
    ///
    /// Returns `Error::MalformedInput` if the translated document cannot be serialized.
    pub fn translate(&self, file: &Path, config: &Config, translation: &Translation<'_>) -> Result<String, Error> {
        return match self {
            Self::Markup(document) => Ok(document.translate(translation.catalog)),
            Self::Metadata(record) => {
                let translated = metadata::translate(record, translation.catalog, translation.language);
                tree::render(file, &Value::Object(translated), Syntax::Json)
            },
            Self::Tabular(codelist) => codelist.translate(translation.catalog, &config.headers).render(file),
            Self::Tree(value, syntax) => {
                let translated =
                    tree::translate(value, translation.catalog, &config.keys, translation.replacements);
                tree::render(file, &translated, *syntax)
            },
        };
    }
}
