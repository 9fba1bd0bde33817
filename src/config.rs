use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use crate::document::Format;
use crate::error::Error;
use crate::policy::Replacements;
use crate::types::FieldSet;

/// Name of the project config file.
pub const CONFIG_FILE_NAME: &str = ".docbabel.toml";

/// Project configuration loaded from `.docbabel.toml`.
/// Relative paths are resolved against the directory holding the config.
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    /// Translation batches run by `docbabel build`.
    pub batches: Vec<Batch>,
    /// Extra markdown directives to pass through untranslated.
    pub directives: Vec<String>,
    /// Designated codelist columns.
    pub headers: FieldSet,
    /// Codelist file names whose rows are never extracted.
    pub ignore: Vec<String>,
    /// Designated tree keys.
    pub keys: FieldSet,
    /// Directory holding `<language>/LC_MESSAGES/<domain>.{mo,json}` catalogs.
    pub locale_dir: PathBuf,
    /// Placeholder values applied to every translation.
    pub replacements: Replacements,
    /// Language the documents are written in.
    pub source_language: String,
}

/// One group of files translated with the same catalog domain.
#[derive(Debug, Clone, PartialEq, Eq, serde::Deserialize)]
pub struct Batch {
    /// Catalog domain, the file stem of the catalog.
    pub domain: String,
    /// Format of every source, detected per file when absent.
    #[serde(default)]
    pub format: Option<Format>,
    /// Directory that receives a `<language>/` directory of translated files.
    pub output: PathBuf,
    /// Files or directories to translate.
    pub sources: Vec<PathBuf>,
}

/// Raw TOML structure for `.docbabel.toml`.
#[derive(serde::Deserialize)]
#[serde(deny_unknown_fields)]
struct DocbabelTomlConfig {
    #[serde(default, rename = "batch")]
    batches: Vec<Batch>,
    #[serde(default)]
    directives: Vec<String>,
    #[serde(default)]
    headers: Vec<String>,
    #[serde(default)]
    ignore: Vec<String>,
    keys: Option<Vec<String>>,
    locale_dir: Option<PathBuf>,
    #[serde(default)]
    replacements: BTreeMap<String, String>,
    source_language: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        return Self {
            batches: Vec::new(),
            directives: Vec::new(),
            headers: FieldSet::default(),
            ignore: Vec::new(),
            keys: ["title", "description"].into_iter().collect(),
            locale_dir: PathBuf::from("locale"),
            replacements: Replacements::default(),
            source_language: "en".to_string(),
        };
    }
}

impl Config {
    /// Whether a codelist's rows are excluded from extraction.
    pub fn is_ignored(&self, file: &Path) -> bool {
        let Some(name) = file.file_name().and_then(|n| return n.to_str()) else {
            return false;
        };
        return self.ignore.iter().any(|ignored| return ignored == name);
    }

    /// Load config from `.docbabel.toml` in the given root directory.
    /// Returns the defaults if the file doesn't exist.
    /// Returns an error if the file exists but is malformed; a config the
    /// user wrote is never silently replaced by defaults.
    ///
    /// # Errors
    ///
    /// Returns `Error::Io` if reading fails (other than not-found),
    /// or `Error::TomlDe` if the TOML is malformed.
    pub fn load(root: &Path) -> Result<Self, Error> {
        let path = root.join(CONFIG_FILE_NAME);
        let content = match std::fs::read_to_string(&path) {
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Ok(Self::default().rooted_at(root));
            },
            Err(e) => return Err(Error::Io(e)),
            Ok(c) => c,
        };
        return Self::parse(&content).map(|config| return config.rooted_at(root));
    }

    /// Load config from an explicit path, which must exist.
    ///
    /// # Errors
    ///
    /// Returns `Error::ConfigNotFound` if the file doesn't exist,
    /// `Error::Io` for other read failures,
    /// or `Error::TomlDe` if the TOML is malformed.
    pub fn load_file(path: &Path) -> Result<Self, Error> {
        let content = match std::fs::read_to_string(path) {
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(Error::ConfigNotFound { path: path.to_path_buf() });
            },
            Err(e) => return Err(Error::Io(e)),
            Ok(c) => c,
        };
        let root = path.parent().unwrap_or_else(|| return Path::new("."));
        return Self::parse(&content).map(|config| return config.rooted_at(root));
    }

    /// Parse TOML content. Relative paths are left unresolved.
    ///
    /// # Errors
    ///
    /// Returns `Error::TomlDe` if the TOML is malformed.
    pub fn parse(content: &str) -> Result<Self, Error> {
        let raw: DocbabelTomlConfig = toml::from_str(content)?;
        let defaults = Self::default();
        return Ok(Self {
            batches: raw.batches,
            directives: raw.directives,
            headers: raw.headers.into_iter().collect(),
            ignore: raw.ignore,
            keys: raw.keys.map_or(defaults.keys, |keys| return keys.into_iter().collect()),
            locale_dir: raw.locale_dir.unwrap_or(defaults.locale_dir),
            replacements: raw.replacements.into_iter().collect(),
            source_language: raw.source_language.unwrap_or(defaults.source_language),
        });
    }

    /// Resolve relative paths against `root`.
    fn rooted_at(mut self, root: &Path) -> Self {
        self.locale_dir = root.join(&self.locale_dir);
        for batch in &mut self.batches {
            batch.output = root.join(&batch.output);
            batch.sources = batch.sources.iter().map(|source| return root.join(source)).collect();
        }
        return self;
    }
}
