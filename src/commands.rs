//! CLI commands for docbabel: extract, translate, build.

use std::collections::HashMap;
use std::io::Write as _;
use std::path::{Path, PathBuf};

use walkdir::WalkDir;

use crate::catalog::{self, Catalog};
use crate::config::Config;
use crate::document::{Document, Format, Translation};
use crate::error;
use crate::markdown::MarkupDocument;
use crate::policy::Replacements;
use crate::pot::{self, Extracted};

/// Collect the files to process, each with the format it will be read as.
///
/// Directories are walked recursively in file-name order, and files whose
/// format cannot be detected are skipped. A file named directly must have a
/// known format.
///
/// # Errors
///
/// Returns `Error::UnsupportedFormat` for a named file of unknown format,
/// or `Error::Io` if a directory cannot be walked.
fn collect_files(paths: &[PathBuf], format: Option<Format>) -> Result<Vec<(PathBuf, Format)>, error::Error> {
    let mut files = Vec::new();
    for path in paths {
        if !path.is_dir() {
            let detected = match format {
                Some(format) => format,
                None => Format::detect(path)?,
            };
            files.push((path.clone(), detected));
            continue;
        }

        for entry in WalkDir::new(path).sort_by_file_name() {
            let entry = entry.map_err(|e| return error::Error::Io(e.into()))?;
            if !entry.file_type().is_file() {
                continue;
            }
            let file = entry.into_path();
            match format.map_or_else(|| return Format::detect(&file), Ok) {
                Ok(detected) => files.push((file, detected)),
                Err(_) => tracing::debug!(file = %file.display(), "skipping file of unsupported format"),
            }
        }
    }
    return Ok(files);
}

/// Extract translatable strings from files and write a gettext template.
/// The template goes to `output`, or to stdout when no output is given.
///
/// # Errors
///
/// Returns errors from file collection, reading, parsing, or writing.
pub fn extract(
    config: &Config,
    paths: &[PathBuf],
    format: Option<Format>,
    output: Option<&Path>,
) -> Result<(), error::Error> {
    let mut extracted = Vec::new();
    for (file, format) in collect_files(paths, format)? {
        let content = std::fs::read_to_string(&file)?;
        let document = Document::parse(format, &file, &content, config)?;
        let messages = document.extract(&file, config);
        tracing::debug!(file = %file.display(), count = messages.len(), "extracted messages");
        extracted.extend(messages.into_iter().map(|message| {
            return Extracted { file: file.clone(), message };
        }));
    }

    let template = pot::render(&extracted);
    match output {
        Some(path) => {
            write_atomically(path, &template)?;
            tracing::info!(count = extracted.len(), output = %path.display(), "wrote template");
        },
        None => print!("{template}"),
    }
    return Ok(());
}

/// Build the replacements for one run: `lang`, then the config's values,
/// then command-line overrides.
///
/// # Errors
///
/// Returns `Error::InvalidReplacement` for a malformed override.
pub fn replacements_for(config: &Config, language: &str, overrides: &[String]) -> Result<Replacements, error::Error> {
    let mut replacements = Replacements::default();
    replacements.set("lang", language);
    for (name, value) in config.replacements.iter() {
        replacements.set(name, value);
    }
    for raw in overrides {
        replacements.parse_assignment(raw)?;
    }
    return Ok(replacements);
}

/// Translate files into `output` with the catalog for `domain`.
///
/// # Errors
///
/// Returns errors from catalog loading, file collection, parsing, or writing.
pub fn translate(
    config: &Config,
    paths: &[PathBuf],
    format: Option<Format>,
    domain: &str,
    language: &str,
    output: &Path,
    overrides: &[String],
) -> Result<(), error::Error> {
    let replacements = replacements_for(config, language, overrides)?;
    let catalog = catalog::load(&config.locale_dir, domain, language, &config.source_language)?;
    let files = collect_files(paths, format)?;

    tracing::info!("Translating to {language} using \"{domain}\" domain, into {}", output.display());
    let translation = Translation { catalog: catalog.as_ref(), language, replacements: &replacements };
    return translate_files(config, &files, &translation, output);
}

/// Run every configured batch for `language`. Each domain's catalog is
/// loaded once and shared by all batches that use it.
///
/// # Errors
///
/// Returns errors from catalog loading, file collection, parsing, or writing.
pub fn build(config: &Config, language: &str, overrides: &[String]) -> Result<(), error::Error> {
    if config.batches.is_empty() {
        tracing::warn!("no [[batch]] entries configured, nothing to build");
        return Ok(());
    }

    let replacements = replacements_for(config, language, overrides)?;
    let mut catalogs: HashMap<&str, Box<dyn Catalog>> = HashMap::new();

    for batch in &config.batches {
        let domain = batch.domain.as_str();
        if !catalogs.contains_key(domain) {
            let loaded = catalog::load(&config.locale_dir, domain, language, &config.source_language)?;
            catalogs.insert(domain, loaded);
        }
        let Some(catalog) = catalogs.get(domain) else {
            continue;
        };

        let target = batch.output.join(language);
        tracing::info!("Translating to {language} using \"{domain}\" domain, into {}", target.display());

        let files = collect_files(&batch.sources, batch.format)?;
        let translation = Translation { catalog: &**catalog, language, replacements: &replacements };
        translate_files(config, &files, &translation, &target)?;
    }

    return Ok(());
}

/// Translate each file and write it to `output` under its own file name.
///
/// # Errors
///
/// Returns errors from reading, parsing, serializing, or writing any file.
/// Files before the failing one have already been written.
fn translate_files(
    config: &Config,
    files: &[(PathBuf, Format)],
    translation: &Translation<'_>,
    output: &Path,
) -> Result<(), error::Error> {
    std::fs::create_dir_all(output)?;

    for (file, format) in files {
        let Some(name) = file.file_name() else {
            return Err(error::Error::UnsupportedFormat { file: file.clone() });
        };
        let content = std::fs::read_to_string(file)?;
        let document = Document::parse(*format, file, &content, config)?;
        if let Document::Markup(markup) = &document {
            warn_about_missing_directive_files(file, markup);
        }

        let translated = document.translate(file, config, translation)?;
        let destination = output.join(name);
        write_atomically(&destination, &translated)?;
        tracing::debug!(from = %file.display(), to = %destination.display(), "translated");
    }

    return Ok(());
}

/// Log a warning for each `:file:` an inert directive names that doesn't exist.
/// The directive is passed through either way.
fn warn_about_missing_directive_files(file: &Path, markup: &MarkupDocument) {
    let base = file.parent().unwrap_or_else(|| return Path::new("."));
    for referenced in markup.directive_files() {
        if !base.join(&referenced.path).exists() {
            tracing::warn!(
                file = %file.display(),
                directive = %referenced.directive,
                missing = %referenced.path,
                "directive references a file that does not exist"
            );
        }
    }
    return;
}

/// Write `content` to `path` through a temporary file in the same directory,
/// so a failed write never leaves a truncated file behind.
///
/// # Errors
///
/// Returns `Error::Io` if the directory cannot be created or the file cannot be written.
pub fn write_atomically(path: &Path, content: &str) -> Result<(), error::Error> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    std::fs::create_dir_all(dir)?;

    let mut temp = tempfile::NamedTempFile::new_in(dir)?;
    temp.write_all(content.as_bytes())?;
    set_output_permissions(&temp, path)?;
    temp.persist(path).map_err(|e| return error::Error::Io(e.error))?;
    return Ok(());
}

/// Give the temp file the permissions of the file it replaces, or
/// `0o644` for a new file. Temp files are created owner-only.
///
/// # Errors
///
/// Returns `Error::Io` if the permissions cannot be changed.
#[cfg(unix)]
fn set_output_permissions(temp: &tempfile::NamedTempFile, path: &Path) -> Result<(), error::Error> {
    use std::os::unix::fs::PermissionsExt as _;

    let permissions = match std::fs::metadata(path) {
        Ok(existing) => existing.permissions(),
        Err(_) => std::fs::Permissions::from_mode(0o644),
    };
    temp.as_file().set_permissions(permissions)?;
    return Ok(());
}

/// Temp files already get default permissions off unix.
#[cfg(not(unix))]
fn set_output_permissions(_temp: &tempfile::NamedTempFile, _path: &Path) -> Result<(), error::Error> {
    return Ok(());
}
