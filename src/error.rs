/// Crate-level error types for docbabel diagnostics.
use std::path::PathBuf;

/// Every error names the file or argument it concerns, so a batch log points
/// straight at the input that stopped the run. Missing catalog entries are not
/// errors: lookups fall back to the source text.
#[allow(clippy::error_impl_error, reason = "crate-internal error type in binary")]
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A message catalog exists but cannot be read as a catalog.
    #[error("catalog corrupt: {}: {reason}", path.display())]
    CatalogCorrupt {
        /// Path to the catalog file.
        path: PathBuf,
        /// Description of the failure.
        reason: String,
    },

    /// A config file named on the command line does not exist.
    #[error("config not found: {}", path.display())]
    ConfigNotFound {
        /// Path to the missing config file.
        path: PathBuf,
    },

    /// A `--replace` argument is not of the form `name=value`.
    #[error("invalid replacement `{raw}`: expected name=value")]
    InvalidReplacement {
        /// The argument as given.
        raw: String,
    },

    /// Underlying I/O error from the filesystem.
    #[error("io: {0}")]
    Io(
        /// The wrapped I/O error.
        #[from]
        std::io::Error,
    ),

    /// The document does not parse under its expected format.
    #[error("malformed input: {}: {reason}", file.display())]
    MalformedInput {
        /// File that failed to parse.
        file: PathBuf,
        /// Description of the parse failure.
        reason: String,
    },

    /// TOML deserialization failed.
    #[error("toml deserialize: {0}")]
    TomlDe(
        /// The wrapped TOML deserialization error.
        #[from]
        toml::de::Error,
    ),

    /// A markdown directive that is neither understood nor registered as inert.
    #[error("unknown directive `{{{directive}}}` in {}", file.display())]
    UnknownDirective {
        /// Directive name without braces.
        directive: String,
        /// Markdown file containing the directive.
        file: PathBuf,
    },

    /// No walker handles this file.
    #[error("unsupported format: {}", file.display())]
    UnsupportedFormat {
        /// File whose format could not be determined.
        file: PathBuf,
    },
}
