use std::path::Path;

use crate::config::CONFIG_FILE_NAME;
use crate::error::Error;
use crate::markdown::INERT_DIRECTIVES;

/// ANSI bold on.
const BOLD: &str = "\x1b[1m";
/// ANSI reset.
const RESET: &str = "\x1b[0m";

/// Render an error as valid markdown with bold headings and print to stderr.
pub fn print_error(e: &Error) {
    let md = render_error(e);
    for line in md.lines() {
        if line.starts_with('#') {
            eprintln!("{BOLD}{line}{RESET}");
        } else {
            eprintln!("{line}");
        }
    }
    return;
}

/// Render an error as a structured markdown diagnostic.
///
/// Each variant produces a block saying what happened and, where there is
/// one, how to fix it.
pub fn render_error(e: &Error) -> String {
    return match e {
        Error::CatalogCorrupt { path, reason } => render_catalog_corrupt(path, reason),
        Error::ConfigNotFound { path } => format!(
            "\
# Error: Config Not Found

`{}` does not exist.

## Fix

Pass the path of an existing config to `--config`, or omit it to use
`{CONFIG_FILE_NAME}` in the current directory.
",
            path.display()
        ),
        Error::InvalidReplacement { raw } => format!(
            "\
# Error: Invalid Replacement

`{raw}` is not of the form `name=value`.

## Fix

    --replace version=1.1
"
        ),
        Error::MalformedInput { file, reason } => format!(
            "\
# Error: Malformed Input

Could not parse `{}`: {reason}
",
            file.display()
        ),
        Error::UnknownDirective { directive, file } => render_unknown_directive(directive, file),
        Error::UnsupportedFormat { file } => render_unsupported_format(file),
        Error::Io(_) | Error::TomlDe(_) => render_generic(e),
    };
}

/// Variants that wrap another crate's error.
fn render_generic(e: &Error) -> String {
    return match e {
        Error::Io(e) => format!(
            "\
# Error: I/O

{e}
"
        ),
        Error::TomlDe(e) => format!(
            "\
# Error: Invalid TOML

{e}

## Fix

Check `{CONFIG_FILE_NAME}` against the documented keys.
"
        ),
        _ => format!(
            "\
# Error

{e}
"
        ),
    };
}

/// A catalog file exists but cannot be read.
fn render_catalog_corrupt(path: &Path, reason: &str) -> String {
    return format!(
        "\
# Error: Catalog Corrupt

`{}` is not a readable message catalog: {reason}

## Fix

Recompile the catalog from its `.po` file, or remove it to fall back to the
source text.
",
        path.display()
    );
}

/// A fenced directive that is not registered as inert.
fn render_unknown_directive(directive: &str, file: &Path) -> String {
    let known = INERT_DIRECTIVES
        .iter()
        .map(|d| return format!("- `{d}`"))
        .collect::<Vec<_>>()
        .join("\n");
    return format!(
        "\
# Error: Unknown Directive

`{}` uses the directive `{{{directive}}}`, which docbabel does not know.

## Passed through untranslated

{known}

## Fix

Add it to `{CONFIG_FILE_NAME}`:

    directives = [\"{directive}\"]
",
        file.display()
    );
}

/// A file no reader handles.
fn render_unsupported_format(file: &Path) -> String {
    return format!(
        "\
# Error: Unsupported Format

No reader for `{}`.

## Supported files

- `extension.json`: extension metadata
- `.csv`: codelists
- `.json`: JSON trees
- `.md`, `.markdown`: Markdown
- `.yaml`, `.yml`: YAML trees

Pass `--format` to read a file as one of these.
",
        file.display()
    );
}
