//! Core domain types shared by every document walker.
use std::collections::BTreeSet;
use std::fmt;

/// Where an extracted string occurs. Extraction and substitution compute the
/// same location for the same node, so a location identifies one lookup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Location {
    /// One-based line on which a markdown text run starts.
    Line(usize),
    /// Slash-delimited path from the root of a tree or metadata record.
    Pointer(String),
    /// A codelist cell. Row 0 with no column is a header name.
    Row {
        /// Column name of the cell, absent for header names.
        column: Option<String>,
        /// One-based data row, 0 for the header row.
        row: usize,
    },
}

impl Location {
    /// The extracted comment attached to the message, if any.
    pub fn comment(&self) -> Option<&str> {
        return match self {
            Location::Line(_) => None,
            Location::Pointer(pointer) => Some(pointer.as_str()),
            Location::Row { column, .. } => column.as_deref(),
        };
    }

    /// The line number reported in a `#:` reference.
    pub const fn line(&self) -> usize {
        return match self {
            Location::Line(line) => *line,
            Location::Pointer(_) => 1,
            Location::Row { row, .. } => *row,
        };
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        return match self {
            Location::Line(line) => write!(f, "line {line}"),
            Location::Pointer(pointer) => write!(f, "{pointer}"),
            Location::Row { column: None, row } => write!(f, "row {row}"),
            Location::Row { column: Some(column), row } => write!(f, "row {row}, {column}"),
        };
    }
}

/// A translatable string together with the location it was found at.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    /// Where the string occurs in its document.
    pub location: Location,
    /// Normalized text, used verbatim as the catalog key.
    pub text: String,
}

impl Message {
    /// Build a message from a location and normalized text.
    pub fn new(location: Location, text: &str) -> Self {
        return Self { location, text: text.to_string() };
    }
}

/// Names of the columns or keys whose values are eligible for translation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldSet(
    /// The designated names.
    BTreeSet<String>,
);

impl FieldSet {
    /// Whether `name` is designated.
    pub fn contains(&self, name: &str) -> bool {
        return self.0.contains(name);
    }
}

impl<S: Into<String>> FromIterator<S> for FieldSet {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        return Self(iter.into_iter().map(Into::into).collect());
    }
}
