//! Codelist CSV files: a header row followed by rows of cells.
//!
//! Header names are always translatable. Cells are translatable only in
//! designated columns; every other cell is written back byte-for-byte.

use std::collections::HashMap;
use std::path::Path;

use crate::catalog::Catalog;
use crate::error::Error;
use crate::policy::text_to_translate;
use crate::types::{FieldSet, Location, Message};

/// A parsed codelist. Every row has exactly one cell per header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Codelist {
    /// Header names in file order.
    pub headers: Vec<String>,
    /// Data rows in file order.
    pub rows: Vec<Vec<String>>,
}

/// Parse CSV content with a header row.
///
/// Short rows are padded with empty cells and extra trailing cells dropped,
/// so rows always line up with the header.
///
/// # Errors
///
/// Returns `Error::MalformedInput` if the content is not valid CSV.
pub fn parse(file: &Path, content: &str) -> Result<Codelist, Error> {
    let malformed = |e: csv::Error| {
        return Error::MalformedInput { file: file.to_path_buf(), reason: e.to_string() };
    };

    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(content.as_bytes());

    let headers: Vec<String> = reader.headers().map_err(malformed)?.iter().map(String::from).collect();

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record.map_err(malformed)?;
        let row = (0..headers.len())
            .map(|i| return record.get(i).unwrap_or("").to_string())
            .collect();
        rows.push(row);
    }

    return Ok(Codelist { headers, rows });
}

impl Codelist {
    /// Yield every header name, then the designated cells of every row.
    ///
    /// Rows are skipped entirely when `skip_rows` is set, which is how a
    /// configured ignore list excludes a file's values but not its headers.
    pub fn extract(&self, headers: &FieldSet, skip_rows: bool) -> Vec<Message> {
        let mut messages: Vec<Message> = self
            .headers
            .iter()
            .filter_map(|name| return text_to_translate(Some(name.as_str()), true))
            .map(|name| return Message::new(Location::Row { column: None, row: 0 }, name))
            .collect();

        if skip_rows {
            return messages;
        }

        for (index, row) in self.rows.iter().enumerate() {
            for (column, value) in self.headers.iter().zip(row) {
                let Some(text) = text_to_translate(Some(value), headers.contains(column)) else {
                    continue;
                };
                let location = Location::Row {
                    column: Some(column.clone()),
                    row: index.saturating_add(1),
                };
                messages.push(Message::new(location, text));
            }
        }

        return messages;
    }

    /// Build the translated codelist.
    ///
    /// Headers take their translated names and keep their order. When two
    /// headers translate to the same name, the later column's value fills
    /// every position with that name.
    pub fn translate(&self, catalog: &dyn Catalog, headers: &FieldSet) -> Self {
        let translated_headers: Vec<String> = self
            .headers
            .iter()
            .map(|name| {
                return match text_to_translate(Some(name.as_str()), true) {
                    Some(text) => catalog.translate(text).to_string(),
                    None => name.clone(),
                };
            })
            .collect();

        let rows = self
            .rows
            .iter()
            .map(|row| return self.translate_row(row, &translated_headers, catalog, headers))
            .collect();

        return Self { headers: translated_headers, rows };
    }

    /// Translate one row's designated cells and lay them out under the
    /// translated headers.
    fn translate_row(
        &self,
        row: &[String],
        translated_headers: &[String],
        catalog: &dyn Catalog,
        headers: &FieldSet,
    ) -> Vec<String> {
        let mut by_name: HashMap<&str, String> = HashMap::new();
        for ((column, translated), value) in self.headers.iter().zip(translated_headers).zip(row) {
            let cell = match text_to_translate(Some(value), headers.contains(column)) {
                Some(text) => catalog.translate(text).to_string(),
                None => value.clone(),
            };
            by_name.insert(translated.as_str(), cell);
        }

        return translated_headers
            .iter()
            .map(|name| return by_name.get(name.as_str()).cloned().unwrap_or_default())
            .collect();
    }

    /// Serialize as CSV with `\n` line endings and minimal quoting.
    ///
    /// # Errors
    ///
    /// Returns `Error::MalformedInput` if a record cannot be written.
    pub fn render(&self, file: &Path) -> Result<String, Error> {
        let malformed = |reason: String| {
            return Error::MalformedInput { file: file.to_path_buf(), reason };
        };

        let mut writer = csv::WriterBuilder::new()
            .terminator(csv::Terminator::Any(b'\n'))
            .from_writer(Vec::new());

        writer.write_record(&self.headers).map_err(|e| return malformed(e.to_string()))?;
        for row in &self.rows {
            writer.write_record(row).map_err(|e| return malformed(e.to_string()))?;
        }

        let bytes = writer.into_inner().map_err(|e| return malformed(e.to_string()))?;
        return String::from_utf8(bytes).map_err(|e| return malformed(e.to_string()));
    }
}
