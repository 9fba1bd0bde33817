//! Gettext template (`.pot`) output for extracted messages.

use std::fmt::Write as _;
use std::path::{Path, PathBuf};

use crate::types::Message;

/// A message extracted from a particular file.
#[derive(Debug, Clone)]
pub struct Extracted {
    /// File the message came from.
    pub file: PathBuf,
    /// The message and its location within the file.
    pub message: Message,
}

/// One template entry: a distinct text and everywhere it occurs.
struct Entry<'a> {
    /// Extracted comments (column names or pointers), deduplicated.
    comments: Vec<&'a str>,
    /// `file:line` references in first-seen order.
    references: Vec<String>,
    /// The source text.
    text: &'a str,
}

/// Escape a string for a double-quoted PO literal.
fn escape(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '"' => escaped.push_str("\\\""),
            '\\' => escaped.push_str("\\\\"),
            '\n' => escaped.push_str("\\n"),
            '\r' => escaped.push_str("\\r"),
            '\t' => escaped.push_str("\\t"),
            other => escaped.push(other),
        }
    }
    return escaped;
}

/// Format a `#:` reference for a message in `file`.
fn reference(file: &Path, message: &Message) -> String {
    return format!("{}:{}", file.display(), message.location.line());
}

/// Group messages by text, keeping the order in which texts first appear.
fn group(messages: &[Extracted]) -> Vec<Entry<'_>> {
    let mut entries: Vec<Entry<'_>> = Vec::new();
    for extracted in messages {
        let text = extracted.message.text.as_str();
        let position = match entries.iter().position(|e| return e.text == text) {
            Some(position) => position,
            None => {
                entries.push(Entry { comments: Vec::new(), references: Vec::new(), text });
                entries.len().saturating_sub(1)
            },
        };
        let Some(entry) = entries.get_mut(position) else {
            continue;
        };

        let reference = reference(&extracted.file, &extracted.message);
        if !entry.references.contains(&reference) {
            entry.references.push(reference);
        }
        if let Some(comment) = extracted.message.location.comment()
            && !entry.comments.contains(&comment)
        {
            entry.comments.push(comment);
        }
    }
    return entries;
}

/// Render extracted messages as a gettext template.
pub fn render(messages: &[Extracted]) -> String {
    let mut out = String::from("msgid \"\"\nmsgstr \"\"\n\"Content-Type: text/plain; charset=UTF-8\\n\"\n");
    for entry in group(messages) {
        out.push('\n');
        for comment in &entry.comments {
            let _ = writeln!(out, "#. {comment}");
        }
        for reference in &entry.references {
            let _ = writeln!(out, "#: {reference}");
        }
        let _ = writeln!(out, "msgid \"{}\"", escape(entry.text));
        out.push_str("msgstr \"\"\n");
    }
    return out;
}
