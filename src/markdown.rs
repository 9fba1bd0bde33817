//! Markdown documents parsed with tree-sitter-md.
//!
//! Translation works on text runs: the inline content of paragraphs and
//! headings, and the cells of pipe tables. Everything between runs (markers,
//! code, HTML, directives) is copied from the source unchanged, so an
//! untranslated document comes back byte-for-byte.

use std::ops::Range;
use std::path::Path;

use tree_sitter::{Language, Node, Parser, Tree};

use crate::catalog::Catalog;
use crate::error::Error;
use crate::policy::text_to_translate;
use crate::types::{Location, Message};

/// Directives that are always passed through untranslated.
pub const INERT_DIRECTIVES: [&str; 2] = ["csv-table-no-translate", "extensiontable"];

/// Nodes whose content is never translated and never searched for runs.
const OPAQUE_KINDS: [&str; 6] = [
    "fenced_code_block",
    "html_block",
    "indented_code_block",
    "link_reference_definition",
    "minus_metadata",
    "plus_metadata",
];

/// Option line naming an auxiliary file in a directive body.
const FILE_OPTION: &str = ":file:";

/// A parsed markdown document.
pub struct MarkupDocument {
    /// The original text, which every run's byte range points into.
    source: String,
    /// The block-level syntax tree.
    tree: Tree,
}

/// An auxiliary file named by an inert directive's `:file:` option.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirectiveFile {
    /// Directive name without braces.
    pub directive: String,
    /// Path as written, relative to the markdown file.
    pub path: String,
}

/// A run of translatable text, with the continuation prefixes inside it.
struct Run {
    /// Block continuation markers (block quote `>`, list indentation) that
    /// interrupt the run and are not part of its text.
    gaps: Vec<Range<usize>>,
    /// One-based line the run starts on.
    line: usize,
    /// Byte range of the whole run in the source.
    range: Range<usize>,
}

impl Run {
    /// Build a run from an `inline` or `pipe_table_cell` node.
    fn from_node(node: Node<'_>) -> Self {
        let mut gaps = Vec::new();
        collect_continuations(node, &mut gaps);
        gaps.sort_by_key(|gap| return gap.start);
        return Self {
            gaps,
            line: node.start_position().row.saturating_add(1),
            range: node.start_byte()..node.end_byte(),
        };
    }

    /// The run's text with continuation prefixes removed.
    fn text(&self, source: &str) -> String {
        let mut text = String::new();
        let mut cursor = self.range.start;
        for gap in &self.gaps {
            text.push_str(slice(source, cursor..gap.start));
            cursor = gap.end;
        }
        text.push_str(slice(source, cursor..self.range.end));
        return text;
    }

    /// The run as it should appear in the translated document.
    fn translate(&self, source: &str, catalog: &dyn Catalog) -> String {
        let original = slice(source, self.range.clone());
        let raw = self.text(source);
        let Some(key) = text_to_translate(Some(&raw), true) else {
            return original.to_string();
        };
        let translated = catalog.translate(key);
        if translated == key {
            return original.to_string();
        }

        let leading_len = raw.len().saturating_sub(raw.trim_start().len());
        let leading = raw.get(..leading_len).unwrap_or("");
        let trailing = raw.get(raw.trim_end().len()..).unwrap_or("");
        let body = match self.gaps.first() {
            Some(gap) => translated.replace('\n', &format!("\n{}", slice(source, gap.clone()))),
            None => translated.to_string(),
        };
        return format!("{leading}{body}{trailing}");
    }
}

/// Borrow `range` of `source`, or nothing if it is out of bounds.
fn slice(source: &str, range: Range<usize>) -> &str {
    return source.get(range).unwrap_or("");
}

/// Collect every `block_continuation` below `node`.
fn collect_continuations(node: Node<'_>, gaps: &mut Vec<Range<usize>>) {
    let mut cursor = node.walk();
    for child in node.children(&mut cursor) {
        if child.kind() == "block_continuation" {
            gaps.push(child.start_byte()..child.end_byte());
            continue;
        }
        collect_continuations(child, gaps);
    }
}

/// Depth-first collection of text runs in document order.
fn collect_runs(node: Node<'_>, runs: &mut Vec<Run>) {
    let kind = node.kind();
    if kind == "inline" || kind == "pipe_table_cell" {
        runs.push(Run::from_node(node));
        return;
    }
    if OPAQUE_KINDS.contains(&kind) {
        return;
    }

    let mut cursor = node.walk();
    for child in node.children(&mut cursor) {
        collect_runs(child, runs);
    }
}

/// The directive name of a fenced block's info string, e.g. `{note} Title`.
fn directive_name(info: &str) -> Option<&str> {
    let rest = info.trim().strip_prefix('{')?;
    let (name, _) = rest.split_once('}')?;
    let name = name.trim();
    if name.is_empty() {
        return None;
    }
    return Some(name);
}

/// Info string text of a fenced code block, if it has one.
fn info_string<'s>(block: Node<'_>, source: &'s str) -> Option<&'s str> {
    let mut cursor = block.walk();
    let info = block.children(&mut cursor).find(|c| return c.kind() == "info_string")?;
    return Some(slice(source, info.start_byte()..info.end_byte()));
}

/// Body text of a fenced code block, empty when the block has none.
fn fence_content<'s>(block: Node<'_>, source: &'s str) -> &'s str {
    let mut cursor = block.walk();
    return block
        .children(&mut cursor)
        .find(|c| return c.kind() == "code_fence_content")
        .map_or("", |c| return slice(source, c.start_byte()..c.end_byte()));
}

/// Visit every fenced block that carries a directive, in document order.
fn visit_directives<'s>(node: Node<'_>, source: &'s str, visit: &mut dyn FnMut(&'s str, Node<'_>)) {
    if node.kind() == "fenced_code_block" {
        if let Some(name) = info_string(node, source).and_then(directive_name) {
            visit(name, node);
        }
        return;
    }
    let mut cursor = node.walk();
    for child in node.children(&mut cursor) {
        visit_directives(child, source, visit);
    }
}

/// Parse markdown and check that every directive is registered as inert.
///
/// `extra_inert` extends [`INERT_DIRECTIVES`] with project-specific names.
///
/// # Errors
///
/// Returns `Error::MalformedInput` if tree-sitter cannot parse the text,
/// or `Error::UnknownDirective` for a directive that is not inert.
pub fn parse(file: &Path, source: &str, extra_inert: &[String]) -> Result<MarkupDocument, Error> {
    let language: Language = tree_sitter_md::LANGUAGE.into();
    let mut parser = Parser::new();
    parser
        .set_language(&language)
        .map_err(|e| return Error::MalformedInput { file: file.to_path_buf(), reason: e.to_string() })?;
    let tree = parser.parse(source, None).ok_or_else(|| return Error::MalformedInput {
        file: file.to_path_buf(),
        reason: "tree-sitter returned None".to_string(),
    })?;

    let mut unknown: Option<String> = None;
    visit_directives(tree.root_node(), source, &mut |name, _| {
        let inert = INERT_DIRECTIVES.contains(&name) || extra_inert.iter().any(|d| return d == name);
        if !inert && unknown.is_none() {
            unknown = Some(name.to_string());
        }
    });
    if let Some(directive) = unknown {
        return Err(Error::UnknownDirective { directive, file: file.to_path_buf() });
    }

    return Ok(MarkupDocument { source: source.to_string(), tree });
}

impl MarkupDocument {
    /// Auxiliary files referenced by directives through a `:file:` option.
    pub fn directive_files(&self) -> Vec<DirectiveFile> {
        let mut files = Vec::new();
        visit_directives(self.tree.root_node(), &self.source, &mut |name, block| {
            for line in fence_content(block, &self.source).lines() {
                let Some(path) = line.trim().strip_prefix(FILE_OPTION) else {
                    continue;
                };
                files.push(DirectiveFile { directive: name.to_string(), path: path.trim().to_string() });
            }
        });
        return files;
    }

    /// Yield every non-empty text run, tagged with the line it starts on.
    pub fn extract(&self) -> Vec<Message> {
        return self
            .runs()
            .iter()
            .filter_map(|run| {
                let raw = run.text(&self.source);
                let text = text_to_translate(Some(&raw), true)?;
                return Some(Message::new(Location::Line(run.line), text));
            })
            .collect();
    }

    /// Text runs in visitation order.
    fn runs(&self) -> Vec<Run> {
        let mut runs = Vec::new();
        collect_runs(self.tree.root_node(), &mut runs);
        return runs;
    }

    /// Render the document with every run replaced by its translation.
    pub fn translate(&self, catalog: &dyn Catalog) -> String {
        let mut output = String::with_capacity(self.source.len());
        let mut cursor = 0;
        for run in self.runs() {
            output.push_str(slice(&self.source, cursor..run.range.start));
            output.push_str(&run.translate(&self.source, catalog));
            cursor = run.range.end;
        }
        output.push_str(slice(&self.source, cursor..self.source.len()));
        return output;
    }
}
