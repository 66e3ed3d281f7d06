//! Output formatting: indented text tree (default) and JSON Lines (`--json`).
//!
//! All result data flows through a [`Formatter`] which writes to an
//! arbitrary [`std::io::Write`] destination (typically stdout).
//! Hints and errors always go to stderr via [`print_hint`] and [`print_error`].

use std::collections::BTreeMap;
use std::io::Write;

use crate::color;
use crate::errors::AppError;
use crate::symbols::SymbolDescriptor;
use crate::types::{Modifier, OutlineNode};

// ---------------------------------------------------------------------------
// Icons
// ---------------------------------------------------------------------------

const DEFAULT_ICONS: &[(&str, &str)] = &[
    ("class", "📦"),
    ("interface", "📋"),
    ("constructor", "🏗️"),
    ("property", "📝"),
    ("method", "⚙️"),
    ("function", "🔧"),
    ("getter", "📤"),
    ("setter", "📥"),
    ("public", "🌐"),
    ("private", "🔒"),
    ("protected", "🛡️"),
    ("static", "📌"),
    ("readonly", "📖"),
    ("abstract", "🎭"),
    ("async", "⚡"),
    ("export", "📤"),
    ("default", "🌟"),
];

/// Icon table keyed by kind, visibility and modifier names.
#[derive(Debug, Clone, PartialEq)]
pub struct IconSet {
    table: BTreeMap<String, String>,
}

impl Default for IconSet {
    fn default() -> Self {
        Self {
            table: DEFAULT_ICONS
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        }
    }
}

impl IconSet {
    /// Default table with `overrides` replacing individual entries. An empty
    /// override hides that icon.
    pub fn with_overrides(overrides: &BTreeMap<String, String>) -> Self {
        let mut set = Self::default();
        for (key, icon) in overrides {
            set.table.insert(key.clone(), icon.clone());
        }
        set
    }

    pub fn get(&self, key: &str) -> &str {
        self.table.get(key).map(String::as_str).unwrap_or("")
    }

    /// Kind icon, then visibility icon, then one icon per modifier.
    /// `export default` collapses to the single `default` icon.
    pub fn prefix(&self, node: &OutlineNode) -> String {
        let mut out = String::new();
        out.push_str(self.get(node.kind.as_str()));
        out.push_str(self.get(node.visibility.as_str()));
        let export_default =
            node.has_modifier(Modifier::Export) && node.has_modifier(Modifier::Default);
        for m in &node.modifiers {
            if export_default && *m == Modifier::Export {
                continue;
            }
            out.push_str(self.get(m.as_str()));
        }
        out
    }
}

// ---------------------------------------------------------------------------
// Formatter
// ---------------------------------------------------------------------------

/// Text rendering switches.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DisplayOptions {
    pub icons: bool,
    pub visibility: bool,
}

impl Default for DisplayOptions {
    fn default() -> Self {
        Self {
            icons: true,
            visibility: false,
        }
    }
}

/// Output formatter that can render results in either an indented text tree
/// or JSON Lines (one JSON object per line).
pub struct Formatter<W: Write> {
    writer: W,
    json: bool,
    color: bool,
    display: DisplayOptions,
    icons: IconSet,
}

impl<W: Write> Formatter<W> {
    /// Create a new formatter.
    ///
    /// * `writer` - The destination for output (e.g. `std::io::stdout()`).
    /// * `json`   - When `true`, emit JSON Lines; otherwise, emit a text tree.
    /// * `color`  - When `true`, emit ANSI color codes in text output.
    pub fn new(writer: W, json: bool, color: bool) -> Self {
        Self {
            writer,
            json,
            color,
            display: DisplayOptions::default(),
            icons: IconSet::default(),
        }
    }

    pub fn with_display(mut self, display: DisplayOptions, icons: IconSet) -> Self {
        self.display = display;
        self.icons = icons;
        self
    }

    // -- Color helper methods -----------------------------------------------

    fn write_painted(&mut self, paint: &str, text: &str) -> std::io::Result<()> {
        if self.color {
            write!(self.writer, "{paint}{text}{}", color::RESET)
        } else {
            write!(self.writer, "{text}")
        }
    }

    fn write_json(&mut self, value: &impl serde::Serialize) -> std::io::Result<()> {
        let line = serde_json::to_string(value).map_err(std::io::Error::other)?;
        writeln!(self.writer, "{line}")
    }

    /// Format an outline: one JSON object per root node, or one text line
    /// per node with children indented under their container.
    pub fn format_outline(&mut self, nodes: &[OutlineNode]) -> std::io::Result<()> {
        for node in nodes {
            if self.json {
                self.write_json(node)?;
            } else {
                self.write_tree(node, 0)?;
            }
        }
        Ok(())
    }

    /// `line:  [indent][icons ]kind name[ [visibility]]`, with 1-based lines.
    fn write_tree(&mut self, node: &OutlineNode, depth: usize) -> std::io::Result<()> {
        self.write_painted(color::LINE_NO, &(node.line + 1).to_string())?;
        write!(self.writer, ":{}", "  ".repeat(depth + 1))?;
        if self.display.icons {
            let icons = self.icons.prefix(node);
            if !icons.is_empty() {
                write!(self.writer, "{icons} ")?;
            }
        }
        let label = format!("{} {}", node.kind, node.name);
        self.write_painted(color::kind_color(node.kind), &label)?;
        if self.display.visibility {
            write!(self.writer, " ")?;
            let tag = format!("[{}]", node.visibility);
            self.write_painted(color::visibility_color(node.visibility), &tag)?;
        }
        writeln!(self.writer)?;
        for child in node.children() {
            self.write_tree(child, depth + 1)?;
        }
        Ok(())
    }

    /// Format the result of a line lookup.
    pub fn format_located(&mut self, node: &OutlineNode) -> std::io::Result<()> {
        if self.json {
            self.write_json(node)
        } else {
            writeln!(self.writer, "{}", node.describe())
        }
    }

    /// Dump structured symbols as a pretty JSON array, the same format
    /// `--symbols` reads back.
    pub fn format_descriptors(&mut self, descriptors: &[SymbolDescriptor]) -> std::io::Result<()> {
        if self.json {
            return self.write_json(&descriptors);
        }
        let text = serde_json::to_string_pretty(descriptors).map_err(std::io::Error::other)?;
        writeln!(self.writer, "{text}")
    }
}

// ---------------------------------------------------------------------------
// Stderr helpers
// ---------------------------------------------------------------------------

/// Print a hint message to stderr (suppressed when `json` is true).
pub fn print_hint(msg: &str, json: bool) {
    if !json {
        eprintln!("hint: {msg}");
    }
}

/// Print a section header to stderr so it does not mix with stdout data.
pub fn print_header(header: &str) {
    eprintln!("{header}");
}

/// Print an error message to stderr.
pub fn print_error(msg: &str) {
    eprintln!("error: {msg}");
}

/// Format an [`AppError`] to stderr with structured `error:` / `hint:` lines.
///
/// * Always prints `error: <message>` to stderr.
/// * When `json` is `false` and the error carries a contextual hint, also
///   prints `hint: <suggestion>` to stderr.
/// * Returns the appropriate process exit code.
pub fn format_error(err: &AppError, json: bool) -> i32 {
    print_error(&format!("{err:#}"));
    if let Some(hint) = err.hint() {
        print_hint(hint, json);
    }
    err.exit_code()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
