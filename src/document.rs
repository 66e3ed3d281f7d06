//! Source documents and language detection.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

/// Languages the outline engine understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Lang {
    TypeScript,
    Tsx,
}

impl Lang {
    /// Returns the human-readable name for this language.
    pub fn name(self) -> &'static str {
        match self {
            Lang::TypeScript => "TypeScript",
            Lang::Tsx => "TSX",
        }
    }
}

/// Detect the language of a file based on its extension.
///
/// Returns `None` for unsupported or missing extensions.
pub fn detect_language(path: &Path) -> Option<Lang> {
    let ext = path.extension()?.to_str()?;
    match ext {
        "ts" | "mts" | "cts" => Some(Lang::TypeScript),
        "tsx" => Some(Lang::Tsx),
        _ => None,
    }
}

/// An immutable snapshot of one source file.
#[derive(Debug, Clone)]
pub struct Document {
    path: Option<PathBuf>,
    lang: Option<Lang>,
    text: String,
    lines: Vec<String>,
}

impl Document {
    /// Build a document from in-memory text.
    pub fn new(text: impl Into<String>, lang: Option<Lang>) -> Self {
        let text = text.into();
        let lines = text
            .split('\n')
            .map(|l| l.strip_suffix('\r').unwrap_or(l).to_string())
            .collect();
        Self {
            path: None,
            lang,
            text,
            lines,
        }
    }

    /// Read a document from disk, detecting its language from the extension.
    pub fn open(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        let mut doc = Self::new(text, detect_language(path));
        doc.path = Some(path.to_path_buf());
        Ok(doc)
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub fn lang(&self) -> Option<Lang> {
        self.lang
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    /// The raw text of 0-based line `idx`, if it exists.
    pub fn line(&self, idx: usize) -> Option<&str> {
        self.lines.get(idx).map(String::as_str)
    }

    /// Whether this document is something the engine can outline at all.
    pub fn is_outlinable(&self) -> bool {
        self.lang.is_some()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detect_typescript() {
        assert_eq!(detect_language(Path::new("a.ts")), Some(Lang::TypeScript));
        assert_eq!(detect_language(Path::new("a.mts")), Some(Lang::TypeScript));
        assert_eq!(detect_language(Path::new("a.cts")), Some(Lang::TypeScript));
    }

    #[test]
    fn detect_tsx() {
        assert_eq!(detect_language(Path::new("a.tsx")), Some(Lang::Tsx));
    }

    #[test]
    fn detect_unsupported_returns_none() {
        assert_eq!(detect_language(Path::new("a.js")), None);
        assert_eq!(detect_language(Path::new("a.rs")), None);
        assert_eq!(detect_language(Path::new("Makefile")), None);
    }

    #[test]
    fn lines_strip_carriage_returns() {
        let doc = Document::new("class A {\r\n  x = 1;\r\n}", Some(Lang::TypeScript));
        assert_eq!(doc.lines().len(), 3);
        assert_eq!(doc.line(1), Some("  x = 1;"));
        assert_eq!(doc.line(3), None);
    }

    #[test]
    fn open_detects_language() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("mod.tsx");
        std::fs::write(&path, "export function App() {}\n").unwrap();
        let doc = Document::open(&path).unwrap();
        assert_eq!(doc.lang(), Some(Lang::Tsx));
        assert_eq!(doc.path(), Some(path.as_path()));
        assert!(doc.is_outlinable());
    }

    #[test]
    fn open_missing_file_errors() {
        let dir = tempfile::tempdir().unwrap();
        let err = Document::open(&dir.path().join("gone.ts")).unwrap_err();
        assert!(format!("{err:#}").contains("failed to read"));
    }

    #[test]
    fn unknown_language_is_not_outlinable() {
        let doc = Document::new("function f() {}", None);
        assert!(!doc.is_outlinable());
    }
}
