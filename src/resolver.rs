//! Strategy selection.
//!
//! Both outline strategies produce the same tree shape. The structured
//! strategy is preferred; whenever it fails or finds nothing the text
//! scanner's result is used instead, unconditionally.

use std::fmt;

use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::convert::convert;
use crate::document::Document;
use crate::errors::SymbolSourceError;
use crate::fallback::TextFallbackParser;
use crate::symbols::SymbolSource;
use crate::types::{OutlineNode, count_nodes};

/// Something that can produce an outline tree from a document.
pub trait OutlineStrategy {
    /// Short name used in logs and `--json` output.
    fn name(&self) -> &'static str;

    fn outline(&self, doc: &Document) -> Result<Vec<OutlineNode>, SymbolSourceError>;
}

/// Outline built from a structured symbol source.
pub struct StructuredStrategy<S> {
    source: S,
}

impl<S: SymbolSource> StructuredStrategy<S> {
    pub fn new(source: S) -> Self {
        Self { source }
    }
}

impl<S: SymbolSource> OutlineStrategy for StructuredStrategy<S> {
    fn name(&self) -> &'static str {
        "structured"
    }

    fn outline(&self, doc: &Document) -> Result<Vec<OutlineNode>, SymbolSourceError> {
        if !doc.is_outlinable() {
            return Ok(Vec::new());
        }
        let descriptors = self.source.document_symbols(doc)?;
        Ok(convert(&descriptors, doc))
    }
}

/// Outline built by scanning the raw text.
#[derive(Debug, Clone, Copy, Default)]
pub struct TextStrategy;

impl OutlineStrategy for TextStrategy {
    fn name(&self) -> &'static str {
        "text"
    }

    fn outline(&self, doc: &Document) -> Result<Vec<OutlineNode>, SymbolSourceError> {
        if !doc.is_outlinable() {
            return Ok(Vec::new());
        }
        Ok(TextFallbackParser.parse(doc))
    }
}

/// An outline together with the strategy that produced it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolution {
    pub nodes: Vec<OutlineNode>,
    pub strategy: &'static str,
}

/// Primary strategy with a fallback.
pub struct StrategyResolver<P, F> {
    primary: P,
    fallback: F,
}

impl<P: OutlineStrategy, F: OutlineStrategy> StrategyResolver<P, F> {
    pub fn new(primary: P, fallback: F) -> Self {
        Self { primary, fallback }
    }

    /// Outline `doc` with the primary strategy, or with the fallback when the
    /// primary fails or returns an empty tree.
    pub fn resolve(&self, doc: &Document) -> Resolution {
        match self.primary.outline(doc) {
            Ok(nodes) if !nodes.is_empty() => {
                debug!(
                    strategy = self.primary.name(),
                    nodes = count_nodes(&nodes),
                    "outline resolved"
                );
                return Resolution {
                    nodes,
                    strategy: self.primary.name(),
                };
            }
            Ok(_) => debug!(
                strategy = self.primary.name(),
                "no symbols found, falling back"
            ),
            Err(e) => warn!(
                strategy = self.primary.name(),
                error = %e,
                "symbol lookup failed, falling back"
            ),
        }
        run_single(&self.fallback, doc)
    }
}

fn run_single(strategy: &impl OutlineStrategy, doc: &Document) -> Resolution {
    let nodes = match strategy.outline(doc) {
        Ok(nodes) => nodes,
        Err(e) => {
            warn!(strategy = strategy.name(), error = %e, "outline failed");
            Vec::new()
        }
    };
    debug!(
        strategy = strategy.name(),
        nodes = count_nodes(&nodes),
        "outline resolved"
    );
    Resolution {
        nodes,
        strategy: strategy.name(),
    }
}

// ---------------------------------------------------------------------------
// Mode selection
// ---------------------------------------------------------------------------

/// Which strategies to run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StrategyMode {
    /// Structured first, text scanning as fallback.
    #[default]
    Auto,
    /// Structured symbols only.
    Structured,
    /// Text scanning only.
    Text,
}

impl StrategyMode {
    pub fn as_str(self) -> &'static str {
        match self {
            StrategyMode::Auto => "auto",
            StrategyMode::Structured => "structured",
            StrategyMode::Text => "text",
        }
    }
}

impl fmt::Display for StrategyMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outline `doc` under `mode`, using `source` for structured symbols.
pub fn outline_document<S: SymbolSource>(
    doc: &Document,
    source: S,
    mode: StrategyMode,
) -> Resolution {
    match mode {
        StrategyMode::Auto => {
            StrategyResolver::new(StructuredStrategy::new(source), TextStrategy).resolve(doc)
        }
        StrategyMode::Structured => run_single(&StructuredStrategy::new(source), doc),
        StrategyMode::Text => run_single(&TextStrategy, doc),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
