//! Hierarchical declaration outlines for TypeScript source files.
//!
//! The outline engine turns a [`document::Document`] into a tree of
//! [`types::OutlineNode`]s, preferring structured symbols
//! ([`symbols::SymbolSource`]) and falling back to line-oriented text
//! scanning ([`fallback::TextFallbackParser`]) when they are unavailable.

pub mod cli;
pub mod color;
pub mod config;
pub mod convert;
pub mod document;
pub mod errors;
pub mod fallback;
pub mod lexer;
pub mod output;
pub mod prefix;
pub mod resolver;
pub mod router;
pub mod sorter;
pub mod symbols;
pub mod types;
pub mod watcher;
