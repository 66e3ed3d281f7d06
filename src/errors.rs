//! Application error types and user-facing error formatting.
//!
//! Provides structured error types for the outline pipeline:
//! - [`SymbolSourceError`] for structured symbol lookups (enables fallback
//!   decisions in [`crate::resolver::StrategyResolver`])
//! - [`AppError`] as the unified top-level error type of the CLI shell
//!
//! The [`AppError`] type carries contextual hints and exit codes so that
//! `main()` can present human-readable diagnostics on stderr without ever
//! exposing raw panics or debug formatting.

use thiserror::Error;

// ---------------------------------------------------------------------------
// Exit codes
// ---------------------------------------------------------------------------

/// Process exit codes.
///
/// * `0` - success
/// * `1` - general runtime error
/// * `2` - usage / argument error (bad CLI invocation)
pub const EXIT_SUCCESS: i32 = 0;
pub const EXIT_ERROR: i32 = 1;
pub const EXIT_USAGE: i32 = 2;

// ---------------------------------------------------------------------------
// Layer-specific error types
// ---------------------------------------------------------------------------

/// Errors arising from a structured symbol source.
///
/// None of these are fatal inside the outline engine: the resolver logs
/// them and falls back to text scanning.
#[derive(Error, Debug)]
pub enum SymbolSourceError {
    /// The document has no language the source understands.
    #[error("no symbol provider for this document")]
    Unsupported,

    /// The tree-sitter grammar could not be loaded.
    #[error("failed to load grammar: {0}")]
    Grammar(String),

    /// The parser gave up without producing a syntax tree.
    #[error("parser produced no syntax tree")]
    ParseFailed,

    /// Reading an external descriptor file failed.
    #[error("failed to read symbols: {0}")]
    Io(#[from] std::io::Error),

    /// An external descriptor file is not valid descriptor JSON.
    #[error("malformed symbol descriptors: {0}")]
    Malformed(#[from] serde_json::Error),
}

// ---------------------------------------------------------------------------
// Unified application error
// ---------------------------------------------------------------------------

/// Unified error type for the CLI shell.
#[derive(Error, Debug)]
pub enum AppError {
    #[error(transparent)]
    Source(#[from] SymbolSourceError),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// A usage / argument error (exit code 2).
    #[error("{0}")]
    Usage(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl AppError {
    /// Return the appropriate process exit code for this error.
    pub fn exit_code(&self) -> i32 {
        match self {
            AppError::Usage(_) => EXIT_USAGE,
            _ => EXIT_ERROR,
        }
    }

    /// Return an optional human-readable hint that may help the user fix
    /// the problem.  Returns `None` when no specific guidance applies.
    pub fn hint(&self) -> Option<&'static str> {
        match self {
            AppError::Source(SymbolSourceError::Unsupported) => {
                Some("only .ts, .mts, .cts and .tsx files can be outlined")
            }
            AppError::Source(SymbolSourceError::Malformed(_)) => {
                Some("symbol files must be a JSON array of {kind, name, startLine} objects")
            }
            AppError::Io(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Some("verify the file exists")
            }
            AppError::Io(e) if e.kind() == std::io::ErrorKind::PermissionDenied => {
                Some("check file permissions")
            }
            AppError::Usage(_) => Some("run `tsoutline --help` for usage"),
            AppError::Other(e) => match e.downcast_ref::<std::io::Error>() {
                Some(io) if io.kind() == std::io::ErrorKind::NotFound => {
                    Some("verify the file exists")
                }
                _ => None,
            },
            _ => None,
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
