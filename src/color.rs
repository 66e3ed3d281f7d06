//! Color resolution and the ANSI palette used for outline entries.
//!
//! Priority chain (highest first):
//! 1. `NO_COLOR` env (any value) → false
//! 2. `CLICOLOR_FORCE=1` env → true
//! 3. Config `"always"` or `"true"` → true
//! 4. Config `"never"` or `"false"` → false
//! 5. `CLICOLOR=0` env → false
//! 6. TTY detection on stdout → true if terminal, false otherwise

use crate::types::{NodeKind, Visibility};

// ---------------------------------------------------------------------------
// ANSI escape constants
// ---------------------------------------------------------------------------
//
// Containers are bold so the hierarchy stays readable without color.

/// Reset all attributes.
pub const RESET: &str = "\x1b[0m";
/// Classes and interfaces: blue + bold.
pub const CONTAINER: &str = "\x1b[34m\x1b[1m";
/// Constructors, methods, accessors, functions: yellow.
pub const CALLABLE: &str = "\x1b[33m";
/// Properties: cyan.
pub const PROPERTY: &str = "\x1b[36m";
/// Line numbers: green.
pub const LINE_NO: &str = "\x1b[32m";
/// Visibility labels and other secondary text: dim.
pub const DIM: &str = "\x1b[2m";

/// Palette entry for a node kind.
pub fn kind_color(kind: NodeKind) -> &'static str {
    match kind {
        NodeKind::Class | NodeKind::Interface => CONTAINER,
        NodeKind::Property => PROPERTY,
        NodeKind::Constructor
        | NodeKind::Method
        | NodeKind::Function
        | NodeKind::Getter
        | NodeKind::Setter => CALLABLE,
    }
}

/// Palette entry for a `[visibility]` label. Public members are dimmed.
pub fn visibility_color(visibility: Visibility) -> &'static str {
    match visibility {
        Visibility::Public => DIM,
        Visibility::Private | Visibility::Protected => RESET,
    }
}

// ---------------------------------------------------------------------------
// Color resolution
// ---------------------------------------------------------------------------

/// Resolve whether to use color based on environment variables, config, and TTY.
pub fn resolve_color(config_color: &str) -> bool {
    let no_color = std::env::var_os("NO_COLOR").is_some();
    let clicolor_force = std::env::var("CLICOLOR_FORCE").ok();
    let clicolor = std::env::var("CLICOLOR").ok();
    let is_tty = {
        use std::io::IsTerminal;
        std::io::stdout().is_terminal()
    };
    resolve_color_inner(
        no_color,
        clicolor_force.as_deref(),
        config_color,
        clicolor.as_deref(),
        is_tty,
    )
}

/// Inner resolution logic, fully parameterized for testability.
pub fn resolve_color_inner(
    no_color: bool,
    clicolor_force: Option<&str>,
    config_color: &str,
    clicolor: Option<&str>,
    is_tty: bool,
) -> bool {
    if no_color {
        return false;
    }
    if clicolor_force == Some("1") {
        return true;
    }
    match config_color {
        "always" | "true" => return true,
        "never" | "false" => return false,
        _ => {} // "auto" or unrecognized
    }
    if clicolor == Some("0") {
        return false;
    }
    is_tty
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
