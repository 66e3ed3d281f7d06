//! Configuration file parsing, defaults, and merging.
//!
//! Configuration is loaded in layers (last wins):
//! 1. Built-in defaults
//! 2. Global config from `~/.tsoutline/config.toml`
//! 3. Per-project config from `<project>/.tsoutline/config.toml`
//!
//! Each layer only overrides fields it explicitly sets; absent fields
//! are left at their previous value.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::resolver::StrategyMode;
use crate::sorter::SortMode;

/// Directory name holding config files, both in `$HOME` and in a project.
pub const CONFIG_DIR: &str = ".tsoutline";

// ---------------------------------------------------------------------------
// Public config types (fully resolved, no Options)
// ---------------------------------------------------------------------------

/// Top-level configuration, fully resolved with defaults applied.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Config {
    pub outline: OutlineConfig,
    pub display: DisplayConfig,
    pub watch: WatchConfig,
    /// Per-key overrides of the icon table (`class`, `private`, ...).
    pub icons: BTreeMap<String, String>,
}

/// How outlines are built and ordered.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct OutlineConfig {
    pub sort: SortMode,
    pub strategy: StrategyMode,
}

/// Text rendering settings.
#[derive(Debug, Clone, PartialEq)]
pub struct DisplayConfig {
    /// Prefix each entry with kind/visibility/modifier icons.
    pub show_icons: bool,
    /// Append a `[visibility]` label to each entry.
    pub show_visibility: bool,
    /// Color mode: `"auto"`, `"always"`, or `"never"`.
    pub color: String,
}

/// `watch` command settings.
#[derive(Debug, Clone, PartialEq)]
pub struct WatchConfig {
    /// Debounce interval in milliseconds for file-change events.
    pub debounce_ms: u64,
}

// ---------------------------------------------------------------------------
// Defaults
// ---------------------------------------------------------------------------

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            show_icons: true,
            show_visibility: false,
            color: "auto".to_string(),
        }
    }
}

impl Default for WatchConfig {
    fn default() -> Self {
        Self { debounce_ms: 300 }
    }
}

// ---------------------------------------------------------------------------
// Option-based overlay types (for partial deserialization)
// ---------------------------------------------------------------------------

/// Mirror of [`Config`] where every field is `Option`, so we can
/// deserialize a partial TOML file and overlay only the keys that are
/// present.
#[derive(Debug, Deserialize, Default)]
#[serde(default)]
struct ConfigOverlay {
    outline: Option<OutlineOverlay>,
    display: Option<DisplayOverlay>,
    watch: Option<WatchOverlay>,
    icons: Option<BTreeMap<String, String>>,
}

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
struct OutlineOverlay {
    sort: Option<SortMode>,
    strategy: Option<StrategyMode>,
}

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
struct DisplayOverlay {
    show_icons: Option<bool>,
    show_visibility: Option<bool>,
    color: Option<String>,
}

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
struct WatchOverlay {
    debounce_ms: Option<u64>,
}

// ---------------------------------------------------------------------------
// Merge helpers
// ---------------------------------------------------------------------------

impl Config {
    /// Apply an overlay on top of this config, replacing only the fields
    /// that are `Some` in the overlay. Icon overrides merge key by key.
    fn apply_overlay(&mut self, overlay: ConfigOverlay) {
        if let Some(o) = overlay.outline {
            if let Some(v) = o.sort {
                self.outline.sort = v;
            }
            if let Some(v) = o.strategy {
                self.outline.strategy = v;
            }
        }
        if let Some(d) = overlay.display {
            if let Some(v) = d.show_icons {
                self.display.show_icons = v;
            }
            if let Some(v) = d.show_visibility {
                self.display.show_visibility = v;
            }
            if let Some(v) = d.color {
                self.display.color = v;
            }
        }
        if let Some(w) = overlay.watch
            && let Some(v) = w.debounce_ms
        {
            self.watch.debounce_ms = v;
        }
        if let Some(icons) = overlay.icons {
            self.icons.extend(icons);
        }
    }
}

// ---------------------------------------------------------------------------
// Loading
// ---------------------------------------------------------------------------

/// Return the user's home directory.
fn home_dir() -> Option<PathBuf> {
    #[allow(deprecated)]
    std::env::home_dir()
}

/// Parse a TOML string into a [`ConfigOverlay`], producing a clear error
/// message on malformed input.
fn parse_overlay(contents: &str, path: &Path) -> Result<ConfigOverlay> {
    toml::from_str(contents)
        .with_context(|| format!("failed to parse config file: {}", path.display()))
}

/// Try to read a config file and parse it as an overlay.
/// Returns `Ok(None)` if the file does not exist.
fn load_overlay(path: &Path) -> Result<Option<ConfigOverlay>> {
    match std::fs::read_to_string(path) {
        Ok(contents) => {
            let overlay = parse_overlay(&contents, path)?;
            Ok(Some(overlay))
        }
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(anyhow::anyhow!(
            "failed to read config file {}: {}",
            path.display(),
            e
        )),
    }
}

impl Config {
    /// Load configuration by merging layers:
    /// defaults -> global (`~/.tsoutline/config.toml`) -> per-project
    /// (`<project>/.tsoutline/config.toml`).
    ///
    /// If `project_root` is `None`, only the global config (if any) is
    /// applied on top of defaults.
    pub fn load(project_root: Option<&Path>) -> Result<Config> {
        let global_dir = home_dir().map(|h| h.join(CONFIG_DIR));
        Self::load_with_global_dir(global_dir.as_deref(), project_root)
    }

    /// Load config with an explicit global config directory.
    ///
    /// This allows tests to supply a temporary directory instead of the
    /// real `~/.tsoutline` without mutating environment variables.
    pub fn load_with_global_dir(
        global_dir: Option<&Path>,
        project_root: Option<&Path>,
    ) -> Result<Config> {
        let mut config = Config::default();

        // Layer 2: global config
        if let Some(dir) = global_dir {
            let global_path = dir.join("config.toml");
            if let Some(overlay) = load_overlay(&global_path)? {
                config.apply_overlay(overlay);
            }
        }

        // Layer 3: per-project config
        if let Some(root) = project_root {
            let project_config_path = root.join(CONFIG_DIR).join("config.toml");
            if let Some(overlay) = load_overlay(&project_config_path)? {
                config.apply_overlay(overlay);
            }
        }

        Ok(config)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
