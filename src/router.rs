use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::cli::{Cli, Command, LocateArgs, ShowArgs, SourceArgs, SymbolsArgs};
use crate::color::resolve_color;
use crate::config::Config;
use crate::document::{Document, detect_language};
use crate::errors::{AppError, SymbolSourceError};
use crate::output::{self, DisplayOptions, Formatter, IconSet};
use crate::resolver::{Resolution, StrategyMode, outline_document};
use crate::sorter::{SortMode, sort_nodes};
use crate::symbols::{JsonSymbols, SymbolSource, TreeSitterSymbols};
use crate::types::find_at_line;
use crate::watcher::{FileEvent, FileWatcher, register_signal_handler, run_event_loop};

pub fn dispatch(cli: Cli) -> Result<(), AppError> {
    let project = match cli.project {
        Some(dir) => dir,
        None => std::env::current_dir()?,
    };
    let config = Config::load(Some(project.as_path()))?;

    match cli.command {
        Command::Show(args) => {
            let view = View::resolve(&args, &config, cli.json);
            check_symbols_file(&args.source)?;
            let mut out = std::io::stdout().lock();
            write_outline(&mut out, &args.source, &view)?;
            Ok(())
        }
        Command::Watch(args) => {
            let view = View::resolve(&args, &config, cli.json);
            check_symbols_file(&args.source)?;
            cmd_watch(&args.source, &view, config.watch.debounce_ms)
        }
        Command::Locate(args) => {
            let strategy = args.source.strategy.unwrap_or(config.outline.strategy);
            check_symbols_file(&args.source)?;
            let mut out = std::io::stdout().lock();
            write_located(&mut out, &args, strategy, cli.json)
        }
        Command::Symbols(args) => {
            let mut out = std::io::stdout().lock();
            write_symbols(&mut out, &args, cli.json)
        }
    }
}

// ---------------------------------------------------------------------------
// Settings
// ---------------------------------------------------------------------------

/// Everything `show` and `watch` need to render, with CLI flags applied on
/// top of the loaded config.
struct View {
    strategy: StrategyMode,
    sort: SortMode,
    display: DisplayOptions,
    icons: IconSet,
    color: bool,
    json: bool,
}

impl View {
    fn resolve(args: &ShowArgs, config: &Config, json: bool) -> Self {
        Self {
            strategy: args.source.strategy.unwrap_or(config.outline.strategy),
            sort: args.sort.unwrap_or(config.outline.sort),
            display: DisplayOptions {
                icons: args.icons_flag().unwrap_or(config.display.show_icons),
                visibility: args.visibility || config.display.show_visibility,
            },
            icons: IconSet::with_overrides(&config.icons),
            color: !json && resolve_color(&config.display.color),
            json,
        }
    }
}

// ---------------------------------------------------------------------------
// Outline building
// ---------------------------------------------------------------------------

/// Open `path`, refusing anything that is not TypeScript or TSX.
fn open_document(path: &Path) -> Result<Document, AppError> {
    if detect_language(path).is_none() {
        return Err(SymbolSourceError::Unsupported.into());
    }
    Ok(Document::open(path)?)
}

/// Validate a `--symbols` file once before any outline is built.
fn check_symbols_file(source: &SourceArgs) -> Result<(), AppError> {
    if let Some(path) = &source.symbols {
        let text = std::fs::read_to_string(path).map_err(SymbolSourceError::from)?;
        JsonSymbols::parse(&text)?;
    }
    Ok(())
}

fn build_outline(source: &SourceArgs, mode: StrategyMode) -> Result<Resolution, AppError> {
    let doc = open_document(&source.file)?;
    let resolution = match &source.symbols {
        Some(path) => outline_document(&doc, JsonSymbols::new(path), mode),
        None => outline_document(&doc, TreeSitterSymbols, mode),
    };
    debug!(
        file = %source.file.display(),
        strategy = resolution.strategy,
        roots = resolution.nodes.len(),
        "outline built"
    );
    Ok(resolution)
}

fn write_outline<W: Write>(out: W, source: &SourceArgs, view: &View) -> Result<(), AppError> {
    let resolution = build_outline(source, view.strategy)?;
    let nodes = sort_nodes(&resolution.nodes, view.sort);
    if nodes.is_empty() {
        output::print_hint("no declarations found", view.json);
        return Ok(());
    }
    let mut fmt =
        Formatter::new(out, view.json, view.color).with_display(view.display, view.icons.clone());
    fmt.format_outline(&nodes)?;
    Ok(())
}

// ---------------------------------------------------------------------------
// Commands
// ---------------------------------------------------------------------------

fn cmd_watch(source: &SourceArgs, view: &View, debounce_ms: u64) -> Result<(), AppError> {
    write_outline(std::io::stdout().lock(), source, view)?;

    let (watcher, rx) = FileWatcher::new(&source.file, debounce_ms)?;
    let file: PathBuf = source.file.clone();
    let shutdown = register_signal_handler()?;

    run_event_loop(&rx, &shutdown, |events| {
        if let Some(FileEvent::Removed(_)) = events.last() {
            output::print_hint(
                &format!("{} was removed; waiting for it to reappear", file.display()),
                view.json,
            );
            return;
        }
        if !view.json {
            output::print_header(&format!("--- {} ---", file.display()));
        }
        if let Err(e) = write_outline(std::io::stdout().lock(), source, view) {
            output::format_error(&e, view.json);
        }
    });

    debug!(file = %file.display(), "watch stopped");
    drop(watcher);
    Ok(())
}

fn write_located<W: Write>(
    out: W,
    args: &LocateArgs,
    strategy: StrategyMode,
    json: bool,
) -> Result<(), AppError> {
    if args.line == 0 {
        return Err(AppError::Usage("--line is 1-based; 0 is not a line".into()));
    }
    let resolution = build_outline(&args.source, strategy)?;
    match find_at_line(&resolution.nodes, args.line - 1) {
        Some(node) => {
            Formatter::new(out, json, false).format_located(node)?;
        }
        None => output::print_hint(
            &format!("no declaration at or before line {}", args.line),
            json,
        ),
    }
    Ok(())
}

fn write_symbols<W: Write>(out: W, args: &SymbolsArgs, json: bool) -> Result<(), AppError> {
    let doc = open_document(&args.file)?;
    let descriptors = TreeSitterSymbols.document_symbols(&doc)?;
    Formatter::new(out, json, false).format_descriptors(&descriptors)?;
    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
