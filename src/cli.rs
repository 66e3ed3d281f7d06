use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::resolver::StrategyMode;
use crate::sorter::SortMode;

/// tsoutline - hierarchical declaration outlines for TypeScript files
#[derive(Parser, Debug)]
#[command(name = "tsoutline", version, about)]
pub struct Cli {
    /// Output results as JSON
    #[arg(long, global = true)]
    pub json: bool,

    /// Project directory whose .tsoutline/config.toml applies (defaults to
    /// the current directory)
    #[arg(long, global = true, value_name = "DIR")]
    pub project: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Print the outline of a file
    Show(ShowArgs),

    /// Print the outline, then print it again after every change
    Watch(ShowArgs),

    /// Show the declaration at (or closest before) a line
    Locate(LocateArgs),

    /// Dump the structured symbols of a file as JSON
    Symbols(SymbolsArgs),
}

/// Where the outline comes from.
#[derive(clap::Args, Debug)]
pub struct SourceArgs {
    /// TypeScript (.ts, .mts, .cts) or TSX (.tsx) file
    pub file: PathBuf,

    /// Outline strategy (defaults to the configured one)
    #[arg(long, value_enum)]
    pub strategy: Option<StrategyMode>,

    /// Read structured symbols from a JSON file instead of parsing the source
    #[arg(long, value_name = "JSON")]
    pub symbols: Option<PathBuf>,
}

#[derive(clap::Args, Debug)]
pub struct ShowArgs {
    #[command(flatten)]
    pub source: SourceArgs,

    /// Order of entries at every level (defaults to the configured one)
    #[arg(long, value_enum)]
    pub sort: Option<SortMode>,

    /// Prefix entries with kind, visibility and modifier icons
    #[arg(long, overrides_with = "no_icons")]
    pub icons: bool,

    /// Do not print icons
    #[arg(long = "no-icons", overrides_with = "icons")]
    pub no_icons: bool,

    /// Append a [visibility] label to every entry
    #[arg(long)]
    pub visibility: bool,
}

impl ShowArgs {
    /// Icon choice made on the command line, if any.
    pub fn icons_flag(&self) -> Option<bool> {
        if self.icons {
            Some(true)
        } else if self.no_icons {
            Some(false)
        } else {
            None
        }
    }
}

#[derive(clap::Args, Debug)]
pub struct LocateArgs {
    #[command(flatten)]
    pub source: SourceArgs,

    /// 1-based line number
    #[arg(long)]
    pub line: usize,
}

#[derive(clap::Args, Debug)]
pub struct SymbolsArgs {
    /// TypeScript (.ts, .mts, .cts) or TSX (.tsx) file
    pub file: PathBuf,
}

pub fn parse() -> Cli {
    Cli::parse()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn show_with_all_options() {
        let cli = Cli::try_parse_from([
            "tsoutline",
            "--json",
            "show",
            "src/app.ts",
            "--sort",
            "category",
            "--strategy",
            "text",
            "--no-icons",
            "--visibility",
        ])
        .unwrap();
        assert!(cli.json);
        let Command::Show(args) = cli.command else {
            panic!("expected show");
        };
        assert_eq!(args.source.file, PathBuf::from("src/app.ts"));
        assert_eq!(args.sort, Some(SortMode::Category));
        assert_eq!(args.source.strategy, Some(StrategyMode::Text));
        assert_eq!(args.icons_flag(), Some(false));
        assert!(args.visibility);
    }

    #[test]
    fn icon_flags_last_one_wins() {
        let cli = Cli::try_parse_from(["tsoutline", "show", "a.ts", "--no-icons", "--icons"])
            .unwrap();
        let Command::Show(args) = cli.command else {
            panic!("expected show");
        };
        assert_eq!(args.icons_flag(), Some(true));
    }

    #[test]
    fn defaults_leave_config_in_charge() {
        let cli = Cli::try_parse_from(["tsoutline", "watch", "a.ts"]).unwrap();
        let Command::Watch(args) = cli.command else {
            panic!("expected watch");
        };
        assert_eq!(args.sort, None);
        assert_eq!(args.source.strategy, None);
        assert_eq!(args.icons_flag(), None);
        assert!(cli.project.is_none());
    }

    #[test]
    fn locate_requires_line() {
        assert!(Cli::try_parse_from(["tsoutline", "locate", "a.ts"]).is_err());
        let cli = Cli::try_parse_from([
            "tsoutline",
            "locate",
            "a.ts",
            "--line",
            "12",
            "--symbols",
            "syms.json",
        ])
        .unwrap();
        let Command::Locate(args) = cli.command else {
            panic!("expected locate");
        };
        assert_eq!(args.line, 12);
        assert_eq!(args.source.symbols, Some(PathBuf::from("syms.json")));
    }

    #[test]
    fn unknown_sort_mode_is_rejected() {
        assert!(Cli::try_parse_from(["tsoutline", "show", "a.ts", "--sort", "size"]).is_err());
    }

    #[test]
    fn global_flags_after_subcommand() {
        let cli =
            Cli::try_parse_from(["tsoutline", "symbols", "a.ts", "--project", "/tmp/p", "--json"])
                .unwrap();
        assert!(cli.json);
        assert_eq!(cli.project, Some(PathBuf::from("/tmp/p")));
    }
}
