//! Command line argument parsing for the arancel CLI using clap.

use std::path::PathBuf;

use chrono::NaiveDate;
use clap::{Parser, Subcommand, ValueEnum};
use serde::{Deserialize, Serialize};

/// Arancel - tariff nomenclature search and import pre-validation
#[derive(Parser, Debug, Clone)]
#[command(name = "arancel")]
#[command(about = "Search a customs tariff nomenclature by code or description")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(long_about = None)]
pub struct ArancelArgs {
    /// Verbosity level (0=quiet, 1=normal, 2=verbose, 3=debug)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Quiet mode (overrides verbose)
    #[arg(short, long)]
    pub quiet: bool,

    /// Output format
    #[arg(short = 'f', long = "format", default_value = "human")]
    pub output_format: OutputFormat,

    /// Pretty-print JSON output
    #[arg(long)]
    pub pretty: bool,

    /// Configuration file (JSON)
    #[arg(long, env = "ARANCEL_CONFIG", value_name = "CONFIG_FILE")]
    pub config: Option<PathBuf>,

    /// Catalog snapshot, overriding the configured one
    #[arg(short = 'c', long, value_name = "CATALOG_FILE")]
    pub catalog: Option<PathBuf>,

    /// User name recorded in the audit trail
    #[arg(short, long, env = "ARANCEL_USER", default_value = "cli")]
    pub user: String,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Command,
}

impl ArancelArgs {
    /// Get the effective verbosity level
    pub fn verbosity(&self) -> u8 {
        if self.quiet {
            0
        } else {
            match self.verbose {
                0 => 1, // Default to normal
                n => n,
            }
        }
    }
}

/// Available CLI commands
#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Search by code or description
    Search(SearchArgs),

    /// Ranked type-ahead candidates
    Complete(CompleteArgs),

    /// Spell-correct a query against the catalog vocabulary
    Correct(CorrectArgs),

    /// Show the synonyms of a term or query
    Synonyms(SynonymsArgs),

    /// Show the import requirements of a subheading
    Permits(PermitsArgs),

    /// Browse the audit trail
    History(HistoryArgs),

    /// Show catalog statistics
    Stats(StatsArgs),

    /// Check catalog data quality
    Check(CheckArgs),
}

/// Arguments for searching
#[derive(Parser, Debug, Clone)]
pub struct SearchArgs {
    /// Query string (code or description)
    #[arg(value_name = "QUERY")]
    pub query: String,
}

/// Arguments for completion
#[derive(Parser, Debug, Clone)]
pub struct CompleteArgs {
    /// Query prefix or fragment
    #[arg(value_name = "QUERY")]
    pub query: String,

    /// Maximum number of candidates to show
    #[arg(short, long)]
    pub limit: Option<usize>,
}

/// Arguments for spelling correction
#[derive(Parser, Debug, Clone)]
pub struct CorrectArgs {
    /// Text to correct
    #[arg(value_name = "TEXT")]
    pub text: String,
}

/// Arguments for synonym lookup
#[derive(Parser, Debug, Clone)]
pub struct SynonymsArgs {
    /// Term or query
    #[arg(value_name = "TERM")]
    pub term: String,

    /// Expand each word of the input separately
    #[arg(short, long)]
    pub words: bool,
}

/// Arguments for permit lookup
#[derive(Parser, Debug, Clone)]
pub struct PermitsArgs {
    /// Subheading code, with or without dots
    #[arg(value_name = "CODE")]
    pub code: String,

    /// Evaluate validity on this date (YYYY-MM-DD) instead of today
    #[arg(long, value_name = "DATE")]
    pub on: Option<NaiveDate>,
}

/// Arguments for browsing the audit trail
#[derive(Parser, Debug, Clone)]
pub struct HistoryArgs {
    /// First day included (YYYY-MM-DD)
    #[arg(long, value_name = "DATE")]
    pub from: Option<NaiveDate>,

    /// Last day included (YYYY-MM-DD)
    #[arg(long, value_name = "DATE")]
    pub to: Option<NaiveDate>,

    /// Outcome (section, chapter, heading, subheading, multiple, none)
    #[arg(long)]
    pub outcome: Option<String>,

    /// Fragment of the query or the user name
    #[arg(short, long)]
    pub keyword: Option<String>,

    /// Only events of this user
    #[arg(long = "by", value_name = "USER")]
    pub by_user: Option<String>,

    /// Maximum number of events to show
    #[arg(short, long, default_value = "50")]
    pub limit: usize,
}

/// Arguments for statistics
#[derive(Parser, Debug, Clone)]
pub struct StatsArgs {
    /// Include duty rate statistics per chapter
    #[arg(short, long)]
    pub rates: bool,
}

/// Arguments for the data quality check
#[derive(Parser, Debug, Clone)]
pub struct CheckArgs {
    /// Exit with an error when issues are found
    #[arg(long)]
    pub strict: bool,
}

/// Output formats for CLI
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Human-readable output
    Human,
    /// JSON output
    Json,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[test]
    fn test_basic_search_command() {
        let args = ArancelArgs::try_parse_from([
            "arancel",
            "--catalog",
            "/data/catalog.json",
            "search",
            "0101.21.00.00",
        ])
        .unwrap();

        assert_eq!(args.catalog, Some(PathBuf::from("/data/catalog.json")));
        if let Command::Search(search_args) = args.command {
            assert_eq!(search_args.query, "0101.21.00.00");
        } else {
            panic!("Expected Search command");
        }
    }

    #[test]
    fn test_permits_command_with_date() {
        let args =
            ArancelArgs::try_parse_from(["arancel", "permits", "0101210000", "--on", "2025-06-01"])
                .unwrap();

        if let Command::Permits(permit_args) = args.command {
            assert_eq!(permit_args.code, "0101210000");
            assert_eq!(permit_args.on, NaiveDate::from_ymd_opt(2025, 6, 1));
        } else {
            panic!("Expected Permits command");
        }
    }

    #[test]
    fn test_history_filters() {
        let args = ArancelArgs::try_parse_from([
            "arancel",
            "history",
            "--from",
            "2025-01-01",
            "--outcome",
            "none",
            "--by",
            "ana",
            "--limit",
            "5",
        ])
        .unwrap();

        if let Command::History(history_args) = args.command {
            assert_eq!(history_args.from, NaiveDate::from_ymd_opt(2025, 1, 1));
            assert_eq!(history_args.outcome.as_deref(), Some("none"));
            assert_eq!(history_args.by_user.as_deref(), Some("ana"));
            assert_eq!(history_args.limit, 5);
        } else {
            panic!("Expected History command");
        }
    }

    #[test]
    fn test_verbosity_levels() {
        // Default verbosity
        let args = ArancelArgs::try_parse_from(["arancel", "stats"]).unwrap();
        assert_eq!(args.verbosity(), 1);

        // Multiple verbose flags
        let args = ArancelArgs::try_parse_from(["arancel", "-vv", "stats"]).unwrap();
        assert_eq!(args.verbosity(), 2);

        // Quiet flag
        let args = ArancelArgs::try_parse_from(["arancel", "--quiet", "stats"]).unwrap();
        assert_eq!(args.verbosity(), 0);
    }

    #[test]
    fn test_output_format() {
        let args = ArancelArgs::try_parse_from(["arancel", "--format", "json", "check"]).unwrap();
        assert_eq!(args.output_format, OutputFormat::Json);
        assert!(ArancelArgs::try_parse_from(["arancel", "--format", "yaml", "check"]).is_err());
    }
}
