//! Command implementations for the arancel CLI.

use std::sync::Arc;

use crate::audit::{HistoryFilter, OutcomeKind};
use crate::catalog::{CatalogSource, InMemoryCatalog, Level, validate_code};
use crate::cli::args::*;
use crate::cli::output::*;
use crate::config::ArancelConfig;
use crate::error::{ArancelError, Result};
use crate::permits::PermitLookup;
use crate::stats::{CatalogCounts, RateStatistics};
use crate::synonym::SynonymExpander;

/// Execute a CLI command.
pub fn execute_command(args: ArancelArgs) -> Result<()> {
    let config = load_config(&args)?;

    match &args.command {
        Command::Search(search_args) => search(search_args, &config, &args),
        Command::Complete(complete_args) => complete(complete_args, &config, &args),
        Command::Correct(correct_args) => correct(correct_args, &config, &args),
        Command::Synonyms(synonym_args) => synonyms(synonym_args, &config, &args),
        Command::Permits(permit_args) => permits(permit_args, &config, &args),
        Command::History(history_args) => history(history_args, &config, &args),
        Command::Stats(stats_args) => stats(stats_args, &config, &args),
        Command::Check(check_args) => check(check_args, &config, &args),
    }
}

/// Configuration file if given, defaults otherwise, then flag overrides.
fn load_config(args: &ArancelArgs) -> Result<ArancelConfig> {
    let mut config = match &args.config {
        Some(path) => {
            log::info!("Loading configuration from {}", path.display());
            ArancelConfig::load_from_file(path)?
        }
        None => ArancelConfig::default(),
    };
    if let Some(catalog) = &args.catalog {
        config.catalog_path = catalog.clone();
    }
    Ok(config)
}

fn load_catalog(config: &ArancelConfig) -> Result<InMemoryCatalog> {
    let catalog = config.load_catalog()?;
    log::info!(
        "Loaded catalog {} ({} subheadings)",
        config.catalog_path.display(),
        catalog.len(Level::Subheading)
    );
    Ok(catalog)
}

fn search(args: &SearchArgs, config: &ArancelConfig, cli_args: &ArancelArgs) -> Result<()> {
    let orchestrator = config.orchestrator()?;
    let outcome = orchestrator.search(&cli_args.user, &args.query)?;
    output_result(&outcome, cli_args, print_outcome)
}

fn complete(args: &CompleteArgs, config: &ArancelConfig, cli_args: &ArancelArgs) -> Result<()> {
    let orchestrator = config.orchestrator()?;
    let mut candidates = orchestrator.complete(&args.query)?;
    if let Some(limit) = args.limit {
        candidates.truncate(limit);
    }
    output_result(&candidates, cli_args, |c| print_candidates(c))
}

fn correct(args: &CorrectArgs, config: &ArancelConfig, cli_args: &ArancelArgs) -> Result<()> {
    let catalog = load_catalog(config)?;
    let corrector = config.corrector()?;
    // Report correction faults instead of hiding them behind the original text
    let correction = corrector
        .correct_text(&args.text, &catalog)
        .map_err(|e| ArancelError::other(e.to_string()))?;
    output_result(&correction, cli_args, print_correction)
}

fn synonyms(args: &SynonymsArgs, config: &ArancelConfig, cli_args: &ArancelArgs) -> Result<()> {
    let expander = SynonymExpander::new(config.thesaurus()?);
    let expanded = if args.words {
        expander.expand_query(&args.term)
    } else {
        expander.expand(&args.term)
    };
    let report = SynonymReport {
        term: args.term.trim().to_string(),
        direct: expander.direct(&args.term),
        expanded,
    };
    output_result(&report, cli_args, print_synonyms)
}

fn permits(args: &PermitsArgs, config: &ArancelConfig, cli_args: &ArancelArgs) -> Result<()> {
    let catalog = load_catalog(config)?;
    let lookup = PermitLookup::new(Arc::new(catalog), config.audit_sink());
    let requirements = match args.on {
        Some(date) => lookup.lookup_on(&cli_args.user, &args.code, date)?,
        None => lookup.lookup(&cli_args.user, &args.code)?,
    };
    output_result(&requirements, cli_args, print_permits)
}

fn history(args: &HistoryArgs, config: &ArancelConfig, cli_args: &ArancelArgs) -> Result<()> {
    if config.audit_path.is_none() {
        log::warn!("No audit path configured; the history is empty");
    }

    let mut filter = HistoryFilter::new();
    filter.from = args.from;
    filter.to = args.to;
    filter.keyword = args.keyword.clone();
    filter.user = args.by_user.clone();
    if let Some(outcome) = &args.outcome {
        filter.outcome = Some(
            OutcomeKind::parse(outcome)
                .ok_or_else(|| ArancelError::other(format!("unknown outcome '{outcome}'")))?,
        );
    }

    let mut events = filter.apply(config.audit_sink().history()?);
    events.truncate(args.limit);
    output_result(&events, cli_args, |e| print_history(e))
}

fn stats(args: &StatsArgs, config: &ArancelConfig, cli_args: &ArancelArgs) -> Result<()> {
    let catalog = load_catalog(config)?;
    let report = StatsReport {
        counts: CatalogCounts::collect(&catalog)?,
        rates: if args.rates {
            Some(RateStatistics::collect(&catalog)?)
        } else {
            None
        },
    };
    output_result(&report, cli_args, print_stats)
}

fn check(args: &CheckArgs, config: &ArancelConfig, cli_args: &ArancelArgs) -> Result<()> {
    let catalog = load_catalog(config)?;
    let report = check_catalog(&catalog)?;
    output_result(&report, cli_args, print_check)?;

    if args.strict && !report.issues.is_empty() {
        return Err(ArancelError::catalog(format!(
            "{} data quality issues",
            report.issues.len()
        )));
    }
    Ok(())
}

/// Data quality report of a catalog.
///
/// Flags subheadings that duplicate a heading line, real subheading codes
/// that are malformed, and subheadings whose heading does not exist.
pub fn check_catalog(catalog: &InMemoryCatalog) -> Result<CheckReport> {
    let mut issues: Vec<CheckIssue> = catalog
        .find_heading_shadows()
        .into_iter()
        .map(|sub| CheckIssue {
            level: Level::Subheading,
            id: sub.id,
            code: sub.code.clone(),
            problem: "same code as a heading".to_string(),
        })
        .collect();

    let mut descriptive_rows = 0;
    for sub in &catalog.snapshot().subheadings {
        if sub.is_descriptive() {
            descriptive_rows += 1;
        } else if let Err(e) = validate_code(&sub.code) {
            issues.push(CheckIssue {
                level: Level::Subheading,
                id: sub.id,
                code: sub.code.clone(),
                problem: e.to_string(),
            });
        }
        if catalog.get(Level::Heading, sub.heading_id)?.is_none() {
            issues.push(CheckIssue {
                level: Level::Subheading,
                id: sub.id,
                code: sub.code.clone(),
                problem: format!("heading {} does not exist", sub.heading_id),
            });
        }
    }

    Ok(CheckReport {
        counts: CatalogCounts::collect(catalog)?,
        descriptive_rows,
        issues,
    })
}
