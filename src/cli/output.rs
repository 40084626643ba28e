//! Output formatting for CLI commands.

use serde::{Deserialize, Serialize};

use crate::audit::AuditEvent;
use crate::catalog::{Level, Requirement};
use crate::cli::args::{ArancelArgs, OutputFormat};
use crate::error::Result;
use crate::permits::PermitRequirements;
use crate::search::{ResultsPage, ScoredCandidate, SearchOutcome};
use crate::spelling::Correction;
use crate::stats::{CatalogCounts, RateStatistics};

/// Result structure for the stats command.
#[derive(Debug, Serialize, Deserialize)]
pub struct StatsReport {
    pub counts: CatalogCounts,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rates: Option<Vec<RateStatistics>>,
}

/// One row flagged by the data quality check.
#[derive(Debug, Serialize, Deserialize)]
pub struct CheckIssue {
    pub level: Level,
    pub id: u32,
    pub code: String,
    pub problem: String,
}

/// Result structure for the check command.
#[derive(Debug, Serialize, Deserialize)]
pub struct CheckReport {
    pub counts: CatalogCounts,
    pub descriptive_rows: usize,
    pub issues: Vec<CheckIssue>,
}

/// Result structure for the synonyms command.
#[derive(Debug, Serialize, Deserialize)]
pub struct SynonymReport {
    pub term: String,
    pub direct: Vec<String>,
    pub expanded: Vec<String>,
}

/// Output a result in the selected format.
///
/// JSON output is the same for every command; human output is delegated to
/// `human`.
pub fn output_result<T, F>(result: &T, args: &ArancelArgs, human: F) -> Result<()>
where
    T: Serialize,
    F: FnOnce(&T),
{
    match args.output_format {
        OutputFormat::Human => {
            human(result);
            Ok(())
        }
        OutputFormat::Json => output_json(result, args),
    }
}

/// Output in JSON format.
fn output_json<T: Serialize>(result: &T, args: &ArancelArgs) -> Result<()> {
    let json = if args.pretty {
        serde_json::to_string_pretty(result)?
    } else {
        serde_json::to_string(result)?
    };

    println!("{json}");
    Ok(())
}

pub fn print_outcome(outcome: &SearchOutcome) {
    match outcome {
        SearchOutcome::Empty => println!("Empty query."),
        SearchOutcome::Redirect(resolution) => {
            println!(
                "→ {} {}",
                resolution.level.label(),
                format_code(resolution.code.as_deref())
            );
            println!("  {}", resolution.text);
            if let Some(highlight) = resolution.highlight {
                println!("  (row {highlight} highlighted)");
            }
            if resolution.matched_id != resolution.id || resolution.matched_level != resolution.level {
                println!(
                    "  matched {} #{}",
                    resolution.matched_level.label(),
                    resolution.matched_id
                );
            }
        }
        SearchOutcome::Results(page) => print_results_page(page),
    }
}

fn print_results_page(page: &ResultsPage) {
    if let Some(corrected) = &page.corrected_query {
        println!("Showing results for '{}' (searched '{}')", corrected, page.query);
        for correction in &page.corrections {
            println!("  {} → {}", correction.original, correction.corrected);
        }
        println!();
    }

    if !page.synonym_terms.is_empty() {
        println!("Synonyms: {}", page.synonym_terms.join(", "));
        println!();
    }

    if !page.matches.is_empty() {
        println!("Results ({}):", page.matches.len());
        println!("═══════════════");
        print_candidates(&page.matches);
    }

    if !page.code_suggestions.is_empty() {
        println!("Did you mean one of these codes?");
        print_candidates(&page.code_suggestions);
    }

    if !page.description_suggestions.is_empty() {
        println!("Similar descriptions:");
        print_candidates(&page.description_suggestions);
    }

    if page.is_empty() {
        println!("No results for '{}'.", page.query);
    }
}

pub fn print_candidates(candidates: &[ScoredCandidate]) {
    for candidate in candidates {
        let mut markers = String::new();
        if candidate.is_synonym_match {
            markers.push_str(" [synonym]");
        }
        if candidate.is_correction {
            markers.push_str(" [correction]");
        }
        println!(
            "  {:.3}  {:<10} {:<15} {}{}",
            candidate.score,
            candidate.level.label(),
            format_code(candidate.code.as_deref()),
            candidate.text,
            markers
        );
        if let Some(title) = &candidate.title_context {
            println!("  {:>44}{}", "", title);
        }
    }
}

pub fn print_correction(correction: &Correction) {
    println!("{}", correction.corrected);
    for word in &correction.corrections {
        println!("  {} → {} ({:?})", word.original, word.corrected, word.source);
    }
}

pub fn print_synonyms(report: &SynonymReport) {
    println!("{}", report.term);
    if report.direct.is_empty() {
        println!("  no direct synonyms");
    } else {
        println!("  direct:   {}", report.direct.join(", "));
    }
    println!("  expanded: {}", report.expanded.join(", "));
}

pub fn print_permits(requirements: &PermitRequirements) {
    println!("{}  {}", requirements.code, requirements.description);
    println!(
        "  in force: {}",
        if requirements.in_force { "yes" } else { "no" }
    );
    print_requirement("permit", &requirements.permit);
    print_requirement("license", &requirements.license);
    print_requirement("quota", &requirements.quota);
    for (label, value) in [
        ("document type", &requirements.document_type),
        ("issued by", &requirements.issuing_authority),
        ("legal provision", &requirements.legal_provision),
        ("instructions", &requirements.validation_instructions),
    ] {
        if let Some(value) = value {
            println!("  {label}: {value}");
        }
    }
}

fn print_requirement(label: &str, requirement: &Requirement) {
    if !requirement.required {
        println!("  {label}: not required");
        return;
    }
    println!("  {label}: required ({:?})", requirement.status);
    if let Some(detail) = &requirement.detail {
        println!("    {detail}");
    }
    if let Some(entity) = &requirement.entity {
        println!("    issued by {entity}");
    }
}

pub fn print_history(events: &[AuditEvent]) {
    if events.is_empty() {
        println!("No events.");
        return;
    }
    for event in events {
        println!(
            "{}  {:<12} {:<13} {:<10} {:>3}  {}",
            event.timestamp.format("%Y-%m-%d %H:%M:%S"),
            event.user,
            event.action.as_str(),
            event.outcome.as_str(),
            event.result_count,
            event.query
        );
    }
}

pub fn print_stats(report: &StatsReport) {
    print_counts(&report.counts);
    if let Some(rates) = &report.rates {
        println!();
        println!("GA per chapter:");
        for rate in rates {
            println!(
                "  {:<4} avg {:>6.2}  min {:>6.2}  max {:>6.2}  ({} subheadings)  {}",
                rate.chapter_code, rate.average_ga, rate.min_ga, rate.max_ga, rate.count, rate.chapter_name
            );
        }
    }
}

pub fn print_check(report: &CheckReport) {
    print_counts(&report.counts);
    println!("Title rows: {}", report.descriptive_rows);
    if report.issues.is_empty() {
        println!("No issues found.");
        return;
    }
    println!("Issues ({}):", report.issues.len());
    for issue in &report.issues {
        println!(
            "  {} #{} '{}': {}",
            issue.level.label(),
            issue.id,
            issue.code,
            issue.problem
        );
    }
}

fn print_counts(counts: &CatalogCounts) {
    println!("Sections:    {}", counts.sections);
    println!("Chapters:    {}", counts.chapters);
    println!("Headings:    {}", counts.headings);
    println!("Subheadings: {}", counts.subheadings);
}

fn format_code(code: Option<&str>) -> String {
    code.unwrap_or("-").to_string()
}
