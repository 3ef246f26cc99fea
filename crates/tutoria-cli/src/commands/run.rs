//! The `tutoria run` command.

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};

use tutoria_core::config::load_config_from;
use tutoria_core::engine::{ProgressReporter, ScenarioEngine};
use tutoria_core::marketplace::Marketplace;
use tutoria_core::report::{EventOutcome, RunReport};
use tutoria_core::scenario::{self, ScenarioEvent};
use tutoria_store::FileStore;

/// Console progress reporter.
struct ConsoleReporter;

impl ProgressReporter for ConsoleReporter {
    fn on_event_start(&self, index: usize, total: usize, event: &ScenarioEvent) {
        eprintln!("  [{}/{}] {event}", index + 1, total);
    }

    fn on_event_complete(&self, outcome: &EventOutcome) {
        match (&outcome.error, &outcome.detail) {
            (Some(err), _) => eprintln!("    FAIL ({}): {}", err.kind, err.message),
            (None, Some(detail)) => eprintln!("    OK: {detail}"),
            (None, None) => {}
        }
    }

    fn on_run_complete(&self, total: usize, failed: usize, elapsed: Duration) {
        eprintln!(
            "\nComplete: {}/{total} steps succeeded, {failed} failed ({:.1}ms)",
            total - failed,
            elapsed.as_secs_f64() * 1000.0
        );
    }
}

pub fn execute(
    scenario_path: PathBuf,
    config_path: Option<PathBuf>,
    json: bool,
    output: Option<PathBuf>,
    save: bool,
) -> Result<()> {
    let config = load_config_from(config_path.as_deref())?;
    let scenario = scenario::parse_scenario(&scenario_path)?;

    for warning in scenario::validate_scenario(&scenario) {
        eprintln!("Warning: {warning}");
    }

    eprintln!(
        "tutoria v{}: running scenario '{}' ({} students, {} events)",
        env!("CARGO_PKG_VERSION"),
        scenario.name,
        scenario.students.len(),
        scenario.events.len()
    );
    eprintln!();

    let engine = ScenarioEngine::new(config.clone());
    let mut market = Marketplace::new(&config).context("invalid marketplace configuration")?;
    let report = engine.run_on(&mut market, &scenario, &ConsoleReporter);

    if json {
        let json = serde_json::to_string_pretty(&report).context("failed to serialize report")?;
        println!("{json}");
    } else {
        print_summary(&report);
    }

    if let Some(dir) = output {
        std::fs::create_dir_all(&dir)
            .with_context(|| format!("failed to create output directory {}", dir.display()))?;
        let timestamp = chrono::Utc::now().format("%Y-%m-%dT%H%M%S");
        let path = dir.join(format!("report-{timestamp}.json"));
        report.save_json(&path)?;
        tracing::debug!(report = %report.id, path = %path.display(), "run report written");
        eprintln!("Report saved to: {}", path.display());
    }

    if save {
        let store = FileStore::new(&config.data_dir);
        market.save(&store)?;
        eprintln!("Listings saved to: {}", store.dir().display());
    }

    Ok(())
}

fn print_summary(report: &RunReport) {
    use comfy_table::{Cell, Table};

    let mut table = Table::new();
    table.set_header(vec!["Tutor", "Email", "Subjects", "Rating", "Tier", "Balance"]);

    for tutor in &report.tutors {
        let subjects = tutor
            .subjects
            .iter()
            .map(|(subject, level)| format!("{subject} ({level})"))
            .collect::<Vec<_>>()
            .join(", ");
        table.add_row(vec![
            Cell::new(&tutor.name),
            Cell::new(&tutor.email),
            Cell::new(subjects),
            Cell::new(format!("{:.2}", tutor.rating)),
            Cell::new(tutor.tier),
            Cell::new(tutor.balance_cents),
        ]);
    }

    println!("{table}");

    for m in &report.matches {
        let tutor = m.tutor_email.as_deref().unwrap_or("no tutor available");
        println!("Request #{} ({}): {tutor}", m.event_index + 1, m.request);
    }
    println!("Platform revenue: {}", report.platform_revenue_cents);
    println!(
        "Steps: {} ok, {} failed",
        report.outcomes.len() - report.failure_count(),
        report.failure_count()
    );
}
