//! Statistics generation from the harvest database
//!
//! This module provides functionality for extracting and displaying
//! snapshot statistics from the storage layer.

use crate::storage::{RunRecord, Storage, Table};
use crate::HarvestError;

/// Harvest statistics summary
#[derive(Debug, Clone)]
pub struct HarvestStatistics {
    /// Row count of every table, in `Table::ALL` order
    pub table_counts: Vec<(Table, u64)>,

    /// The run that produced the stored snapshot, if any
    pub latest_run: Option<RunRecord>,
}

impl HarvestStatistics {
    pub fn count(&self, table: Table) -> u64 {
        self.table_counts
            .iter()
            .find(|(t, _)| *t == table)
            .map(|(_, count)| *count)
            .unwrap_or(0)
    }
}

/// Loads statistics from storage
pub fn load_statistics(storage: &dyn Storage) -> Result<HarvestStatistics, HarvestError> {
    let table_counts = Table::ALL
        .iter()
        .map(|table| Ok((*table, storage.count_rows(*table)?)))
        .collect::<Result<Vec<_>, HarvestError>>()?;

    let latest_run = storage.get_latest_run()?;

    Ok(HarvestStatistics {
        table_counts,
        latest_run,
    })
}

/// Appends one line of the report
fn push_line(out: &mut String, line: &str) {
    out.push_str(line);
    out.push('\n');
}

/// Renders statistics as a human-readable report
pub fn format_statistics(stats: &HarvestStatistics) -> String {
    let mut out = String::new();

    push_line(&mut out, "=== Harvest Statistics ===\n");

    push_line(&mut out, "Tables:");
    for (table, count) in &stats.table_counts {
        push_line(&mut out, &format!("  {}: {}", table.to_db_string(), count));
    }
    push_line(&mut out, "");

    match &stats.latest_run {
        Some(run) => {
            push_line(&mut out, &format!("Latest Run (#{}):", run.id));
            push_line(&mut out, &format!("  Term code: {}", run.term_code));
            push_line(&mut out, &format!("  Started: {}", run.started_at));
            push_line(&mut out, &format!("  Finished: {}", run.finished_at));
            push_line(&mut out, &format!("  Pages fetched: {}", run.pages_fetched));
            push_line(
                &mut out,
                &format!(
                    "  Records: {} seen, {} dropped",
                    run.records_seen, run.records_dropped
                ),
            );
            push_line(&mut out, &format!("  Config hash: {}", run.config_hash));
        }
        None => push_line(&mut out, "No harvest has been recorded yet"),
    }

    let enrolments = stats.count(Table::Enrolments);
    let sections = stats.count(Table::Sections);
    if sections > 0 {
        push_line(
            &mut out,
            &format!(
                "\nAverage enrolments per section: {:.1}",
                enrolments as f64 / sections as f64
            ),
        );
    }

    out
}

/// Prints statistics to stdout in a formatted manner
pub fn print_statistics(stats: &HarvestStatistics) {
    print!("{}", format_statistics(stats));
}
