//! Harvest coordinator - main run orchestration logic
//!
//! This module contains the run loop that ties the pipeline together:
//! - Paginating through the listing of one term
//! - Parsing and filtering the rows of every page
//! - Folding accepted rows into the snapshot
//! - Replacing the stored snapshot once the listing is exhausted
//!
//! Nothing is written until every page has been fetched, so a failed run
//! leaves the previous snapshot in place.

use crate::codes::TermCode;
use crate::config::{validate, Config, ParserStrategy};
use crate::crawler::fetcher::{build_http_client, HttpPageSource, PageSource};
use crate::crawler::paginator::Paginator;
use crate::crawler::parser::{PatternRecordParser, RecordParser, TableRecordParser};
use crate::snapshot::{Accumulated, Aggregator, DropReason, RecordFilter, Snapshot};
use crate::storage::{RunSummary, SnapshotCounts, SqliteStorage, Storage};
use crate::HarvestError;
use chrono::Utc;
use reqwest::Client;
use std::collections::HashMap;
use std::path::Path;
use std::time::{Duration, Instant};

/// Running totals of one harvest
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HarvestTally {
    pub pages_fetched: u32,
    pub records_seen: u64,
    pub records_accepted: u64,
    pub dropped: HashMap<DropReason, u64>,
}

impl HarvestTally {
    fn record_drop(&mut self, reason: DropReason) {
        *self.dropped.entry(reason).or_insert(0) += 1;
    }

    /// Total records left out of the snapshot
    pub fn records_dropped(&self) -> u64 {
        self.dropped.values().sum()
    }

    pub fn dropped_for(&self, reason: DropReason) -> u64 {
        self.dropped.get(&reason).copied().unwrap_or(0)
    }
}

/// Outcome of a successful run
#[derive(Debug, Clone)]
pub struct HarvestReport {
    pub run_id: i64,
    pub term_code: TermCode,
    pub tally: HarvestTally,
    /// Rows actually stored, after duplicate enrolments were collapsed
    pub stored: SnapshotCounts,
    pub elapsed: Duration,
}

/// Returns the record parser for a configured strategy
pub fn parser_for(strategy: ParserStrategy) -> Box<dyn RecordParser> {
    match strategy {
        ParserStrategy::Pattern => Box::new(PatternRecordParser::new()),
        ParserStrategy::Table => Box::new(TableRecordParser::new()),
    }
}

/// Drains the paginator and folds every accepted row into a snapshot
///
/// Rows are processed in page-arrival order. A fetch error aborts the
/// harvest and discards everything collected so far.
pub async fn harvest_pages<S: PageSource>(
    paginator: &mut Paginator<S>,
    parser: &dyn RecordParser,
    filter: &RecordFilter,
) -> Result<(Snapshot, HarvestTally), HarvestError> {
    let mut aggregator = Aggregator::new();
    let mut tally = HarvestTally::default();

    while let Some(page) = paginator.next_page().await? {
        let mut page_records = 0u64;

        for record in parser.parse(&page.body) {
            page_records += 1;
            tracing::trace!("Processing record #{}...", record.row_index);

            if let Err(reason) = filter.check(&record) {
                tracing::debug!(
                    "Dropping record #{} ({}): section '{}'",
                    record.row_index,
                    reason.as_str(),
                    record.section_code
                );
                tally.record_drop(reason);
                continue;
            }

            let section_code = record.section_code.clone();
            match aggregator.accumulate(record) {
                Accumulated::Accepted => tally.records_accepted += 1,
                Accumulated::UnresolvedCourse => {
                    tracing::debug!(
                        "Dropping record ({}): section '{}'",
                        DropReason::UnresolvedCourse.as_str(),
                        section_code
                    );
                    tally.record_drop(DropReason::UnresolvedCourse);
                }
            }
        }

        tally.records_seen += page_records;
        tally.pages_fetched = page.number;

        tracing::info!(
            "Page {}: {} records; {} courses, {} sections, {} enrolments so far",
            page.number,
            page_records,
            aggregator.course_count(),
            aggregator.section_count(),
            aggregator.enrolment_count()
        );
    }

    Ok((aggregator.finalize(), tally))
}

/// Main harvest coordinator structure
pub struct Harvester {
    config: Config,
    config_hash: String,
    client: Client,
    storage: SqliteStorage,
    parser: Box<dyn RecordParser>,
    filter: RecordFilter,
}

impl Harvester {
    /// Creates a harvester writing to the configured database
    ///
    /// # Arguments
    ///
    /// * `config` - The harvester configuration
    /// * `config_hash` - Hash of the configuration, recorded with each run
    pub fn new(config: Config, config_hash: String) -> Result<Self, HarvestError> {
        let storage = SqliteStorage::new(Path::new(&config.output.database_path))?;
        Self::with_storage(config, config_hash, storage)
    }

    /// Creates a harvester writing to an already opened storage
    ///
    /// Fails with `HarvestError::Config` when the configuration is invalid.
    pub fn with_storage(
        config: Config,
        config_hash: String,
        storage: SqliteStorage,
    ) -> Result<Self, HarvestError> {
        validate(&config)?;

        let client = build_http_client(&config.user_agent, &config.endpoint)?;
        let parser = parser_for(config.parser.strategy);
        let filter = RecordFilter::from_config(&config.filter);

        Ok(Self {
            config,
            config_hash,
            client,
            storage,
            parser,
            filter,
        })
    }

    pub fn storage(&self) -> &SqliteStorage {
        &self.storage
    }

    /// Harvests one term and replaces the stored snapshot
    ///
    /// 1. Fetches listing pages until the listing reports its end
    /// 2. Parses, filters and aggregates the rows of every page
    /// 3. Replaces courses, sections and enrolments in one transaction
    pub async fn run(&mut self, term_code: &TermCode) -> Result<HarvestReport, HarvestError> {
        tracing::info!("Harvesting registrations for term code {}", term_code);

        let started_at = Utc::now();
        let start_time = Instant::now();

        let source =
            HttpPageSource::new(self.client.clone(), &self.config.endpoint, term_code.clone())?;
        let mut paginator = Paginator::new(source, self.config.endpoint.max_pages);

        let (snapshot, tally) =
            harvest_pages(&mut paginator, self.parser.as_ref(), &self.filter).await?;

        if snapshot.is_empty() {
            tracing::warn!(
                "No registrations found for term code {}; the stored snapshot will be emptied",
                term_code
            );
        }

        tracing::info!("Saving to {}...", self.config.output.database_path);

        let summary = RunSummary {
            term_code: term_code.to_string(),
            config_hash: self.config_hash.clone(),
            started_at,
            finished_at: Utc::now(),
            pages_fetched: tally.pages_fetched,
            records_seen: tally.records_seen,
            records_dropped: tally.records_dropped(),
        };
        let (run_id, stored) = self.storage.replace_snapshot(&snapshot, &summary)?;

        let elapsed = start_time.elapsed();
        tracing::info!(
            "Harvest completed in {:?}: {} pages, {} records ({} dropped); stored {} courses, {} sections, {} enrolments",
            elapsed,
            tally.pages_fetched,
            tally.records_seen,
            tally.records_dropped(),
            stored.courses,
            stored.sections,
            stored.enrolments
        );

        Ok(HarvestReport {
            run_id,
            term_code: term_code.clone(),
            tally,
            stored,
            elapsed,
        })
    }
}

/// Runs a complete harvest of one term
///
/// # Example
///
/// ```no_run
/// use dkmh_harvest::codes::{Term, TermCode};
/// use dkmh_harvest::config::load_config_with_hash;
/// use dkmh_harvest::crawler::run_harvest;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let (config, hash) = load_config_with_hash(None)?;
/// let report = run_harvest(config, hash, &TermCode::compute(25, Term::First)).await?;
/// println!("Stored {} enrolments", report.stored.enrolments);
/// # Ok(())
/// # }
/// ```
pub async fn run_harvest(
    config: Config,
    config_hash: String,
    term_code: &TermCode,
) -> Result<HarvestReport, HarvestError> {
    let mut harvester = Harvester::new(config, config_hash)?;
    harvester.run(term_code).await
}
