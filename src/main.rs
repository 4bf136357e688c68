//! dkmh-harvest main entry point
//!
//! This is the command-line interface for the course-enrolment harvester.

use anyhow::{bail, Context};
use clap::Parser;
use dkmh_harvest::codes::{Term, TermCode};
use dkmh_harvest::config::{load_config_with_hash, Config};
use dkmh_harvest::crawler::{page_url, run_harvest};
use dkmh_harvest::importers::{import_rooms, import_teachers};
use dkmh_harvest::output::{load_statistics, print_statistics};
use dkmh_harvest::storage::open_storage;
use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;
use url::Url;

/// dkmh-harvest: course-enrolment harvester
///
/// Crawls the course-registration listing of one academic term and replaces
/// the courses, sections and enrolments stored in the SQLite database.
#[derive(Parser, Debug)]
#[command(name = "dkmh-harvest")]
#[command(version)]
#[command(about = "Harvests course registrations into SQLite", long_about = None)]
struct Cli {
    /// Path to TOML configuration file (built-in defaults when omitted)
    #[arg(value_name = "CONFIG")]
    config: Option<PathBuf>,

    /// Last two digits of the academic year's starting year (e.g. 25 for 2025-2026)
    #[arg(short, long, allow_negative_numbers = true)]
    year: Option<i32>,

    /// Term: 1, 2 or 3 (the summer term)
    #[arg(short, long)]
    term: Option<Term>,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    /// Validate config and show the first page URL without crawling
    #[arg(long, conflicts_with_all = ["stats", "import_rooms", "import_teachers"])]
    dry_run: bool,

    /// Show statistics from the database and exit
    #[arg(long, conflicts_with_all = ["dry_run", "import_rooms", "import_teachers"])]
    stats: bool,

    /// Replace the room lookup with the built-in room list and exit
    #[arg(long, conflicts_with_all = ["dry_run", "stats", "import_teachers"])]
    import_rooms: bool,

    /// Replace teacher assignments from a timetable CSV export and exit
    #[arg(long, value_name = "CSV", conflicts_with_all = ["dry_run", "stats", "import_rooms"])]
    import_teachers: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    setup_logging(cli.verbose, cli.quiet);

    let (config, config_hash) = load_config_with_hash(cli.config.as_deref())
        .context("Failed to load configuration")?;
    match &cli.config {
        Some(path) => tracing::info!(
            "Configuration loaded from {} (hash: {})",
            path.display(),
            config_hash
        ),
        None => tracing::info!("Using built-in configuration"),
    }

    if cli.stats {
        handle_stats(&config)
    } else if cli.import_rooms {
        handle_import_rooms(&config)
    } else if let Some(csv_path) = &cli.import_teachers {
        handle_import_teachers(&config, csv_path)
    } else {
        let term_code = resolve_term_code(cli.year, cli.term)?;
        if cli.dry_run {
            handle_dry_run(&config, &term_code)
        } else {
            handle_harvest(config, config_hash, &term_code).await
        }
    }
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("dkmh_harvest=info,warn"),
            1 => EnvFilter::new("dkmh_harvest=debug,info"),
            2 => EnvFilter::new("dkmh_harvest=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .init();
}

/// Builds the term code from flags, prompting for whatever is missing
fn resolve_term_code(year: Option<i32>, term: Option<Term>) -> anyhow::Result<TermCode> {
    let year = match year {
        Some(year) => year,
        None => {
            let answer = prompt("Enter year (e.g. \"25\" for academic year 2025-2026): ")?;
            answer
                .trim()
                .parse()
                .with_context(|| format!("Invalid year '{}'", answer.trim()))?
        }
    };

    let term = match term {
        Some(term) => term,
        None => prompt("Enter term (\"1\", \"2\" or \"3\" (the summer term)): ")?.parse()?,
    };

    Ok(TermCode::compute(year, term))
}

/// Reads one line from stdin after printing a prompt
fn prompt(message: &str) -> anyhow::Result<String> {
    print!("{}", message);
    io::stdout().flush()?;

    let mut line = String::new();
    if io::stdin().lock().read_line(&mut line)? == 0 {
        bail!("No input given");
    }
    Ok(line)
}

/// Handles the --dry-run mode: validates config and shows what would be fetched
fn handle_dry_run(config: &Config, term_code: &TermCode) -> anyhow::Result<()> {
    println!("=== dkmh-harvest Dry Run ===\n");

    println!("Endpoint:");
    println!("  Base URL: {}", config.endpoint.base_url);
    println!("  Page size: {}", config.endpoint.page_size);
    println!("  Max pages: {}", config.endpoint.max_pages);
    println!(
        "  Timeouts: {}s request, {}s connect",
        config.endpoint.request_timeout_secs, config.endpoint.connect_timeout_secs
    );

    println!("\nUser Agent:");
    println!(
        "  {}/{}",
        config.user_agent.crawler_name, config.user_agent.crawler_version
    );

    println!("\nParsing:");
    println!("  Strategy: {:?}", config.parser.strategy);
    println!(
        "  Exemption markers: {}",
        config.filter.exemption_markers.join(", ")
    );

    println!("\nOutput:");
    println!("  Database: {}", config.output.database_path);

    let base_url = Url::parse(&config.endpoint.base_url)?;
    println!("\nTerm code: {}", term_code);
    println!(
        "First page: {}",
        page_url(&base_url, term_code, 1, config.endpoint.page_size)
    );

    println!("\n✓ Configuration is valid");

    Ok(())
}

/// Handles the --stats mode: shows statistics from the database
fn handle_stats(config: &Config) -> anyhow::Result<()> {
    println!("Database: {}\n", config.output.database_path);

    let storage = open_storage(Path::new(&config.output.database_path))?;
    let stats = load_statistics(&storage)?;
    print_statistics(&stats);

    Ok(())
}

/// Handles the --import-rooms mode
fn handle_import_rooms(config: &Config) -> anyhow::Result<()> {
    let mut storage = open_storage(Path::new(&config.output.database_path))?;
    let stored = import_rooms(&mut storage).context("Room import failed")?;
    println!("✓ Stored {} rooms in {}", stored, config.output.database_path);
    Ok(())
}

/// Handles the --import-teachers mode
fn handle_import_teachers(config: &Config, csv_path: &Path) -> anyhow::Result<()> {
    let mut storage = open_storage(Path::new(&config.output.database_path))?;
    let stored = import_teachers(&mut storage, csv_path)
        .with_context(|| format!("Teacher import from {} failed", csv_path.display()))?;
    println!(
        "✓ Stored {} teacher assignments in {}",
        stored, config.output.database_path
    );
    Ok(())
}

/// Handles the main harvest operation
async fn handle_harvest(
    config: Config,
    config_hash: String,
    term_code: &TermCode,
) -> anyhow::Result<()> {
    tracing::info!(
        "Harvesting from {} into {}",
        config.endpoint.base_url,
        config.output.database_path
    );

    match run_harvest(config, config_hash, term_code).await {
        Ok(report) => {
            println!(
                "✓ Stored {} courses, {} sections and {} enrolments for term code {}",
                report.stored.courses,
                report.stored.sections,
                report.stored.enrolments,
                report.term_code
            );
            Ok(())
        }
        Err(e) => {
            tracing::error!("Harvest failed: {}", e);
            Err(e).context("Harvest failed; the previous snapshot was left unchanged")
        }
    }
}
