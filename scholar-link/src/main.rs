//! scholar-link - Identity resolution and timeline cleaning CLI
//!
//! `match` resolves roster names to author identifiers from a search cache.
//! `clean-years` checks recorded first-publication years against publication
//! timelines. Both write their outcomes plus a run report as JSON.

use std::fs;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use scholar_common::config::{ConfigResolver, TomlConfig};
use scholar_common::{Clock, SystemClock};
use scholar_link::review::{DecisionProvider, DeferAll, TerminalReviewer};
use scholar_link::source::SearchCache;
use scholar_link::types::{Identity, PublicationRecord};
use scholar_link::workflow::{IdentityWorkflow, TimelineOptions, TimelineWorkflow};
use scholar_link::RunReport;
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Command-line arguments for scholar-link
#[derive(Parser, Debug)]
#[command(name = "scholar-link")]
#[command(about = "Resolve faculty identities and clean first-publication years")]
#[command(version)]
struct Args {
    /// Config file (overrides SCHOLAR_LINK_CONFIG and the user config)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Match roster names to author identifiers
    Match {
        /// Roster JSON (array of identities)
        #[arg(long)]
        roster: PathBuf,

        /// Search cache JSON (name → candidates)
        #[arg(long)]
        cache: PathBuf,

        /// Output file (stdout if omitted)
        #[arg(long)]
        out: Option<PathBuf>,

        /// Prompt for escalated cases instead of deferring them
        #[arg(long)]
        interactive: bool,
    },

    /// Check recorded first-publication years
    CleanYears {
        /// Roster JSON (array of identities)
        #[arg(long)]
        roster: PathBuf,

        /// Publications JSON (array of {person_id, pub_year})
        #[arg(long)]
        publications: PathBuf,

        /// Output file (stdout if omitted)
        #[arg(long)]
        out: Option<PathBuf>,

        /// Minimum confidence for automatic cleaning
        #[arg(long)]
        min_confidence: Option<f64>,

        /// Ignore publications before the recorded first year
        #[arg(long)]
        drop_before_recorded: bool,

        /// Prompt for flagged cases instead of deferring them
        #[arg(long)]
        interactive: bool,
    },
}

#[derive(Serialize)]
struct RunOutput<'a, O: Serialize, C: Serialize> {
    outcomes: &'a [O],
    #[serde(skip_serializing_if = "Option::is_none")]
    corrections: Option<&'a C>,
    report: &'a RunReport,
}

fn main() -> Result<()> {
    let args = Args::parse();

    let (config, config_source) = ConfigResolver::new(args.config.clone())
        .load()
        .context("Failed to load configuration")?;

    // Initialize tracing on stderr; stdout carries prompts and output
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| config.logging.level.clone().into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .init();

    config_source.log();
    info!(institution = %config.institution_id, "Starting scholar-link");

    let clock = SystemClock;
    match args.command {
        Command::Match {
            roster,
            cache,
            out,
            interactive,
        } => run_match(&config, &clock, &roster, &cache, out.as_deref(), interactive),
        Command::CleanYears {
            roster,
            publications,
            out,
            min_confidence,
            drop_before_recorded,
            interactive,
        } => {
            let mut options = TimelineOptions::from(&config.cleaning);
            if let Some(min_confidence) = min_confidence {
                options.min_confidence = min_confidence;
            }
            options.drop_before_recorded_year = drop_before_recorded;
            run_clean_years(&clock, options, &roster, &publications, out.as_deref(), interactive)
        }
    }
}

fn run_match(
    config: &TomlConfig,
    clock: &dyn Clock,
    roster_path: &Path,
    cache_path: &Path,
    out: Option<&Path>,
    interactive: bool,
) -> Result<()> {
    let roster: Vec<Identity> = read_json(roster_path)?;
    let cache = SearchCache::load(cache_path)
        .with_context(|| format!("Failed to load search cache {}", cache_path.display()))?;
    info!(entries = roster.len(), cached = cache.len(), "Matching roster");

    let workflow = IdentityWorkflow::new(config, clock);
    let run = with_provider(interactive, config.cleaning.earliest_plausible_year, clock, |provider| {
        workflow.run(&roster, &cache, provider)
    });

    let report = RunReport::for_identity(&run);
    report.log();
    write_output(
        out,
        &RunOutput::<_, ()> {
            outcomes: run.outcomes.as_slice(),
            corrections: None,
            report: &report,
        },
    )
}

fn run_clean_years(
    clock: &dyn Clock,
    options: TimelineOptions,
    roster_path: &Path,
    publications_path: &Path,
    out: Option<&Path>,
    interactive: bool,
) -> Result<()> {
    let roster: Vec<Identity> = read_json(roster_path)?;
    let publications: Vec<PublicationRecord> = read_json(publications_path)?;
    info!(
        entries = roster.len(),
        publications = publications.len(),
        min_confidence = options.min_confidence,
        "Cleaning first publication years"
    );

    let workflow = TimelineWorkflow::new(options, clock);
    let run = with_provider(interactive, options.earliest_plausible_year, clock, |provider| {
        workflow.run(&roster, &publications, provider)
    });

    let report = RunReport::for_timeline(&run);
    report.log();
    write_output(
        out,
        &RunOutput {
            outcomes: run.outcomes.as_slice(),
            corrections: Some(&run.corrections),
            report: &report,
        },
    )
}

/// Run `f` with a terminal reviewer when interactive, otherwise deferring
fn with_provider<T>(
    interactive: bool,
    earliest_year: i32,
    clock: &dyn Clock,
    f: impl FnOnce(&mut dyn DecisionProvider) -> T,
) -> T {
    if interactive {
        let stdin = io::stdin();
        let mut reviewer =
            TerminalReviewer::new(stdin.lock(), io::stdout(), earliest_year, clock.current_year());
        f(&mut reviewer)
    } else {
        f(&mut DeferAll)
    }
}

fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let content =
        fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))?;
    serde_json::from_str(&content).with_context(|| format!("Failed to parse {}", path.display()))
}

fn write_output<T: Serialize>(out: Option<&Path>, value: &T) -> Result<()> {
    match out {
        Some(path) => {
            let file = fs::File::create(path)
                .with_context(|| format!("Failed to create {}", path.display()))?;
            let mut writer = BufWriter::new(file);
            serde_json::to_writer_pretty(&mut writer, value).context("Failed to write output")?;
            writer.flush().context("Failed to flush output")?;
            info!(path = %path.display(), "Wrote results");
        }
        None => {
            let stdout = io::stdout();
            let mut writer = stdout.lock();
            serde_json::to_writer_pretty(&mut writer, value).context("Failed to write output")?;
            writeln!(writer).context("Failed to write output")?;
        }
    }
    Ok(())
}
