use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use guardian_stats::config::{AppConfig, SourceKind};
use guardian_stats::models::PortalId;
use guardian_stats::report::{self, ReportOptions};
use guardian_stats::storage::{self, CsvExporter, SqliteSource, StorageConfig};

#[derive(Parser)]
#[command(name = "guardian-stats")]
#[command(about = "Portal ownership statistics and per-faction leaderboards")]
#[command(version)]
struct Cli {
    /// Path to configuration file
    #[arg(long, default_value = "./config.toml")]
    config: PathBuf,

    /// Data directory path (overrides the config file)
    #[arg(long)]
    data_dir: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long)]
    log_level: Option<String>,

    /// Output logs as JSON
    #[arg(long)]
    json_logs: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compute leaderboards and export them as CSV tables
    Report {
        /// Observation source: "sqlite" or "jsonl"
        #[arg(long)]
        source: Option<SourceKind>,

        /// Input path (database or JSONL file)
        #[arg(long)]
        input: Option<PathBuf>,

        /// Output directory for CSV tables
        #[arg(long)]
        output: Option<PathBuf>,

        /// Compute portals on a single thread
        #[arg(long)]
        sequential: bool,
    },

    /// Print one portal's derived stats as JSON
    Portal {
        /// Portal identifier
        id: String,

        #[arg(long)]
        source: Option<SourceKind>,

        #[arg(long)]
        input: Option<PathBuf>,
    },

    /// Dump the merged observation stream from the SQLite store as JSONL
    ExportObservations {
        /// Database path
        #[arg(long)]
        db: Option<PathBuf>,

        /// Output JSONL path
        #[arg(long)]
        out: Option<PathBuf>,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = AppConfig::load_or_default(&cli.config)
        .with_context(|| format!("Failed to load config from {:?}", cli.config))?;
    if let Some(dir) = cli.data_dir.clone() {
        config.data_dir = dir;
    }
    let log_level = cli.log_level.clone().unwrap_or_else(|| config.log_level.clone());

    // Initialize tracing
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&log_level));

    if cli.json_logs {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer())
            .init();
    }

    tracing::info!("Starting guardian-stats v{}", env!("CARGO_PKG_VERSION"));

    let storage = StorageConfig::new(config.data_dir.clone());

    match cli.command {
        Commands::Report {
            source,
            input,
            output,
            sequential,
        } => {
            let kind = source.unwrap_or(config.source.kind);
            let input = resolve_input(&config, &storage, kind, input);
            let output = output
                .or_else(|| config.report.output_dir.clone())
                .unwrap_or_else(|| storage.reports_dir());

            let mut options = ReportOptions::from(&config.report);
            if sequential {
                options.parallel = false;
            }

            let result = report::report_from_source(kind, &input, &options)
                .with_context(|| format!("Report failed for {:?}", input))?;

            let exporter = CsvExporter::new(output);
            let summary = exporter
                .export(&result.leaderboards)
                .context("Failed to export leaderboards")?;

            println!("\n=== Report ===");
            println!("Observations:   {}", result.observation_count);
            println!("Portals:        {}", result.stats.len());
            println!("Factions:       {}", result.leaderboards.factions().len());
            println!("Most active:    {}", result.leaderboards.most_active.len());
            println!("Files written:  {}", summary.files.len());
            println!("Rows written:   {}", summary.rows);
            println!("Output:         {}", exporter.output_dir().display());
            println!("Duration:       {:?}", result.elapsed);
        }
        Commands::Portal { id, source, input } => {
            let kind = source.unwrap_or(config.source.kind);
            let input = resolve_input(&config, &storage, kind, input);

            let observations = report::load_observations(kind, &input)
                .with_context(|| format!("Failed to load observations from {:?}", input))?;
            let portal_id = PortalId::from(id);

            match report::portal_report(&observations, &portal_id)? {
                Some(stats) => println!("{}", serde_json::to_string_pretty(&stats)?),
                None => {
                    tracing::warn!("No observations for portal {}", portal_id);
                    eprintln!("Portal not found: {}", portal_id);
                }
            }
        }
        Commands::ExportObservations { db, out } => {
            let db = db.unwrap_or_else(|| storage.database_path());
            let out = out.unwrap_or_else(|| storage.observations_path());

            let observations = SqliteSource::open(&db)
                .and_then(|source| source.load_observations())
                .with_context(|| format!("Failed to read observation store {:?}", db))?;
            let count = storage::write_observations(&out, &observations)
                .with_context(|| format!("Failed to write {:?}", out))?;

            println!("Wrote {} observations to {}", count, out.display());
        }
    }

    Ok(())
}

fn resolve_input(
    config: &AppConfig,
    storage: &StorageConfig,
    kind: SourceKind,
    input: Option<PathBuf>,
) -> PathBuf {
    input
        .or_else(|| config.source.path.clone())
        .unwrap_or_else(|| match kind {
            SourceKind::Sqlite => storage.database_path(),
            SourceKind::Jsonl => storage.observations_path(),
        })
}
