use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;

use chrono::Utc;
use clap::{Parser, Subcommand};
use fareboard::store::{GcsBlobStore, LocalBlobStore};
use fareboard::{Fareboard, FareboardBuilder, Settings};
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(Debug, Parser)]
#[command(name = "fareboard", version, about = "Watch airline fares and publish a price calendar")]
struct Cli {
    /// Directory for run state and the rendered dashboard.
    #[arg(long, env = "FAREBOARD_STORE_DIR")]
    store_dir: Option<PathBuf>,

    /// Store state in this Google Cloud Storage bucket instead of a local directory.
    #[arg(long, env = "GCS_BUCKET_NAME", conflicts_with = "store_dir")]
    gcs_bucket: Option<String>,

    /// HTTP timeout in seconds.
    #[arg(long, default_value_t = 30)]
    timeout: u64,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Fetch fares, alert on changes, and publish the dashboard.
    Run,
    /// Re-render the dashboard from stored state without fetching.
    Render,
}

fn env_bool(name: &str) -> bool {
    matches!(
        std::env::var(name).as_deref(),
        Ok("1" | "true" | "TRUE" | "yes" | "YES")
    )
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    if env_bool("FAREBOARD_LOG_JSON") {
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
}

fn build(cli: &Cli) -> fareboard::Result<Fareboard> {
    let timeout = Duration::from_secs(cli.timeout);
    let mut builder: FareboardBuilder = Fareboard::builder()
        .settings(Settings::from_env())
        .timeout(timeout);
    builder = match &cli.gcs_bucket {
        Some(bucket) => builder.store(GcsBlobStore::from_env(bucket.clone(), timeout)?),
        None => builder.store(LocalBlobStore::new(cli.store_dir.clone())?),
    };
    builder.build()
}

fn main() -> ExitCode {
    init_tracing();
    let cli = Cli::parse();

    let board = match build(&cli) {
        Ok(board) => board,
        Err(e) => {
            error!(error = %e, "failed to initialize");
            return ExitCode::FAILURE;
        }
    };

    let result = match cli.command {
        Command::Run => board.run().map(|outcome| {
            info!(
                observations = outcome.observations,
                changes = outcome.changes,
                counter = outcome.counter,
                "run complete"
            );
        }),
        Command::Render => board.render_report(Utc::now()).map(|published| {
            info!(published, "render complete");
        }),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!(error = %e, "run failed");
            ExitCode::FAILURE
        }
    }
}
