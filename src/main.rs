mod commands;
mod model;
mod normalizers;
mod pipeline;
mod reports;
mod settings;
mod source;
mod util;

use crate::commands::{export, narrow_losses, provinces, run_cycle, summary, watch};
use crate::reports::generate_report;
use crate::settings::{Overrides, Settings, SourceKind, DEFAULT_CONFIG_FILE};
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use std::time::Duration;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[clap(name = "election-report", about = "Election snapshot analysis")]
struct Opts {
    #[clap(flatten)]
    source: SourceArgs,
    #[clap(subcommand)]
    command: Command,
}

#[derive(Args)]
struct SourceArgs {
    /// Configuration file (TOML)
    #[clap(long, global = true, default_value = DEFAULT_CONFIG_FILE)]
    config: PathBuf,
    /// Where to read the snapshot from
    #[clap(long, global = true, value_enum)]
    source: Option<SourceKind>,
    /// Directory holding the snapshot JSON files
    #[clap(long, global = true)]
    snapshot_dir: Option<PathBuf>,
    /// Base URL of the remote snapshot endpoints
    #[clap(long, global = true)]
    remote_url: Option<String>,
    /// Column of info_mp_candidate holding candidate names
    #[clap(long, global = true)]
    name_column: Option<String>,
    /// Print per-stage timings
    #[clap(long, global = true)]
    timings: bool,
}

#[derive(Subcommand)]
enum Command {
    /// Print headline figures and diagnostics.
    Summary,
    /// Print average winning margin per province.
    Provinces,
    /// Print per-party counts of seats lost by a narrow margin.
    NarrowLosses,
    /// Write every table and report as JSON.
    Export {
        /// Output directory
        out_dir: PathBuf,
    },
    /// Re-run the cycle periodically and print the summary each time.
    Watch {
        /// Seconds between cycles
        #[clap(long, default_value = "60")]
        interval_secs: u64,
        /// Stop after this many cycles
        #[clap(long)]
        cycles: Option<u64>,
    },
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::builder()
                .with_default_directive(LevelFilter::INFO.into())
                .from_env_lossy(),
        )
        .with_writer(std::io::stderr)
        .init();

    let opts = Opts::parse();

    if let Err(e) = run(opts).await {
        eprintln!("❌ {}", e);
        std::process::exit(1);
    }
}

async fn run(opts: Opts) -> Result<(), Box<dyn std::error::Error>> {
    let SourceArgs {
        config,
        source,
        snapshot_dir,
        remote_url,
        name_column,
        timings,
    } = opts.source;

    let mut settings = Settings::load(&config)?;
    settings.apply(Overrides {
        source,
        snapshot_dir,
        remote_base_url: remote_url,
        candidate_name_column: name_column,
    });
    tracing::debug!(?settings, "settings resolved");

    match opts.command {
        Command::Summary => summary(&run_cycle(&settings, timings).await?),
        Command::Provinces => {
            let cycle = run_cycle(&settings, timings).await?;
            provinces(&generate_report(&cycle.tables));
        }
        Command::NarrowLosses => {
            let cycle = run_cycle(&settings, timings).await?;
            narrow_losses(&generate_report(&cycle.tables));
        }
        Command::Export { out_dir } => {
            let cycle = run_cycle(&settings, timings).await?;
            export(&cycle, &generate_report(&cycle.tables), &out_dir)?;
        }
        Command::Watch {
            interval_secs,
            cycles,
        } => {
            watch(&settings, Duration::from_secs(interval_secs), cycles, timings).await?;
        }
    }

    Ok(())
}
