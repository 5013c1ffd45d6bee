//! MRMon
//!
//! Reads watch / delete / clear commands as JSON lines on stdin and writes
//! job and task change emissions as JSON lines on stdout. Logs go to stderr.

use anyhow::{Context, Result};
use clap::Parser;
use mrmon_client::ClusterClient;
use mrmon_core::dto::command::{Command, CommandRecord};
use mrmon_core::dto::emission::Emission;
use mrmon_monitor::{Config, StatusPoller};
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::sync::mpsc;
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

const CHANNEL_CAPACITY: usize = 256;

#[derive(Parser)]
#[command(name = "mrmon")]
#[command(about = "Streams MapReduce job and task status changes", long_about = None)]
struct Cli {
    /// Idle delay before each job refresh, in milliseconds
    #[arg(long, env = "MRMON_POLL_DELAY_MS", default_value_t = 100)]
    poll_delay_ms: u64,

    /// Maximum number of watched jobs
    #[arg(long, env = "MRMON_MAX_JOBS", default_value_t = 100)]
    max_jobs: usize,

    /// Tasks per page of the legacy task listing
    #[arg(long, env = "MRMON_LEGACY_PAGE_SIZE", default_value_t = 100)]
    legacy_page_size: usize,

    /// Emission cycle length, in milliseconds
    #[arg(long, env = "MRMON_CYCLE_INTERVAL_MS", default_value_t = 500)]
    cycle_interval_ms: u64,

    /// Per-request HTTP timeout, in seconds
    #[arg(long, env = "MRMON_REQUEST_TIMEOUT_SECS", default_value_t = 10)]
    request_timeout_secs: u64,

    /// Evict jobs after this many cycles without changes (disabled when unset)
    #[arg(long, env = "MRMON_EVICT_AFTER_IDLE_CYCLES")]
    evict_after_idle_cycles: Option<u32>,
}

impl From<Cli> for Config {
    fn from(cli: Cli) -> Self {
        Config {
            poll_delay: Duration::from_millis(cli.poll_delay_ms),
            max_jobs: cli.max_jobs,
            legacy_page_size: cli.legacy_page_size,
            cycle_interval: Duration::from_millis(cli.cycle_interval_ms),
            request_timeout: Duration::from_secs(cli.request_timeout_secs),
            evict_after_idle_cycles: cli.evict_after_idle_cycles,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging; stdout carries emissions
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "mrmon_monitor=info,mrmon_client=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let config: Config = Cli::parse().into();
    config.validate()?;
    info!("Loaded configuration: {:?}", config);

    let client = ClusterClient::new(config.request_timeout)
        .context("Failed to build HTTP client")?;
    let poller = StatusPoller::new(config, Arc::new(client));

    let (command_tx, command_rx) = mpsc::channel(CHANNEL_CAPACITY);
    let (emission_tx, emission_rx) = mpsc::channel(CHANNEL_CAPACITY);

    tokio::spawn(read_commands(command_tx));
    let writer = tokio::spawn(write_emissions(emission_rx));

    tokio::select! {
        result = poller.run(command_rx, emission_tx) => {
            if let Err(e) = result {
                error!("Poller error: {:#}", e);
                return Err(e);
            }
        }
        _ = tokio::signal::ctrl_c() => {
            info!("Shutting down");
        }
    }

    writer.abort();
    Ok(())
}

/// Parses one command per stdin line and forwards it to the poller
///
/// Blank lines are ignored; malformed lines are logged and skipped.
async fn read_commands(commands: mpsc::Sender<Command>) {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    loop {
        let line = match lines.next_line().await {
            Ok(Some(line)) => line,
            Ok(None) => break,
            Err(e) => {
                error!("Failed to read command: {}", e);
                break;
            }
        };

        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        match parse_command(line) {
            Ok(command) => {
                if commands.send(command).await.is_err() {
                    break;
                }
            }
            Err(e) => warn!("Skipping command {:?}: {:#}", line, e),
        }
    }

    info!("Command input closed");
}

fn parse_command(line: &str) -> Result<Command> {
    let record: CommandRecord = serde_json::from_str(line).context("Invalid command JSON")?;
    Ok(Command::try_from(record)?)
}

/// Writes each emission to stdout as one JSON line
async fn write_emissions(mut emissions: mpsc::Receiver<Emission>) -> Result<()> {
    let mut stdout = tokio::io::stdout();

    while let Some(emission) = emissions.recv().await {
        let mut line = serde_json::to_vec(&emission).context("Failed to serialize emission")?;
        line.push(b'\n');
        stdout.write_all(&line).await.context("Failed to write emission")?;
        stdout.flush().await.context("Failed to flush stdout")?;
    }

    Ok(())
}
