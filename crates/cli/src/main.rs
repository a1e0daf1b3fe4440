//! Arbor naming registry command line interface
//!
//! Computes node ids, replays operation scripts against an in-memory
//! registry, and prints the resolved configuration.

mod replay;

use anyhow::{Context, Result};
use arbor_registry::{hash_of, Label, LogFormat, RegistryConfig};
use arbor_time::{Clock, SystemClock};
use clap::{Parser, Subcommand};
use replay::{decode_label, resolve_node, Replay, Script};
use serde_json::json;
use std::fs;
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(Parser)]
#[command(name = "arbor")]
#[command(about = "Hierarchical naming registry tools", long_about = None)]
#[command(version)]
struct Cli {
    /// Configuration file (TOML); ARBOR_* environment variables override it
    #[arg(long, short, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compute the id of the node `label` beneath `parent`
    Hash {
        /// Parent node: `root`, a 32-byte hex id, or a path such as `01/02`
        #[arg(long, default_value = "root")]
        parent: String,
        /// Hex-encoded label bytes
        #[arg(long)]
        label: String,
    },
    /// Apply a JSON operation script to a fresh registry
    Replay {
        /// Script file
        script: PathBuf,
    },
    /// Print the resolved configuration
    Config,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Hash { parent, label } => {
            init_logging("info", LogFormat::Pretty)?;
            let parent = resolve_node(&parent)?;
            let label = Label::new(decode_label(&label)?)?;
            let node_id = hash_of(&parent, label.as_bytes());
            println!("{node_id}");
        }
        Commands::Replay { script } => {
            let config = load_config(cli.config.as_ref())?;
            init_logging(&config.log_level, config.log_format)?;

            let raw = fs::read_to_string(&script)
                .with_context(|| format!("failed to read script {}", script.display()))?;
            let parsed: Script = serde_json::from_str(&raw)
                .with_context(|| format!("failed to parse script {}", script.display()))?;
            let start = if parsed.start == 0 {
                SystemClock::new().now()
            } else {
                parsed.start
            };

            let replay = Replay::new(&config, start)?;
            info!(
                script = %script.display(),
                steps = parsed.steps.len(),
                start,
                renewal = ?replay.registry().renewal_policy(),
                "replaying script"
            );
            for report in replay.run(&parsed.steps) {
                println!("{}", serde_json::to_string(&report)?);
            }
            for record in replay.events() {
                println!("{}", serde_json::to_string(&json!({ "event": record }))?);
            }
            info!(nodes = replay.registry().node_count(), "replay finished");
        }
        Commands::Config => {
            let config = load_config(cli.config.as_ref())?;
            init_logging(&config.log_level, config.log_format)?;
            println!("{}", serde_json::to_string_pretty(&config)?);
        }
    }

    Ok(())
}

fn load_config(path: Option<&PathBuf>) -> Result<RegistryConfig> {
    RegistryConfig::load(path.map(PathBuf::as_path)).context("failed to load configuration")
}

/// Logs go to stderr so stdout stays machine readable.
fn init_logging(level: &str, format: LogFormat) -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    match format {
        LogFormat::Json => tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
            .try_init()?,
        LogFormat::Pretty => tracing_subscriber::registry()
            .with(filter)
            .with(
                tracing_subscriber::fmt::layer()
                    .pretty()
                    .with_writer(std::io::stderr),
            )
            .try_init()?,
    }

    Ok(())
}
