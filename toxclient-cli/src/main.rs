use std::path::PathBuf;
use std::str::FromStr;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde::Serialize;
use toxclient_core::logging::{init_logging_with_config, LogLevel};
use toxclient_core::{Client, ClientConfig};
use tracing::{debug, info};

#[derive(Parser, Debug)]
#[command(name = "toxclient")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Override the configured log level (trace, debug, info, warn, error)
    #[arg(short, long)]
    log_level: Option<String>,

    /// Enable JSON formatted logging
    #[arg(long)]
    json_logs: bool,

    /// Client configuration file (TOML); environment variables otherwise
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Print command output as JSON
    #[arg(long)]
    json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Show the local address and public key
    Info,
    /// Hash a piece of text
    Hash {
        text: String,
    },
    /// Create and then delete groupchats, reporting the counts
    Groups {
        #[arg(default_value_t = 1)]
        count: u32,
    },
}

#[derive(Serialize)]
struct InfoReport {
    address: String,
    public_key: String,
    size: usize,
}

#[derive(Serialize)]
struct GroupsReport {
    created: Vec<u32>,
    after_create: u32,
    after_delete: u32,
}

/// Command-line flags win over the file or environment only when given
fn apply_log_flags(config: &mut ClientConfig, args: &Args) {
    if let Some(level) = &args.log_level {
        let current = config.logging.level;
        config.logging.level = LogLevel::from_str(level).unwrap_or_else(|e| {
            eprintln!("{}, keeping '{}'", e, current);
            current
        });
    }
    config.logging.json_format |= args.json_logs;
}

fn print<T: Serialize>(json: bool, value: &T, text: impl FnOnce(&T) -> String) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(value)?);
    } else {
        println!("{}", text(value));
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => ClientConfig::from_file(path)
            .with_context(|| format!("loading config from {}", path.display()))?,
        None => ClientConfig::from_env().context("reading TOXCLIENT_* environment")?,
    };
    apply_log_flags(&mut config, &args);

    init_logging_with_config(config.log_config())?;
    toxclient_core::metrics::init_metrics();
    debug!(?config, "Configuration loaded");

    let client = Client::new(config).context("creating client")?;
    info!(public_key = %client.cached_public_key(), "toxclient started");

    match args.command {
        Command::Info => {
            let report = InfoReport {
                address: client.get_address_hex().await?,
                public_key: client.get_public_key_hex().await?,
                size: client.size().await?,
            };
            print(args.json, &report, |r| {
                format!(
                    "address:    {}\npublic key: {}\nstate size: {} bytes",
                    r.address, r.public_key, r.size
                )
            })?;
        }
        Command::Hash { text } => {
            let hash = client.hash(text).await?;
            print(args.json, &hash.to_hex(), |hex| hex.clone())?;
        }
        Command::Groups { count } => {
            let mut created = Vec::with_capacity(count as usize);
            for _ in 0..count {
                created.push(client.add_groupchat().await?);
            }
            let after_create = client.count_chatlist().await?;
            for group in &created {
                client.delete_groupchat(*group).await?;
            }
            let report = GroupsReport {
                created,
                after_create,
                after_delete: client.count_chatlist().await?,
            };
            print(args.json, &report, |r| {
                format!(
                    "created {} groupchats {:?}\nafter create: {}\nafter delete: {}",
                    r.created.len(),
                    r.created,
                    r.after_create,
                    r.after_delete
                )
            })?;
        }
    }

    client.kill().await?;
    info!("toxclient finished");

    Ok(())
}
