use std::env;
use std::time::Duration;

use anyhow::{Context, Result};
use chrono::{SecondsFormat, Utc};
use clap::{Args, Parser, Subcommand};
use rackwatch_core::sinks::ObjectStore;
use rackwatch_sinks::{S3Config, S3ObjectStore};
use rand::Rng;
use serde_json::json;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(author, version, about = "Rackwatch maintenance tooling", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Plan (and optionally apply) bulk deletion of stored readings by prefix
    Purge(PurgeArgs),
    /// Emit synthetic sensor readings as JSON lines
    Simulate(SimulateArgs),
}

#[derive(Args, Debug)]
struct PurgeArgs {
    /// Apply deletions instead of running in dry-run mode
    #[arg(long)]
    apply: bool,
    /// Storage prefixes to purge
    #[arg(long, value_delimiter = ',', default_values_t = default_prefixes())]
    prefixes: Vec<String>,
}

fn default_prefixes() -> Vec<String> {
    vec!["raw/".to_string(), "alerts/".to_string(), "invalid/".to_string()]
}

#[derive(Args, Debug)]
struct SimulateArgs {
    /// Device identifier stamped on every reading
    #[arg(long, default_value = "rack-01")]
    device_id: String,
    /// Number of readings to emit (0 = run until interrupted)
    #[arg(long, default_value_t = 0)]
    count: u64,
    /// Seconds between readings
    #[arg(long, default_value_t = 5)]
    interval_secs: u64,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .json()
        .init();

    let cli = Cli::parse();

    match cli.command {
        Command::Purge(args) => handle_purge(args).await,
        Command::Simulate(args) => handle_simulate(args).await,
    }
}

async fn handle_purge(args: PurgeArgs) -> Result<()> {
    dotenvy::dotenv().ok();

    let store = store_from_env()
        .await
        .context("failed to configure object store")?;

    let mut total = 0usize;
    for prefix in &args.prefixes {
        let keys = store
            .list_prefix(prefix)
            .await
            .with_context(|| format!("failed to list objects under '{prefix}'"))?;

        println!("{}: {} object(s)", prefix, keys.len());
        total += keys.len();

        if args.apply {
            for key in &keys {
                store
                    .delete(key)
                    .await
                    .with_context(|| format!("failed to delete object '{key}'"))?;
            }
            info!(prefix = %prefix, deleted = keys.len(), "purged prefix");
        }
    }

    if !args.apply {
        println!("Dry run: {total} object(s) would be deleted. Re-run with --apply to delete.");
    }

    Ok(())
}

async fn handle_simulate(args: SimulateArgs) -> Result<()> {
    let mut rng = rand::thread_rng();
    let mut emitted = 0u64;

    loop {
        let payload = json!({
            "device_id": args.device_id,
            "timestamp": Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true),
            "temperature": round2(rng.gen_range(65.0..=100.0)),
            "humidity": round2(rng.gen_range(30.0..=80.0)),
            "vibration": round2(rng.gen_range(0.0..=1.0)),
        });
        println!("{payload}");

        emitted += 1;
        if args.count != 0 && emitted >= args.count {
            break;
        }
        tokio::time::sleep(Duration::from_secs(args.interval_secs)).await;
    }

    Ok(())
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

async fn store_from_env() -> Result<S3ObjectStore> {
    let bucket = env::var("RACKWATCH_BUCKET").unwrap_or_else(|_| "sensor-data-bucket".to_string());
    let region = env::var("RACKWATCH_REGION").unwrap_or_else(|_| "us-east-1".to_string());

    let store = S3ObjectStore::new(S3Config {
        bucket,
        region,
        endpoint: env::var("RACKWATCH_BUCKET_ENDPOINT").ok(),
        access_key_id: env::var("RACKWATCH_BUCKET_ACCESS_KEY").ok(),
        secret_access_key: env::var("RACKWATCH_BUCKET_SECRET_KEY").ok(),
        force_path_style: true,
    })
    .await?;

    Ok(store)
}
