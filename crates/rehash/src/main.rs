// crates/rehash/src/main.rs

use std::path::PathBuf;
use std::time::Instant;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use rehash_core::config::{Config, DEFAULT_CONFIG_PATH, DEFAULT_SECTION};
use rehash_core::types::{CandidateTuple, ClickRecord, HashedCandidate, OfferRecord};
use rehash_core::{candidates, db, gateway, hashing, reconcile, report};

mod tunnel;
use tunnel::SshTunnel;

/// Recovers the plaintext (affiliate, source, account, segment) tuples
/// behind the hash tokens currently stored in offer whitelists and
/// blacklists, and writes them to a CSV report.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Cli {
    /// Config file with the SSH tunnel and database parameters.
    #[arg(long, default_value = DEFAULT_CONFIG_PATH)]
    config: PathBuf,

    /// Section of the config file to read.
    #[arg(long, default_value = DEFAULT_SECTION)]
    section: String,

    /// Directory the report is written into.
    #[arg(long)]
    output_dir: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    let config = Config::load(&cli.config, &cli.section)
        .with_context(|| format!("failed to load config from {}", cli.config.display()))?;

    // Strictly sequential: each stage fully consumes its predecessor, and
    // each database stage runs inside its own tunnel+pool scope.
    let offers = fetch_offers_scoped(&config).await?;
    let clicks = fetch_clicks_scoped(&config).await?;

    let pairs = candidates::generate_candidates(&clicks, &offers);
    info!("generated {} candidate tuples", pairs.len());
    let observed = candidates::collect_observed_hashes(&offers);

    let hashed = recompute_scoped(&config, &pairs).await?;
    let resolved = reconcile::reconcile(hashed, &observed);

    let output_dir = match cli.output_dir {
        Some(dir) => dir,
        None => std::env::current_dir()?,
    };
    let path = report::write_report(&resolved, &output_dir)?;
    info!("report written to {}", path.display());

    Ok(())
}

async fn fetch_offers_scoped(config: &Config) -> Result<Vec<OfferRecord>> {
    let started = Instant::now();
    let tunnel = SshTunnel::open(&config.ssh).await?;
    let pool = db::connect(&config.db, tunnel.local_port()).await?;
    let offers = gateway::fetch_offers(&pool).await?;
    pool.close().await;
    info!("[OFFERS]: Time spent: {:.2}s", started.elapsed().as_secs_f64());
    Ok(offers)
}

async fn fetch_clicks_scoped(config: &Config) -> Result<Vec<ClickRecord>> {
    let started = Instant::now();
    let tunnel = SshTunnel::open(&config.ssh).await?;
    let pool = db::connect(&config.db, tunnel.local_port()).await?;
    let clicks = gateway::fetch_clicks(&pool).await?;
    pool.close().await;
    info!("[CLICKS]: Time spent: {:.2}s", started.elapsed().as_secs_f64());
    Ok(clicks)
}

async fn recompute_scoped(
    config: &Config,
    pairs: &[CandidateTuple],
) -> Result<Vec<HashedCandidate>> {
    let started = Instant::now();
    let tunnel = SshTunnel::open(&config.ssh).await?;
    let pool = db::connect(&config.db, tunnel.local_port()).await?;
    let hashed = hashing::recompute_hashes(&pool, pairs).await?;
    pool.close().await;
    info!("[REHASH]: Time spent: {:.2}s", started.elapsed().as_secs_f64());
    Ok(hashed)
}
