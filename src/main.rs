//! RIVENSCAN: warframe.market riven auction scanner
//!
//! Entry point. Parses command-line options, merges them over the optional
//! config file, initialises structured logging, and runs one full scan of
//! the riven catalog. Exits non-zero on any fatal fetch or decode error.

use anyhow::Result;
use clap::Parser;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tokio::sync::watch;
use tracing::info;

use rivenscan::config::{FileConfig, ScanConfig, ScanOverrides, DEFAULT_CONFIG_FILE};
use rivenscan::engine::{ScanPipeline, StdoutSink};
use rivenscan::platforms::rate_limiter::RateLimiter;
use rivenscan::platforms::warframe_market::{HttpFetcher, WarframeMarketClient};
use rivenscan::types::{FailurePolicy, SortDirection};

/// Scan warframe.market riven auctions for cheap endo.
#[derive(Parser, Debug)]
#[command(name = "rivenscan")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Minimum endo gained per platinum spent
    #[arg(long = "min-endo", visible_alias = "min-endo-per-plat", value_name = "ENDO")]
    min_endo: Option<f64>,

    /// Minimum buyout price in platinum (inclusive)
    #[arg(long)]
    min_price: Option<i64>,

    /// Maximum buyout price in platinum (inclusive)
    #[arg(long)]
    max_price: Option<i64>,

    /// Only fetch rivens rerolled at least this many times
    #[arg(long)]
    min_rerolls: Option<u32>,

    /// Only print matching auctions and the final timing line
    #[arg(long)]
    silent: bool,

    /// Re-print all matches sorted by endo per platinum when done (asc or desc; bare flag = desc)
    #[arg(long, num_args = 0..=1, default_missing_value = "desc", value_name = "DIRECTION")]
    sort: Option<SortDirection>,

    /// Skip categories whose fetch fails instead of aborting the scan
    #[arg(long)]
    lenient: bool,

    /// Gaming platform market to query (pc, xbox, ps4, switch)
    #[arg(long)]
    platform: Option<String>,

    /// Path to configuration file [default: rivenscan.toml if present]
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Use JSON log format instead of pretty
    #[arg(long)]
    json_logs: bool,
}

impl Cli {
    fn overrides(&self) -> ScanOverrides {
        ScanOverrides {
            min_price: self.min_price,
            max_price: self.max_price,
            min_efficiency_per_cost: self.min_endo,
            min_rerolls: self.min_rerolls,
            silent: self.silent.then_some(true),
            sort: self.sort,
            failure_policy: self.lenient.then_some(FailurePolicy::Lenient),
            game_platform: self.platform.clone(),
            ..ScanOverrides::default()
        }
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    // Load .env file if present (non-fatal if missing)
    let _ = dotenv::dotenv();

    let cli = Cli::parse();

    init_logging(cli.json_logs);

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e:#}");
            ExitCode::FAILURE
        }
    }
}

/// Resolve config, wire up the client and run a single scan.
async fn run(cli: Cli) -> Result<()> {
    let config = load_config(&cli)?;

    // Ctrl+C flips the shutdown flag; the rate limiter turns that into a
    // cancelled wait, which aborts the scan.
    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("Shutdown signal received.");
            let _ = shutdown_tx.send(true);
        }
    });

    let client = WarframeMarketClient::new(
        HttpFetcher::new(&config.game_platform)?,
        RateLimiter::marketplace().with_shutdown(shutdown_rx),
    )
    .with_base_url(config.api_base_url.clone());

    let mut pipeline = ScanPipeline::new(client, StdoutSink, &config);
    let summary = pipeline.run().await?;

    info!(summary = %summary, "RIVENSCAN finished cleanly.");
    Ok(())
}

/// Defaults, then the config file, then command-line flags.
fn load_config(cli: &Cli) -> Result<ScanConfig> {
    let file = match &cli.config {
        Some(path) => Some(FileConfig::load(path)?),
        None => FileConfig::load_optional(Path::new(DEFAULT_CONFIG_FILE))?,
    };

    let mut config = ScanConfig::default();
    if let Some(file) = file {
        config.apply(file.scan);
    }
    config.apply(cli.overrides());
    config.validate()?;

    info!(
        min_price = config.min_price,
        max_price = config.max_price,
        min_endo_per_plat = config.min_efficiency_per_cost,
        min_rerolls = ?config.min_rerolls,
        sort = ?config.sort,
        policy = ?config.failure_policy,
        platform = %config.game_platform,
        "Configuration loaded"
    );

    Ok(config)
}

/// Initialise the `tracing` subscriber. Logs go to stderr so they never
/// interleave with the auction stream on stdout.
fn init_logging(json: bool) {
    use tracing_subscriber::{fmt, EnvFilter};

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("rivenscan=warn"));

    let json_logging = json || std::env::var("RIVENSCAN_LOG_JSON").is_ok();

    if json_logging {
        fmt()
            .json()
            .with_env_filter(env_filter)
            .with_writer(std::io::stderr)
            .with_target(true)
            .init();
    } else {
        fmt()
            .with_env_filter(env_filter)
            .with_writer(std::io::stderr)
            .with_target(true)
            .init();
    }
}
