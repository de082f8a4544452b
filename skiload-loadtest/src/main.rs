use anyhow::{Context, Result};
use clap::Parser;
use skiload_client::Client;
use skiload_loadtest::api::SkiApi;
use skiload_loadtest::config::{ConfigOverrides, RunConfig};
use skiload_loadtest::orchestrator::Orchestrator;
use std::path::PathBuf;
use std::process;
use std::sync::Arc;
use tracing::info;

#[derive(Parser, Debug)]
#[command(name = "skiload", about = "Phased load test for the ski resort API")]
struct Args {
    /// TOML config file; defaults are used if it does not exist
    #[arg(long, default_value = "skiload.toml")]
    config: PathBuf,

    /// Worker budget (4..=256)
    #[arg(long)]
    max_threads: Option<u32>,

    /// Size of the skier ID population
    #[arg(long)]
    num_skiers: Option<u32>,

    /// Number of lifts at the resort (5..=60)
    #[arg(long)]
    num_lifts: Option<u32>,

    /// Simulated ski day (1..=366)
    #[arg(long)]
    ski_day: Option<u32>,

    /// Resort identifier sent with every call
    #[arg(long)]
    resort: Option<String>,

    /// Base address of the ski API
    #[arg(long)]
    server: Option<String>,

    /// Latency log destination
    #[arg(long)]
    output: Option<PathBuf>,
}

impl Args {
    fn overrides(&self) -> ConfigOverrides {
        ConfigOverrides {
            max_threads: self.max_threads,
            num_skiers: self.num_skiers,
            num_lifts: self.num_lifts,
            ski_day: self.ski_day,
            resort_id: self.resort.clone(),
            server_address: self.server.clone(),
            output_file: self.output.clone(),
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();

    let mut config = RunConfig::load(Some(args.config.as_path()))
        .with_context(|| format!("Failed to load config from {:?}", args.config))?;
    args.overrides().apply(&mut config);
    config.validate().context("Invalid run configuration")?;

    let client = Client::new(config.client_config()).context("Failed to create API client")?;
    let api: Arc<dyn SkiApi> = Arc::new(client);

    let report = Orchestrator::new(config, api)
        .run()
        .await
        .context("Load test aborted")?;

    print!("{report}");
    info!("load test finished");

    if !report.log_complete() {
        process::exit(2);
    }
    Ok(())
}
