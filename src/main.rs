//! Market provisioner
//!
//! Creates the markets listed in a provisioning file and brings their DataStore
//! configuration in line with it. Chain access is configured from the environment
//! (`RPC_HTTP_URL`, `PRIVATE_KEY`, `DATA_STORE_ADDRESS`, `READER_ADDRESS`,
//! `MARKET_FACTORY_ADDRESS`, `MARKET_PAGE_SIZE`).

use clap::Parser;
use eyre::Result;
use market_provisioner::utils::config_loader::ConfigLoader;
use market_provisioner::{
    MARKETS_STEP, ProvisionConfig, ProvisionReport, Provisioner, ProvisionerBuilder, RpcChain, RpcConfig, order_steps,
};
use std::sync::Arc;
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "market-provisioner")]
#[command(about = "Create markets and synchronize their on-chain configuration")]
struct Cli {
    /// Provisioning file path
    #[arg(short, long, default_value = "markets.toml")]
    config: String,

    /// Read current values and report differences without sending transactions
    #[arg(long)]
    dry_run: bool,

    /// Print the run report as JSON on stdout
    #[arg(long)]
    json: bool,

    /// Markets requested per registry page, overrides MARKET_PAGE_SIZE
    #[arg(long)]
    page_size: Option<u64>,

    /// Override log level
    #[arg(long)]
    log_level: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.log_level.as_deref());

    if let Err(e) = run(cli).await {
        error!("Market provisioning failed: {:#}", e);
        return Err(e);
    }
    Ok(())
}

async fn run(cli: Cli) -> Result<()> {
    info!("Loading provisioning file {}", cli.config);
    let config = ProvisionConfig::load_section_from_file(cli.config.clone()).await?;
    let mut rpc_config = RpcConfig::from_env()?;
    if let Some(page_size) = cli.page_size {
        rpc_config.market_page_size = page_size;
    }

    // skipping needs no chain access, so it happens before the connection checks
    if Provisioner::should_skip(&config) {
        warn!("No markets configured in {}, skipping market provisioning", cli.config);
        return print_report(&ProvisionReport::skipped(), cli.json);
    }

    let mut provided = rpc_config.provided_components();
    if !config.tokens.is_empty() {
        provided.insert("Tokens");
    }
    let steps = order_steps(&[MARKETS_STEP], &provided)?;
    info!("Running steps: {:?}", steps.iter().map(|step| step.tag).collect::<Vec<_>>());

    let chain = Arc::new(RpcChain::connect(&rpc_config)?);
    info!("Connected to {}", rpc_config.rpc_http_url);

    let provisioner = ProvisionerBuilder::new()
        .with_chain(chain)
        .with_page_size(rpc_config.market_page_size)
        .dry_run(cli.dry_run)
        .build()?;
    let report = provisioner.provision(&config).await?;
    print_report(&report, cli.json)
}

fn print_report(report: &ProvisionReport, json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(report)?);
    }
    Ok(())
}

fn init_logging(log_level: Option<&str>) {
    let log_level = log_level.and_then(|level| level.parse().ok()).unwrap_or(tracing::Level::INFO);

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| format!("market_provisioner={}", log_level).into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}
