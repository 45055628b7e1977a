//! Templeweb main entry point

use anyhow::{bail, Context};
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use templeweb_api::start_server;
use templeweb_client::HttpAccountsApi;
use templeweb_config::Config;
use tokio::runtime::Runtime;

#[derive(Parser, Debug)]
#[command(name = "templeweb")]
#[command(version = "0.1.0")]
#[command(about = "Back-office pages for temple accounts: chart of accounts and journal entries", long_about = None)]
struct Args {
    /// Configuration file path
    #[arg(short, long, default_value = "config.yaml")]
    config: PathBuf,

    /// Print a commented default configuration and exit
    #[arg(long)]
    print_default_config: bool,
}

fn load_config(path: &PathBuf) -> anyhow::Result<Option<Config>> {
    if !path.exists() {
        return Ok(None);
    }
    match Config::load(path.clone()) {
        Ok(config) => Ok(Some(config)),
        Err(e) => {
            eprintln!("{}", e.to_details());
            bail!("invalid configuration in {}", path.display())
        }
    }
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    if args.print_default_config {
        print!("{}", Config::generate_default());
        return Ok(());
    }

    let loaded = load_config(&args.config)?;
    let found = loaded.is_some();
    let config = loaded.unwrap_or_default();

    // RUST_LOG overrides the configured level
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(config.logging.level.as_str())).init();

    if !found {
        log::warn!("Config file {} not found, using defaults", args.config.display());
    }
    log::info!(
        "Config loaded: upstream={}, timeout={}s",
        config.upstream.base_url,
        config.upstream.timeout_secs
    );

    let api = HttpAccountsApi::new(&config.upstream.base_url, Duration::from_secs(config.upstream.timeout_secs))
        .context("failed to build the accounts API client")?;

    let rt = Runtime::new()?;
    rt.block_on(start_server(config, Arc::new(api)))
        .context("server stopped with an error")?;

    Ok(())
}
