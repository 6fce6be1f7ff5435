mod cache;
mod cli;
mod config;
mod download;
mod error;
mod github;
mod platform;
mod repo_id;

use anyhow::Result;
use cache::{cache_decision, resolve_local_path, CacheDecision, CacheEntry, CacheRoot};
use clap::Parser;
use cli::Cli;
use config::RunConfig;
use github::{find_checksum, resolve_release, select_asset};
use platform::PlatformHint;
use std::fs;
use std::process::Command;

#[tokio::main]
async fn main() {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            // clap renders help and usage errors itself; both paths
            // exit non-zero, including --help.
            let _ = e.print();
            std::process::exit(1);
        }
    };

    if let Err(e) = setup_logging(&cli) {
        eprintln!("Failed to set up logging: {}", e);
        std::process::exit(1);
    }

    let config = match RunConfig::from_cli(&cli) {
        Ok(config) => config,
        Err(e) => {
            tracing::error!("{}", e);
            std::process::exit(1);
        }
    };

    match run(config).await {
        Ok(code) => std::process::exit(code),
        Err(e) => {
            tracing::error!("{}", e);
            std::process::exit(1);
        }
    }
}

/// Resolve, cache, and hand off. Returns the child's exit code; the
/// cache root (and with it any ephemeral directory) is dropped before
/// the process exits.
async fn run(config: RunConfig) -> Result<i32> {
    let cache_root = if config.no_cache {
        CacheRoot::ephemeral()?
    } else {
        CacheRoot::persistent(config.persistent_cache_root()?)
    };

    // Interruption must still remove an ephemeral cache directory.
    if let Some(cleanup) = cache_root.cleanup_path() {
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                let _ = fs::remove_dir_all(&cleanup);
                std::process::exit(130);
            }
        });
    }

    let client = reqwest::Client::new();
    let hint = PlatformHint::detect();

    let release = resolve_release(&client, &config.repo, &config.selector).await?;
    tracing::info!("Resolved {}@{}", config.repo, release.tag_name);

    let asset = select_asset(&release, &hint);
    let entry = CacheEntry::new(cache_root.path(), &config.repo, &asset.name);

    // The checksum file is only worth fetching when a download is due.
    let decision = cache_decision(
        config.force,
        entry.payload_exists(),
        &config.selector,
        entry.recorded_tag().as_deref(),
        &release.tag_name,
    );
    let checksum = match decision {
        CacheDecision::Download => find_checksum(&client, &release, &asset.name).await?,
        CacheDecision::Reuse => None,
    };

    let executable = resolve_local_path(
        &client,
        &entry,
        &asset.browser_download_url,
        &release.tag_name,
        checksum.as_deref(),
        config.force,
        &config.selector,
    )
    .await?;

    tracing::debug!("Executing: {:?} {:?}", executable, config.tool_args);

    let mut child = Command::new(&executable).args(&config.tool_args).spawn()?;
    let status = child.wait()?;

    Ok(status.code().unwrap_or(1))
}

fn setup_logging(cli: &Cli) -> Result<()> {
    use tracing_subscriber::{fmt, EnvFilter};

    let level = if cli.quiet {
        "error"
    } else if cli.verbose == 0 {
        "warn"
    } else if cli.verbose == 1 {
        "info"
    } else {
        "debug"
    };

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_thread_names(false)
        .init();

    Ok(())
}
