//! rx-image - Load and prefetch images from the command line.
//!
//! This binary wires the filesystem backend into the image service and
//! drives loading-state streams for the requested locators.

use clap::Parser;
use futures::future::join_all;
use futures::StreamExt;
use serde::Serialize;
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use rx_image::{
    config::{Cli, Command, FetcherConfig, LoadConfig, OutputFormat, PrefetchConfig},
    FileFetcher, ImageService, ImageServiceRef, ImageView, LoadingState, Locator,
};

#[tokio::main]
async fn main() -> ExitCode {
    let command = Cli::parse().into_command();

    init_logging(command.fetcher().verbose);

    match command {
        Command::Load(config) => run_load(config).await,
        Command::Prefetch(config) => run_prefetch(config).await,
    }
}

// =============================================================================
// Load Command
// =============================================================================

/// Outcome of loading one locator, as printed by `rx-image load`.
#[derive(Debug, Serialize)]
struct LoadReport {
    locator: String,
    states: Vec<&'static str>,
    loaded: bool,
    width: Option<u32>,
    height: Option<u32>,
    error: Option<String>,
}

async fn run_load(config: LoadConfig) -> ExitCode {
    if let Err(e) = config.validate() {
        error!("Configuration error: {}", e);
        return ExitCode::FAILURE;
    }

    let locators = match config.fetcher.resolve_locators(&config.locators) {
        Ok(locators) => locators,
        Err(e) => {
            error!("Invalid locator: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let service = build_service(&config.fetcher);
    let reports = join_all(locators.into_iter().map(|l| load_one(l, &service))).await;

    if let Err(e) = print_reports(&reports, config.format) {
        error!("Failed to write report: {}", e);
        return ExitCode::FAILURE;
    }

    if reports.iter().all(|r| r.loaded) {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}

async fn load_one(locator: Locator, service: &ImageServiceRef) -> LoadReport {
    let view = ImageView::new();
    let mut states = view.load_with_status(Some(locator.clone()), Some(service.clone()));

    let mut report = LoadReport {
        locator: locator.to_string(),
        states: Vec::new(),
        loaded: false,
        width: None,
        height: None,
        error: None,
    };

    while let Some(state) = states.next().await {
        info!(%locator, ?state, "Loading state");
        match state {
            LoadingState::Loading => report.states.push("loading"),
            LoadingState::Loaded(()) => {
                report.states.push("loaded");
                report.loaded = true;
            }
            LoadingState::Error(e) => {
                report.states.push("error");
                report.error = Some(e.to_string());
            }
        }
    }

    if let Some(image) = view.image() {
        report.width = Some(image.width());
        report.height = Some(image.height());
    }

    report
}

fn print_reports(reports: &[LoadReport], format: OutputFormat) -> Result<(), serde_json::Error> {
    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(reports)?),
        OutputFormat::Text => {
            for report in reports {
                match (report.width, report.height, &report.error) {
                    (Some(w), Some(h), _) => println!("ok     {}x{}  {}", w, h, report.locator),
                    (_, _, Some(e)) => println!("failed {}", e),
                    _ => println!("failed {}", report.locator),
                }
            }
        }
    }
    Ok(())
}

// =============================================================================
// Prefetch Command
// =============================================================================

async fn run_prefetch(config: PrefetchConfig) -> ExitCode {
    if let Err(e) = config.validate() {
        error!("Configuration error: {}", e);
        return ExitCode::FAILURE;
    }

    let locators = match config.fetcher.resolve_locators(&config.locators) {
        Ok(locators) => locators,
        Err(e) => {
            error!("Invalid locator: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let fetcher = Arc::new(build_fetcher(&config.fetcher));
    let service = ImageService::with_shared_fetcher(Arc::clone(&fetcher)).into_ref();
    service.prefetch_all(&locators);
    info!(count = locators.len(), "Prefetch issued");

    let cached = fetcher
        .settle(&locators, Duration::from_millis(config.settle_ms))
        .await;
    let cache_len = fetcher.cache_len().await;
    info!(cached, total = locators.len(), cache_len, "Prefetch settled");
    println!("cached {}/{}", cached, locators.len());

    if cached == locators.len() {
        ExitCode::SUCCESS
    } else {
        warn!(
            missing = locators.len() - cached,
            "Some locators were not cached before the deadline"
        );
        ExitCode::FAILURE
    }
}

// =============================================================================
// Helpers
// =============================================================================

fn build_fetcher(config: &FetcherConfig) -> FileFetcher {
    FileFetcher::with_capacity(config.cache_images)
}

fn build_service(config: &FetcherConfig) -> ImageServiceRef {
    ImageService::new(build_fetcher(config)).into_ref()
}

fn init_logging(verbose: bool) {
    let env_filter = if verbose {
        "rx_image=debug"
    } else {
        "rx_image=info"
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| env_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}
