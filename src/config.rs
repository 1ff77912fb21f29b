//! Configuration management for the rx-image CLI.
//!
//! This module provides:
//! - Command-line arguments via clap
//! - Environment variables with `RX_IMAGE_` prefix
//! - Defaults for all optional settings
//!
//! # Environment Variables
//!
//! - `RX_IMAGE_ROOT` - Base directory for relative image paths
//! - `RX_IMAGE_CACHE_IMAGES` - Decoded images kept in memory (default: 64)
//! - `RX_IMAGE_FORMAT` - Report format for `load`, `text` or `json` (default: text)
//! - `RX_IMAGE_SETTLE_MS` - How long `prefetch` waits for background work (default: 500)

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

use crate::fetch::DEFAULT_IMAGE_CACHE_CAPACITY;
use crate::Locator;

// =============================================================================
// Default Values
// =============================================================================

/// Default time in milliseconds to keep the runtime alive after a prefetch.
pub const DEFAULT_SETTLE_MS: u64 = 500;

// =============================================================================
// CLI Arguments
// =============================================================================

/// rx-image - Load and prefetch images through the reactive image service.
#[derive(Parser, Debug, Clone)]
#[command(name = "rx-image")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Load images and report their loading states.
    Load(LoadConfig),

    /// Warm the image cache without waiting for results.
    Prefetch(PrefetchConfig),
}

impl Cli {
    pub fn into_command(self) -> Command {
        self.command
    }
}

impl Command {
    pub fn fetcher(&self) -> &FetcherConfig {
        match self {
            Command::Load(config) => &config.fetcher,
            Command::Prefetch(config) => &config.fetcher,
        }
    }
}

/// Output format for the `load` report.
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

/// Settings shared by every command.
#[derive(Args, Debug, Clone)]
pub struct FetcherConfig {
    /// Base directory that relative image paths are resolved against.
    ///
    /// Defaults to the current working directory.
    #[arg(long, env = "RX_IMAGE_ROOT")]
    pub root: Option<PathBuf>,

    /// Maximum number of decoded images kept in memory.
    #[arg(long, default_value_t = DEFAULT_IMAGE_CACHE_CAPACITY, env = "RX_IMAGE_CACHE_IMAGES")]
    pub cache_images: usize,

    /// Enable verbose logging (debug level).
    #[arg(short, long, default_value_t = false)]
    pub verbose: bool,
}

impl FetcherConfig {
    /// Validate the configuration and return an error message if invalid.
    pub fn validate(&self) -> Result<(), String> {
        if self.cache_images == 0 {
            return Err("cache_images must be greater than 0".to_string());
        }

        if let Some(root) = &self.root {
            if !root.is_dir() {
                return Err(format!("root '{}' is not a directory", root.display()));
            }
        }

        Ok(())
    }

    /// Turn a command-line argument into a locator.
    ///
    /// Anything containing `://` is parsed as a URL. Everything else is a
    /// filesystem path, resolved against `root` (or the working directory)
    /// when relative.
    pub fn resolve_locator(&self, raw: &str) -> Result<Locator, String> {
        if raw.contains("://") {
            return Locator::parse(raw).map_err(|e| format!("invalid URL '{}': {}", raw, e));
        }

        let mut path = PathBuf::from(raw);
        if path.is_relative() {
            let base = match &self.root {
                Some(root) => root.clone(),
                None => std::env::current_dir()
                    .map_err(|e| format!("cannot resolve '{}': {}", raw, e))?,
            };
            path = base.join(path);
        }

        Locator::from_file_path(&path)
            .map_err(|_| format!("cannot turn '{}' into a file URL", path.display()))
    }

    /// Resolve every argument, failing on the first invalid one.
    pub fn resolve_locators(&self, raw: &[String]) -> Result<Vec<Locator>, String> {
        raw.iter().map(|r| self.resolve_locator(r)).collect()
    }
}

/// Arguments for `rx-image load`.
#[derive(Args, Debug, Clone)]
pub struct LoadConfig {
    #[command(flatten)]
    pub fetcher: FetcherConfig,

    /// Image URLs or file paths to load.
    #[arg(required = true)]
    pub locators: Vec<String>,

    /// Report format.
    #[arg(long, value_enum, default_value_t = OutputFormat::Text, env = "RX_IMAGE_FORMAT")]
    pub format: OutputFormat,
}

impl LoadConfig {
    pub fn validate(&self) -> Result<(), String> {
        if self.locators.is_empty() {
            return Err("at least one locator is required".to_string());
        }
        self.fetcher.validate()
    }
}

/// Arguments for `rx-image prefetch`.
#[derive(Args, Debug, Clone)]
pub struct PrefetchConfig {
    #[command(flatten)]
    pub fetcher: FetcherConfig,

    /// Image URLs or file paths to prefetch.
    #[arg(required = true)]
    pub locators: Vec<String>,

    /// Upper bound, in milliseconds, on waiting for prefetched images to be cached.
    #[arg(long, default_value_t = DEFAULT_SETTLE_MS, env = "RX_IMAGE_SETTLE_MS")]
    pub settle_ms: u64,
}

impl PrefetchConfig {
    pub fn validate(&self) -> Result<(), String> {
        if self.locators.is_empty() {
            return Err("at least one locator is required".to_string());
        }
        self.fetcher.validate()
    }
}

// =============================================================================
// Tests
// =============================================================================
