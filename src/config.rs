//! Configuration management for memtop.
//!
//! This module handles loading, merging, and validating configuration from files
//! and CLI arguments. It supports YAML, JSON, and TOML formats.

use crate::cli::{Args, ConfigFormat, LogLevel};
use memtop::{ScanOptions, ScrapeOptions, SortKey};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::info;

// Default configuration constants
pub const DEFAULT_PROC_ROOT: &str = "/proc";
pub const DEFAULT_REFRESH_INTERVAL_MS: u64 = 1000;
pub const MIN_REFRESH_INTERVAL_MS: u64 = 100;

/// Config files tried in order when `--config` is not given.
pub const DEFAULT_CONFIG_PATHS: [&str; 8] = [
    "/etc/memtop/memtop.yaml",
    "/etc/memtop/memtop.yml",
    "/etc/memtop/memtop.json",
    "/etc/memtop/memtop.toml",
    "./memtop.yaml",
    "./memtop.yml",
    "./memtop.json",
    "./memtop.toml",
];

/// Enhanced configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    // Scanning
    #[serde(alias = "proc-root")]
    pub proc_root: Option<PathBuf>,
    #[serde(alias = "refresh-interval-ms")]
    pub refresh_interval_ms: Option<u64>,
    #[serde(alias = "sort-key")]
    pub sort_key: Option<SortKey>,
    #[serde(alias = "max-processes")]
    pub max_processes: Option<usize>,
    #[serde(alias = "prefer-smaps-rollup")]
    pub prefer_smaps_rollup: Option<bool>,

    // Logging
    #[serde(alias = "log-level")]
    pub log_level: Option<String>,
    #[serde(alias = "log-file")]
    pub log_file: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            proc_root: Some(PathBuf::from(DEFAULT_PROC_ROOT)),
            refresh_interval_ms: Some(DEFAULT_REFRESH_INTERVAL_MS),
            sort_key: Some(SortKey::default()),
            max_processes: None,
            prefer_smaps_rollup: Some(false),
            log_level: Some("info".into()),
            log_file: None,
        }
    }
}

impl Config {
    pub fn proc_root(&self) -> PathBuf {
        self.proc_root
            .clone()
            .unwrap_or_else(|| PathBuf::from(DEFAULT_PROC_ROOT))
    }

    pub fn refresh_interval(&self) -> Duration {
        Duration::from_millis(
            self.refresh_interval_ms
                .unwrap_or(DEFAULT_REFRESH_INTERVAL_MS),
        )
    }

    pub fn scan_options(&self) -> ScanOptions {
        ScanOptions {
            sort_key: self.sort_key.unwrap_or_default(),
            max_processes: self.max_processes,
            scrape: ScrapeOptions {
                prefer_rollup: self.prefer_smaps_rollup.unwrap_or(false),
            },
        }
    }
}

/// Validate effective config (used by --check-config and at startup)
pub fn validate_effective_config(cfg: &Config) -> Result<(), Box<dyn std::error::Error>> {
    let interval = cfg
        .refresh_interval_ms
        .unwrap_or(DEFAULT_REFRESH_INTERVAL_MS);
    if interval < MIN_REFRESH_INTERVAL_MS {
        return Err(format!(
            "refresh_interval_ms must be at least {} (got {})",
            MIN_REFRESH_INTERVAL_MS, interval
        )
        .into());
    }

    if cfg.max_processes == Some(0) {
        return Err("max_processes must be greater than 0 when set".into());
    }

    let root = cfg.proc_root();
    if !root.is_dir() {
        return Err(format!("proc_root is not a directory: {}", root.display()).into());
    }

    if let Some(level) = cfg.log_level.as_deref() {
        if parse_log_level(level).is_none() {
            return Err(format!(
                "Invalid log_level '{}', expected off, error, warn, info, debug or trace",
                level
            )
            .into());
        }
    }

    Ok(())
}

/// Parses a log level name as used in config files.
pub fn parse_log_level(s: &str) -> Option<LogLevel> {
    match s.to_ascii_lowercase().as_str() {
        "off" => Some(LogLevel::Off),
        "error" => Some(LogLevel::Error),
        "warn" => Some(LogLevel::Warn),
        "info" => Some(LogLevel::Info),
        "debug" => Some(LogLevel::Debug),
        "trace" => Some(LogLevel::Trace),
        _ => None,
    }
}

/// Resolves configuration from CLI args, config file, and defaults.
/// This enforces precedence: CLI (if provided) > config file > default.
pub fn resolve_config(args: &Args) -> Result<Config, Box<dyn std::error::Error>> {
    let mut config = if args.no_config {
        Config::default()
    } else {
        load_config(args.config.as_deref())?
    };

    if let Some(root) = &args.proc_root {
        config.proc_root = Some(root.clone());
    }
    if let Some(ms) = args.interval_ms {
        config.refresh_interval_ms = Some(ms);
    }
    if let Some(key) = args.sort {
        config.sort_key = Some(key);
    }
    if args.max_processes.is_some() {
        config.max_processes = args.max_processes;
    }
    if args.rollup {
        config.prefer_smaps_rollup = Some(true);
    }

    // Logging: CLI wins if provided
    if let Some(level) = &args.log_level {
        config.log_level = Some(format!("{:?}", level).to_ascii_lowercase());
    }
    if let Some(file) = &args.log_file {
        config.log_file = Some(file.clone());
    }

    Ok(config)
}

/// First candidate that exists on disk.
fn find_config_file<P: AsRef<Path>>(candidates: &[P]) -> Option<PathBuf> {
    candidates
        .iter()
        .find(|p| p.as_ref().exists())
        .map(|p| p.as_ref().to_path_buf())
}

/// Enhanced configuration loading with multiple format support
pub fn load_config(path: Option<&Path>) -> Result<Config, Box<dyn std::error::Error>> {
    let path = match path {
        Some(p) => p.to_path_buf(),
        None => match find_config_file(&DEFAULT_CONFIG_PATHS) {
            Some(p) => p,
            None => return Ok(Config::default()),
        },
    };

    let content = fs::read_to_string(&path)
        .map_err(|e| format!("cannot read config file {}: {}", path.display(), e))?;

    let config = parse_config(&content, path.extension().and_then(|s| s.to_str()))?;
    info!("Loaded configuration from: {}", path.display());
    Ok(config)
}

/// Parses config content; the format follows the file extension and
/// defaults to YAML.
pub fn parse_config(content: &str, extension: Option<&str>) -> Result<Config, Box<dyn std::error::Error>> {
    let config = match extension {
        Some("json") => serde_json::from_str(content)?,
        Some("toml") => toml::from_str(content)?,
        _ => serde_yaml::from_str(content)?,
    };
    Ok(config)
}

/// Serializes a configuration in the requested format.
pub fn render_config(config: &Config, format: &ConfigFormat) -> Result<String, Box<dyn std::error::Error>> {
    let output = match format {
        ConfigFormat::Json => serde_json::to_string_pretty(config)?,
        ConfigFormat::Toml => toml::to_string_pretty(config)?,
        ConfigFormat::Yaml => serde_yaml::to_string(config)?,
    };
    Ok(output)
}

/// Shows configuration in requested format
pub fn show_config(config: &Config, format: &ConfigFormat) -> Result<(), Box<dyn std::error::Error>> {
    println!("{}", render_config(config, format)?);
    Ok(())
}
