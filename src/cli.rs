//! CLI arguments and subcommands for memtop.
//!
//! This module defines the command-line interface structure using the clap library,
//! including all flags, options, and subcommands.

use clap::{Parser, Subcommand, ValueEnum};
use memtop::SortKey;
use std::path::PathBuf;

/// Log level options for CLI parsing
#[derive(Debug, Clone, ValueEnum)]
pub enum LogLevel {
    Off,
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// Configuration format options for output
#[derive(Debug, Clone, ValueEnum)]
pub enum ConfigFormat {
    Yaml,
    Json,
    Toml,
}

/// Main CLI arguments structure
#[derive(Parser, Debug)]
#[command(
    name = "memtop",
    about = "Live per-process RSS/PSS/USS/swap monitor",
    long_about = "Live per-process RSS/PSS/USS/swap monitor.\n\n\
                  Scans /proc/<pid>/smaps for every process with a command line and shows \
                  a continuously refreshed table sorted by the selected column.",
    version,
    propagate_version = true,
    after_help = "Once running, hit n, r, p, s, or u to sort by Name, RSS, PSS, SwapPSS, or USS. \
                  RSS is default. Hit q or Ctrl-C to quit."
)]
pub struct Args {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Start sorted by name, rss, pss, swap, or uss
    #[arg(short = 's', long, value_enum)]
    pub sort: Option<SortKey>,

    /// Refresh interval in milliseconds
    #[arg(short = 'i', long)]
    pub interval_ms: Option<u64>,

    /// Process filesystem root
    #[arg(long)]
    pub proc_root: Option<PathBuf>,

    /// Read smaps_rollup instead of smaps when available
    #[arg(long)]
    pub rollup: bool,

    /// Maximum number of processes to scan
    #[arg(long)]
    pub max_processes: Option<usize>,

    /// Log level
    #[arg(long, value_enum)]
    pub log_level: Option<LogLevel>,

    /// Append logs to this file (interactive mode discards logs otherwise)
    #[arg(long)]
    pub log_file: Option<PathBuf>,

    /// Config file (YAML/JSON/TOML)
    #[arg(short = 'c', long)]
    pub config: Option<PathBuf>,

    /// Disable all config file loading
    #[arg(long)]
    pub no_config: bool,

    /// Print effective merged config and exit
    #[arg(long)]
    pub show_config: bool,

    /// Output format for --show-config
    #[arg(long, value_enum, default_value = "yaml")]
    pub config_format: ConfigFormat,

    /// Validate config and exit (return code 1 on error)
    #[arg(long)]
    pub check_config: bool,
}

/// Subcommands for additional functionality
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Print the process table once and exit
    Snapshot {
        /// Print at most N processes
        #[arg(short = 'n', long)]
        limit: Option<usize>,
    },

    /// Validate configuration and /proc accessibility
    Check,

    /// Generate a configuration file
    Config {
        /// Output file path ("-" for stdout)
        #[arg(short = 'o', long)]
        output: Option<PathBuf>,

        /// Output format
        #[arg(long, value_enum, default_value = "yaml")]
        format: ConfigFormat,
    },
}
