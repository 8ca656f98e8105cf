//! memtop - version 0.3.0
//!
//! Live terminal monitor of per-process memory usage.
//! This is the main entry point that resolves configuration, sets up logging
//! and either runs a subcommand or the interactive monitor.

mod cli;
mod commands;
mod config;
mod event_loop;
mod startup_checks;
mod terminal;

use clap::Parser;
use std::fs::OpenOptions;
use std::io;
use std::sync::Mutex;
use tracing::level_filters::LevelFilter;
use tracing::{info, warn};

use cli::{Args, Commands, LogLevel};
use commands::{command_check, command_config, command_snapshot};
use config::{parse_log_level, resolve_config, show_config, validate_effective_config, Config};

/// Initializes tracing logging subsystem with configured log level.
///
/// The interactive monitor owns the screen, so there logs only go to the
/// configured log file. Subcommands log to stderr unless a file is set.
fn setup_logging(config: &Config, interactive: bool) -> Result<(), Box<dyn std::error::Error>> {
    let log_level = config
        .log_level
        .as_deref()
        .and_then(parse_log_level)
        .unwrap_or(LogLevel::Info);
    let filter = match log_level {
        LogLevel::Off => LevelFilter::OFF,
        LogLevel::Error => LevelFilter::ERROR,
        LogLevel::Warn => LevelFilter::WARN,
        LogLevel::Info => LevelFilter::INFO,
        LogLevel::Debug => LevelFilter::DEBUG,
        LogLevel::Trace => LevelFilter::TRACE,
    };

    let builder = tracing_subscriber::fmt()
        .with_max_level(filter)
        .with_target(true)
        .with_thread_ids(false)
        .with_file(true)
        .with_line_number(true);

    match (&config.log_file, interactive) {
        (Some(path), _) => {
            let file = OpenOptions::new().create(true).append(true).open(path)?;
            let subscriber = builder
                .with_ansi(false)
                .with_writer(Mutex::new(file))
                .finish();
            tracing::subscriber::set_global_default(subscriber)?;
        }
        (None, true) => {
            let subscriber = builder.with_writer(io::sink).finish();
            tracing::subscriber::set_global_default(subscriber)?;
        }
        (None, false) => {
            let subscriber = builder.with_writer(io::stderr).finish();
            tracing::subscriber::set_global_default(subscriber)?;
        }
    }

    info!("Logging initialized with level: {:?}", log_level);
    Ok(())
}

/// Helper function to load and validate configuration.
/// Exits the process with error code 1 if validation fails.
fn load_validated_config(args: &Args) -> Result<Config, Box<dyn std::error::Error>> {
    let config = resolve_config(args)?;
    if let Err(e) = validate_effective_config(&config) {
        eprintln!("❌ Configuration invalid: {}", e);
        std::process::exit(1);
    }
    Ok(config)
}

/// Main application entry point.
#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    // Early config resolution for show/check modes
    if args.show_config || args.check_config {
        let config = resolve_config(&args)?;

        if args.check_config {
            if let Err(e) = validate_effective_config(&config) {
                eprintln!("❌ Configuration invalid: {}", e);
                std::process::exit(1);
            }
            println!("✅ Configuration is valid");
            return Ok(());
        }

        return show_config(&config, &args.config_format);
    }

    // Handle subcommands
    if let Some(command) = &args.command {
        // Writing a default config needs no existing one
        if let Commands::Config { output, format } = command {
            return command_config(output.clone(), format.clone());
        }

        let config = load_validated_config(&args)?;
        setup_logging(&config, false)?;

        return match command {
            Commands::Snapshot { limit } => command_snapshot(*limit, &config),
            Commands::Check => command_check(&config),
            Commands::Config { .. } => unreachable!("Config handled above"),
        };
    }

    let config = load_validated_config(&args)?;
    setup_logging(&config, true)?;

    info!("Starting memtop {}", env!("CARGO_PKG_VERSION"));

    if let Err(e) = startup_checks::validate_requirements(&config.proc_root()) {
        warn!("Startup validation: {}", e);
        // Continue anyway - the table just shows fewer processes
    }

    // The terminal is restored by the time run() returns
    if let Err(e) = event_loop::run(&config).await {
        eprintln!("❌ {}", e);
        std::process::exit(1);
    }

    info!("memtop stopped");
    Ok(())
}
