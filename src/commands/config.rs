//! Config command implementation.
//!
//! Generates configuration files in various formats.

use std::fs;
use std::path::PathBuf;

use crate::cli::ConfigFormat;
use crate::config::{render_config, Config};

/// Generates a configuration file with default values.
pub fn command_config(
    output: Option<PathBuf>,
    format: ConfigFormat,
) -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::default();
    let output = output.unwrap_or_else(|| PathBuf::from(default_file_name(&format)));

    let mut content = render_config(&config, &format)?;
    if matches!(format, ConfigFormat::Yaml) {
        content = add_config_comments(content);
    }

    if output.to_string_lossy() == "-" {
        print!("{}", content);
    } else {
        fs::write(&output, content)?;
        println!("✅ Configuration written to: {}", output.display());
    }

    Ok(())
}

fn default_file_name(format: &ConfigFormat) -> &'static str {
    match format {
        ConfigFormat::Yaml => "memtop.yaml",
        ConfigFormat::Json => "memtop.json",
        ConfigFormat::Toml => "memtop.toml",
    }
}

/// Adds comments to YAML configuration.
fn add_config_comments(yaml: String) -> String {
    let comments = r#"# memtop configuration
# ====================
#
# proc_root: "/proc"           # Process filesystem root
# refresh_interval_ms: 1000    # Refresh interval (minimum 100)
# sort_key: "rss"              # name, rss, pss, uss or swap
# max_processes: null          # Maximum processes to scan (null = all)
# prefer_smaps_rollup: false   # Read smaps_rollup instead of smaps when present
#
# log_level: "info"            # off, error, warn, info, debug, trace
# log_file: null               # Log file (interactive mode discards logs when null)
"#;

    format!("{comments}\n{yaml}")
}
