//! Snapshot command implementation.
//!
//! Scans once and prints the process table to stdout.

use std::io::{self, IsTerminal, Write};
use std::path::Path;

use memtop::presenter::{self, TerminalSize};
use memtop::process::{scan, ScanOptions};
use memtop::{IdentityResolver, OwnerCache, ProcessSnapshot};

use crate::config::Config;
use crate::terminal::{query_size, size_from_env};

/// Width used when stdout is not a terminal and COLUMNS is unset.
const PIPE_WIDTH: u16 = 120;

/// Builds the report lines for one scan.
pub fn render_snapshot<R: IdentityResolver>(
    root: &Path,
    options: ScanOptions,
    limit: Option<usize>,
    width: u16,
    resolver: &R,
) -> Result<Vec<String>, Box<dyn std::error::Error>> {
    let mut owners = OwnerCache::new();
    let mut procs: Vec<ProcessSnapshot> = scan(root, options, &mut owners, resolver)?;
    if let Some(n) = limit {
        procs.truncate(n);
    }

    let grid = presenter::format(&procs);
    // Every row fits, the report is not bound by screen height
    let height = u16::try_from(grid.rows.len()).unwrap_or(u16::MAX);
    Ok(presenter::layout(&grid, TerminalSize::new(width, height), None))
}

/// Prints the process table once.
pub fn command_snapshot(
    limit: Option<usize>,
    config: &Config,
) -> Result<(), Box<dyn std::error::Error>> {
    let width = if io::stdout().is_terminal() {
        query_size().width
    } else if std::env::var_os("COLUMNS").is_some() {
        size_from_env().width
    } else {
        PIPE_WIDTH
    };

    let lines = render_snapshot(
        &config.proc_root(),
        config.scan_options(),
        limit,
        width,
        &memtop::SystemIdentity,
    )?;

    let stdout = io::stdout();
    let mut out = stdout.lock();
    for line in lines {
        writeln!(out, "{}", line)?;
    }
    Ok(())
}
