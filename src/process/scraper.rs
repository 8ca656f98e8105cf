//! Builds a [`ProcessSnapshot`] from one `/proc/<pid>` directory.

use std::fs;
use std::os::unix::fs::MetadataExt;
use std::path::Path;

use once_cell::sync::Lazy;
use regex::Regex;

use crate::cache::{IdentityResolver, OwnerCache};
use crate::error::ScrapeError;
use crate::process::memory::parse_memory_for_process;
use crate::process::scanner::parse_pid;
use crate::process::ProcessSnapshot;

/// First parenthesised group of /proc/<pid>/stat holds the comm name.
static NAME_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\((.*?)\)").expect("valid regex"));

/// Options that change how a process is scraped.
#[derive(Debug, Clone, Copy, Default)]
pub struct ScrapeOptions {
    /// Read `smaps_rollup` instead of `smaps` when the kernel provides it.
    pub prefer_rollup: bool,
}

/// Extracts the process name from the content of a stat blob.
pub fn parse_stat_name(stat: &str) -> String {
    NAME_RE
        .captures(stat)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().to_string())
        .unwrap_or_default()
}

/// Reads the process name from /proc/<pid>/stat; empty when unreadable.
pub fn read_process_name(proc_path: &Path) -> String {
    match fs::read(proc_path.join("stat")) {
        Ok(raw) => parse_stat_name(&String::from_utf8_lossy(&raw)),
        Err(_) => String::new(),
    }
}

/// Turns a NUL-separated argument blob into a space-joined command line.
/// Trailing separators are dropped, inner empty arguments are kept.
pub fn join_cmdline(raw: &[u8]) -> String {
    String::from_utf8_lossy(raw)
        .trim_end_matches('\0')
        .replace('\0', " ")
}

/// Reads /proc/<pid>/cmdline; empty for kernel threads, zombies, and
/// processes that vanished or cannot be read.
pub fn read_cmdline(proc_path: &Path) -> String {
    fs::read(proc_path.join("cmdline"))
        .map(|raw| join_cmdline(&raw))
        .unwrap_or_default()
}

/// Resolves the owner of the process directory through the shared cache.
pub fn read_owner<R>(
    proc_path: &Path,
    owners: &mut OwnerCache,
    resolver: &R,
) -> Result<String, ScrapeError>
where
    R: IdentityResolver + ?Sized,
{
    let uid = fs::metadata(proc_path)
        .map_err(|e| ScrapeError::io(proc_path, e))?
        .uid();
    owners.resolve(uid, resolver)
}

/// Populates a snapshot for the process at `proc_path`.
///
/// `command` is the already-read command line. Fails when the pid is
/// invalid, the smaps blob cannot be read, or the owner cannot be resolved.
pub fn populate<R>(
    proc_path: &Path,
    command: String,
    owners: &mut OwnerCache,
    resolver: &R,
    options: ScrapeOptions,
) -> Result<ProcessSnapshot, ScrapeError>
where
    R: IdentityResolver + ?Sized,
{
    let leaf = proc_path
        .file_name()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let pid = match parse_pid(&leaf) {
        Some(pid) if pid > 0 => pid,
        _ => return Err(ScrapeError::InvalidPid(leaf)),
    };

    let mem = parse_memory_for_process(proc_path, options.prefer_rollup)?;
    let name = read_process_name(proc_path);
    let owner = read_owner(proc_path, owners, resolver)?;

    Ok(ProcessSnapshot {
        pid,
        name,
        owner,
        command,
        rss: mem.rss,
        pss: mem.pss,
        uss: mem.uss,
        swap: mem.swap,
    })
}
