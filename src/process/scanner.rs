//! Process scanning utilities for discovering process entries in /proc and
//! assembling the sorted process collection.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, instrument, warn};

use crate::cache::{IdentityResolver, OwnerCache};
use crate::error::ScanError;
use crate::process::scraper::{populate, read_cmdline, ScrapeOptions};
use crate::process::ProcessSnapshot;
use crate::sort::{sort_collection, SortKey};

/// Process entry representing a directory in /proc filesystem.
#[derive(Debug, Clone)]
pub struct ProcEntry {
    pub pid: u32,
    pub proc_path: PathBuf,
}

/// Parses a directory name as a process id.
///
/// Only plain non-negative decimal integers qualify: no sign, no
/// whitespace, nothing trailing.
pub fn parse_pid(name: &str) -> Option<u32> {
    if name.is_empty() || !name.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    name.parse().ok()
}

/// Scans `root` for entries whose names are process ids.
pub fn collect_proc_entries(root: &Path, max: Option<usize>) -> Result<Vec<ProcEntry>, ScanError> {
    let entries = fs::read_dir(root).map_err(|source| ScanError::ReadRoot {
        path: root.to_path_buf(),
        source,
    })?;

    let mut out = Vec::new();
    for entry in entries.flatten() {
        let name = entry.file_name();
        let pid = match name.to_str().and_then(parse_pid) {
            Some(v) => v,
            None => continue,
        };
        out.push(ProcEntry {
            pid,
            proc_path: entry.path(),
        });
        if let Some(maxp) = max {
            if out.len() >= maxp {
                break;
            }
        }
    }
    Ok(out)
}

/// Parameters of one collection build.
#[derive(Debug, Clone, Copy, Default)]
pub struct ScanOptions {
    pub sort_key: SortKey,
    pub max_processes: Option<usize>,
    pub scrape: ScrapeOptions,
}

impl ScanOptions {
    pub fn sorted_by(sort_key: SortKey) -> Self {
        Self {
            sort_key,
            ..Self::default()
        }
    }
}

/// Builds the sorted process collection, failing only when `root` itself
/// cannot be listed.
///
/// Processes without a command line (kernel threads, zombies) are dropped
/// before any other file is read. Processes whose snapshot cannot be
/// populated are skipped silently; they usually exited mid-scan.
#[instrument(skip(root, owners, resolver), fields(root = %root.display()))]
pub fn scan<R>(
    root: &Path,
    options: ScanOptions,
    owners: &mut OwnerCache,
    resolver: &R,
) -> Result<Vec<ProcessSnapshot>, ScanError>
where
    R: IdentityResolver + ?Sized,
{
    let entries = collect_proc_entries(root, options.max_processes)?;
    let candidates = entries.len();

    let mut procs = Vec::with_capacity(candidates);
    for entry in entries {
        let command = read_cmdline(&entry.proc_path);
        if command.is_empty() {
            continue;
        }
        match populate(&entry.proc_path, command, owners, resolver, options.scrape) {
            Ok(snapshot) => procs.push(snapshot),
            Err(e) => debug!(pid = entry.pid, "skipping process: {}", e),
        }
    }

    sort_collection(&mut procs, options.sort_key);
    debug!(candidates, kept = procs.len(), "scan complete");
    Ok(procs)
}

/// Outcome of one [`build`]: the sorted processes, plus the reason the
/// collection is empty when the root itself could not be read.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProcessCollection {
    pub processes: Vec<ProcessSnapshot>,
    pub diagnostic: Option<String>,
}

/// Like [`scan`], but an unreadable root is logged and yields an empty
/// collection carrying the error text.
pub fn build<R>(
    root: &Path,
    options: ScanOptions,
    owners: &mut OwnerCache,
    resolver: &R,
) -> ProcessCollection
where
    R: IdentityResolver + ?Sized,
{
    match scan(root, options, owners, resolver) {
        Ok(processes) => ProcessCollection {
            processes,
            diagnostic: None,
        },
        Err(e) => {
            warn!("{}", e);
            ProcessCollection {
                processes: Vec::new(),
                diagnostic: Some(e.to_string()),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_pid() {
        assert_eq!(parse_pid("12"), Some(12));
        assert_eq!(parse_pid("0"), Some(0));
        assert_eq!(parse_pid("4194304"), Some(4194304));

        assert_eq!(parse_pid("12a"), None);
        assert_eq!(parse_pid("-1"), None);
        assert_eq!(parse_pid("+1"), None);
        assert_eq!(parse_pid(""), None);
        assert_eq!(parse_pid(" 12"), None);
        assert_eq!(parse_pid("self"), None);
        assert_eq!(parse_pid("99999999999999999999"), None);
    }

    #[test]
    fn test_collect_proc_entries_filters_names() {
        let root = tempfile::tempdir().unwrap();
        for name in ["1", "42", "self", "12a", "sys", "-1"] {
            fs::create_dir(root.path().join(name)).unwrap();
        }

        let mut pids: Vec<u32> = collect_proc_entries(root.path(), None)
            .unwrap()
            .iter()
            .map(|e| e.pid)
            .collect();
        pids.sort_unstable();
        assert_eq!(pids, vec![1, 42]);

        assert_eq!(collect_proc_entries(root.path(), Some(1)).unwrap().len(), 1);
    }

    #[test]
    fn test_collect_proc_entries_missing_root() {
        let root = tempfile::tempdir().unwrap();
        let missing = root.path().join("nope");
        assert!(matches!(
            collect_proc_entries(&missing, None),
            Err(ScanError::ReadRoot { .. })
        ));
    }
}
