//! Memory parsing utilities for reading process memory metrics from /proc.
//!
//! This module provides functions to aggregate the per-mapping accounting
//! fields of `/proc/<pid>/smaps` (or the pre-summed `smaps_rollup`) into
//! RSS, PSS, USS and swap totals. All values are in kilobytes.

use std::fs;
use std::io::{BufRead, BufReader};
use std::path::Path;

use crate::error::ScrapeError;

/// Aggregated memory counters of one process, in kB.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MemoryTotals {
    pub rss: u64,
    pub pss: u64,
    pub uss: u64,
    pub swap: u64,
}

/// Returns the value of `field` on a smaps line, or 0.
///
/// The first token must be exactly `<field>:`, so `Swap` does not pick up
/// `SwapPss:` lines. A missing or non-numeric value counts as 0.
pub fn smaps_field(line: &str, field: &str) -> u64 {
    let mut tokens = line.split_whitespace();
    let matches = tokens
        .next()
        .and_then(|t| t.strip_prefix(field))
        .is_some_and(|rest| rest == ":");
    if !matches {
        return 0;
    }
    tokens.next().and_then(|v| v.parse().ok()).unwrap_or(0)
}

/// Running sums over smaps lines.
#[derive(Debug, Default)]
struct Accumulator {
    rss: u64,
    pss: u64,
    private_clean: u64,
    private_dirty: u64,
    swap: u64,
    swap_pss: u64,
    has_swap_pss: bool,
}

impl Accumulator {
    fn feed(&mut self, line: &str) {
        self.rss += smaps_field(line, "Rss");
        self.pss += smaps_field(line, "Pss");
        self.private_clean += smaps_field(line, "Private_Clean");
        self.private_dirty += smaps_field(line, "Private_Dirty");
        self.swap += smaps_field(line, "Swap");
        if line.starts_with("SwapPss:") {
            self.has_swap_pss = true;
            self.swap_pss += smaps_field(line, "SwapPss");
        }
    }

    fn finish(self) -> MemoryTotals {
        // Kernels before 4.3 have no SwapPss, fall back to plain Swap.
        let swap = if self.has_swap_pss {
            self.swap_pss
        } else {
            self.swap
        };
        MemoryTotals {
            rss: self.rss,
            pss: self.pss,
            uss: self.private_clean + self.private_dirty,
            swap,
        }
    }
}

/// Aggregates memory totals from any line-oriented smaps blob.
pub fn aggregate_smaps<R: BufRead>(reader: R) -> Result<MemoryTotals, std::io::Error> {
    let mut acc = Accumulator::default();
    for line in reader.lines() {
        acc.feed(&line?);
    }
    Ok(acc.finish())
}

/// Parses memory metrics from a smaps (or smaps_rollup) file.
pub fn parse_smaps(path: &Path) -> Result<MemoryTotals, ScrapeError> {
    let file = fs::File::open(path).map_err(|e| ScrapeError::io(path, e))?;
    aggregate_smaps(BufReader::new(file)).map_err(|e| ScrapeError::io(path, e))
}

/// Reads the memory totals of the process at `proc_path`.
///
/// With `prefer_rollup` the kernel-summed `smaps_rollup` (Linux >= 4.14) is
/// used when present, which is much cheaper than walking every mapping.
pub fn parse_memory_for_process(
    proc_path: &Path,
    prefer_rollup: bool,
) -> Result<MemoryTotals, ScrapeError> {
    if prefer_rollup {
        let rollup = proc_path.join("smaps_rollup");
        if rollup.exists() {
            return parse_smaps(&rollup);
        }
    }
    parse_smaps(&proc_path.join("smaps"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    // -------------------------------------------------------------------------
    // Tests for smaps_field
    // -------------------------------------------------------------------------

    #[test]
    fn test_smaps_field() {
        assert_eq!(smaps_field("Rss:                 100 kB", "Rss"), 100);
        assert_eq!(smaps_field("Pss: 80 kB", "Pss"), 80);
        assert_eq!(smaps_field("Private_Dirty:   0 kB", "Private_Dirty"), 0);

        // Other fields do not match
        assert_eq!(smaps_field("Pss: 80 kB", "Rss"), 0);
        assert_eq!(smaps_field("SwapPss: 5 kB", "Swap"), 0);
        assert_eq!(smaps_field("Pss_Anon: 5 kB", "Pss"), 0);

        // Mapping header lines
        assert_eq!(
            smaps_field("7f1c2a000000-7f1c2a021000 rw-p 00000000 00:00 0", "Rss"),
            0
        );
    }

    #[test]
    fn test_smaps_field_invalid() {
        assert_eq!(smaps_field("", "Rss"), 0);
        assert_eq!(smaps_field("Rss:", "Rss"), 0);
        assert_eq!(smaps_field("Rss: lots kB", "Rss"), 0);
        assert_eq!(smaps_field("Rss: -1 kB", "Rss"), 0);
        assert_eq!(smaps_field("Rss: 1.5 kB", "Rss"), 0);
    }

    // -------------------------------------------------------------------------
    // Tests for aggregate_smaps
    // -------------------------------------------------------------------------

    const TWO_MAPPINGS: &str = "\
55d5c1a00000-55d5c1a2c000 r--p 00000000 fd:01 1835064    /usr/bin/bash
Size:                176 kB
Rss:                  60 kB
Pss:                  50 kB
Private_Clean:        10 kB
Private_Dirty:        20 kB
Swap:                  4 kB
SwapPss:               3 kB
7ffd4e5e1000-7ffd4e602000 rw-p 00000000 00:00 0          [stack]
Rss:                  40 kB
Pss:                  30 kB
Private_Clean:        10 kB
Private_Dirty:        10 kB
Swap:                  2 kB
SwapPss:               2 kB
";

    #[test]
    fn test_aggregate_sums_all_mappings() {
        let totals = aggregate_smaps(Cursor::new(TWO_MAPPINGS)).unwrap();
        assert_eq!(
            totals,
            MemoryTotals {
                rss: 100,
                pss: 80,
                uss: 50,
                swap: 5,
            }
        );
    }

    #[test]
    fn test_swap_falls_back_without_swap_pss() {
        let blob = "Rss: 10 kB\nSwap: 7 kB\nSwap: 1 kB\n";
        let totals = aggregate_smaps(Cursor::new(blob)).unwrap();
        assert_eq!(totals.swap, 8);
        assert_eq!(totals.rss, 10);
    }

    #[test]
    fn test_malformed_value_does_not_stop_aggregation() {
        let blob = "Rss: garbage kB\nRss: 25 kB\nPss: 12 kB\n";
        let totals = aggregate_smaps(Cursor::new(blob)).unwrap();
        assert_eq!(totals.rss, 25);
        assert_eq!(totals.pss, 12);
    }

    #[test]
    fn test_empty_blob_is_zero() {
        let totals = aggregate_smaps(Cursor::new("")).unwrap();
        assert_eq!(totals, MemoryTotals::default());
    }

    #[test]
    fn test_missing_smaps_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = parse_memory_for_process(dir.path(), false).unwrap_err();
        assert!(matches!(err, ScrapeError::Io { .. }));
    }

    #[test]
    fn test_prefers_rollup_when_asked() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("smaps"), TWO_MAPPINGS).unwrap();
        fs::write(dir.path().join("smaps_rollup"), "Rss: 1 kB\n").unwrap();

        assert_eq!(parse_memory_for_process(dir.path(), true).unwrap().rss, 1);
        assert_eq!(parse_memory_for_process(dir.path(), false).unwrap().rss, 100);
    }
}
