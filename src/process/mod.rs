//! Process-related modules for memory scraping and collection building.
//!
//! This module provides:
//! - `memory`: Memory parsing from /proc/<pid>/smaps
//! - `scraper`: Per-process snapshot population
//! - `scanner`: Process discovery, filtering and sorting

pub mod memory;
pub mod scanner;
pub mod scraper;
mod snapshot;

// Re-export commonly used types
pub use memory::{aggregate_smaps, parse_memory_for_process, smaps_field, MemoryTotals};
pub use scanner::{
    build, collect_proc_entries, parse_pid, scan, ProcEntry, ProcessCollection, ScanOptions,
};
pub use scraper::{populate, read_cmdline, read_process_name, ScrapeOptions};
pub use snapshot::ProcessSnapshot;
