//! Sort keys for the process table.

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

use crate::process::ProcessSnapshot;

/// Column the process table is ordered by.
///
/// `Name` sorts ascending, every memory column sorts descending so the
/// largest consumer is on top.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum SortKey {
    Name,
    #[default]
    Rss,
    Pss,
    Uss,
    Swap,
}

impl SortKey {
    /// Maps an interactive hotkey to a sort key.
    pub fn from_hotkey(c: char) -> Option<Self> {
        match c {
            'n' => Some(Self::Name),
            'r' => Some(Self::Rss),
            'p' => Some(Self::Pss),
            'u' => Some(Self::Uss),
            's' => Some(Self::Swap),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Name => "name",
            Self::Rss => "rss",
            Self::Pss => "pss",
            Self::Uss => "uss",
            Self::Swap => "swap",
        }
    }

    /// Compares two snapshots in display order for this key.
    pub fn compare(&self, a: &ProcessSnapshot, b: &ProcessSnapshot) -> Ordering {
        match self {
            Self::Name => a.name.cmp(&b.name),
            Self::Rss => b.rss.cmp(&a.rss),
            Self::Pss => b.pss.cmp(&a.pss),
            Self::Uss => b.uss.cmp(&a.uss),
            Self::Swap => b.swap.cmp(&a.swap),
        }
    }
}

impl fmt::Display for SortKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, thiserror::Error)]
#[error("unknown sort key '{0}', expected one of name, rss, pss, uss, swap")]
pub struct UnknownSortKey(String);

impl FromStr for SortKey {
    type Err = UnknownSortKey;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "name" => Ok(Self::Name),
            "rss" => Ok(Self::Rss),
            "pss" => Ok(Self::Pss),
            "uss" => Ok(Self::Uss),
            "swap" => Ok(Self::Swap),
            _ => Err(UnknownSortKey(s.to_string())),
        }
    }
}

/// Sorts a collection in place. The sort is stable, equal keys keep their
/// enumeration order.
pub fn sort_collection(procs: &mut [ProcessSnapshot], key: SortKey) {
    procs.sort_by(|a, b| key.compare(a, b));
}

#[cfg(test)]
mod tests {
    use super::*;

    fn snap(pid: u32, name: &str, rss: u64, pss: u64, uss: u64, swap: u64) -> ProcessSnapshot {
        ProcessSnapshot {
            pid,
            name: name.into(),
            owner: "root".into(),
            command: name.into(),
            rss,
            pss,
            uss,
            swap,
        }
    }

    fn sample() -> Vec<ProcessSnapshot> {
        vec![
            snap(1, "systemd", 10, 40, 7, 0),
            snap(2, "bash", 30, 10, 9, 3),
            snap(3, "postgres", 20, 30, 8, 1),
        ]
    }

    fn pids(procs: &[ProcessSnapshot]) -> Vec<u32> {
        procs.iter().map(|p| p.pid).collect()
    }

    #[test]
    fn test_name_sorts_ascending() {
        let mut procs = sample();
        sort_collection(&mut procs, SortKey::Name);
        let names: Vec<&str> = procs.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["bash", "postgres", "systemd"]);
    }

    #[test]
    fn test_memory_keys_sort_descending() {
        let mut procs = sample();
        sort_collection(&mut procs, SortKey::Rss);
        assert_eq!(pids(&procs), vec![2, 3, 1]);

        sort_collection(&mut procs, SortKey::Pss);
        assert_eq!(pids(&procs), vec![1, 3, 2]);

        sort_collection(&mut procs, SortKey::Uss);
        assert_eq!(pids(&procs), vec![2, 3, 1]);

        sort_collection(&mut procs, SortKey::Swap);
        assert_eq!(pids(&procs), vec![2, 3, 1]);
    }

    #[test]
    fn test_sorted_output_is_monotonic() {
        let mut procs: Vec<_> = (1..50)
            .map(|i| snap(i, &format!("p{}", (i * 7) % 13), (i as u64 * 37) % 101, 0, 0, 0))
            .collect();
        sort_collection(&mut procs, SortKey::Rss);
        assert!(procs.windows(2).all(|w| w[0].rss >= w[1].rss));

        sort_collection(&mut procs, SortKey::Name);
        assert!(procs.windows(2).all(|w| w[0].name <= w[1].name));
    }

    #[test]
    fn test_hotkeys() {
        assert_eq!(SortKey::from_hotkey('n'), Some(SortKey::Name));
        assert_eq!(SortKey::from_hotkey('r'), Some(SortKey::Rss));
        assert_eq!(SortKey::from_hotkey('p'), Some(SortKey::Pss));
        assert_eq!(SortKey::from_hotkey('u'), Some(SortKey::Uss));
        assert_eq!(SortKey::from_hotkey('s'), Some(SortKey::Swap));
        assert_eq!(SortKey::from_hotkey('x'), None);
        assert_eq!(SortKey::from_hotkey('q'), None);
    }

    #[test]
    fn test_from_str_and_default() {
        assert_eq!(SortKey::default(), SortKey::Rss);
        assert_eq!("PSS".parse::<SortKey>().unwrap(), SortKey::Pss);
        assert_eq!(" swap ".parse::<SortKey>().unwrap(), SortKey::Swap);
        assert!("cpu".parse::<SortKey>().is_err());
        assert_eq!(SortKey::Uss.to_string(), "uss");
    }
}
