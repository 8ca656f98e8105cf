//! memtop library
//!
//! Scrapes per-process memory accounting from `/proc/<pid>/smaps` and keeps a
//! sorted, periodically refreshed process table. The terminal front end lives
//! in the `memtop` binary; everything here is usable without a terminal.
//!
//! # Features
//!
//! - **Memory aggregation**: RSS, PSS, USS (private clean + dirty) and
//!   proportional swap per process
//! - **Owner cache**: uid to user name resolution performed once per uid
//! - **Sorting**: by name ascending or by any memory column descending
//! - **Event-driven controller**: a small state machine fed with typed events
//!
//! # Usage
//!
//! ```no_run
//! use memtop::{Controller, Event, ScanOptions, SortKey, SystemIdentity, TerminalSize};
//!
//! let mut controller = Controller::start(
//!     "/proc",
//!     ScanOptions::sorted_by(SortKey::Pss),
//!     TerminalSize::new(120, 40),
//!     SystemIdentity,
//! );
//!
//! controller.handle(Event::KeyPress('u'));
//! for line in controller.lines() {
//!     println!("{line}");
//! }
//! ```

pub mod cache;
pub mod controller;
pub mod error;
pub mod presenter;
pub mod process;
pub mod sort;

// Re-export main types for convenience
pub use cache::{IdentityResolver, OwnerCache, SystemIdentity};
pub use controller::{Controller, Event, Outcome, Running, State};
pub use error::{ScanError, ScrapeError};
pub use presenter::{Grid, TerminalSize};
pub use process::{ProcessCollection, ProcessSnapshot, ScanOptions, ScrapeOptions};
pub use sort::{sort_collection, SortKey};
