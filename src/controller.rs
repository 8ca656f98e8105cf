//! Refresh loop state machine.
//!
//! The controller owns everything that survives between refreshes: the
//! active sort key, the last rendered grid, the terminal size and the owner
//! cache. It consumes [`Event`]s and tells the caller what to do with the
//! screen through an [`Outcome`]; it never touches the terminal itself.

use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::cache::{IdentityResolver, OwnerCache};
use crate::presenter::{self, Grid, TerminalSize};
use crate::process::{build, ScanOptions};
use crate::sort::SortKey;

/// Input to the refresh loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event {
    /// Periodic refresh timer fired.
    Tick,
    /// A key other than the quit keys was pressed.
    KeyPress(char),
    /// Terminal was resized to (width, height).
    Resize(u16, u16),
    Quit,
}

/// What the caller has to do after an event was handled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// Data was rebuilt, draw the new lines.
    Redraw,
    /// Only the size changed, draw the existing grid with the new layout.
    Relayout,
    /// Nothing changed.
    Ignored,
    /// The loop is over.
    Exit,
}

/// State while the monitor is live.
#[derive(Debug, Clone)]
pub struct Running {
    pub sort_key: SortKey,
    pub grid: Grid,
    pub size: TerminalSize,
    /// Last scan failure, shown on the status line until a scan succeeds.
    pub diagnostic: Option<String>,
}

#[derive(Debug, Clone)]
pub enum State {
    Running(Running),
    Stopped,
}

pub struct Controller<R> {
    state: State,
    root: PathBuf,
    options: ScanOptions,
    owners: OwnerCache,
    resolver: R,
}

impl<R: IdentityResolver> Controller<R> {
    /// Builds and formats the first collection and enters `Running`.
    ///
    /// The sort key in `options` is the initial key.
    pub fn start(
        root: impl Into<PathBuf>,
        options: ScanOptions,
        size: TerminalSize,
        resolver: R,
    ) -> Self {
        let mut controller = Self {
            state: State::Running(Running {
                sort_key: options.sort_key,
                grid: Grid::default(),
                size,
                diagnostic: None,
            }),
            root: root.into(),
            options,
            owners: OwnerCache::new(),
            resolver,
        };
        controller.refresh();
        info!(
            root = %controller.root.display(),
            sort_key = %options.sort_key,
            "monitor started"
        );
        controller
    }

    pub fn handle(&mut self, event: Event) -> Outcome {
        let running = match &mut self.state {
            State::Running(r) => r,
            State::Stopped => return Outcome::Ignored,
        };

        match event {
            Event::Tick => {
                self.refresh();
                Outcome::Redraw
            }
            Event::KeyPress(c) => match SortKey::from_hotkey(c) {
                Some(key) => {
                    debug!(sort_key = %key, "sort key changed");
                    running.sort_key = key;
                    self.refresh();
                    Outcome::Redraw
                }
                None => Outcome::Ignored,
            },
            Event::Resize(width, height) => {
                running.size = TerminalSize::new(width, height);
                Outcome::Relayout
            }
            Event::Quit => {
                info!("quit requested");
                self.state = State::Stopped;
                Outcome::Exit
            }
        }
    }

    /// Rescans the process root with the current sort key.
    fn refresh(&mut self) {
        let State::Running(running) = &mut self.state else {
            return;
        };
        let options = ScanOptions {
            sort_key: running.sort_key,
            ..self.options
        };
        let collection = build(&self.root, options, &mut self.owners, &self.resolver);
        running.grid = presenter::format(&collection.processes);
        running.diagnostic = collection.diagnostic;
    }

    /// Current grid laid out for the current terminal size. Empty once
    /// stopped.
    pub fn lines(&self) -> Vec<String> {
        match &self.state {
            State::Running(r) => presenter::layout(&r.grid, r.size, r.diagnostic.as_deref()),
            State::Stopped => Vec::new(),
        }
    }

    pub fn state(&self) -> &State {
        &self.state
    }

    pub fn is_running(&self) -> bool {
        matches!(self.state, State::Running(_))
    }

    pub fn sort_key(&self) -> Option<SortKey> {
        match &self.state {
            State::Running(r) => Some(r.sort_key),
            State::Stopped => None,
        }
    }

    pub fn grid(&self) -> Option<&Grid> {
        match &self.state {
            State::Running(r) => Some(&r.grid),
            State::Stopped => None,
        }
    }

    pub fn size(&self) -> Option<TerminalSize> {
        match &self.state {
            State::Running(r) => Some(r.size),
            State::Stopped => None,
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn owners(&self) -> &OwnerCache {
        &self.owners
    }

    pub fn resolver(&self) -> &R {
        &self.resolver
    }
}
