//! Interactive refresh loop.
//!
//! One task multiplexes the refresh timer, keyboard input, SIGWINCH and
//! SIGTERM into [`Event`]s and hands them to the controller one at a time.

use memtop::{Controller, Event, Outcome, SystemIdentity};
use tokio::signal::unix::{signal, SignalKind};
use tokio::time::{interval, MissedTickBehavior};
use tracing::{debug, info};

use crate::config::Config;
use crate::terminal::{KeyReader, Terminal, TerminalError};

/// Runs the monitor until the user quits.
///
/// Terminal setup errors are returned before any scanning happens.
pub async fn run(config: &Config) -> Result<(), Box<dyn std::error::Error>> {
    let mut terminal = Terminal::enter()?;
    let keys = KeyReader::new().map_err(TerminalError::Io)?;
    let mut resize = signal(SignalKind::window_change())?;
    let mut terminate = signal(SignalKind::terminate())?;

    let mut controller = Controller::start(
        config.proc_root(),
        config.scan_options(),
        terminal.size(),
        SystemIdentity,
    );
    terminal.draw(&controller.lines())?;

    let mut ticker = interval(config.refresh_interval());
    // A slow scan delays the next refresh instead of causing a burst
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    // The first tick completes immediately and the initial scan already ran
    ticker.tick().await;

    loop {
        let events = tokio::select! {
            _ = ticker.tick() => vec![Event::Tick],
            input = keys.next_events() => input?,
            _ = resize.recv() => {
                let size = terminal.size();
                vec![Event::Resize(size.width, size.height)]
            }
            _ = terminate.recv() => {
                info!("Received SIGTERM, shutting down...");
                vec![Event::Quit]
            }
        };

        for event in events {
            match controller.handle(event) {
                Outcome::Redraw | Outcome::Relayout => terminal.draw(&controller.lines())?,
                Outcome::Ignored => debug!(?event, "event ignored"),
                Outcome::Exit => {
                    terminal.restore();
                    return Ok(());
                }
            }
        }
    }
}
