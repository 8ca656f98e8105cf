//! Raw-mode terminal handling for the interactive monitor.
//!
//! Only the small part of terminal control the monitor needs: raw input,
//! alternate screen, size query and line-based drawing with ANSI escapes.

use std::fs::{File, OpenOptions};
use std::io::{self, IsTerminal, Stdout, Write};
use std::os::fd::AsRawFd;
use std::os::unix::fs::OpenOptionsExt;
use std::path::Path;

use memtop::{Event, TerminalSize};
use nix::sys::termios::{self, LocalFlags, SetArg, Termios};
use tokio::io::unix::AsyncFd;
use tracing::{debug, warn};

/// Ctrl-C as delivered with ISIG cleared.
const CTRL_C: u8 = 3;
const ESC: u8 = 27;
/// Controlling terminal, opened separately for key input.
const TTY_PATH: &str = "/dev/tty";

#[derive(Debug, thiserror::Error)]
pub enum TerminalError {
    #[error("memtop requires an interactive terminal")]
    NotATty,

    #[error("failed to configure terminal: {0}")]
    Termios(#[from] nix::Error),

    #[error("terminal I/O failed: {0}")]
    Io(#[from] io::Error),
}

/// Terminal in raw mode on the alternate screen. Restored on drop.
pub struct Terminal {
    original: Termios,
    out: Stdout,
    active: bool,
}

impl Terminal {
    /// Switches the terminal to raw mode and enters the alternate screen.
    ///
    /// stdin and stdout keep their blocking flags; they usually share one
    /// open file description, so non-blocking input lives in [`KeyReader`].
    pub fn enter() -> Result<Self, TerminalError> {
        let stdin = io::stdin();
        let out = io::stdout();
        if !stdin.is_terminal() || !out.is_terminal() {
            return Err(TerminalError::NotATty);
        }

        let original = termios::tcgetattr(&stdin)?;
        let mut raw = original.clone();
        raw.local_flags
            .remove(LocalFlags::ECHO | LocalFlags::ICANON | LocalFlags::ISIG);
        termios::tcsetattr(&stdin, SetArg::TCSAFLUSH, &raw)?;

        let mut terminal = Self {
            original,
            out,
            active: true,
        };
        // Alternate screen, clear, home, hide cursor
        terminal.write_raw("\x1B[?1049h\x1B[2J\x1B[H\x1B[?25l")?;
        debug!("terminal entered raw mode");
        Ok(terminal)
    }

    /// Current terminal size.
    pub fn size(&self) -> TerminalSize {
        query_size()
    }

    /// Draws `lines` from the top-left corner and clears everything else.
    pub fn draw(&mut self, lines: &[String]) -> io::Result<()> {
        write_frame(&mut self.out, lines)
    }

    fn write_raw(&mut self, s: &str) -> io::Result<()> {
        self.out.write_all(s.as_bytes())?;
        self.out.flush()
    }

    /// Restores the original terminal state. Safe to call more than once.
    pub fn restore(&mut self) {
        if !self.active {
            return;
        }
        self.active = false;

        if let Err(e) = termios::tcsetattr(&io::stdin(), SetArg::TCSAFLUSH, &self.original) {
            warn!("failed to restore terminal attributes: {}", e);
        }
        // Leave alternate screen, show cursor, reset attributes
        let _ = self.write_raw("\x1B[?1049l\x1B[?25h\x1B[0m");
        debug!("terminal restored");
    }
}

impl Drop for Terminal {
    fn drop(&mut self) {
        self.restore();
    }
}

/// One full screen: cursor home, each line followed by clear-to-end-of-line,
/// then clear below the last line.
fn render_frame(lines: &[String]) -> String {
    let mut frame = String::from("\x1B[H");
    for (i, line) in lines.iter().enumerate() {
        if i > 0 {
            frame.push_str("\r\n");
        }
        frame.push_str(line);
        frame.push_str("\x1B[K");
    }
    frame.push_str("\x1B[J");
    frame
}

fn write_frame<W: Write>(out: &mut W, lines: &[String]) -> io::Result<()> {
    out.write_all(render_frame(lines).as_bytes())?;
    out.flush()
}

/// Queries the size of the terminal attached to stdout, falling back to
/// `COLUMNS`/`LINES` and finally 80x24.
pub fn query_size() -> TerminalSize {
    let mut ws: libc::winsize = unsafe { std::mem::zeroed() };
    // SAFETY: TIOCGWINSZ writes a winsize into the pointer we pass, which
    // points at a properly sized, initialised struct on our stack.
    let ok = unsafe { libc::ioctl(libc::STDOUT_FILENO, libc::TIOCGWINSZ, &mut ws) } == 0;
    if ok && ws.ws_col > 0 && ws.ws_row > 0 {
        return TerminalSize::new(ws.ws_col, ws.ws_row);
    }
    size_from_env()
}

/// Terminal size from `COLUMNS`/`LINES`, 80x24 when unset.
pub fn size_from_env() -> TerminalSize {
    let read = |name: &str, default: u16| {
        std::env::var(name)
            .ok()
            .and_then(|s| s.parse().ok())
            .filter(|v: &u16| *v > 0)
            .unwrap_or(default)
    };
    TerminalSize::new(read("COLUMNS", 80), read("LINES", 24))
}

/// Translates raw input bytes into events.
///
/// `q` and Ctrl-C quit; other printable ASCII becomes a key press. CSI and
/// SS3 sequences (arrow and function keys) are skipped as a whole, a lone
/// Esc is ignored.
pub fn decode_keys(bytes: &[u8]) -> Vec<Event> {
    let mut events = Vec::new();
    let mut i = 0;
    while i < bytes.len() {
        match bytes[i] {
            CTRL_C | b'q' => events.push(Event::Quit),
            ESC => i = skip_escape(bytes, i),
            b @ 0x20..=0x7e => events.push(Event::KeyPress(b as char)),
            _ => {}
        }
        i += 1;
    }
    events
}

/// Index of the last byte of the escape sequence starting at `start`.
fn skip_escape(bytes: &[u8], start: usize) -> usize {
    match bytes.get(start + 1) {
        // CSI: parameter and intermediate bytes up to a final byte
        Some(b'[') => {
            let mut i = start + 2;
            while let Some(&b) = bytes.get(i) {
                if (0x40..=0x7e).contains(&b) {
                    return i;
                }
                if !(0x20..=0x3f).contains(&b) {
                    return i - 1;
                }
                i += 1;
            }
            bytes.len() - 1
        }
        // SS3: exactly one more byte
        Some(b'O') => (start + 2).min(bytes.len() - 1),
        _ => start,
    }
}

/// Non-blocking key source registered with the tokio reactor.
///
/// Reads from its own handle on the terminal so the non-blocking flag never
/// reaches stdout.
pub struct KeyReader {
    fd: AsyncFd<File>,
}

impl KeyReader {
    /// Opens the controlling terminal.
    pub fn new() -> io::Result<Self> {
        Self::open(Path::new(TTY_PATH))
    }

    pub fn open(path: &Path) -> io::Result<Self> {
        let tty = OpenOptions::new()
            .read(true)
            .custom_flags(libc::O_NONBLOCK | libc::O_NOCTTY)
            .open(path)?;
        Ok(Self {
            fd: AsyncFd::new(tty)?,
        })
    }

    /// Waits for input and returns the decoded events. End of input counts
    /// as a quit request.
    pub async fn next_events(&self) -> io::Result<Vec<Event>> {
        let mut buf = [0u8; 64];
        loop {
            let mut guard = self.fd.readable().await?;
            let result = guard.try_io(|inner| {
                nix::unistd::read(inner.get_ref().as_raw_fd(), &mut buf).map_err(io::Error::from)
            });
            match result {
                Ok(Ok(0)) => return Ok(vec![Event::Quit]),
                Ok(Ok(n)) => return Ok(decode_keys(&buf[..n])),
                Ok(Err(e)) if e.kind() == io::ErrorKind::Interrupted => continue,
                Ok(Err(e)) => return Err(e),
                Err(_would_block) => continue,
            }
        }
    }
}
