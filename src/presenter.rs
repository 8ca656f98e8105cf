//! Text grid rendering of a process collection.
//!
//! [`format`] turns snapshots into rows of cells; [`layout`] fits a grid
//! into a terminal of a given size. Both are pure.

use crate::process::ProcessSnapshot;

/// Column headers, left to right.
pub const HEADERS: [&str; 8] = ["PID", "Name", "User", "SwapPSS", "USS", "PSS", "RSS", "Command"];

/// Fixed widths of every column but the last. Command takes the rest.
pub const COLUMN_WIDTHS: [usize; 7] = [6, 18, 10, 8, 8, 8, 8];

/// Terminal dimensions in character cells.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TerminalSize {
    pub width: u16,
    pub height: u16,
}

impl TerminalSize {
    pub fn new(width: u16, height: u16) -> Self {
        Self { width, height }
    }

    /// Width left for the Command column.
    pub fn command_width(&self) -> usize {
        (self.width as usize).saturating_sub(COLUMN_WIDTHS.iter().sum())
    }
}

impl Default for TerminalSize {
    fn default() -> Self {
        Self::new(80, 24)
    }
}

/// Rows of text cells: header, underline, then one row per process.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Grid {
    pub rows: Vec<Vec<String>>,
}

impl Grid {
    /// Number of process rows, excluding header and underline.
    pub fn process_rows(&self) -> usize {
        self.rows.len().saturating_sub(2)
    }
}

/// Formats a collection into a grid.
pub fn format(procs: &[ProcessSnapshot]) -> Grid {
    let mut rows = Vec::with_capacity(procs.len() + 2);
    rows.push(HEADERS.iter().map(|h| h.to_string()).collect());
    rows.push(HEADERS.iter().map(|h| "-".repeat(h.len())).collect());
    for p in procs {
        rows.push(vec![
            p.pid.to_string(),
            p.name.clone(),
            p.owner.clone(),
            p.swap.to_string(),
            p.uss.to_string(),
            p.pss.to_string(),
            p.rss.to_string(),
            p.command.clone(),
        ]);
    }
    Grid { rows }
}

/// Clips `s` to at most `max` characters.
fn clip(s: &str, max: usize) -> &str {
    match s.char_indices().nth(max) {
        Some((idx, _)) => &s[..idx],
        None => s,
    }
}

fn layout_row(row: &[String], size: TerminalSize) -> String {
    let mut line = String::with_capacity(size.width as usize);
    for (i, cell) in row.iter().enumerate() {
        match COLUMN_WIDTHS.get(i) {
            Some(&w) => {
                // One cell of spacing between columns
                let text = clip(cell, w.saturating_sub(1));
                line.push_str(&format!("{:<w$}", text, w = w));
            }
            None => line.push_str(clip(cell, size.command_width())),
        }
    }
    clip(line.trim_end(), size.width as usize).to_string()
}

/// Lays a grid out as terminal lines.
///
/// Produces at most `size.height` lines. When `status` is given the last
/// line shows it and the table gets one row less.
pub fn layout(grid: &Grid, size: TerminalSize, status: Option<&str>) -> Vec<String> {
    let height = size.height as usize;
    let table_rows = match status {
        Some(_) => height.saturating_sub(1),
        None => height,
    };

    let mut lines: Vec<String> = grid
        .rows
        .iter()
        .take(table_rows)
        .map(|row| layout_row(row, size))
        .collect();

    if let Some(msg) = status {
        if height > 0 {
            lines.push(clip(msg, size.width as usize).to_string());
        }
    }
    lines
}
