//! Integration tests for the refresh loop state machine.
//!
//! The controller is driven with plain `Event` values over a fake process
//! tree, no terminal involved.

use std::cell::Cell;
use std::fs;
use std::path::Path;

use memtop::{
    Controller, Event, IdentityResolver, Outcome, ScanOptions, ScrapeError, SortKey, State,
    TerminalSize,
};

#[derive(Default)]
struct CountingResolver {
    calls: Cell<usize>,
}

impl IdentityResolver for CountingResolver {
    fn resolve(&self, _uid: u32) -> Result<String, ScrapeError> {
        self.calls.set(self.calls.get() + 1);
        Ok("tester".into())
    }
}

fn add_proc(root: &Path, pid: u32, name: &str, rss: u64) {
    let dir = root.join(pid.to_string());
    fs::create_dir(&dir).unwrap();
    fs::write(dir.join("stat"), format!("{pid} ({name}) S 1")).unwrap();
    fs::write(dir.join("cmdline"), format!("/usr/bin/{name}\0--flag\0")).unwrap();
    fs::write(
        dir.join("smaps"),
        format!("Rss: {rss} kB\nPss: {} kB\nPrivate_Dirty: 1 kB\n", rss / 2),
    )
    .unwrap();
}

/// First column of every process row.
fn listed_pids<R: IdentityResolver>(controller: &Controller<R>) -> Vec<String> {
    controller
        .grid()
        .unwrap()
        .rows
        .iter()
        .skip(2)
        .map(|row| row[0].clone())
        .collect()
}

fn start(root: &Path, key: SortKey) -> Controller<CountingResolver> {
    Controller::start(
        root,
        ScanOptions::sorted_by(key),
        TerminalSize::new(120, 30),
        CountingResolver::default(),
    )
}

#[test]
fn test_start_builds_initial_grid() {
    let root = tempfile::tempdir().unwrap();
    add_proc(root.path(), 10, "zsh", 10);
    add_proc(root.path(), 20, "firefox", 900);

    let controller = start(root.path(), SortKey::Rss);
    assert!(controller.is_running());
    assert_eq!(controller.sort_key(), Some(SortKey::Rss));
    assert_eq!(listed_pids(&controller), vec!["20", "10"]);

    let lines = controller.lines();
    assert_eq!(lines.len(), 4);
    assert!(lines[0].starts_with("PID"));
    assert!(lines[2].contains("firefox"));
    assert!(lines[2].contains("/usr/bin/firefox --flag"));
}

#[test]
fn test_tick_rescans() {
    let root = tempfile::tempdir().unwrap();
    add_proc(root.path(), 10, "zsh", 10);
    let mut controller = start(root.path(), SortKey::Rss);
    assert_eq!(listed_pids(&controller), vec!["10"]);

    add_proc(root.path(), 30, "vim", 50);
    assert_eq!(controller.handle(Event::Tick), Outcome::Redraw);
    assert_eq!(listed_pids(&controller), vec!["30", "10"]);

    fs::remove_dir_all(root.path().join("30")).unwrap();
    assert_eq!(controller.handle(Event::Tick), Outcome::Redraw);
    assert_eq!(listed_pids(&controller), vec!["10"]);
}

#[test]
fn test_sort_hotkeys_change_order() {
    let root = tempfile::tempdir().unwrap();
    add_proc(root.path(), 10, "zsh", 10);
    add_proc(root.path(), 20, "firefox", 900);
    add_proc(root.path(), 30, "bash", 300);
    let mut controller = start(root.path(), SortKey::Rss);

    assert_eq!(controller.handle(Event::KeyPress('n')), Outcome::Redraw);
    assert_eq!(controller.sort_key(), Some(SortKey::Name));
    assert_eq!(listed_pids(&controller), vec!["30", "20", "10"]);

    assert_eq!(controller.handle(Event::KeyPress('p')), Outcome::Redraw);
    assert_eq!(controller.sort_key(), Some(SortKey::Pss));
    assert_eq!(listed_pids(&controller), vec!["20", "30", "10"]);

    // The key sticks across ticks
    controller.handle(Event::Tick);
    assert_eq!(controller.sort_key(), Some(SortKey::Pss));

    for (key, expected) in [('r', SortKey::Rss), ('u', SortKey::Uss), ('s', SortKey::Swap)] {
        assert_eq!(controller.handle(Event::KeyPress(key)), Outcome::Redraw);
        assert_eq!(controller.sort_key(), Some(expected));
    }
}

#[test]
fn test_unknown_key_is_ignored() {
    let root = tempfile::tempdir().unwrap();
    add_proc(root.path(), 10, "zsh", 10);
    let mut controller = start(root.path(), SortKey::Uss);

    assert_eq!(controller.handle(Event::KeyPress('x')), Outcome::Ignored);
    assert_eq!(controller.handle(Event::KeyPress('Q')), Outcome::Ignored);
    assert_eq!(controller.sort_key(), Some(SortKey::Uss));
    assert!(controller.is_running());
}

#[test]
fn test_resize_relayouts_without_rescan() {
    let root = tempfile::tempdir().unwrap();
    add_proc(root.path(), 10, "zsh", 10);
    let mut controller = start(root.path(), SortKey::Rss);
    let before = controller.grid().unwrap().clone();

    // New data on disk must not show up on a resize
    add_proc(root.path(), 30, "vim", 50);
    assert_eq!(controller.handle(Event::Resize(70, 3)), Outcome::Relayout);
    assert_eq!(controller.size(), Some(TerminalSize::new(70, 3)));
    assert_eq!(controller.grid(), Some(&before));

    let lines = controller.lines();
    assert_eq!(lines.len(), 3);
    assert!(lines.iter().all(|l| l.chars().count() <= 70));
}

#[test]
fn test_quit_stops_the_loop() {
    let root = tempfile::tempdir().unwrap();
    add_proc(root.path(), 10, "zsh", 10);
    let mut controller = start(root.path(), SortKey::Rss);

    assert_eq!(controller.handle(Event::Quit), Outcome::Exit);
    assert!(!controller.is_running());
    assert!(matches!(controller.state(), State::Stopped));
    assert!(controller.lines().is_empty());

    assert_eq!(controller.handle(Event::Tick), Outcome::Ignored);
    assert_eq!(controller.handle(Event::KeyPress('n')), Outcome::Ignored);
    assert_eq!(controller.handle(Event::Resize(10, 10)), Outcome::Ignored);
    assert_eq!(controller.handle(Event::Quit), Outcome::Ignored);
}

#[test]
fn test_owner_cache_survives_ticks() {
    let root = tempfile::tempdir().unwrap();
    add_proc(root.path(), 10, "zsh", 10);
    add_proc(root.path(), 20, "firefox", 900);
    let mut controller = start(root.path(), SortKey::Rss);

    for _ in 0..5 {
        controller.handle(Event::Tick);
    }
    controller.handle(Event::KeyPress('n'));

    assert_eq!(controller.resolver().calls.get(), 1);
    assert_eq!(controller.owners().len(), 1);
}

#[test]
fn test_unreadable_root_shows_diagnostic() {
    let root = tempfile::tempdir().unwrap();
    let proc_root = root.path().join("proc");
    fs::create_dir(&proc_root).unwrap();
    add_proc(&proc_root, 10, "zsh", 10);
    let mut controller = start(&proc_root, SortKey::Rss);
    assert_eq!(listed_pids(&controller).len(), 1);

    fs::remove_dir_all(&proc_root).unwrap();
    assert_eq!(controller.handle(Event::Tick), Outcome::Redraw);
    assert!(listed_pids(&controller).is_empty());
    match controller.state() {
        State::Running(r) => assert!(r.diagnostic.is_some()),
        State::Stopped => panic!("controller stopped on a scan failure"),
    }
    let lines = controller.lines();
    assert!(lines.last().unwrap().contains("cannot read process root"));

    // Recovery clears the diagnostic
    fs::create_dir(&proc_root).unwrap();
    add_proc(&proc_root, 10, "zsh", 10);
    controller.handle(Event::Tick);
    match controller.state() {
        State::Running(r) => assert!(r.diagnostic.is_none()),
        State::Stopped => panic!("controller stopped"),
    }
    assert_eq!(listed_pids(&controller), vec!["10"]);
}
