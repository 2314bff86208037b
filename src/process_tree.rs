//! Process table snapshots and descendant discovery.
//!
//! The wrapper never relies on process groups alone: `opencode` plugins may
//! call `setsid`, so descendants are found by walking the parent links of a
//! `ps -axo pid=,ppid=` snapshot. All OS access goes through
//! [`ProcessProbe`] so the tracker can be driven by a fake in tests.

use log::{debug, trace};
use nix::errno::Errno;
use nix::sys::signal::{Signal, kill};
use nix::unistd::{Pid, getpgid, getpid};
use std::collections::{BTreeMap, BTreeSet, VecDeque};
use std::process::Command;

/// Snapshot of `pid → parent pid`.
pub type ProcessTable = BTreeMap<i32, i32>;

/// Read-only and signalling access to the host's processes.
#[cfg_attr(test, mockall::automock)]
pub trait ProcessProbe {
    /// Take a `pid → ppid` snapshot of every process.
    ///
    /// # Errors
    ///
    /// Returns an I/O error when the snapshot cannot be taken.
    fn process_table(&self) -> std::io::Result<ProcessTable>;

    /// Process group of `pid`, if it still exists.
    fn process_group(&self, pid: i32) -> Option<i32>;

    /// Process group of the calling process.
    fn own_group(&self) -> Option<i32>;

    /// True unless signal 0 reports `ESRCH` for `pid`.
    fn pid_alive(&self, pid: i32) -> bool;

    /// True unless signal 0 reports `ESRCH` for group `pgid`.
    fn group_alive(&self, pgid: i32) -> bool;

    /// Send `signal` to `pid`, ignoring failures.
    fn signal_pid(&self, pid: i32, signal: Signal);

    /// Send `signal` to every member of group `pgid`, ignoring failures.
    fn signal_group(&self, pgid: i32, signal: Signal);
}

/// [`ProcessProbe`] backed by `ps` and `kill(2)`.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemProcesses;

impl ProcessProbe for SystemProcesses {
    fn process_table(&self) -> std::io::Result<ProcessTable> {
        let output = Command::new("ps").args(["-axo", "pid=,ppid="]).output()?;
        if !output.status.success() {
            return Err(std::io::Error::other(format!(
                "ps exited with {}",
                output.status
            )));
        }
        Ok(parse_process_table(&String::from_utf8_lossy(&output.stdout)))
    }

    fn process_group(&self, pid: i32) -> Option<i32> {
        getpgid(Some(Pid::from_raw(pid))).ok().map(Pid::as_raw)
    }

    fn own_group(&self) -> Option<i32> {
        getpgid(Some(getpid())).ok().map(Pid::as_raw)
    }

    fn pid_alive(&self, pid: i32) -> bool {
        pid > 1 && !matches!(kill(Pid::from_raw(pid), None), Err(Errno::ESRCH))
    }

    fn group_alive(&self, pgid: i32) -> bool {
        pgid > 1 && !matches!(kill(Pid::from_raw(-pgid), None), Err(Errno::ESRCH))
    }

    fn signal_pid(&self, pid: i32, signal: Signal) {
        if let Err(errno) = kill(Pid::from_raw(pid), signal) {
            trace!("kill({pid}, {signal}) failed: {errno}");
        }
    }

    fn signal_group(&self, pgid: i32, signal: Signal) {
        if let Err(errno) = kill(Pid::from_raw(-pgid), signal) {
            trace!("kill(-{pgid}, {signal}) failed: {errno}");
        }
    }
}

/// Parse `ps -o pid=,ppid=` output, skipping malformed lines.
///
/// # Examples
///
/// ```
/// use oclean::process_tree::parse_process_table;
///
/// let table = parse_process_table("  1     0\n 42     1\nbogus\n");
/// assert_eq!(table.get(&42), Some(&1));
/// assert_eq!(table.len(), 2);
/// ```
#[must_use]
pub fn parse_process_table(text: &str) -> ProcessTable {
    text.lines()
        .filter_map(|line| {
            let mut columns = line.split_whitespace();
            let pid = columns.next()?.parse::<i32>().ok()?;
            let parent = columns.next()?.parse::<i32>().ok()?;
            Some((pid, parent))
        })
        .collect()
}

/// Breadth-first walk of `table` from `root_pid`, including the root.
///
/// A root of PID 1 or lower yields an empty set.
#[must_use]
pub fn descendants_in(table: &ProcessTable, root_pid: i32) -> BTreeSet<i32> {
    if root_pid <= 1 {
        return BTreeSet::new();
    }

    let mut children_by_parent: BTreeMap<i32, Vec<i32>> = BTreeMap::new();
    for (&pid, &parent) in table {
        children_by_parent.entry(parent).or_default().push(pid);
    }

    let mut descendants = BTreeSet::from([root_pid]);
    let mut queue = VecDeque::from([root_pid]);
    while let Some(parent) = queue.pop_front() {
        for &child in children_by_parent.get(&parent).into_iter().flatten() {
            if descendants.insert(child) {
                queue.push_back(child);
            }
        }
    }
    descendants
}

/// Current descendants of `root_pid`.
///
/// When no snapshot can be taken the result is just the root.
#[must_use]
pub fn discover_descendants(probe: &dyn ProcessProbe, root_pid: i32) -> BTreeSet<i32> {
    if root_pid <= 1 {
        return BTreeSet::new();
    }
    match probe.process_table() {
        Ok(table) => descendants_in(&table, root_pid),
        Err(e) => {
            debug!("process table unavailable ({e}); tracking root only");
            BTreeSet::from([root_pid])
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::{fixture, rstest};

    /// 100 → {101, 102}, 102 → 103 (detached), plus unrelated 200 → 201.
    #[fixture]
    fn table() -> ProcessTable {
        ProcessTable::from([
            (1, 0),
            (100, 1),
            (101, 100),
            (102, 100),
            (103, 102),
            (200, 1),
            (201, 200),
        ])
    }

    #[test]
    fn parse_skips_headers_and_garbage() {
        let table = parse_process_table("PID PPID\n  10   1\n\n  11\n  x 3\n  12 10 extra\n");
        assert_eq!(table, ProcessTable::from([(10, 1), (12, 10)]));
    }

    #[rstest]
    fn walk_collects_whole_subtree(table: ProcessTable) {
        assert_eq!(
            descendants_in(&table, 100),
            BTreeSet::from([100, 101, 102, 103])
        );
    }

    #[rstest]
    fn leaf_root_is_its_own_subtree(table: ProcessTable) {
        assert_eq!(descendants_in(&table, 201), BTreeSet::from([201]));
    }

    #[rstest]
    #[case::init(1)]
    #[case::zero(0)]
    #[case::negative(-5)]
    fn init_and_below_are_never_roots(table: ProcessTable, #[case] root: i32) {
        assert!(descendants_in(&table, root).is_empty());
    }

    #[test]
    fn missing_snapshot_tracks_root_only() {
        let mut probe = MockProcessProbe::new();
        probe
            .expect_process_table()
            .returning(|| Err(std::io::Error::other("ps not installed")));
        assert_eq!(discover_descendants(&probe, 4242), BTreeSet::from([4242]));
    }

    #[rstest]
    fn snapshot_is_walked(table: ProcessTable) {
        let mut probe = MockProcessProbe::new();
        probe
            .expect_process_table()
            .return_once(move || Ok(table));
        assert_eq!(
            discover_descendants(&probe, 102),
            BTreeSet::from([102, 103])
        );
    }

    #[cfg(unix)]
    #[test]
    fn system_snapshot_contains_this_process() {
        let probe = SystemProcesses;
        let Ok(table) = probe.process_table() else {
            // Skip where ps is unavailable (minimal containers).
            return;
        };
        let me = i32::try_from(std::process::id()).expect("pid fits i32");
        assert!(table.contains_key(&me));
        assert!(probe.pid_alive(me));
    }
}
