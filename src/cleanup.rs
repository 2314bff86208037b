//! Tracking the `opencode` process tree and sweeping it.
//!
//! The [`Tracker`] remembers every PID ever seen below the root and every
//! process group those PIDs belonged to, so a grandchild reparented to init
//! after `opencode` exits is still found by the sweep. The wrapper's own
//! process group is never recorded and PIDs of 1 or lower are never
//! signalled.

use crate::process_tree::{ProcessProbe, discover_descendants};
use log::debug;
use nix::sys::signal::Signal;
use std::collections::BTreeSet;
use std::thread;
use std::time::Duration;

/// Maximum signalling passes in one sweep.
pub const SWEEP_PASSES: usize = 3;

/// Pauses used while sweeping.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SweepTiming {
    /// Pause after each signalling pass.
    pub pass_interval: Duration,
    /// Pause between the SIGTERM and SIGKILL sweeps of a full cleanup.
    pub term_grace: Duration,
}

impl Default for SweepTiming {
    fn default() -> Self {
        Self {
            pass_interval: Duration::from_millis(150),
            term_grace: Duration::from_millis(1_200),
        }
    }
}

/// Which targets a sweep signals.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SweepScope {
    /// Individual PIDs only.
    Pids,
    /// Process groups first, then individual PIDs.
    PidsAndGroups,
}

/// Everything known about the process tree rooted at the `opencode` child.
pub struct Tracker<'a> {
    probe: &'a dyn ProcessProbe,
    root_pid: i32,
    wrapper_pgid: Option<i32>,
    known_pids: BTreeSet<i32>,
    known_pgids: BTreeSet<i32>,
}

impl<'a> Tracker<'a> {
    /// Start tracking the tree below `root_pid`.
    #[must_use]
    pub fn new(probe: &'a dyn ProcessProbe, root_pid: i32) -> Self {
        Self {
            probe,
            root_pid,
            wrapper_pgid: probe.own_group(),
            known_pids: BTreeSet::new(),
            known_pgids: BTreeSet::new(),
        }
    }

    /// Record the current descendants and their process groups.
    pub fn observe(&mut self) {
        let descendants = discover_descendants(self.probe, self.root_pid);
        for &pid in &descendants {
            let Some(group) = self.probe.process_group(pid) else {
                continue;
            };
            if group > 1 && Some(group) != self.wrapper_pgid {
                self.known_pgids.insert(group);
            }
        }
        self.known_pids.extend(descendants);
    }

    /// PID of the `opencode` child.
    #[must_use]
    pub fn root_pid(&self) -> i32 {
        self.root_pid
    }

    /// Every PID observed so far.
    #[must_use]
    pub fn known_pids(&self) -> &BTreeSet<i32> {
        &self.known_pids
    }

    /// Every process group observed so far.
    #[must_use]
    pub fn known_pgids(&self) -> &BTreeSet<i32> {
        &self.known_pgids
    }

    fn live_pids(&self) -> BTreeSet<i32> {
        self.known_pids
            .iter()
            .copied()
            .filter(|&pid| pid > 1 && self.probe.pid_alive(pid))
            .collect()
    }

    fn live_pgids(&self) -> BTreeSet<i32> {
        self.known_pgids
            .iter()
            .copied()
            .filter(|&pgid| pgid > 1 && self.probe.group_alive(pgid))
            .collect()
    }
}

/// Sweep after `opencode` exited on its own: SIGTERM, then SIGKILL.
///
/// Process groups are left alone because the child's group may be shared
/// with the terminal session.
pub fn post_exit_sweep(tracker: &mut Tracker<'_>, timing: SweepTiming) {
    sweep(tracker, Signal::SIGTERM, SweepScope::Pids, timing);
    thread::sleep(timing.pass_interval);
    sweep(tracker, Signal::SIGKILL, SweepScope::Pids, timing);
}

/// Cleanup after the wrapper was signalled: groups and PIDs get SIGTERM,
/// a grace period, then SIGKILL.
pub fn full_cleanup(tracker: &mut Tracker<'_>, timing: SweepTiming) {
    sweep(tracker, Signal::SIGTERM, SweepScope::PidsAndGroups, timing);
    thread::sleep(timing.term_grace);
    sweep(tracker, Signal::SIGKILL, SweepScope::PidsAndGroups, timing);
}

/// Up to [`SWEEP_PASSES`] rounds of observe, filter to live targets, and
/// signal. The first round sends `first_signal`; later rounds SIGKILL.
/// Stops as soon as nothing tracked is alive.
pub fn sweep(
    tracker: &mut Tracker<'_>,
    first_signal: Signal,
    scope: SweepScope,
    timing: SweepTiming,
) {
    for pass in 0..SWEEP_PASSES {
        tracker.observe();
        let pids = tracker.live_pids();
        let pgids = tracker.live_pgids();
        if pids.is_empty() && pgids.is_empty() {
            debug!("sweep pass {pass}: nothing left alive");
            return;
        }

        let signal = if pass == 0 {
            first_signal
        } else {
            Signal::SIGKILL
        };
        debug!(
            "sweep pass {pass}: {signal} to {} pid(s), {} group(s)",
            pids.len(),
            if scope == SweepScope::PidsAndGroups {
                pgids.len()
            } else {
                0
            }
        );
        if scope == SweepScope::PidsAndGroups {
            for &pgid in &pgids {
                tracker.probe.signal_group(pgid, signal);
            }
        }
        for &pid in &pids {
            tracker.probe.signal_pid(pid, signal);
        }
        thread::sleep(timing.pass_interval);
    }
}

#[cfg(test)]
#[path = "cleanup_tests.rs"]
mod tests;
