//! Running `opencode` under supervision.
//!
//! [`run`] is the whole wrapper: it refuses to nest, resolves the real
//! binary, short-circuits the print-and-exit flags, and otherwise hands the
//! spawned child to [`supervise`], which owns it until it exits or the
//! wrapper is told to stop.

use crate::cleanup::{SweepTiming, Tracker, full_cleanup, post_exit_sweep};
use crate::config::{ACTIVE_ENV, WrapperConfig};
use crate::error::{Result, WrapperError};
use crate::events::{Event, install_event_channel, should_watch_parent};
use crate::exit::{exit_code_from_signal, exit_code_from_status};
use crate::process_tree::SystemProcesses;
use crate::resolve::{is_passthrough, is_version_request, resolve_opencode};
use log::{debug, warn};
use signal_hook::consts::signal::SIGHUP;
use std::ffi::OsString;
use std::io::Write;
use std::path::Path;
use std::process::{Child, Command};
use std::sync::mpsc::{Receiver, RecvTimeoutError};
use std::time::{Duration, Instant};
use wait_timeout::ChildExt;

/// Cadence of the supervision loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Supervision {
    /// How long to wait for an event before polling the child again.
    pub poll_interval: Duration,
    /// How often the process tree is re-scanned while the child runs.
    pub observe_interval: Duration,
    /// How long to wait for the child to be reaped after a full cleanup.
    pub reap_timeout: Duration,
    /// Pauses used by the sweeps.
    pub sweep: SweepTiming,
}

impl Default for Supervision {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_millis(150),
            observe_interval: Duration::from_millis(800),
            reap_timeout: Duration::from_millis(1_500),
            sweep: SweepTiming::default(),
        }
    }
}

/// Run the wrapper with `args` and return the exit status to use.
///
/// # Errors
///
/// Fails on recursion, when `opencode` cannot be found or started, when
/// the signal handlers cannot be registered, and when the event channel
/// closes while the child is running.
pub fn run(config: &WrapperConfig, args: &[OsString], stdout: &mut dyn Write) -> Result<u8> {
    if config.active {
        return Err(WrapperError::RecursiveInvocation);
    }

    let opencode = match resolve_opencode(config) {
        Ok(path) => path,
        Err(err) if is_version_request(args) => {
            debug!("opencode unavailable ({err}); reporting own version");
            writeln!(stdout, "oclean {}", env!("CARGO_PKG_VERSION"))
                .map_err(WrapperError::WriteFailed)?;
            return Ok(0);
        }
        Err(err) => return Err(err),
    };
    debug!("resolved opencode at {}", opencode.display());

    if is_passthrough(args) {
        let status = opencode_command(&opencode, args)
            .status()
            .map_err(WrapperError::Spawn)?;
        return Ok(exit_code_from_status(status));
    }

    let events = install_event_channel(should_watch_parent(config))?;
    let mut child = opencode_command(&opencode, args)
        .spawn()
        .map_err(WrapperError::Spawn)?;
    let probe = SystemProcesses;
    let mut tracker = match i32::try_from(child.id()) {
        Ok(pid) => Tracker::new(&probe, pid),
        Err(_) => {
            let pid = child.id();
            if let Err(e) = child.kill() {
                warn!("failed to kill opencode child {pid}: {e}");
            }
            return Err(WrapperError::PidOutOfRange { pid });
        }
    };
    supervise(&mut child, &mut tracker, &events, Supervision::default())
}

fn opencode_command(opencode: &Path, args: &[OsString]) -> Command {
    let mut command = Command::new(opencode);
    command.args(args).env(ACTIVE_ENV, "1");
    command
}

/// Own `child` until it exits or an event arrives.
///
/// A child that exits on its own is followed by a post-exit sweep and its
/// exit status is mirrored. A signal (or loss of the parent, treated as
/// SIGHUP) triggers a full cleanup and yields `128 + signal`.
///
/// # Errors
///
/// Returns [`WrapperError::Wait`] when the child cannot be polled and
/// [`WrapperError::EventChannelClosed`] when every event sender is gone.
pub fn supervise(
    child: &mut Child,
    tracker: &mut Tracker<'_>,
    events: &Receiver<Event>,
    cadence: Supervision,
) -> Result<u8> {
    tracker.observe();
    let mut last_observed = Instant::now();

    loop {
        if last_observed.elapsed() >= cadence.observe_interval {
            tracker.observe();
            last_observed = Instant::now();
        }

        if let Some(status) = child.try_wait().map_err(WrapperError::Wait)? {
            debug!("opencode exited with {status}");
            post_exit_sweep(tracker, cadence.sweep);
            return Ok(exit_code_from_status(status));
        }

        let signal = match events.recv_timeout(cadence.poll_interval) {
            Ok(Event::Signal(signal)) => signal,
            Ok(Event::ParentGone) => SIGHUP,
            Err(RecvTimeoutError::Timeout) => continue,
            Err(RecvTimeoutError::Disconnected) => return Err(WrapperError::EventChannelClosed),
        };
        debug!("cleaning up after signal {signal}");
        full_cleanup(tracker, cadence.sweep);
        reap_child(child, cadence.reap_timeout);
        return Ok(exit_code_from_signal(signal));
    }
}

fn reap_child(child: &mut Child, timeout: Duration) {
    match child.wait_timeout(timeout) {
        Ok(Some(status)) => debug!("opencode reaped with {status}"),
        Ok(None) => warn!("opencode {} still running after cleanup", child.id()),
        Err(e) => warn!("failed to reap opencode {}: {e}", child.id()),
    }
}

#[cfg(test)]
#[path = "app_tests.rs"]
mod tests;
