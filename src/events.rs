//! Signals and parent loss, delivered to the supervisor as [`Event`]s.
//!
//! A `signal_hook` iterator thread forwards every handled signal, and an
//! optional watchdog thread reports when the wrapper's parent goes away
//! (for example a terminal emulator closed without sending SIGHUP).

use crate::config::WrapperConfig;
use crate::error::{Result, WrapperError};
use log::debug;
use nix::unistd::getppid;
use signal_hook::consts::signal::{SIGHUP, SIGINT, SIGQUIT, SIGTERM};
use signal_hook::iterator::Signals;
use std::io::IsTerminal;
use std::sync::mpsc::{self, Receiver, Sender};
use std::thread;
use std::time::Duration;

/// Signals that trigger a full cleanup.
pub const HANDLED_SIGNALS: [i32; 4] = [SIGHUP, SIGINT, SIGTERM, SIGQUIT];

/// How often the watchdog checks the parent PID.
pub const PARENT_CHECK_INTERVAL: Duration = Duration::from_millis(400);

/// Something the supervisor must react to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event {
    /// The wrapper received this signal.
    Signal(i32),
    /// The wrapper's parent exited or the wrapper was reparented to init.
    ParentGone,
}

/// True when `OCLEAN_WATCH_PARENT` is set and a terminal is attached.
#[must_use]
pub fn should_watch_parent(config: &WrapperConfig) -> bool {
    config.watch_parent && (std::io::stdin().is_terminal() || std::io::stdout().is_terminal())
}

/// True when the parent PID changed or the process was adopted by init.
#[must_use]
pub fn parent_gone(initial: i32, current: i32) -> bool {
    current != initial || current == 1
}

/// Register the signal handlers and, if asked, the parent watchdog.
///
/// # Errors
///
/// Returns [`WrapperError::SignalRegistration`] when the handlers cannot be
/// installed.
pub fn install_event_channel(watch_parent: bool) -> Result<Receiver<Event>> {
    let (tx, rx) = mpsc::channel();
    let mut signals = Signals::new(HANDLED_SIGNALS).map_err(WrapperError::SignalRegistration)?;

    let signal_tx = tx.clone();
    thread::spawn(move || {
        for signal in signals.forever() {
            debug!("received signal {signal}");
            if signal_tx.send(Event::Signal(signal)).is_err() {
                break;
            }
        }
    });

    if watch_parent {
        thread::spawn(move || watch_parent_process(&tx, PARENT_CHECK_INTERVAL));
    }
    Ok(rx)
}

fn watch_parent_process(tx: &Sender<Event>, interval: Duration) {
    let initial = getppid().as_raw();
    debug!("watching parent pid {initial}");
    loop {
        thread::sleep(interval);
        let current = getppid().as_raw();
        if parent_gone(initial, current) {
            debug!("parent {initial} gone (now {current})");
            if tx.send(Event::ParentGone).is_err() {
                debug!("supervisor no longer listening");
            }
            return;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case::unchanged(4000, 4000, false)]
    #[case::reparented(4000, 4100, true)]
    #[case::adopted_by_init(4000, 1, true)]
    #[case::started_under_init(1, 1, true)]
    fn parent_loss_detection(#[case] initial: i32, #[case] current: i32, #[case] gone: bool) {
        assert_eq!(parent_gone(initial, current), gone);
    }

    #[test]
    fn watchdog_is_off_without_the_variable() {
        assert!(!should_watch_parent(&WrapperConfig::default()));
    }

    #[test]
    fn handled_signals_cover_terminal_shutdown() {
        assert_eq!(HANDLED_SIGNALS, [1, 2, 15, 3]);
    }
}
