//! Mapping child outcomes and signals onto the wrapper's exit status.

use std::process::ExitStatus;

/// Exit status used when nothing more specific is known.
pub const FAILURE: u8 = 1;

/// Shell convention for death by signal: `128 + signal`, clamped to 255.
///
/// # Examples
///
/// ```
/// use oclean::exit::exit_code_from_signal;
///
/// assert_eq!(exit_code_from_signal(15), 143);
/// assert_eq!(exit_code_from_signal(200), 255);
/// ```
#[must_use]
pub fn exit_code_from_signal(signal: i32) -> u8 {
    clamp(128_i32.saturating_add(signal))
}

/// Exit code mirroring how the child finished.
///
/// Plain exits keep their code; death by signal maps through
/// [`exit_code_from_signal`]; anything else becomes [`FAILURE`].
#[must_use]
pub fn exit_code_from_status(status: ExitStatus) -> u8 {
    if let Some(code) = status.code() {
        return clamp(code);
    }
    signal_of(status).map_or(FAILURE, exit_code_from_signal)
}

#[cfg(unix)]
fn signal_of(status: ExitStatus) -> Option<i32> {
    use std::os::unix::process::ExitStatusExt;
    status.signal()
}

#[cfg(not(unix))]
fn signal_of(_status: ExitStatus) -> Option<i32> {
    None
}

fn clamp(code: i32) -> u8 {
    u8::try_from(code.clamp(0, 255)).unwrap_or(u8::MAX)
}
