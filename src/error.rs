//! Error types for the oclean wrapper.
//!
//! Every variant renders as the message printed after the `oclean:` prefix
//! before the wrapper exits with status 1.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that stop the wrapper before or while supervising `opencode`.
#[derive(Debug, Error)]
pub enum WrapperError {
    /// `OCLEAN_ACTIVE` is already set, so oclean would wrap itself.
    #[error("recursive invocation detected; set OCLEAN_OPENCODE to the real opencode binary")]
    RecursiveInvocation,

    /// `OCLEAN_OPENCODE` names something other than a regular file.
    #[error("OCLEAN_OPENCODE does not point to a file")]
    OverrideNotAFile {
        /// The configured path.
        path: PathBuf,
    },

    /// No `opencode` other than oclean itself is on `PATH`.
    #[error("could not find real opencode binary in PATH (possible recursion); set OCLEAN_OPENCODE")]
    OpencodeNotFound,

    /// `PATH` is unset and no override was given.
    #[error("PATH is not set")]
    PathUnset,

    /// The wrapper's own executable path could not be determined.
    #[error("failed to resolve current executable: {0}")]
    CurrentExe(#[source] std::io::Error),

    /// `opencode` could not be started.
    #[error("failed to start opencode: {0}")]
    Spawn(#[source] std::io::Error),

    /// Polling the `opencode` child failed.
    #[error("failed while waiting for opencode: {0}")]
    Wait(#[source] std::io::Error),

    /// The child PID does not fit a signed 32-bit PID.
    #[error("child PID {pid} does not fit into i32 on this platform")]
    PidOutOfRange {
        /// The PID reported by the OS.
        pid: u32,
    },

    /// Signal handlers could not be registered.
    #[error("failed to register signal handlers: {0}")]
    SignalRegistration(#[source] std::io::Error),

    /// The event channel closed while `opencode` was still running.
    #[error("signal handler thread stopped unexpectedly")]
    EventChannelClosed,

    /// Writing to stdout failed.
    #[error("failed to write output: {0}")]
    WriteFailed(#[source] std::io::Error),
}

/// Result type alias using [`WrapperError`].
pub type Result<T> = std::result::Result<T, WrapperError>;

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case::recursion(
        WrapperError::RecursiveInvocation,
        "recursive invocation detected; set OCLEAN_OPENCODE to the real opencode binary"
    )]
    #[case::bad_override(
        WrapperError::OverrideNotAFile { path: PathBuf::from("/nope") },
        "OCLEAN_OPENCODE does not point to a file"
    )]
    #[case::not_found(
        WrapperError::OpencodeNotFound,
        "could not find real opencode binary in PATH (possible recursion); set OCLEAN_OPENCODE"
    )]
    #[case::channel(
        WrapperError::EventChannelClosed,
        "signal handler thread stopped unexpectedly"
    )]
    fn messages_match_published_wording(#[case] err: WrapperError, #[case] expected: &str) {
        assert_eq!(err.to_string(), expected);
    }

    #[test]
    fn spawn_error_keeps_source() {
        let err = WrapperError::Spawn(std::io::Error::other("permission denied"));
        assert!(err.to_string().starts_with("failed to start opencode"));
        assert!(std::error::Error::source(&err).is_some());
    }
}
