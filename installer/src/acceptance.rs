//! Post-install acceptance check.
//!
//! Runs `<binary> --version` with a timeout and requires the combined output
//! to contain a `major.minor.patch` version. A failing check reports an
//! error but never touches the installed files.

use camino::{Utf8Path, Utf8PathBuf};
use log::debug;
use regex::Regex;
use std::io::Read;
use std::process::{Command, Stdio};
use std::sync::OnceLock;
use std::sync::mpsc::{self, Receiver, RecvTimeoutError};
use std::thread;
use std::time::{Duration, Instant};
use wait_timeout::ChildExt;

/// Default time allowed for `oclean --version` to answer.
pub const DEFAULT_ACCEPTANCE_TIMEOUT: Duration = Duration::from_secs(10);

/// How long to wait for the output pipes to close once the binary exited.
const OUTPUT_GRACE: Duration = Duration::from_secs(1);

/// Pattern the version output must match.
pub const VERSION_PATTERN: &str = r"\d+\.\d+\.\d+";

/// Environment variable the wrapper uses to detect recursion; stripped so the
/// check also works when run from inside an oclean session.
const ACTIVE_ENV: &str = "OCLEAN_ACTIVE";

/// Errors arising from the acceptance check.
#[derive(Debug, thiserror::Error)]
pub enum AcceptanceError {
    /// The binary could not be started or its output collected.
    #[error("failed to run {binary} --version: {source}")]
    Spawn {
        /// Binary under test.
        binary: Utf8PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The binary did not exit within the allotted time.
    #[error("{binary} --version did not finish within {} seconds", .timeout.as_secs())]
    TimedOut {
        /// Binary under test.
        binary: Utf8PathBuf,
        /// The timeout that elapsed.
        timeout: Duration,
    },

    /// The binary exited unsuccessfully.
    #[error("{binary} --version exited with {status}: {output}")]
    Failed {
        /// Binary under test.
        binary: Utf8PathBuf,
        /// Exit status description.
        status: String,
        /// Captured output.
        output: String,
    },

    /// The output has no `major.minor.patch` version.
    #[error("{binary} --version printed no major.minor.patch version: {output:?}")]
    NoVersion {
        /// Binary under test.
        binary: Utf8PathBuf,
        /// Captured output.
        output: String,
    },
}

/// Result of a passing acceptance check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AcceptanceReport {
    /// The first version string found in the output.
    pub version: String,
    /// Full trimmed output of `--version`.
    pub output: String,
}

fn version_regex() -> Option<&'static Regex> {
    static VERSION_RE: OnceLock<Option<Regex>> = OnceLock::new();
    VERSION_RE
        .get_or_init(|| Regex::new(VERSION_PATTERN).ok())
        .as_ref()
}

/// Return the first `major.minor.patch` substring of `output`.
///
/// # Examples
///
/// ```
/// use oclean_installer::acceptance::extract_version;
///
/// assert_eq!(extract_version("oclean 0.1.1\n"), Some("0.1.1"));
/// assert_eq!(extract_version("opencode dev build"), None);
/// ```
#[must_use]
pub fn extract_version(output: &str) -> Option<&str> {
    version_regex()?.find(output).map(|m| m.as_str())
}

/// Forward `pipe` in chunks from its own thread so a chatty child never
/// blocks on a full pipe buffer.
fn drain<R: Read + Send + 'static>(pipe: Option<R>) -> Receiver<Vec<u8>> {
    let (tx, rx) = mpsc::channel();
    if let Some(mut pipe) = pipe {
        thread::spawn(move || {
            let mut buf = [0_u8; 4096];
            loop {
                match pipe.read(&mut buf) {
                    Ok(0) => break,
                    Ok(n) => {
                        let Some(chunk) = buf.get(..n) else { break };
                        if tx.send(chunk.to_vec()).is_err() {
                            break;
                        }
                    }
                    Err(e) if e.kind() == std::io::ErrorKind::Interrupted => {}
                    Err(e) => {
                        debug!("reading acceptance output failed: {e}");
                        break;
                    }
                }
            }
        });
    }
    rx
}

/// Output forwarded so far. A descendant that inherited the pipe can hold
/// it open after the binary exits, so waiting for the end is bounded.
fn collect(output: &Receiver<Vec<u8>>) -> String {
    let deadline = Instant::now() + OUTPUT_GRACE;
    let mut bytes = Vec::new();
    loop {
        match output.recv_timeout(deadline.saturating_duration_since(Instant::now())) {
            Ok(chunk) => bytes.extend(chunk),
            Err(RecvTimeoutError::Disconnected) => break,
            Err(RecvTimeoutError::Timeout) => {
                debug!("output pipe still open after exit; using what was read");
                break;
            }
        }
    }
    String::from_utf8_lossy(&bytes).into_owned()
}

/// Run `binary --version` and check its output.
///
/// # Errors
///
/// Returns an [`AcceptanceError`] when the binary cannot be run, times out,
/// exits unsuccessfully, or prints no version.
pub fn run_acceptance_check(
    binary: &Utf8Path,
    timeout: Duration,
) -> Result<AcceptanceReport, AcceptanceError> {
    let spawn_error = |source| AcceptanceError::Spawn {
        binary: binary.to_owned(),
        source,
    };
    debug!("running acceptance check: {binary} --version");
    let mut child = Command::new(binary)
        .arg("--version")
        .env_remove(ACTIVE_ENV)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .map_err(spawn_error)?;

    let stdout = drain(child.stdout.take());
    let stderr = drain(child.stderr.take());

    let Some(status) = child.wait_timeout(timeout).map_err(spawn_error)? else {
        if let Err(e) = child.kill() {
            debug!("failed to kill {binary}: {e}");
        }
        if let Err(e) = child.wait() {
            debug!("failed to reap {binary}: {e}");
        }
        return Err(AcceptanceError::TimedOut {
            binary: binary.to_owned(),
            timeout,
        });
    };

    let stdout = collect(&stdout);
    let stderr = collect(&stderr);
    let output = format!("{stdout}{stderr}").trim().to_owned();

    if !status.success() {
        return Err(AcceptanceError::Failed {
            binary: binary.to_owned(),
            status: status.to_string(),
            output,
        });
    }

    let Some(version) = extract_version(&output).map(str::to_owned) else {
        return Err(AcceptanceError::NoVersion {
            binary: binary.to_owned(),
            output,
        });
    };
    Ok(AcceptanceReport { version, output })
}
