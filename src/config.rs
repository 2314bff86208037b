//! Wrapper settings collected from the environment.
//!
//! oclean has no configuration file: every knob is an environment variable
//! read once at startup into a [`WrapperConfig`]. Tests build the value from
//! a closure with [`WrapperConfig::from_lookup`] instead of mutating the
//! process environment.

use std::ffi::OsString;
use std::path::PathBuf;

/// Set on every `opencode` child; its presence means oclean is nested.
pub const ACTIVE_ENV: &str = "OCLEAN_ACTIVE";
/// Path of the real `opencode` binary, bypassing the `PATH` scan.
pub const OPENCODE_ENV: &str = "OCLEAN_OPENCODE";
/// Enables the parent watchdog when set.
pub const WATCH_PARENT_ENV: &str = "OCLEAN_WATCH_PARENT";
/// Enables debug logging when set.
pub const DEBUG_ENV: &str = "OCLEAN_DEBUG";
/// `env_logger` filter overriding the default level.
pub const LOG_ENV: &str = "OCLEAN_LOG";

/// Environment-derived settings for one wrapper run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WrapperConfig {
    /// `OCLEAN_ACTIVE` was present.
    pub active: bool,
    /// Value of `OCLEAN_OPENCODE`.
    pub opencode_override: Option<PathBuf>,
    /// Value of `PATH`.
    pub search_path: Option<OsString>,
    /// `OCLEAN_WATCH_PARENT` was present.
    pub watch_parent: bool,
    /// `OCLEAN_DEBUG` was present.
    pub debug: bool,
    /// Value of `OCLEAN_LOG`, if valid UTF-8.
    pub log_filter: Option<String>,
}

impl WrapperConfig {
    /// Read the settings from the process environment.
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var_os(key))
    }

    /// Build the settings from an arbitrary variable lookup.
    ///
    /// # Examples
    ///
    /// ```
    /// use oclean::config::WrapperConfig;
    ///
    /// let config = WrapperConfig::from_lookup(|key| match key {
    ///     "OCLEAN_DEBUG" => Some("1".into()),
    ///     _ => None,
    /// });
    /// assert!(config.debug);
    /// assert!(!config.active);
    /// ```
    #[must_use]
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<OsString>) -> Self {
        Self {
            active: lookup(ACTIVE_ENV).is_some(),
            opencode_override: lookup(OPENCODE_ENV).map(PathBuf::from),
            search_path: lookup("PATH"),
            watch_parent: lookup(WATCH_PARENT_ENV).is_some(),
            debug: lookup(DEBUG_ENV).is_some(),
            log_filter: lookup(LOG_ENV).and_then(|value| value.into_string().ok()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_environment_gives_defaults() {
        assert_eq!(WrapperConfig::from_lookup(|_| None), WrapperConfig::default());
    }

    #[test]
    fn presence_flags_ignore_values() {
        let config = WrapperConfig::from_lookup(|key| match key {
            ACTIVE_ENV | WATCH_PARENT_ENV => Some(OsString::new()),
            _ => None,
        });
        assert!(config.active);
        assert!(config.watch_parent);
        assert!(!config.debug);
    }

    #[test]
    fn values_are_captured() {
        let config = WrapperConfig::from_lookup(|key| match key {
            OPENCODE_ENV => Some("/opt/opencode/bin/opencode".into()),
            "PATH" => Some("/usr/bin:/bin".into()),
            LOG_ENV => Some("trace".into()),
            _ => None,
        });
        assert_eq!(
            config.opencode_override,
            Some(PathBuf::from("/opt/opencode/bin/opencode"))
        );
        assert_eq!(config.search_path, Some(OsString::from("/usr/bin:/bin")));
        assert_eq!(config.log_filter.as_deref(), Some("trace"));
    }

    #[test]
    fn from_env_reads_process_environment() {
        temp_env::with_vars(
            [(DEBUG_ENV, Some("1")), (ACTIVE_ENV, None::<&str>)],
            || {
                let config = WrapperConfig::from_env();
                assert!(config.debug);
                assert!(!config.active);
            },
        );
    }
}
