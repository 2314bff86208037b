//! `env_logger` setup for the wrapper.
//!
//! Diagnostics go to stderr prefixed with `oclean:` so they are easy to
//! tell apart from `opencode`'s own output on the shared terminal.

use crate::config::WrapperConfig;
use env_logger::{Builder, Target};
use log::{LevelFilter, debug};
use std::io::Write;

/// Logger builder for `config`.
///
/// `OCLEAN_DEBUG` selects `Debug`, otherwise `Warn`; an `OCLEAN_LOG` filter
/// is applied on top.
#[must_use]
pub fn builder(config: &WrapperConfig) -> Builder {
    let mut builder = Builder::new();
    builder
        .filter_level(if config.debug {
            LevelFilter::Debug
        } else {
            LevelFilter::Warn
        })
        .target(Target::Stderr)
        .format(|buf, record| writeln!(buf, "oclean: {}", record.args()));
    if let Some(filter) = &config.log_filter {
        builder.parse_filters(filter);
    }
    builder
}

/// Install the global logger.
pub fn init(config: &WrapperConfig) {
    if let Err(e) = builder(config).try_init() {
        debug!("logger already installed: {e}");
    }
}
