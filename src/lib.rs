//! Process-cleanup wrapper for `opencode`.
//!
//! `oclean` runs the real `opencode` as a child, remembers every process and
//! process group that appears below it, and makes sure none of them outlive
//! the session: leftovers are swept when `opencode` exits, and the whole
//! tree is torn down when the wrapper is signalled or loses its parent.
//!
//! The binary is a thin shell over [`app::run`]; the modules are public so
//! the pieces can be tested and reused on their own.

pub mod app;
pub mod cleanup;
pub mod config;
pub mod error;
pub mod events;
pub mod exit;
pub mod logging;
pub mod process_tree;
pub mod resolve;

pub use config::WrapperConfig;
pub use error::{Result, WrapperError};
