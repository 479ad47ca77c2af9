//! Logging setup
//!
//! - Bracketed event format with local timestamps
//! - Logs to stderr, optionally mirrored to a timestamped file

mod formatter;
mod setup;

pub use formatter::BracketedFormatter;
pub use setup::setup_logging;
