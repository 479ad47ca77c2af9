//! Ultrasound microrobot dataset tooling.
//!
//! Encodes YOLO-style `images/` + `labels/` splits into `.amat` text matrices,
//! converts normalized label boxes to pixel corners, and loads per-image
//! detection targets.

pub mod config;
pub mod core;
pub mod error;
pub mod logging;

pub use crate::config::{DataConfig, DATA_CONFIG_FILE};
pub use crate::core::*;
pub use crate::error::{BoxError, DatasetError, DatasetResult};
