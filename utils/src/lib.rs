//! Shared utilities for the EcoNexus DAO.

pub mod logging;
pub mod time;

pub use logging::{init_logging, LogFormat};
pub use time::{format_duration, format_duration_ms};
