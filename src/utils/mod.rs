//! Shared utilities: date parsing and logging helpers

pub mod dates;
pub mod logging;

pub use logging::{log_stage_complete, log_stage_start, log_warning};
