//! Logging utilities for pipeline stages and progress tracking
//!
//! This module provides standardized stage logging and progress bars.

pub mod log;
pub mod progress;

// Re-export commonly used functions for convenience
pub use self::log::{log_stage_complete, log_stage_start, log_warning};
pub use self::progress::{create_clustering_progress_bar, finish_progress_bar};
