//! Logging utilities
//!
//! This module provides standardized logging functions for pipeline stages.

/// Log a stage start with consistent format
///
/// # Arguments
/// * `stage` - Name of the pipeline stage
/// * `input_items` - Number of items the stage consumes
pub fn log_stage_start(stage: &str, input_items: usize) {
    log::debug!("{stage}: starting with {input_items} input items");
}

/// Log a stage completion with consistent format
///
/// # Arguments
/// * `stage` - Name of the pipeline stage
/// * `items` - Number of items produced
/// * `elapsed` - Optional elapsed time
pub fn log_stage_complete(stage: &str, items: usize, elapsed: Option<std::time::Duration>) {
    if let Some(duration) = elapsed {
        log::info!("{stage}: produced {items} items in {duration:?}");
    } else {
        log::info!("{stage}: produced {items} items");
    }
}

/// Log a warning about the input with consistent format
///
/// # Arguments
/// * `message` - Warning message
/// * `context` - Optional stage or table the warning relates to
pub fn log_warning(message: &str, context: Option<&str>) {
    if let Some(context) = context {
        log::warn!("{context}: {message}");
    } else {
        log::warn!("{message}");
    }
}
