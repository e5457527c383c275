//! Progress reporting for per-pathogen clustering
//!
//! This module provides the progress bar style used while clustering,
//! using the indicatif crate.

use indicatif::{ProgressBar, ProgressStyle};

/// Default style for the clustering progress bar
pub const DEFAULT_CLUSTERING_TEMPLATE: &str =
    "{spinner:.green} [{elapsed_precise}] [{wide_bar:.cyan/blue}] {pos}/{len} pathogens {msg}";

/// Create the progress bar for clustering `length` pathogens
///
/// Returns a hidden bar when `visible` is false, so callers can report
/// progress unconditionally.
#[must_use]
pub fn create_clustering_progress_bar(length: u64, visible: bool) -> ProgressBar {
    if !visible {
        return ProgressBar::hidden();
    }

    let pb = ProgressBar::new(length);
    let style = ProgressStyle::default_bar()
        .template(DEFAULT_CLUSTERING_TEMPLATE)
        .map(|style| style.progress_chars("#>-"))
        .unwrap_or_else(|_| ProgressStyle::default_bar());
    pb.set_style(style);
    pb.set_message("clustering");
    pb
}

/// Finish a progress bar with a completion message
///
/// # Arguments
/// * `pb` - The `ProgressBar` to finish
/// * `message` - Optional completion message
pub fn finish_progress_bar(pb: &ProgressBar, message: Option<&str>) {
    if let Some(msg) = message {
        pb.finish_with_message(msg.to_string());
    } else {
        pb.finish();
    }
}
