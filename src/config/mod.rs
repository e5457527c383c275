//! Configuration for infection cluster analysis.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{ClusterError, Result};
use crate::models::AnalysisType;
use crate::utils::dates::DateFormatConfig;

/// Maximum gap in days between consecutive positive tests of one episode
pub const DEFAULT_EPISODE_GAP_DAYS: i64 = 28;

/// Days added before the first and after the last positive test of an episode
pub const DEFAULT_INFECTIOUS_BUFFER_DAYS: i64 = 14;

/// Configuration for an analysis run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisConfig {
    /// Which analysis to run
    pub analysis_type: AnalysisType,
    /// Gap (inclusive) that still keeps two tests in the same episode
    pub episode_gap_days: i64,
    /// Infectious buffer added to both ends of an episode window
    pub infectious_buffer_days: i64,
    /// Register an episode at most once per (location, date) bucket
    pub deduplicate_presence: bool,
    /// Cluster pathogens in parallel
    pub parallel_clustering: bool,
    /// Worker threads for clustering; `None` uses the global rayon pool
    pub threads: Option<usize>,
    /// Number of locations named in a cluster display name
    pub display_location_limit: usize,
    /// Number of locations listed in the report's top contact locations
    pub top_locations: usize,
    /// Result value that marks a positive test
    pub positive_result: String,
    /// Show progress bars while clustering
    pub show_progress: bool,
    /// Accepted date formats
    pub date_formats: DateFormatConfig,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            analysis_type: AnalysisType::default(),
            episode_gap_days: DEFAULT_EPISODE_GAP_DAYS,
            infectious_buffer_days: DEFAULT_INFECTIOUS_BUFFER_DAYS,
            deduplicate_presence: true,
            parallel_clustering: true,
            threads: None,
            display_location_limit: 3,
            top_locations: 5,
            positive_result: "positive".to_string(),
            show_progress: false,
            date_formats: DateFormatConfig::default(),
        }
    }
}

impl AnalysisConfig {
    /// Default configuration with overrides from the environment
    ///
    /// Reads `CLUSTER_GAP_DAYS`, `CLUSTER_BUFFER_DAYS`, `CLUSTER_DEDUP_PRESENCE`
    /// and `CLUSTER_THREADS`.
    pub fn from_env() -> Result<Self> {
        Self::default().with_overrides(|key| std::env::var(key).ok())
    }

    /// Apply overrides looked up by variable name
    pub fn with_overrides<F>(mut self, lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(value) = lookup("CLUSTER_GAP_DAYS") {
            self.episode_gap_days = parse_env("CLUSTER_GAP_DAYS", &value)?;
        }
        if let Some(value) = lookup("CLUSTER_BUFFER_DAYS") {
            self.infectious_buffer_days = parse_env("CLUSTER_BUFFER_DAYS", &value)?;
        }
        if let Some(value) = lookup("CLUSTER_DEDUP_PRESENCE") {
            self.deduplicate_presence = parse_env("CLUSTER_DEDUP_PRESENCE", &value)?;
        }
        if let Some(value) = lookup("CLUSTER_THREADS") {
            self.threads = Some(parse_env("CLUSTER_THREADS", &value)?);
        }
        self.validate()?;
        Ok(self)
    }

    /// Check that the configuration describes a usable analysis
    pub fn validate(&self) -> Result<()> {
        if self.episode_gap_days < 0 {
            return Err(ClusterError::Config(format!(
                "episode gap must not be negative, got {}",
                self.episode_gap_days
            )));
        }
        if self.infectious_buffer_days < 0 {
            return Err(ClusterError::Config(format!(
                "infectious buffer must not be negative, got {}",
                self.infectious_buffer_days
            )));
        }
        if self.threads == Some(0) {
            return Err(ClusterError::Config("thread count must be at least 1".to_string()));
        }
        Ok(())
    }

    /// Thread count for a dedicated clustering pool, capped at the number of CPUs
    #[must_use]
    pub fn effective_threads(&self) -> Option<usize> {
        self.threads.map(|n| n.clamp(1, num_cpus::get().max(1)))
    }
}

fn parse_env<T: std::str::FromStr>(key: &str, value: &str) -> Result<T> {
    value
        .trim()
        .parse::<T>()
        .map_err(|_| ClusterError::Config(format!("{key} has invalid value '{value}'")))
}

impl fmt::Display for AnalysisConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Analysis Configuration:")?;
        writeln!(f, "  Analysis Type: {}", self.analysis_type)?;
        writeln!(f, "  Episode Gap: {} days", self.episode_gap_days)?;
        writeln!(f, "  Infectious Buffer: {} days", self.infectious_buffer_days)?;
        writeln!(f, "  Deduplicate Presence: {}", self.deduplicate_presence)?;
        writeln!(f, "  Parallel Clustering: {}", self.parallel_clustering)?;
        if let Some(threads) = self.threads {
            writeln!(f, "  Threads: {threads}")?;
        }
        writeln!(f, "  Positive Result Marker: {}", self.positive_result)?;
        Ok(())
    }
}
