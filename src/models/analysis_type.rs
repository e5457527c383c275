//! Analysis type selection

use serde::{Deserialize, Serialize};
use std::fmt;

/// The analyses a run can perform
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum AnalysisType {
    /// Episode segmentation, contact detection and clustering
    #[default]
    EpisodeClustering,
    /// Column-level profile of the loaded tables
    DatasetProfile,
}

impl AnalysisType {
    /// Get the display name for this analysis type
    #[must_use]
    pub const fn display_name(self) -> &'static str {
        match self {
            Self::EpisodeClustering => "Episode-Based Cluster Detection",
            Self::DatasetProfile => "Dataset Profile",
        }
    }

    /// Get a one-line description of what the analysis does
    #[must_use]
    pub const fn description(self) -> &'static str {
        match self {
            Self::EpisodeClustering => {
                "Builds infection episodes from positive tests, detects same-day co-location \
                 between episodes of the same pathogen and groups them into transmission clusters"
            }
            Self::DatasetProfile => {
                "Summarizes row and column counts, missing values and numeric columns of each table"
            }
        }
    }

    /// Short name accepted by [`AnalysisType::from_name`]
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::EpisodeClustering => "episodes",
            Self::DatasetProfile => "profile",
        }
    }

    /// Get all analysis types
    #[must_use]
    pub fn all_types() -> Vec<Self> {
        vec![Self::EpisodeClustering, Self::DatasetProfile]
    }

    /// Parse a short command-line name
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        match name.trim().to_lowercase().as_str() {
            "episode" | "episodes" | "clusters" | "episode_clustering" => {
                Some(Self::EpisodeClustering)
            }
            "profile" | "dataset_profile" => Some(Self::DatasetProfile),
            _ => None,
        }
    }
}

impl fmt::Display for AnalysisType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.display_name())
    }
}
