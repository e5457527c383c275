//! Detection of infection transmission clusters from hospital data.
//!
//! Positive microbiology tests are segmented into infection episodes,
//! episodes are linked by same-day, same-location presence found in patient
//! transfer records, and linked episodes of one pathogen are grouped into
//! clusters with descriptive risk statistics.

pub mod algorithm;
pub mod analysis;
pub mod cli;
pub mod config;
pub mod error;
pub mod models;
pub mod reader;
pub mod synthetic;
pub mod utils;

// Re-export the most common types for easier use
pub use analysis::{AnalysisOutcome, analyze, run_analysis, run_analysis_on_tables};
pub use config::AnalysisConfig;
pub use error::{ClusterError, Result};
pub use models::{
    AnalysisType, ContactEdge, ContactType, DateWindow, EpisodeCluster, InfectionEpisode,
    MicrobiologyRecord, TransferRecord,
};

// Pipeline stages
pub use algorithm::cluster::{
    AnalysisResults, DisjointSet, PresenceIndex, build_episodes, build_presence_index,
    detect_clusters, detect_contacts, render_report, summarize,
};
pub use algorithm::profile::{DatasetProfile, profile_tables, render_profile_report};

// Table loading
pub use reader::async_loader::load_datasets_async;
pub use reader::{LoadedTable, load_table, load_tables};

// Arrow types
pub use arrow::record_batch::RecordBatch;
