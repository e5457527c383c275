//! Domain models for infection cluster analysis
//!
//! This module contains the input records and the entities derived from them:
//! infection episodes, contact edges between episodes, and episode clusters.

pub mod analysis_type;
pub mod cluster;
pub mod contact;
pub mod episode;
pub mod records;

// Re-export commonly used types
pub use analysis_type::AnalysisType;
pub use cluster::EpisodeCluster;
pub use contact::{ContactEdge, ContactType};
pub use episode::{DateWindow, InfectionEpisode};
pub use records::{MicrobiologyRecord, MicrobiologyRow, TransferRecord, TransferRow};
