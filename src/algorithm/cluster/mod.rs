//! Episode-based infection cluster detection
//!
//! The pipeline runs strictly in order:
//! episodes -> presence index -> contacts -> clusters -> summary.
//! Each stage only consumes the output of the stages before it.

pub mod contacts;
pub mod detect;
pub mod episodes;
pub mod presence;
pub mod report;
pub mod summary;
pub mod union_find;

pub use contacts::detect_contacts;
pub use detect::{
    LinkedEdge, detect_clusters, detect_clusters_for_pathogen, group_by_pathogen, link_edges,
};
pub use episodes::build_episodes;
pub use presence::{PresenceIndex, build_presence_index};
pub use report::render_report;
pub use summary::{
    AnalysisResults, ClusterStatistics, ClusterSummary, ContactSummary, EpisodeSummary,
    LocationCount, summarize,
};
pub use union_find::DisjointSet;
