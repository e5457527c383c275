//! Cluster Summarizer
//!
//! Flattens episodes, contacts and clusters into the structured result of an
//! analysis run, together with run-level statistics.

use chrono::NaiveDate;
use itertools::Itertools;
use rustc_hash::FxHashSet;
use serde::Serialize;
use std::collections::BTreeMap;

use crate::config::AnalysisConfig;
use crate::models::analysis_type::AnalysisType;
use crate::models::cluster::EpisodeCluster;
use crate::models::contact::ContactEdge;
use crate::models::episode::InfectionEpisode;

/// Summary of one cluster
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClusterSummary {
    /// Technical id, stable across reruns
    pub cluster_id: String,
    /// Human-readable name
    pub display_name: String,
    /// Pathogen shared by every member
    pub infection_type: String,
    /// Number of member episodes
    pub episode_count: usize,
    /// Number of distinct patients
    pub patient_count: usize,
    /// Contact events inside the cluster
    pub contact_count: usize,
    /// Patient ids, sorted
    pub patients: Vec<String>,
    /// Contact locations, sorted
    pub locations: Vec<String>,
    /// Member episode ids in episode order
    pub episode_ids: Vec<String>,
    /// Earliest window start among members
    pub start_date: NaiveDate,
    /// Latest window end among members
    pub end_date: NaiveDate,
    /// Days from start to end
    pub duration_days: i64,
    /// Contact events per patient
    pub risk_score: f64,
}

impl ClusterSummary {
    #[must_use]
    pub fn from_cluster(cluster: &EpisodeCluster, location_limit: usize) -> Self {
        Self {
            cluster_id: cluster.cluster_id.clone(),
            display_name: cluster.display_name(location_limit),
            infection_type: cluster.infection_type.clone(),
            episode_count: cluster.episode_count(),
            patient_count: cluster.patient_count(),
            contact_count: cluster.contact_count(),
            patients: cluster.sorted_patients(),
            locations: cluster.sorted_locations(),
            episode_ids: cluster.episode_ids(),
            start_date: cluster.date_range.start,
            end_date: cluster.date_range.end,
            duration_days: cluster.duration_days(),
            risk_score: cluster.risk_score(),
        }
    }
}

/// Summary of one episode
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EpisodeSummary {
    /// Episode id
    pub episode_id: String,
    /// Patient the episode belongs to
    pub patient_id: String,
    /// Pathogen
    pub infection_type: String,
    /// 1-based episode number for the patient and pathogen
    pub sequence: u32,
    /// First day of the infectious window
    pub episode_start: NaiveDate,
    /// Last day of the infectious window
    pub episode_end: NaiveDate,
    /// Positive tests in the episode
    pub test_count: usize,
}

impl From<&InfectionEpisode> for EpisodeSummary {
    fn from(episode: &InfectionEpisode) -> Self {
        Self {
            episode_id: episode.episode_id.clone(),
            patient_id: episode.patient_id.clone(),
            infection_type: episode.infection_type.clone(),
            sequence: episode.sequence,
            episode_start: episode.episode_start(),
            episode_end: episode.episode_end(),
            test_count: episode.test_count(),
        }
    }
}

/// Summary of one contact event
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ContactSummary {
    /// Episode encountered first in the presence bucket
    pub episode_a: String,
    /// Episode encountered second
    pub episode_b: String,
    /// Day of co-presence
    pub contact_date: NaiveDate,
    /// Shared location
    pub location: String,
    /// Contact label
    pub contact_type: String,
    /// Edge weight
    pub weight: f64,
}

impl From<&ContactEdge> for ContactSummary {
    fn from(edge: &ContactEdge) -> Self {
        Self {
            episode_a: edge.episode_a.clone(),
            episode_b: edge.episode_b.clone(),
            contact_date: edge.contact_date,
            location: edge.location.clone(),
            contact_type: edge.contact_type.label().to_string(),
            weight: edge.weight,
        }
    }
}

/// Contact count at one location
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LocationCount {
    /// Location name
    pub location: String,
    /// Contact events recorded there
    pub contacts: usize,
}

/// Aggregate statistics over all clusters
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ClusterStatistics {
    /// Distinct patients across all clusters
    pub total_patients_in_clusters: usize,
    /// Mean number of episodes per cluster
    pub mean_cluster_size: f64,
    /// Episodes in the largest cluster
    pub largest_cluster_size: usize,
    /// Pathogens with at least one cluster, sorted
    pub pathogens_with_clusters: Vec<String>,
}

impl ClusterStatistics {
    #[must_use]
    pub fn from_clusters(clusters: &[EpisodeCluster]) -> Self {
        if clusters.is_empty() {
            return Self::default();
        }

        let patients: FxHashSet<&str> = clusters
            .iter()
            .flat_map(|c| c.unique_patients.iter().map(String::as_str))
            .collect();
        let total_episodes: usize = clusters.iter().map(EpisodeCluster::episode_count).sum();

        Self {
            total_patients_in_clusters: patients.len(),
            mean_cluster_size: total_episodes as f64 / clusters.len() as f64,
            largest_cluster_size: clusters
                .iter()
                .map(EpisodeCluster::episode_count)
                .max()
                .unwrap_or(0),
            pathogens_with_clusters: clusters
                .iter()
                .map(|c| c.infection_type.clone())
                .unique()
                .sorted()
                .collect(),
        }
    }
}

/// Structured result of a cluster analysis run
#[derive(Debug, Clone, Default, Serialize)]
pub struct AnalysisResults {
    pub analysis_type: AnalysisType,
    pub total_episodes: usize,
    pub total_contacts: usize,
    pub total_clusters: usize,
    /// Cluster count per pathogen, including pathogens without clusters
    pub clusters_by_pathogen: BTreeMap<String, usize>,
    pub episodes_by_pathogen: BTreeMap<String, usize>,
    /// Locations with the most contact events
    pub top_locations: Vec<LocationCount>,
    pub clusters: Vec<ClusterSummary>,
    pub episodes: Vec<EpisodeSummary>,
    pub contacts: Vec<ContactSummary>,
    pub statistics: ClusterStatistics,
    /// Set when the run failed; all collections are then empty
    pub error: Option<String>,
}

impl AnalysisResults {
    /// Result carrying only an error message
    #[must_use]
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            error: Some(message.into()),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn is_error(&self) -> bool {
        self.error.is_some()
    }
}

/// Contact counts per location, most contacts first, ties by name
#[must_use]
pub fn top_contact_locations(contacts: &[ContactEdge], limit: usize) -> Vec<LocationCount> {
    contacts
        .iter()
        .map(|c| c.location.as_str())
        .counts()
        .into_iter()
        .sorted_by(|(a_loc, a_n), (b_loc, b_n)| b_n.cmp(a_n).then_with(|| a_loc.cmp(b_loc)))
        .take(limit)
        .map(|(location, contacts)| LocationCount {
            location: location.to_string(),
            contacts,
        })
        .collect()
}

/// Assemble the structured result from the pipeline outputs
#[must_use]
pub fn summarize(
    episodes: &[InfectionEpisode],
    contacts: &[ContactEdge],
    clusters: &[EpisodeCluster],
    config: &AnalysisConfig,
) -> AnalysisResults {
    let episodes_by_pathogen: BTreeMap<String, usize> = episodes
        .iter()
        .map(|e| e.infection_type.clone())
        .counts()
        .into_iter()
        .collect();

    let mut clusters_by_pathogen: BTreeMap<String, usize> =
        episodes_by_pathogen.keys().map(|p| (p.clone(), 0)).collect();
    for cluster in clusters {
        *clusters_by_pathogen
            .entry(cluster.infection_type.clone())
            .or_insert(0) += 1;
    }

    AnalysisResults {
        analysis_type: AnalysisType::EpisodeClustering,
        total_episodes: episodes.len(),
        total_contacts: contacts.len(),
        total_clusters: clusters.len(),
        clusters_by_pathogen,
        episodes_by_pathogen,
        top_locations: top_contact_locations(contacts, config.top_locations),
        clusters: clusters
            .iter()
            .map(|c| ClusterSummary::from_cluster(c, config.display_location_limit))
            .collect(),
        episodes: episodes.iter().map(EpisodeSummary::from).collect(),
        contacts: contacts.iter().map(ContactSummary::from).collect(),
        statistics: ClusterStatistics::from_clusters(clusters),
        error: None,
    }
}
