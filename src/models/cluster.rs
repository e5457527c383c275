//! Episode cluster model
//!
//! A cluster is a connected component of episodes of one pathogen, linked by
//! contact edges. Besides its members it carries the contact evidence and the
//! derived attributes used in summaries and reports.

use itertools::Itertools;
use rustc_hash::FxHashSet;
use serde::Serialize;

use crate::models::contact::ContactEdge;
use crate::models::episode::{DateWindow, InfectionEpisode};

/// Length of the location hash in a technical id
const LOCATION_HASH_LEN: usize = 6;

/// Connected component of episodes for one pathogen
#[derive(Debug, Clone, Serialize)]
pub struct EpisodeCluster {
    /// Deterministic technical identifier
    pub cluster_id: String,
    /// Pathogen shared by every member episode
    pub infection_type: String,
    /// Member episodes, ordered by episode id
    pub episodes: Vec<InfectionEpisode>,
    /// Distinct patients among the members
    pub unique_patients: FxHashSet<String>,
    /// Distinct locations of the internal contact edges
    pub locations: FxHashSet<String>,
    /// Earliest window start to latest window end across members
    pub date_range: DateWindow,
    /// Contact edges with both endpoints inside the cluster
    pub contact_events: Vec<ContactEdge>,
}

impl EpisodeCluster {
    /// Build a cluster from its member episodes and internal contact edges
    ///
    /// Returns `None` when there are no episodes.
    #[must_use]
    pub fn from_component(
        infection_type: &str,
        mut episodes: Vec<InfectionEpisode>,
        contact_events: Vec<ContactEdge>,
    ) -> Option<Self> {
        episodes.sort_by(|a, b| a.episode_id.cmp(&b.episode_id));

        let date_range = episodes
            .iter()
            .map(|e| e.window)
            .reduce(|acc, w| acc.union(&w))?;

        let unique_patients: FxHashSet<String> =
            episodes.iter().map(|e| e.patient_id.clone()).collect();
        let locations: FxHashSet<String> =
            contact_events.iter().map(|c| c.location.clone()).collect();

        let cluster_id = technical_id(infection_type, &date_range, &locations);

        Some(Self {
            cluster_id,
            infection_type: infection_type.to_string(),
            episodes,
            unique_patients,
            locations,
            date_range,
            contact_events,
        })
    }

    /// Number of distinct patients
    #[must_use]
    pub fn patient_count(&self) -> usize {
        self.unique_patients.len()
    }

    /// Number of member episodes
    #[must_use]
    pub fn episode_count(&self) -> usize {
        self.episodes.len()
    }

    /// Number of internal contact events
    #[must_use]
    pub fn contact_count(&self) -> usize {
        self.contact_events.len()
    }

    /// Days from the earliest start to the latest end
    #[must_use]
    pub fn duration_days(&self) -> i64 {
        self.date_range.duration_days()
    }

    /// Contact events per patient
    #[must_use]
    pub fn risk_score(&self) -> f64 {
        self.contact_events.len() as f64 / self.patient_count().max(1) as f64
    }

    /// Patients in sorted order
    #[must_use]
    pub fn sorted_patients(&self) -> Vec<String> {
        self.unique_patients.iter().cloned().sorted().collect()
    }

    /// Locations in sorted order
    #[must_use]
    pub fn sorted_locations(&self) -> Vec<String> {
        self.locations.iter().cloned().sorted().collect()
    }

    /// Episode ids in member order
    #[must_use]
    pub fn episode_ids(&self) -> Vec<String> {
        self.episodes.iter().map(|e| e.episode_id.clone()).collect()
    }

    /// Human-readable name naming at most `location_limit` locations
    #[must_use]
    pub fn display_name(&self, location_limit: usize) -> String {
        let locations = self.sorted_locations();
        let mut name = format!("{} cluster", self.infection_type);

        if !locations.is_empty() {
            let shown = locations.iter().take(location_limit).join(", ");
            name.push_str(" at ");
            name.push_str(&shown);
            if locations.len() > location_limit {
                name.push_str(&format!(" +{} more", locations.len() - location_limit));
            }
        }

        let patients = self.patient_count();
        name.push_str(&format!(
            " ({} to {}, {} patient{})",
            self.date_range.start,
            self.date_range.end,
            patients,
            if patients == 1 { "" } else { "s" }
        ));
        name
    }
}

/// Technical id: lower-cased pathogen, ISO date of the earliest start and a
/// short hash of the sorted location names
#[must_use]
pub fn technical_id(
    infection_type: &str,
    date_range: &DateWindow,
    locations: &FxHashSet<String>,
) -> String {
    let pathogen = infection_type.to_lowercase().split_whitespace().join("_");
    let location_key = locations.iter().sorted().join("|");
    let hash = blake3::hash(location_key.as_bytes()).to_hex();
    format!(
        "{pathogen}_{}_{}",
        date_range.start.format("%Y-%m-%d"),
        &hash.as_str()[..LOCATION_HASH_LEN]
    )
}
