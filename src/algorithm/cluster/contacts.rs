//! Contact Detector
//!
//! Emits a contact edge for every pair of co-present episodes that share a
//! pathogen and whose infectious windows overlap. Edges are not merged
//! across days: each (location, date) bucket contributes its own events.

use itertools::Itertools;
use log::debug;
use std::time::Instant;

use crate::algorithm::cluster::presence::PresenceIndex;
use crate::models::contact::ContactEdge;
use crate::models::episode::InfectionEpisode;
use crate::utils::logging::{log_stage_complete, log_stage_start};

/// Whether two episodes can be linked by a contact
#[must_use]
pub fn is_contact_pair(a: &InfectionEpisode, b: &InfectionEpisode) -> bool {
    a.episode_id != b.episode_id && a.infection_type == b.infection_type && a.overlaps_with(b)
}

/// Detect contacts from the presence index
///
/// Buckets are visited in (date, location) order and pairs in bucket order,
/// so the output is deterministic for a given input.
#[must_use]
pub fn detect_contacts(index: &PresenceIndex, episodes: &[InfectionEpisode]) -> Vec<ContactEdge> {
    let start = Instant::now();
    log_stage_start("Contact detector", index.len());

    let shared = index.shared_buckets();
    debug!("{} of {} presence buckets hold two or more episodes", shared.len(), index.len());

    let mut edges = Vec::new();
    for ((location, date), bucket) in shared {
        for (&i, &j) in bucket.iter().tuple_combinations() {
            let (Some(a), Some(b)) = (episodes.get(i), episodes.get(j)) else {
                continue;
            };
            if is_contact_pair(a, b) {
                edges.push(ContactEdge::same_location_same_day(
                    a.episode_id.as_str(),
                    b.episode_id.as_str(),
                    *date,
                    location.as_str(),
                )
                .at_indices(i, j));
            }
        }
    }

    log_stage_complete("Contact detector", edges.len(), Some(start.elapsed()));
    edges
}
