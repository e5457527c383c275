//! Presence Indexer
//!
//! Maps every (location, day) to the episodes whose patient was transferred
//! there that day while the episode's infectious window was open.

use chrono::NaiveDate;
use itertools::Itertools;
use rustc_hash::FxHashMap;
use smallvec::SmallVec;
use std::time::Instant;

use crate::config::AnalysisConfig;
use crate::models::episode::InfectionEpisode;
use crate::models::records::TransferRecord;
use crate::utils::logging::{log_stage_complete, log_stage_start, log_warning};

/// Key of a presence bucket
pub type PresenceKey = (String, NaiveDate);

/// Episodes present in one bucket, as indices into the episode list
pub type PresenceBucket = SmallVec<[usize; 4]>;

/// Mapping from (location, date) to the episodes present there
#[derive(Debug, Default, Clone)]
pub struct PresenceIndex {
    buckets: FxHashMap<PresenceKey, PresenceBucket>,
}

impl PresenceIndex {
    /// Build the index from episodes and transfers
    ///
    /// Transfers are grouped by patient once; each episode then scans only its
    /// own patient's rows. With `deduplicate` set an episode is registered at
    /// most once per bucket even if the patient has several rows for the same
    /// location and day.
    #[must_use]
    pub fn build(
        episodes: &[InfectionEpisode],
        transfers: &[TransferRecord],
        deduplicate: bool,
    ) -> Self {
        let start = Instant::now();
        log_stage_start("Presence indexer", transfers.len());

        let mut by_patient: FxHashMap<&str, Vec<&TransferRecord>> = FxHashMap::default();
        for transfer in transfers {
            by_patient
                .entry(transfer.patient_id.as_str())
                .or_default()
                .push(transfer);
        }

        if transfers.is_empty() {
            log_warning("no transfer records", Some("Presence indexer"));
        }

        let mut buckets: FxHashMap<PresenceKey, PresenceBucket> = FxHashMap::default();
        for (index, episode) in episodes.iter().enumerate() {
            let Some(patient_transfers) = by_patient.get(episode.patient_id.as_str()) else {
                continue;
            };

            for transfer in patient_transfers
                .iter()
                .filter(|t| episode.is_active_on(t.date))
            {
                let bucket = buckets
                    .entry((transfer.location.clone(), transfer.date))
                    .or_default();
                // Episodes are registered in index order, so a repeat is always last
                if deduplicate && bucket.last() == Some(&index) {
                    continue;
                }
                bucket.push(index);
            }
        }

        let index = Self { buckets };
        log_stage_complete("Presence indexer", index.len(), Some(start.elapsed()));
        index
    }

    /// Number of (location, date) buckets
    #[must_use]
    pub fn len(&self) -> usize {
        self.buckets.len()
    }

    /// Whether the index has no buckets
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.buckets.is_empty()
    }

    /// Episodes present at `location` on `date`
    #[must_use]
    pub fn get(&self, location: &str, date: NaiveDate) -> Option<&[usize]> {
        self.buckets
            .get(&(location.to_string(), date))
            .map(SmallVec::as_slice)
    }

    /// Episode ids present at `location` on `date`
    #[must_use]
    pub fn episode_ids<'a>(
        &self,
        location: &str,
        date: NaiveDate,
        episodes: &'a [InfectionEpisode],
    ) -> Vec<&'a str> {
        self.get(location, date)
            .map(|bucket| {
                bucket
                    .iter()
                    .filter_map(|&i| episodes.get(i).map(|e| e.episode_id.as_str()))
                    .collect()
            })
            .unwrap_or_default()
    }

    /// All buckets ordered by date, then location
    #[must_use]
    pub fn sorted_buckets(&self) -> Vec<(&PresenceKey, &PresenceBucket)> {
        self.buckets
            .iter()
            .sorted_by(|(a, _), (b, _)| a.1.cmp(&b.1).then_with(|| a.0.cmp(&b.0)))
            .collect()
    }

    /// Buckets holding at least two episodes, ordered by date, then location
    #[must_use]
    pub fn shared_buckets(&self) -> Vec<(&PresenceKey, &PresenceBucket)> {
        self.sorted_buckets()
            .into_iter()
            .filter(|(_, bucket)| bucket.len() >= 2)
            .collect()
    }
}

/// Build the presence index using the configured deduplication policy
#[must_use]
pub fn build_presence_index(
    episodes: &[InfectionEpisode],
    transfers: &[TransferRecord],
    config: &AnalysisConfig,
) -> PresenceIndex {
    PresenceIndex::build(episodes, transfers, config.deduplicate_presence)
}
