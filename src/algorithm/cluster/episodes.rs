//! Episode Builder
//!
//! Turns positive test records into infection episodes. Positive tests are
//! grouped by (patient, pathogen) and walked in date order; a gap longer
//! than the configured threshold starts a new episode.

use itertools::Itertools;
use log::{debug, info};
use rustc_hash::FxHashMap;
use std::time::Instant;

use crate::config::AnalysisConfig;
use crate::models::episode::InfectionEpisode;
use crate::models::records::MicrobiologyRecord;
use crate::utils::logging::{log_stage_complete, log_stage_start, log_warning};

/// Split date-ordered tests into runs whose consecutive gaps are at most `gap_days`
///
/// A gap of exactly `gap_days` keeps both tests in the same run.
#[must_use]
pub fn split_by_gap(tests: Vec<MicrobiologyRecord>, gap_days: i64) -> Vec<Vec<MicrobiologyRecord>> {
    let mut runs: Vec<Vec<MicrobiologyRecord>> = Vec::new();

    for test in tests {
        let continues = runs
            .last()
            .and_then(|run| run.last())
            .is_some_and(|prev| (test.collection_date - prev.collection_date).num_days() <= gap_days);

        if continues {
            if let Some(run) = runs.last_mut() {
                run.push(test);
            }
        } else {
            runs.push(vec![test]);
        }
    }

    runs
}

/// Build infection episodes from microbiology records
///
/// Only rows whose result equals the configured positive marker take part.
/// Episodes are returned ordered by patient, pathogen and sequence number.
#[must_use]
pub fn build_episodes(
    records: &[MicrobiologyRecord],
    config: &AnalysisConfig,
) -> Vec<InfectionEpisode> {
    let start = Instant::now();
    log_stage_start("Episode builder", records.len());

    // Group positive tests by (patient, pathogen)
    let mut groups: FxHashMap<(&str, &str), Vec<MicrobiologyRecord>> = FxHashMap::default();
    for record in records
        .iter()
        .filter(|r| r.is_positive(&config.positive_result))
    {
        groups
            .entry((record.patient_id.as_str(), record.infection.as_str()))
            .or_default()
            .push(record.clone());
    }

    if groups.is_empty() {
        log_warning("no positive tests in microbiology data", Some("Episode builder"));
        return Vec::new();
    }

    debug!("Grouped positive tests into {} patient/pathogen groups", groups.len());

    let mut episodes = Vec::new();
    for ((patient_id, infection), mut tests) in groups
        .into_iter()
        .sorted_by(|(a, _), (b, _)| a.cmp(b))
    {
        // Stable sort keeps same-day tests in input order
        tests.sort_by_key(|t| t.collection_date);

        for (index, run) in split_by_gap(tests, config.episode_gap_days)
            .into_iter()
            .enumerate()
        {
            let sequence = u32::try_from(index + 1).unwrap_or(u32::MAX);
            if let Some(episode) = InfectionEpisode::from_tests(
                patient_id,
                infection,
                sequence,
                run,
                config.infectious_buffer_days,
            ) {
                episodes.push(episode);
            }
        }
    }

    info!(
        "Built {} episodes for {} patients",
        episodes.len(),
        episodes.iter().map(|e| e.patient_id.as_str()).unique().count()
    );
    log_stage_complete("Episode builder", episodes.len(), Some(start.elapsed()));
    episodes
}
