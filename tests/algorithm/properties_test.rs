//! Property tests for the episode, contact and cluster stages.

use std::collections::BTreeSet;

use proptest::prelude::*;

use crate::utils::{at, brute_force_components, day, negative, positive};
use infection_clusters::algorithm::cluster::{
    build_episodes, build_presence_index, detect_clusters, detect_contacts,
};
use infection_clusters::{AnalysisConfig, MicrobiologyRecord, TransferRecord};

const PATHOGENS: [&str; 3] = ["CRE", "MRSA", "VRE"];
const WARDS: [&str; 4] = ["Ward-A", "Ward-B", "ICU", "ER"];

fn micro_strategy() -> impl Strategy<Value = Vec<MicrobiologyRecord>> {
    prop::collection::vec((0u8..6, 0usize..3, 0i64..120, any::<bool>()), 0..40).prop_map(|rows| {
        rows.into_iter()
            .map(|(patient, pathogen, offset, is_positive)| {
                let patient = format!("P{patient}");
                if is_positive {
                    positive(&patient, PATHOGENS[pathogen], day(offset))
                } else {
                    negative(&patient, PATHOGENS[pathogen], day(offset))
                }
            })
            .collect()
    })
}

fn transfer_strategy() -> impl Strategy<Value = Vec<TransferRecord>> {
    prop::collection::vec((0u8..6, 0usize..4, 0i64..120), 0..60).prop_map(|rows| {
        rows.into_iter()
            .map(|(patient, ward, offset)| at(&format!("P{patient}"), WARDS[ward], day(offset)))
            .collect()
    })
}

proptest! {
    #[test]
    fn episode_windows_cover_their_tests(micro in micro_strategy()) {
        let config = AnalysisConfig::default();
        let episodes = build_episodes(&micro, &config);

        let positives = micro.iter().filter(|r| r.is_positive("positive")).count();
        let covered: usize = episodes.iter().map(|e| e.test_count()).sum();
        prop_assert_eq!(covered, positives);

        for episode in &episodes {
            let first = episode.first_test_date().unwrap();
            let last = episode.last_test_date().unwrap();
            prop_assert_eq!((first - episode.episode_start()).num_days(), 14);
            prop_assert_eq!((episode.episode_end() - last).num_days(), 14);
            for pair in episode.tests.windows(2) {
                let gap = (pair[1].collection_date - pair[0].collection_date).num_days();
                prop_assert!((0..=28).contains(&gap), "gap {} inside one episode", gap);
            }
        }
    }

    #[test]
    fn consecutive_episodes_are_separated_by_the_gap(micro in micro_strategy()) {
        let episodes = build_episodes(&micro, &AnalysisConfig::default());

        for pair in episodes.windows(2) {
            let (a, b) = (&pair[0], &pair[1]);
            if a.patient_id == b.patient_id && a.infection_type == b.infection_type {
                prop_assert_eq!(b.sequence, a.sequence + 1);
                let gap = (b.first_test_date().unwrap() - a.last_test_date().unwrap()).num_days();
                prop_assert!(gap > 28, "episodes split on a gap of {}", gap);
            }
        }

        let ids: BTreeSet<&str> = episodes.iter().map(|e| e.episode_id.as_str()).collect();
        prop_assert_eq!(ids.len(), episodes.len());
    }

    #[test]
    fn window_overlap_is_symmetric(micro in micro_strategy()) {
        let episodes = build_episodes(&micro, &AnalysisConfig::default());
        for a in &episodes {
            for b in &episodes {
                prop_assert_eq!(a.overlaps_with(b), b.overlaps_with(a));
            }
        }
    }

    #[test]
    fn contacts_link_same_pathogen_within_both_windows(
        micro in micro_strategy(),
        transfers in transfer_strategy(),
    ) {
        let config = AnalysisConfig::default();
        let episodes = build_episodes(&micro, &config);
        let index = build_presence_index(&episodes, &transfers, &config);
        let contacts = detect_contacts(&index, &episodes);

        for contact in &contacts {
            let a = episodes.iter().find(|e| e.episode_id == contact.episode_a).unwrap();
            let b = episodes.iter().find(|e| e.episode_id == contact.episode_b).unwrap();
            prop_assert_ne!(&a.episode_id, &b.episode_id);
            prop_assert_eq!(&a.infection_type, &b.infection_type);
            prop_assert!(a.is_active_on(contact.contact_date));
            prop_assert!(b.is_active_on(contact.contact_date));
            let present = transfers.iter().any(|t| {
                t.patient_id == a.patient_id
                    && t.location == contact.location
                    && t.date == contact.contact_date
            });
            prop_assert!(present, "no transfer backs contact at {}", contact.location);
        }
    }

    #[test]
    fn clusters_match_graph_components(
        micro in micro_strategy(),
        transfers in transfer_strategy(),
    ) {
        let config = AnalysisConfig {
            parallel_clustering: false,
            ..AnalysisConfig::default()
        };
        let episodes = build_episodes(&micro, &config);
        let index = build_presence_index(&episodes, &transfers, &config);
        let contacts = detect_contacts(&index, &episodes);
        let clusters = detect_clusters(&episodes, &contacts, &config).unwrap();

        let found: BTreeSet<Vec<String>> = clusters
            .iter()
            .map(|c| {
                let mut ids = c.episode_ids();
                ids.sort();
                ids
            })
            .collect();
        prop_assert_eq!(found, brute_force_components(&episodes, &contacts));

        let mut seen = BTreeSet::new();
        for cluster in &clusters {
            prop_assert!(cluster.episode_count() >= 2);
            prop_assert!(cluster.patient_count() <= cluster.episode_count());
            prop_assert!(cluster.contact_count() >= cluster.episode_count() - 1);
            prop_assert!(cluster.episodes.iter().all(|e| e.infection_type == cluster.infection_type));
            for id in cluster.episode_ids() {
                prop_assert!(seen.insert(id), "episode in two clusters");
            }
        }
    }
}
