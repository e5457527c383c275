use crate::utils::{at, d, positive};
use infection_clusters::synthetic::{SyntheticConfig, generate_dataset};
use infection_clusters::{AnalysisConfig, Result, analyze, render_report};

fn cluster_ids(results: &infection_clusters::AnalysisResults) -> Vec<String> {
    results.clusters.iter().map(|c| c.cluster_id.clone()).collect()
}

/// Rerunning on the same input yields the same ids and report
#[test]
fn test_rerun_is_identical() -> Result<()> {
    let micro = vec![
        positive("P1", "CRE", d(4, 1)),
        positive("P2", "CRE", d(4, 3)),
        positive("P3", "VRE", d(4, 2)),
        positive("P4", "VRE", d(4, 4)),
    ];
    let transfers = vec![
        at("P1", "Ward-A", d(4, 2)),
        at("P2", "Ward-A", d(4, 2)),
        at("P3", "ICU", d(4, 5)),
        at("P4", "ICU", d(4, 5)),
    ];
    let config = AnalysisConfig::default();

    let first = analyze(&micro, &transfers, &config)?;
    let second = analyze(&micro, &transfers, &config)?;

    assert_eq!(first.total_clusters, 2);
    assert_eq!(cluster_ids(&first), cluster_ids(&second));
    assert_eq!(render_report(&first), render_report(&second));
    Ok(())
}

/// Input row order does not change cluster ids or their order
#[test]
fn test_input_order_does_not_matter() -> Result<()> {
    let dataset = generate_dataset(&SyntheticConfig::default());
    let config = AnalysisConfig::default();

    let forward = analyze(&dataset.microbiology, &dataset.transfers, &config)?;

    let mut micro = dataset.microbiology.clone();
    let mut transfers = dataset.transfers.clone();
    micro.reverse();
    transfers.reverse();
    let reversed = analyze(&micro, &transfers, &config)?;

    assert_eq!(forward.total_episodes, reversed.total_episodes);
    assert_eq!(forward.total_contacts, reversed.total_contacts);
    assert_eq!(cluster_ids(&forward), cluster_ids(&reversed));
    assert_eq!(forward.clusters_by_pathogen, reversed.clusters_by_pathogen);
    Ok(())
}

/// Parallel and sequential clustering agree on a generated dataset
#[test]
fn test_parallel_matches_sequential() -> Result<()> {
    let dataset = generate_dataset(&SyntheticConfig {
        seed: 7,
        patients: 120,
        ..SyntheticConfig::default()
    });

    let sequential = analyze(
        &dataset.microbiology,
        &dataset.transfers,
        &AnalysisConfig {
            parallel_clustering: false,
            ..AnalysisConfig::default()
        },
    )?;
    let pooled = analyze(
        &dataset.microbiology,
        &dataset.transfers,
        &AnalysisConfig {
            threads: Some(2),
            ..AnalysisConfig::default()
        },
    )?;

    assert_eq!(cluster_ids(&sequential), cluster_ids(&pooled));
    assert_eq!(
        serde_json::to_string(&sequential.statistics).unwrap(),
        serde_json::to_string(&pooled.statistics).unwrap()
    );
    Ok(())
}
