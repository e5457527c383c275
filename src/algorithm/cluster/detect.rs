//! Cluster Detector
//!
//! Partitions the episodes of each pathogen into connected components of the
//! contact graph. Pathogens are independent, so they are clustered in
//! parallel with rayon.

use indicatif::{ParallelProgressIterator, ProgressIterator};
use log::{debug, info};
use rayon::prelude::*;
use rustc_hash::FxHashMap;
use std::collections::BTreeMap;
use std::time::Instant;

use crate::algorithm::cluster::union_find::DisjointSet;
use crate::config::AnalysisConfig;
use crate::error::{ClusterError, Result};
use crate::models::cluster::EpisodeCluster;
use crate::models::contact::ContactEdge;
use crate::models::episode::InfectionEpisode;
use crate::utils::logging::{
    create_clustering_progress_bar, finish_progress_bar, log_stage_complete, log_stage_start,
};

/// Contact edge resolved to the positions of its endpoints
pub type LinkedEdge<'a> = (usize, usize, &'a ContactEdge);

/// Positions of the episodes of each pathogen, in pathogen order
#[must_use]
pub fn group_by_pathogen(episodes: &[InfectionEpisode]) -> BTreeMap<&str, Vec<usize>> {
    let mut groups: BTreeMap<&str, Vec<usize>> = BTreeMap::new();
    for (i, episode) in episodes.iter().enumerate() {
        groups
            .entry(episode.infection_type.as_str())
            .or_default()
            .push(i);
    }
    groups
}

/// Resolve each edge to the positions of its endpoints in `episodes`
///
/// Edges from the contact detector carry their positions. Edges built without
/// them are matched by episode id. Edges whose endpoints are unknown or carry
/// different pathogens are dropped.
#[must_use]
pub fn link_edges<'a>(episodes: &[InfectionEpisode], edges: &'a [ContactEdge]) -> Vec<LinkedEdge<'a>> {
    let mut by_id: FxHashMap<&str, usize> = FxHashMap::default();
    for (i, episode) in episodes.iter().enumerate() {
        by_id.entry(episode.episode_id.as_str()).or_insert(i);
    }
    let holds = |i: usize, id: &str| episodes.get(i).is_some_and(|e| e.episode_id == id);

    edges
        .iter()
        .filter_map(|edge| {
            let (a, b) = match edge.episode_indices {
                Some((a, b))
                    if holds(a, edge.episode_a.as_str()) && holds(b, edge.episode_b.as_str()) =>
                {
                    (a, b)
                }
                _ => (
                    *by_id.get(edge.episode_a.as_str())?,
                    *by_id.get(edge.episode_b.as_str())?,
                ),
            };
            (episodes[a].infection_type == episodes[b].infection_type).then_some((a, b, edge))
        })
        .collect()
}

/// Cluster the episodes of one pathogen
///
/// `members` are positions in `episodes`. Only edges with both endpoints
/// among `members` are used. Components with fewer than two episodes are
/// discarded.
#[must_use]
pub fn detect_clusters_for_pathogen(
    pathogen: &str,
    episodes: &[InfectionEpisode],
    members: &[usize],
    edges: &[LinkedEdge<'_>],
) -> Vec<EpisodeCluster> {
    let slot: FxHashMap<usize, usize> = members
        .iter()
        .enumerate()
        .map(|(local, &global)| (global, local))
        .collect();

    let internal: Vec<(usize, usize, &ContactEdge)> = edges
        .iter()
        .filter_map(|&(a, b, edge)| Some((*slot.get(&a)?, *slot.get(&b)?, edge)))
        .collect();

    let mut forest = DisjointSet::new(members.len());
    for &(a, b, _) in &internal {
        forest.union(a, b);
    }

    // Every internal edge lies within exactly one component
    let mut edges_by_root: FxHashMap<usize, Vec<ContactEdge>> = FxHashMap::default();
    for &(a, _, edge) in &internal {
        edges_by_root
            .entry(forest.find(a))
            .or_default()
            .push(edge.clone());
    }

    let clusters: Vec<EpisodeCluster> = forest
        .components()
        .into_iter()
        .filter(|component| component.len() >= 2)
        .filter_map(|component| {
            let root = forest.find(component[0]);
            let cluster_members = component
                .iter()
                .map(|&local| episodes[members[local]].clone())
                .collect();
            let contact_events = edges_by_root.remove(&root).unwrap_or_default();
            EpisodeCluster::from_component(pathogen, cluster_members, contact_events)
        })
        .collect();

    debug!(
        "{pathogen}: {} episodes, {} internal contacts, {} clusters",
        members.len(),
        internal.len(),
        clusters.len()
    );
    clusters
}

/// Detect clusters for every pathogen
///
/// Returns clusters ordered by pathogen, earliest window start and id.
pub fn detect_clusters(
    episodes: &[InfectionEpisode],
    edges: &[ContactEdge],
    config: &AnalysisConfig,
) -> Result<Vec<EpisodeCluster>> {
    let start = Instant::now();
    log_stage_start("Cluster detector", episodes.len());

    let mut edges_by_pathogen: FxHashMap<&str, Vec<LinkedEdge<'_>>> = FxHashMap::default();
    for linked in link_edges(episodes, edges) {
        edges_by_pathogen
            .entry(episodes[linked.0].infection_type.as_str())
            .or_default()
            .push(linked);
    }

    let groups: Vec<(&str, Vec<usize>)> = group_by_pathogen(episodes).into_iter().collect();
    let no_edges: Vec<LinkedEdge<'_>> = Vec::new();
    let cluster_group = |(pathogen, members): &(&str, Vec<usize>)| {
        let pathogen_edges = edges_by_pathogen.get(*pathogen).unwrap_or(&no_edges);
        detect_clusters_for_pathogen(pathogen, episodes, members, pathogen_edges)
    };

    let pb = create_clustering_progress_bar(groups.len() as u64, config.show_progress);

    let per_pathogen: Vec<Vec<EpisodeCluster>> = if config.parallel_clustering {
        match config.effective_threads() {
            Some(threads) => {
                info!("Clustering {} pathogens on {threads} threads", groups.len());
                let pool = rayon::ThreadPoolBuilder::new()
                    .num_threads(threads)
                    .build()
                    .map_err(|e| ClusterError::Config(format!("cannot build thread pool: {e}")))?;
                pool.install(|| {
                    groups
                        .par_iter()
                        .progress_with(pb.clone())
                        .map(cluster_group)
                        .collect::<Vec<_>>()
                })
            }
            None => groups
                .par_iter()
                .progress_with(pb.clone())
                .map(cluster_group)
                .collect(),
        }
    } else {
        groups
            .iter()
            .progress_with(pb.clone())
            .map(cluster_group)
            .collect()
    };

    finish_progress_bar(&pb, Some("Clustering complete"));

    let mut clusters: Vec<EpisodeCluster> = per_pathogen.into_iter().flatten().collect();
    clusters.sort_by(|a, b| {
        a.infection_type
            .cmp(&b.infection_type)
            .then_with(|| a.date_range.start.cmp(&b.date_range.start))
            .then_with(|| a.cluster_id.cmp(&b.cluster_id))
    });

    log_stage_complete("Cluster detector", clusters.len(), Some(start.elapsed()));
    Ok(clusters)
}
