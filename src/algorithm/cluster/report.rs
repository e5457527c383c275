//! Plain-text report of a cluster analysis run

use crate::algorithm::cluster::summary::AnalysisResults;

/// Render the human-readable report of an analysis run
///
/// An error result renders as a single error line.
#[must_use]
pub fn render_report(results: &AnalysisResults) -> String {
    if let Some(error) = &results.error {
        return format!("Analysis error: {error}\n");
    }

    let mut report = String::new();
    report.push_str("Infection Cluster Analysis Report:\n");
    report.push_str(&format!("  Total Episodes: {}\n", results.total_episodes));
    report.push_str(&format!("  Total Contacts: {}\n", results.total_contacts));
    report.push_str(&format!("  Total Clusters: {}\n", results.total_clusters));

    if !results.clusters_by_pathogen.is_empty() {
        report.push_str("\nClusters by Pathogen:\n");
        for (pathogen, count) in &results.clusters_by_pathogen {
            report.push_str(&format!("  {pathogen}: {count}\n"));
        }
    }

    if results.clusters.is_empty() {
        report.push_str("\nNo clusters detected.\n");
    } else {
        let stats = &results.statistics;
        report.push_str("\nCluster Statistics:\n");
        report.push_str(&format!(
            "  Patients in Clusters: {}\n",
            stats.total_patients_in_clusters
        ));
        report.push_str(&format!(
            "  Mean Cluster Size: {:.2} episodes\n",
            stats.mean_cluster_size
        ));
        report.push_str(&format!(
            "  Largest Cluster: {} episodes\n",
            stats.largest_cluster_size
        ));

        report.push_str("\nCluster Details:\n");
        for (number, cluster) in results.clusters.iter().enumerate() {
            report.push_str(&format!("\n  {}. {}\n", number + 1, cluster.display_name));
            report.push_str(&format!("     ID: {}\n", cluster.cluster_id));
            report.push_str(&format!(
                "     Episodes: {} ({} patients)\n",
                cluster.episode_count, cluster.patient_count
            ));
            report.push_str(&format!("     Duration: {} days\n", cluster.duration_days));
            report.push_str(&format!(
                "     Risk Score: {:.2} ({} contacts)\n",
                cluster.risk_score, cluster.contact_count
            ));
            report.push_str(&format!("     Locations: {}\n", cluster.locations.join(", ")));
        }
    }

    if !results.episodes_by_pathogen.is_empty() {
        report.push_str("\nEpisodes by Pathogen:\n");
        for (pathogen, count) in &results.episodes_by_pathogen {
            report.push_str(&format!("  {pathogen}: {count}\n"));
        }
    }

    if !results.top_locations.is_empty() {
        report.push_str("\nTop Contact Locations:\n");
        for entry in &results.top_locations {
            report.push_str(&format!("  {}: {} contacts\n", entry.location, entry.contacts));
        }
    }

    report
}
