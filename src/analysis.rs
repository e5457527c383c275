//! Analysis boundary
//!
//! Runs the configured analysis over the two input datasets and converts
//! every failure into a structured outcome, so callers never see a raw error.

use log::{error, info};
use serde::Serialize;
use std::time::Instant;

use crate::algorithm::cluster::{
    AnalysisResults, build_episodes, build_presence_index, detect_clusters, detect_contacts,
    render_report, summarize,
};
use crate::algorithm::profile::{DatasetProfile, profile_tables, render_profile_report};
use crate::config::AnalysisConfig;
use crate::error::{ClusterError, Result};
use crate::models::analysis_type::AnalysisType;
use crate::models::records::{MicrobiologyRecord, MicrobiologyRow, TransferRecord, TransferRow};
use crate::reader::schema::{decode_microbiology, decode_transfers, validate_tables};
use crate::reader::{LoadedTable, dataset_batches};

/// Message of a successful run
pub const SUCCESS_MESSAGE: &str = "Analysis completed successfully!";

/// Message when either dataset is absent
pub const MISSING_DATA_MESSAGE: &str = "Both Microbiology and Transfers data are required";

/// Result envelope of an analysis run
#[derive(Debug, Clone, Serialize)]
pub struct AnalysisOutcome {
    /// Whether the run produced results
    pub success: bool,
    /// Outcome message; failures start with "Analysis failed: "
    pub message: String,
    /// Cluster results; carries the error on failure
    pub results: AnalysisResults,
    /// Set when the dataset profile was requested
    pub profile: Option<DatasetProfile>,
    /// Plain-text report, absent on failure
    pub formatted: Option<String>,
}

impl AnalysisOutcome {
    fn clusters(results: AnalysisResults) -> Self {
        let formatted = render_report(&results);
        Self {
            success: true,
            message: SUCCESS_MESSAGE.to_string(),
            results,
            profile: None,
            formatted: Some(formatted),
        }
    }

    fn profile(profile: DatasetProfile) -> Self {
        let formatted = render_profile_report(&profile);
        Self {
            success: true,
            message: SUCCESS_MESSAGE.to_string(),
            results: AnalysisResults {
                analysis_type: AnalysisType::DatasetProfile,
                ..AnalysisResults::default()
            },
            profile: Some(profile),
            formatted: Some(formatted),
        }
    }

    /// Failed outcome for `error`
    #[must_use]
    pub fn from_error(error: &ClusterError) -> Self {
        error!("Analysis failed: {error}");
        let message = match error {
            ClusterError::MissingDataset(_) => MISSING_DATA_MESSAGE.to_string(),
            other => format!("Analysis failed: {other}"),
        };
        Self {
            success: false,
            message,
            results: AnalysisResults::error(error.to_string()),
            profile: None,
            formatted: None,
        }
    }
}

/// Run episode clustering over typed records
///
/// Empty inputs are not errors; they produce empty results.
pub fn analyze(
    micro: &[MicrobiologyRecord],
    transfers: &[TransferRecord],
    config: &AnalysisConfig,
) -> Result<AnalysisResults> {
    config.validate()?;
    let start = Instant::now();

    let episodes = build_episodes(micro, config);
    let index = build_presence_index(&episodes, transfers, config);
    let contacts = detect_contacts(&index, &episodes);
    let clusters = detect_clusters(&episodes, &contacts, config)?;
    let results = summarize(&episodes, &contacts, &clusters, config);

    info!(
        "Analysis found {} episodes, {} contacts and {} clusters in {:?}",
        results.total_episodes,
        results.total_contacts,
        results.total_clusters,
        start.elapsed()
    );
    Ok(results)
}

fn require<'a, T>(data: Option<&'a [T]>, name: &'static str) -> Result<&'a [T]> {
    match data {
        Some(rows) if !rows.is_empty() => Ok(rows),
        _ => Err(ClusterError::MissingDataset(name)),
    }
}

/// Run episode clustering, capturing any error in the outcome
#[must_use]
pub fn run_analysis(
    micro: Option<&[MicrobiologyRecord]>,
    transfers: Option<&[TransferRecord]>,
    config: &AnalysisConfig,
) -> AnalysisOutcome {
    let result = require(micro, "microbiology").and_then(|micro| {
        let transfers = require(transfers, "transfers")?;
        analyze(micro, transfers, config)
    });

    match result {
        Ok(results) => AnalysisOutcome::clusters(results),
        Err(e) => AnalysisOutcome::from_error(&e),
    }
}

fn analyze_tables(
    micro: &[LoadedTable],
    transfers: &[LoadedTable],
    config: &AnalysisConfig,
) -> Result<AnalysisOutcome> {
    let micro = require(Some(micro), "microbiology")?;
    let transfers = require(Some(transfers), "transfers")?;

    match config.analysis_type {
        AnalysisType::DatasetProfile => {
            let labelled: Vec<(String, &LoadedTable)> = micro
                .iter()
                .map(|t| (format!("microbiology_{}", t.name), t))
                .chain(transfers.iter().map(|t| (format!("transfers_{}", t.name), t)))
                .collect();
            Ok(AnalysisOutcome::profile(profile_tables(&labelled)))
        }
        AnalysisType::EpisodeClustering => {
            validate_tables::<MicrobiologyRow>(micro)?;
            validate_tables::<TransferRow>(transfers)?;
            let micro_records = decode_microbiology(&dataset_batches(micro), config)?;
            let transfer_records = decode_transfers(&dataset_batches(transfers), config)?;
            info!(
                "Decoded {} microbiology and {} transfer records",
                micro_records.len(),
                transfer_records.len()
            );
            analyze(&micro_records, &transfer_records, config).map(AnalysisOutcome::clusters)
        }
    }
}

/// Run the configured analysis over loaded tables, capturing any error
#[must_use]
pub fn run_analysis_on_tables(
    micro: &[LoadedTable],
    transfers: &[LoadedTable],
    config: &AnalysisConfig,
) -> AnalysisOutcome {
    analyze_tables(micro, transfers, config).unwrap_or_else(|e| AnalysisOutcome::from_error(&e))
}
