//! Async loading of both input datasets
//!
//! Files are read on the tokio runtime; the microbiology and transfer
//! datasets are loaded concurrently.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

use futures::stream::{self, StreamExt, TryStreamExt};
use log::info;
use parquet::arrow::async_reader::ParquetRecordBatchStreamBuilder;

use super::{DEFAULT_BATCH_SIZE, LoadedTable, TableFormat, dedupe_tables, read_csv_bytes};
use crate::error::Result;

/// Load one CSV or Parquet file asynchronously
pub async fn load_table_async(path: &Path) -> Result<LoadedTable> {
    let format = TableFormat::from_path(path)?;
    let bytes = tokio::fs::read(path).await?;
    let name = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string());

    match format {
        TableFormat::Csv => read_csv_bytes(&name, &bytes),
        TableFormat::Parquet => {
            let file = tokio::fs::File::open(path).await?;
            let builder = ParquetRecordBatchStreamBuilder::new(file).await?;
            let schema = Arc::clone(builder.schema());
            let stream = builder.with_batch_size(DEFAULT_BATCH_SIZE).build()?;
            let batches = stream.try_collect::<Vec<_>>().await?;
            Ok(LoadedTable {
                name,
                content_hash: blake3::hash(&bytes).to_hex().to_string(),
                schema,
                batches,
            })
        }
    }
}

/// Load the files of one dataset, at most one per CPU at a time
///
/// Tables keep the order of `paths`; duplicates are skipped.
pub async fn load_tables_async(paths: &[PathBuf]) -> Result<Vec<LoadedTable>> {
    let tables = stream::iter(paths.iter())
        .map(|path| load_table_async(path))
        .buffered(num_cpus::get().max(1))
        .try_collect::<Vec<_>>()
        .await?;
    Ok(dedupe_tables(tables))
}

/// Load the microbiology and transfer datasets concurrently
pub async fn load_datasets_async(
    micro_paths: &[PathBuf],
    transfer_paths: &[PathBuf],
) -> Result<(Vec<LoadedTable>, Vec<LoadedTable>)> {
    let start = Instant::now();
    let (micro, transfers) = futures::try_join!(
        load_tables_async(micro_paths),
        load_tables_async(transfer_paths)
    )?;
    info!(
        "Loaded {} microbiology and {} transfer files in {:?}",
        micro.len(),
        transfers.len(),
        start.elapsed()
    );
    Ok((micro, transfers))
}
