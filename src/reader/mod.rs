//! Table acquisition
//!
//! Reads microbiology and transfer tables from CSV or Parquet files into
//! Arrow record batches. CSV columns are all read as text; typing happens
//! when rows are decoded (see [`schema`]).

pub mod async_loader;
pub mod schema;

use std::fs::File;
use std::io::Cursor;
use std::path::Path;
use std::sync::Arc;
use std::time::Instant;

use arrow::csv::ReaderBuilder;
use arrow::csv::reader::Format;
use arrow::datatypes::{DataType, Field, Schema, SchemaRef};
use arrow::record_batch::RecordBatch;
use log::{debug, info};
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use rustc_hash::FxHashSet;

use crate::error::{ClusterError, Result};
use crate::utils::logging::log_warning;

/// Rows per record batch when reading files
pub const DEFAULT_BATCH_SIZE: usize = 8192;

/// Rows inspected to discover the CSV header
const CSV_INFER_RECORDS: usize = 1;

/// Supported input file formats
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TableFormat {
    Csv,
    Parquet,
}

impl TableFormat {
    /// Format from the file extension (case-insensitive)
    pub fn from_path(path: &Path) -> Result<Self> {
        match path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(str::to_ascii_lowercase)
            .as_deref()
        {
            Some("csv") => Ok(Self::Csv),
            Some("parquet") => Ok(Self::Parquet),
            _ => Err(ClusterError::UnsupportedFormat(path.display().to_string())),
        }
    }
}

/// One loaded input file
#[derive(Debug, Clone)]
pub struct LoadedTable {
    /// File name without directories
    pub name: String,
    /// Blake3 hash of the file content
    pub content_hash: String,
    /// Header schema, present even when the file has no rows
    pub schema: SchemaRef,
    pub batches: Vec<RecordBatch>,
}

impl LoadedTable {
    /// Total number of rows
    #[must_use]
    pub fn num_rows(&self) -> usize {
        self.batches.iter().map(RecordBatch::num_rows).sum()
    }

    /// Whether the file had a header but no rows
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.num_rows() == 0
    }

    /// Whether two tables come from the same upload
    #[must_use]
    pub fn is_same_source(&self, other: &Self) -> bool {
        self.name == other.name && self.content_hash == other.content_hash
    }
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

fn content_hash(bytes: &[u8]) -> String {
    blake3::hash(bytes).to_hex().to_string()
}

/// Parse CSV content with a header row, reading every column as text
pub fn read_csv_bytes(name: &str, bytes: &[u8]) -> Result<LoadedTable> {
    let format = Format::default().with_header(true);
    let mut cursor = Cursor::new(bytes);
    let (inferred, _) = format.infer_schema(&mut cursor, Some(CSV_INFER_RECORDS))?;
    cursor.set_position(0);

    let text_schema: SchemaRef = Arc::new(Schema::new(
        inferred
            .fields()
            .iter()
            .map(|field| Field::new(field.name().trim(), DataType::Utf8, true))
            .collect::<Vec<_>>(),
    ));

    let reader = ReaderBuilder::new(Arc::clone(&text_schema))
        .with_format(format)
        .with_batch_size(DEFAULT_BATCH_SIZE)
        .build(cursor)?;
    let batches = reader.collect::<std::result::Result<Vec<_>, _>>()?;

    Ok(LoadedTable {
        name: name.to_string(),
        content_hash: content_hash(bytes),
        schema: text_schema,
        batches,
    })
}

/// Read the schema and all record batches of a Parquet file
pub fn read_parquet(path: &Path) -> Result<(SchemaRef, Vec<RecordBatch>)> {
    let file = File::open(path)?;
    let builder = ParquetRecordBatchReaderBuilder::try_new(file)?;
    let schema = Arc::clone(builder.schema());
    let reader = builder.with_batch_size(DEFAULT_BATCH_SIZE).build()?;
    Ok((schema, reader.collect::<std::result::Result<Vec<_>, _>>()?))
}

/// Load one CSV or Parquet file
pub fn load_table(path: &Path) -> Result<LoadedTable> {
    let start = Instant::now();
    let format = TableFormat::from_path(path)?;
    debug!("Loading {format:?} table from {}", path.display());

    let bytes = std::fs::read(path)?;
    let name = file_name(path);
    let table = match format {
        TableFormat::Csv => read_csv_bytes(&name, &bytes)?,
        TableFormat::Parquet => {
            let (schema, batches) = read_parquet(path)?;
            LoadedTable {
                name,
                content_hash: content_hash(&bytes),
                schema,
                batches,
            }
        }
    };

    info!(
        "Loaded {} rows from {} in {:?}",
        table.num_rows(),
        path.display(),
        start.elapsed()
    );
    Ok(table)
}

/// Drop tables whose name and content repeat an earlier one
#[must_use]
pub fn dedupe_tables(tables: Vec<LoadedTable>) -> Vec<LoadedTable> {
    let mut seen: FxHashSet<(String, String)> = FxHashSet::default();
    tables
        .into_iter()
        .filter(|table| {
            let fresh = seen.insert((table.name.clone(), table.content_hash.clone()));
            if !fresh {
                log_warning(&format!("skipping duplicate file {}", table.name), Some("reader"));
            }
            fresh
        })
        .collect()
}

/// Load several files of one dataset, skipping duplicates
pub fn load_tables<P: AsRef<Path>>(paths: &[P]) -> Result<Vec<LoadedTable>> {
    let tables = paths
        .iter()
        .map(|path| load_table(path.as_ref()))
        .collect::<Result<Vec<_>>>()?;
    Ok(dedupe_tables(tables))
}

/// All record batches of a dataset, in file order
#[must_use]
pub fn dataset_batches(tables: &[LoadedTable]) -> Vec<RecordBatch> {
    tables
        .iter()
        .flat_map(|table| table.batches.iter().cloned())
        .collect()
}
