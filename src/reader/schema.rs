//! Table schemas and row decoding
//!
//! Input tables may come with extra columns, differently cased headers or
//! typed columns (e.g. Parquet dates). Each batch is normalized onto the
//! row struct's schema, with every required column as text, before rows are
//! decoded with `serde_arrow`.

use arrow::array::ArrayRef;
use arrow::compute::cast;
use arrow::datatypes::{DataType, Schema};
use arrow::record_batch::RecordBatch;
use serde::de::DeserializeOwned;
use std::sync::Arc;

use crate::config::AnalysisConfig;
use crate::error::{ClusterError, Result};
use crate::models::records::{MicrobiologyRecord, MicrobiologyRow, TransferRecord, TransferRow};
use crate::reader::LoadedTable;

/// Table layout of a raw row struct
///
/// Implemented with `#[derive(TableSchema)]`.
pub trait TableSchema {
    /// Name used in error messages
    const TABLE_NAME: &'static str;
    /// Columns that must be present in the input
    const REQUIRED_COLUMNS: &'static [&'static str];
    /// Arrow schema the input is normalized to
    fn arrow_schema() -> Schema;
}

/// Index of a column, matched exactly first and then ignoring case and
/// surrounding whitespace
#[must_use]
pub fn find_column(schema: &Schema, name: &str) -> Option<usize> {
    schema.index_of(name).ok().or_else(|| {
        schema
            .fields()
            .iter()
            .position(|f| f.name().trim().eq_ignore_ascii_case(name))
    })
}

/// Required columns missing from `schema`
#[must_use]
pub fn missing_columns<T: TableSchema>(schema: &Schema) -> Vec<String> {
    T::REQUIRED_COLUMNS
        .iter()
        .filter(|column| find_column(schema, column).is_none())
        .map(|column| (*column).to_string())
        .collect()
}

/// Check that `schema` carries every required column of `T`
pub fn validate_columns<T: TableSchema>(schema: &Schema) -> Result<()> {
    let columns = missing_columns::<T>(schema);
    if columns.is_empty() {
        Ok(())
    } else {
        Err(ClusterError::MissingColumns {
            table: T::TABLE_NAME,
            columns,
        })
    }
}

/// Check the header of every table, including tables without rows
pub fn validate_tables<T: TableSchema>(tables: &[LoadedTable]) -> Result<()> {
    tables
        .iter()
        .try_for_each(|table| validate_columns::<T>(&table.schema))
}

/// Project a batch onto the schema of `T`, casting each column to text
pub fn normalize_batch<T: TableSchema>(batch: &RecordBatch) -> Result<RecordBatch> {
    let source = batch.schema();
    validate_columns::<T>(&source)?;

    let target = T::arrow_schema();
    let columns = target
        .fields()
        .iter()
        .map(|field| {
            let index = find_column(&source, field.name()).ok_or_else(|| {
                ClusterError::MissingColumns {
                    table: T::TABLE_NAME,
                    columns: vec![field.name().clone()],
                }
            })?;
            let column = batch.column(index);
            if column.data_type() == field.data_type() {
                Ok(Arc::clone(column))
            } else if column.data_type() == &DataType::Null {
                Ok(arrow::array::new_null_array(field.data_type(), batch.num_rows()))
            } else {
                Ok(cast(column, field.data_type())?)
            }
        })
        .collect::<Result<Vec<ArrayRef>>>()?;

    Ok(RecordBatch::try_new(Arc::new(target), columns)?)
}

/// Decode raw rows of `T` from record batches
///
/// Fails if any batch lacks a required column.
pub fn decode_rows<T>(batches: &[RecordBatch]) -> Result<Vec<T>>
where
    T: TableSchema + DeserializeOwned,
{
    let mut rows = Vec::with_capacity(batches.iter().map(RecordBatch::num_rows).sum());
    for batch in batches {
        let normalized = normalize_batch::<T>(batch)?;
        let decoded: Vec<T> = serde_arrow::from_record_batch(&normalized)?;
        rows.extend(decoded);
    }
    Ok(rows)
}

/// Decode microbiology records, parsing dates and checking identifiers
///
/// Row numbers in errors are 1-based across all batches.
pub fn decode_microbiology(
    batches: &[RecordBatch],
    config: &AnalysisConfig,
) -> Result<Vec<MicrobiologyRecord>> {
    decode_rows::<MicrobiologyRow>(batches)?
        .into_iter()
        .enumerate()
        .map(|(i, row)| row.into_record(i + 1, &config.positive_result, &config.date_formats))
        .collect()
}

/// Decode transfer records, parsing dates and checking identifiers
pub fn decode_transfers(
    batches: &[RecordBatch],
    config: &AnalysisConfig,
) -> Result<Vec<TransferRecord>> {
    decode_rows::<TransferRow>(batches)?
        .into_iter()
        .enumerate()
        .map(|(i, row)| row.into_record(i + 1, &config.date_formats))
        .collect()
}
