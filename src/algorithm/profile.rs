//! Dataset profile analysis
//!
//! Column-level overview of every loaded input file: row and column counts,
//! which columns are numeric, missing values, and numeric sums and means.

use arrow::array::{Array, ArrayRef, Float64Array, StringArray};
use arrow::compute::cast;
use arrow::datatypes::DataType;
use itertools::Itertools;
use rustc_hash::FxHashMap;
use serde::Serialize;

use crate::error::{ClusterError, Result};
use crate::reader::LoadedTable;
use crate::utils::logging::log_warning;

/// Number of entries in the most-common numeric columns section
const COMMON_COLUMNS_SHOWN: usize = 5;

/// Sum and mean of a numeric column
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct NumericSummary {
    pub sum: f64,
    pub mean: f64,
}

/// Profile of one column
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ColumnProfile {
    pub name: String,
    /// Null or blank values
    pub missing: usize,
    /// Present when every non-missing value is a number
    pub numeric: Option<NumericSummary>,
}

/// Profile of one input file
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TableProfile {
    pub name: String,
    pub total_rows: usize,
    pub total_columns: usize,
    pub columns: Vec<ColumnProfile>,
}

impl TableProfile {
    #[must_use]
    pub fn numeric_columns(&self) -> Vec<&str> {
        self.columns
            .iter()
            .filter(|c| c.numeric.is_some())
            .map(|c| c.name.as_str())
            .collect()
    }

    #[must_use]
    pub fn text_columns(&self) -> Vec<&str> {
        self.columns
            .iter()
            .filter(|c| c.numeric.is_none())
            .map(|c| c.name.as_str())
            .collect()
    }
}

/// Profile of all input files
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct DatasetProfile {
    pub total_files: usize,
    pub tables: Vec<TableProfile>,
    /// Files that could not be profiled
    pub errors: Vec<String>,
    pub total_rows: usize,
    pub average_columns_per_table: f64,
    /// Numeric column names with the number of files they are numeric in
    pub most_common_numeric_columns: Vec<(String, usize)>,
}

#[derive(Default)]
struct ColumnScan {
    missing: usize,
    sum: f64,
    count: usize,
    all_numeric: bool,
}

impl ColumnScan {
    fn new() -> Self {
        Self {
            all_numeric: true,
            ..Self::default()
        }
    }

    fn add_numeric(&mut self, array: &ArrayRef) -> Result<()> {
        let values = cast(array, &DataType::Float64)?;
        let values = values
            .as_any()
            .downcast_ref::<Float64Array>()
            .ok_or_else(|| ClusterError::Decode("expected a Float64 column".to_string()))?;
        for value in values {
            match value {
                Some(v) => {
                    self.sum += v;
                    self.count += 1;
                }
                None => self.missing += 1,
            }
        }
        Ok(())
    }

    fn add_text(&mut self, array: &ArrayRef) -> Result<()> {
        let values = cast(array, &DataType::Utf8)?;
        let values = values
            .as_any()
            .downcast_ref::<StringArray>()
            .ok_or_else(|| ClusterError::Decode("expected a Utf8 column".to_string()))?;
        for value in values {
            match value.map(str::trim).filter(|v| !v.is_empty()) {
                None => self.missing += 1,
                Some(v) => match v.parse::<f64>() {
                    Ok(number) if number.is_finite() => {
                        self.sum += number;
                        self.count += 1;
                    }
                    _ => self.all_numeric = false,
                },
            }
        }
        Ok(())
    }

    fn finish(self, name: &str) -> ColumnProfile {
        let numeric = (self.all_numeric && self.count > 0).then(|| NumericSummary {
            sum: self.sum,
            mean: self.sum / self.count as f64,
        });
        ColumnProfile {
            name: name.to_string(),
            missing: self.missing,
            numeric,
        }
    }
}

/// Profile one table under the given label
pub fn profile_table(label: &str, table: &LoadedTable) -> Result<TableProfile> {
    let schema = &table.schema;
    let columns = schema
        .fields()
        .iter()
        .map(|field| {
            let mut scan = ColumnScan::new();
            for batch in &table.batches {
                match batch.schema().index_of(field.name()) {
                    Ok(index) => {
                        let array = batch.column(index);
                        if array.data_type().is_numeric() {
                            scan.add_numeric(array)?;
                        } else {
                            scan.add_text(array)?;
                        }
                    }
                    Err(_) => scan.missing += batch.num_rows(),
                }
            }
            Ok(scan.finish(field.name()))
        })
        .collect::<Result<Vec<_>>>()?;

    Ok(TableProfile {
        name: label.to_string(),
        total_rows: table.num_rows(),
        total_columns: schema.fields().len(),
        columns,
    })
}

/// Profile labelled tables; failures are collected instead of aborting
#[must_use]
pub fn profile_tables(tables: &[(String, &LoadedTable)]) -> DatasetProfile {
    let mut profile = DatasetProfile {
        total_files: tables.len(),
        ..DatasetProfile::default()
    };

    for (label, table) in tables {
        match profile_table(label, table) {
            Ok(table_profile) => profile.tables.push(table_profile),
            Err(e) => {
                let message = format!("Error analyzing {label}: {e}");
                log_warning(&message, Some("Dataset profile"));
                profile.errors.push(message);
            }
        }
    }

    if !profile.tables.is_empty() {
        profile.total_rows = profile.tables.iter().map(|t| t.total_rows).sum();
        profile.average_columns_per_table = profile
            .tables
            .iter()
            .map(|t| t.total_columns)
            .sum::<usize>() as f64
            / profile.tables.len() as f64;

        let mut frequency: FxHashMap<&str, usize> = FxHashMap::default();
        for table in &profile.tables {
            for column in table.numeric_columns() {
                *frequency.entry(column).or_insert(0) += 1;
            }
        }
        profile.most_common_numeric_columns = frequency
            .into_iter()
            .sorted_by(|(a, a_n), (b, b_n)| b_n.cmp(a_n).then_with(|| a.cmp(b)))
            .map(|(column, n)| (column.to_string(), n))
            .collect();
    }

    profile
}

/// Render the dataset profile as plain text
#[must_use]
pub fn render_profile_report(profile: &DatasetProfile) -> String {
    if profile.tables.is_empty() {
        return "No data to analyze or all files had errors.\n".to_string();
    }

    let mut report = String::new();
    report.push_str("Dataset Profile:\n");
    report.push_str(&format!("  Files Processed: {}\n", profile.total_files));
    report.push_str(&format!("  Successfully Analyzed: {}\n", profile.tables.len()));
    if !profile.errors.is_empty() {
        report.push_str(&format!("  Errors: {}\n", profile.errors.len()));
        for error in &profile.errors {
            report.push_str(&format!("    - {error}\n"));
        }
    }

    report.push_str("\nSummary Statistics:\n");
    report.push_str(&format!("  Total Rows: {}\n", profile.total_rows));
    report.push_str(&format!(
        "  Average Columns per File: {:.1}\n",
        profile.average_columns_per_table
    ));

    if !profile.most_common_numeric_columns.is_empty() {
        report.push_str("\nMost Common Numeric Columns:\n");
        for (column, files) in profile
            .most_common_numeric_columns
            .iter()
            .take(COMMON_COLUMNS_SHOWN)
        {
            report.push_str(&format!("  {column}: appears in {files} file(s)\n"));
        }
    }

    report.push_str("\nFile Details:\n");
    for table in &profile.tables {
        report.push_str(&format!("\n  File: {}\n", table.name));
        report.push_str(&format!(
            "    Rows: {}, Columns: {}\n",
            table.total_rows, table.total_columns
        ));

        let numeric: Vec<_> = table
            .columns
            .iter()
            .filter_map(|c| c.numeric.map(|n| (c.name.as_str(), n)))
            .collect();
        if !numeric.is_empty() {
            report.push_str("    Column Sums:\n");
            for (name, summary) in numeric {
                report.push_str(&format!(
                    "      {name}: {:.2} (mean {:.2})\n",
                    summary.sum, summary.mean
                ));
            }
        }

        let text = table.text_columns();
        if !text.is_empty() {
            report.push_str(&format!("    Text Columns: {}\n", text.join(", ")));
        }

        let missing: Vec<_> = table.columns.iter().filter(|c| c.missing > 0).collect();
        if !missing.is_empty() {
            report.push_str(&format!(
                "    Missing Values: {}\n",
                missing
                    .iter()
                    .map(|c| format!("{} ({})", c.name, c.missing))
                    .join(", ")
            ));
        }
    }

    report
}
