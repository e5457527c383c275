//! Input record models
//!
//! Typed microbiology and transfer records used by the analysis, and the raw
//! row structs they are decoded from. Raw rows hold every column as optional
//! text; conversion parses dates and checks identifiers.

use chrono::NaiveDate;
use macros::TableSchema;
use serde::{Deserialize, Serialize};

use crate::error::{ClusterError, Result};
use crate::utils::dates::{DateFormatConfig, parse_date_string};

/// A single microbiology test result
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MicrobiologyRecord {
    /// Patient identifier
    pub patient_id: String,
    /// Pathogen / infection label
    pub infection: String,
    /// Specimen collection date
    pub collection_date: NaiveDate,
    /// Test result, `"positive"` marks relevant rows
    pub result: String,
}

impl MicrobiologyRecord {
    /// Create a new microbiology record
    #[must_use]
    pub fn new(
        patient_id: impl Into<String>,
        infection: impl Into<String>,
        collection_date: NaiveDate,
        result: impl Into<String>,
    ) -> Self {
        Self {
            patient_id: patient_id.into(),
            infection: infection.into(),
            collection_date,
            result: result.into(),
        }
    }

    /// Create a positive test record
    #[must_use]
    pub fn positive(
        patient_id: impl Into<String>,
        infection: impl Into<String>,
        collection_date: NaiveDate,
    ) -> Self {
        Self::new(patient_id, infection, collection_date, "positive")
    }

    /// Whether the result exactly matches the positive marker
    #[must_use]
    pub fn is_positive(&self, marker: &str) -> bool {
        self.result == marker
    }
}

/// A patient's presence at a location on a calendar day
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransferRecord {
    /// Patient identifier
    pub patient_id: String,
    /// Ward, unit or room name
    pub location: String,
    /// Date of presence
    pub date: NaiveDate,
}

impl TransferRecord {
    /// Create a new transfer record
    #[must_use]
    pub fn new(patient_id: impl Into<String>, location: impl Into<String>, date: NaiveDate) -> Self {
        Self {
            patient_id: patient_id.into(),
            location: location.into(),
            date,
        }
    }
}

/// Raw microbiology row as read from a table
#[derive(Debug, Clone, Default, Deserialize, TableSchema)]
#[table(name = "microbiology")]
pub struct MicrobiologyRow {
    pub patient_id: Option<String>,
    pub infection: Option<String>,
    pub collection_date: Option<String>,
    pub result: Option<String>,
}

impl MicrobiologyRow {
    /// Convert into a typed record
    ///
    /// Every row must carry a parseable collection date. Patient and
    /// infection are only required on rows flagged positive, since no other
    /// row takes part in the analysis.
    pub fn into_record(
        self,
        row: usize,
        positive_marker: &str,
        formats: &DateFormatConfig,
    ) -> Result<MicrobiologyRecord> {
        let raw_date = self.collection_date.unwrap_or_default();
        let collection_date =
            parse_date_string(&raw_date, formats).ok_or_else(|| ClusterError::DateParse {
                table: "microbiology",
                row,
                column: "collection_date",
                value: raw_date.clone(),
            })?;

        let result = self.result.unwrap_or_default();
        let patient_id = clean_text(self.patient_id);
        let infection = clean_text(self.infection);

        if result == positive_marker {
            require_text("microbiology", row, "patient_id", &patient_id)?;
            require_text("microbiology", row, "infection", &infection)?;
        }

        Ok(MicrobiologyRecord {
            patient_id,
            infection,
            collection_date,
            result,
        })
    }
}

/// Raw transfer row as read from a table
#[derive(Debug, Clone, Default, Deserialize, TableSchema)]
#[table(name = "transfers")]
pub struct TransferRow {
    pub patient_id: Option<String>,
    pub location: Option<String>,
    pub date: Option<String>,
}

impl TransferRow {
    /// Convert into a typed record
    pub fn into_record(self, row: usize, formats: &DateFormatConfig) -> Result<TransferRecord> {
        let raw_date = self.date.unwrap_or_default();
        let date = parse_date_string(&raw_date, formats).ok_or_else(|| ClusterError::DateParse {
            table: "transfers",
            row,
            column: "date",
            value: raw_date.clone(),
        })?;

        let patient_id = clean_text(self.patient_id);
        let location = clean_text(self.location);
        require_text("transfers", row, "patient_id", &patient_id)?;
        require_text("transfers", row, "location", &location)?;

        Ok(TransferRecord {
            patient_id,
            location,
            date,
        })
    }
}

fn clean_text(value: Option<String>) -> String {
    value.map(|s| s.trim().to_string()).unwrap_or_default()
}

fn require_text(table: &'static str, row: usize, column: &'static str, value: &str) -> Result<()> {
    if value.is_empty() {
        return Err(ClusterError::InvalidValue {
            table,
            row,
            column,
            message: "value is missing".to_string(),
        });
    }
    Ok(())
}
