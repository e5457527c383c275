//! Date parsing for collection and transfer dates.

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

/// Configuration for date format handling
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateFormatConfig {
    /// Date formats to try, in order
    pub date_formats: Vec<String>,
    /// Date-time formats to try when no date format matches; the time part is dropped
    pub datetime_formats: Vec<String>,
    /// Enable heuristic format detection
    pub enable_format_detection: bool,
}

impl Default for DateFormatConfig {
    fn default() -> Self {
        Self {
            date_formats: vec![
                "%Y-%m-%d".to_string(), // ISO format: 2023-01-15
                "%d-%m-%Y".to_string(), // European: 15-01-2023
                "%m/%d/%Y".to_string(), // US: 01/15/2023
                "%d.%m.%Y".to_string(), // Danish: 15.01.2023
                "%Y%m%d".to_string(),   // Compact: 20230115
            ],
            datetime_formats: vec![
                "%Y-%m-%dT%H:%M:%S".to_string(),
                "%Y-%m-%d %H:%M:%S".to_string(),
                "%Y-%m-%dT%H:%M".to_string(),
                "%Y-%m-%d %H:%M".to_string(),
            ],
            enable_format_detection: true,
        }
    }
}

/// Parse a date string with multiple format attempts
#[must_use]
pub fn parse_date_string(s: &str, config: &DateFormatConfig) -> Option<NaiveDate> {
    let s = s.trim();
    if s.is_empty() {
        return None;
    }

    for format in &config.date_formats {
        if let Ok(date) = NaiveDate::parse_from_str(s, format) {
            return Some(date);
        }
    }

    for format in &config.datetime_formats {
        if let Ok(datetime) = NaiveDateTime::parse_from_str(s, format) {
            return Some(datetime.date());
        }
    }

    if config.enable_format_detection {
        if let Some(detected_format) = detect_date_format(s) {
            if let Ok(date) = NaiveDate::parse_from_str(s, detected_format) {
                return Some(date);
            }
        }
    }

    None
}

/// Try to detect the date format based on string patterns
#[must_use]
pub fn detect_date_format(s: &str) -> Option<&'static str> {
    // YYYY/MM/DD or DD/MM/YYYY
    if s.contains('/') {
        let parts: Vec<&str> = s.split('/').collect();
        if parts.len() == 3 {
            if parts[0].len() == 4 {
                return Some("%Y/%m/%d");
            } else if parts[2].len() == 4 {
                return Some("%d/%m/%Y");
            }
        }
    }

    // YYYY.MM.DD
    if s.contains('.') {
        let parts: Vec<&str> = s.split('.').collect();
        if parts.len() == 3 && parts[0].len() == 4 {
            return Some("%Y.%m.%d");
        }
    }

    None
}
