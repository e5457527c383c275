//! Infection episode model
//!
//! An episode is one continuous infectious period of one patient with one
//! pathogen. Its window is the span of its positive tests widened by the
//! infectious buffer on both sides.

use chrono::{NaiveDate, TimeDelta};
use serde::{Deserialize, Serialize};

use crate::models::records::MicrobiologyRecord;

/// Inclusive calendar date range
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DateWindow {
    /// First day (inclusive)
    pub start: NaiveDate,
    /// Last day (inclusive)
    pub end: NaiveDate,
}

impl DateWindow {
    /// Create a window, swapping the bounds if given in reverse order
    #[must_use]
    pub fn new(start: NaiveDate, end: NaiveDate) -> Self {
        if start <= end {
            Self { start, end }
        } else {
            Self {
                start: end,
                end: start,
            }
        }
    }

    /// Whether `date` lies within the window
    #[must_use]
    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }

    /// Windows overlap unless one ends before the other starts; shared boundary days overlap
    #[must_use]
    pub fn overlaps_with(&self, other: &Self) -> bool {
        !(self.end < other.start || other.end < self.start)
    }

    /// Number of days between start and end
    #[must_use]
    pub fn duration_days(&self) -> i64 {
        (self.end - self.start).num_days()
    }

    /// Smallest window covering both
    #[must_use]
    pub fn union(&self, other: &Self) -> Self {
        Self {
            start: self.start.min(other.start),
            end: self.end.max(other.end),
        }
    }
}

/// Shift a date by a signed number of days, saturating at the representable range
#[must_use]
pub fn shift_days(date: NaiveDate, days: i64) -> NaiveDate {
    TimeDelta::try_days(days)
        .and_then(|delta| date.checked_add_signed(delta))
        .unwrap_or(if days < 0 { NaiveDate::MIN } else { NaiveDate::MAX })
}

/// Build the identifier of an episode: `{patient}_{pathogen}_EP{sequence:03}`
#[must_use]
pub fn episode_id(patient_id: &str, infection_type: &str, sequence: u32) -> String {
    format!("{patient_id}_{infection_type}_EP{sequence:03}")
}

/// One continuous infectious period for one patient and pathogen
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InfectionEpisode {
    /// Unique episode identifier
    pub episode_id: String,
    /// Patient identifier
    pub patient_id: String,
    /// Pathogen / infection label
    pub infection_type: String,
    /// 1-based sequence number per patient and pathogen
    pub sequence: u32,
    /// Buffered infectious window
    pub window: DateWindow,
    /// Contributing positive tests, ordered by collection date
    pub tests: Vec<MicrobiologyRecord>,
}

impl InfectionEpisode {
    /// Build an episode from its (date-ordered, non-empty) positive tests
    ///
    /// Returns `None` when `tests` is empty.
    #[must_use]
    pub fn from_tests(
        patient_id: &str,
        infection_type: &str,
        sequence: u32,
        tests: Vec<MicrobiologyRecord>,
        buffer_days: i64,
    ) -> Option<Self> {
        let first = tests.iter().map(|t| t.collection_date).min()?;
        let last = tests.iter().map(|t| t.collection_date).max()?;

        Some(Self {
            episode_id: episode_id(patient_id, infection_type, sequence),
            patient_id: patient_id.to_string(),
            infection_type: infection_type.to_string(),
            sequence,
            window: DateWindow::new(shift_days(first, -buffer_days), shift_days(last, buffer_days)),
            tests,
        })
    }

    /// Start of the infectious window
    #[must_use]
    pub fn episode_start(&self) -> NaiveDate {
        self.window.start
    }

    /// End of the infectious window
    #[must_use]
    pub fn episode_end(&self) -> NaiveDate {
        self.window.end
    }

    /// Number of contributing positive tests
    #[must_use]
    pub fn test_count(&self) -> usize {
        self.tests.len()
    }

    /// Collection date of the first contributing test
    #[must_use]
    pub fn first_test_date(&self) -> Option<NaiveDate> {
        self.tests.first().map(|t| t.collection_date)
    }

    /// Collection date of the last contributing test
    #[must_use]
    pub fn last_test_date(&self) -> Option<NaiveDate> {
        self.tests.last().map(|t| t.collection_date)
    }

    /// Whether the two episodes' infectious windows overlap
    #[must_use]
    pub fn overlaps_with(&self, other: &Self) -> bool {
        self.window.overlaps_with(&other.window)
    }

    /// Whether the patient is considered infectious on `date`
    #[must_use]
    pub fn is_active_on(&self, date: NaiveDate) -> bool {
        self.window.contains(date)
    }
}
