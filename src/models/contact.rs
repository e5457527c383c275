//! Contact edge model

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Kind of co-location evidence behind a contact
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ContactType {
    /// Both patients were at the same location on the same day
    #[serde(rename = "same location, same day")]
    SameLocationSameDay,
}

impl ContactType {
    /// Get the label used in summaries and reports
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::SameLocationSameDay => "same location, same day",
        }
    }
}

impl fmt::Display for ContactType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// Weight given to each contact event
pub const DEFAULT_CONTACT_WEIGHT: f64 = 1.0;

/// Spatiotemporal co-location of two episodes of the same pathogen
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContactEdge {
    /// Episode encountered first in the presence bucket
    pub episode_a: String,
    /// Episode encountered second
    pub episode_b: String,
    /// Day of co-presence
    pub contact_date: NaiveDate,
    /// Shared location
    pub location: String,
    /// Kind of contact
    pub contact_type: ContactType,
    /// Edge weight
    pub weight: f64,
    /// Positions of both episodes in the list the edge was detected from
    #[serde(skip)]
    pub episode_indices: Option<(usize, usize)>,
}

impl ContactEdge {
    /// Create a same-location, same-day contact with the default weight
    #[must_use]
    pub fn same_location_same_day(
        episode_a: impl Into<String>,
        episode_b: impl Into<String>,
        contact_date: NaiveDate,
        location: impl Into<String>,
    ) -> Self {
        Self {
            episode_a: episode_a.into(),
            episode_b: episode_b.into(),
            contact_date,
            location: location.into(),
            contact_type: ContactType::SameLocationSameDay,
            weight: DEFAULT_CONTACT_WEIGHT,
            episode_indices: None,
        }
    }

    /// Record where both endpoints sit in the episode list
    #[must_use]
    pub fn at_indices(mut self, a: usize, b: usize) -> Self {
        self.episode_indices = Some((a, b));
        self
    }
}
