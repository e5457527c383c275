//! Synthetic hospital snapshots
//!
//! Generates seeded microbiology and transfer records for demos and tests.
//! The same configuration always yields the same dataset.

use chrono::NaiveDate;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::models::episode::shift_days;
use crate::models::records::{MicrobiologyRecord, TransferRecord};

/// Parameters of a synthetic dataset
#[derive(Debug, Clone)]
pub struct SyntheticConfig {
    pub seed: u64,
    pub patients: usize,
    pub wards: Vec<String>,
    pub pathogens: Vec<String>,
    /// First possible admission day
    pub start: NaiveDate,
    /// Admissions fall within this many days after `start`
    pub period_days: i64,
    /// Longest stay in days
    pub max_stay_days: i64,
    /// Chance that a patient changes ward on a given day
    pub move_probability: f64,
    /// Chance that a test comes back positive
    pub positivity_rate: f64,
    /// Most tests taken per patient
    pub max_tests_per_patient: usize,
}

impl Default for SyntheticConfig {
    fn default() -> Self {
        Self {
            seed: 42,
            patients: 60,
            wards: ["Ward-A", "Ward-B", "Ward-C", "ICU", "ER"]
                .iter()
                .map(|w| (*w).to_string())
                .collect(),
            pathogens: ["CRE", "MRSA", "VRE"]
                .iter()
                .map(|p| (*p).to_string())
                .collect(),
            start: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap_or_default(),
            period_days: 90,
            max_stay_days: 21,
            move_probability: 0.15,
            positivity_rate: 0.4,
            max_tests_per_patient: 3,
        }
    }
}

/// Generated records
#[derive(Debug, Clone, Default)]
pub struct SyntheticDataset {
    pub microbiology: Vec<MicrobiologyRecord>,
    pub transfers: Vec<TransferRecord>,
}

impl SyntheticDataset {
    /// Microbiology records as CSV with a header row
    #[must_use]
    pub fn microbiology_csv(&self) -> String {
        let mut csv = String::from("patient_id,infection,collection_date,result\n");
        for r in &self.microbiology {
            csv.push_str(&format!(
                "{},{},{},{}\n",
                r.patient_id, r.infection, r.collection_date, r.result
            ));
        }
        csv
    }

    /// Transfer records as CSV with a header row
    #[must_use]
    pub fn transfers_csv(&self) -> String {
        let mut csv = String::from("patient_id,location,date\n");
        for r in &self.transfers {
            csv.push_str(&format!("{},{},{}\n", r.patient_id, r.location, r.date));
        }
        csv
    }
}

fn pick<'a>(rng: &mut StdRng, items: &'a [String]) -> Option<&'a str> {
    if items.is_empty() {
        None
    } else {
        Some(items[rng.random_range(0..items.len())].as_str())
    }
}

/// Generate a dataset
///
/// Every patient has one stay with a daily transfer row per day, and a few
/// tests for one pathogen taken during the stay.
#[must_use]
pub fn generate_dataset(config: &SyntheticConfig) -> SyntheticDataset {
    let mut rng = StdRng::seed_from_u64(config.seed);
    let mut dataset = SyntheticDataset::default();

    for p in 0..config.patients {
        let patient_id = format!("P{:04}", p + 1);
        let admission = shift_days(config.start, rng.random_range(0..config.period_days.max(1)));
        let stay = rng.random_range(1..=config.max_stay_days.max(1));

        let Some(mut ward) = pick(&mut rng, &config.wards) else {
            continue;
        };
        for day in 0..stay {
            if day > 0 && rng.random_bool(config.move_probability.clamp(0.0, 1.0)) {
                ward = pick(&mut rng, &config.wards).unwrap_or(ward);
            }
            dataset.transfers.push(TransferRecord::new(
                patient_id.as_str(),
                ward,
                shift_days(admission, day),
            ));
        }

        let Some(pathogen) = pick(&mut rng, &config.pathogens) else {
            continue;
        };
        let tests = rng.random_range(1..=config.max_tests_per_patient.max(1));
        for _ in 0..tests {
            let day = rng.random_range(0..stay);
            let result = if rng.random_bool(config.positivity_rate.clamp(0.0, 1.0)) {
                "positive"
            } else {
                "negative"
            };
            dataset.microbiology.push(MicrobiologyRecord::new(
                patient_id.as_str(),
                pathogen,
                shift_days(admission, day),
                result,
            ));
        }
    }

    dataset
}
