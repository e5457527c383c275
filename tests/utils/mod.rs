use std::collections::{BTreeMap, BTreeSet};
use std::io::Write;
use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use infection_clusters::{ContactEdge, InfectionEpisode, MicrobiologyRecord, TransferRecord};

/// Date in 2024
#[must_use]
pub fn d(month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, month, day).unwrap()
}

/// Date a number of days after 2024-01-01
#[must_use]
pub fn day(offset: i64) -> NaiveDate {
    d(1, 1) + chrono::TimeDelta::days(offset)
}

#[must_use]
pub fn positive(patient: &str, infection: &str, date: NaiveDate) -> MicrobiologyRecord {
    MicrobiologyRecord::positive(patient, infection, date)
}

#[must_use]
pub fn negative(patient: &str, infection: &str, date: NaiveDate) -> MicrobiologyRecord {
    MicrobiologyRecord::new(patient, infection, date, "negative")
}

#[must_use]
pub fn at(patient: &str, location: &str, date: NaiveDate) -> TransferRecord {
    TransferRecord::new(patient, location, date)
}

/// Write a file into `dir` and return its path
pub fn write_file(dir: &Path, name: &str, content: &[u8]) -> PathBuf {
    let path = dir.join(name);
    let mut file = std::fs::File::create(&path).unwrap();
    file.write_all(content).unwrap();
    path
}

/// Connected components of the contact graph by breadth-first search,
/// restricted to one pathogen per component and keeping only components of
/// two or more episodes
#[must_use]
pub fn brute_force_components(
    episodes: &[InfectionEpisode],
    edges: &[ContactEdge],
) -> BTreeSet<Vec<String>> {
    let pathogen: BTreeMap<&str, &str> = episodes
        .iter()
        .map(|e| (e.episode_id.as_str(), e.infection_type.as_str()))
        .collect();

    let mut adjacency: BTreeMap<&str, BTreeSet<&str>> = BTreeMap::new();
    for edge in edges {
        let (a, b) = (edge.episode_a.as_str(), edge.episode_b.as_str());
        if pathogen.get(a).is_some() && pathogen.get(a) == pathogen.get(b) {
            adjacency.entry(a).or_default().insert(b);
            adjacency.entry(b).or_default().insert(a);
        }
    }

    let mut seen: BTreeSet<&str> = BTreeSet::new();
    let mut components = BTreeSet::new();
    for episode in episodes {
        let start = episode.episode_id.as_str();
        if !seen.insert(start) {
            continue;
        }
        let mut component = vec![start.to_string()];
        let mut queue = vec![start];
        while let Some(node) = queue.pop() {
            for &next in adjacency.get(node).into_iter().flatten() {
                if seen.insert(next) {
                    component.push(next.to_string());
                    queue.push(next);
                }
            }
        }
        if component.len() >= 2 {
            component.sort();
            components.insert(component);
        }
    }
    components
}
