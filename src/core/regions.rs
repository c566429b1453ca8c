//! Region list: the administrative table and the per-run work order.

use crate::domain::model::RegionLog;
use crate::utils::error::Result;
use rand::seq::SliceRandom;
use rand::Rng;
use std::collections::{HashMap, HashSet};

#[derive(Debug, Clone, PartialEq, Eq)]
struct RegionRow {
    code: String,
    name: String,
}

impl RegionRow {
    fn depth(&self) -> usize {
        self.code.split('.').count()
    }

    fn parent_code(&self) -> &str {
        self.code.split('.').next().unwrap_or_default()
    }
}

fn normalize_name(raw: &str) -> String {
    raw.trim().replacen("KAB.", "KABUPATEN", 1)
}

/// Builds `"{district}, PROVINSI {province}"` labels from a `code,name`
/// table.
///
/// Codes are dot-hierarchical: one segment is a province, two segments a
/// district. Deeper rows and rows with an empty name are ignored. A district
/// whose province row is absent is dropped.
pub fn parse_region_table(text: &str) -> Result<Vec<String>> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(text.as_bytes());

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record?;
        let code = record.get(0).unwrap_or_default().trim();
        let name = record.get(1).map(normalize_name).unwrap_or_default();
        if code.is_empty() || name.is_empty() {
            continue;
        }
        let row = RegionRow {
            code: code.to_string(),
            name,
        };
        if row.depth() <= 2 {
            rows.push(row);
        }
    }

    let provinces: HashMap<&str, &str> = rows
        .iter()
        .filter(|row| row.depth() == 1)
        .map(|row| (row.code.as_str(), row.name.as_str()))
        .collect();

    let labels = rows
        .iter()
        .filter(|row| row.depth() == 2)
        .filter_map(|row| match provinces.get(row.parent_code()) {
            Some(province) => Some(format!("{}, PROVINSI {}", row.name, province)),
            None => {
                tracing::warn!("No province row for district {} ({})", row.name, row.code);
                None
            }
        })
        .collect();

    Ok(labels)
}

/// Regions not yet in `log`, each at most once, uniformly shuffled.
pub fn pending_regions<R: Rng + ?Sized>(
    all: Vec<String>,
    log: &RegionLog,
    rng: &mut R,
) -> Vec<String> {
    let done: HashSet<&str> = log.iter().map(String::as_str).collect();
    let mut seen = HashSet::new();
    let mut pending: Vec<String> = all
        .into_iter()
        .filter(|region| !done.contains(region.as_str()))
        .filter(|region| seen.insert(region.clone()))
        .collect();
    pending.shuffle(rng);
    pending
}

/// Keeps regions whose label contains `filter` (case-insensitive), then caps
/// the list at `limit`.
pub fn narrow(regions: Vec<String>, filter: Option<&str>, limit: Option<usize>) -> Vec<String> {
    let needle = filter.map(str::to_lowercase);
    regions
        .into_iter()
        .filter(|region| match &needle {
            Some(needle) => region.to_lowercase().contains(needle.as_str()),
            None => true,
        })
        .take(limit.unwrap_or(usize::MAX))
        .collect()
}
