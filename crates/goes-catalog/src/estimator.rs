//! File-count and size estimation, driving the acceptance gate.

use goes_types::{CanonicalQuery, Level, Selection, TimeRange};

/// Result of estimating how many files a canonical query would retrieve.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EstimateSummary {
    /// Estimated number of files.
    pub file_count: u64,
    /// Estimated total size, in megabytes.
    pub total_size_mb: f64,
    /// Estimated average size per file, in megabytes (0 when `file_count` is 0).
    pub average_file_size_mb: f64,
    /// Estimated total size, in gigabytes.
    pub total_size_gb: f64,
}

impl EstimateSummary {
    fn new(file_count: u64, total_size_mb: f64) -> Self {
        let average_file_size_mb = if file_count == 0 {
            0.0
        } else {
            total_size_mb / file_count as f64
        };
        Self {
            file_count,
            total_size_mb,
            average_file_size_mb,
            total_size_gb: total_size_mb / 1024.0,
        }
    }
}

/// Nominal cadence, in minutes, between successive observations.
///
/// A fuller periodicity table could key this by `(level, domain, item)`; this
/// workspace carries only the documented per-level/domain defaults, since no
/// per-item overrides are in scope. Adding overrides later means adding
/// entries here, not changing callers.
#[must_use]
pub const fn periodicity_minutes(level: Level, domain_is_conus: bool) -> u32 {
    match (level, domain_is_conus) {
        (Level::L1b, false) => 10,
        (Level::L1b, true) => 5,
        (Level::L2, false) => 20,
        (Level::L2, true) => 5,
    }
}

/// Nominal file size, in megabytes.
#[must_use]
pub const fn weight_mb(level: Level, domain_is_conus: bool) -> f64 {
    match (level, domain_is_conus) {
        (Level::L1b, false) => 14.0,
        (Level::L1b, true) => 2.5,
        (Level::L2, false) => 20.0,
        (Level::L2, true) => 10.0,
    }
}

/// Counts the minutes in `[range.start, range.end]` for which an observation is
/// produced, given `periodicity` (full disk) or the fixed CONUS cadence.
fn matching_minute_count(range: TimeRange, periodicity: u32, is_conus: bool) -> u64 {
    (range.start_minute()..=range.end_minute())
        .filter(|&m| {
            if is_conus {
                matches!(u32::from(m) % 10, 1 | 6)
            } else {
                u32::from(m) % periodicity == 0
            }
        })
        .count() as u64
}

/// Number of distinct "items" a query iterates over for estimation purposes: bands
/// for L1b, products for L2 (with a CMIP-family special case that fans out to one
/// item per requested band).
fn item_count(query: &CanonicalQuery, full_band_set: &[String]) -> u64 {
    match query.level {
        Level::L1b => match &query.bands {
            Selection::All => full_band_set.len() as u64,
            Selection::Specific(b) => b.len() as u64,
        },
        Level::L2 => {
            let products: &[String] = match &query.products {
                Selection::All => &[],
                Selection::Specific(p) => p,
            };
            if query.products.is_all() {
                // ALL products: every non-CMI product once, plus one CMIP item per band.
                return 1 + bands_len(query, full_band_set);
            }
            products
                .iter()
                .map(|p| {
                    if p.eq_ignore_ascii_case("CMIP") {
                        bands_len(query, full_band_set)
                    } else {
                        1
                    }
                })
                .sum()
        }
    }
}

fn bands_len(query: &CanonicalQuery, full_band_set: &[String]) -> u64 {
    match &query.bands {
        Selection::All => full_band_set.len() as u64,
        Selection::Specific(b) if b.is_empty() => full_band_set.len() as u64,
        Selection::Specific(b) => b.len() as u64,
    }
}

/// Estimates the number of files and total size a canonical query would retrieve.
///
/// `full_band_set` is the catalog's complete band list, used to resolve the
/// CMIP-with-all-bands special case and the "requested all bands" equivalence.
#[must_use]
pub fn estimate_files_summary(query: &CanonicalQuery, full_band_set: &[String]) -> EstimateSummary {
    let is_conus = matches!(query.domain, goes_types::Domain::Conus);
    let periodicity = periodicity_minutes(query.level, is_conus);
    let weight = weight_mb(query.level, is_conus);
    let items = item_count(query, full_band_set);

    let mut minute_matches: u64 = 0;
    for ranges in query.fechas.values() {
        for range in ranges {
            minute_matches += matching_minute_count(*range, periodicity, is_conus);
        }
    }

    let file_count = minute_matches * items;
    let total_size_mb = file_count as f64 * weight;
    EstimateSummary::new(file_count, total_size_mb)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    fn full_bands() -> Vec<String> {
        (1..=16).map(|n| format!("{n:02}")).collect()
    }

    fn query_with(
        level: Level,
        domain: goes_types::Domain,
        products: Selection,
        bands: Selection,
        fechas: BTreeMap<String, Vec<TimeRange>>,
    ) -> CanonicalQuery {
        CanonicalQuery {
            satellite: goes_types::Satellite::Goes16,
            sensor: goes_types::Sensor::Abi,
            level,
            domain,
            products,
            bands,
            fechas,
            total_horas: 0.0,
            total_fechas_expandidas: 0,
            original_request: goes_types::Request {
                sat: None,
                sensor: None,
                nivel: None,
                dominio: "fd".into(),
                productos: None,
                bandas: None,
                fechas: BTreeMap::new(),
                creado_por: None,
                descripcion: None,
            },
            creado_por: None,
        }
    }

    #[test]
    fn zero_minute_range_yields_zero_files() {
        let fechas = BTreeMap::new();
        let q = query_with(
            Level::L1b,
            goes_types::Domain::FullDisk,
            Selection::Specific(vec![]),
            Selection::Specific(vec!["13".into()]),
            fechas,
        );
        let est = estimate_files_summary(&q, &full_bands());
        assert_eq!(est.file_count, 0);
        assert_eq!(est.average_file_size_mb, 0.0);
    }

    #[test]
    fn fd_l1b_single_band_single_minute() {
        let mut fechas = BTreeMap::new();
        // 12:00 = minute 720, which is a multiple of 10 -> one observation.
        fechas.insert(
            "2023299".to_string(),
            vec![TimeRange::new(720, 720).unwrap()],
        );
        let q = query_with(
            Level::L1b,
            goes_types::Domain::FullDisk,
            Selection::Specific(vec![]),
            Selection::Specific(vec!["13".into()]),
            fechas,
        );
        let est = estimate_files_summary(&q, &full_bands());
        assert_eq!(est.file_count, 1);
        assert!((est.total_size_mb - 14.0).abs() < f64::EPSILON);
    }

    #[test]
    fn conus_matches_minutes_1_and_6_mod_10() {
        let mut fechas = BTreeMap::new();
        fechas.insert(
            "2023299".to_string(),
            vec![TimeRange::new(0, 19).unwrap()],
        );
        let q = query_with(
            Level::L1b,
            goes_types::Domain::Conus,
            Selection::Specific(vec![]),
            Selection::Specific(vec!["13".into()]),
            fechas,
        );
        let est = estimate_files_summary(&q, &full_bands());
        // Minutes 1, 6, 11, 16 match within [0,19].
        assert_eq!(est.file_count, 4);
    }

    #[test]
    fn cmip_with_all_bands_expands_to_sixteen_items() {
        let mut fechas = BTreeMap::new();
        fechas.insert(
            "2023299".to_string(),
            vec![TimeRange::new(0, 19).unwrap()],
        );
        let q = query_with(
            Level::L2,
            goes_types::Domain::FullDisk,
            Selection::Specific(vec!["CMIP".into()]),
            Selection::All,
            fechas,
        );
        // periodicity 20 for L2/FD: minute 0 and 20 match within [0,19] -> only minute 0.
        let est = estimate_files_summary(&q, &full_bands());
        assert_eq!(est.file_count, 16); // 1 matching minute * 16 band-items
    }
}
