//! Local archive discovery, timestamp filtering, and resume scanning.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use goes_types::{CanonicalQuery, DayKey};

use crate::error::LocalDiscoverError;
use crate::path::{archive_dir, archive_glob_pattern};

/// The 11-character embedded timestamp `YYYYJJJHHMM` found after a filename's first
/// `-s` marker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
struct EmbeddedTimestamp {
    day_key: [u8; 7],
    hour: u8,
}

impl EmbeddedTimestamp {
    fn day_key_str(&self) -> String {
        String::from_utf8_lossy(&self.day_key).into_owned()
    }
}

/// Extracts the embedded `YYYYJJJHHMM` timestamp from a local archive filename, using
/// the 11 characters immediately following the first `-s` substring.
///
/// Returns `None` for names that don't contain `-s` or whose following characters
/// aren't 11 ASCII digits.
fn extract_timestamp(path: &Path) -> Option<EmbeddedTimestamp> {
    let name = path.file_name()?.to_str()?;
    let marker = name.find("-s")?;
    let digits = name.get(marker + 2..marker + 13)?;
    if digits.len() != 11 || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let mut day_key = [0u8; 7];
    day_key.copy_from_slice(&digits.as_bytes()[0..7]);
    let hour: u8 = digits[7..9].parse().ok()?;
    Some(EmbeddedTimestamp { day_key, hour })
}

/// Finds every local archive matching `query`, filtered to the requested day keys and
/// widened to whole-hour windows of the requested time ranges.
///
/// Invalid archive names are silently skipped. The result is deduplicated by path
/// identity and sorted.
///
/// # Errors
///
/// Returns a [`LocalDiscoverError`] if a day key cannot be parsed or a week
/// directory cannot be read.
pub fn discover_and_filter(
    query: &CanonicalQuery,
    root: &Path,
) -> Result<Vec<PathBuf>, LocalDiscoverError> {
    let mut found = BTreeSet::new();

    for (day_key, ranges) in &query.fechas {
        let day = DayKey::parse_jjj(day_key)?;
        let dir = archive_dir(root, query, &day);
        if !dir.exists() {
            continue;
        }
        let pattern = archive_glob_pattern(&dir, &day);
        let entries = glob::glob(&pattern).map_err(|e| LocalDiscoverError::Glob(e.to_string()))?;

        for entry in entries {
            let Ok(path) = entry else { continue };
            let Some(ts) = extract_timestamp(&path) else {
                continue;
            };
            if ts.day_key_str() != *day_key {
                continue;
            }
            if ranges.iter().any(|r| r.contains_hour(ts.hour)) {
                found.insert(path);
            }
        }
    }

    Ok(found.into_iter().collect())
}

/// Filters `candidates` down to those not yet represented in `dest` by embedded
/// timestamp, for resuming an interrupted query.
///
/// Candidates whose own timestamp can't be parsed are always kept (conservative:
/// process again rather than silently drop).
///
/// # Errors
///
/// Returns a [`LocalDiscoverError`] if `dest` exists but cannot be read.
pub fn scan_existing(
    candidates: Vec<PathBuf>,
    dest: &Path,
) -> Result<Vec<PathBuf>, LocalDiscoverError> {
    if !dest.exists() {
        return Ok(candidates);
    }

    let mut existing = BTreeSet::new();
    let entries = std::fs::read_dir(dest).map_err(|e| LocalDiscoverError::ReadDir {
        path: dest.to_path_buf(),
        source: e,
    })?;
    for entry in entries {
        let entry = entry.map_err(|e| LocalDiscoverError::ReadDir {
            path: dest.to_path_buf(),
            source: e,
        })?;
        if let Some(ts) = extract_timestamp(&entry.path()) {
            existing.insert(ts);
        }
    }

    Ok(candidates
        .into_iter()
        .filter(|c| extract_timestamp(c).is_none_or(|ts| !existing.contains(&ts)))
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use goes_types::{Domain, Level, Request, Satellite, Selection, Sensor, TimeRange};
    use std::collections::BTreeMap;
    use tempfile::TempDir;

    fn query_with_range(day_key: &str, range: &str) -> CanonicalQuery {
        let mut fechas = BTreeMap::new();
        fechas.insert(day_key.to_string(), vec![TimeRange::parse(range).unwrap()]);
        CanonicalQuery {
            satellite: Satellite::Goes16,
            sensor: Sensor::Abi,
            level: Level::L1b,
            domain: Domain::FullDisk,
            products: Selection::Specific(vec![]),
            bands: Selection::Specific(vec!["13".into()]),
            fechas,
            total_horas: 0.0,
            total_fechas_expandidas: 1,
            original_request: Request {
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
    fn extracts_valid_timestamp() {
        let path = Path::new("ABI-L1b-RadF-M6_G16-s20232991200.tgz");
        let ts = extract_timestamp(path).unwrap();
        assert_eq!(ts.day_key_str(), "2023299");
        assert_eq!(ts.hour, 12);
    }

    #[test]
    fn rejects_name_without_marker() {
        assert!(extract_timestamp(Path::new("no-timestamp-here.tgz")).is_none());
    }

    #[test]
    fn discover_finds_archive_within_hour_window() {
        let dir = TempDir::new().unwrap();
        let query = query_with_range("2023299", "12:00-12:05");
        let week_dir = archive_dir(dir.path(), &query, &DayKey::parse_jjj("2023299").unwrap());
        std::fs::create_dir_all(&week_dir).unwrap();
        let archive = week_dir.join("ABI-L1b-RadF-M6_G16-s20232991200.tgz");
        std::fs::write(&archive, b"fake").unwrap();

        let found = discover_and_filter(&query, dir.path()).unwrap();
        assert_eq!(found, vec![archive]);
    }

    #[test]
    fn discover_skips_archives_outside_hour_window() {
        let dir = TempDir::new().unwrap();
        let query = query_with_range("2023299", "09:00-09:05");
        let week_dir = archive_dir(dir.path(), &query, &DayKey::parse_jjj("2023299").unwrap());
        std::fs::create_dir_all(&week_dir).unwrap();
        std::fs::write(
            week_dir.join("ABI-L1b-RadF-M6_G16-s20232991200.tgz"),
            b"fake",
        )
        .unwrap();

        let found = discover_and_filter(&query, dir.path()).unwrap();
        assert!(found.is_empty());
    }

    #[test]
    fn scan_existing_drops_already_present_timestamp() {
        let dest = TempDir::new().unwrap();
        std::fs::write(
            dest.path().join("ABI-L1b-RadF-M6_G16-s20232991200.tgz"),
            b"done",
        )
        .unwrap();

        let candidates = vec![
            PathBuf::from("/src/ABI-L1b-RadF-M6_G16-s20232991200.tgz"),
            PathBuf::from("/src/ABI-L1b-RadF-M6_G16-s20232991300.tgz"),
        ];
        let pending = scan_existing(candidates, dest.path()).unwrap();
        assert_eq!(pending.len(), 1);
        assert!(pending[0].to_string_lossy().ends_with("1300.tgz"));
    }

    #[test]
    fn scan_existing_keeps_unparseable_candidates() {
        let dest = TempDir::new().unwrap();
        let candidates = vec![PathBuf::from("/src/unparseable.tgz")];
        let pending = scan_existing(candidates, dest.path()).unwrap();
        assert_eq!(pending.len(), 1);
    }
}
