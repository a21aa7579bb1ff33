//! Recovery-query reconstruction: mapping failed targets back onto the
//! subset of the original request that still needs retrieving.

use std::collections::{BTreeMap, BTreeSet};

use goes_types::{DayKey, Request, TimeRange};

/// One failed target: a local archive path or a remote filename, either way
/// carrying an embedded `YYYYJJJHHMM` timestamp.
#[derive(Debug, Clone)]
pub struct FailedTarget {
    /// The filename (basename only) the timestamp was extracted from.
    pub filename: String,
}

/// Extracts the day and minute-of-day encoded in a GOES filename, from either
/// the local `-s` marker or the remote `_s` marker.
fn extract_day_and_minute(filename: &str) -> Option<(DayKey, u16)> {
    let marker_pos = filename.find("_s").or_else(|| filename.find("-s"))?;
    let digits = filename.get(marker_pos + 2..marker_pos + 13)?;
    if digits.len() != 11 || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let day = DayKey::parse_jjj(&digits[0..7]).ok()?;
    let hour: u16 = digits[7..9].parse().ok()?;
    let minute: u16 = digits[9..11].parse().ok()?;
    Some((day, hour * 60 + minute))
}

/// Expands one `original_request.fechas` key (`YYYYMMDD` or
/// `YYYYMMDD-YYYYMMDD`) into the day keys it covers, mirroring the
/// normalizer's own expansion but tolerant of malformed keys (returns an
/// empty list rather than failing: a recovery query is built best-effort from
/// whatever targets actually failed).
fn expand_original_key(key: &str) -> Vec<DayKey> {
    let parse_range = |start_s: &str, end_s: &str| -> Option<Vec<DayKey>> {
        let start = DayKey::parse_ymd(start_s).ok()?;
        let end = DayKey::parse_ymd(end_s).ok()?;
        let mut days = vec![start];
        let mut current = start;
        while current != end {
            current = current.succ()?;
            days.push(current);
            if days.len() > 366 * 10 {
                return None;
            }
        }
        Some(days)
    };

    if let Some((start_s, end_s)) = key.split_once('-') {
        parse_range(start_s, end_s).unwrap_or_default()
    } else {
        DayKey::parse_ymd(key).map(|d| vec![d]).unwrap_or_default()
    }
}

/// Finds the original `fechas` key that covers `day`, and within its list of
/// time-range strings, the one that covers `minute_of_day`.
fn locate_original_range<'a>(
    original_fechas: &'a BTreeMap<String, Vec<String>>,
    day: DayKey,
    minute_of_day: u16,
) -> Option<(&'a str, &'a str)> {
    for (key, ranges) in original_fechas {
        if !expand_original_key(key).contains(&day) {
            continue;
        }
        for range_str in ranges {
            if let Ok(range) = TimeRange::parse(range_str) {
                if range.contains_minute(minute_of_day) {
                    return Some((key.as_str(), range_str.as_str()));
                }
            }
        }
    }
    None
}

/// Builds the recovery request for a set of failed targets, or `None` if
/// `failed` is empty.
///
/// The result is `original_request` with `creado_por` cleared, `descripcion`
/// set, and `fechas` replaced by only the date keys and time ranges that
/// cover a failed target, deduplicated.
#[must_use]
pub fn build_recovery_request(
    original_request: &Request,
    failed: &[FailedTarget],
) -> Option<Request> {
    if failed.is_empty() {
        return None;
    }

    let mut recovery: BTreeMap<String, BTreeSet<String>> = BTreeMap::new();
    for target in failed {
        let Some((day, minute)) = extract_day_and_minute(&target.filename) else {
            continue;
        };
        if let Some((key, range_str)) =
            locate_original_range(&original_request.fechas, day, minute)
        {
            recovery
                .entry(key.to_string())
                .or_default()
                .insert(range_str.to_string());
        }
    }

    if recovery.is_empty() {
        return None;
    }

    let fechas = recovery
        .into_iter()
        .map(|(k, v)| (k, v.into_iter().collect()))
        .collect();

    let mut recovered = original_request.clone();
    recovered.fechas = fechas;
    let failed_count = failed.len();
    Some(recovered.into_recovery_payload(format!(
        "Consulta de recuperacion para {failed_count} objetivo(s) no obtenido(s)"
    )))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    fn base_request(fechas: BTreeMap<String, Vec<String>>) -> Request {
        Request {
            sat: None,
            sensor: None,
            nivel: None,
            dominio: "fd".to_string(),
            productos: None,
            bandas: Some(vec!["ALL".to_string()]),
            fechas,
            creado_por: Some("tester".to_string()),
            descripcion: None,
        }
    }

    #[test]
    fn no_failures_yields_no_recovery_request() {
        assert!(build_recovery_request(&base_request(BTreeMap::new()), &[]).is_none());
    }

    #[test]
    fn maps_failed_filename_back_to_original_range() {
        let mut fechas = BTreeMap::new();
        fechas.insert("20231026".to_string(), vec!["12:00-12:10".to_string()]);
        let request = base_request(fechas);

        let failed = vec![FailedTarget {
            filename: "ABI-L1b-RadF-M6_G16-s20232991205217_e20232991209594.nc".to_string(),
        }];

        let recovery = build_recovery_request(&request, &failed).unwrap();
        assert!(recovery.creado_por.is_none());
        assert!(recovery.descripcion.is_some());
        assert_eq!(
            recovery.fechas.get("20231026").unwrap(),
            &vec!["12:00-12:10".to_string()]
        );
    }

    #[test]
    fn ignores_targets_outside_any_requested_range() {
        let mut fechas = BTreeMap::new();
        fechas.insert("20231026".to_string(), vec!["09:00-09:05".to_string()]);
        let request = base_request(fechas);

        let failed = vec![FailedTarget {
            filename: "ABI-L1b-RadF-M6_G16-s20232991200217_e20232991209594.nc".to_string(),
        }];

        assert!(build_recovery_request(&request, &failed).is_none());
    }

    #[test]
    fn deduplicates_repeated_ranges() {
        let mut fechas = BTreeMap::new();
        fechas.insert("20231026".to_string(), vec!["12:00-12:59".to_string()]);
        let request = base_request(fechas);

        let failed = vec![
            FailedTarget {
                filename: "ABI-L1b-RadF-M6_G16-s20232991205217_e20232991209594.nc".to_string(),
            },
            FailedTarget {
                filename: "ABI-L1b-RadF-M6_G16-s20232991210217_e20232991219594.nc".to_string(),
            },
        ];

        let recovery = build_recovery_request(&request, &failed).unwrap();
        assert_eq!(recovery.fechas.get("20231026").unwrap().len(), 1);
    }
}
