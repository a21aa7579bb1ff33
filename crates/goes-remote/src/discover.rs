//! Remote object discovery: enumerating and filtering `.nc` objects per query.

use std::collections::{BTreeSet, HashMap};

use goes_types::{CanonicalQuery, DayKey, Selection, TimeRange};

use crate::bucket::product_path;
use crate::config::RemoteConfig;
use crate::error::RemoteDiscoverError;

/// One remote product path to enumerate, with the band filter (if any) that applies
/// to objects found under it.
///
/// `bands = None` means band filtering does not apply (non-CMI L2 products); `bands
/// = Some(list)` filters objects to those whose name contains `C<band>` for some
/// band in `list`.
#[derive(Debug, Clone)]
pub struct DiscoverTarget {
    /// The remote product path, e.g. `ABI-L2-CMIPC`.
    pub product_path: String,
    /// The band filter, if this product depends on band.
    pub bands: Option<Vec<String>>,
}

/// Builds the single discovery target for an L1b query (bands always apply).
#[must_use]
pub fn l1b_target(query: &CanonicalQuery) -> DiscoverTarget {
    DiscoverTarget {
        product_path: product_path(query, None),
        bands: Some(query.bands.as_slice().to_vec()),
    }
}

/// Builds one discovery target per requested L2 product, splitting CMI-family
/// products (which depend on band) from the rest (which don't).
#[must_use]
pub fn l2_targets(query: &CanonicalQuery, full_products: &[String]) -> Vec<DiscoverTarget> {
    let products: Vec<String> = match &query.products {
        Selection::All => full_products.to_vec(),
        Selection::Specific(v) => v.clone(),
    };
    products
        .into_iter()
        .map(|product| {
            let bands = product
                .starts_with("CMI")
                .then(|| query.bands.as_slice().to_vec());
            DiscoverTarget {
                product_path: product_path(query, Some(&product)),
                bands,
            }
        })
        .collect()
}

struct RemoteTimestamp {
    day_key: String,
    minute_of_day: u16,
}

/// Extracts the embedded start timestamp between `_s` and `_e` in a remote
/// filename; the first 11 characters are `YYYYJJJHHMM`.
fn extract_timestamp(filename: &str) -> Option<RemoteTimestamp> {
    let start = filename.find("_s")? + 2;
    let end = filename.find("_e")?;
    let ts = filename.get(start..end)?;
    if ts.len() < 11 || !ts.as_bytes()[..11].iter().all(u8::is_ascii_digit) {
        return None;
    }
    let day_key = ts[0..7].to_string();
    let hour: u16 = ts[7..9].parse().ok()?;
    let minute: u16 = ts[9..11].parse().ok()?;
    Some(RemoteTimestamp {
        day_key,
        minute_of_day: hour * 60 + minute,
    })
}

fn hours_in_ranges(ranges: &[TimeRange]) -> BTreeSet<u8> {
    ranges
        .iter()
        .flat_map(|r| r.start_hour()..=r.end_hour())
        .collect()
}

/// Lists the objects under `bucket`/`prefix`, retrying transient failures with
/// exponential backoff. Returns an empty list (not an error) for a genuinely
/// missing directory; returns `Err` only after exhausting retries on a transient
/// failure, which the caller treats as "skip this hour", per
/// `TransientRemoteError` semantics.
async fn list_prefix(
    client: &aws_sdk_s3::Client,
    bucket: &str,
    prefix: &str,
    config: &RemoteConfig,
) -> Result<Vec<String>, String> {
    let mut attempt = 0u32;
    loop {
        match client
            .list_objects_v2()
            .bucket(bucket)
            .prefix(prefix)
            .send()
            .await
        {
            Ok(output) => {
                let keys = output
                    .contents()
                    .iter()
                    .filter_map(|obj| obj.key().map(str::to_string))
                    .collect();
                return Ok(keys);
            }
            Err(err) => {
                attempt += 1;
                if attempt >= config.retry_attempts {
                    return Err(err.to_string());
                }
                tokio::time::sleep(config.backoff_delay(attempt)).await;
            }
        }
    }
}

/// Discovers remote objects matching `query` under each of `targets`, filtered by
/// band (when applicable) and by the embedded minute timestamp against the
/// query's requested time ranges.
///
/// Missing directories and listing failures after retries are logged and skipped;
/// discovery never fails the whole query over one hour's listing.
///
/// # Errors
///
/// Returns a [`RemoteDiscoverError`] only if the bucket name itself cannot be
/// resolved (the query has no usable day keys).
pub async fn discover(
    client: &aws_sdk_s3::Client,
    bucket: &str,
    query: &CanonicalQuery,
    targets: &[DiscoverTarget],
    config: &RemoteConfig,
) -> HashMap<String, String> {
    let mut results = HashMap::new();

    for (day_key, ranges) in &query.fechas {
        let Ok(day) = DayKey::parse_jjj(day_key) else {
            continue;
        };
        for hour in hours_in_ranges(ranges) {
            for target in targets {
                let prefix = format!(
                    "{}/{:04}/{:03}/{:02}/",
                    target.product_path,
                    day.year(),
                    day.day_of_year(),
                    hour
                );
                let keys = match list_prefix(client, bucket, &prefix, config).await {
                    Ok(keys) => keys,
                    Err(detail) => {
                        tracing::debug!(%prefix, error = %detail, "remote listing failed, skipping hour");
                        continue;
                    }
                };

                for key in keys {
                    let Some(filename) = key.rsplit('/').next() else {
                        continue;
                    };
                    if !filename.ends_with(".nc") {
                        continue;
                    }
                    if let Some(bands) = &target.bands {
                        if !bands.is_empty() && !bands.iter().any(|b| filename.contains(&format!("C{b}")))
                        {
                            continue;
                        }
                    }
                    let Some(ts) = extract_timestamp(filename) else {
                        continue;
                    };
                    if ts.day_key != *day_key {
                        continue;
                    }
                    if !ranges.iter().any(|r| r.contains_minute(ts.minute_of_day)) {
                        continue;
                    }
                    results.insert(filename.to_string(), key.clone());
                }
            }
        }
    }

    results
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_minute_timestamp_between_markers() {
        let name = "OR_ABI-L1b-RadF-M6C13_G16_s20232991200217_e20232991209594.nc";
        let ts = extract_timestamp(name).unwrap();
        assert_eq!(ts.day_key, "2023299");
        assert_eq!(ts.minute_of_day, 12 * 60);
    }

    #[test]
    fn rejects_name_without_markers() {
        assert!(extract_timestamp("no-markers-here.nc").is_none());
    }

    #[test]
    fn hours_in_ranges_covers_whole_span() {
        let ranges = vec![TimeRange::parse("19:00-19:17").unwrap()];
        let hours = hours_in_ranges(&ranges);
        assert_eq!(hours, BTreeSet::from([19]));
    }
}
