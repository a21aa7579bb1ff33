//! The acceptance gate: rejects oversized or disk-constrained queries before
//! any work is scheduled.

use goes_catalog::{estimate_files_summary, Catalog, EstimateSummary};
use goes_types::CanonicalQuery;
use sysinfo::Disks;

use crate::config::EngineConfig;

/// Outcome of [`evaluate`]: the estimate that was computed, plus why it was
/// rejected, if it was.
#[derive(Debug, Clone)]
pub struct GateResult {
    /// The file-count/size estimate the gate based its decision on.
    pub estimate: EstimateSummary,
    /// `None` when the query is accepted; the reason it was rejected otherwise.
    pub rejection: Option<Rejection>,
}

impl GateResult {
    /// True if the gate accepted the query.
    #[must_use]
    pub const fn accepted(&self) -> bool {
        self.rejection.is_none()
    }
}

/// Why the acceptance gate refused a query.
#[derive(Debug, Clone, PartialEq)]
pub enum Rejection {
    /// The estimated file count exceeds `max_files_per_query`.
    TooManyFiles {
        /// The estimated count.
        estimated: u64,
        /// The configured ceiling.
        limit: u64,
    },
    /// The estimated total size exceeds `max_size_mb_per_query`.
    TooLarge {
        /// The estimated size, in megabytes.
        estimated_mb: f64,
        /// The configured ceiling, in megabytes.
        limit_mb: f64,
    },
    /// The destination's free space, minus the estimated size, would fall
    /// below `min_free_space_gb_buffer`.
    InsufficientDiskSpace {
        /// Free space currently available, in gigabytes.
        available_gb: f64,
        /// The configured minimum buffer, in gigabytes.
        required_buffer_gb: f64,
    },
}

impl std::fmt::Display for Rejection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::TooManyFiles { estimated, limit } => write!(
                f,
                "estimated {estimated} files exceeds the maximum of {limit} per query"
            ),
            Self::TooLarge {
                estimated_mb,
                limit_mb,
            } => write!(
                f,
                "estimated {estimated_mb:.1} MB exceeds the maximum of {limit_mb:.1} MB per query"
            ),
            Self::InsufficientDiskSpace {
                available_gb,
                required_buffer_gb,
            } => write!(
                f,
                "only {available_gb:.1} GB free, below the required {required_buffer_gb:.1} GB buffer"
            ),
        }
    }
}

/// Estimates `query` and checks it against the configured file-count, size,
/// and disk-space ceilings.
///
/// Disk space is measured at `download_path` (or its nearest existing
/// ancestor, for a query's first run before its destination directory
/// exists).
#[must_use]
pub fn evaluate(query: &CanonicalQuery, config: &EngineConfig) -> GateResult {
    let catalog = Catalog;
    let estimate = estimate_files_summary(query, catalog.valid_bands());

    let rejection = if estimate.file_count > config.max_files_per_query {
        Some(Rejection::TooManyFiles {
            estimated: estimate.file_count,
            limit: config.max_files_per_query,
        })
    } else if estimate.total_size_mb > config.max_size_mb_per_query {
        Some(Rejection::TooLarge {
            estimated_mb: estimate.total_size_mb,
            limit_mb: config.max_size_mb_per_query,
        })
    } else {
        check_disk_space(estimate.total_size_gb, config)
    };

    GateResult {
        estimate,
        rejection,
    }
}

fn check_disk_space(estimated_gb: f64, config: &EngineConfig) -> Option<Rejection> {
    let available_gb = available_space_gb(&config.download_path);
    let remaining = available_gb - estimated_gb;
    if remaining < config.min_free_space_gb_buffer {
        Some(Rejection::InsufficientDiskSpace {
            available_gb,
            required_buffer_gb: config.min_free_space_gb_buffer,
        })
    } else {
        None
    }
}

/// Free space, in gigabytes, on the filesystem containing `path` (or its
/// nearest existing ancestor).
fn available_space_gb(path: &std::path::Path) -> f64 {
    let mut probe = path;
    while !probe.exists() {
        match probe.parent() {
            Some(parent) => probe = parent,
            None => break,
        }
    }

    let disks = Disks::new_with_refreshed_list();
    disks
        .list()
        .iter()
        .filter(|disk| probe.starts_with(disk.mount_point()))
        .max_by_key(|disk| disk.mount_point().as_os_str().len())
        .map_or(f64::INFINITY, |disk| {
            disk.available_space() as f64 / 1024.0 / 1024.0 / 1024.0
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use goes_types::{Domain, Level, Request, Satellite, Selection, Sensor, TimeRange};
    use std::collections::BTreeMap;

    fn query_with_file_count() -> CanonicalQuery {
        let mut fechas = BTreeMap::new();
        fechas.insert("2023299".to_string(), vec![TimeRange::new(720, 720).unwrap()]);
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
    fn accepts_small_query_under_default_limits() {
        let query = query_with_file_count();
        let config = EngineConfig::default();
        let result = evaluate(&query, &config);
        assert!(result.accepted());
        assert_eq!(result.estimate.file_count, 1);
    }

    #[test]
    fn rejects_over_file_count_ceiling() {
        let query = query_with_file_count();
        let mut config = EngineConfig::default();
        config.max_files_per_query = 0;
        let result = evaluate(&query, &config);
        assert!(!result.accepted());
        assert!(matches!(
            result.rejection,
            Some(Rejection::TooManyFiles { .. })
        ));
    }

    #[test]
    fn rejects_over_size_ceiling() {
        let query = query_with_file_count();
        let mut config = EngineConfig::default();
        config.max_size_mb_per_query = 0.0;
        let result = evaluate(&query, &config);
        assert!(matches!(result.rejection, Some(Rejection::TooLarge { .. })));
    }
}
