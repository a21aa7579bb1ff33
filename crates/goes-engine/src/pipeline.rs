//! The per-query orchestration pipeline: local archives first, remote
//! fallback second, then a final report and recovery query.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use chrono::Utc;
use futures::stream::{FuturesUnordered, StreamExt};
use goes_catalog::Catalog;
use goes_store::{QueryId, QueryRecord, QueryStore};
use goes_types::{CanonicalQuery, Level, Selection};
use tokio::sync::Semaphore;

use crate::config::EngineConfig;
use crate::error::EngineError;
use crate::recovery::{build_recovery_request, FailedTarget};
use crate::report::build_report;

/// Runs the full retrieval pipeline for `id`, from `procesando` through to a
/// terminal `completado`/`error` state.
///
/// Never returns an error to the caller: any [`EngineError`] encountered mid-run
/// is caught, persisted as the record's terminal `error` state, and swallowed.
/// Callers that need to know whether the run ultimately failed should re-load
/// the record afterward and inspect `estado`.
pub async fn run(
    store: Arc<dyn QueryStore>,
    s3_client: Arc<aws_sdk_s3::Client>,
    config: Arc<EngineConfig>,
    id: QueryId,
) {
    let started_at = Utc::now();
    if let Err(err) = run_inner(&store, &s3_client, &config, id, started_at).await {
        tracing::warn!(%id, error = %err, "query pipeline failed");
        if let Ok(mut record) = store.load(id).await {
            record.fail(err, Utc::now());
            if let Err(save_err) = store.save(&record).await {
                tracing::error!(%id, error = %save_err, "failed to persist error state");
            }
        }
    }
}

async fn run_inner(
    store: &Arc<dyn QueryStore>,
    s3_client: &Arc<aws_sdk_s3::Client>,
    config: &EngineConfig,
    id: QueryId,
    started_at: chrono::DateTime<Utc>,
) -> Result<(), EngineError> {
    let mut record = store.load(id).await?;
    let query = record.query.clone();
    let catalog = Catalog;
    let full_bands = catalog.valid_bands().to_vec();
    let full_products = catalog.valid_products().to_vec();

    record.set_progress(10, "Preparando entorno", Utc::now());
    store.save(&record).await?;

    let dest = config.download_path.join(id.to_string());
    std::fs::create_dir_all(&dest).map_err(|e| EngineError::CreateDestination {
        path: dest.clone(),
        source: e,
    })?;

    let mut failed_local: Vec<PathBuf> = Vec::new();
    let mut failed_s3: Vec<String> = Vec::new();
    let mut downloaded_s3: Vec<PathBuf> = Vec::new();

    if config.lustre_enabled {
        let local_query = local_eligible_query(&query, &config.s3_only_products, &full_products);
        run_local_phase(
            store,
            &mut record,
            config,
            &local_query,
            &full_bands,
            &full_products,
            &dest,
            &mut failed_local,
        )
        .await?;
    } else {
        record.set_progress(20, "Lustre deshabilitado", Utc::now());
        store.save(&record).await?;
    }

    if config.s3_fallback_enabled {
        record.set_progress(85, "Buscando archivos adicionales en S3", Utc::now());
        store.save(&record).await?;

        let outcome = run_remote_phase(store, config, s3_client, &query, &full_products, &dest, id).await?;
        downloaded_s3 = outcome.downloaded;
        failed_s3 = outcome.failed;
    }

    record.set_progress(95, "Generando reporte final", Utc::now());
    store.save(&record).await?;

    let mut failed_targets: Vec<FailedTarget> = failed_local
        .iter()
        .filter_map(|p| p.file_name().map(|n| n.to_string_lossy().into_owned()))
        .map(|filename| FailedTarget { filename })
        .collect();
    failed_targets.extend(failed_s3.iter().cloned().map(|filename| FailedTarget { filename }));

    let recovery_request = build_recovery_request(&query.original_request, &failed_targets);

    let now = Utc::now();
    let report = build_report(
        &dest,
        &downloaded_s3,
        recovery_request,
        started_at,
        now,
        config.report_list_cap,
    )?;

    let mensaje = format!(
        "Recuperacion: T={}, L={}, S={}{}",
        report.total_archivos,
        report.fuentes.lustre.total,
        report.fuentes.s3.total,
        if failed_targets.is_empty() {
            String::new()
        } else {
            format!(", F={}", failed_targets.len())
        }
    );
    record.complete(report, mensaje, now);
    store.save(&record).await?;
    Ok(())
}

/// Filters `query`'s product list down to those not named in
/// `s3_only_products`, used to decide which archives the local step even
/// attempts. `query` is unaffected for L1b, which has no product dimension.
fn local_eligible_query(
    query: &CanonicalQuery,
    s3_only_products: &[String],
    full_products: &[String],
) -> CanonicalQuery {
    let mut local_query = query.clone();
    if query.level == Level::L2 {
        let products: Vec<String> = match &query.products {
            Selection::All => full_products.to_vec(),
            Selection::Specific(v) => v.clone(),
        };
        let eligible: Vec<String> = products
            .into_iter()
            .filter(|p| !s3_only_products.iter().any(|s| s.eq_ignore_ascii_case(p)))
            .collect();
        local_query.products = Selection::Specific(eligible);
    }
    local_query
}

#[allow(clippy::too_many_arguments)]
async fn run_local_phase(
    store: &Arc<dyn QueryStore>,
    record: &mut QueryRecord,
    config: &EngineConfig,
    local_query: &CanonicalQuery,
    full_bands: &[String],
    full_products: &[String],
    dest: &Path,
    failed_local: &mut Vec<PathBuf>,
) -> Result<(), EngineError> {
    let no_local_products = local_query.level == Level::L2
        && matches!(&local_query.products, Selection::Specific(v) if v.is_empty());

    let candidates = if no_local_products {
        Vec::new()
    } else {
        goes_local::discover_and_filter(local_query, &config.source_path)
            .unwrap_or_else(|err| {
                tracing::warn!(error = %err, "local discovery failed, treating as no candidates");
                Vec::new()
            })
    };
    let pending = goes_local::scan_existing(candidates, dest).unwrap_or_default();
    let total = pending.len();

    record.set_progress(20, format!("Identificados {total} pendientes"), Utc::now());
    store.save(record).await?;

    if pending.is_empty() {
        return Ok(());
    }

    let semaphore = Arc::new(Semaphore::new(config.max_workers.max(1)));
    let mut in_flight = FuturesUnordered::new();

    for archive_path in pending {
        let permit = semaphore.clone();
        let query = local_query.clone();
        let bands = full_bands.to_vec();
        let products = full_products.to_vec();
        let dest = dest.to_path_buf();
        let timeout_dur = config.file_processing_timeout;

        in_flight.push(async move {
            let _permit = permit.acquire_owned().await.expect("semaphore never closed");
            let path_for_task = archive_path.clone();
            let join = tokio::task::spawn_blocking(move || {
                goes_local::process_archive(&path_for_task, &dest, &query, &bands, &products)
            });
            let outcome = tokio::time::timeout(timeout_dur, join).await;
            (archive_path, outcome)
        });
    }

    let mut completed = 0usize;
    while let Some((archive_path, outcome)) = in_flight.next().await {
        completed += 1;
        let ok = matches!(outcome, Ok(Ok(Ok(_))));
        if !ok {
            failed_local.push(archive_path.clone());
        }

        let fraction = completed as f64 / total as f64;
        let progreso = (20.0 + (fraction * 60.0)).round() as u8;
        record.set_progress(
            progreso,
            format!("Procesando {}", archive_path.display()),
            Utc::now(),
        );
        store.save(record).await?;
    }

    Ok(())
}

async fn run_remote_phase(
    store: &Arc<dyn QueryStore>,
    config: &EngineConfig,
    s3_client: &Arc<aws_sdk_s3::Client>,
    query: &CanonicalQuery,
    full_products: &[String],
    dest: &Path,
    id: QueryId,
) -> Result<goes_remote::DownloadOutcome, EngineError> {
    let bucket = goes_remote::bucket_name(query)?;

    let targets = match query.level {
        Level::L1b => vec![goes_remote::l1b_target(query)],
        Level::L2 => goes_remote::l2_targets(query, full_products),
    };

    let keys = goes_remote::discover(s3_client, &bucket, query, &targets, &config.remote).await;

    let sink = ProgressCheckpoint {
        store: store.clone(),
        id,
    };
    goes_remote::download(s3_client, &bucket, &keys, dest, &config.remote, &sink)
        .await
        .map_err(EngineError::from)
}

/// A [`goes_remote::ProgressSink`] that maps completions onto the 85-95 global
/// progress band and persists them to the query store from a spawned task, so
/// the synchronous callback never blocks the download loop.
struct ProgressCheckpoint {
    store: Arc<dyn QueryStore>,
    id: QueryId,
}

impl goes_remote::ProgressSink for ProgressCheckpoint {
    fn report(&self, completed: u64, total: u64) {
        let store = self.store.clone();
        let id = self.id;
        tokio::spawn(async move {
            let Ok(mut record) = store.load(id).await else {
                return;
            };
            let fraction = if total == 0 { 1.0 } else { completed as f64 / total as f64 };
            let progreso = (85.0 + (fraction * 10.0)).round() as u8;
            record.set_progress(
                progreso,
                format!("Descargando desde S3 ({completed}/{total})"),
                Utc::now(),
            );
            let _ = store.save(&record).await;
        });
    }
}

/// Dedups a set of local archive paths by filesystem identity (path equality),
/// matching the local discoverer's own deduplication contract.
#[must_use]
pub fn dedup_paths(paths: Vec<PathBuf>) -> Vec<PathBuf> {
    let set: BTreeSet<PathBuf> = paths.into_iter().collect();
    set.into_iter().collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use goes_types::{Domain, Request, Satellite, Sensor};
    use std::collections::BTreeMap;

    fn sample_l2_query(products: Selection) -> CanonicalQuery {
        CanonicalQuery {
            satellite: Satellite::Goes16,
            sensor: Sensor::Abi,
            level: Level::L2,
            domain: Domain::Conus,
            products,
            bands: Selection::Specific(vec!["13".into()]),
            fechas: BTreeMap::new(),
            total_horas: 0.0,
            total_fechas_expandidas: 0,
            original_request: Request {
                sat: None,
                sensor: None,
                nivel: None,
                dominio: "conus".into(),
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
    fn local_eligible_query_drops_s3_only_products() {
        let query = sample_l2_query(Selection::Specific(vec!["CMIP".into(), "VAA".into()]));
        let filtered = local_eligible_query(&query, &["VAA".to_string()], &[]);
        assert_eq!(
            filtered.products,
            Selection::Specific(vec!["CMIP".to_string()])
        );
    }

    #[test]
    fn local_eligible_query_expands_all_before_filtering() {
        let query = sample_l2_query(Selection::All);
        let full = vec!["CMIP".to_string(), "VAA".to_string(), "ACHA".to_string()];
        let filtered = local_eligible_query(&query, &["VAA".to_string()], &full);
        assert_eq!(
            filtered.products,
            Selection::Specific(vec!["CMIP".to_string(), "ACHA".to_string()])
        );
    }

    #[test]
    fn dedup_paths_removes_duplicates_and_sorts() {
        let paths = vec![
            PathBuf::from("/b"),
            PathBuf::from("/a"),
            PathBuf::from("/a"),
        ];
        assert_eq!(dedup_paths(paths), vec![PathBuf::from("/a"), PathBuf::from("/b")]);
    }
}
