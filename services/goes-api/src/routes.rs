//! Handlers implementing the §6 HTTP surface. Every handler is thin: parse,
//! defer to the catalog/normalizer/engine, shape the response. No business
//! logic lives here.

use std::sync::Arc;

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, Query, State};
use axum::http::{HeaderMap, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{delete, get, post};
use axum::{Json, Router};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use goes_catalog::EstimateSummary;
use goes_store::{QueryReport, QueryStatus};
use goes_types::Request as GoesRequest;

use crate::error::ApiError;
use crate::state::AppState;

/// Builds the router for every endpoint in §6, with shared state attached.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/query", post(submit_query))
        .route("/validate", post(validate_query))
        .route("/query/:id", get(get_query))
        .route("/query/:id", delete(delete_query))
        .route("/query/:id/restart", post(restart_query))
        .route("/queries", get(list_queries))
        .route("/health", get(health))
        .with_state(Arc::new(state))
}

async fn health() -> impl IntoResponse {
    Json(serde_json::json!({"status": "ok", "service": "goes-api"}))
}

#[derive(Debug, Serialize)]
struct Resumen {
    archivos_estimados: u64,
    tamanio_estimado_mb: f64,
}

impl From<EstimateSummary> for Resumen {
    fn from(e: EstimateSummary) -> Self {
        Self {
            archivos_estimados: e.file_count,
            tamanio_estimado_mb: e.total_size_mb,
        }
    }
}

#[derive(Debug, Serialize)]
struct SubmitResponse {
    consulta_id: Uuid,
    estado: &'static str,
    resumen: Resumen,
}

/// `POST /query` — accepts, gates, persists, and enqueues a new query.
async fn submit_query(
    State(state): State<Arc<AppState>>,
    body: Result<Json<GoesRequest>, JsonRejection>,
) -> Result<Response, ApiError> {
    let Json(request) = body?;
    let query = goes_catalog::normalize(&request, &state.catalog)?;

    let gate = goes_engine::evaluate(&query, &state.config);
    if let Some(rejection) = gate.rejection {
        return Err(ApiError::from(rejection));
    }

    let id = Uuid::new_v4();
    let now = Utc::now();
    let record = goes_store::QueryRecord::new(id, query, now);
    state.store.save(&record).await.map_err(ApiError::from)?;

    tokio::spawn(goes_engine::run(
        state.store.clone(),
        state.s3_client.clone(),
        state.config.clone(),
        id,
    ));

    let mut headers = HeaderMap::new();
    headers.insert(
        axum::http::header::LOCATION,
        HeaderValue::from_str(&format!("/query/{id}")).expect("uuid is valid header value"),
    );

    let body = Json(SubmitResponse {
        consulta_id: id,
        estado: "recibido",
        resumen: gate.estimate.into(),
    });

    Ok((StatusCode::ACCEPTED, headers, body).into_response())
}

/// `POST /validate` — same acceptance-gate logic as submission, no persistence.
async fn validate_query(
    State(state): State<Arc<AppState>>,
    body: Result<Json<GoesRequest>, JsonRejection>,
) -> Result<Response, ApiError> {
    let Json(request) = body?;
    let query = goes_catalog::normalize(&request, &state.catalog)?;
    let gate = goes_engine::evaluate(&query, &state.config);

    if let Some(rejection) = gate.rejection {
        return Err(ApiError::from(rejection));
    }

    Ok(Json(Resumen::from(gate.estimate)).into_response())
}

#[derive(Debug, Deserialize)]
struct StatusQuery {
    #[serde(default)]
    resultados: bool,
}

/// The stage label reported as `etapa`, derived from the progress band a
/// record currently sits in (§4.7's fixed checkpoints: 10/20/85/95).
fn etapa_for(status: QueryStatus, progreso: u8) -> &'static str {
    match status {
        QueryStatus::Recibido => "recibido",
        QueryStatus::Completado => "completado",
        QueryStatus::Error => "error",
        QueryStatus::Procesando => match progreso {
            0..=19 => "preparando_entorno",
            20..=84 => "procesando_lustre",
            85..=94 => "buscando_s3",
            _ => "generando_reporte",
        },
    }
}

#[derive(Debug, Serialize)]
struct StatusResponse {
    consulta_id: Uuid,
    estado: QueryStatus,
    progreso: u8,
    mensaje: String,
    timestamp: DateTime<Utc>,
    ruta_destino: Option<String>,
    total_mb: Option<f64>,
    etapa: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    total_archivos: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    archivos_lustre: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    archivos_s3: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    resultados: Option<QueryReport>,
}

/// `GET /query/{id}` — per §6, 200 if completed, 202 (`Retry-After: 10`) if
/// in progress/recibido, 500 if errored, 404 if unknown.
async fn get_query(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    Query(params): Query<StatusQuery>,
) -> Result<Response, ApiError> {
    let record = state.store.load(id).await.map_err(ApiError::from)?;

    let status = match record.estado {
        QueryStatus::Completado => StatusCode::OK,
        QueryStatus::Error => StatusCode::INTERNAL_SERVER_ERROR,
        QueryStatus::Recibido | QueryStatus::Procesando => StatusCode::ACCEPTED,
    };

    let resultados = record
        .resultados
        .clone()
        .filter(|_| params.resultados && record.estado == QueryStatus::Completado);

    let body = StatusResponse {
        consulta_id: record.id,
        estado: record.estado,
        progreso: record.progreso,
        mensaje: record.mensaje,
        timestamp: record.timestamp_actualizacion,
        ruta_destino: record
            .resultados
            .as_ref()
            .map(|r| r.ruta_destino.display().to_string()),
        total_mb: record.resultados.as_ref().map(|r| r.total_mb),
        etapa: etapa_for(record.estado, record.progreso),
        total_archivos: record.resultados.as_ref().map(|r| r.total_archivos),
        archivos_lustre: record.resultados.as_ref().map(|r| r.fuentes.lustre.total),
        archivos_s3: record.resultados.as_ref().map(|r| r.fuentes.s3.total),
        resultados,
    };

    let mut response = (status, Json(body)).into_response();
    if status == StatusCode::ACCEPTED {
        response
            .headers_mut()
            .insert("Retry-After", HeaderValue::from_static("10"));
    }
    Ok(response)
}

/// `POST /query/{id}/restart` — gated by the optional `X-API-Key` header.
async fn restart_query(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    headers: HeaderMap,
) -> Result<Response, ApiError> {
    if let Some(expected) = &state.config.api_key {
        let provided = headers
            .get("X-API-Key")
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default();
        if provided != expected {
            return Err(ApiError::Unauthorized);
        }
    }

    let record = goes_store::restart(state.store.as_ref(), id)
        .await
        .map_err(ApiError::from)?;

    tokio::spawn(goes_engine::run(
        state.store.clone(),
        state.s3_client.clone(),
        state.config.clone(),
        id,
    ));

    let mut response_headers = HeaderMap::new();
    response_headers.insert(
        axum::http::header::LOCATION,
        HeaderValue::from_str(&format!("/query/{id}")).expect("uuid is valid header value"),
    );

    Ok((
        StatusCode::ACCEPTED,
        response_headers,
        Json(serde_json::json!({"consulta_id": record.id, "estado": record.estado})),
    )
        .into_response())
}

#[derive(Debug, Deserialize)]
struct ListQuery {
    estado: Option<String>,
    limite: Option<usize>,
}

#[derive(Debug, Serialize)]
struct ListEntry {
    consulta_id: Uuid,
    estado: QueryStatus,
    progreso: u8,
    mensaje: String,
    timestamp: DateTime<Utc>,
}

/// `GET /queries?estado=&limite=` — a short list, newest first.
async fn list_queries(
    State(state): State<Arc<AppState>>,
    Query(params): Query<ListQuery>,
) -> Result<Json<Vec<ListEntry>>, ApiError> {
    let mut records = state.store.list().await.map_err(ApiError::from)?;

    if let Some(estado) = &params.estado {
        records.retain(|r| r.estado.to_string().eq_ignore_ascii_case(estado));
    }

    let limite = params.limite.unwrap_or(50);
    records.truncate(limite);

    Ok(Json(
        records
            .into_iter()
            .map(|r| ListEntry {
                consulta_id: r.id,
                estado: r.estado,
                progreso: r.progreso,
                mensaje: r.mensaje,
                timestamp: r.timestamp_actualizacion,
            })
            .collect(),
    ))
}

#[derive(Debug, Deserialize)]
struct DeleteQuery {
    #[serde(default)]
    purge: bool,
    #[serde(default)]
    force: bool,
}

/// `DELETE /query/{id}?purge=&force=` — removes the record; with `purge`,
/// also removes the destination directory (refused if still processing
/// unless `force` is set).
async fn delete_query(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    Query(params): Query<DeleteQuery>,
) -> Result<StatusCode, ApiError> {
    let record = state.store.load(id).await.map_err(ApiError::from)?;

    if params.purge && record.estado == QueryStatus::Procesando && !params.force {
        return Err(ApiError::StillProcessing);
    }

    if params.purge {
        let dest = state.config.download_path.join(id.to_string());
        if dest.exists() {
            std::fs::remove_dir_all(&dest)
                .map_err(|e| ApiError::from(anyhow::anyhow!("failed to remove {dest:?}: {e}")))?;
        }
    }

    state.store.delete(id).await.map_err(ApiError::from)?;
    Ok(StatusCode::NO_CONTENT)
}
