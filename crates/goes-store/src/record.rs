//! The persistent query record and its lifecycle states.

use std::collections::HashMap;
use std::path::PathBuf;

use chrono::{DateTime, Utc};
use goes_types::{CanonicalQuery, Request};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier of a query record.
pub type QueryId = Uuid;

/// Lifecycle state of a query record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QueryStatus {
    /// Accepted, not yet picked up by the orchestrator.
    Recibido,
    /// Orchestrator is actively working this query.
    Procesando,
    /// Finished successfully; `resultados` holds the final report.
    Completado,
    /// Finished with an unrecoverable error; `mensaje` holds the detail.
    Error,
}

impl QueryStatus {
    /// True for either terminal state (`completado` or `error`).
    #[must_use]
    pub const fn is_terminal(&self) -> bool {
        matches!(self, Self::Completado | Self::Error)
    }
}

impl std::fmt::Display for QueryStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Recibido => "recibido",
            Self::Procesando => "procesando",
            Self::Completado => "completado",
            Self::Error => "error",
        };
        write!(f, "{s}")
    }
}

/// Per-source file counts in a [`QueryReport`].
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SourceSummary {
    /// Filenames retrieved from this source (truncated to a configured maximum).
    pub archivos: Vec<String>,
    /// Total files retrieved from this source (never truncated).
    pub total: u64,
}

/// Both sources' summaries, as persisted under `resultados.fuentes`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SourceBreakdown {
    /// Files served from the local archive store.
    pub lustre: SourceSummary,
    /// Files served from the remote S3 fallback.
    pub s3: SourceSummary,
}

/// The final report persisted under `resultados` on successful completion.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueryReport {
    /// Per-source file lists and counts.
    pub fuentes: SourceBreakdown,
    /// Product-base -> count, across both sources.
    pub conteo_por_producto: HashMap<String, u64>,
    /// Product-base -> count, S3 source only.
    pub conteo_por_producto_s3: HashMap<String, u64>,
    /// Total files retrieved (`fuentes.lustre.total + fuentes.s3.total`).
    pub total_archivos: u64,
    /// Total size of the destination directory, in megabytes.
    pub total_mb: f64,
    /// Destination directory for this query's files.
    pub ruta_destino: PathBuf,
    /// When the final report was generated.
    pub timestamp_procesamiento: DateTime<Utc>,
    /// Wall-clock duration of the whole pipeline, in seconds.
    pub duracion_procesamiento: f64,
    /// A reconstructed request covering failed targets, or `None` if nothing failed.
    pub consulta_recuperacion: Option<Request>,
}

/// A persisted query: its canonical form, lifecycle state, and (once complete) report.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueryRecord {
    /// Unique identifier.
    pub id: QueryId,
    /// Current lifecycle state.
    pub estado: QueryStatus,
    /// Progress percentage, 0-100.
    pub progreso: u8,
    /// Human-readable status message.
    pub mensaje: String,
    /// The normalized query being processed.
    pub query: CanonicalQuery,
    /// The final report, once `estado` is `completado`.
    pub resultados: Option<QueryReport>,
    /// When this record was first created.
    pub timestamp_creacion: DateTime<Utc>,
    /// When this record was last updated.
    pub timestamp_actualizacion: DateTime<Utc>,
    /// Requester identifier, copied from the originating request.
    pub usuario: Option<String>,
}

impl QueryRecord {
    /// Creates a new record in the `recibido` state.
    #[must_use]
    pub fn new(id: QueryId, query: CanonicalQuery, now: DateTime<Utc>) -> Self {
        let usuario = query.creado_por.clone();
        Self {
            id,
            estado: QueryStatus::Recibido,
            progreso: 0,
            mensaje: "Recibido".to_string(),
            query,
            resultados: None,
            timestamp_creacion: now,
            timestamp_actualizacion: now,
            usuario,
        }
    }

    /// Resets this record to `recibido` for a restart, clearing prior progress and
    /// results but keeping the original query and creation timestamp.
    pub fn restart(&mut self, now: DateTime<Utc>) {
        self.estado = QueryStatus::Recibido;
        self.progreso = 0;
        self.mensaje = "Recibido".to_string();
        self.resultados = None;
        self.timestamp_actualizacion = now;
    }

    /// Advances progress/status/message and refreshes the update timestamp.
    pub fn set_progress(&mut self, progreso: u8, mensaje: impl Into<String>, now: DateTime<Utc>) {
        self.estado = QueryStatus::Procesando;
        self.progreso = progreso;
        self.mensaje = mensaje.into();
        self.timestamp_actualizacion = now;
    }

    /// Marks this record complete, storing the final report.
    pub fn complete(&mut self, report: QueryReport, mensaje: impl Into<String>, now: DateTime<Utc>) {
        self.estado = QueryStatus::Completado;
        self.progreso = 100;
        self.mensaje = mensaje.into();
        self.resultados = Some(report);
        self.timestamp_actualizacion = now;
    }

    /// Marks this record as permanently failed.
    pub fn fail(&mut self, detail: impl std::fmt::Display, now: DateTime<Utc>) {
        self.estado = QueryStatus::Error;
        self.progreso = 0;
        self.mensaje = format!("Error: {detail}");
        self.timestamp_actualizacion = now;
    }
}
