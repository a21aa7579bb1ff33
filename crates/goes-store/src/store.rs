//! The query-store trait and its JSON-file-backed implementation.

use std::fs;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use chrono::Utc;
use directories::ProjectDirs;

use crate::error::{Result, StoreError};
use crate::record::{QueryId, QueryRecord};

/// Durable storage of [`QueryRecord`]s, keyed by [`QueryId`].
///
/// The retrieval engine and HTTP front door depend only on this trait, never on
/// [`FileQueryStore`] directly, so a different backing store (SQL, a distributed KV
/// store) is a drop-in replacement.
#[async_trait]
pub trait QueryStore: Send + Sync + std::fmt::Debug {
    /// Persists a new or updated record.
    ///
    /// # Errors
    ///
    /// Returns a [`StoreError`] if the record cannot be serialized or written.
    async fn save(&self, record: &QueryRecord) -> Result<()>;

    /// Loads a record by id.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::NotFound`] if no record exists for `id`, or a read/parse
    /// error.
    async fn load(&self, id: QueryId) -> Result<QueryRecord>;

    /// Lists every record, newest first.
    ///
    /// # Errors
    ///
    /// Returns a [`StoreError`] if the underlying storage cannot be enumerated.
    async fn list(&self) -> Result<Vec<QueryRecord>>;

    /// Deletes a record by id. Not an error if the record never existed.
    ///
    /// # Errors
    ///
    /// Returns a [`StoreError`] if the underlying storage cannot be modified.
    async fn delete(&self, id: QueryId) -> Result<()>;
}

/// A [`QueryStore`] backed by one JSON file per query, under `<base>/queries/`.
///
/// Jobs-as-files: sorted newest-first on list, corrupt files skipped with a
/// warning rather than failing the whole listing.
#[derive(Debug, Clone)]
pub struct FileQueryStore {
    queries_path: PathBuf,
}

impl FileQueryStore {
    /// Creates a store rooted at `base_path`, creating `<base_path>/queries/` if
    /// needed.
    ///
    /// # Errors
    ///
    /// Returns a [`StoreError`] if the directory cannot be created.
    pub fn new(base_path: PathBuf) -> Result<Self> {
        let queries_path = base_path.join("queries");
        if !queries_path.exists() {
            fs::create_dir_all(&queries_path).map_err(|e| StoreError::CreateDir {
                path: queries_path.clone(),
                source: e,
            })?;
        }
        Ok(Self { queries_path })
    }

    /// The platform-appropriate default data directory for the service
    /// (`~/.local/share/goes-retrieve` on Linux, etc.), falling back to
    /// `~/.goes-retrieve` if it cannot be determined.
    #[must_use]
    pub fn default_path() -> PathBuf {
        ProjectDirs::from("", "", "goes-retrieve").map_or_else(dirs_fallback, |proj_dirs| {
            proj_dirs.data_dir().to_path_buf()
        })
    }

    /// Creates a store at [`FileQueryStore::default_path`].
    ///
    /// # Errors
    ///
    /// Returns a [`StoreError`] if the directory cannot be created.
    pub fn with_default_path() -> Result<Self> {
        Self::new(Self::default_path())
    }

    /// Returns the directory holding per-query JSON files.
    #[must_use]
    pub fn queries_path(&self) -> &Path {
        &self.queries_path
    }

    fn record_path(&self, id: QueryId) -> PathBuf {
        self.queries_path.join(format!("{id}.json"))
    }
}

#[async_trait]
impl QueryStore for FileQueryStore {
    async fn save(&self, record: &QueryRecord) -> Result<()> {
        let path = self.record_path(record.id);
        let json = serde_json::to_string_pretty(record)?;
        fs::write(&path, json).map_err(|e| StoreError::WriteFile { path, source: e })
    }

    async fn load(&self, id: QueryId) -> Result<QueryRecord> {
        let path = self.record_path(id);
        if !path.exists() {
            return Err(StoreError::NotFound(id));
        }
        let content = fs::read_to_string(&path).map_err(|e| StoreError::ReadFile {
            path: path.clone(),
            source: e,
        })?;
        serde_json::from_str(&content).map_err(|e| StoreError::ParseJson { path, source: e })
    }

    async fn list(&self) -> Result<Vec<QueryRecord>> {
        let entries = fs::read_dir(&self.queries_path).map_err(|e| StoreError::ReadDir {
            path: self.queries_path.clone(),
            source: e,
        })?;

        let mut records = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|e| StoreError::ReadDir {
                path: self.queries_path.clone(),
                source: e,
            })?;
            let path = entry.path();
            if path.extension().is_some_and(|ext| ext == "json") {
                let content = fs::read_to_string(&path).map_err(|e| StoreError::ReadFile {
                    path: path.clone(),
                    source: e,
                })?;
                match serde_json::from_str::<QueryRecord>(&content) {
                    Ok(record) => records.push(record),
                    Err(e) => {
                        tracing::warn!(?path, error = %e, "skipping unparseable query record");
                    }
                }
            }
        }

        records.sort_by(|a, b| b.timestamp_creacion.cmp(&a.timestamp_creacion));
        Ok(records)
    }

    async fn delete(&self, id: QueryId) -> Result<()> {
        let path = self.record_path(id);
        if !path.exists() {
            return Ok(());
        }
        fs::remove_file(&path).map_err(|e| StoreError::DeleteFile { path, source: e })
    }
}

fn dirs_fallback() -> PathBuf {
    std::env::var("HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("."))
        .join(".goes-retrieve")
}

/// Convenience used by tests and the restart operation: marks `id` `recibido` again.
pub async fn restart(store: &dyn QueryStore, id: QueryId) -> Result<QueryRecord> {
    let mut record = store.load(id).await?;
    record.restart(Utc::now());
    store.save(&record).await?;
    Ok(record)
}

#[cfg(test)]
mod tests {
    use super::*;
    use goes_types::{CanonicalQuery, Domain, Level, Request, Satellite, Selection, Sensor};
    use std::collections::BTreeMap;
    use tempfile::TempDir;
    use uuid::Uuid;

    fn sample_query() -> CanonicalQuery {
        CanonicalQuery {
            satellite: Satellite::Goes16,
            sensor: Sensor::Abi,
            level: Level::L1b,
            domain: Domain::FullDisk,
            products: Selection::Specific(vec![]),
            bands: Selection::Specific(vec!["13".into()]),
            fechas: BTreeMap::new(),
            total_horas: 0.0,
            total_fechas_expandidas: 0,
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
            creado_por: Some("tester".into()),
        }
    }

    #[tokio::test]
    async fn save_then_load_round_trips() {
        let dir = TempDir::new().unwrap();
        let store = FileQueryStore::new(dir.path().to_path_buf()).unwrap();
        let record = QueryRecord::new(Uuid::new_v4(), sample_query(), Utc::now());

        store.save(&record).await.unwrap();
        let loaded = store.load(record.id).await.unwrap();
        assert_eq!(loaded.id, record.id);
        assert_eq!(loaded.estado, record.estado);
    }

    #[tokio::test]
    async fn load_missing_returns_not_found() {
        let dir = TempDir::new().unwrap();
        let store = FileQueryStore::new(dir.path().to_path_buf()).unwrap();
        let err = store.load(Uuid::new_v4()).await.unwrap_err();
        assert!(matches!(err, StoreError::NotFound(_)));
    }

    #[tokio::test]
    async fn list_sorts_newest_first() {
        let dir = TempDir::new().unwrap();
        let store = FileQueryStore::new(dir.path().to_path_buf()).unwrap();

        let older = QueryRecord::new(
            Uuid::new_v4(),
            sample_query(),
            Utc::now() - chrono::Duration::hours(1),
        );
        let newer = QueryRecord::new(Uuid::new_v4(), sample_query(), Utc::now());
        store.save(&older).await.unwrap();
        store.save(&newer).await.unwrap();

        let listed = store.list().await.unwrap();
        assert_eq!(listed.len(), 2);
        assert_eq!(listed[0].id, newer.id);
    }

    #[tokio::test]
    async fn delete_is_idempotent() {
        let dir = TempDir::new().unwrap();
        let store = FileQueryStore::new(dir.path().to_path_buf()).unwrap();
        let record = QueryRecord::new(Uuid::new_v4(), sample_query(), Utc::now());
        store.save(&record).await.unwrap();

        store.delete(record.id).await.unwrap();
        assert!(matches!(
            store.load(record.id).await,
            Err(StoreError::NotFound(_))
        ));
        store.delete(record.id).await.unwrap(); // idempotent
    }

    #[tokio::test]
    async fn restart_resets_to_recibido() {
        let dir = TempDir::new().unwrap();
        let store = FileQueryStore::new(dir.path().to_path_buf()).unwrap();
        let mut record = QueryRecord::new(Uuid::new_v4(), sample_query(), Utc::now());
        record.set_progress(42, "working", Utc::now());
        store.save(&record).await.unwrap();

        let restarted = restart(&store, record.id).await.unwrap();
        assert_eq!(restarted.estado, crate::record::QueryStatus::Recibido);
        assert_eq!(restarted.progreso, 0);
    }
}
