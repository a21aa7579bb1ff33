//! Runtime configuration for the orchestrator, sourced entirely from the
//! environment with explicit defaults — no config file layer.

use std::path::PathBuf;
use std::time::Duration;

use goes_remote::RemoteConfig;

use crate::error::EngineError;

/// How the archive processor behaves; `Simulador` exists for local development
/// against synthetic archives without a real Lustre-style mount.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProcessorMode {
    /// Process real archives from `source_path`.
    Real,
    /// Simulate processing without touching the filesystem (development only).
    Simulador,
}

/// Every environment-sourced knob the orchestrator and HTTP front door need.
///
/// Every field has a sane default so the binary runs against the public
/// buckets with zero configuration, and every field is independently
/// overridable.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// `real` or `simulador` (`PROCESSOR_MODE`).
    pub processor_mode: ProcessorMode,
    /// Base directory for the persistent query record store (`DB_PATH`).
    pub db_path: PathBuf,
    /// Root of the local archive store (`SOURCE_PATH`).
    pub source_path: PathBuf,
    /// Root under which each query gets its own destination directory (`DOWNLOAD_PATH`).
    pub download_path: PathBuf,
    /// Size of the shared worker pool (`MAX_WORKERS`).
    pub max_workers: usize,
    /// Whether the S3 fallback runs at all (`S3_FALLBACK_ENABLED`).
    pub s3_fallback_enabled: bool,
    /// Whether the local archive store runs at all (`LUSTRE_ENABLED`).
    pub lustre_enabled: bool,
    /// Per-archive wall-clock timeout (`FILE_PROCESSING_TIMEOUT_SECONDS`).
    pub file_processing_timeout: Duration,
    /// Acceptance gate file-count ceiling (`MAX_FILES_PER_QUERY`).
    pub max_files_per_query: u64,
    /// Acceptance gate size ceiling, in megabytes (`MAX_SIZE_MB_PER_QUERY`).
    pub max_size_mb_per_query: f64,
    /// Minimum free space, in gigabytes, required after an accepted query
    /// (`MIN_FREE_SPACE_GB_BUFFER`).
    pub min_free_space_gb_buffer: f64,
    /// Products that are never looked up locally, regardless of `lustre_enabled`
    /// (`S3_ONLY_PRODUCTS`, comma-separated).
    pub s3_only_products: Vec<String>,
    /// Maximum files listed per source in a persisted report (`REPORT_LIST_CAP`).
    pub report_list_cap: usize,
    /// Optional API key gating the restart endpoint (`API_KEY`).
    pub api_key: Option<String>,
    /// S3 listing/download configuration, assembled from the `S3_*` variables.
    pub remote: RemoteConfig,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            processor_mode: ProcessorMode::Real,
            db_path: PathBuf::from("./data"),
            source_path: PathBuf::from("./archive"),
            download_path: PathBuf::from("./downloads"),
            max_workers: 8,
            s3_fallback_enabled: true,
            lustre_enabled: true,
            file_processing_timeout: Duration::from_secs(120),
            max_files_per_query: 50_000,
            max_size_mb_per_query: 500_000.0,
            min_free_space_gb_buffer: 10.0,
            s3_only_products: Vec::new(),
            report_list_cap: 200,
            api_key: None,
            remote: RemoteConfig::default(),
        }
    }
}

impl EngineConfig {
    /// Loads configuration from the process environment, falling back to
    /// [`EngineConfig::default`] for every variable that is unset.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::Config`] if a set variable cannot be parsed into
    /// its expected type.
    pub fn from_env() -> Result<Self, EngineError> {
        let defaults = Self::default();

        let processor_mode = match env_opt("PROCESSOR_MODE")?.as_deref() {
            None | Some("real") => ProcessorMode::Real,
            Some("simulador") => ProcessorMode::Simulador,
            Some(other) => {
                return Err(EngineError::Config(format!(
                    "PROCESSOR_MODE must be 'real' or 'simulador', got '{other}'"
                )))
            }
        };

        let s3_only_products = env_opt("S3_ONLY_PRODUCTS")?
            .map(|v| {
                v.split(',')
                    .map(str::trim)
                    .filter(|s| !s.is_empty())
                    .map(str::to_ascii_uppercase)
                    .collect()
            })
            .unwrap_or_default();

        let mut remote = defaults.remote;
        if let Some(v) = env_opt("S3_RETRY_ATTEMPTS")? {
            remote.retry_attempts = parse_env("S3_RETRY_ATTEMPTS", &v)?;
        }
        if let Some(v) = env_opt("S3_RETRY_BACKOFF_SECONDS")? {
            remote.retry_backoff_base = Duration::from_secs_f64(parse_env(
                "S3_RETRY_BACKOFF_SECONDS",
                &v,
            )?);
        }
        if let Some(v) = env_opt("S3_CONNECT_TIMEOUT")? {
            remote.connect_timeout = Duration::from_secs(parse_env("S3_CONNECT_TIMEOUT", &v)?);
        }
        if let Some(v) = env_opt("S3_READ_TIMEOUT")? {
            remote.read_timeout = Duration::from_secs(parse_env("S3_READ_TIMEOUT", &v)?);
        }
        if let Some(v) = env_opt("S3_PROGRESS_STEP")? {
            remote.progress_step = parse_env("S3_PROGRESS_STEP", &v)?;
        }

        let max_workers = env_opt("MAX_WORKERS")?
            .map(|v| parse_env("MAX_WORKERS", &v))
            .transpose()?
            .unwrap_or(defaults.max_workers);
        remote.max_workers = max_workers;

        Ok(Self {
            processor_mode,
            db_path: env_opt("DB_PATH")?.map_or(defaults.db_path, PathBuf::from),
            source_path: env_opt("SOURCE_PATH")?.map_or(defaults.source_path, PathBuf::from),
            download_path: env_opt("DOWNLOAD_PATH")?
                .map_or(defaults.download_path, PathBuf::from),
            max_workers,
            s3_fallback_enabled: env_bool("S3_FALLBACK_ENABLED", defaults.s3_fallback_enabled)?,
            lustre_enabled: env_bool("LUSTRE_ENABLED", defaults.lustre_enabled)?,
            file_processing_timeout: env_opt("FILE_PROCESSING_TIMEOUT_SECONDS")?
                .map(|v| parse_env::<u64>("FILE_PROCESSING_TIMEOUT_SECONDS", &v))
                .transpose()?
                .map_or(defaults.file_processing_timeout, Duration::from_secs),
            max_files_per_query: env_opt("MAX_FILES_PER_QUERY")?
                .map(|v| parse_env("MAX_FILES_PER_QUERY", &v))
                .transpose()?
                .unwrap_or(defaults.max_files_per_query),
            max_size_mb_per_query: env_opt("MAX_SIZE_MB_PER_QUERY")?
                .map(|v| parse_env("MAX_SIZE_MB_PER_QUERY", &v))
                .transpose()?
                .unwrap_or(defaults.max_size_mb_per_query),
            min_free_space_gb_buffer: env_opt("MIN_FREE_SPACE_GB_BUFFER")?
                .map(|v| parse_env("MIN_FREE_SPACE_GB_BUFFER", &v))
                .transpose()?
                .unwrap_or(defaults.min_free_space_gb_buffer),
            s3_only_products,
            report_list_cap: env_opt("REPORT_LIST_CAP")?
                .map(|v| parse_env("REPORT_LIST_CAP", &v))
                .transpose()?
                .unwrap_or(defaults.report_list_cap),
            api_key: env_opt("API_KEY")?,
            remote,
        })
    }
}

fn env_opt(key: &str) -> Result<Option<String>, EngineError> {
    match std::env::var(key) {
        Ok(v) if v.is_empty() => Ok(None),
        Ok(v) => Ok(Some(v)),
        Err(std::env::VarError::NotPresent) => Ok(None),
        Err(std::env::VarError::NotUnicode(_)) => {
            Err(EngineError::Config(format!("{key} is not valid UTF-8")))
        }
    }
}

fn parse_env<T: std::str::FromStr>(key: &str, value: &str) -> Result<T, EngineError> {
    value
        .parse()
        .map_err(|_| EngineError::Config(format!("{key}='{value}' is not valid")))
}

fn env_bool(key: &str, default: bool) -> Result<bool, EngineError> {
    match env_opt(key)?.as_deref() {
        None => Ok(default),
        Some("true" | "1" | "yes") => Ok(true),
        Some("false" | "0" | "no") => Ok(false),
        Some(other) => Err(EngineError::Config(format!(
            "{key}='{other}' is not a recognized boolean"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_documented_values() {
        let config = EngineConfig::default();
        assert_eq!(config.max_workers, 8);
        assert_eq!(config.max_files_per_query, 50_000);
        assert!(config.lustre_enabled);
        assert!(config.s3_fallback_enabled);
    }

    #[test]
    fn env_bool_accepts_common_spellings() {
        assert!(env_bool("TEST_UNSET_BOOL_A", true).unwrap());
        std::env::set_var("GOES_ENGINE_TEST_BOOL", "0");
        assert!(!env_bool("GOES_ENGINE_TEST_BOOL", true).unwrap());
        std::env::remove_var("GOES_ENGINE_TEST_BOOL");
    }

    #[test]
    fn parse_env_rejects_garbage() {
        assert!(parse_env::<u64>("MAX_WORKERS", "not-a-number").is_err());
    }
}
