//! Error types shared by the retrieval engine crates.

use thiserror::Error;

/// Result type alias for query-model operations.
pub type Result<T> = std::result::Result<T, QueryModelError>;

/// Errors raised while validating or normalizing a submitted request.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum QueryModelError {
    /// The satellite name is not recognized.
    #[error("unknown satellite: {0}")]
    UnknownSatellite(String),

    /// The sensor id is not recognized.
    #[error("unknown sensor: {0}")]
    UnknownSensor(String),

    /// The processing level is not recognized.
    #[error("unknown level: {0}")]
    UnknownLevel(String),

    /// The domain is missing or not recognized.
    #[error("unknown or missing domain: {0}")]
    UnknownDomain(String),

    /// A product code is not in the catalog.
    #[error("unknown product: {0}")]
    UnknownProduct(String),

    /// A band code is not in the catalog.
    #[error("invalid band: {0}")]
    InvalidBands(String),

    /// A date key could not be parsed.
    #[error("malformed date key: {0}")]
    BadDateKey(String),

    /// A date key's last day is in the future.
    #[error("date key {0} is in the future")]
    FutureDate(String),

    /// A time range string could not be parsed, or start > end.
    #[error("malformed time range: {0}")]
    BadTimeRange(String),

    /// The `fechas` mapping was empty.
    #[error("request contains no dates")]
    NoDates,
}
