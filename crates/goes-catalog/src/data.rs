//! The embedded catalog of valid satellites, sensors, levels, domains, products and
//! bands.

use std::sync::OnceLock;

use serde::Deserialize;

/// Embedded JSON catalog of valid values.
const CATALOG_JSON: &str = include_str!("data/catalog.json");

static CATALOG: OnceLock<CatalogData> = OnceLock::new();

/// Raw JSON shape of `data/catalog.json`.
#[derive(Debug, Deserialize)]
struct RawCatalogData {
    satellites: Vec<String>,
    sensors: Vec<String>,
    levels: Vec<String>,
    domains: Vec<String>,
    bands: Vec<String>,
    products: Vec<String>,
}

/// The parsed, immutable catalog of valid values.
#[derive(Debug, Clone)]
pub struct CatalogData {
    pub(crate) satellites: Vec<String>,
    pub(crate) sensors: Vec<String>,
    pub(crate) levels: Vec<String>,
    pub(crate) domains: Vec<String>,
    pub(crate) bands: Vec<String>,
    pub(crate) products: Vec<String>,
}

impl CatalogData {
    /// Returns the global catalog, lazily parsed from embedded JSON on first access.
    #[must_use]
    pub fn global() -> &'static Self {
        CATALOG.get_or_init(|| {
            Self::from_json(CATALOG_JSON).expect("embedded catalog.json should be valid")
        })
    }

    /// Parses a catalog from a JSON string.
    ///
    /// # Errors
    ///
    /// Returns an error if the JSON does not match the expected shape.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        let raw: RawCatalogData = serde_json::from_str(json)?;
        Ok(Self {
            satellites: raw.satellites,
            sensors: raw.sensors,
            levels: raw.levels,
            domains: raw.domains,
            bands: raw.bands,
            products: raw.products,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn global_catalog_loads_expected_counts() {
        let c = CatalogData::global();
        assert_eq!(c.bands.len(), 16);
        assert_eq!(c.products.len(), 20);
        assert_eq!(c.sensors, vec!["abi", "suvi", "glm"]);
    }
}
