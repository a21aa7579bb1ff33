//! Catalog accessors: valid value sets, band/product validation and expansion.

use goes_types::{Request, ALL};

use crate::data::CatalogData;

/// Static description of which satellites, sensors, levels, domains, products and
/// bands the engine knows about.
///
/// Backed by the embedded, process-wide [`CatalogData::global`] singleton; cheap to
/// construct (a handle, not a copy).
#[derive(Debug, Clone, Copy, Default)]
pub struct Catalog;

impl Catalog {
    fn data(&self) -> &'static CatalogData {
        CatalogData::global()
    }

    /// Every recognized satellite name or alias.
    #[must_use]
    pub fn valid_satellites(&self) -> &'static [String] {
        &self.data().satellites
    }

    /// Every recognized sensor id.
    #[must_use]
    pub fn valid_sensors(&self) -> &'static [String] {
        &self.data().sensors
    }

    /// Every recognized processing level.
    #[must_use]
    pub fn valid_levels(&self) -> &'static [String] {
        &self.data().levels
    }

    /// Every recognized domain.
    #[must_use]
    pub fn valid_domains(&self) -> &'static [String] {
        &self.data().domains
    }

    /// Every recognized L2 product code.
    #[must_use]
    pub fn valid_products(&self) -> &'static [String] {
        &self.data().products
    }

    /// Every recognized band code, `01`..`16`.
    #[must_use]
    pub fn valid_bands(&self) -> &'static [String] {
        &self.data().bands
    }

    /// True if `sat` names a recognized satellite or alias.
    #[must_use]
    pub fn is_valid_satellite(&self, sat: &str) -> bool {
        self.valid_satellites().iter().any(|s| s.eq_ignore_ascii_case(sat))
    }

    /// True if `sensor` names a recognized sensor.
    #[must_use]
    pub fn is_valid_sensor(&self, sensor: &str) -> bool {
        self.valid_sensors().iter().any(|s| s.eq_ignore_ascii_case(sensor))
    }

    /// True if `level` names a recognized processing level.
    #[must_use]
    pub fn is_valid_level(&self, level: &str) -> bool {
        self.valid_levels().iter().any(|s| s.eq_ignore_ascii_case(level))
    }

    /// True if `domain` names a recognized domain.
    #[must_use]
    pub fn is_valid_domain(&self, domain: &str) -> bool {
        self.valid_domains().iter().any(|s| s.eq_ignore_ascii_case(domain))
    }

    /// True if `product` names a recognized L2 product code.
    #[must_use]
    pub fn is_valid_product(&self, product: &str) -> bool {
        self.valid_products().iter().any(|s| s.eq_ignore_ascii_case(product))
    }

    /// True if `band` names a recognized band code.
    #[must_use]
    pub fn is_valid_band(&self, band: &str) -> bool {
        self.valid_bands().iter().any(|s| s == band)
    }

    /// Validates a list of band codes (possibly containing `ALL`).
    ///
    /// An empty list is tolerated (bands may be irrelevant for the request). Returns
    /// the list unchanged when valid.
    ///
    /// # Errors
    ///
    /// Returns an error naming the first element that is neither a valid band code
    /// nor `ALL`.
    pub fn validate_bands(&self, bands: &[String]) -> Result<Vec<String>, String> {
        for b in bands {
            if b != ALL && !self.is_valid_band(b) {
                return Err(b.clone());
            }
        }
        Ok(bands.to_vec())
    }

    /// Expands a band list, replacing a literal `["ALL"]` (or any list containing
    /// `ALL`) with the full 16-element band set. Non-`ALL` lists are normalized to
    /// two-digit codes.
    #[must_use]
    pub fn expand_bands(&self, bands: &[String]) -> Vec<String> {
        if bands.iter().any(|b| b == ALL) {
            return self.valid_bands().to_vec();
        }
        bands
            .iter()
            .map(|b| {
                if b.len() == 1 {
                    format!("0{b}")
                } else {
                    b.clone()
                }
            })
            .collect()
    }

    /// The satellite assumed when a request omits `sat`.
    #[must_use]
    pub fn default_satellite(&self) -> &'static str {
        "GOES-EAST"
    }

    /// The sensor assumed when a request omits `sensor`.
    #[must_use]
    pub fn default_sensor(&self) -> &'static str {
        "abi"
    }

    /// The level assumed when a request omits `nivel`.
    #[must_use]
    pub fn default_level(&self) -> &'static str {
        "L1b"
    }

    /// Applies satellite/sensor/level defaults to a request field that was omitted.
    #[must_use]
    pub fn satellite_of(&self, request: &Request) -> String {
        request
            .sat
            .clone()
            .unwrap_or_else(|| self.default_satellite().to_string())
    }

    /// See [`Catalog::satellite_of`].
    #[must_use]
    pub fn sensor_of(&self, request: &Request) -> String {
        request
            .sensor
            .clone()
            .unwrap_or_else(|| self.default_sensor().to_string())
    }

    /// See [`Catalog::satellite_of`].
    #[must_use]
    pub fn level_of(&self, request: &Request) -> String {
        request
            .nivel
            .clone()
            .unwrap_or_else(|| self.default_level().to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn expand_bands_all_yields_sixteen() {
        let cat = Catalog;
        let expanded = cat.expand_bands(&[ALL.to_string()]);
        assert_eq!(expanded.len(), 16);
        assert_eq!(expanded[0], "01");
        assert_eq!(expanded[15], "16");
    }

    #[test]
    fn expand_bands_identity_on_full_set() {
        let cat = Catalog;
        let full = cat.valid_bands().to_vec();
        assert_eq!(cat.expand_bands(&full), full);
    }

    #[test]
    fn validate_bands_rejects_unknown_band() {
        let cat = Catalog;
        assert!(cat.validate_bands(&["99".to_string()]).is_err());
        assert!(cat.validate_bands(&["13".to_string()]).is_ok());
    }

    #[test]
    fn validate_bands_tolerates_empty() {
        let cat = Catalog;
        assert_eq!(cat.validate_bands(&[]).unwrap(), Vec::<String>::new());
    }

    #[test]
    fn single_digit_bands_are_zero_padded() {
        let cat = Catalog;
        assert_eq!(cat.expand_bands(&["3".to_string()]), vec!["03".to_string()]);
    }
}
