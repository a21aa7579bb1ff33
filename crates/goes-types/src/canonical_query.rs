//! The normalized, internal form of a submitted request.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::{
    request::Request,
    satellite::{Domain, Level, Satellite, Sensor},
    time_range::TimeRange,
};

/// Either the literal `ALL` sentinel, or an explicit list of values.
///
/// `ALL` is preserved as a marker rather than eagerly expanded for products (the
/// expansion differs by catalog and by level), while bands are expanded eagerly by
/// the normalizer (see `goes-catalog::expand_bands`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Selection {
    /// Every valid value was requested.
    All,
    /// An explicit, non-empty list of values.
    Specific(Vec<String>),
}

impl Selection {
    /// Returns true if this selection is the `ALL` sentinel.
    #[must_use]
    pub const fn is_all(&self) -> bool {
        matches!(self, Self::All)
    }

    /// Returns the explicit list, or an empty slice for `All`.
    #[must_use]
    pub fn as_slice(&self) -> &[String] {
        match self {
            Self::All => &[],
            Self::Specific(v) => v,
        }
    }

    /// Returns true if `value` is present in this selection (never true for `All`;
    /// callers that need to treat `All` as matching everything should check
    /// [`Selection::is_all`] first).
    #[must_use]
    pub fn contains(&self, value: &str) -> bool {
        match self {
            Self::All => false,
            Self::Specific(v) => v.iter().any(|x| x.eq_ignore_ascii_case(value)),
        }
    }
}

/// The normalized form of a [`Request`], with dates expanded to day keys and bands/
/// products validated.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CanonicalQuery {
    /// Resolved satellite.
    pub satellite: Satellite,
    /// Resolved sensor.
    pub sensor: Sensor,
    /// Resolved processing level.
    pub level: Level,
    /// Resolved domain.
    pub domain: Domain,
    /// Requested products; `Specific` entries are uppercased.
    pub products: Selection,
    /// Requested bands; always expanded (an `All` selection here only appears if the
    /// caller bypassed expansion, normalization always replaces it with `Specific`).
    pub bands: Selection,
    /// `YYYYJJJ` day key to time ranges for that day.
    pub fechas: BTreeMap<String, Vec<TimeRange>>,
    /// Sum of all interval durations, in hours.
    pub total_horas: f64,
    /// Number of day keys after expansion.
    pub total_fechas_expandidas: usize,
    /// The request exactly as submitted, with `YYYYMMDD` keys preserved.
    pub original_request: Request,
    /// Requester identifier, copied from the request.
    pub creado_por: Option<String>,
}

impl CanonicalQuery {
    /// A query requires band information when the level is `L1b`, or the level is `L2`
    /// and either any requested product begins with `CMI` or all products were
    /// requested.
    #[must_use]
    pub fn requires_bands(&self) -> bool {
        match self.level {
            Level::L1b => true,
            Level::L2 => {
                self.products.is_all()
                    || match &self.products {
                        Selection::Specific(products) => {
                            products.iter().any(|p| p.starts_with("CMI"))
                        }
                        Selection::All => true,
                    }
            }
        }
    }

    /// True when bands were requested as `ALL` or equal to the full catalog band set.
    #[must_use]
    pub fn requested_all_bands(&self, full_band_set: &[String]) -> bool {
        selection_is_full(&self.bands, full_band_set)
    }

    /// True when products were requested as `ALL` or equal to the full catalog product
    /// set.
    #[must_use]
    pub fn requested_all_products(&self, full_product_set: &[String]) -> bool {
        selection_is_full(&self.products, full_product_set)
    }
}

fn selection_is_full(selection: &Selection, full_set: &[String]) -> bool {
    match selection {
        Selection::All => true,
        Selection::Specific(values) => {
            if values.len() != full_set.len() {
                return false;
            }
            full_set
                .iter()
                .all(|item| values.iter().any(|v| v.eq_ignore_ascii_case(item)))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn l1b_always_requires_bands() {
        let q = sample_query(Level::L1b, Selection::Specific(vec!["ACHA".into()]));
        assert!(q.requires_bands());
    }

    #[test]
    fn l2_non_cmi_product_does_not_require_bands() {
        let q = sample_query(Level::L2, Selection::Specific(vec!["ACHA".into()]));
        assert!(!q.requires_bands());
    }

    #[test]
    fn l2_cmi_product_requires_bands() {
        let q = sample_query(Level::L2, Selection::Specific(vec!["CMIP".into()]));
        assert!(q.requires_bands());
    }

    #[test]
    fn l2_all_products_requires_bands() {
        let q = sample_query(Level::L2, Selection::All);
        assert!(q.requires_bands());
    }

    #[test]
    fn requested_all_detects_full_explicit_set() {
        let full = vec!["01".to_string(), "02".to_string()];
        let q = sample_query(Level::L1b, Selection::All);
        let mut q = q;
        q.bands = Selection::Specific(vec!["02".into(), "01".into()]);
        assert!(q.requested_all_bands(&full));
    }

    fn sample_query(level: Level, products: Selection) -> CanonicalQuery {
        CanonicalQuery {
            satellite: Satellite::Goes16,
            sensor: Sensor::Abi,
            level,
            domain: Domain::FullDisk,
            products,
            bands: Selection::Specific(vec!["13".into()]),
            fechas: BTreeMap::new(),
            total_horas: 0.0,
            total_fechas_expandidas: 0,
            original_request: Request {
                sat: None,
                sensor: None,
                nivel: None,
                dominio: "fd".to_string(),
                productos: None,
                bandas: None,
                fechas: BTreeMap::new(),
                creado_por: None,
                descripcion: None,
            },
            creado_por: None,
        }
    }
}
