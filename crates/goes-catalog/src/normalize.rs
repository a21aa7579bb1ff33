//! Request normalization: defaults, validation, date expansion.

use std::collections::BTreeMap;

use chrono::Utc;
use goes_types::{
    CanonicalQuery, DayKey, Domain, Level, QueryModelError, Request, Satellite, Selection,
    Sensor, TimeRange, ALL,
};

use crate::catalog::Catalog;

/// Normalizes a submitted [`Request`] into a [`CanonicalQuery`], applying catalog
/// defaults, validating dates/bands/products, and expanding date ranges to `YYYYJJJ`
/// day keys.
///
/// # Errors
///
/// Returns a [`QueryModelError`] describing the first validation failure: an
/// unrecognized satellite/sensor/level/domain/product, a malformed date key or time
/// range, a future date, or an invalid band.
pub fn normalize(request: &Request, catalog: &Catalog) -> Result<CanonicalQuery, QueryModelError> {
    let satellite = Satellite::parse(&catalog.satellite_of(request))?;
    let sensor = Sensor::parse(&catalog.sensor_of(request))?;
    let level = Level::parse(&catalog.level_of(request))?;
    let domain = Domain::parse(&request.dominio)?;

    if request.fechas.is_empty() {
        return Err(QueryModelError::NoDates);
    }

    let today = Utc::now().date_naive();
    let mut fechas: BTreeMap<String, Vec<TimeRange>> = BTreeMap::new();
    let mut total_fechas_expandidas = 0usize;
    let mut total_horas = 0.0f64;

    for (date_key, range_strs) in &request.fechas {
        let ranges = range_strs
            .iter()
            .map(|s| TimeRange::parse(s))
            .collect::<Result<Vec<_>, _>>()?;

        for day in expand_date_key(date_key)? {
            let naive = day
                .to_naive_date()
                .ok_or_else(|| QueryModelError::BadDateKey(date_key.clone()))?;
            if naive > today {
                return Err(QueryModelError::FutureDate(date_key.clone()));
            }
            total_fechas_expandidas += 1;
            for range in &ranges {
                total_horas += f64::from(range.duration_minutes()) / 60.0;
            }
            fechas.entry(day.to_jjj()).or_default().extend(ranges.clone());
        }
    }

    let bands_input = request.bandas.clone().unwrap_or_default();
    catalog
        .validate_bands(&bands_input)
        .map_err(QueryModelError::InvalidBands)?;
    let bands = Selection::Specific(catalog.expand_bands(&bands_input));

    let products_input = request.productos.clone().unwrap_or_default();
    for p in &products_input {
        if p != ALL && !catalog.is_valid_product(p) {
            return Err(QueryModelError::UnknownProduct(p.clone()));
        }
    }
    let products = if products_input.iter().any(|p| p == ALL) {
        Selection::All
    } else {
        Selection::Specific(products_input.iter().map(|p| p.to_ascii_uppercase()).collect())
    };

    Ok(CanonicalQuery {
        satellite,
        sensor,
        level,
        domain,
        products,
        bands,
        fechas,
        total_horas,
        total_fechas_expandidas,
        original_request: request.clone(),
        creado_por: request.creado_por.clone(),
    })
}

/// Expands a `YYYYMMDD` or `YYYYMMDD-YYYYMMDD` date key into the list of day keys it
/// covers, inclusive on both ends.
fn expand_date_key(date_key: &str) -> Result<Vec<DayKey>, QueryModelError> {
    if let Some((start_s, end_s)) = date_key.split_once('-') {
        let start = DayKey::parse_ymd(start_s)?;
        let end = DayKey::parse_ymd(end_s)?;
        let mut days = vec![start];
        let mut current = start;
        while current != end {
            current = current
                .succ()
                .ok_or_else(|| QueryModelError::BadDateKey(date_key.to_string()))?;
            days.push(current);
            if days.len() > 366 * 10 {
                return Err(QueryModelError::BadDateKey(date_key.to_string()));
            }
        }
        Ok(days)
    } else {
        Ok(vec![DayKey::parse_ymd(date_key)?])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base_request(fechas: BTreeMap<String, Vec<String>>) -> Request {
        Request {
            sat: None,
            sensor: None,
            nivel: None,
            dominio: "fd".to_string(),
            productos: None,
            bandas: Some(vec!["ALL".to_string()]),
            fechas,
            creado_por: Some("tester".to_string()),
            descripcion: None,
        }
    }

    #[test]
    fn applies_defaults_and_expands_bands() {
        let mut fechas = BTreeMap::new();
        fechas.insert("20231026".to_string(), vec!["12:00".to_string()]);
        let req = base_request(fechas);
        let q = normalize(&req, &Catalog).unwrap();
        assert_eq!(q.satellite, Satellite::GoesEast);
        assert_eq!(q.sensor, Sensor::Abi);
        assert_eq!(q.level, Level::L1b);
        assert!(matches!(&q.bands, Selection::Specific(b) if b.len() == 16));
        assert_eq!(q.fechas.len(), 1);
        assert!(q.fechas.contains_key("2023299"));
    }

    #[test]
    fn expands_date_range_inclusive() {
        let mut fechas = BTreeMap::new();
        fechas.insert(
            "20230101-20230103".to_string(),
            vec!["00:00".to_string()],
        );
        let req = base_request(fechas);
        let q = normalize(&req, &Catalog).unwrap();
        assert_eq!(q.total_fechas_expandidas, 3);
        assert_eq!(q.fechas.len(), 3);
    }

    #[test]
    fn rejects_future_dates() {
        let mut fechas = BTreeMap::new();
        fechas.insert("20991231".to_string(), vec!["00:00".to_string()]);
        let req = base_request(fechas);
        assert!(matches!(
            normalize(&req, &Catalog),
            Err(QueryModelError::FutureDate(_))
        ));
    }

    #[test]
    fn rejects_malformed_date_key() {
        let mut fechas = BTreeMap::new();
        fechas.insert("not-a-date".to_string(), vec!["00:00".to_string()]);
        let req = base_request(fechas);
        assert!(matches!(
            normalize(&req, &Catalog),
            Err(QueryModelError::BadDateKey(_))
        ));
    }

    #[test]
    fn preserves_original_request_with_ymd_keys() {
        let mut fechas = BTreeMap::new();
        fechas.insert("20231026".to_string(), vec!["12:00".to_string()]);
        let req = base_request(fechas);
        let q = normalize(&req, &Catalog).unwrap();
        assert!(q.original_request.fechas.contains_key("20231026"));
    }

    #[test]
    fn normalize_is_idempotent_on_original_request() {
        let mut fechas = BTreeMap::new();
        fechas.insert("20231026".to_string(), vec!["12:00-12:05".to_string()]);
        let req = base_request(fechas);
        let first = normalize(&req, &Catalog).unwrap();
        let second = normalize(&first.original_request, &Catalog).unwrap();
        assert_eq!(first.fechas, second.fechas);
        assert_eq!(first.total_horas, second.total_horas);
    }
}
