//! Bucket name and remote product-path derivation.

use goes_types::{CanonicalQuery, DayKey, Level};

use crate::error::RemoteDiscoverError;

/// Resolves the public bucket name for `query`, `noaa-goes<NN>`, consulting the
/// query's earliest day key to resolve operational satellite aliases.
///
/// # Errors
///
/// Returns [`RemoteDiscoverError::NoDates`] if the query has no day keys, or
/// [`RemoteDiscoverError::BadDayKey`] if the earliest one cannot be parsed.
pub fn bucket_name(query: &CanonicalQuery) -> Result<String, RemoteDiscoverError> {
    let first_key = query.fechas.keys().next().ok_or(RemoteDiscoverError::NoDates)?;
    let day = DayKey::parse_jjj(first_key)?;
    let number = query.satellite.number_on(&day.to_ymd());
    Ok(format!("noaa-goes{number}"))
}

/// Builds the remote product path for `query`, optionally naming an L2 product
/// (`<SENSOR>-L1b-Rad<letter>` or `<SENSOR>-L2-<PROD><letter>`).
///
/// # Panics
///
/// Panics if `query.level` is `L2` and `product` is `None`: callers must partition
/// an L2 query into one [`crate::discover::DiscoverTarget`] per requested product
/// before building paths.
#[must_use]
pub fn product_path(query: &CanonicalQuery, product: Option<&str>) -> String {
    let letter = query.domain.letter();
    let sensor = query.sensor.as_upper();
    match query.level {
        Level::L1b => format!("{sensor}-L1b-Rad{letter}"),
        Level::L2 => {
            let product = product.expect("L2 product path requires a product code");
            format!("{sensor}-L2-{product}{letter}")
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use goes_types::{Domain, Request, Satellite, Selection, Sensor};
    use std::collections::BTreeMap;

    fn query_with_date(satellite: Satellite, day_key: &str) -> CanonicalQuery {
        let mut fechas = BTreeMap::new();
        fechas.insert(day_key.to_string(), vec![]);
        CanonicalQuery {
            satellite,
            sensor: Sensor::Abi,
            level: Level::L1b,
            domain: Domain::FullDisk,
            products: Selection::Specific(vec![]),
            bands: Selection::Specific(vec!["13".into()]),
            fechas,
            total_horas: 0.0,
            total_fechas_expandidas: 1,
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
            creado_por: None,
        }
    }

    #[test]
    fn resolves_literal_satellite_number() {
        let q = query_with_date(Satellite::Goes18, "2023299");
        assert_eq!(bucket_name(&q).unwrap(), "noaa-goes18");
    }

    #[test]
    fn resolves_goes_east_alias_by_cutover() {
        let before = query_with_date(Satellite::GoesEast, "2024001");
        assert_eq!(bucket_name(&before).unwrap(), "noaa-goes16");

        let after = query_with_date(Satellite::GoesEast, "2025120");
        assert_eq!(bucket_name(&after).unwrap(), "noaa-goes19");
    }

    #[test]
    fn builds_l1b_product_path() {
        let q = query_with_date(Satellite::Goes16, "2023299");
        assert_eq!(product_path(&q, None), "ABI-L1b-RadF");
    }

    #[test]
    fn builds_l2_product_path() {
        let mut q = query_with_date(Satellite::Goes16, "2023299");
        q.level = Level::L2;
        q.domain = Domain::Conus;
        assert_eq!(product_path(&q, Some("CMIP")), "ABI-L2-CMIPC");
    }
}
