//! Per-archive processing: whole-copy or selective tar extraction.

use std::fs::File;
use std::path::{Path, PathBuf};

use flate2::read::GzDecoder;
use goes_types::{CanonicalQuery, Level, Selection};
use tar::Archive;

use crate::error::ArchiveError;

/// Processes one local archive against `query`, either copying it whole into
/// `dest_dir` or extracting only the matching members.
///
/// `full_bands`/`full_products` are the catalog's complete valid sets, used only to
/// decide whether the request amounts to "everything" (the whole-copy condition);
/// matching of individual members always uses `query`'s own band/product selection.
///
/// Safe to run inside a blocking worker: no shared mutable state, no I/O beyond the
/// given archive and destination directory.
///
/// # Errors
///
/// Returns [`ArchiveError::Open`]/[`ArchiveError::Read`] if the archive cannot be
/// opened or parsed as a gzip tar, [`ArchiveError::Copy`] if a whole-archive copy
/// fails, or [`ArchiveError::NoMatchingMembers`] if selective extraction matches
/// nothing.
pub fn process_archive(
    archive_path: &Path,
    dest_dir: &Path,
    query: &CanonicalQuery,
    full_bands: &[String],
    full_products: &[String],
) -> Result<Vec<PathBuf>, ArchiveError> {
    if is_whole_copy(query, full_bands, full_products) {
        return copy_whole(archive_path, dest_dir);
    }
    extract_selected(archive_path, dest_dir, query, full_bands, full_products)
}

fn is_whole_copy(query: &CanonicalQuery, full_bands: &[String], full_products: &[String]) -> bool {
    let all_bands = query.requested_all_bands(full_bands);
    match query.level {
        Level::L1b => all_bands,
        Level::L2 => all_bands && query.requested_all_products(full_products),
    }
}

fn copy_whole(archive_path: &Path, dest_dir: &Path) -> Result<Vec<PathBuf>, ArchiveError> {
    let file_name = archive_path.file_name().unwrap_or_default();
    let dest_path = dest_dir.join(file_name);
    std::fs::copy(archive_path, &dest_path).map_err(|e| ArchiveError::Copy {
        path: archive_path.to_path_buf(),
        source: e,
    })?;
    Ok(vec![dest_path])
}

fn extract_selected(
    archive_path: &Path,
    dest_dir: &Path,
    query: &CanonicalQuery,
    full_bands: &[String],
    full_products: &[String],
) -> Result<Vec<PathBuf>, ArchiveError> {
    let file = File::open(archive_path).map_err(|e| ArchiveError::Open {
        path: archive_path.to_path_buf(),
        source: e,
    })?;
    let mut tar = Archive::new(GzDecoder::new(file));
    let entries = tar.entries().map_err(|e| ArchiveError::Read {
        path: archive_path.to_path_buf(),
        source: e,
    })?;

    let products: Vec<String> = match &query.products {
        Selection::All => full_products.to_vec(),
        Selection::Specific(v) => v.clone(),
    };
    let all_bands_requested = query.requested_all_bands(full_bands);

    let mut extracted = Vec::new();
    for entry in entries {
        let mut entry = entry.map_err(|e| ArchiveError::Read {
            path: archive_path.to_path_buf(),
            source: e,
        })?;
        let name = entry
            .path()
            .map_err(|e| ArchiveError::Read {
                path: archive_path.to_path_buf(),
                source: e,
            })?
            .to_string_lossy()
            .into_owned();

        if !member_matches(&name, query.level, &query.bands, &products, all_bands_requested) {
            continue;
        }

        let member_name = Path::new(&name)
            .file_name()
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(&name));
        let dest_path = dest_dir.join(member_name);
        entry.unpack(&dest_path).map_err(|e| ArchiveError::Read {
            path: archive_path.to_path_buf(),
            source: e,
        })?;
        extracted.push(dest_path);
    }

    if extracted.is_empty() {
        return Err(ArchiveError::NoMatchingMembers {
            path: archive_path.to_path_buf(),
        });
    }
    Ok(extracted)
}

fn member_matches(
    name: &str,
    level: Level,
    bands: &Selection,
    products: &[String],
    all_bands_requested: bool,
) -> bool {
    match level {
        Level::L1b => bands
            .as_slice()
            .iter()
            .any(|b| name.contains(&format!("C{b}_"))),
        Level::L2 => products.iter().any(|product| {
            if !name.contains(&format!("-L2-{product}")) {
                return false;
            }
            if product.starts_with("CMI") && !all_bands_requested {
                bands.as_slice().iter().any(|b| name.contains(&format!("C{b}_")))
            } else {
                true
            }
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use goes_types::{Domain, Request, Satellite, Sensor};
    use std::collections::BTreeMap;
    use std::io::Write;
    use tempfile::TempDir;

    fn base_query(level: Level, products: Selection, bands: Selection) -> CanonicalQuery {
        CanonicalQuery {
            satellite: Satellite::Goes16,
            sensor: Sensor::Abi,
            level,
            domain: Domain::Conus,
            products,
            bands,
            fechas: BTreeMap::new(),
            total_horas: 0.0,
            total_fechas_expandidas: 0,
            original_request: Request {
                sat: None,
                sensor: None,
                nivel: None,
                dominio: "conus".into(),
                productos: None,
                bandas: None,
                fechas: BTreeMap::new(),
                creado_por: None,
                descripcion: None,
            },
            creado_por: None,
        }
    }

    fn full_bands() -> Vec<String> {
        (1..=16).map(|n| format!("{n:02}")).collect()
    }

    fn write_test_archive(path: &Path, members: &[&str]) {
        let file = File::create(path).unwrap();
        let encoder = flate2::write::GzEncoder::new(file, flate2::Compression::fast());
        let mut builder = tar::Builder::new(encoder);
        for member in members {
            let mut header = tar::Header::new_gnu();
            header.set_size(4);
            header.set_cksum();
            builder
                .append_data(&mut header, member, &b"data"[..])
                .unwrap();
        }
        builder.into_inner().unwrap().flush().unwrap();
    }

    #[test]
    fn whole_copy_when_all_bands_requested_l1b() {
        let dir = TempDir::new().unwrap();
        let archive = dir.path().join("archive.tgz");
        write_test_archive(&archive, &["ABI-L1b-RadC-M6C01_G16.nc"]);
        let dest = TempDir::new().unwrap();

        let query = base_query(Level::L1b, Selection::Specific(vec![]), Selection::Specific(full_bands()));
        let result = process_archive(&archive, dest.path(), &query, &full_bands(), &[]).unwrap();
        assert_eq!(result.len(), 1);
        assert!(result[0].ends_with("archive.tgz"));
    }

    #[test]
    fn selective_extraction_matches_only_requested_band() {
        let dir = TempDir::new().unwrap();
        let archive = dir.path().join("archive.tgz");
        write_test_archive(
            &archive,
            &[
                "OR_ABI-L2-CMIPC-M6C13_G16.nc",
                "OR_ABI-L2-CMIPC-M6C01_G16.nc",
            ],
        );
        let dest = TempDir::new().unwrap();

        let query = base_query(
            Level::L2,
            Selection::Specific(vec!["CMIP".into()]),
            Selection::Specific(vec!["13".into()]),
        );
        let result = process_archive(&archive, dest.path(), &query, &full_bands(), &["CMIP".into()]).unwrap();
        assert_eq!(result.len(), 1);
        assert!(result[0].to_string_lossy().contains("C13"));
    }

    #[test]
    fn non_cmi_product_ignores_band_selection() {
        let dir = TempDir::new().unwrap();
        let archive = dir.path().join("archive.tgz");
        write_test_archive(&archive, &["OR_ABI-L2-ACHAC-M6_G16.nc"]);
        let dest = TempDir::new().unwrap();

        let query = base_query(
            Level::L2,
            Selection::Specific(vec!["ACHA".into()]),
            Selection::Specific(vec!["13".into()]),
        );
        let result = process_archive(&archive, dest.path(), &query, &full_bands(), &["ACHA".into(), "CMIP".into()])
            .unwrap();
        assert_eq!(result.len(), 1);
    }

    #[test]
    fn no_matching_members_is_an_error() {
        let dir = TempDir::new().unwrap();
        let archive = dir.path().join("archive.tgz");
        write_test_archive(&archive, &["OR_ABI-L2-ACHAC-M6_G16.nc"]);
        let dest = TempDir::new().unwrap();

        let query = base_query(
            Level::L2,
            Selection::Specific(vec!["COD".into()]),
            Selection::Specific(vec!["13".into()]),
        );
        let err = process_archive(&archive, dest.path(), &query, &full_bands(), &["ACHA".into(), "COD".into()])
            .unwrap_err();
        assert!(matches!(err, ArchiveError::NoMatchingMembers { .. }));
    }
}
