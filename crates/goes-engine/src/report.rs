//! Final-report construction: classifying destination files by source and
//! counting them per product.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use goes_store::{QueryReport, SourceBreakdown, SourceSummary};

use crate::error::EngineError;

/// Strips the trailing domain-letter token (`C`, `F`, `M1`, `M2`) a product
/// code picks up in a filename, then folds sensor-specific aliases onto their
/// canonical product name.
///
/// `CODD`/`CODN` (day/night cloud optical depth) both count as `COD`;
/// `CPSD`/`CPSN` as `CPS`; `VAAF` as `VAA`.
#[must_use]
pub fn normalize_product_code(raw: &str) -> String {
    let stripped = raw
        .strip_suffix("M1")
        .or_else(|| raw.strip_suffix("M2"))
        .or_else(|| raw.strip_suffix('C'))
        .or_else(|| raw.strip_suffix('F'))
        .unwrap_or(raw);

    match stripped {
        "CODD" | "CODN" => "COD".to_string(),
        "CPSD" | "CPSN" => "CPS".to_string(),
        "VAAF" => "VAA".to_string(),
        other => other.to_string(),
    }
}

/// Extracts the product token from a GOES filename, the segment between
/// `-L2-` (or `-L1b-Rad` for radiance products) and the following `-` or `_`.
fn extract_product_token(filename: &str) -> Option<String> {
    if let Some(rest) = filename.split_once("-L2-").map(|(_, r)| r) {
        let end = rest.find(['-', '_']).unwrap_or(rest.len());
        return Some(rest[..end].to_string());
    }
    if filename.contains("-L1b-Rad") {
        return Some("Rad".to_string());
    }
    None
}

/// Builds the final [`QueryReport`] from the destination directory's contents,
/// classifying each file as S3-origin (its path is in `downloaded_s3`) or
/// local-origin (everything else).
///
/// # Errors
///
/// Returns [`EngineError::ScanDestination`] if `dest` cannot be read.
pub fn build_report(
    dest: &Path,
    downloaded_s3: &[PathBuf],
    recovery_request: Option<goes_types::Request>,
    started_at: DateTime<Utc>,
    now: DateTime<Utc>,
    report_list_cap: usize,
) -> Result<QueryReport, EngineError> {
    let s3_set: std::collections::HashSet<&Path> =
        downloaded_s3.iter().map(PathBuf::as_path).collect();

    let mut lustre = SourceSummary::default();
    let mut s3 = SourceSummary::default();
    let mut counts: HashMap<String, u64> = HashMap::new();
    let mut counts_s3: HashMap<String, u64> = HashMap::new();
    let mut total_bytes: u64 = 0;

    let entries = std::fs::read_dir(dest).map_err(|e| EngineError::ScanDestination {
        path: dest.to_path_buf(),
        source: e,
    })?;

    for entry in entries {
        let entry = entry.map_err(|e| EngineError::ScanDestination {
            path: dest.to_path_buf(),
            source: e,
        })?;
        let path = entry.path();
        if !path.is_file() {
            continue;
        }
        total_bytes += entry.metadata().map(|m| m.len()).unwrap_or(0);

        let filename = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();

        let is_s3 = s3_set.contains(path.as_path());
        let summary = if is_s3 { &mut s3 } else { &mut lustre };
        summary.total += 1;
        if summary.archivos.len() < report_list_cap {
            summary.archivos.push(filename.clone());
        }

        if let Some(token) = extract_product_token(&filename) {
            let code = normalize_product_code(&token);
            *counts.entry(code.clone()).or_insert(0) += 1;
            if is_s3 {
                *counts_s3.entry(code).or_insert(0) += 1;
            }
        }
    }

    let total_archivos = lustre.total + s3.total;
    let duracion_procesamiento = (now - started_at).num_milliseconds() as f64 / 1000.0;

    Ok(QueryReport {
        fuentes: SourceBreakdown { lustre, s3 },
        conteo_por_producto: counts,
        conteo_por_producto_s3: counts_s3,
        total_archivos,
        total_mb: total_bytes as f64 / 1024.0 / 1024.0,
        ruta_destino: dest.to_path_buf(),
        timestamp_procesamiento: now,
        duracion_procesamiento,
        consulta_recuperacion: recovery_request,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalizes_day_night_cod_aliases() {
        assert_eq!(normalize_product_code("CODDC"), "COD");
        assert_eq!(normalize_product_code("CODNF"), "COD");
        assert_eq!(normalize_product_code("CPSDM1"), "CPS");
        assert_eq!(normalize_product_code("VAAFC"), "VAA");
    }

    #[test]
    fn leaves_unaliased_products_alone_after_stripping_domain() {
        assert_eq!(normalize_product_code("ACHAC"), "ACHA");
        assert_eq!(normalize_product_code("CMIPF"), "CMIP");
    }

    #[test]
    fn extracts_product_token_from_l2_filename() {
        let name = "OR_ABI-L2-CMIPC-M6C13_G16_s20232991200217_e20232991209594.nc";
        assert_eq!(extract_product_token(name).as_deref(), Some("CMIPC"));
    }

    #[test]
    fn extracts_rad_token_from_l1b_filename() {
        let name = "OR_ABI-L1b-RadF-M6C13_G16_s20232991200217_e20232991209594.nc";
        assert_eq!(extract_product_token(name).as_deref(), Some("Rad"));
    }

    #[test]
    fn build_report_classifies_s3_vs_local_files() {
        let dir = tempfile::TempDir::new().unwrap();
        let local_file = dir.path().join("OR_ABI-L2-ACHAC-M6_G16_s1.nc");
        let s3_file = dir.path().join("OR_ABI-L2-ACHAC-M6_G16_s2.nc");
        std::fs::write(&local_file, b"abc").unwrap();
        std::fs::write(&s3_file, b"abcd").unwrap();

        let now = Utc::now();
        let report = build_report(dir.path(), &[s3_file.clone()], None, now, now, 200).unwrap();
        assert_eq!(report.total_archivos, 2);
        assert_eq!(report.fuentes.lustre.total, 1);
        assert_eq!(report.fuentes.s3.total, 1);
        assert_eq!(report.conteo_por_producto.get("ACHA"), Some(&2));
        assert_eq!(report.conteo_por_producto_s3.get("ACHA"), Some(&1));
    }
}
