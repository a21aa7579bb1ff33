//! Archive path and glob pattern construction.

use std::path::{Path, PathBuf};

use goes_types::{CanonicalQuery, DayKey, Sensor};

/// Builds the week-level archive directory for one day key:
/// `<root>/<sensor>/<level>/[<domain>/]<YYYY>/<WW>`.
///
/// The domain segment is omitted for [`Sensor::Glm`], which has no full-disk/CONUS
/// split.
#[must_use]
pub fn archive_dir(root: &Path, query: &CanonicalQuery, day: &DayKey) -> PathBuf {
    let mut dir = root
        .join(query.sensor.as_str())
        .join(query.level.as_path_segment());
    if query.sensor != Sensor::Glm {
        dir = dir.join(query.domain.as_path_segment());
    }
    dir.join(format!("{:04}", day.year()))
        .join(format!("{:02}", day.archive_week()))
}

/// Glob pattern matching archive names for one day key within its week directory:
/// `*<YYYY><JJJ>*.tgz`.
#[must_use]
pub fn archive_glob_pattern(dir: &Path, day: &DayKey) -> String {
    format!("{}/*{}*.tgz", dir.display(), day.to_jjj())
}
