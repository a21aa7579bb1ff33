//! Satellite, sensor, processing level, and domain identifiers.

use serde::{Deserialize, Serialize};

use crate::error::QueryModelError;

/// The date (as `YYYYMMDD`) GOES-East operations transferred from GOES-16 to GOES-19.
///
/// Requests naming the operational alias `GOES-EAST` resolve to GOES-16 before this
/// date and GOES-19 on or after it.
pub const GOES_EAST_CUTOVER: &str = "20250404";

/// A GOES satellite, either named directly or by operational alias.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Satellite {
    /// GOES-16, fixed at GOES-East prior to the 2025 cutover.
    Goes16,
    /// GOES-18, the current GOES-West satellite.
    Goes18,
    /// GOES-19, the current GOES-East satellite.
    Goes19,
    /// The operational "GOES-East" slot; resolves to a literal satellite by date.
    GoesEast,
    /// The operational "GOES-West" slot; currently always GOES-18.
    GoesWest,
}

impl Satellite {
    /// Parses a satellite name such as `GOES-16` or `GOES-EAST` (case-insensitive).
    ///
    /// # Errors
    ///
    /// Returns [`QueryModelError::UnknownSatellite`] if `s` does not match a known
    /// satellite or alias.
    pub fn parse(s: &str) -> Result<Self, QueryModelError> {
        match s.to_ascii_uppercase().as_str() {
            "GOES-16" | "GOES16" => Ok(Self::Goes16),
            "GOES-18" | "GOES18" => Ok(Self::Goes18),
            "GOES-19" | "GOES19" => Ok(Self::Goes19),
            "GOES-EAST" | "GOESEAST" => Ok(Self::GoesEast),
            "GOES-WEST" | "GOESWEST" => Ok(Self::GoesWest),
            other => Err(QueryModelError::UnknownSatellite(other.to_string())),
        }
    }

    /// Resolves this satellite to a literal two-digit number, consulting `reference_date`
    /// (a `YYYYMMDD` string) for the operational aliases.
    #[must_use]
    pub fn number_on(&self, reference_date: &str) -> u8 {
        match self {
            Self::Goes16 => 16,
            Self::Goes18 => 18,
            Self::Goes19 => 19,
            Self::GoesWest => 18,
            Self::GoesEast => {
                if reference_date >= GOES_EAST_CUTOVER {
                    19
                } else {
                    16
                }
            }
        }
    }

    /// The default satellite assumed when a request omits `sat`.
    #[must_use]
    pub const fn default_satellite() -> Self {
        Self::GoesEast
    }
}

impl std::fmt::Display for Satellite {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Goes16 => "GOES-16",
            Self::Goes18 => "GOES-18",
            Self::Goes19 => "GOES-19",
            Self::GoesEast => "GOES-EAST",
            Self::GoesWest => "GOES-WEST",
        };
        write!(f, "{s}")
    }
}

/// An instrument carried by the satellite.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sensor {
    /// Advanced Baseline Imager.
    Abi,
    /// Solar Ultraviolet Imager.
    Suvi,
    /// Geostationary Lightning Mapper.
    Glm,
}

impl Sensor {
    /// Parses a sensor id (case-insensitive).
    ///
    /// # Errors
    ///
    /// Returns [`QueryModelError::UnknownSensor`] if `s` is not `abi`, `suvi`, or `glm`.
    pub fn parse(s: &str) -> Result<Self, QueryModelError> {
        match s.to_ascii_lowercase().as_str() {
            "abi" => Ok(Self::Abi),
            "suvi" => Ok(Self::Suvi),
            "glm" => Ok(Self::Glm),
            other => Err(QueryModelError::UnknownSensor(other.to_string())),
        }
    }

    /// Returns the sensor id as a lowercase string slice.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Abi => "abi",
            Self::Suvi => "suvi",
            Self::Glm => "glm",
        }
    }

    /// Returns the sensor id as the uppercase token used in filenames (`ABI`).
    #[must_use]
    pub const fn as_upper(&self) -> &'static str {
        match self {
            Self::Abi => "ABI",
            Self::Suvi => "SUVI",
            Self::Glm => "GLM",
        }
    }
}

impl std::fmt::Display for Sensor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Processing level of the requested products.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Level {
    /// Level 1b: calibrated, navigated radiances per band.
    L1b,
    /// Level 2: derived geophysical products.
    L2,
}

impl Level {
    /// Parses a level name (`L1b`/`L2`, case-insensitive).
    ///
    /// # Errors
    ///
    /// Returns [`QueryModelError::UnknownLevel`] if `s` is neither `L1b` nor `L2`.
    pub fn parse(s: &str) -> Result<Self, QueryModelError> {
        match s.to_ascii_uppercase().as_str() {
            "L1B" => Ok(Self::L1b),
            "L2" => Ok(Self::L2),
            other => Err(QueryModelError::UnknownLevel(other.to_string())),
        }
    }

    /// Returns the level name as used in archive paths (`l1b`/`l2`).
    #[must_use]
    pub const fn as_path_segment(&self) -> &'static str {
        match self {
            Self::L1b => "l1b",
            Self::L2 => "l2",
        }
    }
}

impl std::fmt::Display for Level {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::L1b => "L1b",
            Self::L2 => "L2",
        };
        write!(f, "{s}")
    }
}

/// Geographic domain of the scan.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Domain {
    /// Full disk.
    FullDisk,
    /// Continental US subframe.
    Conus,
}

impl Domain {
    /// Parses a domain name (`fd`/`conus`, case-insensitive).
    ///
    /// # Errors
    ///
    /// Returns [`QueryModelError::UnknownDomain`] if `s` is neither `fd` nor `conus`.
    pub fn parse(s: &str) -> Result<Self, QueryModelError> {
        match s.to_ascii_lowercase().as_str() {
            "fd" => Ok(Self::FullDisk),
            "conus" => Ok(Self::Conus),
            other => Err(QueryModelError::UnknownDomain(other.to_string())),
        }
    }

    /// Returns the domain name as used in archive paths (`fd`/`conus`).
    #[must_use]
    pub const fn as_path_segment(&self) -> &'static str {
        match self {
            Self::FullDisk => "fd",
            Self::Conus => "conus",
        }
    }

    /// Returns the single-letter domain code used in filenames and remote product paths.
    #[must_use]
    pub const fn letter(&self) -> char {
        match self {
            Self::FullDisk => 'F',
            Self::Conus => 'C',
        }
    }
}

impl std::fmt::Display for Domain {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::FullDisk => "fd",
            Self::Conus => "conus",
        };
        write!(f, "{s}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_satellite_aliases() {
        assert_eq!(Satellite::parse("goes-16").unwrap(), Satellite::Goes16);
        assert_eq!(Satellite::parse("GOES-EAST").unwrap(), Satellite::GoesEast);
        assert!(Satellite::parse("goes-99").is_err());
    }

    #[test]
    fn resolves_goes_east_by_cutover_date() {
        let east = Satellite::GoesEast;
        assert_eq!(east.number_on("20240101"), 16);
        assert_eq!(east.number_on("20250404"), 19);
        assert_eq!(east.number_on("20300101"), 19);
    }

    #[test]
    fn goes_west_is_always_18() {
        assert_eq!(Satellite::GoesWest.number_on("20200101"), 18);
    }

    #[test]
    fn parses_sensor_and_level_and_domain() {
        assert_eq!(Sensor::parse("ABI").unwrap(), Sensor::Abi);
        assert_eq!(Level::parse("l1b").unwrap(), Level::L1b);
        assert_eq!(Domain::parse("CONUS").unwrap(), Domain::Conus);
        assert_eq!(Domain::FullDisk.letter(), 'F');
        assert_eq!(Domain::Conus.letter(), 'C');
    }
}
