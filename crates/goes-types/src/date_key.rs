//! Day-key representations: `YYYYMMDD` (presentation) and `YYYYJJJ` (canonical, Julian).

use chrono::{Datelike, NaiveDate};

use crate::error::QueryModelError;

/// A calendar day identified by year and day-of-year, stored internally as `YYYYJJJ`.
///
/// This is the canonical form used throughout the query model and archive path
/// construction. Use [`DayKey::to_ymd`] to recover the `YYYYMMDD` presentation form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DayKey {
    year: i32,
    day_of_year: u16,
}

impl DayKey {
    /// Builds a day key from a `YYYYMMDD` string.
    ///
    /// # Errors
    ///
    /// Returns [`QueryModelError::BadDateKey`] if `s` is not eight ASCII digits
    /// forming a valid Gregorian date.
    pub fn parse_ymd(s: &str) -> Result<Self, QueryModelError> {
        if s.len() != 8 || !s.bytes().all(|b| b.is_ascii_digit()) {
            return Err(QueryModelError::BadDateKey(s.to_string()));
        }
        let year: i32 = s[0..4]
            .parse()
            .map_err(|_| QueryModelError::BadDateKey(s.to_string()))?;
        let month: u32 = s[4..6]
            .parse()
            .map_err(|_| QueryModelError::BadDateKey(s.to_string()))?;
        let day: u32 = s[6..8]
            .parse()
            .map_err(|_| QueryModelError::BadDateKey(s.to_string()))?;
        let date = NaiveDate::from_ymd_opt(year, month, day)
            .ok_or_else(|| QueryModelError::BadDateKey(s.to_string()))?;
        Ok(Self::from_naive_date(date))
    }

    /// Builds a day key from a `YYYYJJJ` string.
    ///
    /// # Errors
    ///
    /// Returns [`QueryModelError::BadDateKey`] if `s` is not seven ASCII digits
    /// with `JJJ` in `001..=366` (and valid for `year`'s length).
    pub fn parse_jjj(s: &str) -> Result<Self, QueryModelError> {
        if s.len() != 7 || !s.bytes().all(|b| b.is_ascii_digit()) {
            return Err(QueryModelError::BadDateKey(s.to_string()));
        }
        let year: i32 = s[0..4]
            .parse()
            .map_err(|_| QueryModelError::BadDateKey(s.to_string()))?;
        let day_of_year: u16 = s[4..7]
            .parse()
            .map_err(|_| QueryModelError::BadDateKey(s.to_string()))?;
        let key = Self { year, day_of_year };
        // Round-trip through NaiveDate to reject e.g. day 366 in a common year.
        key.to_naive_date()
            .ok_or_else(|| QueryModelError::BadDateKey(s.to_string()))?;
        Ok(key)
    }

    /// Builds a day key from a [`chrono::NaiveDate`].
    #[must_use]
    pub fn from_naive_date(date: NaiveDate) -> Self {
        Self {
            year: date.year(),
            day_of_year: u16::try_from(date.ordinal()).unwrap_or(0),
        }
    }

    /// Returns the underlying calendar date, or `None` if the day-of-year is out of
    /// range for this year's length.
    #[must_use]
    pub fn to_naive_date(&self) -> Option<NaiveDate> {
        NaiveDate::from_yo_opt(self.year, u32::from(self.day_of_year))
    }

    /// Formats this day key as `YYYYMMDD`.
    #[must_use]
    pub fn to_ymd(&self) -> String {
        self.to_naive_date().map_or_else(
            || format!("{:04}{:03}", self.year, self.day_of_year),
            |d| d.format("%Y%m%d").to_string(),
        )
    }

    /// Formats this day key as `YYYYJJJ`.
    #[must_use]
    pub fn to_jjj(&self) -> String {
        format!("{:04}{:03}", self.year, self.day_of_year)
    }

    /// The four-digit year.
    #[must_use]
    pub const fn year(&self) -> i32 {
        self.year
    }

    /// The one-based day of year (`1..=366`).
    #[must_use]
    pub const fn day_of_year(&self) -> u16 {
        self.day_of_year
    }

    /// Returns the next calendar day, or `None` at the representable boundary.
    #[must_use]
    pub fn succ(&self) -> Option<Self> {
        self.to_naive_date()
            .and_then(|d| d.succ_opt())
            .map(Self::from_naive_date)
    }

    /// One-based ISO-unrelated week-of-year index used by the archive directory layout:
    /// `((day_of_year - 1) / 7) + 1`. This intentionally yields 53 in common years and
    /// is not an ISO-8601 week number.
    #[must_use]
    pub const fn archive_week(&self) -> u16 {
        ((self.day_of_year - 1) / 7) + 1
    }
}

impl std::fmt::Display for DayKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.to_jjj())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ymd_jjj_round_trip() {
        let k = DayKey::parse_ymd("20231026").unwrap();
        assert_eq!(k.to_jjj(), "2023299");
        assert_eq!(DayKey::parse_jjj("2023299").unwrap().to_ymd(), "20231026");
    }

    #[test]
    fn rejects_malformed_keys() {
        assert!(DayKey::parse_ymd("2023-10-26").is_err());
        assert!(DayKey::parse_ymd("20231301").is_err());
        assert!(DayKey::parse_jjj("2023400").is_err());
    }

    #[test]
    fn no_rollover_at_year_end() {
        let k = DayKey::parse_ymd("20231231").unwrap();
        assert_eq!(k.to_jjj(), "2023365");
        assert_eq!(k.year(), 2023);
    }

    #[test]
    fn archive_week_matches_layout_formula() {
        // Day 1 -> week 1, day 7 -> week 1, day 8 -> week 2.
        let jan1 = DayKey::parse_ymd("20230101").unwrap();
        assert_eq!(jan1.archive_week(), 1);
        let jan8 = DayKey::parse_ymd("20230108").unwrap();
        assert_eq!(jan8.archive_week(), 2);
        // Day 365 in a common year -> week 53, not an ISO week.
        let dec31 = DayKey::parse_ymd("20231231").unwrap();
        assert_eq!(dec31.archive_week(), 53);
    }
}
