//! Time handling for forecast/history queries.

use chrono::{DateTime, NaiveDateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{RadarError, RadarResult};

/// A UTC time window for data queries.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TimeRange {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl TimeRange {
    /// Create a time range, enforcing `start <= end`.
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> RadarResult<Self> {
        if start > end {
            return Err(RadarError::invalid_region(format!(
                "time range start {} after end {}",
                start, end
            )));
        }
        Ok(Self { start, end })
    }

    pub fn contains(&self, dt: &DateTime<Utc>) -> bool {
        dt >= &self.start && dt <= &self.end
    }

    /// Total span in whole hours.
    pub fn hours(&self) -> i64 {
        (self.end - self.start).num_hours()
    }
}

/// Parse a UTC timestamp from RFC 3339, "YYYY-MM-DDTHH:MM:SS", or a bare
/// date (midnight).
pub fn parse_utc(s: &str) -> RadarResult<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Ok(dt.with_timezone(&Utc));
    }

    if let Ok(ndt) = NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S") {
        return Ok(Utc.from_utc_datetime(&ndt));
    }

    if let Ok(ndt) = NaiveDateTime::parse_from_str(&format!("{}T00:00:00", s), "%Y-%m-%dT%H:%M:%S")
    {
        return Ok(Utc.from_utc_datetime(&ndt));
    }

    Err(RadarError::invalid_region(format!(
        "invalid time format: {}",
        s
    )))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Timelike;

    #[test]
    fn test_range_ordering() {
        let start = parse_utc("2026-08-01T00:00:00Z").unwrap();
        let end = parse_utc("2026-08-03T00:00:00Z").unwrap();

        let range = TimeRange::new(start, end).unwrap();
        assert_eq!(range.hours(), 48);
        assert!(TimeRange::new(end, start).is_err());
    }

    #[test]
    fn test_parse_formats() {
        assert_eq!(parse_utc("2026-08-01T12:30:00Z").unwrap().hour(), 12);
        assert_eq!(parse_utc("2026-08-01T12:30:00").unwrap().hour(), 12);
        assert_eq!(parse_utc("2026-08-01").unwrap().hour(), 0);
        assert!(parse_utc("yesterday").is_err());
    }

    #[test]
    fn test_contains() {
        let range = TimeRange::new(
            parse_utc("2026-08-01").unwrap(),
            parse_utc("2026-08-02").unwrap(),
        )
        .unwrap();
        assert!(range.contains(&parse_utc("2026-08-01T06:00:00Z").unwrap()));
        assert!(!range.contains(&parse_utc("2026-08-02T06:00:00Z").unwrap()));
    }
}
