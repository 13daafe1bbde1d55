//! Engine time strings and time units.
//!
//! The engine exchanges timestamps as compact digit strings
//! (`YYYYMMDDhhmm`, optionally with seconds and milliseconds) and reports
//! its time unit by name.

use chrono::{Duration, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

use crate::error::{ProdriskError, ProdriskResult};

/// Parse an engine time string.
///
/// Accepts `YYYYMMDD`, `YYYYMMDDhh`, `YYYYMMDDhhmm`, `YYYYMMDDhhmmss` and
/// `YYYYMMDDhhmmssmmm`; surrounding whitespace is ignored.
pub fn parse_api_time(text: &str) -> ProdriskResult<NaiveDateTime> {
    let digits = text.trim();
    let invalid = || ProdriskError::InvalidTime(text.to_string());

    if !digits.bytes().all(|b| b.is_ascii_digit()) || ![8, 10, 12, 14, 17].contains(&digits.len())
    {
        return Err(invalid());
    }

    let field = |from: usize, to: usize| -> u32 {
        digits
            .get(from..to)
            .and_then(|s| s.parse().ok())
            .unwrap_or(0)
    };
    let year = digits[0..4].parse::<i32>().map_err(|_| invalid())?;

    NaiveDate::from_ymd_opt(year, field(4, 6), field(6, 8))
        .and_then(|date| date.and_hms_milli_opt(field(8, 10), field(10, 12), field(12, 14), field(14, 17)))
        .ok_or_else(invalid)
}

/// Format a timestamp as an engine time string (`YYYYMMDDhhmmss`).
pub fn format_api_time(time: &NaiveDateTime) -> String {
    time.format("%Y%m%d%H%M%S").to_string()
}

/// Granularity of the engine's time axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimeUnit {
    Hour,
    Minute,
    Second,
}

impl TimeUnit {
    /// Parse the unit name returned by the engine.
    pub fn parse(name: &str) -> ProdriskResult<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "hour" => Ok(TimeUnit::Hour),
            "minute" => Ok(TimeUnit::Minute),
            "second" => Ok(TimeUnit::Second),
            _ => Err(ProdriskError::UnexpectedTimeUnit(name.to_string())),
        }
    }

    pub fn seconds(&self) -> i64 {
        match self {
            TimeUnit::Hour => 3600,
            TimeUnit::Minute => 60,
            TimeUnit::Second => 1,
        }
    }

    pub fn duration(&self) -> Duration {
        Duration::seconds(self.seconds())
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            TimeUnit::Hour => "hour",
            TimeUnit::Minute => "minute",
            TimeUnit::Second => "second",
        }
    }
}

impl std::fmt::Display for TimeUnit {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(y: i32, m: u32, d: u32, h: u32, min: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d)
            .unwrap()
            .and_hms_opt(h, min, 0)
            .unwrap()
    }

    #[test]
    fn parses_minute_precision_strings() {
        assert_eq!(parse_api_time("202201010000").unwrap(), at(2022, 1, 1, 0, 0));
        assert_eq!(parse_api_time("202203151745").unwrap(), at(2022, 3, 15, 17, 45));
    }

    #[test]
    fn parses_shorter_and_longer_forms() {
        assert_eq!(parse_api_time("20220101").unwrap(), at(2022, 1, 1, 0, 0));
        assert_eq!(parse_api_time("2022010106").unwrap(), at(2022, 1, 1, 6, 0));
        assert_eq!(
            parse_api_time(" 20220101063000000 ").unwrap(),
            at(2022, 1, 1, 6, 30)
        );
    }

    #[test]
    fn rejects_malformed_strings() {
        assert!(matches!(
            parse_api_time(""),
            Err(ProdriskError::InvalidTime(_))
        ));
        assert!(parse_api_time("2022-01-01").is_err());
        assert!(parse_api_time("202213010000").is_err());
        assert!(parse_api_time("2022010100001").is_err());
    }

    #[test]
    fn formatted_time_extends_engine_start_string() {
        let formatted = format_api_time(&at(2022, 1, 1, 0, 0));
        assert_eq!(formatted, "20220101000000");
        assert!(formatted.starts_with("202201010000"));
        assert_eq!(parse_api_time(&formatted).unwrap(), at(2022, 1, 1, 0, 0));
    }

    #[test]
    fn time_units() {
        assert_eq!(TimeUnit::parse("hour").unwrap(), TimeUnit::Hour);
        assert_eq!(TimeUnit::parse("MINUTE").unwrap().seconds(), 60);
        assert_eq!(TimeUnit::Second.duration(), Duration::seconds(1));
        assert!(matches!(
            TimeUnit::parse("week"),
            Err(ProdriskError::UnexpectedTimeUnit(unit)) if unit == "week"
        ));
    }
}
