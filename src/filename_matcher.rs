//! Capture time recovery from filename conventions.
//!
//! Two conventions are recognised:
//! - messenger exports named `mmexport<unix seconds>` (e.g. `mmexport1681545600123.jpg`)
//! - names that embed a formatted timestamp (e.g. `IMG_20230415_123045.jpg`)
//!
//! Timestamp patterns are kept in a `Vec`, and the first pattern in declaration
//! order that yields a valid date wins.

use chrono::format::{Item, StrftimeItems};
use chrono::{Local, NaiveDate, NaiveDateTime, NaiveTime, TimeZone};
use regex::Regex;
use tracing::debug;

/// Built-in timestamp patterns, in priority order: `(regex, chrono format)`.
pub const DEFAULT_TIMESTAMP_PATTERNS: &[(&str, &str)] = &[
    (r"\d{8}_\d{6}", "%Y%m%d_%H%M%S"),
    (r"\d{4}-\d{2}-\d{2} \d{2}\.\d{2}\.\d{2}", "%Y-%m-%d %H.%M.%S"),
];

const EXPORT_CODE_PATTERN: &str = r"mmexport(1\d{9})";

/// Errors raised when compiling a timestamp pattern.
#[derive(Debug, thiserror::Error)]
pub enum PatternError {
    #[error("invalid regex pattern '{pattern}': {reason}")]
    InvalidRegex { pattern: String, reason: String },
    #[error("invalid time format '{0}'")]
    InvalidFormat(String),
}

/// Matches `mmexport` followed by a ten-digit Unix timestamp starting with `1`.
#[derive(Debug, Clone)]
pub struct ExportCodeMatcher {
    regex: Regex,
}

impl ExportCodeMatcher {
    pub fn new() -> Self {
        Self {
            regex: Regex::new(EXPORT_CODE_PATTERN).expect("Invalid export code pattern"),
        }
    }

    /// Returns the local capture time encoded in `file_name`, if any.
    pub fn match_name(&self, file_name: &str) -> Option<NaiveDateTime> {
        let captures = self.regex.captures(file_name)?;
        let seconds: i64 = captures[1].parse().ok()?;
        let local = Local.timestamp_opt(seconds, 0).single()?;
        Some(local.naive_local())
    }
}

impl Default for ExportCodeMatcher {
    fn default() -> Self {
        Self::new()
    }
}

/// A compiled `{regex, time format}` pair.
#[derive(Debug, Clone)]
pub struct TimestampPattern {
    regex: Regex,
    format: String,
}

impl TimestampPattern {
    /// Compiles a pattern, validating both the regex and the chrono format.
    pub fn new(pattern: &str, format: &str) -> Result<Self, PatternError> {
        let regex = Regex::new(pattern).map_err(|e| PatternError::InvalidRegex {
            pattern: pattern.to_string(),
            reason: e.to_string(),
        })?;

        if format.is_empty() || StrftimeItems::new(format).any(|item| matches!(item, Item::Error)) {
            return Err(PatternError::InvalidFormat(format.to_string()));
        }

        Ok(Self {
            regex,
            format: format.to_string(),
        })
    }

    pub fn as_str(&self) -> &str {
        self.regex.as_str()
    }

    /// Returns the first match in `file_name` that parses as a valid time.
    fn find(&self, file_name: &str) -> Option<NaiveDateTime> {
        self.regex.find_iter(file_name).find_map(|m| {
            match parse_timestamp(m.as_str(), &self.format) {
                Ok(time) => Some(time),
                Err(e) => {
                    debug!(
                        pattern = self.regex.as_str(),
                        text = m.as_str(),
                        error = %e,
                        "timestamp-like text does not parse"
                    );
                    None
                }
            }
        })
    }
}

/// Parses `text` with `format`. Date-only formats resolve to midnight.
fn parse_timestamp(text: &str, format: &str) -> Result<NaiveDateTime, chrono::ParseError> {
    NaiveDateTime::parse_from_str(text, format).or_else(|err| {
        NaiveDate::parse_from_str(text, format)
            .map(|date| date.and_time(NaiveTime::MIN))
            .map_err(|_| err)
    })
}

/// Tries an ordered list of timestamp patterns against a file name.
#[derive(Debug, Clone)]
pub struct TimestampNameMatcher {
    patterns: Vec<TimestampPattern>,
}

impl TimestampNameMatcher {
    /// Creates a matcher from already compiled patterns, keeping their order.
    pub fn new(patterns: Vec<TimestampPattern>) -> Self {
        Self { patterns }
    }

    /// Compiles `(regex, format)` pairs in order.
    pub fn from_pairs<'a, I>(pairs: I) -> Result<Self, PatternError>
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        let patterns = pairs
            .into_iter()
            .map(|(pattern, format)| TimestampPattern::new(pattern, format))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self::new(patterns))
    }

    pub fn patterns(&self) -> &[TimestampPattern] {
        &self.patterns
    }

    /// Returns the capture time from the first pattern that matches and parses.
    ///
    /// A pattern whose match does not form a valid date counts as a miss and
    /// the next pattern is tried.
    pub fn match_name(&self, file_name: &str) -> Option<NaiveDateTime> {
        self.patterns
            .iter()
            .find_map(|pattern| pattern.find(file_name))
    }
}

impl Default for TimestampNameMatcher {
    fn default() -> Self {
        let patterns = DEFAULT_TIMESTAMP_PATTERNS
            .iter()
            .filter_map(|(pattern, format)| TimestampPattern::new(pattern, format).ok())
            .collect();
        Self::new(patterns)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Datelike, NaiveDate, Timelike};

    #[test]
    fn test_export_code_matches_anywhere_in_name() {
        let matcher = ExportCodeMatcher::new();
        let expected = Local
            .timestamp_opt(1_681_545_600, 0)
            .single()
            .unwrap()
            .naive_local();

        assert_eq!(matcher.match_name("mmexport1681545600.jpg"), Some(expected));
        assert_eq!(
            matcher.match_name("copy of mmexport1681545600123.jpg"),
            Some(expected)
        );
    }

    #[test]
    fn test_export_code_requires_leading_one() {
        let matcher = ExportCodeMatcher::new();
        assert_eq!(matcher.match_name("mmexport2681545600.jpg"), None);
        assert_eq!(matcher.match_name("mmexport16815.jpg"), None);
        assert_eq!(matcher.match_name("IMG_0001.jpg"), None);
    }

    #[test]
    fn test_export_code_mid_month_lands_in_expected_month() {
        // 2023-04-15 00:00:00 UTC, far enough from a month boundary for any zone
        let matcher = ExportCodeMatcher::new();
        let time = matcher.match_name("mmexport1681516800.jpg").unwrap();
        assert_eq!((time.year(), time.month()), (2023, 4));
    }

    #[test]
    fn test_default_patterns_compact_layout() {
        let matcher = TimestampNameMatcher::default();
        let time = matcher.match_name("IMG_20230415_123045.jpg").unwrap();
        assert_eq!(
            time,
            NaiveDate::from_ymd_opt(2023, 4, 15)
                .unwrap()
                .and_hms_opt(12, 30, 45)
                .unwrap()
        );
    }

    #[test]
    fn test_default_patterns_dotted_layout() {
        let matcher = TimestampNameMatcher::default();
        let time = matcher.match_name("Screenshot 2022-11-03 08.15.00.png").unwrap();
        assert_eq!((time.year(), time.month(), time.hour()), (2022, 11, 8));
    }

    #[test]
    fn test_no_pattern_matches() {
        let matcher = TimestampNameMatcher::default();
        assert_eq!(matcher.match_name("holiday.jpg"), None);
    }

    #[test]
    fn test_invalid_date_is_a_miss_not_a_zero_time() {
        let matcher = TimestampNameMatcher::default();
        assert_eq!(matcher.match_name("IMG_20231345_990000.jpg"), None);
    }

    #[test]
    fn test_invalid_first_match_falls_through_to_next_pattern() {
        let matcher = TimestampNameMatcher::default();
        let time = matcher
            .match_name("IMG_20231399_000000 2021-06-01 10.00.00.jpg")
            .unwrap();
        assert_eq!((time.year(), time.month()), (2021, 6));
    }

    #[test]
    fn test_declaration_order_decides_between_overlapping_patterns() {
        let name = "20230415_123045 2019-01-02 03.04.05.jpg";

        let compact_first = TimestampNameMatcher::default();
        assert_eq!(compact_first.match_name(name).unwrap().year(), 2023);

        let dotted_first = TimestampNameMatcher::from_pairs([
            (r"\d{4}-\d{2}-\d{2} \d{2}\.\d{2}\.\d{2}", "%Y-%m-%d %H.%M.%S"),
            (r"\d{8}_\d{6}", "%Y%m%d_%H%M%S"),
        ])
        .unwrap();
        assert_eq!(dotted_first.match_name(name).unwrap().year(), 2019);
    }

    #[test]
    fn test_repeated_matching_is_deterministic() {
        let matcher = TimestampNameMatcher::default();
        let name = "20230415_123045 2019-01-02 03.04.05.jpg";
        let first = matcher.match_name(name);
        for _ in 0..50 {
            assert_eq!(matcher.match_name(name), first);
        }
    }

    #[test]
    fn test_invalid_regex_is_rejected() {
        let result = TimestampPattern::new("[unclosed(", "%Y");
        assert!(matches!(result, Err(PatternError::InvalidRegex { .. })));
    }

    #[test]
    fn test_invalid_format_is_rejected() {
        assert!(matches!(
            TimestampPattern::new(r"\d+", "%Y-%Q"),
            Err(PatternError::InvalidFormat(_))
        ));
        assert!(matches!(
            TimestampPattern::new(r"\d+", ""),
            Err(PatternError::InvalidFormat(_))
        ));
    }

    #[test]
    fn test_date_only_format_resolves_to_midnight() {
        let matcher = TimestampNameMatcher::from_pairs([(r"\d{4}\.\d{2}\.\d{2}", "%Y.%m.%d")]).unwrap();
        let time = matcher.match_name("scan 2019.08.20.png").expect("should match");
        assert_eq!(time.to_string(), "2019-08-20 00:00:00");
    }
}
