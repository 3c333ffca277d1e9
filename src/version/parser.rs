//! Recovery of `(date, build_count)` from an existing version string.
//!
//! Two shapes are understood: the legacy `YYYY-MM-DD[-NNN]` pattern, and
//! versions produced from a `version_format` template combined with a
//! `date_format`. Template-driven parsing is heuristic: dot-separated
//! versions are split into segments and the first two are taken as the
//! date when there are three or more. Anything the template path cannot
//! place is retried against the legacy pattern.

use regex::Regex;

use super::template::{has_placeholder, BUILD_COUNT, CURRENT_DATE};

/// Date component and build counter recovered from a version string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedVersion {
    pub date: String,
    pub build_count: u32,
}

impl ParsedVersion {
    pub fn new(date: impl Into<String>, build_count: u32) -> Self {
        ParsedVersion {
            date: date.into(),
            build_count,
        }
    }
}

/// Result of parsing a version string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseOutcome {
    Parsed(ParsedVersion),
    Unparsable,
}

impl ParseOutcome {
    /// Converts the outcome into an `Option`, discarding the failure tag.
    pub fn parsed(self) -> Option<ParsedVersion> {
        match self {
            ParseOutcome::Parsed(parsed) => Some(parsed),
            ParseOutcome::Unparsable => None,
        }
    }

    pub fn is_parsed(&self) -> bool {
        matches!(self, ParseOutcome::Parsed(_))
    }
}

/// Outcome of the template-driven step, before the legacy fallback.
enum TemplateMatch {
    Matched(ParsedVersion),
    Rejected,
    NotApplicable,
}

/// Parses a version string into its date component and build count.
///
/// When both `version_format` and `date_format` are given, the template
/// path is tried first; otherwise only the legacy pattern is used.
/// The function is pure: it never consults the clock or the filesystem.
///
/// # Example
/// ```
/// use bumpcalver::version::parser::{parse_version, ParsedVersion};
///
/// let parsed = parse_version("25.Q4.001", Some("{current_date}.{build_count:03}"), Some("%y.Q%q"));
/// assert_eq!(parsed.parsed(), Some(ParsedVersion::new("25.Q4", 1)));
///
/// assert!(!parse_version("v1.0.0", Some("{current_date}"), Some("%Y")).is_parsed());
/// ```
pub fn parse_version(
    version: &str,
    version_format: Option<&str>,
    date_format: Option<&str>,
) -> ParseOutcome {
    if let (Some(version_format), Some(_)) = (version_format, date_format) {
        match match_template(version, version_format) {
            TemplateMatch::Matched(parsed) => return ParseOutcome::Parsed(parsed),
            TemplateMatch::Rejected => return ParseOutcome::Unparsable,
            TemplateMatch::NotApplicable => {}
        }
    }

    parse_legacy(version)
}

/// Matches the legacy `YYYY-MM-DD[-NNN]` shape.
pub fn parse_legacy(version: &str) -> ParseOutcome {
    let captures = Regex::new(r"^([0-9]{4}-[0-9]{2}-[0-9]{2})(?:-([0-9]+))?")
        .ok()
        .and_then(|re| re.captures(version));

    let Some(captures) = captures else {
        return ParseOutcome::Unparsable;
    };

    let date = captures.get(1).map(|m| m.as_str()).unwrap_or_default();
    let count = match captures.get(2) {
        Some(count) => match parse_count(count.as_str()) {
            Some(count) => count,
            None => return ParseOutcome::Unparsable,
        },
        None => 0,
    };

    ParseOutcome::Parsed(ParsedVersion::new(date, count))
}

/// Removes a trailing `.alpha`, `.beta` or `.rcN` pre-release marker.
pub fn strip_prerelease_suffix(version: &str) -> &str {
    Regex::new(r"\.(alpha|beta|rc[0-9]*)$")
        .ok()
        .and_then(|re| re.find(version))
        .map(|m| &version[..m.start()])
        .unwrap_or(version)
}

fn match_template(version: &str, version_format: &str) -> TemplateMatch {
    // SemVer-style and release-named versions are never calendar versions.
    if version.starts_with('v') || version.starts_with("release") {
        return TemplateMatch::Rejected;
    }

    if !has_placeholder(version_format, CURRENT_DATE) {
        return TemplateMatch::NotApplicable;
    }

    let clean = strip_prerelease_suffix(version);

    if !has_placeholder(version_format, BUILD_COUNT) {
        return if matches_regex(r"^[0-9]+[.\-/]", clean) {
            TemplateMatch::Matched(ParsedVersion::new(clean, 0))
        } else {
            TemplateMatch::Rejected
        };
    }

    if !version_format.contains('.') {
        return TemplateMatch::NotApplicable;
    }

    let format_segments = version_format.split('.').count();
    let segments: Vec<&str> = clean.split('.').collect();

    if segments.len() < format_segments {
        return TemplateMatch::NotApplicable;
    }

    let (date, count, year_pattern) = if segments.len() >= 3 {
        (
            format!("{}.{}", segments[0], segments[1]),
            segments[2],
            r"^[0-9]{2,4}$",
        )
    } else {
        (segments[0].to_string(), segments[1], r"^[0-9]{2,4}")
    };

    if !matches_regex(year_pattern, segments[0]) {
        return TemplateMatch::Rejected;
    }

    match parse_count(count) {
        Some(count) => TemplateMatch::Matched(ParsedVersion::new(date, count)),
        // A non-numeric count is final; the legacy pattern is not retried.
        None => TemplateMatch::Rejected,
    }
}

fn matches_regex(pattern: &str, text: &str) -> bool {
    Regex::new(pattern)
        .map(|re| re.is_match(text))
        .unwrap_or(false)
}

fn parse_count(text: &str) -> Option<u32> {
    if text.is_empty() || !text.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    text.parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rstest::rstest;

    const DOTTED: &str = "{current_date}.{build_count:03}";

    fn parse(version: &str, version_format: &str, date_format: &str) -> Option<ParsedVersion> {
        parse_version(version, Some(version_format), Some(date_format)).parsed()
    }

    #[test]
    fn test_legacy_with_count() {
        assert_eq!(
            parse_version("2023-10-05-001", None, None).parsed(),
            Some(ParsedVersion::new("2023-10-05", 1))
        );
    }

    #[test]
    fn test_legacy_date_only() {
        assert_eq!(
            parse_version("2023-10-05", None, None).parsed(),
            Some(ParsedVersion::new("2023-10-05", 0))
        );
    }

    #[test]
    fn test_legacy_rejects_semver() {
        assert_eq!(parse_version("v1.0.0", None, None), ParseOutcome::Unparsable);
    }

    #[test]
    fn test_legacy_rejects_overflowing_count() {
        assert_eq!(
            parse_legacy("2023-10-05-99999999999999"),
            ParseOutcome::Unparsable
        );
    }

    #[test]
    fn test_one_format_argument_uses_legacy() {
        assert_eq!(
            parse_version("25.Q4.001", Some(DOTTED), None),
            ParseOutcome::Unparsable
        );
    }

    #[rstest]
    #[case("24.12.001", "%y.%m", "24.12", 1)]
    #[case("2024.12.001", "%Y.%m", "2024.12", 1)]
    #[case("24.Q4.001", "%y.Q%q", "24.Q4", 1)]
    #[case("2024.Q4.001", "%Y.Q%q", "2024.Q4", 1)]
    #[case("24.342.001", "%y.%j", "24.342", 1)]
    #[case("2024.342.001", "%Y.%j", "2024.342", 1)]
    #[case("25.Q4.001", "%y.Q%q", "25.Q4", 1)]
    #[case("241207.001", "%y%m%d", "241207", 1)]
    #[case("20241207.001", "%Y%m%d", "20241207", 1)]
    fn test_dot_separated_formats(
        #[case] version: &str,
        #[case] date_format: &str,
        #[case] date: &str,
        #[case] count: u32,
    ) {
        assert_eq!(
            parse(version, DOTTED, date_format),
            Some(ParsedVersion::new(date, count))
        );
    }

    #[rstest]
    #[case("24.Q4.001.beta", "%y.Q%q", "24.Q4")]
    #[case("25.Q4.001.beta", "%y.Q%q", "25.Q4")]
    #[case("2024.12.001.alpha", "%Y.%m", "2024.12")]
    #[case("24.12.001.rc1", "%y.%m", "24.12")]
    fn test_prerelease_suffixes_are_ignored(
        #[case] version: &str,
        #[case] date_format: &str,
        #[case] date: &str,
    ) {
        assert_eq!(
            parse(version, DOTTED, date_format),
            Some(ParsedVersion::new(date, 1))
        );
    }

    #[rstest]
    #[case("24.12", "%y.%m")]
    #[case("2024.12", "%Y.%m")]
    #[case("24.Q4", "%y.Q%q")]
    #[case("2024.Q4", "%Y.Q%q")]
    #[case("2024.12.07", "%Y.%m.%d")]
    #[case("2024-12-07", "%Y-%m-%d")]
    #[case("24.04", "%y.%m")]
    fn test_date_only_formats(#[case] version: &str, #[case] date_format: &str) {
        assert_eq!(
            parse(version, "{current_date}", date_format),
            Some(ParsedVersion::new(version, 0))
        );
    }

    #[test]
    fn test_date_only_format_requires_leading_digits() {
        assert_eq!(parse("Q4.24", "{current_date}", "Q%q.%y"), None);
        assert_eq!(parse("2024", "{current_date}", "%Y"), None);
    }

    #[test]
    fn test_hyphen_format_falls_back_to_legacy() {
        assert_eq!(
            parse("2024-12-07-001", "{current_date}-{build_count:03}", "%Y-%m-%d"),
            Some(ParsedVersion::new("2024-12-07", 1))
        );
    }

    #[rstest]
    #[case("v1.0.0")]
    #[case("1.0.0")]
    #[case("release-1.0")]
    fn test_non_calendar_versions_rejected(#[case] version: &str) {
        assert_eq!(parse(version, DOTTED, "%Y.%m.%d"), None);
    }

    #[test]
    fn test_non_numeric_build_count_is_unparsable() {
        assert_eq!(
            parse_version("24.12.xyz", Some(DOTTED), Some("%y.%m")),
            ParseOutcome::Unparsable
        );
    }

    #[test]
    fn test_unpadded_and_real_world_counts() {
        let unpadded = "{current_date}.{build_count}";
        assert_eq!(
            parse("24.12.1", unpadded, "%y.%m"),
            Some(ParsedVersion::new("24.12", 1))
        );
        assert_eq!(
            parse("24.3.0", unpadded, "%y.%m"),
            Some(ParsedVersion::new("24.3", 0))
        );
        assert_eq!(
            parse("24.11.1", unpadded, "%y.%m"),
            Some(ParsedVersion::new("24.11", 1))
        );
    }

    #[test]
    fn test_two_segment_year_prefix_is_checked() {
        assert_eq!(parse("x2024.001", DOTTED, "%Y"), None);
    }

    #[test]
    fn test_fewer_segments_than_format_falls_back() {
        assert_eq!(
            parse("2024-12-07", "{current_date}.rc.{build_count}", "%Y-%m-%d"),
            Some(ParsedVersion::new("2024-12-07", 0))
        );
    }

    #[test]
    fn test_parse_is_deterministic() {
        let first = parse_version("24.Q4.005", Some(DOTTED), Some("%y.Q%q"));
        let second = parse_version("24.Q4.005", Some(DOTTED), Some("%y.Q%q"));
        assert_eq!(first, second);
    }

    #[test]
    fn test_strip_prerelease_suffix() {
        assert_eq!(strip_prerelease_suffix("24.12.001.rc"), "24.12.001");
        assert_eq!(strip_prerelease_suffix("24.12.001.rc12"), "24.12.001");
        assert_eq!(strip_prerelease_suffix("24.12.001.release"), "24.12.001.release");
        assert_eq!(strip_prerelease_suffix("24.12.001"), "24.12.001");
    }

    #[test]
    fn test_non_numeric_count_does_not_retry_legacy() {
        assert_eq!(
            parse_version("2024-12-07-005.x", Some(DOTTED), Some("%Y-%m-%d")),
            ParseOutcome::Unparsable
        );
    }

    proptest! {
        #[test]
        fn prop_legacy_recovers_date_and_count(
            date in "[0-9]{4}-[0-9]{2}-[0-9]{2}",
            count in proptest::option::of("[0-9]{1,6}"),
        ) {
            let version = match &count {
                Some(count) => format!("{}-{}", date, count),
                None => date.clone(),
            };
            let expected_count = count
                .as_deref()
                .map(|count| count.parse::<u32>().unwrap())
                .unwrap_or(0);
            let expected = ParsedVersion::new(date.as_str(), expected_count);

            prop_assert_eq!(parse_version(&version, None, None).parsed(), Some(expected.clone()));
            prop_assert_eq!(
                parse_version(&version, Some("{current_date}-{build_count:03}"), Some("%Y-%m-%d")).parsed(),
                Some(expected)
            );
        }
    }
}
