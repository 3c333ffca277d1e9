//! Current-date computation in a named timezone.

use chrono::format::{Item, StrftimeItems};
use chrono::{DateTime, Datelike, TimeZone, Utc};
use chrono_tz::Tz;
use std::fmt::Display;

use crate::error::{BumpCalverError, Result};
use crate::ui;

/// Timezone used when a configured name cannot be resolved.
pub const FALLBACK_TIMEZONE: Tz = chrono_tz::America::New_York;

/// Returns the calendar quarter (1-4) for a month number (1-12).
pub fn quarter_of(month: u32) -> u32 {
    (month.saturating_sub(1)) / 3 + 1
}

/// Replaces the non-standard `%q` token with the quarter number.
///
/// `%%` escapes are preserved so that `%%q` stays a literal `%q`.
pub fn expand_quarter(date_format: &str, month: u32) -> String {
    let quarter = quarter_of(month).to_string();
    let mut expanded = String::with_capacity(date_format.len());
    let mut chars = date_format.chars().peekable();

    while let Some(c) = chars.next() {
        if c != '%' {
            expanded.push(c);
            continue;
        }
        match chars.peek() {
            Some('q') => {
                chars.next();
                expanded.push_str(&quarter);
            }
            Some('%') => {
                chars.next();
                expanded.push_str("%%");
            }
            _ => expanded.push('%'),
        }
    }

    expanded
}

/// Formats a point in time with a strftime-style date format, including `%q`.
///
/// # Returns
/// * `Ok(String)` - The formatted date
/// * `Err` - If the format contains a specifier chrono does not understand
pub fn format_date<Z>(now: &DateTime<Z>, date_format: &str) -> Result<String>
where
    Z: TimeZone,
    Z::Offset: Display,
{
    let expanded = expand_quarter(date_format, now.month());
    let items: Vec<Item<'_>> = StrftimeItems::new(&expanded).collect();

    if items.iter().any(|item| matches!(item, Item::Error)) {
        return Err(BumpCalverError::date_format(format!(
            "Invalid date format '{}'",
            date_format
        )));
    }

    Ok(now.format_with_items(items.iter()).to_string())
}

/// Resolves an IANA timezone name, reporting and falling back on unknown names.
pub fn resolve_timezone(name: &str) -> Tz {
    match name.parse::<Tz>() {
        Ok(tz) => tz,
        Err(_) => {
            ui::display_warning(&format!(
                "Unknown timezone '{}'. Using default '{}'.",
                name,
                FALLBACK_TIMEZONE.name()
            ));
            FALLBACK_TIMEZONE
        }
    }
}

/// Returns the current date in `timezone`, formatted with `date_format`.
pub fn current_date(timezone: &str, date_format: &str) -> Result<String> {
    let tz = resolve_timezone(timezone);
    let now = Utc::now().with_timezone(&tz);
    format_date(&now, date_format)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn december_seventh() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 12, 7, 15, 30, 0).unwrap()
    }

    #[test]
    fn test_quarter_of_each_month() {
        let quarters: Vec<u32> = (1..=12).map(quarter_of).collect();
        assert_eq!(quarters, vec![1, 1, 1, 2, 2, 2, 3, 3, 3, 4, 4, 4]);
    }

    #[test]
    fn test_expand_quarter() {
        assert_eq!(expand_quarter("%y.Q%q", 11), "%y.Q4");
        assert_eq!(expand_quarter("%Y.Q%q", 2), "%Y.Q1");
        assert_eq!(expand_quarter("%Y.%m.%d", 5), "%Y.%m.%d");
    }

    #[test]
    fn test_expand_quarter_keeps_escaped_percent() {
        assert_eq!(expand_quarter("%%q-%q", 7), "%%q-3");
    }

    #[test]
    fn test_format_date_common_formats() {
        let now = december_seventh();
        assert_eq!(format_date(&now, "%Y.%m.%d").unwrap(), "2024.12.07");
        assert_eq!(format_date(&now, "%y.%m.%d").unwrap(), "24.12.07");
        assert_eq!(format_date(&now, "%y.Q%q").unwrap(), "24.Q4");
        assert_eq!(format_date(&now, "%Y.Q%q").unwrap(), "2024.Q4");
        assert_eq!(format_date(&now, "%y.%j").unwrap(), "24.342");
        assert_eq!(format_date(&now, "%Y-%m-%d").unwrap(), "2024-12-07");
    }

    #[test]
    fn test_format_date_in_timezone() {
        let tz: Tz = "Asia/Tokyo".parse().unwrap();
        let late_evening = Utc.with_ymd_and_hms(2024, 12, 31, 20, 0, 0).unwrap();
        let tokyo = late_evening.with_timezone(&tz);
        assert_eq!(format_date(&tokyo, "%Y.%m.%d").unwrap(), "2025.01.01");
    }

    #[test]
    fn test_format_date_invalid_specifier() {
        let err = format_date(&december_seventh(), "%Y.%!").unwrap_err();
        assert!(err.to_string().contains("Invalid date format"));
    }

    #[test]
    fn test_resolve_timezone_unknown_falls_back() {
        assert_eq!(resolve_timezone("Invalid/Timezone"), FALLBACK_TIMEZONE);
        assert_eq!(resolve_timezone("UTC"), Tz::UTC);
    }

    #[test]
    fn test_current_date_shape() {
        let today = current_date("America/New_York", "%Y.%m.%d").unwrap();
        assert_eq!(today.len(), 10);
        assert_eq!(today.matches('.').count(), 2);

        let fallback = current_date("Invalid/Timezone", "%Y.%m.%d").unwrap();
        assert_eq!(fallback.len(), 10);
    }
}
