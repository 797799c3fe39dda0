//! Column-name reconciliation for artifacts written by earlier producer
//! versions.
//!
//! Producers have historically disagreed on header names
//! ("date" / "datetime_jst" / "timestamp_utc"; "level" / "close" /
//! "index_level"; "pct_vs_open" / "change_pct" / "pct"). Each logical field
//! carries a small ordered alias list; resolution is a case-insensitive
//! substring match, first alias wins. This is the only place that sees raw
//! headers — the rest of the pipeline works with canonical fields.
//!
//! Timestamps are reduced to a single convention before indexing:
//! offset-aware values convert to UTC, naive values are assumed already UTC.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};

/// Ordered alias list for one logical field.
pub struct FieldAliases {
    /// Canonical field name.
    pub field: &'static str,
    /// Accepted header substrings, tried in order.
    pub aliases: &'static [&'static str],
}

/// Timestamp column of a levels table.
pub const DATE_FIELD: FieldAliases = FieldAliases {
    field: "date",
    aliases: &["date", "timestamp", "time"],
};

/// Level column of a levels table.
pub const LEVEL_FIELD: FieldAliases = FieldAliases {
    field: "level",
    aliases: &["level", "close", "index"],
};

/// Change-percent column of a levels table.
pub const PCT_FIELD: FieldAliases = FieldAliases {
    field: "change_pct",
    aliases: &["pct_vs_open", "change_pct", "pct"],
};

/// Index of the first header matching `field`, scanning aliases in order.
pub fn resolve_column(headers: &[String], field: &FieldAliases) -> Option<usize> {
    for alias in field.aliases {
        if let Some(index) = headers
            .iter()
            .position(|header| header.to_ascii_lowercase().contains(alias))
        {
            return Some(index);
        }
    }
    None
}

/// Parses a stored date or timestamp cell into the calendar date it indexes.
///
/// Accepted shapes, in order: RFC3339 (converted to UTC), naive datetime
/// (assumed UTC), plain date.
pub fn parse_artifact_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc).date_naive());
    }
    for format in ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S"] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(raw, format) {
            return Some(dt.date());
        }
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d").ok()
}

/// Parses a numeric cell, rejecting non-finite values.
pub fn parse_numeric(raw: &str) -> Option<f64> {
    raw.trim().parse::<f64>().ok().filter(|v| v.is_finite())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn headers(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn resolves_canonical_headers() {
        let h = headers(&["date", "level", "change_pct"]);
        assert_eq!(resolve_column(&h, &DATE_FIELD), Some(0));
        assert_eq!(resolve_column(&h, &LEVEL_FIELD), Some(1));
        assert_eq!(resolve_column(&h, &PCT_FIELD), Some(2));
    }

    #[test]
    fn resolves_legacy_headers_case_insensitively() {
        let h = headers(&["Date", "Close"]);
        assert_eq!(resolve_column(&h, &DATE_FIELD), Some(0));
        assert_eq!(resolve_column(&h, &LEVEL_FIELD), Some(1));
        assert_eq!(resolve_column(&h, &PCT_FIELD), None);
    }

    #[test]
    fn substring_match_covers_decorated_names() {
        let h = headers(&["datetime_jst", "index_level", "pct_vs_open"]);
        assert_eq!(resolve_column(&h, &DATE_FIELD), Some(0));
        assert_eq!(resolve_column(&h, &LEVEL_FIELD), Some(1));
        assert_eq!(resolve_column(&h, &PCT_FIELD), Some(2));
    }

    #[test]
    fn earlier_alias_wins_over_later_one() {
        // Both "level" and "close" are present; "level" is listed first.
        let h = headers(&["close", "level"]);
        assert_eq!(resolve_column(&h, &LEVEL_FIELD), Some(1));
    }

    #[test]
    fn unresolvable_field_is_none() {
        let h = headers(&["foo", "bar"]);
        assert_eq!(resolve_column(&h, &LEVEL_FIELD), None);
    }

    #[test]
    fn timestamp_parsing_reduces_to_one_convention() {
        // Offset-aware: converted to UTC before the date is taken.
        // 2025-03-15 03:30+09:00 is 2025-03-14 18:30Z.
        assert_eq!(
            parse_artifact_date("2025-03-15T03:30:00+09:00"),
            NaiveDate::from_ymd_opt(2025, 3, 14)
        );
        // Naive: assumed already UTC.
        assert_eq!(
            parse_artifact_date("2025-03-14 18:30:00"),
            NaiveDate::from_ymd_opt(2025, 3, 14)
        );
        // Plain date.
        assert_eq!(
            parse_artifact_date("2025-03-14"),
            NaiveDate::from_ymd_opt(2025, 3, 14)
        );
        assert_eq!(parse_artifact_date("not a date"), None);
    }

    #[test]
    fn numeric_parsing_rejects_junk() {
        assert_eq!(parse_numeric(" 101.25 "), Some(101.25));
        assert_eq!(parse_numeric("NaN"), None);
        assert_eq!(parse_numeric("n/a"), None);
    }
}
