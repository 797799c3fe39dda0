//! Trading-session selection.
//!
//! A session is one US-Eastern calendar day's worth of observations. The
//! selector counts observations per date across all tickers combined and only
//! considers dates with at least `min_samples` of them, so a just-opened or
//! holiday-truncated day does not get reported as "today". Among qualifying
//! dates the most recent wins.

use std::collections::BTreeMap;

use chrono::{DateTime, NaiveDate, Utc};
use indexmap::IndexMap;

use market_feed::models::tick::TickSeries;
use market_feed::tz::eastern_trading_date;

/// One trading day, identified by its US-Eastern calendar date.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionWindow {
    /// The session's eastern calendar date.
    pub date: NaiveDate,
}

impl SessionWindow {
    /// Whether `ts` falls inside this session's calendar day.
    pub fn contains(&self, ts: DateTime<Utc>) -> bool {
        eastern_trading_date(ts) == self.date
    }
}

/// Picks the session to treat as current.
///
/// Returns the most recent eastern date whose combined observation count
/// across all tickers reaches `min_samples`, or `None` when no date
/// qualifies.
pub fn select_session(
    observations: &IndexMap<String, TickSeries>,
    min_samples: usize,
) -> Option<SessionWindow> {
    let mut counts: BTreeMap<NaiveDate, usize> = BTreeMap::new();
    for series in observations.values() {
        for point in &series.points {
            *counts.entry(eastern_trading_date(point.timestamp)).or_insert(0) += 1;
        }
    }

    counts
        .into_iter()
        .rev()
        .find(|(_, count)| *count >= min_samples)
        .map(|(date, _)| SessionWindow { date })
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, TimeZone};

    use market_feed::models::granularity::Granularity;
    use market_feed::models::tick::PricePoint;

    use super::*;

    /// `count` one-minute observations starting at 14:30Z (09:30/10:30 ET).
    fn day_series(symbol: &str, day: u32, count: usize) -> TickSeries {
        let start = Utc.with_ymd_and_hms(2025, 3, day, 14, 30, 0).unwrap();
        let points = (0..count)
            .map(|i| PricePoint {
                timestamp: start + Duration::minutes(i as i64),
                price: 100.0,
            })
            .collect();
        TickSeries {
            symbol: symbol.to_string(),
            granularity: Granularity::OneMinute,
            points,
        }
    }

    fn merge(series: Vec<TickSeries>) -> IndexMap<String, TickSeries> {
        let mut out: IndexMap<String, TickSeries> = IndexMap::new();
        for s in series {
            out.entry(s.symbol.clone())
                .and_modify(|existing| existing.points.extend(s.points.iter().copied()))
                .or_insert(s);
        }
        out
    }

    #[test]
    fn prefers_latest_qualifying_day() {
        // day 13: 5 samples, day 14: 45 samples
        let obs = merge(vec![day_series("IONQ", 13, 5), day_series("IONQ", 14, 45)]);

        let session = select_session(&obs, 30).unwrap();
        assert_eq!(session.date, NaiveDate::from_ymd_opt(2025, 3, 14).unwrap());
    }

    #[test]
    fn none_when_no_day_qualifies() {
        let obs = merge(vec![day_series("IONQ", 13, 5), day_series("IONQ", 14, 45)]);
        assert_eq!(select_session(&obs, 50), None);
    }

    #[test]
    fn falls_back_to_prior_day_when_latest_is_thin() {
        // The thin day-14 open must not shadow the complete day 13.
        let obs = merge(vec![day_series("IONQ", 13, 45), day_series("IONQ", 14, 3)]);

        let session = select_session(&obs, 30).unwrap();
        assert_eq!(session.date, NaiveDate::from_ymd_opt(2025, 3, 13).unwrap());
    }

    #[test]
    fn counts_accumulate_across_tickers() {
        // 3 tickers x 12 samples = 36 combined, enough for min_samples=30
        // even though no single ticker reaches it.
        let obs = merge(vec![
            day_series("IONQ", 14, 12),
            day_series("QBTS", 14, 12),
            day_series("RGTI", 14, 12),
        ]);

        let session = select_session(&obs, 30).unwrap();
        assert_eq!(session.date, NaiveDate::from_ymd_opt(2025, 3, 14).unwrap());
    }

    #[test]
    fn empty_observations_yield_none() {
        assert_eq!(select_session(&IndexMap::new(), 1), None);
    }

    #[test]
    fn window_membership_uses_eastern_dates() {
        let session = SessionWindow {
            date: NaiveDate::from_ymd_opt(2025, 3, 14).unwrap(),
        };
        // 00:30Z on the 15th is still the evening of the 14th in New York.
        let late = Utc.with_ymd_and_hms(2025, 3, 15, 0, 30, 0).unwrap();
        assert!(session.contains(late));
        // Noon UTC on the 15th is not.
        let next = Utc.with_ymd_and_hms(2025, 3, 15, 12, 0, 0).unwrap();
        assert!(!session.contains(next));
    }
}
