//! Equal-weight composite construction.
//!
//! Each constituent is normalized against its own reference price and the
//! composite ratio at a timestamp is the arithmetic mean of the per-ticker
//! ratios present there, so no ticker's price magnitude carries extra weight.
//! Two reference modes exist:
//! - **Intraday**: the reference is the ticker's first valid observation
//!   inside the selected session (its open). Opens may differ per ticker.
//! - **Long-run**: the reference is the last observation at or before the
//!   configured base date, never a later one.
//!
//! A ticker missing at a timestamp contributes nothing there — it is not
//! zero-filled or carried forward. Timestamps with fewer than
//! `min_constituents` contributors are dropped outright.
//!
//! Levels are base-100: `level = ratio * 100` and
//! `change_pct = (ratio - 1) * 100` are derived together in
//! [`level_and_change`], which keeps `level == 100 * (1 + change_pct / 100)`
//! true for every point this module emits.

use std::collections::BTreeMap;

use chrono::{DateTime, NaiveDate, Utc};
use indexmap::IndexMap;
use thiserror::Error;

use market_feed::models::tick::TickSeries;
use market_feed::tz::{eastern_day_close, eastern_trading_date};

use crate::session::SessionWindow;

/// One composite observation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CompositePoint {
    /// Observation instant (UTC).
    pub timestamp: DateTime<Utc>,
    /// Base-100 level.
    pub level: f64,
    /// Percent change versus the shared reference.
    pub change_pct: f64,
}

/// Intraday composite, ascending by timestamp.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct CompositeSeries {
    /// The composite observations.
    pub points: Vec<CompositePoint>,
}

impl CompositeSeries {
    /// Whether the series holds no points.
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Latest unsmoothed point — the published "last" statistic.
    pub fn last(&self) -> Option<&CompositePoint> {
        self.points.last()
    }

    /// Centered moving average of `change_pct` over `window` points,
    /// truncated at the edges.
    ///
    /// Display-only: statistics always come from the raw series, never from
    /// this one.
    pub fn smoothed(&self, window: usize) -> Vec<(DateTime<Utc>, f64)> {
        if window <= 1 || self.points.is_empty() {
            return self
                .points
                .iter()
                .map(|p| (p.timestamp, p.change_pct))
                .collect();
        }

        let half = window / 2;
        let last = self.points.len() - 1;
        self.points
            .iter()
            .enumerate()
            .map(|(i, p)| {
                let lo = i.saturating_sub(half);
                let hi = usize::min(i + half, last);
                let slice = &self.points[lo..=hi];
                let mean = slice.iter().map(|q| q.change_pct).sum::<f64>() / slice.len() as f64;
                (p.timestamp, mean)
            })
            .collect()
    }
}

/// One long-run level observation, keyed by eastern trading date.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LevelPoint {
    /// Eastern trading date of the close this level represents.
    pub date: NaiveDate,
    /// Base-100 level.
    pub level: f64,
    /// Percent change versus the base-date reference.
    pub change_pct: f64,
}

/// Long-run composite, ascending by date.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct LevelSeries {
    /// The level observations.
    pub points: Vec<LevelPoint>,
}

impl LevelSeries {
    /// Whether the series holds no points.
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Latest level observation.
    pub fn last(&self) -> Option<&LevelPoint> {
        self.points.last()
    }
}

/// Composite computation errors.
#[derive(Debug, Error)]
pub enum CompositeError {
    /// No constituent has any observation at or before the base date, so no
    /// reference price exists and no fallback is safe.
    #[error("base date {base_date} precedes all available history")]
    ReferenceOutOfRange {
        /// The offending base date.
        base_date: NaiveDate,
    },
}

/// Per-ticker price/reference ratios keyed by timestamp.
///
/// Duplicate timestamps within one series collapse to the last observation.
pub fn normalize(series: &TickSeries, reference_price: f64) -> BTreeMap<DateTime<Utc>, f64> {
    series
        .points
        .iter()
        .map(|p| (p.timestamp, p.price / reference_price))
        .collect()
}

/// Base-100 level and percent change for one composite ratio.
fn level_and_change(ratio: f64) -> (f64, f64) {
    (ratio * 100.0, (ratio - 1.0) * 100.0)
}

/// Mean of the per-ticker ratios at each key, dropping keys with fewer than
/// `min_constituents` contributors.
fn mean_ratios<K: Ord + Copy>(
    per_ticker: Vec<BTreeMap<K, f64>>,
    min_constituents: usize,
) -> Vec<(K, f64)> {
    let mut buckets: BTreeMap<K, (f64, usize)> = BTreeMap::new();
    for ratios in per_ticker {
        for (key, ratio) in ratios {
            let entry = buckets.entry(key).or_insert((0.0, 0));
            entry.0 += ratio;
            entry.1 += 1;
        }
    }

    buckets
        .into_iter()
        .filter(|(_, (_, count))| *count >= min_constituents)
        .map(|(key, (sum, count))| (key, sum / count as f64))
        .collect()
}

/// Equal-weight intraday composite for one session.
///
/// Each ticker is normalized against its first valid observation inside the
/// session; tickers with no in-session data are excluded.
pub fn intraday_composite(
    observations: &IndexMap<String, TickSeries>,
    session: SessionWindow,
    min_constituents: usize,
) -> CompositeSeries {
    let mut per_ticker = Vec::with_capacity(observations.len());
    for series in observations.values() {
        let mut in_session = series
            .points
            .iter()
            .filter(|p| session.contains(p.timestamp))
            .peekable();

        let Some(open) = in_session.peek() else {
            continue;
        };
        let reference = open.price;

        // Duplicate timestamps collapse to the last observation.
        per_ticker.push(
            in_session
                .map(|p| (p.timestamp, p.price / reference))
                .collect::<BTreeMap<_, _>>(),
        );
    }

    let points = mean_ratios(per_ticker, min_constituents)
        .into_iter()
        .map(|(timestamp, ratio)| {
            let (level, change_pct) = level_and_change(ratio);
            CompositePoint {
                timestamp,
                level,
                change_pct,
            }
        })
        .collect();

    CompositeSeries { points }
}

/// Equal-weight long-run composite normalized at `base_date`.
///
/// Observations are aligned per eastern trading date; the last observation of
/// each date is that date's close. A ticker with no observation at or before
/// the base date is excluded; when no ticker has one the computation aborts.
pub fn long_run_composite(
    observations: &IndexMap<String, TickSeries>,
    base_date: NaiveDate,
    min_constituents: usize,
) -> Result<LevelSeries, CompositeError> {
    let cutoff = eastern_day_close(base_date);

    let mut per_ticker = Vec::with_capacity(observations.len());
    for series in observations.values() {
        let Some(reference) = series.last_at_or_before(cutoff) else {
            continue;
        };

        let mut by_date: BTreeMap<NaiveDate, f64> = BTreeMap::new();
        for (ts, ratio) in normalize(series, reference.price) {
            // Later entries of the same date overwrite: close wins.
            by_date.insert(eastern_trading_date(ts), ratio);
        }
        per_ticker.push(by_date);
    }

    if per_ticker.is_empty() && !observations.is_empty() {
        return Err(CompositeError::ReferenceOutOfRange { base_date });
    }

    let points = mean_ratios(per_ticker, min_constituents)
        .into_iter()
        .map(|(date, ratio)| {
            let (level, change_pct) = level_and_change(ratio);
            LevelPoint {
                date,
                level,
                change_pct,
            }
        })
        .collect();

    Ok(LevelSeries { points })
}
