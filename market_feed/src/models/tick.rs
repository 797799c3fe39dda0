//! Canonical in-memory representation of observed prices.
//!
//! These structs are the standard output of all
//! [`PriceSource`](crate::providers::PriceSource) implementations, regardless
//! of which vendor produced the observations.

use chrono::{DateTime, Utc};

use crate::models::granularity::Granularity;

/// A single observed price for one symbol at one instant (UTC).
///
/// Providers guarantee `price` is finite and strictly positive; observations
/// that fail the check are discarded at ingest, so downstream code never
/// re-validates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PricePoint {
    /// Observation instant (UTC).
    pub timestamp: DateTime<Utc>,
    /// Observed trade price.
    pub price: f64,
}

/// Time-ordered price observations for a single symbol.
///
/// Points are ascending by timestamp. Gaps are allowed and expected: halts,
/// thin sessions, provider dropouts.
#[derive(Debug, Clone, PartialEq)]
pub struct TickSeries {
    /// The symbol this series represents (e.g. "IONQ").
    pub symbol: String,
    /// Sampling granularity of the observations.
    pub granularity: Granularity,
    /// The observations, ascending by timestamp.
    pub points: Vec<PricePoint>,
}

impl TickSeries {
    /// Whether the series holds no observations.
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Most recent observation at or before `cutoff`.
    ///
    /// Never returns an observation after `cutoff`; base-date reference
    /// lookups rely on this right-censoring.
    pub fn last_at_or_before(&self, cutoff: DateTime<Utc>) -> Option<&PricePoint> {
        self.points.iter().rev().find(|p| p.timestamp <= cutoff)
    }
}
