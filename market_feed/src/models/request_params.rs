//! Universal parameters for requesting price history from any provider.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::granularity::Granularity;

/// Time window of a history request.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub enum FetchWindow {
    /// Trailing period ending now, in whole days.
    LastDays(u32),
    /// Explicit half-open range `[start, end)` in UTC.
    Range {
        /// Start of the range (inclusive, UTC).
        start: DateTime<Utc>,
        /// End of the range (exclusive, UTC).
        end: DateTime<Utc>,
    },
}

/// Vendor-agnostic parameters for a price-history request.
///
/// This is the standard input for all
/// [`PriceSource`](crate::providers::PriceSource) implementations. Each
/// provider validates the window/granularity combination against its own API
/// limits.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct HistoryRequest {
    /// Symbols to request (e.g. `["IONQ", "QBTS"]`).
    pub symbols: Vec<String>,
    /// Requested time window.
    pub window: FetchWindow,
    /// Bar granularity.
    pub granularity: Granularity,
}

impl FetchWindow {
    /// Approximate span of the window in whole days, for provider-side
    /// validation.
    pub fn span_days(&self) -> i64 {
        match self {
            FetchWindow::LastDays(days) => i64::from(*days),
            FetchWindow::Range { start, end } => (*end - *start).num_days(),
        }
    }
}
