//! Sampling granularity for price-history requests.

use serde::{Deserialize, Serialize};

/// Bar granularity supported by the snapshot pipeline.
///
/// Validation of allowed window/granularity combinations is performed by each
/// provider implementation, according to its own API rules.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Granularity {
    /// One bar per trading day.
    Daily,
    /// One bar per minute.
    OneMinute,
    /// One bar per five minutes.
    FiveMinute,
}

impl Granularity {
    /// Wire code used by chart-style provider APIs.
    pub fn api_code(self) -> &'static str {
        match self {
            Granularity::Daily => "1d",
            Granularity::OneMinute => "1m",
            Granularity::FiveMinute => "5m",
        }
    }
}
