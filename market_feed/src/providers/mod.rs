//! Provider abstraction for market data sources.
//!
//! This module defines the [`PriceSource`] trait, a unified interface for
//! fetching historical price observations from any market data vendor.
//!
//! Implementations handle vendor-specific API logic and validation, and may
//! return partial results: a symbol with no usable data is simply absent from
//! the result map. Providers never distinguish "symbol doesn't exist" from
//! "temporarily unavailable" — callers treat both as missing data.
//!
//! The trait is designed for async usage and supports dynamic dispatch
//! (`dyn PriceSource`) for runtime selection of providers.

pub mod errors;
pub mod yahoo_chart;

use async_trait::async_trait;
use indexmap::IndexMap;

use crate::models::{request_params::HistoryRequest, tick::TickSeries};
use crate::providers::errors::FeedError;

/// A source of historical price observations.
#[async_trait]
pub trait PriceSource {
    /// Fetches a time series per requested symbol.
    ///
    /// The returned map contains an entry only for symbols with at least one
    /// valid observation; it may be empty.
    async fn fetch_history(
        &self,
        req: &HistoryRequest,
    ) -> Result<IndexMap<String, TickSeries>, FeedError>;
}
