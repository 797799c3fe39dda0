//! Shared fixtures for pipeline integration tests.
#![allow(dead_code)]

use async_trait::async_trait;
use chrono::{DateTime, Duration, TimeZone, Utc};
use indexmap::IndexMap;

use market_feed::models::granularity::Granularity;
use market_feed::models::request_params::HistoryRequest;
use market_feed::models::tick::{PricePoint, TickSeries};
use market_feed::providers::PriceSource;
use market_feed::providers::errors::FeedError;

use index_snapshot::config::SnapshotConfig;

/// Default constituent set, matching the production config.
pub const TICKERS: [&str; 5] = ["IONQ", "QBTS", "RGTI", "ARQQ", "QUBT"];

/// Session open on 2025-03-14 (09:30 EDT).
pub fn session_open() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 3, 14, 13, 30, 0).unwrap()
}

/// One-minute observations starting at the session open.
pub fn minute_series(symbol: &str, prices: &[f64]) -> TickSeries {
    let points = prices
        .iter()
        .enumerate()
        .map(|(i, &price)| PricePoint {
            timestamp: session_open() + Duration::minutes(i as i64),
            price,
        })
        .collect();
    TickSeries {
        symbol: symbol.to_string(),
        granularity: Granularity::OneMinute,
        points,
    }
}

/// Daily closes for 2025-03-10..14 (16:00 EDT each day).
pub fn daily_series(symbol: &str, closes: &[f64]) -> TickSeries {
    let points = closes
        .iter()
        .enumerate()
        .map(|(i, &price)| PricePoint {
            timestamp: Utc.with_ymd_and_hms(2025, 3, 10 + i as u32, 20, 0, 0).unwrap(),
            price,
        })
        .collect();
    TickSeries {
        symbol: symbol.to_string(),
        granularity: Granularity::Daily,
        points,
    }
}

/// Same price path for every constituent.
pub fn uniform_intraday(prices: &[f64]) -> IndexMap<String, TickSeries> {
    TICKERS
        .iter()
        .map(|t| (t.to_string(), minute_series(t, prices)))
        .collect()
}

/// Same daily closes for every constituent.
pub fn uniform_daily(closes: &[f64]) -> IndexMap<String, TickSeries> {
    TICKERS
        .iter()
        .map(|t| (t.to_string(), daily_series(t, closes)))
        .collect()
}

/// Config matching the fixtures above: base date inside the daily window.
pub fn test_config(output_dir: impl Into<std::path::PathBuf>) -> SnapshotConfig {
    let mut cfg = SnapshotConfig::default();
    cfg.index.base_date = chrono::NaiveDate::from_ymd_opt(2025, 3, 10).unwrap();
    cfg.output.dir = output_dir.into();
    cfg
}

/// Scripted source answering from canned maps, keyed by granularity.
pub struct ScriptedSource {
    pub intraday: IndexMap<String, TickSeries>,
    pub daily: IndexMap<String, TickSeries>,
}

#[async_trait]
impl PriceSource for ScriptedSource {
    async fn fetch_history(
        &self,
        req: &HistoryRequest,
    ) -> Result<IndexMap<String, TickSeries>, FeedError> {
        Ok(match req.granularity {
            Granularity::Daily => self.daily.clone(),
            _ => self.intraday.clone(),
        })
    }
}

/// Source that always fails, simulating a provider outage.
pub struct OutageSource;

#[async_trait]
impl PriceSource for OutageSource {
    async fn fetch_history(
        &self,
        _req: &HistoryRequest,
    ) -> Result<IndexMap<String, TickSeries>, FeedError> {
        Err(FeedError::Api("provider outage".to_string()))
    }
}
