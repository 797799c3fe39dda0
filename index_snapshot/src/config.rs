//! Snapshot configuration: parsing, normalization, and loading.
//!
//! This module defines the TOML-backed configuration for one snapshot run:
//! - The index itself (key, constituent tickers, base date, thresholds)
//! - Fetch behavior (window lengths, bounded retry)
//! - Output location
//!
//! Key behaviors:
//! - Normalization trims whitespace, uppercases tickers, and de-duplicates
//!   them while preserving order.
//! - Every threshold is validated on load; a config that cannot produce a
//!   meaningful composite is rejected with context.
//! - [`SnapshotConfig::default`] carries the production QBIT-5 values, so the
//!   binary runs without a config file.
//!
//! Components receive the config at construction; nothing reads it as
//! ambient state.
//!
//! Entrypoints:
//! - Parse + normalize from a TOML string: [`load_config_str`]
//! - Parse + normalize from a file path: [`load_config_path`]

use std::collections::HashSet;
use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, bail};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use market_feed::providers::yahoo_chart::RetryPolicy;

/// Top-level configuration for one snapshot run.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields, default)]
pub struct SnapshotConfig {
    /// Index definition.
    pub index: IndexConfig,
    /// Fetch windows and retry behavior.
    pub fetch: FetchConfig,
    /// Output location.
    pub output: OutputConfig,
}

/// Definition of the published index.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields, default)]
pub struct IndexConfig {
    /// Published index key (e.g. "QBIT-5").
    pub key: String,
    /// Constituent tickers; normalized to unique uppercase, order preserved.
    pub tickers: Vec<String>,
    /// Normalization reference date for the long-run level series.
    pub base_date: NaiveDate,
    /// Minimum combined observation count for a date to qualify as the
    /// current session.
    pub min_session_samples: usize,
    /// Minimum tickers that must contribute to a composite point.
    pub min_constituents: usize,
    /// Centered moving-average window offered for display smoothing.
    pub smoothing_window: usize,
}

impl Default for IndexConfig {
    fn default() -> Self {
        Self {
            key: "QBIT-5".to_string(),
            tickers: ["IONQ", "QBTS", "RGTI", "ARQQ", "QUBT"]
                .map(String::from)
                .to_vec(),
            base_date: NaiveDate::from_ymd_opt(2024, 1, 2).expect("static base date is valid"),
            min_session_samples: 30,
            min_constituents: 2,
            smoothing_window: 3,
        }
    }
}

/// Fetch windows and retry behavior.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields, default)]
pub struct FetchConfig {
    /// Trailing days of 1-minute bars for the intraday snapshot.
    pub intraday_days: u32,
    /// Trailing days of daily bars for the long-run level series.
    pub history_days: u32,
    /// Attempts per symbol request, including the first.
    pub max_attempts: u32,
    /// Pause between retry attempts, in milliseconds.
    pub retry_pause_ms: u64,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            intraday_days: 5,
            history_days: 400,
            max_attempts: 3,
            retry_pause_ms: 500,
        }
    }
}

impl FetchConfig {
    /// Retry policy handed to the provider.
    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy {
            max_attempts: self.max_attempts,
            pause: Duration::from_millis(self.retry_pause_ms),
        }
    }
}

/// Output location of the persisted artifacts.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields, default)]
pub struct OutputConfig {
    /// Directory the artifact store writes into.
    pub dir: PathBuf,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            dir: PathBuf::from("docs/outputs"),
        }
    }
}

/// Normalize a parsed config in place.
///
/// What normalization does:
/// - Trim the index key; reject an empty key
/// - Trim + uppercase tickers, de-duplicate preserving first occurrence
/// - Validate thresholds and windows
///
/// Errors:
/// - Empty key, empty ticker after trimming, no tickers left
/// - `min_constituents` of zero or larger than the ticker count
/// - Zero-valued session threshold, fetch window, or retry attempts
pub fn normalize_config(cfg: &mut SnapshotConfig) -> anyhow::Result<()> {
    cfg.index.key = cfg.index.key.trim().to_string();
    if cfg.index.key.is_empty() {
        bail!("index.key cannot be empty");
    }

    let mut seen = HashSet::new();
    let mut tickers = Vec::with_capacity(cfg.index.tickers.len());
    for raw in std::mem::take(&mut cfg.index.tickers) {
        let ticker = raw.trim().to_uppercase();
        if ticker.is_empty() {
            bail!("ticker cannot be empty after trimming");
        }
        if seen.insert(ticker.clone()) {
            tickers.push(ticker);
        }
    }
    if tickers.is_empty() {
        bail!("index.tickers cannot be empty");
    }
    cfg.index.tickers = tickers;

    if cfg.index.min_constituents == 0 {
        bail!("index.min_constituents must be at least 1");
    }
    if cfg.index.min_constituents > cfg.index.tickers.len() {
        bail!(
            "index.min_constituents ({}) cannot exceed the ticker count ({})",
            cfg.index.min_constituents,
            cfg.index.tickers.len()
        );
    }
    if cfg.index.min_session_samples == 0 {
        bail!("index.min_session_samples must be at least 1");
    }
    if cfg.fetch.intraday_days == 0 || cfg.fetch.history_days == 0 {
        bail!("fetch windows must span at least one day");
    }
    if cfg.fetch.max_attempts == 0 {
        bail!("fetch.max_attempts must be at least 1");
    }

    Ok(())
}

/// Parse and normalize a config from a TOML string.
pub fn load_config_str(toml_str: &str) -> anyhow::Result<SnapshotConfig> {
    let mut cfg: SnapshotConfig =
        toml::from_str(toml_str).context("failed to parse snapshot config TOML")?;
    normalize_config(&mut cfg)?;
    Ok(cfg)
}

/// Read a config TOML file from disk, parse, and normalize it.
pub fn load_config_path(path: impl AsRef<std::path::Path>) -> anyhow::Result<SnapshotConfig> {
    let text = std::fs::read_to_string(path.as_ref())
        .with_context(|| format!("read config file {}", path.as_ref().display()))?;
    load_config_str(&text)
}
