//! Snapshot orchestration.
//!
//! One run walks FETCH → SELECT_SESSION → COMPUTE → PERSIST. The first three
//! stages short-circuit to a benign [`SnapshotOutcome::NoData`] — holidays,
//! pre-market thinness and provider hiccups are expected, and a run that has
//! nothing to report leaves the previous artifacts untouched and exits
//! cleanly. Only two conditions abort: an unusable base-date reference and a
//! persistence failure.

use std::fmt;

use chrono::Utc;
use tracing::{info, warn};

use market_feed::models::granularity::Granularity;
use market_feed::models::request_params::{FetchWindow, HistoryRequest};
use market_feed::providers::PriceSource;
use market_feed::tz::jst_stamp;

use crate::artifacts::{ArtifactStore, SnapshotStats};
use crate::composite::intraday_composite;
use crate::composite::long_run_composite;
use crate::config::SnapshotConfig;
use crate::errors::SnapshotError;
use crate::post::intraday_post;
use crate::session::select_session;

/// Why a run produced nothing to publish.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoDataReason {
    /// The provider returned no observations for any ticker.
    EmptyFetch,
    /// No date met the minimum sample threshold.
    NoQualifyingSession,
    /// No timestamp had enough contributing tickers.
    EmptyComposite,
}

impl fmt::Display for NoDataReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            NoDataReason::EmptyFetch => "no intraday data returned",
            NoDataReason::NoQualifyingSession => "no sufficiently sampled trading day",
            NoDataReason::EmptyComposite => "composite empty after alignment",
        };
        f.write_str(text)
    }
}

/// Outcome of one pipeline run.
///
/// `NoData` is a *successful* run with nothing to report; callers must not
/// map it to a failure exit.
#[derive(Debug)]
pub enum SnapshotOutcome {
    /// Artifacts were recomputed and persisted.
    Computed(SnapshotStats),
    /// Benign no-op; prior artifacts are untouched.
    NoData(NoDataReason),
}

/// Sequences one snapshot run over a price source and an artifact store.
pub struct SnapshotRunner<S> {
    config: SnapshotConfig,
    source: S,
    store: ArtifactStore,
}

impl<S: PriceSource> SnapshotRunner<S> {
    /// Runner over an immutable config, a price source and a store.
    pub fn new(config: SnapshotConfig, source: S, store: ArtifactStore) -> Self {
        Self {
            config,
            source,
            store,
        }
    }

    /// Executes one full snapshot run.
    pub async fn run(&self) -> Result<SnapshotOutcome, SnapshotError> {
        // FETCH
        let observations = match self.source.fetch_history(&self.intraday_request()).await {
            Ok(map) => map,
            Err(err) => {
                warn!(error = %err, "intraday fetch failed; leaving prior artifacts untouched");
                return Ok(SnapshotOutcome::NoData(NoDataReason::EmptyFetch));
            }
        };
        if observations.values().all(|series| series.is_empty()) {
            info!("no intraday data for the requested window; market likely closed");
            return Ok(SnapshotOutcome::NoData(NoDataReason::EmptyFetch));
        }

        // SELECT_SESSION
        let Some(session) =
            select_session(&observations, self.config.index.min_session_samples)
        else {
            info!("no sufficiently sampled trading day found; skipping without error");
            return Ok(SnapshotOutcome::NoData(NoDataReason::NoQualifyingSession));
        };

        // COMPUTE
        let intraday = intraday_composite(
            &observations,
            session,
            self.config.index.min_constituents,
        );
        let Some(last) = intraday.last().copied() else {
            info!(session = %session.date, "intraday composite empty; skipping without error");
            return Ok(SnapshotOutcome::NoData(NoDataReason::EmptyComposite));
        };

        let last_level = self.last_level().await?;

        // PERSIST
        self.store.ensure_dir()?;
        self.store.write_intraday(&intraday)?;

        let stats = SnapshotStats {
            key: self.config.index.key.clone(),
            pct_intraday: round2(last.change_pct),
            updated_at: jst_stamp(Utc::now()),
            unit: "pct".to_string(),
            last_level: last_level.map(round2),
            base_date: self.config.index.base_date,
            tickers: self.config.index.tickers.clone(),
        };
        self.store.write_stats(&stats)?;
        self.store.write_post(&intraday_post(&stats))?;
        self.store
            .write_heartbeat(&format!("intraday snapshot OK @ {}", stats.updated_at))?;

        info!(
            session = %session.date,
            pct = stats.pct_intraday,
            points = intraday.points.len(),
            "snapshot persisted"
        );
        Ok(SnapshotOutcome::Computed(stats))
    }

    fn intraday_request(&self) -> HistoryRequest {
        HistoryRequest {
            symbols: self.config.index.tickers.clone(),
            window: FetchWindow::LastDays(self.config.fetch.intraday_days),
            granularity: Granularity::OneMinute,
        }
    }

    fn history_request(&self) -> HistoryRequest {
        HistoryRequest {
            symbols: self.config.index.tickers.clone(),
            window: FetchWindow::LastDays(self.config.fetch.history_days),
            granularity: Granularity::Daily,
        }
    }

    /// Latest long-run level.
    ///
    /// Reads the levels artifact first; a recoverable store error (absent,
    /// corrupt, schema-drifted) falls back to recomputing the series from
    /// source and rewriting the artifact in canonical form.
    async fn last_level(&self) -> Result<Option<f64>, SnapshotError> {
        match self.store.read_levels() {
            Ok(levels) => Ok(levels.last().map(|p| p.level)),
            Err(err) if err.is_recoverable() => {
                warn!(error = %err, "levels artifact unusable; recomputing from source");
                self.refresh_levels().await
            }
            Err(err) => Err(err.into()),
        }
    }

    /// Recomputes the long-run level series from daily history.
    ///
    /// A failed or empty daily fetch degrades to `None` — the intraday
    /// snapshot still publishes, with `last_level` null. An out-of-range base
    /// date aborts the run.
    async fn refresh_levels(&self) -> Result<Option<f64>, SnapshotError> {
        let observations = match self.source.fetch_history(&self.history_request()).await {
            Ok(map) if !map.is_empty() => map,
            Ok(_) => {
                info!("no daily history available; last_level unavailable this run");
                return Ok(None);
            }
            Err(err) => {
                warn!(error = %err, "daily fetch failed; last_level unavailable this run");
                return Ok(None);
            }
        };

        let levels = long_run_composite(
            &observations,
            self.config.index.base_date,
            self.config.index.min_constituents,
        )?;
        if levels.is_empty() {
            return Ok(None);
        }

        self.store.ensure_dir()?;
        self.store.write_levels(&levels)?;
        Ok(levels.last().map(|p| p.level))
    }
}

/// Round to two decimals, the published precision for statistics.
fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
