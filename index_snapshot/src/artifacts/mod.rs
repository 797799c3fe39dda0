//! Durable artifact store for snapshot outputs.
//!
//! ## What this does
//! - Writes the canonical intraday table, long-run levels table, stats JSON,
//!   post text and heartbeat into one output directory.
//! - Reads the levels table back for later runs, reconciling historical
//!   column-name drift (see [`schema`]).
//!
//! ## Overwrite semantics
//! Each run's output is self-consistent and supersedes the previous one, so
//! every write replaces the prior artifact — no append or merge. Writes go to
//! a `.tmp` sibling first and rename over the target, so a crashed run never
//! leaves a half-written artifact behind.
//!
//! ## Read-side resilience
//! A missing, corrupt, empty or schema-drifted artifact is a *recoverable*
//! error ([`StoreError::is_recoverable`]): it means "recompute from source",
//! never "fail the run".

pub mod errors;
pub mod schema;

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use chrono::{NaiveDate, SecondsFormat};
use serde::{Deserialize, Serialize};
use snafu::{OptionExt, ResultExt};

use crate::composite::{CompositeSeries, LevelPoint, LevelSeries};

use self::errors::{EncodeSnafu, MissingSnafu, SchemaMismatchSnafu, StoreError, WriteSnafu};
use self::schema::{
    DATE_FIELD, LEVEL_FIELD, PCT_FIELD, parse_artifact_date, parse_numeric, resolve_column,
};

/// Intraday composite table.
pub const INTRADAY_CSV: &str = "qbit_5_intraday.csv";
/// Long-run levels table.
pub const LEVELS_CSV: &str = "qbit_5_levels.csv";
/// Stats summary object.
pub const STATS_JSON: &str = "qbit_5_stats.json";
/// Post text.
pub const POST_TXT: &str = "qbit_5_post_intraday.txt";
/// Legacy post path some site templates still read.
pub const POST_TXT_COMPAT: &str = "post_intraday.txt";
/// Heartbeat consumed as a cache-invalidation signal.
pub const HEARTBEAT_TXT: &str = "last_run.txt";

/// Single-point-in-time record published alongside the series.
///
/// Recomputed every run; the previous value is overwritten, never merged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SnapshotStats {
    /// Published index key.
    pub key: String,
    /// Intraday change versus session open, percent, two decimals.
    pub pct_intraday: f64,
    /// JST wall-clock stamp of this run.
    pub updated_at: String,
    /// Always `"pct"`.
    pub unit: String,
    /// Latest long-run level, two decimals; `None` when unavailable.
    pub last_level: Option<f64>,
    /// Base date of the long-run normalization.
    pub base_date: NaiveDate,
    /// Constituents in configured order.
    pub tickers: Vec<String>,
}

/// Owns the on-disk representation of every snapshot artifact.
pub struct ArtifactStore {
    dir: PathBuf,
}

impl ArtifactStore {
    /// Store rooted at `dir`. Nothing is touched until the first write.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// The output directory.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Creates the output directory if needed.
    pub fn ensure_dir(&self) -> Result<(), StoreError> {
        fs::create_dir_all(&self.dir).context(WriteSnafu {
            path: self.dir.display().to_string(),
        })
    }

    fn path(&self, name: &str) -> PathBuf {
        self.dir.join(name)
    }

    /// Atomic overwrite: write to a `.tmp` sibling, rename over the target.
    fn write_atomic(&self, name: &str, bytes: &[u8]) -> Result<PathBuf, StoreError> {
        let path = self.path(name);
        let tmp = path.with_extension("tmp");
        fs::write(&tmp, bytes).context(WriteSnafu {
            path: tmp.display().to_string(),
        })?;
        fs::rename(&tmp, &path).context(WriteSnafu {
            path: path.display().to_string(),
        })?;
        Ok(path)
    }

    /// Writes the canonical intraday table.
    pub fn write_intraday(&self, series: &CompositeSeries) -> Result<PathBuf, StoreError> {
        let mut writer = csv::Writer::from_writer(Vec::new());
        let encode = |message: String| {
            EncodeSnafu {
                path: INTRADAY_CSV.to_string(),
                message,
            }
            .build()
        };

        writer
            .write_record(["timestamp_utc", "level", "change_pct"])
            .map_err(|e| encode(e.to_string()))?;
        for point in &series.points {
            writer
                .write_record([
                    point
                        .timestamp
                        .to_rfc3339_opts(SecondsFormat::Secs, true),
                    format!("{:.6}", point.level),
                    format!("{:.6}", point.change_pct),
                ])
                .map_err(|e| encode(e.to_string()))?;
        }

        let bytes = writer.into_inner().map_err(|e| encode(e.to_string()))?;
        self.write_atomic(INTRADAY_CSV, &bytes)
    }

    /// Writes the canonical long-run levels table.
    pub fn write_levels(&self, series: &LevelSeries) -> Result<PathBuf, StoreError> {
        let mut writer = csv::Writer::from_writer(Vec::new());
        let encode = |message: String| {
            EncodeSnafu {
                path: LEVELS_CSV.to_string(),
                message,
            }
            .build()
        };

        writer
            .write_record(["date", "level", "change_pct"])
            .map_err(|e| encode(e.to_string()))?;
        for point in &series.points {
            writer
                .write_record([
                    point.date.format("%Y-%m-%d").to_string(),
                    format!("{:.6}", point.level),
                    format!("{:.6}", point.change_pct),
                ])
                .map_err(|e| encode(e.to_string()))?;
        }

        let bytes = writer.into_inner().map_err(|e| encode(e.to_string()))?;
        self.write_atomic(LEVELS_CSV, &bytes)
    }

    /// Reads the levels table back, tolerating historical schema drift.
    ///
    /// Errors:
    /// - [`StoreError::Missing`] when the file is absent, unreadable, or
    ///   holds no parseable rows (recoverable)
    /// - [`StoreError::SchemaMismatch`] when no column satisfies a required
    ///   field's aliases (recoverable)
    pub fn read_levels(&self) -> Result<LevelSeries, StoreError> {
        let path = self.path(LEVELS_CSV);
        let display = path.display().to_string();

        let raw = fs::read_to_string(&path).ok().context(MissingSnafu {
            path: display.clone(),
        })?;

        let mut reader = csv::ReaderBuilder::new()
            .flexible(true)
            .from_reader(raw.as_bytes());
        let headers: Vec<String> = reader
            .headers()
            .ok()
            .context(MissingSnafu {
                path: display.clone(),
            })?
            .iter()
            .map(str::to_string)
            .collect();

        let date_col = resolve_column(&headers, &DATE_FIELD).context(SchemaMismatchSnafu {
            path: display.clone(),
            field: DATE_FIELD.field,
        })?;
        let level_col = resolve_column(&headers, &LEVEL_FIELD).context(SchemaMismatchSnafu {
            path: display.clone(),
            field: LEVEL_FIELD.field,
        })?;
        let pct_col = resolve_column(&headers, &PCT_FIELD);

        let mut by_date: BTreeMap<NaiveDate, LevelPoint> = BTreeMap::new();
        for record in reader.records() {
            // Ragged or unparseable rows are skipped, not fatal.
            let Ok(record) = record else { continue };
            let Some(date) = record.get(date_col).and_then(parse_artifact_date) else {
                continue;
            };
            let Some(level) = record.get(level_col).and_then(parse_numeric) else {
                continue;
            };
            let change_pct = pct_col
                .and_then(|col| record.get(col))
                .and_then(parse_numeric)
                .unwrap_or(level - 100.0);

            // Duplicate dates: last write wins.
            by_date.insert(
                date,
                LevelPoint {
                    date,
                    level,
                    change_pct,
                },
            );
        }

        if by_date.is_empty() {
            return MissingSnafu { path: display }.fail();
        }

        Ok(LevelSeries {
            points: by_date.into_values().collect(),
        })
    }

    /// Writes the stats summary object.
    pub fn write_stats(&self, stats: &SnapshotStats) -> Result<PathBuf, StoreError> {
        let mut bytes = serde_json::to_vec_pretty(stats).map_err(|e| {
            EncodeSnafu {
                path: STATS_JSON.to_string(),
                message: e.to_string(),
            }
            .build()
        })?;
        bytes.push(b'\n');
        self.write_atomic(STATS_JSON, &bytes)
    }

    /// Writes the post body to both paths the site reads.
    pub fn write_post(&self, body: &str) -> Result<(), StoreError> {
        self.write_atomic(POST_TXT, body.as_bytes())?;
        self.write_atomic(POST_TXT_COMPAT, body.as_bytes())?;
        Ok(())
    }

    /// Writes the heartbeat line.
    pub fn write_heartbeat(&self, line: &str) -> Result<PathBuf, StoreError> {
        self.write_atomic(HEARTBEAT_TXT, format!("{line}\n").as_bytes())
    }
}
