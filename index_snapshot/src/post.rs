//! Short text summary handed to the posting collaborator.

use crate::artifacts::SnapshotStats;

/// Signed percent with two decimals and an explicit `+` for non-negative
/// values.
pub fn fmt_signed_pct(value: f64) -> String {
    format!("{value:+.2}%")
}

/// One-line intraday summary: key, signed percent, constituents, JST stamp.
pub fn intraday_post(stats: &SnapshotStats) -> String {
    format!(
        "{} intraday: {} | {} | updated {} (JST)",
        stats.key,
        fmt_signed_pct(stats.pct_intraday),
        stats.tickers.join("/"),
        stats.updated_at,
    )
}
