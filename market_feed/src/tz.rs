//! Time zone conversion boundary for the snapshot pipeline.
//!
//! What this module provides:
//! - [`eastern_trading_date`]: the US-Eastern calendar date of a UTC instant,
//!   which is what "one trading session" means for US listings.
//! - [`eastern_day_close`]: the final second of an eastern calendar day as a
//!   UTC instant, used as the right-censored cutoff for base-date lookups.
//! - [`jst_stamp`]: JST wall-clock formatting, the display convention for
//!   `updated_at` and the post text.
//!
//! Notes:
//! - Provider timestamps are canonicalized to UTC at ingest; everything after
//!   that converts through this module only.
//! - Partitioning by the UTC date instead of the eastern date would split an
//!   afternoon US session across two days.

use chrono::offset::LocalResult;
use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use chrono_tz::America::New_York;
use chrono_tz::Asia::Tokyo;

/// Calendar date of `ts` in US-Eastern wall-clock time (DST-correct).
pub fn eastern_trading_date(ts: DateTime<Utc>) -> NaiveDate {
    ts.with_timezone(&New_York).date_naive()
}

/// Final second (23:59:59 wall clock) of `date` in US-Eastern, as a UTC
/// instant.
///
/// US DST transitions happen at 02:00 local, so 23:59:59 is never ambiguous
/// or nonexistent; the fallback arms only satisfy the type.
pub fn eastern_day_close(date: NaiveDate) -> DateTime<Utc> {
    let wall = date
        .and_hms_opt(23, 59, 59)
        .expect("23:59:59 is a valid wall-clock time");
    match New_York.from_local_datetime(&wall) {
        LocalResult::Single(dt) => dt.with_timezone(&Utc),
        LocalResult::Ambiguous(_, latest) => latest.with_timezone(&Utc),
        LocalResult::None => Utc.from_utc_datetime(&wall),
    }
}

/// `ts` formatted as `%Y/%m/%d %H:%M` in Japan Standard Time.
pub fn jst_stamp(ts: DateTime<Utc>) -> String {
    ts.with_timezone(&Tokyo).format("%Y/%m/%d %H:%M").to_string()
}
