use std::fs;

use chrono::NaiveDate;
use tempfile::tempdir;

use index_snapshot::artifacts::{ArtifactStore, LEVELS_CSV};
use index_snapshot::composite::{LevelPoint, LevelSeries};

fn date(day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 3, day).unwrap()
}

fn level_series(rows: &[(u32, f64)]) -> LevelSeries {
    LevelSeries {
        points: rows
            .iter()
            .map(|&(day, level)| LevelPoint {
                date: date(day),
                level,
                change_pct: level - 100.0,
            })
            .collect(),
    }
}

#[test]
fn round_trip_preserves_the_series() {
    let dir = tempdir().unwrap();
    let store = ArtifactStore::new(dir.path());
    store.ensure_dir().unwrap();

    let written = level_series(&[(10, 100.0), (11, 101.234567), (12, 98.7)]);
    store.write_levels(&written).unwrap();
    let read = store.read_levels().unwrap();

    assert_eq!(read.points.len(), written.points.len());
    for (a, b) in written.points.iter().zip(read.points.iter()) {
        assert_eq!(a.date, b.date);
        assert!((a.level - b.level).abs() < 1e-6);
        assert!((a.change_pct - b.change_pct).abs() < 1e-6);
    }
}

#[test]
fn legacy_alias_headers_resolve_to_the_same_series() {
    let dir = tempdir().unwrap();
    let store = ArtifactStore::new(dir.path());

    // A file written by an old producer version.
    fs::write(
        dir.path().join(LEVELS_CSV),
        "Date,Close\n2025-03-10,100.5\n2025-03-11,103.25\n",
    )
    .unwrap();
    let legacy = store.read_levels().unwrap();

    // The same table under canonical headers.
    fs::write(
        dir.path().join(LEVELS_CSV),
        "date,level\n2025-03-10,100.5\n2025-03-11,103.25\n",
    )
    .unwrap();
    let canonical = store.read_levels().unwrap();

    assert_eq!(legacy.points.len(), 2);
    for (a, b) in legacy.points.iter().zip(canonical.points.iter()) {
        assert_eq!(a.date, b.date);
        assert!((a.level - b.level).abs() < 1e-9);
    }
    // Without a pct column, the identity pins change_pct to level - 100.
    assert!((legacy.points[1].change_pct - 3.25).abs() < 1e-9);
}

#[test]
fn rfc3339_timestamp_column_is_reduced_to_utc_dates() {
    let dir = tempdir().unwrap();
    let store = ArtifactStore::new(dir.path());

    fs::write(
        dir.path().join(LEVELS_CSV),
        "timestamp_utc,index_level,pct_vs_open\n\
         2025-03-10T20:00:00Z,100.0,0.0\n\
         2025-03-11T20:00:00Z,102.0,2.0\n",
    )
    .unwrap();

    let read = store.read_levels().unwrap();
    assert_eq!(read.points[0].date, date(10));
    assert_eq!(read.points[1].date, date(11));
    assert!((read.points[1].level - 102.0).abs() < 1e-9);
}

#[test]
fn duplicate_dates_keep_the_last_row() {
    let dir = tempdir().unwrap();
    let store = ArtifactStore::new(dir.path());

    fs::write(
        dir.path().join(LEVELS_CSV),
        "date,level\n2025-03-10,100.0\n2025-03-10,105.0\n",
    )
    .unwrap();

    let read = store.read_levels().unwrap();
    assert_eq!(read.points.len(), 1);
    assert!((read.points[0].level - 105.0).abs() < 1e-9);
}

#[test]
fn unparseable_rows_are_skipped_not_fatal() {
    let dir = tempdir().unwrap();
    let store = ArtifactStore::new(dir.path());

    fs::write(
        dir.path().join(LEVELS_CSV),
        "date,level\nnot-a-date,100.0\n2025-03-11,bogus\n2025-03-12,101.5\n",
    )
    .unwrap();

    let read = store.read_levels().unwrap();
    assert_eq!(read.points.len(), 1);
    assert_eq!(read.points[0].date, date(12));
}

#[test]
fn missing_artifact_is_recoverable() {
    let dir = tempdir().unwrap();
    let store = ArtifactStore::new(dir.path());

    let err = store.read_levels().unwrap_err();
    assert!(err.is_recoverable());
}

#[test]
fn empty_and_junk_artifacts_are_recoverable() {
    let dir = tempdir().unwrap();
    let store = ArtifactStore::new(dir.path());

    fs::write(dir.path().join(LEVELS_CSV), "").unwrap();
    assert!(store.read_levels().unwrap_err().is_recoverable());

    fs::write(dir.path().join(LEVELS_CSV), "date,level\n").unwrap();
    assert!(store.read_levels().unwrap_err().is_recoverable());
}

#[test]
fn unresolvable_required_field_is_recoverable() {
    let dir = tempdir().unwrap();
    let store = ArtifactStore::new(dir.path());

    fs::write(dir.path().join(LEVELS_CSV), "foo,bar\n1,2\n").unwrap();
    let err = store.read_levels().unwrap_err();
    assert!(err.is_recoverable());
    assert!(err.to_string().contains("no column"));
}

#[test]
fn writes_replace_prior_artifacts_atomically() {
    let dir = tempdir().unwrap();
    let store = ArtifactStore::new(dir.path());
    store.ensure_dir().unwrap();

    store.write_levels(&level_series(&[(10, 100.0)])).unwrap();
    store
        .write_levels(&level_series(&[(10, 100.0), (11, 104.0)]))
        .unwrap();

    let read = store.read_levels().unwrap();
    assert_eq!(read.points.len(), 2);

    // The temp sibling never survives a completed write.
    assert!(!dir.path().join("qbit_5_levels.tmp").exists());
}
