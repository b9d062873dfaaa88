//! Behaviour tests for merging blockchain.com chart exports.
//!
//! These tests check the daily reduction and the outer join from the point of
//! view of someone reading `advance_data.csv`.

mod support;

use std::path::PathBuf;

use cryptotick_core::table::write_metrics_table;
use cryptotick_core::{default_export_paths, merge_metric_files, MetricsError};
use tempfile::tempdir;
use time::macros::date;

use support::{chart_export, write_export};

const JAN_1_2024_MS: i64 = 1_704_067_200_000;
const HOUR_MS: i64 = 3_600_000;
const DAY_MS: i64 = 24 * HOUR_MS;

/// Four intraday observations per day for `days` days.
fn intraday(days: i64, base: f64) -> Vec<(i64, f64)> {
    (0..days)
        .flat_map(|day| {
            (0..4).map(move |slot| {
                (
                    JAN_1_2024_MS + day * DAY_MS + slot * 6 * HOUR_MS,
                    base + (day * 10 + slot) as f64,
                )
            })
        })
        .collect()
}

fn render(paths: &[PathBuf], seed: u64) -> String {
    let report = merge_metric_files(paths, seed);
    let mut out = Vec::new();
    write_metrics_table(&mut out, &report.table).expect("write table");
    String::from_utf8(out).expect("utf8")
}

#[test]
fn same_seed_produces_byte_identical_tables() {
    // Given: Two exports with several observations per day
    let dir = tempdir().expect("tempdir");
    let paths = vec![
        write_export(dir.path(), "hash-rate.json", &chart_export("hash-rate", &intraday(30, 1_000.0))),
        write_export(dir.path(), "mvrv.json", &chart_export("mvrv", &intraday(30, 2.0))),
    ];

    // When: The merge runs twice with seed 42
    let first = render(&paths, 42);
    let second = render(&paths, 42);

    // Then: The outputs are byte for byte equal
    assert_eq!(first, second);
    assert!(first.starts_with("Date,hash-rate,mvrv\n"));
    assert_eq!(first.lines().count(), 31);
}

#[test]
fn each_day_keeps_one_of_its_own_observations() {
    // Given: One export with four observations per day
    let dir = tempdir().expect("tempdir");
    let path = write_export(dir.path(), "nvt.json", &chart_export("nvt", &intraday(5, 100.0)));

    // When: It is merged
    let report = merge_metric_files(&[path], 7);

    // Then: Every day holds exactly one value drawn from that day
    assert_eq!(report.table.len(), 5);
    for (offset, day) in [
        date!(2024 - 01 - 01),
        date!(2024 - 01 - 02),
        date!(2024 - 01 - 03),
        date!(2024 - 01 - 04),
        date!(2024 - 01 - 05),
    ]
    .into_iter()
    .enumerate()
    {
        let value = report.table.value(day, "nvt").expect("value for every day");
        let lowest = 100.0 + (offset as f64) * 10.0;
        assert!((lowest..=lowest + 3.0).contains(&value), "{day}: {value}");
    }
}

#[test]
fn outer_join_keeps_every_date_and_leaves_gaps_blank() {
    // Given: Two metrics that only overlap on one day
    let dir = tempdir().expect("tempdir");
    let paths = vec![
        write_export(
            dir.path(),
            "cost-per-transaction.json",
            &chart_export("cost-per-transaction", &[(JAN_1_2024_MS, 50.0), (JAN_1_2024_MS + DAY_MS, 51.0)]),
        ),
        write_export(
            dir.path(),
            "trade-volume.json",
            &chart_export("trade-volume", &[(JAN_1_2024_MS + DAY_MS, 9.0), (JAN_1_2024_MS + 2 * DAY_MS, 8.0)]),
        ),
    ];

    // When: They are merged and written
    let table = render(&paths, 42);

    // Then: The union of dates appears with empty cells where a metric is absent
    assert_eq!(
        table,
        "Date,cost-per-transaction,trade-volume\n\
         2024-01-01,50.0,\n\
         2024-01-02,51.0,9.0\n\
         2024-01-03,,8.0\n"
    );
}

#[test]
fn broken_file_is_reported_and_the_rest_still_merge() {
    // Given: The default catalogue under a directory where only two exports exist
    let dir = tempdir().expect("tempdir");
    write_export(dir.path(), "mvrv.json", &chart_export("mvrv", &[(JAN_1_2024_MS, 2.1)]));
    write_export(dir.path(), "nvt.json", "{ this is not json");

    // When: The default file list is merged
    let paths = default_export_paths(dir.path());
    let report = merge_metric_files(&paths, 42);

    // Then: The good export is loaded and each other file is a typed failure
    assert_eq!(report.loaded, vec![dir.path().join("mvrv.json")]);
    assert_eq!(report.failures.len(), 9);
    assert!(report
        .failures
        .iter()
        .any(|failure| matches!(failure, MetricsError::Json { .. })));
    assert_eq!(
        report
            .failures
            .iter()
            .filter(|failure| matches!(failure, MetricsError::Io { .. }))
            .count(),
        8
    );
    assert_eq!(report.table.metrics(), ["mvrv"]);
}

#[test]
fn export_without_metric_name_is_rejected() {
    // Given: A JSON document missing the `metric1` key
    let dir = tempdir().expect("tempdir");
    let path = write_export(dir.path(), "odd.json", r#"{"hash-rate":[{"x":0,"y":1.0}]}"#);

    // When: It is merged
    let report = merge_metric_files(&[path], 42);

    // Then: Nothing is loaded and the failure says why
    assert!(report.table.is_empty());
    assert_eq!(report.failures[0].code(), "metrics.missing_name");
}
