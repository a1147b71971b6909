mod common;

use assert_cmd::cargo_bin;
use assert_cmd::prelude::*;
use common::{csv_row, write_payments_csv};
use predicates::prelude::*;
use std::process::Command;

#[cfg(not(feature = "storage-rocksdb"))]
#[test]
fn test_rocksdb_fallback_warning() {
    let dir = tempfile::tempdir().unwrap();
    let csv_path = dir.path().join("payments.csv");
    write_payments_csv(&csv_path, &[csv_row("Jane", "Smith", "due", "100")]).unwrap();

    let mut cmd = Command::new(cargo_bin!("payledger"));
    cmd.arg("import")
        .arg(&csv_path)
        .arg("--db-path")
        .arg(dir.path().join("some_db"));

    cmd.assert()
        .success()
        .stderr(predicate::str::contains("Persistent storage requested via --db-path, but 'storage-rocksdb' feature is not enabled. Falling back to in-memory storage."));
}

#[cfg(feature = "storage-rocksdb")]
#[test]
fn test_rocksdb_no_fallback_warning() {
    let dir = tempfile::tempdir().unwrap();
    let csv_path = dir.path().join("payments.csv");
    write_payments_csv(&csv_path, &[csv_row("Jane", "Smith", "due", "100")]).unwrap();

    let mut cmd = Command::new(cargo_bin!("payledger"));
    cmd.arg("import")
        .arg(&csv_path)
        .arg("--db-path")
        .arg(dir.path().join("test_db"));

    cmd.assert()
        .success()
        .stderr(predicate::str::contains("Falling back").not());
}
