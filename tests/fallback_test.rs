mod common;

use assert_cmd::cargo_bin;
use assert_cmd::prelude::*;
use common::commands_csv;
use predicates::prelude::*;
use std::process::Command;

#[cfg(not(feature = "storage-rocksdb"))]
#[test]
fn test_rocksdb_fallback_warning() {
    let csv = commands_csv(&["open,2026-01-01,a1,,c1,t1,1,100,,,,"]);

    let mut cmd = Command::new(cargo_bin!("gnpl-ledger"));
    cmd.arg(csv.path()).arg("--db-path").arg("some_db");

    cmd.assert()
        .success()
        .stderr(predicate::str::contains("Persistent storage requested via --db-path, but 'storage-rocksdb' feature is not enabled. Falling back to in-memory storage."))
        .stdout(predicate::str::contains("a1,c1,pending_approval"));
}

#[cfg(feature = "storage-rocksdb")]
#[test]
fn test_rocksdb_no_fallback_warning() {
    let csv = commands_csv(&["open,2026-01-01,a1,,c1,t1,1,100,,,,"]);

    let dir = tempfile::tempdir().unwrap();
    let db_path = dir.path().join("test_db");

    let mut cmd = Command::new(cargo_bin!("gnpl-ledger"));
    cmd.arg(csv.path()).arg("--db-path").arg(&db_path);

    cmd.assert()
        .success()
        .stderr(predicate::str::contains("WARN").not());
}
