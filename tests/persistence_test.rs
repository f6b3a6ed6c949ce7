#![cfg(feature = "storage-rocksdb")]

mod common;

use assert_cmd::cargo_bin;
use common::commands_csv;
use std::process::Command;
use tempfile::tempdir;

#[test]
fn test_rocksdb_persistence_recovery() {
    let dir = tempdir().unwrap();
    let db_path = dir.path().join("test_db");

    // 1. First run: open and approve an account
    let csv1 = commands_csv(&[
        "open,2026-01-01,a1,,c1,t1,1,1000,,,,",
        "approve,2026-01-01,a1,,,,,,,,admin,",
    ]);

    let mut cmd1 = Command::new(cargo_bin!("gnpl-ledger"));
    cmd1.arg(csv1.path()).arg("--db-path").arg(&db_path);

    let output1 = cmd1.output().expect("Failed to execute command");
    assert!(output1.status.success());
    let stdout1 = String::from_utf8_lossy(&output1.stdout);
    let row = stdout1
        .lines()
        .find(|line| line.starts_with("a1,"))
        .expect("missing a1 row");
    assert!(row.starts_with("a1,c1,approved,2026-01-31,0,1000.00,"));
    let account_id = row.rsplit(',').next().unwrap().to_string();

    // 2. Second run: pay against the stored account by its id
    let submit = format!("submit,2026-02-10,{account_id},p1,,,,,400,RCPT-1,,");
    let csv2 = commands_csv(&[&submit, "approve_payment,2026-02-10,,p1,,,,,,,admin,"]);

    let mut cmd2 = Command::new(cargo_bin!("gnpl-ledger"));
    cmd2.arg(csv2.path()).arg("--db-path").arg(&db_path);

    let output2 = cmd2.output().expect("Failed to execute command");
    assert!(output2.status.success());
    let stdout2 = String::from_utf8_lossy(&output2.stdout);

    // The 50.00 penalty is settled first, the rest reduces principal
    assert!(stdout2.contains(&format!(
        "{account_id},c1,overdue,2026-01-31,10,1000.00,350.00,650.00,32.50,50.00,0.00,650.00,{account_id}"
    )));
}
