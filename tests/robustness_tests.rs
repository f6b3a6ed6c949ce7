mod common;

use assert_cmd::cargo_bin;
use assert_cmd::prelude::*;
use common::commands_csv;
use predicates::prelude::*;
use std::process::Command;

#[test]
fn test_malformed_csv_handling() {
    let csv = commands_csv(&[
        "open,2026-01-01,a1,,c1,t1,1,1000,,,,",
        // Unknown operation
        "refund,2026-01-01,a1,,,,,,,,admin,",
        // Approval without an actor
        "approve,2026-01-01,a1,,,,,,,,,",
        // Unparsable timestamp
        "approve,tomorrow,a1,,,,,,,,admin,",
        "approve,2026-01-01,a1,,,,,,,,admin,",
    ]);

    let mut cmd = Command::new(cargo_bin!("gnpl-ledger"));
    cmd.arg(csv.path()).arg("--as-of").arg("2026-01-05");

    cmd.assert()
        .success()
        .stderr(predicate::str::contains("error reading command"))
        .stdout(predicate::str::contains(
            "a1,c1,approved,2026-01-31,0,1000.00,0.00,1000.00,0.00,0.00,0.00,1000.00,",
        ));
}

#[test]
fn test_business_rule_violations_are_skipped() {
    let csv = commands_csv(&[
        "open,2026-01-01,a1,,c1,t1,1,500,,,,",
        // Payment against an account still pending approval
        "submit,2026-01-01,a1,p1,,,,,100,RCPT-1,,",
        "approve,2026-01-02,a1,,,,,,,,admin,",
        // Second decision on the same application
        "reject,2026-01-02,a1,,,,,,,,admin,too late",
        "submit,2026-01-03,a1,p2,,,,,100,RCPT-2,,",
        // Duplicate reference
        "submit,2026-01-03,a1,p3,,,,,50,RCPT-2,,",
        // More than is owed
        "submit,2026-01-03,a1,p4,,,,,900,RCPT-4,,",
        // Unknown payment label
        "approve_payment,2026-01-04,,p9,,,,,,,admin,",
        "approve_payment,2026-01-04,,p2,,,,,,,admin,",
    ]);

    let mut cmd = Command::new(cargo_bin!("gnpl-ledger"));
    cmd.arg(csv.path());

    cmd.assert()
        .success()
        .stderr(predicate::str::contains("command rejected"))
        .stderr(predicate::str::contains("Invalid transition"))
        .stderr(predicate::str::contains("Validation error"))
        .stdout(predicate::str::contains(
            "a1,c1,approved,2026-02-01,0,500.00,100.00,400.00,0.00,0.00,0.00,400.00,",
        ));
}

#[test]
fn test_out_of_order_commands_are_skipped() {
    let csv = commands_csv(&[
        "open,2026-01-05,a1,,c1,t1,1,500,,,,",
        "open,2026-01-01,a2,,c2,t2,1,500,,,,",
    ]);

    let mut cmd = Command::new(cargo_bin!("gnpl-ledger"));
    cmd.arg(csv.path());

    cmd.assert()
        .success()
        .stderr(predicate::str::contains("command rejected"))
        .stdout(predicate::str::contains("a1,c1,pending_approval"))
        .stdout(predicate::str::contains("a2,").not());
}
