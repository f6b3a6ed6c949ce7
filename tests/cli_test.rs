use assert_cmd::cargo_bin;
use assert_cmd::prelude::*;
use predicates::prelude::*;
use std::process::Command;

#[test]
fn test_cli_end_to_end() -> Result<(), Box<dyn std::error::Error>> {
    let mut cmd = Command::new(cargo_bin!());
    cmd.arg("tests/fixtures/ledger.csv")
        .arg("--as-of")
        .arg("2026-02-10");

    cmd.assert()
        .success()
        .stdout(predicate::str::contains(
            "account,customer,status,due_date,overdue_days,principal_amount,principal_paid,principal_outstanding,penalty_accrued,penalty_paid,penalty_outstanding,total_due,id",
        ))
        // Ten days overdue: one full 7-day period at 5% of 1000
        .stdout(predicate::str::contains(
            "a1,c1,overdue,2026-01-31,10,1000.00,0.00,1000.00,50.00,0.00,50.00,1050.00,",
        ))
        .stdout(predicate::str::contains(
            "a2,c2,completed,2026-02-01,9,300.00,300.00,0.00,0.00,0.00,0.00,0.00,",
        ))
        .stdout(predicate::str::contains(
            "a3,c3,rejected,,0,200.00,0.00,200.00,0.00,0.00,0.00,200.00,",
        ))
        .stdout(predicate::str::contains(
            "a4,c1,pending_approval,,0,150.00,0.00,150.00,0.00,0.00,0.00,150.00,",
        ));

    Ok(())
}

#[test]
fn test_cli_penalty_flags() {
    let mut cmd = Command::new(cargo_bin!());
    cmd.arg("tests/fixtures/ledger.csv")
        .arg("--as-of")
        .arg("2026-02-10")
        .arg("--penalty-percent")
        .arg("10")
        .arg("--penalty-period-days")
        .arg("5");

    // Two 5-day periods at 10% of 1000
    cmd.assert().success().stdout(predicate::str::contains(
        "a1,c1,overdue,2026-01-31,10,1000.00,0.00,1000.00,200.00,0.00,200.00,1200.00,",
    ));
}

#[test]
fn test_cli_penalty_disabled_through_env() {
    let mut cmd = Command::new(cargo_bin!());
    cmd.arg("tests/fixtures/ledger.csv")
        .arg("--as-of")
        .arg("2026-03-31")
        .env("GNPL_PENALTY_ENABLED", "false");

    cmd.assert().success().stdout(predicate::str::contains(
        "a1,c1,overdue,2026-01-31,59,1000.00,0.00,1000.00,0.00,0.00,0.00,1000.00,",
    ));
}

#[test]
fn test_cli_defaults_to_last_command_time() {
    let mut cmd = Command::new(cargo_bin!());
    cmd.arg("tests/fixtures/ledger.csv");

    cmd.assert().success().stdout(predicate::str::contains(
        "a1,c1,approved,2026-01-31,0,1000.00,0.00,1000.00,0.00,0.00,0.00,1000.00,",
    ));
}

#[test]
fn test_cli_missing_input_fails() {
    let mut cmd = Command::new(cargo_bin!());
    cmd.arg("tests/fixtures/does_not_exist.csv");

    cmd.assert().failure();
}
