//! End-to-end integration tests for the complete cost splitting flow.
//!
//! Drives the `court` binary: roster → sessions → settings → report.

use std::path::Path;
use std::process::{Command, Output};

use tempfile::TempDir;

fn court_binary() -> String {
    env!("CARGO_BIN_EXE_court").to_string()
}

/// Runs `court` with its config and data isolated in `temp`.
fn court(temp: &Path, args: &[&str]) -> Output {
    Command::new(court_binary())
        .env("HOME", temp)
        .env("XDG_CONFIG_HOME", temp.join("config"))
        .env("XDG_DATA_HOME", temp.join("data"))
        .env("COURT_DATABASE_PATH", temp.join("court.db"))
        .env("COURT_CURRENCY_LABEL", "VND")
        .env_remove("RUST_LOG")
        .args(args)
        .output()
        .expect("failed to run court")
}

/// Runs `court` and asserts success, returning stdout.
fn court_ok(temp: &Path, args: &[&str]) -> String {
    let output = court(temp, args);
    assert!(
        output.status.success(),
        "court {args:?} should succeed: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    String::from_utf8(output.stdout).unwrap()
}

fn report_json(temp: &Path) -> serde_json::Value {
    serde_json::from_str(&court_ok(temp, &["report", "--json"])).unwrap()
}

fn player_total(report: &serde_json::Value, name: &str) -> i64 {
    report["players"]
        .as_array()
        .unwrap()
        .iter()
        .find(|p| p["participant"]["name"] == name)
        .unwrap_or_else(|| panic!("{name} missing from report"))["total_cost"]
        .as_i64()
        .unwrap()
}

/// Two regulars and a drop-in sharing one court session.
#[test]
fn test_mixed_session_flow() {
    let temp = TempDir::new().unwrap();
    let dir = temp.path();

    court_ok(dir, &["player", "add", "An"]);
    court_ok(dir, &["player", "add", "Binh"]);
    court_ok(dir, &["player", "add", "Chi", "--drop-in"]);
    court_ok(dir, &["session", "add", "--date", "2025-03-07"]);
    court_ok(dir, &["session", "attend", "1", "An", "Binh", "Chi"]);
    court_ok(dir, &["settings", "set", "--base-fee", "100000"]);

    let report = report_json(dir);
    assert_eq!(player_total(&report, "An"), 28_333);
    assert_eq!(player_total(&report, "Binh"), 28_333);
    assert_eq!(player_total(&report, "Chi"), 43_333);
    assert_eq!(report["total_collected"], 99_999);

    let text = court_ok(dir, &["report"]);
    assert!(text.contains("COST REPORT: 1 session, 3 players"));
    assert!(text.contains("Total to collect:     99.999 VND"));
}

/// Shuttlecocks bought for the month are spread over every session.
#[test]
fn test_shuttlecocks_amortized_over_sessions() {
    let temp = TempDir::new().unwrap();
    let dir = temp.path();

    court_ok(dir, &["player", "add", "An"]);
    for date in ["2025-03-04", "2025-03-11", "2025-03-18", "2025-03-25"] {
        court_ok(dir, &["session", "add", "--date", date]);
    }
    court_ok(
        dir,
        &[
            "settings",
            "set",
            "--base-fee",
            "50000",
            "--unit-price",
            "20000",
            "--unit-count",
            "3",
        ],
    );
    court_ok(dir, &["session", "attend", "2", "1"]);

    let report = report_json(dir);
    assert_eq!(report["baseline"]["per_session_base_cost"], 65_000.0);
    assert_eq!(player_total(&report, "An"), 65_000);

    let settings = court_ok(dir, &["settings", "show"]);
    assert!(settings.contains("Per session:      65.000 VND"));
}

/// Duplicate names are rejected with a descriptive message.
#[test]
fn test_duplicate_player_rejected() {
    let temp = TempDir::new().unwrap();
    let dir = temp.path();

    court_ok(dir, &["player", "add", "Linh"]);
    let output = court(dir, &["player", "add", "LINH"]);
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(
        stderr.contains("a participant named \"LINH\" already exists"),
        "unexpected stderr: {stderr}"
    );

    let players: serde_json::Value =
        serde_json::from_str(&court_ok(dir, &["player", "list", "--json"])).unwrap();
    assert_eq!(players.as_array().unwrap().len(), 1);
}

/// Removing a player keeps everybody else's costs as if they never attended.
#[test]
fn test_removed_player_is_ignored() {
    let temp = TempDir::new().unwrap();
    let dir = temp.path();

    court_ok(dir, &["player", "add", "An"]);
    court_ok(dir, &["player", "add", "Binh"]);
    court_ok(dir, &["player", "add", "Chi"]);
    court_ok(dir, &["session", "add", "--date", "2025-03-07"]);
    court_ok(dir, &["settings", "set", "--base-fee", "90000"]);
    court_ok(dir, &["session", "attend", "1", "An", "Binh", "Chi"]);
    court_ok(dir, &["player", "remove", "Chi"]);

    let report = report_json(dir);
    assert_eq!(report["players"].as_array().unwrap().len(), 2);
    assert_eq!(player_total(&report, "An"), 45_000);
    assert_eq!(player_total(&report, "Binh"), 45_000);

    let sessions = court_ok(dir, &["session", "list"]);
    assert!(sessions.contains("Removed:   1 no longer on the roster"));
}

/// A session nobody attended costs nothing, whatever its fees.
#[test]
fn test_empty_session_costs_nothing() {
    let temp = TempDir::new().unwrap();
    let dir = temp.path();

    court_ok(dir, &["player", "add", "An"]);
    court_ok(dir, &["session", "add", "--date", "2025-03-07"]);
    court_ok(
        dir,
        &["session", "fees", "1", "--incidental", "30000", "--consumable", "5000"],
    );
    court_ok(dir, &["settings", "set", "--base-fee", "100000"]);

    let report = report_json(dir);
    assert_eq!(report["total_collected"], 0);
    assert_eq!(report["players"][0]["sessions"][0]["participated"], false);
    assert_eq!(report["sessions"][0]["total_cost"], 135_000);
}

/// Payment details are stored and shown once money is owed.
#[test]
fn test_payment_details_in_report() {
    let temp = TempDir::new().unwrap();
    let dir = temp.path();

    court_ok(dir, &["player", "add", "An"]);
    court_ok(dir, &["session", "add", "--date", "2025-03-07"]);
    court_ok(dir, &["session", "attend", "1", "An"]);
    court_ok(dir, &["settings", "set", "--base-fee", "40000"]);
    court_ok(
        dir,
        &["payment", "set", "--bank-name", "ACB", "--account-number", "99887766"],
    );

    let text = court_ok(dir, &["report"]);
    assert!(text.contains("Bank:    ACB"));
    assert!(text.contains("Account: 99887766"));

    let report = report_json(dir);
    assert_eq!(report["payment"]["bank_name"], "ACB");
}

/// Status works against a fresh database.
#[test]
fn test_status_on_fresh_install() {
    let temp = TempDir::new().unwrap();
    let text = court_ok(temp.path(), &["status"]);
    assert!(text.contains("Players:  0"));
    assert!(text.contains("No sessions recorded."));
    assert!(temp.path().join("court.db").exists());
}
