use std::path::{Path, PathBuf};

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

fn resource(name: &str) -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("resources")
        .join(name)
}

/// A finrep command whose settings and data live inside `home`.
fn finrep(home: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("finrep").unwrap();
    cmd.env("HOME", home.path())
        .env_remove("FINREP_LOG")
        .env("NO_COLOR", "1");
    cmd
}

fn initialized() -> TempDir {
    let home = tempfile::tempdir().unwrap();
    let data_dir = home.path().join("data");
    finrep(&home)
        .args(["init", "--data-dir"])
        .arg(&data_dir)
        .assert()
        .success()
        .stdout(predicate::str::contains("Initialized finrep"));
    home
}

fn upload_march(home: &TempDir) {
    finrep(home)
        .arg("upload")
        .arg(resource("march_pack.xlsx"))
        .args(["--month", "2025-03"])
        .assert()
        .success()
        .stdout(predicate::str::contains("processed successfully"))
        .stdout(predicate::str::contains("22 line items, 2 red flags, 2 entities"))
        .stdout(predicate::str::contains("Ignored sheets: Cover"));
}

#[test]
fn help_lists_commands() {
    let home = tempfile::tempdir().unwrap();
    finrep(&home)
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("upload"))
        .stdout(predicate::str::contains("dashboard"));
}

#[test]
fn init_creates_database() {
    let home = initialized();
    assert!(home.path().join("data").join("finrep.db").exists());
    assert!(home.path().join("data").join("uploads").is_dir());
    assert!(home.path().join(".config/finrep/settings.json").exists());

    finrep(&home)
        .arg("status")
        .assert()
        .success()
        .stdout(predicate::str::contains("Reports:       0 (0 processed)"))
        .stdout(predicate::str::contains("Entity scope:  sheet"));
}

#[test]
fn bad_entity_scope_in_settings_keeps_data_dir() {
    let home = initialized();
    let data_dir = home.path().join("data");
    let settings = serde_json::json!({
        "data_dir": data_dir.to_string_lossy(),
        "entity_scope": "row",
    });
    std::fs::write(
        home.path().join(".config/finrep/settings.json"),
        settings.to_string(),
    )
    .unwrap();

    finrep(&home)
        .arg("status")
        .assert()
        .success()
        .stdout(predicate::str::contains(format!("Data dir:      {}", data_dir.display())))
        .stdout(predicate::str::contains("Entity scope:  sheet"))
        .stdout(predicate::str::contains("Reports:       0 (0 processed)"));
}

#[test]
fn init_rejects_unknown_entity_scope() {
    let home = tempfile::tempdir().unwrap();
    finrep(&home)
        .args(["init", "--entity-scope", "bogus"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Unknown option: bogus"));
}

#[test]
fn upload_missing_file_fails() {
    let home = initialized();
    finrep(&home)
        .args(["upload", "nope.xlsx", "--month", "2025-03"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("File not found"));
}

#[test]
fn upload_rejects_bad_month() {
    let home = initialized();
    finrep(&home)
        .arg("upload")
        .arg(resource("march_pack.xlsx"))
        .args(["--month", "March"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid month 'March'"));
}

#[test]
fn dashboard_without_reports_fails() {
    let home = initialized();
    finrep(&home)
        .args(["dashboard", "--month", "2025-03"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Report not found"));
}

#[test]
fn dry_run_saves_nothing() {
    let home = initialized();
    finrep(&home)
        .arg("upload")
        .arg(resource("march_pack.xlsx"))
        .args(["--month", "2025-03", "--dry-run"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Dry run, nothing saved."))
        .stdout(predicate::str::contains("22 line items, 2 red flags, 2 entities"));

    finrep(&home)
        .arg("files")
        .assert()
        .success()
        .stdout(predicate::str::contains("No files uploaded yet."));
}

#[test]
fn upload_then_report() {
    let home = initialized();
    upload_march(&home);

    finrep(&home)
        .arg("files")
        .assert()
        .success()
        .stdout(predicate::str::contains("march_pack.xlsx"))
        .stdout(predicate::str::contains("Processed"));

    finrep(&home)
        .args(["dashboard", "--month", "2025-03"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Dashboard 2025-03 (march_pack.xlsx)"))
        .stdout(predicate::str::contains("$1,200.00"))
        .stdout(predicate::str::contains("Kenya Ltd"))
        .stdout(predicate::str::contains("ProjectX"))
        .stdout(predicate::str::contains("Overrun on logistics"));

    finrep(&home)
        .args(["pnl", "--month", "2025-03", "--target", "revenue"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Group Revenue"))
        .stdout(predicate::str::contains("Travel Expenses").not());

    finrep(&home)
        .args(["analysis", "--month", "2025-03", "--kind", "cost"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Cost breakdown 2025-03"))
        .stdout(predicate::str::contains("Opex - Salaries"));

    finrep(&home)
        .args(["benchmark", "--month", "2025-03"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Benchmark, 12 months to 2025-03"))
        .stdout(predicate::str::contains("$1,200.00"))
        .stdout(predicate::str::contains("+0.0%"));

    finrep(&home)
        .arg("status")
        .assert()
        .success()
        .stdout(predicate::str::contains("Reports:       1 (1 processed)"))
        .stdout(predicate::str::contains("Latest month:  2025-03"))
        .stdout(predicate::str::contains("Line items:    22"));
}

#[test]
fn duplicate_upload_is_skipped() {
    let home = initialized();
    upload_march(&home);

    finrep(&home)
        .arg("upload")
        .arg(resource("march_pack.xlsx"))
        .args(["--month", "2025-03"])
        .assert()
        .success()
        .stdout(predicate::str::contains("already been uploaded"));

    finrep(&home)
        .arg("status")
        .assert()
        .success()
        .stdout(predicate::str::contains("Reports:       1 (1 processed)"));
}

#[test]
fn failing_sheet_rolls_back_everything() {
    let home = initialized();
    finrep(&home)
        .arg("upload")
        .arg(resource("broken_pack.xlsx"))
        .args(["--month", "2025-03"])
        .assert()
        .failure()
        .stderr(predicate::str::contains(
            "Error processing sheet 'Red flags': layout expects 7 columns, sheet has 8",
        ));

    finrep(&home)
        .arg("status")
        .assert()
        .success()
        .stdout(predicate::str::contains("Reports:       0 (0 processed)"))
        .stdout(predicate::str::contains("Line items:    0"));

    let uploads = home.path().join("data").join("uploads");
    assert_eq!(std::fs::read_dir(uploads).unwrap().count(), 0);
}

#[test]
fn garbage_workbook_leaves_nothing_behind() {
    let home = initialized();
    let bogus = home.path().join("bogus.xlsx");
    std::fs::write(&bogus, b"not a spreadsheet").unwrap();

    finrep(&home)
        .arg("upload")
        .arg(&bogus)
        .args(["--month", "2025-03"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Error:"));

    finrep(&home)
        .arg("files")
        .assert()
        .success()
        .stdout(predicate::str::contains("No files uploaded yet."));
}

#[test]
fn export_and_delete() {
    let home = initialized();
    upload_march(&home);

    let out = home.path().join("march.csv");
    finrep(&home)
        .args(["export", "--month", "2025-03", "--output"])
        .arg(&out)
        .assert()
        .success()
        .stdout(predicate::str::contains("Wrote 22 line items"));
    let csv = std::fs::read_to_string(&out).unwrap();
    assert!(csv.starts_with("report_id,account_name,category,month,actuals"));
    assert!(csv.contains("Travel Expenses,Opex,2025-02,-5.00"));

    finrep(&home)
        .args(["delete", "1"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Deleted report 1"));

    finrep(&home)
        .arg("files")
        .assert()
        .success()
        .stdout(predicate::str::contains("No files uploaded yet."));
}
