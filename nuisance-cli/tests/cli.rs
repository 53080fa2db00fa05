use assert_cmd::cargo::cargo_bin_cmd;
use assert_cmd::Command;
use predicates::str::contains;
use std::fs;
use tempfile::TempDir;

const HEADER: &str = "Timestamp,Issue Type,Description,Location,Status\n";

fn nuisance(dir: &TempDir) -> Command {
    let mut cmd = cargo_bin_cmd!("nuisance");
    cmd.current_dir(dir.path()).env("RUST_LOG", "off");
    for var in [
        "SMTP_SERVER",
        "SMTP_PORT",
        "SENDER_EMAIL",
        "SENDER_PASSWORD",
        "SECURITY_EMAIL",
        "REPORTS_FILE",
        "NUISANCE_ENV",
    ] {
        cmd.env_remove(var);
    }
    cmd
}

#[test]
fn init_creates_store_with_header() {
    let dir = TempDir::new().unwrap();
    nuisance(&dir)
        .arg("init")
        .assert()
        .success()
        .stdout(contains("Report store ready"));
    assert_eq!(fs::read_to_string(dir.path().join("reports.csv")).unwrap(), HEADER);
}

#[test]
fn submit_without_mail_settings_still_saves() {
    let dir = TempDir::new().unwrap();
    nuisance(&dir)
        .args([
            "submit",
            "--issue-type",
            "NoiseComplaint",
            "--description",
            "Loud music after midnight",
            "--location",
            "Building 2 Unit 4",
        ])
        .assert()
        .success()
        .stdout(contains("Report submitted successfully!"))
        .stdout(contains("email notification could not be sent"));

    nuisance(&dir)
        .arg("list")
        .assert()
        .success()
        .stdout(contains("Total Reports: 1"))
        .stdout(contains("| Noise Complaint | Building 2 Unit 4 | Pending | Loud music after midnight"));
}

#[test]
fn empty_description_is_rejected() {
    let dir = TempDir::new().unwrap();
    nuisance(&dir)
        .args(["submit", "-i", "Car Alarm", "-d", "", "-l", "Parking Lot B"])
        .assert()
        .code(2)
        .stderr(contains("description must not be empty"));
    assert_eq!(fs::read_to_string(dir.path().join("reports.csv")).unwrap(), HEADER);
}

#[test]
fn unknown_issue_type_is_rejected() {
    let dir = TempDir::new().unwrap();
    nuisance(&dir)
        .args(["submit", "-i", "Fireworks", "-d", "Bangs all night", "-l", "Courtyard"])
        .assert()
        .code(2)
        .stderr(contains("Report rejected: unknown issue type 'Fireworks'"));
    assert_eq!(fs::read_to_string(dir.path().join("reports.csv")).unwrap(), HEADER);
}

#[test]
fn list_on_fresh_store() {
    let dir = TempDir::new().unwrap();
    nuisance(&dir)
        .arg("list")
        .assert()
        .success()
        .stdout("No reports have been submitted yet.\n");
}

#[test]
fn export_writes_full_history() {
    let dir = TempDir::new().unwrap();
    nuisance(&dir)
        .args(["submit", "-i", "Other", "-d", "Gate left open", "-l", "Lot C"])
        .assert()
        .success();

    let out = dir.path().join("export.csv");
    nuisance(&dir)
        .args(["export", "--output"])
        .arg(&out)
        .assert()
        .success()
        .stdout(contains("Exported 1 reports"));

    let exported = fs::read_to_string(&out).unwrap();
    assert!(exported.starts_with(HEADER));
    assert!(exported.contains(",Other,Gate left open,Lot C,Pending\n"));
}

#[test]
fn store_path_comes_from_environment() {
    let dir = TempDir::new().unwrap();
    nuisance(&dir)
        .env("NUISANCE_STORE__PATH", "data/complaints.csv")
        .arg("init")
        .assert()
        .success();
    assert!(dir.path().join("data/complaints.csv").exists());
}

#[test]
fn metrics_are_printed_on_request() {
    let dir = TempDir::new().unwrap();
    nuisance(&dir)
        .args(["--print-metrics", "submit", "-i", "Other", "-d", "Smoke", "-l", "Hall"])
        .assert()
        .success()
        .stdout(contains("nuisance_submissions_total{outcome=\"submitted\"} 1"))
        .stdout(contains("nuisance_notifications_total{outcome=\"not_configured\"} 1"));
}

#[test]
fn missing_config_file_fails() {
    let dir = TempDir::new().unwrap();
    nuisance(&dir)
        .args(["--config", "nope.yaml", "list"])
        .assert()
        .failure()
        .stderr(contains("Configuration file not found"));
}
