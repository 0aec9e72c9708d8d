use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;

use assert_cmd::prelude::*;
use predicates::prelude::*;
use predicates::str::contains;
use tempfile::TempDir;

fn endevor_cmd(home: &Path) -> Command {
    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("endevor"));
    cmd.env("HOME", home)
        .env("USERPROFILE", home)
        .env("NO_COLOR", "1");
    cmd
}

fn write_result(dir: &TempDir, name: &str, json: &str) -> PathBuf {
    let path = dir.path().join(name);
    fs::write(&path, json).expect("write sync result");
    path
}

const CONFLICTED: &str = r#"{
  "status": "SUCCESS",
  "infoMessages": ["2 elements retrieved"],
  "actions": [
    {
      "environment": "DEV", "stageNumber": "1", "system": "FINANCE",
      "subsystem": "PAYROLL", "type": "COBOL", "fullElementName": "PAYCALC",
      "localFile": "/ws/FINANCE/PAYROLL/COBOL/PAYCALC.cbl",
      "action": "UPDATE", "status": "SUCCESS",
      "statusDetailed": "SUCCESS_MANUAL_MERGE_STARTED"
    }
  ]
}"#;

#[test]
fn service_add_then_list() {
    let home = TempDir::new().expect("home");

    endevor_cmd(home.path())
        .args([
            "service",
            "add",
            "prod",
            "https://mainframe.example.com:9443/EndevorService/api/v2",
        ])
        .assert()
        .success()
        .stdout(contains("Service 'prod'"));

    endevor_cmd(home.path())
        .args(["service", "list", "--json"])
        .assert()
        .success()
        .stdout(contains("\"name\": \"prod\""))
        .stdout(contains("mainframe.example.com"));

    assert!(home.path().join(".endevor/services/prod.yaml").exists());
}

#[test]
fn service_add_rejects_unsupported_scheme() {
    let home = TempDir::new().expect("home");

    endevor_cmd(home.path())
        .args(["service", "add", "prod", "ftp://mainframe.example.com"])
        .assert()
        .failure();
}

#[test]
fn location_create_uses_the_only_service() {
    let home = TempDir::new().expect("home");

    endevor_cmd(home.path())
        .args(["service", "add", "prod", "http://mainframe.example.com:8080"])
        .assert()
        .success();

    endevor_cmd(home.path())
        .args([
            "location", "create", "payroll", "--env", "DEV", "--stage", "1", "--system",
            "FINANCE",
        ])
        .assert()
        .success()
        .stdout(contains("Added 'payroll' to service 'prod'"))
        .stdout(contains("new location"));

    endevor_cmd(home.path())
        .args(["location", "list"])
        .assert()
        .success()
        .stdout(contains("DEV/1/FINANCE/*/*"))
        .stdout(contains("prod"));
}

#[test]
fn location_create_without_services_fails() {
    let home = TempDir::new().expect("home");

    endevor_cmd(home.path())
        .args(["location", "create", "payroll", "--env", "DEV", "--stage", "1"])
        .assert()
        .failure();
}

#[test]
fn sync_classify_success_exits_zero() {
    let home = TempDir::new().expect("home");
    let input = write_result(
        &home,
        "clean.json",
        r#"{"status": "SUCCESS", "infoMessages": ["all good"]}"#,
    );

    endevor_cmd(home.path())
        .args(["sync", "classify"])
        .arg(&input)
        .assert()
        .success()
        .stdout(contains("workspace synced"))
        .stdout(contains("[INFO] all good"));
}

#[test]
fn sync_classify_conflict_fails_and_lists_elements() {
    let home = TempDir::new().expect("home");
    let input = write_result(&home, "conflict.json", CONFLICTED);

    endevor_cmd(home.path())
        .args(["sync", "classify"])
        .arg(&input)
        .assert()
        .failure()
        .stdout(contains("unresolved conflicts"))
        .stdout(contains("PAYCALC.cbl"))
        .stderr(contains("manual merges"));
}

#[test]
fn sync_classify_json_uses_camel_case_details() {
    let home = TempDir::new().expect("home");
    let input = write_result(&home, "conflict.json", CONFLICTED);

    endevor_cmd(home.path())
        .args(["sync", "classify", "--json"])
        .arg(&input)
        .assert()
        .failure()
        .stdout(contains("\"status\": \"CONFLICT\""))
        .stdout(contains("\"conflictDetails\""))
        .stdout(contains("\"fileUri\": \"/ws/FINANCE/PAYROLL/COBOL/PAYCALC.cbl\""))
        .stdout(contains("\"stageNumber\": \"1\""))
        .stdout(contains("\"subSystem\": \"PAYROLL\""))
        .stdout(contains("conflict_details").not());
}

#[test]
fn sync_classify_shows_files_relative_to_edit_folder() {
    let home = TempDir::new().expect("home");
    let input = write_result(
        &home,
        "failed.json",
        r#"{
  "status": "FAILURE",
  "actions": [
    {
      "environment": "DEV", "stageNumber": "1", "system": "FINANCE",
      "subsystem": "PAYROLL", "type": "COBOL", "fullElementName": "PAYCALC",
      "localFile": "/ws/.endevor/prod/payroll/FINANCE/PAYROLL/COBOL/PAYCALC.cbl",
      "action": "RETRIEVE", "status": "FAILURE",
      "errorMessages": ["C1G0267E element is signed out"]
    }
  ]
}"#,
    );

    endevor_cmd(home.path())
        .args(["sync", "classify", "--workspace", "/ws"])
        .arg(&input)
        .assert()
        .failure()
        .stdout(contains("retrieve DEV/1/FINANCE/PAYROLL/COBOL/PAYCALC"))
        .stdout(contains("PAYCALC.cbl in prod/payroll/FINANCE/PAYROLL/COBOL"))
        .stdout(contains("/ws/.endevor").not())
        .stdout(contains("C1G0267E element is signed out"))
        .stderr(contains("finished with errors"));
}

#[test]
fn sync_classify_plain_ignores_actions() {
    let home = TempDir::new().expect("home");
    let input = write_result(&home, "conflict.json", CONFLICTED);

    endevor_cmd(home.path())
        .args(["sync", "classify", "--plain", "--json"])
        .arg(&input)
        .assert()
        .success()
        .stdout(contains("\"status\": \"SUCCESS\""));
}

#[test]
fn sync_classify_rejects_unknown_status() {
    let home = TempDir::new().expect("home");
    let input = write_result(&home, "odd.json", r#"{"status": "MAYBE"}"#);

    endevor_cmd(home.path())
        .args(["sync", "classify"])
        .arg(&input)
        .assert()
        .failure()
        .stderr(contains("failed to load sync result"));
}

#[test]
fn report_uri_round_trips_through_parse() {
    let home = TempDir::new().expect("home");

    let output = endevor_cmd(home.path())
        .args(["report", "uri", "prod", "payroll", "PAYCALC", "C1MSGS1"])
        .output()
        .expect("run report uri");
    assert!(output.status.success());
    let uri = String::from_utf8(output.stdout).expect("utf8 uri");
    assert!(uri.starts_with("e4e-readonly-generic-report:C1MSGS1.act?"));

    endevor_cmd(home.path())
        .args(["report", "parse", uri.trim()])
        .assert()
        .success()
        .stdout(contains("\"objectName\": \"PAYCALC\""))
        .stdout(contains("\"reportId\": \"C1MSGS1\""));
}

#[cfg(unix)]
#[test]
fn sync_run_classifies_program_output() {
    let home = TempDir::new().expect("home");

    endevor_cmd(home.path())
        .args(["sync", "run", "--timeout", "10", "--", "sh", "-c"])
        .arg(r#"printf '%s' '{"status": "NOT_RUN", "infoMessages": ["up to date"]}'"#)
        .assert()
        .success()
        .stdout(contains("workspace synced"))
        .stdout(contains("[INFO] up to date"));
}

#[cfg(unix)]
#[test]
fn sync_run_times_out() {
    let home = TempDir::new().expect("home");

    endevor_cmd(home.path())
        .args(["sync", "run", "--timeout", "1", "--", "sh", "-c", "sleep 5"])
        .assert()
        .failure()
        .stderr(contains("did not finish"))
        .stderr(contains("timed out after 1s"));
}

#[cfg(unix)]
#[test]
fn sync_run_timeout_comes_from_settings() {
    let home = TempDir::new().expect("home");
    let store = home.path().join(".endevor");
    fs::create_dir_all(&store).expect("store dir");
    fs::write(store.join("settings.yaml"), "sync_timeout_secs: 1\n").expect("settings");

    endevor_cmd(home.path())
        .args(["sync", "run", "--", "sh", "-c", "sleep 5"])
        .assert()
        .failure()
        .stderr(contains("timed out after 1s"));
}

#[cfg(unix)]
#[test]
fn sync_run_without_output_reports_stderr() {
    let home = TempDir::new().expect("home");

    endevor_cmd(home.path())
        .args(["sync", "run", "--timeout", "10", "--", "sh", "-c"])
        .arg("echo 'connection refused' >&2; exit 3")
        .assert()
        .failure()
        .stderr(contains("printed no result"))
        .stderr(contains("connection refused"));
}
