//! CLI integration tests using assert_cmd.

use std::path::{Path, PathBuf};

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

use tutoria_core::error::ErrorKind;
use tutoria_core::report::RunReport;

/// Runs the binary inside `dir` with a clean environment, so no global or
/// local config leaks into the test.
fn tutoria(dir: &Path) -> Command {
    #[allow(deprecated)]
    let mut cmd = Command::cargo_bin("tutoria").unwrap();
    cmd.current_dir(dir)
        .env("HOME", dir)
        .env_remove("TUTORIA_DATA_DIR")
        .env_remove("TUTORIA_DEFAULT_ORDER")
        .env_remove("RUST_LOG");
    cmd
}

fn campus() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("../../scenarios/campus.toml")
}

fn write_config(dir: &Path) -> PathBuf {
    let path = dir.join("custom.toml");
    let data_dir = dir.join("data");
    std::fs::write(
        &path,
        format!("data_dir = {:?}\n\n[fees]\ntutor = 0.80\n", data_dir.display().to_string()),
    )
    .unwrap();
    path
}

#[test]
fn validate_campus_scenario() {
    let dir = TempDir::new().unwrap();
    tutoria(dir.path())
        .arg("validate")
        .arg("--scenario")
        .arg(campus())
        .assert()
        .success()
        .stdout(predicate::str::contains("Campus Week (3 students, 12 events)"))
        .stdout(predicate::str::contains("All scenarios valid"));
}

#[test]
fn validate_directory() {
    let dir = TempDir::new().unwrap();
    tutoria(dir.path())
        .arg("validate")
        .arg("--scenario")
        .arg(Path::new(env!("CARGO_MANIFEST_DIR")).join("../../scenarios"))
        .assert()
        .success()
        .stdout(predicate::str::contains("Campus Week"));
}

#[test]
fn validate_reports_warnings() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("broken.toml");
    std::fs::write(
        &path,
        r#"
[scenario]
id = "broken"
name = "Broken"

[[events]]
type = "rate"
email = "ghost@gmail.com"
score = 5
"#,
    )
    .unwrap();

    tutoria(dir.path())
        .arg("validate")
        .arg("--scenario")
        .arg(&path)
        .assert()
        .success()
        .stdout(predicate::str::contains("event #1: unknown email: ghost@gmail.com"))
        .stdout(predicate::str::contains("1 warning(s) found"));
}

#[test]
fn validate_nonexistent_file() {
    let dir = TempDir::new().unwrap();
    tutoria(dir.path())
        .arg("validate")
        .arg("--scenario")
        .arg("nonexistent.toml")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Error"));
}

#[test]
fn run_prints_tutor_summary() {
    let dir = TempDir::new().unwrap();
    tutoria(dir.path())
        .arg("run")
        .arg("--scenario")
        .arg(campus())
        .assert()
        .success()
        .stdout(predicate::str::contains("ana@ccc.ufcg.edu.br"))
        .stdout(predicate::str::contains("Calculo (4), P2 (3)"))
        .stdout(predicate::str::contains("Request #7 (online: P2): ana@ccc.ufcg.edu.br"))
        .stdout(predicate::str::contains(
            "Request #8 (in person: P2 on seg at 10:00 in LCC2): gaudslindo99@gmail.com",
        ))
        .stdout(predicate::str::contains("Request #12 (online: Fisica): no tutor available"))
        .stdout(predicate::str::contains("Platform revenue: 201"))
        .stdout(predicate::str::contains("Steps: 15 ok, 0 failed"));
}

#[test]
fn run_json_format() {
    let dir = TempDir::new().unwrap();
    tutoria(dir.path())
        .arg("run")
        .arg("--scenario")
        .arg(campus())
        .arg("--format")
        .arg("json")
        .assert()
        .success()
        .stdout(predicate::str::contains("\"platform_revenue_cents\": 201"))
        .stdout(predicate::str::contains("\"tier\": \"tutor\""));
}

#[test]
fn run_writes_report() {
    let dir = TempDir::new().unwrap();
    let out = dir.path().join("reports");

    tutoria(dir.path())
        .arg("run")
        .arg("--scenario")
        .arg(campus())
        .arg("--output")
        .arg(&out)
        .assert()
        .success()
        .stderr(predicate::str::contains("Report saved to"));

    let report_path = std::fs::read_dir(&out)
        .unwrap()
        .map(|e| e.unwrap().path())
        .find(|p| p.extension().is_some_and(|ext| ext == "json"))
        .unwrap();
    let report = RunReport::load_json(&report_path).unwrap();
    assert_eq!(report.scenario.id, "campus");
    assert_eq!(report.tutors.len(), 2);
    assert_eq!(report.matches.len(), 3);
    assert_eq!(report.failure_count(), 0);
}

#[test]
fn run_records_failed_events_and_succeeds() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("failing.toml");
    std::fs::write(
        &path,
        r#"
[scenario]
id = "failing"
name = "Failing"

[[students]]
registration_id = "1"
name = "Ana"
course_code = 1
email = "ana@gmail.com"

[[events]]
type = "donate"
email = "ana@gmail.com"
amount = 100

[[events]]
type = "promote"
registration_id = "1"
subject = "P2"
proficiency = 4
"#,
    )
    .unwrap();
    let out = dir.path().join("reports");

    tutoria(dir.path())
        .arg("run")
        .arg("--scenario")
        .arg(&path)
        .arg("--output")
        .arg(&out)
        .assert()
        .success()
        .stderr(predicate::str::contains("FAIL (not found)"))
        .stdout(predicate::str::contains("Steps: 2 ok, 1 failed"));

    let report_path = std::fs::read_dir(&out).unwrap().next().unwrap().unwrap().path();
    let report = RunReport::load_json(&report_path).unwrap();
    let failed = report.outcomes.iter().find(|o| !o.succeeded()).unwrap();
    assert_eq!(failed.error.as_ref().map(|e| e.kind), Some(ErrorKind::NotFound));
}

#[test]
fn run_save_then_listing() {
    let dir = TempDir::new().unwrap();
    let config = write_config(dir.path());

    tutoria(dir.path())
        .arg("run")
        .arg("--scenario")
        .arg(campus())
        .arg("--config")
        .arg(&config)
        .arg("--save")
        .assert()
        .success()
        .stderr(predicate::str::contains("Listings saved to"));

    assert!(dir.path().join("data/students.txt").exists());

    // The scenario switches the student listing to email order.
    tutoria(dir.path())
        .arg("listing")
        .arg("--kind")
        .arg("students")
        .arg("--config")
        .arg(&config)
        .assert()
        .success()
        .stdout(predicate::str::starts_with(
            "11715000 - Ana Clara - 1 - 83 99999-0000 - ana@ccc.ufcg.edu.br, \
             11716001 - Bruno Souza - 2 - bruno@ccc.ufcg.edu.br, \
             11715963 - Gauds Lindo - 1 - gaudslindo99@gmail.com",
        ));

    tutoria(dir.path())
        .arg("listing")
        .arg("--kind")
        .arg("tutors")
        .arg("--config")
        .arg(&config)
        .assert()
        .success()
        .stdout(predicate::str::contains("11715963 - Gauds Lindo"))
        .stdout(predicate::str::contains("Bruno").not());
}

#[test]
fn listing_without_saved_data() {
    let dir = TempDir::new().unwrap();
    let config = write_config(dir.path());

    tutoria(dir.path())
        .arg("listing")
        .arg("--kind")
        .arg("tutors")
        .arg("--config")
        .arg(&config)
        .assert()
        .success()
        .stderr(predicate::str::contains("No saved tutors"));
}

#[test]
fn clear_empties_saved_listings() {
    let dir = TempDir::new().unwrap();
    let config = write_config(dir.path());

    tutoria(dir.path())
        .arg("run")
        .arg("--scenario")
        .arg(campus())
        .arg("--config")
        .arg(&config)
        .arg("--save")
        .assert()
        .success();

    tutoria(dir.path())
        .arg("clear")
        .arg("--config")
        .arg(&config)
        .assert()
        .success()
        .stdout(predicate::str::contains("Cleared saved listings in"));

    let students = std::fs::read_to_string(dir.path().join("data/students.txt")).unwrap();
    assert!(students.is_empty());

    for kind in ["students", "tutors"] {
        tutoria(dir.path())
            .arg("listing")
            .arg("--kind")
            .arg(kind)
            .arg("--config")
            .arg(&config)
            .assert()
            .success()
            .stdout(predicate::str::is_empty())
            .stderr(predicate::str::contains(format!("No saved {kind}")));
    }
}

#[test]
fn clear_without_saved_data_succeeds() {
    let dir = TempDir::new().unwrap();
    let config = write_config(dir.path());

    tutoria(dir.path())
        .arg("clear")
        .arg("--config")
        .arg(&config)
        .assert()
        .success();

    assert!(!dir.path().join("data/tutors.txt").exists());
}

#[test]
fn inverted_fee_config_fails() {
    let dir = TempDir::new().unwrap();
    let config = dir.path().join("bad.toml");
    std::fs::write(&config, "[fees]\napprentice = 0.9\ntutor = 0.8\ntop = 0.95\n").unwrap();

    tutoria(dir.path())
        .arg("run")
        .arg("--scenario")
        .arg(campus())
        .arg("--config")
        .arg(&config)
        .assert()
        .failure()
        .stderr(predicate::str::contains("fee rates must not decrease with tier"));
}

#[test]
fn invalid_fee_config_fails() {
    let dir = TempDir::new().unwrap();
    let config = dir.path().join("bad.toml");
    std::fs::write(&config, "[fees]\ntutor = 1.5\n").unwrap();

    tutoria(dir.path())
        .arg("run")
        .arg("--scenario")
        .arg(campus())
        .arg("--config")
        .arg(&config)
        .assert()
        .failure()
        .stderr(predicate::str::contains("tutor rate out of range"));
}

#[test]
fn env_overrides_data_dir() {
    let dir = TempDir::new().unwrap();
    let data = dir.path().join("from-env");

    tutoria(dir.path())
        .env("TUTORIA_DATA_DIR", &data)
        .arg("run")
        .arg("--scenario")
        .arg(campus())
        .arg("--save")
        .assert()
        .success();

    assert!(data.join("tutors.txt").exists());
}

#[test]
fn init_creates_files() {
    let dir = TempDir::new().unwrap();

    tutoria(dir.path())
        .arg("init")
        .assert()
        .success()
        .stdout(predicate::str::contains("Created tutoria.toml"))
        .stdout(predicate::str::contains("Created scenarios/example.toml"));

    assert!(dir.path().join("tutoria.toml").exists());
    assert!(dir.path().join("scenarios/example.toml").exists());
}

#[test]
fn init_skips_existing() {
    let dir = TempDir::new().unwrap();

    tutoria(dir.path()).arg("init").assert().success();

    tutoria(dir.path())
        .arg("init")
        .assert()
        .success()
        .stdout(predicate::str::contains("already exists"));
}

#[test]
fn init_output_is_runnable() {
    let dir = TempDir::new().unwrap();
    tutoria(dir.path()).arg("init").assert().success();

    tutoria(dir.path())
        .arg("validate")
        .arg("--scenario")
        .arg("scenarios/example.toml")
        .assert()
        .success()
        .stdout(predicate::str::contains("All scenarios valid"));

    // Picks up ./tutoria.toml and saves into ./tutoria-data.
    tutoria(dir.path())
        .arg("run")
        .arg("--scenario")
        .arg("scenarios/example.toml")
        .arg("--save")
        .assert()
        .success()
        .stdout(predicate::str::contains("Platform revenue: 200"));

    assert!(dir.path().join("tutoria-data/tutors.txt").exists());
}

#[test]
fn help_output() {
    let dir = TempDir::new().unwrap();
    tutoria(dir.path())
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("Tutor marketplace scenario runner"));
}

#[test]
fn version_output() {
    let dir = TempDir::new().unwrap();
    tutoria(dir.path())
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("tutoria"));
}
