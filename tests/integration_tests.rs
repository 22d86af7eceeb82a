//! Integration tests for the ect CLI
//!
//! These tests exercise the CLI commands end-to-end using assert_cmd.

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use tempfile::TempDir;

/// Helper to get an ect command isolated from the user's config and env
fn ect(tmp: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("ect").unwrap();
    cmd.current_dir(tmp.path())
        .env("HOME", tmp.path())
        .env("XDG_CONFIG_HOME", tmp.path().join(".config"))
        .env_remove("ECT_DATABASE")
        .env_remove("ECT_REPORT_DIR")
        .env_remove("ECT_INSPECTOR")
        .env_remove("ECT_WORKSPACE")
        .env_remove("ECT_LOG");
    cmd
}

/// Helper to create a workspace in a temp directory
fn setup_workspace() -> TempDir {
    let tmp = TempDir::new().unwrap();
    ect(&tmp).arg("init").assert().success();
    tmp
}

/// Workspace with project P-2024-001 and equipment FIT-1212001A (family 3100)
fn setup_pipeline() -> TempDir {
    let tmp = setup_workspace();
    ect(&tmp)
        .args([
            "project",
            "new",
            "P-2024-001",
            "--name",
            "Pipeline Expansion",
            "--client",
            "Acme Co",
        ])
        .assert()
        .success();
    ect(&tmp)
        .args(["equip", "new", "P-2024-001", "FIT-1212001A", "--family", "3100"])
        .assert()
        .success();
    tmp
}

/// Start a checklist and return its id
fn start_checklist(tmp: &TempDir) -> String {
    let output = ect(tmp)
        .args(["checklist", "new", "P-2024-001", "FIT-1212001A", "-f", "id"])
        .output()
        .unwrap();
    assert!(output.status.success());
    String::from_utf8_lossy(&output.stdout).trim().to_string()
}

/// YAML submission with `n` answers; positions in `non_conforming` get a plan
fn write_submission(tmp: &TempDir, n: usize, non_conforming: &[usize], plan: &str) -> String {
    let mut yaml = String::from("answers:\n");
    for i in 1..=n {
        if non_conforming.contains(&i) {
            yaml.push_str(&format!("  - answer: N\n    action_plan: \"{}\"\n", plan));
        } else {
            yaml.push_str("  - answer: S\n");
        }
    }
    let path = tmp.path().join("answers.yaml");
    fs::write(&path, yaml).unwrap();
    path.to_string_lossy().to_string()
}

fn json_output(cmd: &mut Command) -> serde_json::Value {
    let output = cmd.output().unwrap();
    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));
    serde_json::from_slice(&output.stdout).unwrap()
}

// ============================================================================
// CLI Basic Tests
// ============================================================================

#[test]
fn test_help_displays() {
    let tmp = TempDir::new().unwrap();
    ect(&tmp)
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("Equipment Checklist Toolkit"))
        .stdout(predicate::str::contains("checklist"));
}

#[test]
fn test_version_displays() {
    let tmp = TempDir::new().unwrap();
    ect(&tmp)
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("ect"));
}

#[test]
fn test_family_list_without_workspace() {
    let tmp = TempDir::new().unwrap();
    ect(&tmp)
        .args(["family", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("3100"))
        .stdout(predicate::str::contains("Turbine"))
        .stdout(predicate::str::contains("Big Ball Valves"));
}

#[test]
fn test_family_show_unknown_code() {
    let tmp = TempDir::new().unwrap();
    ect(&tmp)
        .args(["family", "show", "9999"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("unknown equipment family"));
}

#[test]
fn test_completions_bash() {
    let tmp = TempDir::new().unwrap();
    ect(&tmp)
        .args(["completions", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::contains("ect"));
}

// ============================================================================
// Workspace Tests
// ============================================================================

#[test]
fn test_init_creates_workspace() {
    let tmp = setup_workspace();
    assert!(tmp.path().join(".ect/config.yaml").exists());
    assert!(tmp.path().join(".ect/checklists.db").exists());
}

#[test]
fn test_init_twice_warns() {
    let tmp = setup_workspace();
    ect(&tmp)
        .arg("init")
        .assert()
        .success()
        .stdout(predicate::str::contains("already exists"));
}

#[test]
fn test_commands_outside_workspace_fail() {
    let tmp = TempDir::new().unwrap();
    ect(&tmp)
        .args(["project", "list"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("not an ect workspace"));
}

#[test]
fn test_workspace_flag_from_other_directory() {
    let tmp = setup_pipeline();
    let elsewhere = TempDir::new().unwrap();
    ect(&elsewhere)
        .args(["project", "list", "-f", "csv", "--workspace"])
        .arg(tmp.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("P-2024-001"));
}

#[test]
fn test_configured_database_path() {
    let tmp = setup_workspace();
    fs::write(tmp.path().join(".ect/config.yaml"), "database: data/alt.db\n").unwrap();
    ect(&tmp)
        .args(["project", "new", "P-1", "--name", "Alt", "--client", "C"])
        .assert()
        .success();
    assert!(tmp.path().join("data/alt.db").exists());
}

// ============================================================================
// Project / Equipment Tests
// ============================================================================

#[test]
fn test_project_new_and_list() {
    let tmp = setup_pipeline();
    ect(&tmp)
        .args(["project", "list", "-f", "csv"])
        .assert()
        .success()
        .stdout(predicate::str::contains("number,name,client,created"))
        .stdout(predicate::str::contains("P-2024-001,Pipeline Expansion,Acme Co"));
}

#[test]
fn test_duplicate_project_rejected() {
    let tmp = setup_pipeline();
    ect(&tmp)
        .args(["project", "new", "P-2024-001", "--name", "Other", "--client", "X"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("already exists"));
}

#[test]
fn test_project_show_json() {
    let tmp = setup_pipeline();
    let value = json_output(ect(&tmp).args(["project", "show", "P-2024-001", "-f", "json"]));
    assert_eq!(value["name"], "Pipeline Expansion");
    assert_eq!(value["equipment"][0]["tag"], "FIT-1212001A");
}

#[test]
fn test_duplicate_equipment_rejected() {
    let tmp = setup_pipeline();
    ect(&tmp)
        .args(["equip", "new", "P-2024-001", "FIT-1212001A", "--family", "6600"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("already exists"));
}

#[test]
fn test_equipment_unknown_family_rejected() {
    let tmp = setup_pipeline();
    ect(&tmp)
        .args(["equip", "new", "P-2024-001", "XV-9", "--family", "42"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("unknown equipment family"));
}

#[test]
fn test_equipment_unknown_project_rejected() {
    let tmp = setup_workspace();
    ect(&tmp)
        .args(["equip", "new", "P-404", "XV-9", "--family", "1500"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("not found"));
}

// ============================================================================
// Checklist Flow Tests
// ============================================================================

#[test]
fn test_checklist_all_conforming() {
    let tmp = setup_pipeline();
    let id = start_checklist(&tmp);
    assert_eq!(id, "1");

    let file = write_submission(&tmp, 15, &[], "");
    let stats = json_output(ect(&tmp).args(["checklist", "finalize", &id, "--file", &file, "-f", "json"]));
    assert_eq!(stats["total_items"], 15);
    assert_eq!(stats["conforming"], 15);
    assert_eq!(stats["non_conforming"], 0);
    assert_eq!(stats["conformance_percentage"], 100.0);

    let dashboard = json_output(ect(&tmp).args(["dashboard", "-f", "json"]));
    assert_eq!(dashboard["completed_per_project"]["Pipeline Expansion"], 1);
    assert!(dashboard["open_per_project"].get("Pipeline Expansion").is_none());
}

#[test]
fn test_checklist_with_action_plans() {
    let tmp = setup_pipeline();
    let id = start_checklist(&tmp);

    let file = write_submission(&tmp, 15, &[4, 11], "Replace and recalibrate");
    ect(&tmp)
        .args(["checklist", "finalize", &id, "--file", &file])
        .assert()
        .success()
        .stdout(predicate::str::contains("86.7% conformance"));

    let dashboard = json_output(ect(&tmp).args(["dashboard", "-f", "json"]));
    assert_eq!(dashboard["action_plans_per_project"]["Pipeline Expansion"], 2);

    ect(&tmp)
        .args(["report", "checklist", &id, "--type", "md", "--stdout"])
        .assert()
        .success()
        .stdout(predicate::str::contains("# Equipment Checklist Report"))
        .stdout(predicate::str::contains("Replace and recalibrate").count(2));
}

#[test]
fn test_finalize_without_plan_writes_nothing() {
    let tmp = setup_pipeline();
    let id = start_checklist(&tmp);

    let file = write_submission(&tmp, 15, &[3], "  ");
    ect(&tmp)
        .args(["checklist", "finalize", &id, "--file", &file])
        .assert()
        .failure()
        .stderr(predicate::str::contains("non_conforming"));

    let show = json_output(ect(&tmp).args(["checklist", "show", &id, "-f", "json"]));
    assert_eq!(show["answered_items"], 0);
    assert_eq!(show["stats"]["unanswered"], 15);

    ect(&tmp)
        .args(["checklist", "list", "--state", "open", "-f", "id"])
        .assert()
        .success()
        .stdout(predicate::str::contains("1"));
}

#[test]
fn test_finalize_requires_answers_source() {
    let tmp = setup_pipeline();
    let id = start_checklist(&tmp);
    ect(&tmp)
        .args(["checklist", "finalize", &id])
        .assert()
        .failure()
        .stderr(predicate::str::contains("No answers given"));
}

#[test]
fn test_answer_single_item_then_finalize_csv() {
    let tmp = setup_pipeline();
    let id = start_checklist(&tmp);

    ect(&tmp)
        .args(["checklist", "answer", &id, "1", "N", "--plan", "Replace flange", "--photo", "flange.jpg"])
        .assert()
        .success();
    ect(&tmp)
        .args(["checklist", "answer", &id, "1", "S"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("already answered"));

    let mut csv = String::from("position,answer,photo,action_plan\n");
    for _ in 0..14 {
        csv.push_str(",NA,,\n");
    }
    let path = tmp.path().join("answers.csv");
    fs::write(&path, csv).unwrap();

    let stats = json_output(ect(&tmp).args([
        "checklist",
        "finalize",
        &id,
        "--file",
        path.to_str().unwrap(),
        "-f",
        "json",
    ]));
    assert_eq!(stats["not_applicable"], 14);
    assert_eq!(stats["conforming"], 0);
    assert_eq!(stats["conformance_percentage"], 0.0);
}

#[test]
fn test_csv_positions_select_items() {
    let tmp = setup_pipeline();
    let id = start_checklist(&tmp);
    let path = tmp.path().join("answers.csv");

    // Position 99 does not exist; nothing may be written
    let mut csv = String::from("position,answer,photo,action_plan\n");
    for p in 1..=14 {
        csv.push_str(&format!("{},S,,\n", p));
    }
    csv.push_str("99,N,,Plan for item 99\n");
    fs::write(&path, &csv).unwrap();
    ect(&tmp)
        .args(["checklist", "finalize", &id, "--file", path.to_str().unwrap()])
        .assert()
        .failure()
        .stderr(predicate::str::contains("position 99"));

    // Rows in reverse order still land on their labelled items
    let mut csv = String::from("position,answer,photo,action_plan\n");
    csv.push_str("15,N,valve.jpg,Plan for item 15\n");
    for p in (1..=14).rev() {
        csv.push_str(&format!("{},S,,\n", p));
    }
    fs::write(&path, &csv).unwrap();
    ect(&tmp)
        .args(["checklist", "finalize", &id, "--file", path.to_str().unwrap()])
        .assert()
        .success();

    let show = json_output(ect(&tmp).args(["checklist", "show", &id, "-f", "json"]));
    assert_eq!(show["items"][14]["position"], 15);
    assert_eq!(show["items"][14]["action_plan"], "Plan for item 15");
    assert_eq!(show["items"][14]["photo"], "valve.jpg");
    assert!(show["items"][0]["action_plan"].is_null());
}

#[test]
fn test_reinspection_creates_new_checklist() {
    let tmp = setup_pipeline();
    assert_eq!(start_checklist(&tmp), "1");
    assert_eq!(start_checklist(&tmp), "2");

    let list = json_output(ect(&tmp).args(["checklist", "list", "-f", "json"]));
    assert_eq!(list.as_array().map(|a| a.len()), Some(2));
}

// ============================================================================
// Report Tests
// ============================================================================

#[test]
fn test_pdf_report_written_to_report_dir() {
    let tmp = setup_pipeline();
    let id = start_checklist(&tmp);
    let file = write_submission(&tmp, 15, &[], "");
    ect(&tmp)
        .args(["checklist", "finalize", &id, "--file", &file])
        .assert()
        .success();

    ect(&tmp)
        .args(["report", "checklist", &id])
        .assert()
        .success()
        .stdout(predicate::str::contains("relatorio_checklist_P-2024-001_FIT-1212001A.pdf"));

    let pdf = fs::read(
        tmp.path()
            .join("reports/relatorio_checklist_P-2024-001_FIT-1212001A.pdf"),
    )
    .unwrap();
    assert!(pdf.starts_with(b"%PDF"));
}

#[test]
fn test_report_unknown_checklist_renders_empty_notice() {
    let tmp = setup_workspace();
    ect(&tmp)
        .args(["report", "checklist", "77", "--stdout", "-t", "md"])
        .assert()
        .success()
        .stdout(predicate::str::contains("No checklist data found for this report."));

    ect(&tmp)
        .args(["report", "checklist", "77"])
        .assert()
        .success();
    let pdf = fs::read(tmp.path().join("reports/relatorio_checklist_empty.pdf")).unwrap();
    assert!(pdf.starts_with(b"%PDF"));
}

#[test]
fn test_report_output_flag_and_inspector() {
    let tmp = setup_pipeline();
    let id = start_checklist(&tmp);
    let out = tmp.path().join("custom/report.md");

    ect(&tmp)
        .env("ECT_INSPECTOR", "R. Souza")
        .args(["report", "checklist", &id, "-t", "md", "-o"])
        .arg(&out)
        .assert()
        .success();

    let md = fs::read_to_string(&out).unwrap();
    assert!(md.contains("R. Souza"));
    assert!(md.contains("Unanswered"));
}

#[test]
fn test_dashboard_human_output() {
    let tmp = setup_pipeline();
    start_checklist(&tmp);
    ect(&tmp)
        .arg("dashboard")
        .assert()
        .success()
        .stdout(predicate::str::contains("Pipeline Expansion"))
        .stdout(predicate::str::contains("Checklists"));
}
