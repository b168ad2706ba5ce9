//! CLI smoke tests: drive the binary end to end over a small pool file.

use assert_cmd::Command;
use predicates::prelude::*;

fn pool_json() -> &'static str {
    r#"{
        "donors": [
            {
                "id": "D1",
                "blood_group": "O",
                "hla_typing": [
                    {"raw_code": "A1", "code": {"broad": "A1"}, "display_code": "A1"}
                ],
                "country": "CZE",
                "donor_type": "paired"
            },
            {
                "id": "D2",
                "blood_group": "O",
                "hla_typing": [
                    {"raw_code": "A1", "code": {"broad": "A1"}, "display_code": "A1"}
                ],
                "country": "CZE",
                "donor_type": "paired"
            }
        ],
        "recipients": [
            {
                "id": "R1",
                "blood_group": "A",
                "hla_typing": [
                    {"raw_code": "A1", "code": {"broad": "A1"}, "display_code": "A1"}
                ],
                "antibodies": [],
                "country": "CZE"
            },
            {
                "id": "R2",
                "blood_group": "A",
                "hla_typing": [
                    {"raw_code": "A1", "code": {"broad": "A1"}, "display_code": "A1"}
                ],
                "antibodies": [
                    {"raw_code": "B7", "code": {"broad": "B7"}, "mfi": 3000, "cutoff": 2000}
                ],
                "country": "CZE"
            }
        ],
        "pairs": [
            {"donor_id": "D1", "recipient_id": "R1"},
            {"donor_id": "D2", "recipient_id": "R2"}
        ]
    }"#
}

fn write_pool(label: &str) -> std::path::PathBuf {
    let dir = std::env::temp_dir();
    let path = dir.join(format!("kpd-solver-{label}-{}.json", std::process::id()));
    std::fs::write(&path, pool_json()).expect("write pool file");
    path
}

#[test]
fn test_solve_text_output() {
    let pool = write_pool("solve-text");
    let mut cmd = Command::cargo_bin("kpd-solver").unwrap();
    cmd.arg("solve")
        .arg(&pool)
        .assert()
        .success()
        .stdout(predicate::str::contains("Matchings Found"))
        .stdout(predicate::str::contains("cycle"));
}

#[test]
fn test_solve_json_output_is_valid_json() {
    let pool = write_pool("solve-json");
    let mut cmd = Command::cargo_bin("kpd-solver").unwrap();
    let output = cmd
        .arg("solve")
        .arg(&pool)
        .arg("--format")
        .arg("json")
        .assert()
        .success();

    let stdout = String::from_utf8(output.get_output().stdout.clone()).unwrap();
    let value: serde_json::Value = serde_json::from_str(&stdout).expect("valid JSON");
    assert_eq!(value["outcome"]["outcome"], "feasible");
}

#[test]
fn test_crossmatch_reports_verdict() {
    let pool = write_pool("crossmatch");
    let mut cmd = Command::cargo_bin("kpd-solver").unwrap();
    cmd.arg("crossmatch")
        .arg(&pool)
        .arg("--donor")
        .arg("D1")
        .arg("--recipient")
        .arg("R2")
        .assert()
        .success()
        .stdout(predicate::str::contains("Virtual Crossmatch"));
}

#[test]
fn test_graph_lists_edges() {
    let pool = write_pool("graph");
    let mut cmd = Command::cargo_bin("kpd-solver").unwrap();
    cmd.arg("graph")
        .arg(&pool)
        .assert()
        .success()
        .stdout(predicate::str::contains("D1 -> R2"));
}

#[test]
fn test_missing_pool_file_fails() {
    let mut cmd = Command::cargo_bin("kpd-solver").unwrap();
    cmd.arg("solve")
        .arg("/nonexistent/pool.json")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to read pool file"));
}

#[test]
fn test_unknown_donor_in_crossmatch_fails() {
    let pool = write_pool("crossmatch-ghost");
    let mut cmd = Command::cargo_bin("kpd-solver").unwrap();
    cmd.arg("crossmatch")
        .arg(&pool)
        .arg("--donor")
        .arg("GHOST")
        .arg("--recipient")
        .arg("R1")
        .assert()
        .failure()
        .stderr(predicate::str::contains("not found in pool"));
}
