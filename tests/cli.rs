//! End-to-end tests for the `memo-doc` inspection CLI.

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;

const MEMO: &str = r#"{
    "title": "groceries",
    "pinned": false,
    "archived": false,
    "blocks": [
        {"orderIndex": 2, "type": "CHECKLIST", "content": "eggs", "checked": false},
        {"orderIndex": 0, "type": "TEXT", "content": "shopping"},
        {"orderIndex": 1, "type": "CHECKLIST", "content": "milk", "checked": true}
    ]
}"#;

fn write_memo(dir: &tempfile::TempDir, name: &str, payload: &str) -> std::path::PathBuf {
    let path = dir.path().join(name);
    fs::write(&path, payload).unwrap();
    path
}

#[test]
fn validate_accepts_well_formed_memo() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_memo(&dir, "memo.json", MEMO);

    Command::cargo_bin("memo-doc")
        .unwrap()
        .arg("validate")
        .arg(&path)
        .assert()
        .success()
        .stdout(predicate::str::contains("Valid: 3 blocks"));
}

#[test]
fn validate_rejects_payload_without_blocks() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_memo(&dir, "broken.json", r#"{"title": "x"}"#);

    Command::cargo_bin("memo-doc")
        .unwrap()
        .arg("validate")
        .arg(&path)
        .assert()
        .failure()
        .stderr(predicate::str::contains("malformed memo payload"));
}

#[test]
fn preview_prints_sorted_entries_with_glyphs() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_memo(&dir, "memo.json", MEMO);

    Command::cargo_bin("memo-doc")
        .unwrap()
        .arg("preview")
        .arg(&path)
        .assert()
        .success()
        .stdout(predicate::str::contains("# groceries"))
        .stdout(predicate::str::contains("shopping"))
        .stdout(predicate::str::contains("☑ milk"))
        .stdout(predicate::str::contains("☐ eggs"));
}

#[test]
fn preview_limits_units_and_marks_more() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_memo(&dir, "memo.json", MEMO);

    Command::cargo_bin("memo-doc")
        .unwrap()
        .args(["preview", "--units", "1"])
        .arg(&path)
        .assert()
        .success()
        .stdout(predicate::str::contains("shopping"))
        .stdout(predicate::str::contains("..."))
        .stdout(predicate::str::contains("milk").not());
}

#[test]
fn preview_json_output() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_memo(&dir, "memo.json", MEMO);

    let output = Command::cargo_bin("memo-doc")
        .unwrap()
        .args(["preview", "--json"])
        .arg(&path)
        .output()
        .unwrap();
    assert!(output.status.success());

    let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(json["title"], "groceries");
    assert_eq!(json["hasMore"], false);
    assert_eq!(json["entries"].as_array().unwrap().len(), 3);
}

#[test]
fn normalize_emits_dense_indexes() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_memo(&dir, "memo.json", MEMO);

    let output = Command::cargo_bin("memo-doc")
        .unwrap()
        .arg("normalize")
        .arg(&path)
        .output()
        .unwrap();
    assert!(output.status.success());

    let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    let indexes: Vec<i64> = json["blocks"]
        .as_array()
        .unwrap()
        .iter()
        .map(|block| block["orderIndex"].as_i64().unwrap())
        .collect();
    assert_eq!(indexes, vec![0, 1, 2]);
    assert_eq!(json["blocks"][0]["content"], "shopping");
}

#[test]
fn scan_lists_previews_and_flags_invalid_files() {
    let dir = tempfile::tempdir().unwrap();
    write_memo(&dir, "one.json", MEMO);
    write_memo(&dir, "two.json", r#"{"blocks": [{"orderIndex": 0, "type": "TEXT", "content": "note"}]}"#);
    write_memo(&dir, "bad.json", "{");
    write_memo(&dir, "ignored.txt", "not a memo");

    Command::cargo_bin("memo-doc")
        .unwrap()
        .arg("scan")
        .arg(dir.path())
        .assert()
        .failure()
        .stdout(predicate::str::contains("one.json: groceries: shopping"))
        .stdout(predicate::str::contains("two.json: (untitled): note"))
        .stderr(predicate::str::contains("bad.json"));
}

#[test]
fn scan_succeeds_on_clean_directory() {
    let dir = tempfile::tempdir().unwrap();
    write_memo(&dir, "one.json", MEMO);

    Command::cargo_bin("memo-doc")
        .unwrap()
        .args(["scan", "--json"])
        .arg(dir.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("\"invalid\": []"));
}
