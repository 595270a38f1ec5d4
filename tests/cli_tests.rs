//! Command-line behaviour of the `storevault` binary

use std::fs;
use std::path::Path;

use assert_cmd::Command;
use predicates::prelude::*;
use serde_json::{json, Value};
use tempfile::TempDir;

fn storevault(dir: &Path) -> Command {
    let mut cmd = Command::cargo_bin("storevault").unwrap();
    cmd.env("STOREVAULT_DATA_DIR", dir).env("STOREVAULT_LOG", "off");
    cmd
}

fn write_fixture(dir: &Path) -> std::path::PathBuf {
    let path = dir.join("fixture.json");
    let doc = json!({
        "version": "1.0",
        "data": {
            "categories": [{ "id": "C1", "name": "Shoes", "slug": "shoes" }],
            "products": [{ "id": "P1", "name": "Runner", "slug": "runner", "price": 9900, "categoryId": "C1" }],
            "customers": [{ "id": "U1", "email": "ada@example.com" }],
            "settings": [{ "id": "S1", "key": "store.currency", "value": "USD" }]
        }
    });
    fs::write(&path, serde_json::to_vec_pretty(&doc).unwrap()).unwrap();
    path
}

fn first_backup_id(dir: &Path) -> String {
    let registry: Value =
        serde_json::from_slice(&fs::read(dir.join("backups.json")).unwrap()).unwrap();
    registry[0]["id"].as_str().unwrap().to_string()
}

#[test]
fn config_shows_paths() {
    let temp = TempDir::new().unwrap();
    storevault(temp.path())
        .arg("config")
        .assert()
        .success()
        .stdout(predicate::str::contains("Storevault Configuration"))
        .stdout(predicate::str::contains("Restore timeout:   60s"));
}

#[test]
fn empty_backup_list() {
    let temp = TempDir::new().unwrap();
    storevault(temp.path())
        .args(["backup", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("No backups found."));
}

#[test]
fn import_then_stats() {
    let temp = TempDir::new().unwrap();
    let fixture = write_fixture(temp.path());

    storevault(temp.path())
        .args(["store", "import"])
        .arg(&fixture)
        .assert()
        .success()
        .stdout(predicate::str::contains("4 created"));

    storevault(temp.path())
        .args(["store", "stats"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Products:   1"))
        .stdout(predicate::str::contains("Customers:  1"));
}

#[test]
fn create_list_and_preview_restore() {
    let temp = TempDir::new().unwrap();
    let fixture = write_fixture(temp.path());

    storevault(temp.path())
        .args(["store", "import"])
        .arg(&fixture)
        .assert()
        .success();

    storevault(temp.path())
        .args(["backup", "create", "--by", "ops"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Backup created: bak-"))
        .stdout(predicate::str::contains("Records: 4"));

    storevault(temp.path())
        .args(["backup", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("COMPLETED"));

    let id = first_backup_id(temp.path());

    let output = storevault(temp.path())
        .args(["backup", "restore", &id, "--preview", "--strategy", "overwrite"])
        .output()
        .unwrap();
    assert!(output.status.success());

    let report: Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(report["message"], "Preview completed");
    assert_eq!(report["results"]["products"]["updated"], 1);
    assert_eq!(report["results"]["settings"]["updated"], 1);
    assert!(!temp.path().join("data").join("restore.lock").exists());
}

#[test]
fn restore_of_unknown_backup_fails() {
    let temp = TempDir::new().unwrap();
    storevault(temp.path())
        .args(["backup", "restore", "bak-deadbeef"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Backup not found"));
}

#[test]
fn restore_refuses_while_locked() {
    let temp = TempDir::new().unwrap();
    fs::create_dir_all(temp.path().join("data")).unwrap();
    fs::write(temp.path().join("data").join("restore.lock"), "1").unwrap();

    storevault(temp.path())
        .args(["backup", "restore", "bak-deadbeef"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Another restore is in progress"));
}

#[test]
fn delete_requires_force() {
    let temp = TempDir::new().unwrap();
    storevault(temp.path())
        .args(["backup", "create"])
        .assert()
        .success();
    let id = first_backup_id(temp.path());

    storevault(temp.path())
        .args(["backup", "delete", &id])
        .assert()
        .success()
        .stdout(predicate::str::contains("--force"));

    storevault(temp.path())
        .args(["backup", "delete", &id, "--force"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Deleted backup"));

    storevault(temp.path())
        .args(["backup", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("No backups found."));
}

#[test]
fn invalid_strategy_is_rejected() {
    let temp = TempDir::new().unwrap();
    storevault(temp.path())
        .args(["backup", "restore", "bak-deadbeef", "--strategy", "merge"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("unknown conflict strategy"));
}
