use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use tempfile::TempDir;

fn write_config(dir: &TempDir, root: &std::path::Path) -> std::path::PathBuf {
    let path = dir.path().join("nodelog.toml");
    fs::write(
        &path,
        format!(
            "[[roots]]\npath = \"{}\"\nformat = \"json\"\n\n[rotation]\nmax_size_bytes = 4\nmax_age_hours = 876000\nkeep_files = 2\n",
            root.display()
        ),
    )
    .unwrap();
    path
}

#[test]
fn test_once_rotates_and_exits() {
    let config_dir = TempDir::new().unwrap();
    let root = TempDir::new().unwrap();
    let node = root.path().join("relay-1");
    fs::create_dir(&node).unwrap();
    fs::write(node.join("node-2024-01-01T00-00-00.json"), b"{}\n{}\n").unwrap();
    std::os::unix::fs::symlink("node-2024-01-01T00-00-00.json", node.join("node.json")).unwrap();
    let config = write_config(&config_dir, root.path());

    Command::cargo_bin("nodelogd")
        .unwrap()
        .arg("--config")
        .arg(&config)
        .arg("--once")
        .assert()
        .success();

    let target = fs::read_link(node.join("node.json")).unwrap();
    assert_ne!(target, std::path::PathBuf::from("node-2024-01-01T00-00-00.json"));
    assert_eq!(fs::read(node.join("node-2024-01-01T00-00-00.json")).unwrap(), b"{}\n{}\n");
}

#[test]
fn test_missing_config_fails() {
    Command::cargo_bin("nodelogd")
        .unwrap()
        .arg("--config")
        .arg("/nonexistent/nodelog.toml")
        .arg("--once")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Config file not found"));
}
