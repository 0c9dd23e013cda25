//! Runs the `datahub` binary against a temporary catalog of local sources.

use std::fs;
use std::path::Path;
use std::process::{Command, Output};
use tempfile::TempDir;

fn datahub(args: &[&str], configs: &Path, data: &Path) -> Output {
    Command::new(env!("CARGO_BIN_EXE_datahub"))
        .args(args)
        .arg("--config-root")
        .arg(configs)
        .arg("--data-path")
        .arg(data)
        .arg("--no-verbose")
        .env_remove("RUST_LOG")
        .env_remove("DATAHUB_CONFIG_ROOT")
        .output()
        .unwrap()
}

fn catalog() -> (TempDir, std::path::PathBuf, std::path::PathBuf) {
    let dir = TempDir::new().unwrap();
    let configs = dir.path().join("configs");
    let data = dir.path().join("data");
    let origin = dir.path().join("flowers.csv");
    fs::write(&origin, "petal,species\n1.4,setosa\n4.7,versicolor\n").unwrap();

    let task_dir = configs.join("classification/_configs");
    fs::create_dir_all(&task_dir).unwrap();
    fs::write(
        task_dir.join("flowers.yaml"),
        format!(
            "dataset_name: flowers\n\
             sources:\n  - file: flowers.csv\n    source_type: local\n    source_info:\n      path: '{}'\n\
             tables:\n  - name: data\n    file: flowers.csv\n",
            origin.display()
        ),
    )
    .unwrap();
    (dir, configs, data)
}

#[test]
fn list_prints_task_and_dataset() {
    let (_dir, configs, data) = catalog();
    let out = datahub(&["list"], &configs, &data);
    assert!(out.status.success());
    assert_eq!(String::from_utf8_lossy(&out.stdout), "classification/flowers\n");
}

#[test]
fn list_unknown_task_fails() {
    let (_dir, configs, data) = catalog();
    let out = datahub(&["list", "clustering"], &configs, &data);
    assert!(!out.status.success());
    assert!(String::from_utf8_lossy(&out.stderr).contains("clustering"));
}

#[test]
fn get_prints_shape_and_stages_file() {
    let (_dir, configs, data) = catalog();
    let out = datahub(&["get", "classification", "flowers"], &configs, &data);
    assert!(out.status.success(), "{}", String::from_utf8_lossy(&out.stderr));

    let stdout = String::from_utf8_lossy(&out.stdout);
    assert!(stdout.contains("DataBundle(tables=[data])"), "{stdout}");
    assert!(stdout.contains("2 rows × 2 columns"), "{stdout}");
    assert!(data.join("flowers/flowers.csv").is_file());
}

#[test]
fn fetch_reports_skip_on_second_run() {
    let (_dir, configs, data) = catalog();
    let first = datahub(&["fetch", "classification", "flowers"], &configs, &data);
    assert!(first.status.success());
    assert!(String::from_utf8_lossy(&first.stdout).contains("1 fetched, 0 already staged"));

    let second = datahub(&["fetch", "classification", "flowers"], &configs, &data);
    assert!(String::from_utf8_lossy(&second.stdout).contains("0 fetched, 1 already staged"));
}

#[test]
fn show_config_prints_normalized_json() {
    let (_dir, configs, data) = catalog();
    let out = datahub(&["show-config", "classification", "flowers"], &configs, &data);
    assert!(out.status.success());

    let json: serde_json::Value = serde_json::from_slice(&out.stdout).unwrap();
    assert_eq!(json["dataset_name"], "flowers");
    assert_eq!(json["source_transform"], serde_json::json!([]));
    assert_eq!(json["tables"][0]["read_params"], serde_json::json!({}));
}

#[test]
fn missing_dataset_exits_nonzero() {
    let (_dir, configs, data) = catalog();
    let out = datahub(&["get", "classification", "nope"], &configs, &data);
    assert!(!out.status.success());
    assert!(String::from_utf8_lossy(&out.stderr).contains("nope.yaml"));
}

#[test]
fn config_root_can_come_from_environment() {
    let (_dir, configs, data) = catalog();
    let out = Command::new(env!("CARGO_BIN_EXE_datahub"))
        .args(["list", "classification"])
        .env("DATAHUB_CONFIG_ROOT", &configs)
        .env("DATAHUB_DATA_PATH", &data)
        .env_remove("RUST_LOG")
        .output()
        .unwrap();
    assert!(out.status.success(), "{}", String::from_utf8_lossy(&out.stderr));
    assert_eq!(String::from_utf8_lossy(&out.stdout), "flowers\n");
}
