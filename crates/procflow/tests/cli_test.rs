#![allow(deprecated)] // TODO: cargo_bin → cargo_bin_cmd! へ移行

mod common;

use assert_cmd::Command;
use common::{SHOP_KDL, TestProject};
use predicates::prelude::*;
use std::fs;

/// CLIヘルプが正しく表示されることを確認
#[test]
fn test_cli_help() {
    let mut cmd = Command::cargo_bin("procflow").unwrap();
    cmd.arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("デプロイ記述子"))
        .stdout(predicate::str::contains("build"))
        .stdout(predicate::str::contains("export"))
        .stdout(predicate::str::contains("validate"));
}

/// バージョン表示が正しく動作することを確認
#[test]
fn test_cli_version() {
    let mut cmd = Command::cargo_bin("procflow").unwrap();
    cmd.arg("version")
        .assert()
        .success()
        .stdout(predicate::str::contains("procflow"));
}

/// buildコマンドのヘルプが正しく表示されることを確認
#[test]
fn test_build_help() {
    let mut cmd = Command::cargo_bin("procflow").unwrap();
    cmd.arg("build")
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("<PROCESS>"))
        .stdout(predicate::str::contains("--deployment-version"))
        .stdout(predicate::str::contains("--format"));
}

/// 不正なコマンドでエラーになることを確認
#[test]
fn test_invalid_command() {
    let mut cmd = Command::cargo_bin("procflow").unwrap();
    cmd.arg("invalid-command").assert().failure();
}

#[test]
fn test_build_yaml() {
    let project = TestProject::new();
    project.write_procflow_kdl(SHOP_KDL);

    project
        .command()
        .args(["build", "web"])
        .assert()
        .success()
        .stdout(predicate::str::contains("name: web"))
        .stdout(predicate::str::contains("instanceCount: 2"))
        .stdout(predicate::str::contains("publicServicePort: 5000"))
        .stdout(predicate::str::contains("tier: frontend"))
        .stdout(predicate::str::contains("canary").not());
}

#[test]
fn test_build_json() {
    let project = TestProject::new();
    project.write_procflow_kdl(SHOP_KDL);

    project
        .command()
        .args(["build", "worker", "--format", "json"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"name\": \"worker\""))
        .stdout(predicate::str::contains("\"PORT_worker\""))
        .stdout(predicate::str::contains("\"routable\": false"));
}

/// --deployment-version は設定ファイルのバージョンより優先される
#[test]
fn test_build_deployment_version_override() {
    let project = TestProject::new();
    project.write_procflow_kdl(SHOP_KDL);

    project
        .command()
        .args(["build", "web", "--deployment-version", "3"])
        .assert()
        .success()
        .stdout(predicate::str::contains("canary"))
        .stdout(predicate::str::contains("tier").not());
}

#[test]
fn test_build_deployment_version_from_env() {
    let project = TestProject::new();
    project.write_procflow_kdl(SHOP_KDL);

    project
        .command()
        .env("PROCFLOW_DEPLOYMENT_VERSION", "3")
        .args(["build", "web"])
        .assert()
        .success()
        .stdout(predicate::str::contains("canary"));
}

#[test]
fn test_build_with_explicit_config() {
    let project = TestProject::new();
    let config = project.path().join("custom.kdl");
    fs::write(&config, SHOP_KDL).unwrap();

    project
        .command()
        .arg("build")
        .arg("web")
        .arg("--config")
        .arg(&config)
        .assert()
        .success()
        .stdout(predicate::str::contains("name: web"));
}

#[test]
fn test_build_unknown_process() {
    let project = TestProject::new();
    project.write_procflow_kdl(SHOP_KDL);

    project
        .command()
        .args(["build", "scheduler"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("scheduler"));
}

#[test]
fn test_build_routable_without_ports() {
    let project = TestProject::new();
    project.write_procflow_kdl(
        r#"
        process "web" routable=#true {
            command "gunicorn" "app:app"
        }
    "#,
    );

    project.command().args(["build", "web"]).assert().failure();
}

#[test]
fn test_build_without_config() {
    let project = TestProject::new();

    project.command().args(["build", "web"]).assert().failure();
}

#[test]
fn test_export_writes_file() {
    let project = TestProject::new();
    project.write_procflow_kdl(SHOP_KDL);

    project
        .command()
        .args(["export", "web", "-f", "web.json", "--format", "json"])
        .assert()
        .success();

    let content = fs::read_to_string(project.path().join("web.json")).unwrap();
    assert!(content.contains("\"name\": \"web\""));
    assert!(content.contains("\"instanceCount\": 2"));
}

#[test]
fn test_export_default_file_name() {
    let project = TestProject::new();
    project.write_procflow_kdl(SHOP_KDL);

    project.command().args(["export", "worker"]).assert().success();

    assert!(project.path().join("worker.yaml").exists());
}

#[test]
fn test_export_refuses_existing_file() {
    let project = TestProject::new();
    project.write_procflow_kdl(SHOP_KDL);
    fs::write(project.path().join("web.yaml"), "keep me").unwrap();

    project
        .command()
        .args(["export", "web"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("file already exists"));

    let content = fs::read_to_string(project.path().join("web.yaml")).unwrap();
    assert_eq!(content, "keep me");
}

#[test]
fn test_validate_success() {
    let project = TestProject::new();
    project.write_procflow_kdl(SHOP_KDL);

    project
        .command()
        .arg("validate")
        .assert()
        .success()
        .stdout(predicate::str::contains("web"))
        .stdout(predicate::str::contains("worker"));
}

#[test]
fn test_validate_reports_failure() {
    let project = TestProject::new();
    project.write_procflow_kdl(
        r#"
        process "web" routable=#true
        process "worker"
    "#,
    );

    project
        .command()
        .arg("validate")
        .assert()
        .failure()
        .stdout(predicate::str::contains("web"));
}

#[test]
fn test_validate_without_project() {
    let project = TestProject::new();

    project.command().arg("validate").assert().failure();
}

#[test]
fn test_validate_env_config_path() {
    let project = TestProject::new();
    let config = project.path().join("elsewhere.kdl");
    fs::write(&config, SHOP_KDL).unwrap();

    project
        .command()
        .env("PROCFLOW_CONFIG_PATH", &config)
        .arg("validate")
        .assert()
        .success();
}
