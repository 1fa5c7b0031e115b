#![allow(deprecated)]
use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

fn octopipe(dir: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("octopipe").unwrap();
    cmd.current_dir(dir.path())
        .env("OCTOPIPE_ROOT", dir.path())
        .env_remove("OCTOPUS_URI")
        .env_remove("OCTOPUS_API_KEY")
        .env_remove("RUST_LOG");
    cmd
}

fn create_skeleton(dir: &TempDir) {
    octopipe(dir).arg("create").assert().success();
}

fn read(dir: &TempDir, rel: &str) -> String {
    std::fs::read_to_string(dir.path().join(rel)).unwrap()
}

// ---------------------------------------------------------------------------
// octopipe create
// ---------------------------------------------------------------------------

#[test]
fn create_writes_config_and_scripts() {
    let dir = TempDir::new().unwrap();
    octopipe(&dir)
        .arg("create")
        .assert()
        .success()
        .stdout(predicate::str::contains("created: octopipe.yaml"));

    assert!(dir.path().join("octopipe.yaml").exists());
    assert!(dir.path().join("scripts/init.ps1").exists());
    assert!(dir.path().join("scripts/deploy.ps1").exists());

    let cfg: serde_yaml::Value = serde_yaml::from_str(&read(&dir, "octopipe.yaml")).unwrap();
    assert_eq!(cfg["project"]["name"].as_str(), Some("OctopusProject"));
    assert_eq!(cfg["process"]["steps"][0]["type"].as_str(), Some("PowerShell"));
}

#[test]
fn create_refuses_to_overwrite() {
    let dir = TempDir::new().unwrap();
    create_skeleton(&dir);
    std::fs::write(dir.path().join("octopipe.yaml"), "project:\n  name: Mine\n").unwrap();

    octopipe(&dir)
        .arg("create")
        .assert()
        .failure()
        .code(1)
        .stdout(predicate::str::contains("already exists"));
    assert_eq!(read(&dir, "octopipe.yaml"), "project:\n  name: Mine\n");
}

#[test]
fn create_keeps_existing_scripts() {
    let dir = TempDir::new().unwrap();
    std::fs::create_dir_all(dir.path().join("scripts")).unwrap();
    std::fs::write(dir.path().join("scripts/init.ps1"), "custom").unwrap();
    create_skeleton(&dir);
    assert_eq!(read(&dir, "scripts/init.ps1"), "custom");
}

#[test]
fn import_refuses_before_needing_credentials() {
    let dir = TempDir::new().unwrap();
    create_skeleton(&dir);
    octopipe(&dir)
        .args(["create", "-i", "Payments API"])
        .assert()
        .failure()
        .stdout(predicate::str::contains("already exists"));
}

// ---------------------------------------------------------------------------
// octopipe put
// ---------------------------------------------------------------------------

#[test]
fn put_without_credentials_fails() {
    let dir = TempDir::new().unwrap();
    create_skeleton(&dir);
    octopipe(&dir)
        .arg("put")
        .assert()
        .failure()
        .code(1)
        .stdout(predicate::str::contains("API key and URI must be specified"));
}

// ---------------------------------------------------------------------------
// octopipe sub / clear
// ---------------------------------------------------------------------------

fn scripts_dir(dir: &TempDir) -> String {
    dir.path().join("scripts").display().to_string()
}

#[test]
fn sub_substitutes_and_backs_up() {
    let dir = TempDir::new().unwrap();
    create_skeleton(&dir);

    octopipe(&dir)
        .args(["sub", &scripts_dir(&dir), "Environment=Dev"])
        .assert()
        .success()
        .stdout(predicate::str::contains("AzurePassword"));

    let deploy = read(&dir, "scripts/deploy.ps1");
    assert!(deploy.contains(r#"-g "aks-dev-rg" -n "aks-01""#), "{deploy}");
    assert_eq!(
        read(&dir, "scripts/deploy.octopipe.ps1"),
        r##"az aks create -g "#{AksResourceGroupName}" -n "#{AksName}" --node-count 5
$cluster = az aks show -n "#{AksName}" -g "#{AksResourceGroupName}" | ConvertFrom-Json
Write-Host $cluster.Status
"##
    );
    let init = read(&dir, "scripts/init.ps1");
    assert!(init.contains("user@github.com"));
    assert!(init.contains("#{AzurePassword}"));
}

#[test]
fn sub_rerun_with_other_scope_starts_from_backup() {
    let dir = TempDir::new().unwrap();
    create_skeleton(&dir);
    let template = read(&dir, "scripts/deploy.ps1");

    octopipe(&dir)
        .args(["sub", &scripts_dir(&dir), "Environment=Dev"])
        .assert()
        .success();
    octopipe(&dir)
        .args(["sub", &scripts_dir(&dir), "Environment=Test"])
        .assert()
        .success()
        .stdout(predicate::str::contains("(kept)"));

    assert!(read(&dir, "scripts/deploy.ps1").contains(r#"-g "aks-test-rg""#));
    assert_eq!(read(&dir, "scripts/deploy.octopipe.ps1"), template);
}

#[test]
fn sub_falls_back_to_default_entry() {
    let dir = TempDir::new().unwrap();
    create_skeleton(&dir);
    octopipe(&dir)
        .args(["sub", &scripts_dir(&dir), "Environment=Production"])
        .assert()
        .success();
    assert!(read(&dir, "scripts/deploy.ps1").contains(r#"-g "aks-rg""#));
}

#[test]
fn sub_check_only_changes_nothing() {
    let dir = TempDir::new().unwrap();
    create_skeleton(&dir);
    let before = read(&dir, "scripts/deploy.ps1");

    octopipe(&dir)
        .args(["sub", "-c", &scripts_dir(&dir), "Environment=Dev"])
        .assert()
        .success()
        .stdout(predicate::str::contains("AzurePassword"))
        .stdout(predicate::str::contains("no files were changed"));

    assert_eq!(read(&dir, "scripts/deploy.ps1"), before);
    assert!(!dir.path().join("scripts/deploy.octopipe.ps1").exists());
}

#[test]
fn sub_json_reports_per_file() {
    let dir = TempDir::new().unwrap();
    create_skeleton(&dir);
    let out = octopipe(&dir)
        .args([
            "sub",
            "--json",
            "--check-only",
            "-f",
            "init.ps1",
            &scripts_dir(&dir),
            "Environment=Dev",
        ])
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();

    let reports: serde_json::Value = serde_json::from_slice(&out).unwrap();
    let reports = reports.as_array().unwrap();
    assert_eq!(reports.len(), 1);
    assert_eq!(reports[0]["unresolved"], serde_json::json!(["AzurePassword"]));
    assert_eq!(reports[0]["written"], serde_json::json!(false));
}

#[test]
fn sub_rejects_unknown_dimension() {
    let dir = TempDir::new().unwrap();
    create_skeleton(&dir);
    octopipe(&dir)
        .args(["sub", &scripts_dir(&dir), "Region=West"])
        .assert()
        .failure()
        .stdout(predicate::str::contains("unknown scope dimension 'Region'"));
}

#[test]
fn clear_removes_backups_and_is_idempotent() {
    let dir = TempDir::new().unwrap();
    create_skeleton(&dir);
    octopipe(&dir)
        .args(["sub", &scripts_dir(&dir), "Environment=Dev"])
        .assert()
        .success();
    assert!(dir.path().join("scripts/init.octopipe.ps1").exists());

    octopipe(&dir)
        .args(["clear", &scripts_dir(&dir)])
        .assert()
        .success()
        .stdout(predicate::str::contains("removed"));
    assert!(!dir.path().join("scripts/init.octopipe.ps1").exists());
    assert!(!dir.path().join("scripts/deploy.octopipe.ps1").exists());
    assert!(dir.path().join("scripts/deploy.ps1").exists());

    octopipe(&dir)
        .args(["clear", &scripts_dir(&dir)])
        .assert()
        .success()
        .stdout(predicate::str::contains("No backups to remove."));
}

// ---------------------------------------------------------------------------
// octopipe validate
// ---------------------------------------------------------------------------

#[test]
fn validate_skeleton_passes() {
    let dir = TempDir::new().unwrap();
    create_skeleton(&dir);
    octopipe(&dir)
        .arg("validate")
        .assert()
        .success()
        .stdout(predicate::str::contains("valid"));
}

#[test]
fn validate_reports_missing_script() {
    let dir = TempDir::new().unwrap();
    create_skeleton(&dir);
    std::fs::remove_file(dir.path().join("scripts/deploy.ps1")).unwrap();
    octopipe(&dir)
        .arg("validate")
        .assert()
        .failure()
        .code(1)
        .stdout(predicate::str::contains("scripts/deploy.ps1"));
}

#[test]
fn validate_without_config_fails() {
    let dir = TempDir::new().unwrap();
    octopipe(&dir)
        .arg("validate")
        .assert()
        .failure()
        .stdout(predicate::str::contains("octopipe create"));
}
