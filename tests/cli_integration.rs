//! CLI integration tests for Solder.
//!
//! These tests verify the CLI surface: project scaffolding, board listing,
//! cleaning, and the package-manager error paths that need no network. The
//! package-manager happy paths are covered by unit tests against local
//! fixture repositories.

use std::fs;
use std::process::Command;

use assert_cmd::prelude::*;
use predicates::prelude::*;
use tempfile::TempDir;

/// Get the solder binary command.
fn solder() -> Command {
    Command::cargo_bin("solder").unwrap()
}

/// Create a temporary directory for test projects.
fn temp_dir() -> TempDir {
    TempDir::new().unwrap()
}

// ============================================================================
// solder new
// ============================================================================

#[test]
fn test_new_creates_project_structure() {
    let tmp = temp_dir();

    solder()
        .args(["new", "--board", "uno"])
        .current_dir(tmp.path())
        .assert()
        .success();

    assert!(tmp.path().join("config.json").exists());
    assert!(tmp.path().join("src/main.cpp").exists());
    assert!(tmp.path().join("lib").is_dir());
    assert!(tmp.path().join("solder/bin").is_dir());
    assert!(tmp.path().join("solder/CMakeLists.txt").exists());
    assert!(tmp.path().join(".gitignore").exists());

    let config = fs::read_to_string(tmp.path().join("config.json")).unwrap();
    assert!(config.contains("\"board\": \"uno\""));
    assert!(config.contains("\"framework\": \"cosa\""));
}

#[test]
fn test_new_with_path_flag() {
    let tmp = temp_dir();

    solder()
        .args(["new", "--board", "mega2560", "--path", "firmware"])
        .current_dir(tmp.path())
        .assert()
        .success();

    assert!(tmp.path().join("firmware/src/main.cpp").exists());
}

#[test]
fn test_new_rejects_unknown_board() {
    let tmp = temp_dir();

    solder()
        .args(["new", "--board", "toaster"])
        .current_dir(tmp.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("toaster"));
}

#[test]
fn test_new_refuses_existing_project() {
    let tmp = temp_dir();
    fs::create_dir(tmp.path().join("src")).unwrap();

    solder()
        .args(["new", "--board", "uno"])
        .current_dir(tmp.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("solder update"));
}

#[test]
fn test_new_clion_writes_ide_files() {
    let tmp = temp_dir();

    solder()
        .args(["new", "--board", "uno", "--ide", "clion"])
        .current_dir(tmp.path())
        .assert()
        .success();

    assert!(tmp.path().join("CMakeLists.txt").exists());
    assert!(tmp.path().join("CMakeListsPrivate.txt").exists());
}

// ============================================================================
// solder update
// ============================================================================

#[test]
fn test_update_preserves_user_sources() {
    let tmp = temp_dir();

    solder()
        .args(["new", "--board", "uno"])
        .current_dir(tmp.path())
        .assert()
        .success();

    fs::write(tmp.path().join("src/app.cpp"), "// app code").unwrap();

    solder()
        .args(["update"])
        .current_dir(tmp.path())
        .assert()
        .success();

    assert!(tmp.path().join("src/app.cpp").exists());
    let config = fs::read_to_string(tmp.path().join("config.json")).unwrap();
    assert!(config.contains("\"board\": \"uno\""));
}

#[test]
fn test_update_switches_board() {
    let tmp = temp_dir();

    solder()
        .args(["new", "--board", "uno"])
        .current_dir(tmp.path())
        .assert()
        .success();

    solder()
        .args(["update", "--board", "mega2560"])
        .current_dir(tmp.path())
        .assert()
        .success();

    let internal =
        fs::read_to_string(tmp.path().join("solder/internal-config.json")).unwrap();
    assert!(internal.contains("\"board\": \"mega2560\""));
    assert!(internal.contains("atmega2560"));
}

#[test]
fn test_update_without_board_in_fresh_dir_fails() {
    let tmp = temp_dir();

    solder()
        .args(["update"])
        .current_dir(tmp.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("board"));
}

// ============================================================================
// solder boards
// ============================================================================

#[test]
fn test_boards_lists_registry() {
    solder()
        .args(["boards"])
        .assert()
        .success()
        .stdout(predicate::str::contains("uno"))
        .stdout(predicate::str::contains("Arduino Uno"))
        .stdout(predicate::str::contains("mega2560"));
}

// ============================================================================
// solder clean
// ============================================================================

#[test]
fn test_clean_removes_build_files() {
    let tmp = temp_dir();

    solder()
        .args(["new", "--board", "uno"])
        .current_dir(tmp.path())
        .assert()
        .success();

    fs::write(tmp.path().join("solder/bin/Makefile"), "all:").unwrap();

    solder()
        .args(["clean"])
        .current_dir(tmp.path())
        .assert()
        .success();

    assert!(tmp.path().join("solder/bin").exists());
    assert!(!tmp.path().join("solder/bin/Makefile").exists());
}

#[test]
fn test_clean_outside_project_fails() {
    let tmp = temp_dir();

    solder()
        .args(["clean"])
        .current_dir(tmp.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("not a Solder project"));
}

// ============================================================================
// solder build / upload (error paths; real builds need a toolchain)
// ============================================================================

#[test]
fn test_build_outside_project_fails() {
    let tmp = temp_dir();

    solder()
        .args(["build"])
        .current_dir(tmp.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("not a Solder project"));
}

#[test]
fn test_upload_requires_prior_build() {
    let tmp = temp_dir();

    solder()
        .args(["new", "--board", "uno"])
        .current_dir(tmp.path())
        .assert()
        .success();

    solder()
        .args(["upload"])
        .current_dir(tmp.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("build the project first"));
}

// ============================================================================
// solder package
// ============================================================================

#[test]
fn test_package_install_malformed_spec_is_fatal() {
    let tmp = temp_dir();

    solder()
        .args(["package", "install", "not a spec"])
        .current_dir(tmp.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("bad package format"));

    // Nothing was attempted: no package repository state beyond init.
    assert_eq!(
        fs::read_to_string(tmp.path().join(".pkg/pkglist")).unwrap(),
        "[]"
    );
}

#[test]
fn test_package_remove_not_installed_is_reported() {
    let tmp = temp_dir();

    solder()
        .args(["package", "remove", "acme/blink"])
        .current_dir(tmp.path())
        .assert()
        .success()
        .stderr(predicate::str::contains("not installed"));
}

#[test]
fn test_package_update_with_no_packages() {
    let tmp = temp_dir();

    solder()
        .args(["package", "update"])
        .current_dir(tmp.path())
        .assert()
        .success()
        .stderr(predicate::str::contains("up to date"));
}

#[test]
fn test_package_install_initializes_repository() {
    let tmp = temp_dir();

    // Even a failing batch initializes the hidden package repository with an
    // empty committed manifest.
    solder()
        .args(["package", "remove", "acme/blink"])
        .current_dir(tmp.path())
        .assert()
        .success();

    assert!(tmp.path().join(".pkg/.git").exists());
    assert_eq!(
        fs::read_to_string(tmp.path().join(".pkg/pkglist")).unwrap(),
        "[]"
    );
}

// ============================================================================
// solder completions
// ============================================================================

#[test]
fn test_completions_bash() {
    solder()
        .args(["completions", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::contains("solder"));
}
