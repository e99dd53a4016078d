//! CLI smoke tests against the built binary

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

fn tp(home: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("tp").unwrap();
    cmd.current_dir(home.path())
        .env("HOME", home.path())
        .env("XDG_DATA_HOME", home.path().join("data"))
        .env("XDG_CONFIG_HOME", home.path().join("config"))
        .env_remove("GEMINI_API_KEY")
        .env_remove("GOOGLE_MAPS_API_KEY")
        .env_remove("FIREBASE_API_KEY");
    cmd
}

#[test]
fn test_help() {
    let home = TempDir::new().unwrap();
    tp(&home)
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("itineraries"));
}

#[test]
fn test_suggest_uses_curated_list_without_places_key() {
    let home = TempDir::new().unwrap();
    tp(&home)
        .args(["suggest", "par"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Paris, France"))
        .stdout(predicate::str::contains("Tokyo").not());
}

#[test]
fn test_suggest_single_character_is_empty() {
    let home = TempDir::new().unwrap();
    tp(&home)
        .args(["suggest", "p"])
        .assert()
        .success()
        .stdout(predicate::str::contains("No destinations match"));
}

#[test]
fn test_plan_without_generation_key_fails() {
    let home = TempDir::new().unwrap();
    tp(&home)
        .args(["plan", "Tokyo, Japan"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("GEMINI_API_KEY"));
}

#[test]
fn test_whoami_without_identity_service() {
    let home = TempDir::new().unwrap();
    tp(&home)
        .arg("whoami")
        .assert()
        .success()
        .stdout(predicate::str::contains("Not signed in"));
}

#[test]
fn test_trips_require_login() {
    let home = TempDir::new().unwrap();
    tp(&home)
        .args(["trips", "list"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Log in"));
}
