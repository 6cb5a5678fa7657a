//! Recover specs
//!
//! Verify leftover temp files are promoted only when safe.

use crate::prelude::*;

#[test]
fn recover_promotes_temp_when_primary_missing() {
    let temp = Project::empty();
    let contents = store_file(3);
    temp.file("entities.toml.tmp", &contents);

    temp.keepctl()
        .args(&["recover", "entities.toml"])
        .passes()
        .stdout_has("Recovered entities.toml from entities.toml.tmp");

    assert_eq!(temp.read("entities.toml"), contents);
    assert!(!temp.exists("entities.toml.tmp"));
}

#[test]
fn recover_keeps_existing_primary() {
    let temp = Project::empty();
    temp.file("entities.toml", &store_file(3));
    temp.file("entities.toml.tmp", &store_file(4));

    temp.keepctl()
        .args(&["recover", "entities.toml"])
        .passes()
        .stdout_has("Nothing to recover");

    assert_eq!(temp.read("entities.toml"), store_file(3));
    assert!(temp.exists("entities.toml.tmp"));
}

#[test]
fn recover_fails_when_nothing_exists() {
    let temp = Project::empty();

    temp.keepctl()
        .args(&["recover", "entities.toml"])
        .fails()
        .stderr_has("neither");
}

#[test]
fn recover_refuses_unparsable_temp_without_force() {
    let temp = Project::empty();
    temp.file("entities.toml.tmp", "data-version = [");

    temp.keepctl()
        .args(&["recover", "entities.toml"])
        .fails()
        .stderr_has("--force");
    assert!(!temp.exists("entities.toml"));

    temp.keepctl()
        .args(&["recover", "entities.toml", "--force"])
        .passes()
        .stdout_has("Recovered");
    assert!(temp.exists("entities.toml"));
}
