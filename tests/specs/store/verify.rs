//! Verify specs
//!
//! Verify version checks match what a loading store would decide.

use crate::prelude::*;

#[test]
fn verify_accepts_current_version() {
    let temp = Project::empty();
    temp.file("entities.toml", &store_file(3));

    temp.keepctl()
        .args(&["verify", "entities.toml", "--current", "3"])
        .passes()
        .stdout_has("ok: entities.toml (data version 3)")
        .stdout_lacks("upgrades");
}

#[test]
fn verify_accepts_upgrade() {
    let temp = Project::empty();
    temp.file("entities.toml", &store_file(3));

    temp.keepctl()
        .args(&["verify", "entities.toml", "--current", "4"])
        .passes()
        .stdout_has("upgrades to 4");
}

#[test]
fn verify_refuses_downgrade() {
    let temp = Project::empty();
    let original = store_file(3);
    temp.file("entities.toml", &original);

    temp.keepctl()
        .args(&["verify", "entities.toml", "--current", "2"])
        .fails()
        .stderr_has("newer than supported version 2");

    assert_eq!(temp.read("entities.toml"), original);
}

#[test]
fn verify_treats_missing_marker_as_version_zero() {
    let temp = Project::empty();
    temp.file("entities.toml", "[1]\ntype = \"crate\"\n");

    temp.keepctl()
        .args(&["verify", "entities.toml", "--current", "1"])
        .passes()
        .stdout_has("data version 0, upgrades to 1");
}

#[test]
fn verify_rejects_invalid_marker() {
    let temp = Project::empty();
    temp.file("entities.toml", "data-version = \"three\"\n");

    temp.keepctl()
        .args(&["verify", "entities.toml", "--current", "3"])
        .fails()
        .stderr_has("data-version");
}

#[test]
fn verify_counts_untyped_entities() {
    let temp = Project::empty();
    temp.file("entities.toml", "data-version = 3\n\n[1]\nvalue = 1\n");

    temp.keepctl()
        .args(&["verify", "entities.toml", "--current", "3"])
        .passes()
        .stdout_has("Untyped entities: 1");
}
