//! CLI error specs
//!
//! Verify failures exit non-zero with a readable message.

use crate::prelude::*;

#[test]
fn missing_subcommand_shows_usage() {
    let temp = Project::empty();

    temp.keepctl().args(&[]).fails().stderr_has("Usage");
}

#[test]
fn no_file_and_no_config_is_an_error() {
    let temp = Project::empty();

    temp.keepctl()
        .args(&["inspect"])
        .fails()
        .stderr_has("no store file given");
}

#[test]
fn missing_store_file_is_an_error() {
    let temp = Project::empty();

    temp.keepctl()
        .args(&["inspect", "entities.toml"])
        .fails()
        .stderr_has("failed to read");
}

#[test]
fn unknown_config_field_is_an_error() {
    let temp = Project::empty();
    temp.file("keep.toml", "path = \"entities.toml\"\nsave_every = \"1s\"\n");

    temp.keepctl()
        .args(&["--config", "keep.toml", "inspect"])
        .fails()
        .stderr_has("invalid config");
}

#[test]
fn zero_write_attempts_is_rejected() {
    let temp = Project::empty();
    temp.file("keep.toml", "write_attempts = 0\n");

    temp.keepctl()
        .args(&["--config", "keep.toml", "inspect"])
        .fails()
        .stderr_has("write_attempts");
}
