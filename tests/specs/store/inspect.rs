//! Inspect specs
//!
//! Verify store files are summarised without being modified.

use crate::prelude::*;

#[test]
fn inspect_summarises_entities_by_kind() {
    let temp = Project::empty();
    temp.file("entities.toml", &store_file(3));

    let expected = [
        "File: entities.toml\n".to_string(),
        "  Data version: 3\n".to_string(),
        "  Entities: 3\n".to_string(),
        format!("    {:<16} {}\n", "barrel", 1),
        format!("    {:<16} {}\n", "crate", 2),
    ]
    .concat();

    temp.keepctl()
        .args(&["inspect", "entities.toml"])
        .passes()
        .stdout_eq(&expected);
}

#[test]
fn inspect_reports_oddities() {
    let temp = Project::empty();
    temp.file(
        "entities.toml",
        "data-version = 1\n\n[3]\nvalue = 1\n\n[meta]\nnote = \"x\"\n",
    );
    temp.file("entities.toml.tmp", "partial");

    temp.keepctl()
        .args(&["inspect", "entities.toml"])
        .passes()
        .stdout_has("Untyped entities: 1")
        .stdout_has("Unrecognized keys: meta")
        .stdout_has("Leftover temp file: entities.toml.tmp");
}

#[test]
fn inspect_emits_json() {
    let temp = Project::empty();
    temp.file("entities.toml", &store_file(2));

    temp.keepctl()
        .args(&["--output", "json", "inspect", "entities.toml"])
        .passes()
        .stdout_has("\"data_version\": 2")
        .stdout_has("\"crate\": 2");
}

#[test]
fn inspect_uses_path_from_config() {
    let temp = Project::empty();
    temp.file("keep.toml", "path = \"data/entities.toml\"\nsave_delay = \"2s\"\n");
    temp.file("data/entities.toml", &store_file(3));

    temp.keepctl()
        .args(&["--config", "keep.toml", "inspect"])
        .passes()
        .stdout_has("Entities: 3");
}

#[test]
fn inspect_reports_parse_errors() {
    let temp = Project::empty();
    temp.file("entities.toml", "not = [valid");

    temp.keepctl()
        .args(&["inspect", "entities.toml"])
        .fails()
        .stderr_has("failed to parse");
}

#[test]
fn inspect_leaves_file_untouched() {
    let temp = Project::empty();
    let original = store_file(3);
    temp.file("entities.toml", &original);

    temp.keepctl().args(&["inspect", "entities.toml"]).passes();

    assert_eq!(temp.read("entities.toml"), original);
}
