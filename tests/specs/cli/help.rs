//! Help and version specs
//!
//! Verify the CLI describes its commands.

use crate::prelude::*;

#[test]
fn help_lists_commands() {
    let temp = Project::empty();

    temp.keepctl()
        .args(&["--help"])
        .passes()
        .stdout_has("inspect")
        .stdout_has("verify")
        .stdout_has("recover");
}

#[test]
fn version_names_binary() {
    let temp = Project::empty();

    temp.keepctl()
        .args(&["--version"])
        .passes()
        .stdout_has("keepctl");
}

#[test]
fn verify_help_documents_current_version() {
    let temp = Project::empty();

    temp.keepctl()
        .args(&["verify", "--help"])
        .passes()
        .stdout_has("--current");
}
