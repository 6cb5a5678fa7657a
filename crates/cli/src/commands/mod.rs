// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! CLI command implementations

pub mod inspect;
pub mod recover;
pub mod verify;

use keep_core::KIND_KEY;
use keep_storage::{LoadError, SaveData, UnrecognizedKey};
use std::path::Path;

/// Read and parse a store file without touching it
fn read_store(path: &Path) -> Result<(SaveData, Vec<UnrecognizedKey>), LoadError> {
    let text = std::fs::read_to_string(path).map_err(|source| LoadError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    SaveData::parse(&text).map_err(|source| LoadError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

/// Entities with no kind tag; no registry can restore them
fn untyped(data: &SaveData) -> usize {
    data.entities()
        .filter(|(_, node)| node.get_str(KIND_KEY).is_none())
        .count()
}
