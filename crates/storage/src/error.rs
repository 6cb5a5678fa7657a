// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Error types for the entity store

use crate::config::ConfigError;
use crate::snapshot::SnapshotError;
use crate::writer::WriteError;
use std::path::PathBuf;
use thiserror::Error;

/// Conditions that abort a load and leave saving disabled
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: SnapshotError,
    },
    #[error("{path} has data version {stored}, newer than supported version {current}")]
    Downgrade {
        path: PathBuf,
        stored: u32,
        current: u32,
    },
    #[error("refusing to migrate {path} without a backup: {source}")]
    Backup {
        path: PathBuf,
        #[source]
        source: WriteError,
    },
}

/// Errors surfaced by the store facade
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("no free entity ID left")]
    IdsExhausted,
    #[error("saving is disabled after a failed load")]
    SavingDisabled,
    #[error("save failed: {0}")]
    Write(#[from] WriteError),
    #[error("load failed: {0}")]
    Load(#[from] LoadError),
    #[error("config error: {0}")]
    Config(#[from] ConfigError),
    #[error(
        "store still dirty after shutdown: {dirty} dirty, {unsaved} unsaved, {unsaved_deleted} unsaved deletions"
    )]
    DirtyAfterShutdown {
        dirty: usize,
        unsaved: usize,
        unsaved_deleted: usize,
    },
}
