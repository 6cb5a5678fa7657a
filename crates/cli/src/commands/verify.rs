// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Verify command

use super::{read_store, untyped};
use crate::output::{self, OutputFormat};
use anyhow::Result;
use keep_storage::{LoadError, MigrationPipeline, VersionCheck};
use serde::Serialize;
use std::fmt;
use std::path::{Path, PathBuf};

#[derive(clap::Args)]
pub struct VerifyArgs {
    /// Store file (defaults to the path in --config)
    pub file: Option<PathBuf>,

    /// Data version of the build that will load the file
    #[arg(long)]
    pub current: u32,
}

#[derive(Serialize)]
struct Verification {
    path: String,
    stored: u32,
    current: u32,
    upgrade: bool,
    entities: usize,
    untyped: usize,
}

impl fmt::Display for Verification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.upgrade {
            writeln!(
                f,
                "ok: {} (data version {}, upgrades to {})",
                self.path, self.stored, self.current
            )?;
        } else {
            writeln!(f, "ok: {} (data version {})", self.path, self.stored)?;
        }
        writeln!(f, "  Entities: {}", self.entities)?;
        if self.untyped > 0 {
            writeln!(f, "  Untyped entities: {} (will be kept, not loaded)", self.untyped)?;
        }
        Ok(())
    }
}

pub fn handle(path: &Path, current: u32, format: OutputFormat) -> Result<()> {
    let (data, _) = read_store(path)?;

    let upgrade = match MigrationPipeline::new(current).check_version(data.version()) {
        VersionCheck::Current => false,
        VersionCheck::Upgrade { .. } => true,
        VersionCheck::Downgrade => {
            return Err(LoadError::Downgrade {
                path: path.to_path_buf(),
                stored: data.version(),
                current,
            }
            .into())
        }
    };

    let verification = Verification {
        path: path.display().to_string(),
        stored: data.version(),
        current,
        upgrade,
        entities: data.len(),
        untyped: untyped(&data),
    };
    if verification.untyped > 0 {
        tracing::warn!(untyped = verification.untyped, "entities without a kind tag");
    }
    output::emit(&verification, format)
}
