// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Recover command

use super::read_store;
use crate::output::{self, OutputFormat};
use anyhow::{bail, Context, Result};
use keep_storage::writer::{recover_temp, temp_path};
use serde::Serialize;
use std::fmt;
use std::path::{Path, PathBuf};

#[derive(clap::Args)]
pub struct RecoverArgs {
    /// Store file (defaults to the path in --config)
    pub file: Option<PathBuf>,

    /// Promote the temp file even if it does not parse
    #[arg(long)]
    pub force: bool,
}

#[derive(Serialize)]
#[serde(rename_all = "snake_case")]
enum Action {
    Promoted,
    /// The store file exists; a temp file, if any, is left alone
    Kept,
}

#[derive(Serialize)]
struct Recovery {
    path: String,
    temp: String,
    action: Action,
}

impl fmt::Display for Recovery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.action {
            Action::Promoted => writeln!(f, "Recovered {} from {}", self.path, self.temp),
            Action::Kept => writeln!(f, "Nothing to recover: {} exists", self.path),
        }
    }
}

pub fn handle(path: &Path, force: bool, format: OutputFormat) -> Result<()> {
    let tmp = temp_path(path);
    if !path.exists() && !tmp.exists() {
        bail!("neither {} nor {} exists", path.display(), tmp.display());
    }
    if !path.exists() && !force {
        read_store(&tmp).context("temp file is not a valid store file; use --force to promote it anyway")?;
    }

    let action = if recover_temp(path)? {
        tracing::info!(path = %path.display(), "promoted temp file");
        Action::Promoted
    } else {
        Action::Kept
    };
    let recovery = Recovery {
        path: path.display().to_string(),
        temp: tmp.display().to_string(),
        action,
    };
    output::emit(&recovery, format)
}
