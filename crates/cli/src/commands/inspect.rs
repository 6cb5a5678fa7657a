// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Inspect command

use super::{read_store, untyped};
use crate::output::{self, OutputFormat};
use anyhow::Result;
use keep_core::KIND_KEY;
use keep_storage::writer::temp_path;
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};

#[derive(clap::Args)]
pub struct InspectArgs {
    /// Store file (defaults to the path in --config)
    pub file: Option<PathBuf>,
}

#[derive(Serialize)]
struct Inspection {
    path: String,
    data_version: u32,
    entities: usize,
    kinds: BTreeMap<String, usize>,
    untyped: usize,
    unrecognized_keys: Vec<String>,
    leftover_temp: Option<String>,
}

impl fmt::Display for Inspection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "File: {}", self.path)?;
        writeln!(f, "  Data version: {}", self.data_version)?;
        writeln!(f, "  Entities: {}", self.entities)?;
        for (kind, count) in &self.kinds {
            writeln!(f, "    {:<16} {}", kind, count)?;
        }
        if self.untyped > 0 {
            writeln!(f, "  Untyped entities: {}", self.untyped)?;
        }
        if !self.unrecognized_keys.is_empty() {
            writeln!(
                f,
                "  Unrecognized keys: {}",
                self.unrecognized_keys.join(", ")
            )?;
        }
        if let Some(tmp) = &self.leftover_temp {
            writeln!(f, "  Leftover temp file: {}", tmp)?;
        }
        Ok(())
    }
}

pub fn handle(path: &Path, format: OutputFormat) -> Result<()> {
    let (data, unrecognized) = read_store(path)?;

    let mut kinds = BTreeMap::new();
    for (_, node) in data.entities() {
        if let Some(kind) = node.get_str(KIND_KEY) {
            *kinds.entry(kind.to_string()).or_insert(0) += 1;
        }
    }
    let tmp = temp_path(path);

    let inspection = Inspection {
        path: path.display().to_string(),
        data_version: data.version(),
        entities: data.len(),
        kinds,
        untyped: untyped(&data),
        unrecognized_keys: unrecognized.into_iter().map(|k| k.key).collect(),
        leftover_temp: tmp.exists().then(|| tmp.display().to_string()),
    };
    output::emit(&inspection, format)
}
