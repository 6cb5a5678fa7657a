// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Crash-safe file replacement
//!
//! ```text
//! blob → <file>.tmp → fsync → rename over <file> → fsync dir
//! ```
//!
//! At every instant the destination holds either its old complete content
//! or the new complete content. A leftover `<file>.tmp` is a recovery
//! source if the destination itself is missing.

use chrono::{DateTime, Utc};
use std::fmt;
use std::fs::{self, File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

/// Suffix of the temporary sibling written before the rename
pub const TEMP_SUFFIX: &str = ".tmp";

/// Step of the atomic write that failed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteStep {
    CreateDir,
    CreateTemp,
    WriteTemp,
    SyncTemp,
    Rename,
    SyncDir,
    Copy,
}

impl fmt::Display for WriteStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let step = match self {
            Self::CreateDir => "create directory",
            Self::CreateTemp => "create temp file",
            Self::WriteTemp => "write temp file",
            Self::SyncTemp => "sync temp file",
            Self::Rename => "rename",
            Self::SyncDir => "sync directory",
            Self::Copy => "copy",
        };
        f.write_str(step)
    }
}

#[derive(Debug, Error)]
pub enum WriteError {
    #[error("{step} failed for {path}: {source}")]
    Io {
        step: WriteStep,
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to render store data: {0}")]
    Render(#[from] keep_core::DocumentError),
    #[error("gave up after {attempts} attempts: {last}")]
    Exhausted {
        attempts: u32,
        #[source]
        last: Box<WriteError>,
    },
    #[error("save worker stopped: {0}")]
    Worker(String),
}

fn io_err(step: WriteStep, path: &Path) -> impl FnOnce(io::Error) -> WriteError + '_ {
    move |source| WriteError::Io {
        step,
        path: path.to_path_buf(),
        source,
    }
}

/// `<file>.tmp` next to `path`
pub fn temp_path(path: &Path) -> PathBuf {
    let mut name = path
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_default();
    name.push(TEMP_SUFFIX);
    path.with_file_name(name)
}

/// `<file>.<timestamp>.bak` next to `path`
pub fn backup_path(path: &Path, at: DateTime<Utc>) -> PathBuf {
    let mut name = path
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_default();
    name.push(format!(".{}.bak", at.format("%Y%m%d-%H%M%S")));
    path.with_file_name(name)
}

/// Replace `path` with `contents` atomically
pub fn write_atomic(path: &Path, contents: &[u8]) -> Result<(), WriteError> {
    let parent = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    fs::create_dir_all(parent).map_err(io_err(WriteStep::CreateDir, parent))?;

    let tmp = temp_path(path);
    let mut file = OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .open(&tmp)
        .map_err(io_err(WriteStep::CreateTemp, &tmp))?;
    file.write_all(contents)
        .map_err(io_err(WriteStep::WriteTemp, &tmp))?;
    file.sync_all().map_err(io_err(WriteStep::SyncTemp, &tmp))?;
    drop(file);

    rename_overwrite(&tmp, path).map_err(io_err(WriteStep::Rename, path))?;

    #[cfg(unix)]
    {
        let dir = File::open(parent).map_err(io_err(WriteStep::SyncDir, parent))?;
        dir.sync_all().map_err(io_err(WriteStep::SyncDir, parent))?;
    }

    Ok(())
}

fn rename_overwrite(from: &Path, to: &Path) -> io::Result<()> {
    #[cfg(windows)]
    {
        match fs::rename(from, to) {
            Ok(()) => Ok(()),
            Err(err)
                if matches!(
                    err.kind(),
                    io::ErrorKind::AlreadyExists | io::ErrorKind::PermissionDenied
                ) =>
            {
                let _ = fs::remove_file(to);
                fs::rename(from, to)
            }
            Err(err) => Err(err),
        }
    }

    // rename(2) replaces the destination atomically
    #[cfg(not(windows))]
    {
        fs::rename(from, to)
    }
}

/// [`write_atomic`] with a bounded number of attempts
pub fn write_with_retry(
    path: &Path,
    contents: &[u8],
    attempts: u32,
    delay: Duration,
) -> Result<(), WriteError> {
    let attempts = attempts.max(1);
    let mut attempt = 1;
    loop {
        match write_atomic(path, contents) {
            Ok(()) => {
                if attempt > 1 {
                    tracing::info!(path = %path.display(), attempt, "write succeeded after retry");
                }
                return Ok(());
            }
            Err(e) if attempt < attempts => {
                tracing::warn!(path = %path.display(), attempt, error = %e, "write failed, retrying");
                std::thread::sleep(delay);
                attempt += 1;
            }
            Err(e) => {
                return Err(WriteError::Exhausted {
                    attempts,
                    last: Box::new(e),
                })
            }
        }
    }
}

/// Copy `path` to a timestamped sibling and sync it
pub fn backup_copy(path: &Path, at: DateTime<Utc>) -> Result<PathBuf, WriteError> {
    let backup = backup_path(path, at);
    fs::copy(path, &backup).map_err(io_err(WriteStep::Copy, &backup))?;
    File::open(&backup)
        .and_then(|f| f.sync_all())
        .map_err(io_err(WriteStep::SyncTemp, &backup))?;
    Ok(backup)
}

/// Promote a stale `<file>.tmp` when `path` itself is missing
///
/// Returns whether a promotion happened.
pub fn recover_temp(path: &Path) -> Result<bool, WriteError> {
    let tmp = temp_path(path);
    if path.exists() || !tmp.exists() {
        return Ok(false);
    }
    fs::rename(&tmp, path).map_err(io_err(WriteStep::Rename, path))?;
    Ok(true)
}

#[cfg(test)]
#[path = "writer_tests.rs"]
mod tests;
