// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! keep-storage: persistence for the keep entity store
//!
//! This crate provides:
//! - The [`EntityStore`] facade with its save cycle and load path
//! - Dirty/unsaved bookkeeping and ID allocation
//! - Versioned migrations applied on load
//! - Crash-safe atomic file writes

pub mod allocator;
pub mod config;
pub mod error;
pub mod migration;
pub mod snapshot;
pub mod store;
pub mod task;
pub mod tracking;
pub mod writer;

pub use allocator::IdAllocator;
pub use config::{ConfigError, SavePolicy, StoreConfig};
pub use error::{LoadError, StoreError};
pub use migration::{MigrationPipeline, MigrationScope, VersionCheck};
pub use snapshot::{SaveData, SnapshotError, UnrecognizedKey, FILE_HEADER, VERSION_KEY};
pub use store::{EntityStore, LoadReport, StoreStatus};
pub use task::SavePhase;
pub use tracking::{Deletion, Tracking};
pub use writer::{WriteError, WriteStep};
