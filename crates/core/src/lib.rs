// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! keep-core: shared types for the keep entity store
//!
//! This crate provides:
//! - The structured data tree entities serialise into ([`Section`])
//! - Its text form ([`Document`])
//! - Entity identity and the entity/registry contracts
//! - A clock abstraction for timers

pub mod clock;
pub mod document;
pub mod entity;
pub mod id;
pub mod section;

pub use clock::{Clock, FakeClock, SystemClock};
pub use document::{Document, DocumentError};
pub use entity::{Entity, EntityError, EntityRegistry, KIND_KEY};
pub use id::{EntityId, IdParseError};
pub use section::{Section, SectionError, Table, Value};

#[cfg(any(test, feature = "test-support"))]
pub use entity::{MemoryRegistry, Record};
