// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Entity identifiers

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Errors from parsing an entity ID out of a storage key
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IdParseError {
    #[error("not a decimal integer: {0:?}")]
    NotNumeric(String),
    #[error("entity ID out of range: {0}")]
    OutOfRange(String),
}

/// Unique positive identifier of a persisted entity
///
/// Valid IDs span `1..=i32::MAX`. The persisted form is the decimal string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u32", into = "u32")]
pub struct EntityId(u32);

impl EntityId {
    /// Smallest valid ID
    pub const MIN: EntityId = EntityId(1);
    /// Largest valid ID
    pub const MAX: EntityId = EntityId(i32::MAX as u32);

    /// Returns `None` for zero or values above `i32::MAX`
    pub const fn new(raw: u32) -> Option<Self> {
        if raw >= Self::MIN.0 && raw <= Self::MAX.0 {
            Some(Self(raw))
        } else {
            None
        }
    }

    pub const fn get(self) -> u32 {
        self.0
    }

    /// The following ID, or `None` at the top of the range
    pub fn next(self) -> Option<Self> {
        Self::new(self.0.checked_add(1)?)
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for EntityId {
    type Err = IdParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.is_empty() || !s.bytes().all(|b| b.is_ascii_digit()) {
            return Err(IdParseError::NotNumeric(s.to_string()));
        }
        s.parse::<u32>()
            .ok()
            .and_then(Self::new)
            .ok_or_else(|| IdParseError::OutOfRange(s.to_string()))
    }
}

impl TryFrom<u32> for EntityId {
    type Error = IdParseError;

    fn try_from(raw: u32) -> Result<Self, Self::Error> {
        Self::new(raw).ok_or_else(|| IdParseError::OutOfRange(raw.to_string()))
    }
}

impl From<EntityId> for u32 {
    fn from(id: EntityId) -> Self {
        id.0
    }
}

#[cfg(test)]
#[path = "id_tests.rs"]
mod tests;
