// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The in-memory image of the store file
//!
//! [`SaveData`] is the only thing ever written to disk. It keeps one node
//! per entity ID, the version marker, and any top-level keys it does not
//! recognise, which are carried through saves untouched.

use keep_core::{Document, DocumentError, EntityId, Section, Value};
use std::collections::BTreeMap;
use thiserror::Error;

/// Top-level key holding the data version
pub const VERSION_KEY: &str = "data-version";

/// Header comment written above the data
pub const FILE_HEADER: &str = "\
Entity store data.
Top-level tables are keyed by entity ID; data-version marks the format.
Written atomically by the store. Edit only while the owning process is stopped.";

#[derive(Debug, Error)]
pub enum SnapshotError {
    #[error("version marker \"data-version\" is not a non-negative integer: {0}")]
    InvalidVersion(String),
    #[error(transparent)]
    Document(#[from] DocumentError),
}

/// Why a top-level key was not taken as an entity
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnrecognizedKey {
    pub key: String,
    pub reason: &'static str,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct SaveData {
    version: u32,
    entities: BTreeMap<EntityId, Section>,
    extra: Section,
}

impl SaveData {
    pub fn new(version: u32) -> Self {
        Self {
            version,
            ..Self::default()
        }
    }

    /// Split a parsed root into entities, version and leftovers
    ///
    /// A missing version marker reads as version 0.
    pub fn from_root(root: Section) -> Result<(Self, Vec<UnrecognizedKey>), SnapshotError> {
        let mut data = SaveData::default();
        let mut unrecognized = Vec::new();

        for (key, value) in root.into_table() {
            if key == VERSION_KEY {
                data.version = value
                    .as_integer()
                    .and_then(|v| u32::try_from(v).ok())
                    .ok_or_else(|| SnapshotError::InvalidVersion(value.to_string()))?;
                continue;
            }
            let reason = match (key.parse::<EntityId>(), value) {
                (Ok(id), Value::Table(table)) => {
                    data.entities.insert(id, Section::from_table(table));
                    continue;
                }
                (Ok(_), value) => {
                    data.extra.set(key.clone(), value);
                    "entity entry is not a table"
                }
                (Err(_), value) => {
                    data.extra.set(key.clone(), value);
                    "not an entity ID"
                }
            };
            unrecognized.push(UnrecognizedKey { key, reason });
        }

        Ok((data, unrecognized))
    }

    pub fn parse(text: &str) -> Result<(Self, Vec<UnrecognizedKey>), SnapshotError> {
        Self::from_root(Document::parse(text)?)
    }

    pub fn version(&self) -> u32 {
        self.version
    }

    pub fn set_version(&mut self, version: u32) {
        self.version = version;
    }

    pub fn get(&self, id: EntityId) -> Option<&Section> {
        self.entities.get(&id)
    }

    pub fn contains(&self, id: EntityId) -> bool {
        self.entities.contains_key(&id)
    }

    /// IDs named by preserved top-level keys that are not entity tables
    pub fn reserved_ids(&self) -> impl Iterator<Item = EntityId> + '_ {
        self.extra.keys().filter_map(|key| key.parse().ok())
    }

    /// Whether the file holds anything under `id`, entity or not
    pub fn claims(&self, id: EntityId) -> bool {
        self.contains(id) || self.reserved_ids().any(|reserved| reserved == id)
    }

    pub fn insert(&mut self, id: EntityId, node: Section) -> Option<Section> {
        self.entities.insert(id, node)
    }

    pub fn remove(&mut self, id: EntityId) -> Option<Section> {
        self.entities.remove(&id)
    }

    pub fn ids(&self) -> impl Iterator<Item = EntityId> + '_ {
        self.entities.keys().copied()
    }

    pub fn entities(&self) -> impl Iterator<Item = (EntityId, &Section)> {
        self.entities.iter().map(|(id, node)| (*id, node))
    }

    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    /// Top-level keys preserved verbatim
    pub fn extra(&self) -> &Section {
        &self.extra
    }

    pub fn to_document(&self) -> Document {
        let mut root = self.extra.clone();
        root.set(VERSION_KEY, i64::from(self.version));
        for (id, node) in &self.entities {
            root.set_child(id.to_string(), node.clone());
        }
        Document::new(FILE_HEADER, root)
    }

    pub fn render(&self) -> Result<String, DocumentError> {
        self.to_document().render()
    }
}

#[cfg(test)]
#[path = "snapshot_tests.rs"]
mod tests;
