// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Entity and registry contracts consumed by the store

use crate::id::EntityId;
use crate::section::Section;
use thiserror::Error;

/// Key under which an entity's kind tag is persisted
pub const KIND_KEY: &str = "type";

/// Failure of a single entity to serialise or deserialise
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EntityError {
    #[error("missing field {0:?}")]
    MissingField(String),
    #[error("invalid field {field:?}: {reason}")]
    InvalidField { field: String, reason: String },
    #[error("unknown entity kind {0:?}")]
    UnknownKind(String),
    #[error("{0}")]
    Other(String),
}

/// A persisted domain object
pub trait Entity {
    fn id(&self) -> EntityId;

    /// Short type tag, persisted under [`KIND_KEY`]
    fn kind(&self) -> &str;

    /// Write the entity's current state into `node`
    ///
    /// On error the store keeps the previous snapshot of this entity.
    fn save(&self, node: &mut Section) -> Result<(), EntityError>;
}

/// The live set of loaded entities
///
/// Owned by the caller's domain layer and handed to the store at
/// construction; the store only reads entities when capturing snapshots
/// and rebuilds them on load.
pub trait EntityRegistry {
    type Entity: Entity;

    fn get(&self, id: EntityId) -> Option<&Self::Entity>;
    fn get_mut(&mut self, id: EntityId) -> Option<&mut Self::Entity>;
    fn insert(&mut self, entity: Self::Entity);
    fn remove(&mut self, id: EntityId) -> Option<Self::Entity>;

    /// Reconstruct an entity from its stored node and register it
    fn restore(&mut self, id: EntityId, node: &Section) -> Result<(), EntityError>;

    fn ids(&self) -> Vec<EntityId>;
    fn len(&self) -> usize {
        self.ids().len()
    }
    fn is_empty(&self) -> bool {
        self.len() == 0
    }
    fn clear(&mut self);
}

#[cfg(any(test, feature = "test-support"))]
pub use memory::{MemoryRegistry, Record};

#[cfg(any(test, feature = "test-support"))]
mod memory {
    use super::*;
    use std::collections::BTreeMap;

    /// Simple entity with integer fields, for tests
    #[derive(Debug, Clone, PartialEq, Eq)]
    pub struct Record {
        pub id: EntityId,
        pub kind: String,
        pub fields: BTreeMap<String, i64>,
        /// When set, `save` fails
        pub poisoned: bool,
    }

    impl Record {
        pub fn new(id: EntityId, kind: &str) -> Self {
            Self {
                id,
                kind: kind.to_string(),
                fields: BTreeMap::new(),
                poisoned: false,
            }
        }

        pub fn with(mut self, field: &str, value: i64) -> Self {
            self.fields.insert(field.to_string(), value);
            self
        }
    }

    impl Entity for Record {
        fn id(&self) -> EntityId {
            self.id
        }

        fn kind(&self) -> &str {
            &self.kind
        }

        fn save(&self, node: &mut Section) -> Result<(), EntityError> {
            if self.poisoned {
                return Err(EntityError::Other(format!("record {} is poisoned", self.id)));
            }
            for (field, value) in &self.fields {
                node.set(field.as_str(), *value);
            }
            Ok(())
        }
    }

    /// In-memory registry of [`Record`]s
    #[derive(Debug, Default)]
    pub struct MemoryRegistry {
        pub records: BTreeMap<EntityId, Record>,
        /// Kinds that fail to restore
        pub rejected_kinds: Vec<String>,
    }

    impl MemoryRegistry {
        pub fn new() -> Self {
            Self::default()
        }
    }

    impl EntityRegistry for MemoryRegistry {
        type Entity = Record;

        fn get(&self, id: EntityId) -> Option<&Record> {
            self.records.get(&id)
        }

        fn get_mut(&mut self, id: EntityId) -> Option<&mut Record> {
            self.records.get_mut(&id)
        }

        fn insert(&mut self, entity: Record) {
            self.records.insert(entity.id, entity);
        }

        fn remove(&mut self, id: EntityId) -> Option<Record> {
            self.records.remove(&id)
        }

        fn restore(&mut self, id: EntityId, node: &Section) -> Result<(), EntityError> {
            let kind = node
                .get_str(KIND_KEY)
                .ok_or_else(|| EntityError::MissingField(KIND_KEY.to_string()))?;
            if self.rejected_kinds.iter().any(|k| k == kind) {
                return Err(EntityError::UnknownKind(kind.to_string()));
            }
            let mut record = Record::new(id, kind);
            for (key, value) in node.iter().filter(|(k, _)| *k != KIND_KEY) {
                let n = value.as_integer().ok_or_else(|| EntityError::InvalidField {
                    field: key.to_string(),
                    reason: "expected integer".to_string(),
                })?;
                record.fields.insert(key.to_string(), n);
            }
            self.records.insert(id, record);
            Ok(())
        }

        fn ids(&self) -> Vec<EntityId> {
            self.records.keys().copied().collect()
        }

        fn len(&self) -> usize {
            self.records.len()
        }

        fn clear(&mut self) {
            self.records.clear();
        }
    }
}

#[cfg(test)]
#[path = "entity_tests.rs"]
mod tests;
