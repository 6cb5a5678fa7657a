// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Versioned migrations applied on load
//!
//! Two tiers run in order:
//!
//! ```text
//! file text ──raw──► text ──parse──► root ──per entity──► registry
//! ```
//!
//! Raw migrations repair the text itself (historical syntax errors) and
//! run before parsing. Entity migrations rewrite one entity node at a time
//! and are scoped by the node's kind.

use keep_core::{EntityId, Section, KIND_KEY};
use std::collections::BTreeSet;
use std::fmt;

type RawFn = Box<dyn Fn(&str) -> String + Send + Sync>;
type EntityFn = Box<dyn Fn(EntityId, &mut Section) -> bool + Send + Sync>;

/// Which entity nodes a migration applies to
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MigrationScope {
    All,
    /// Nodes whose kind tag equals this value
    Kind(String),
}

impl MigrationScope {
    pub fn kind(kind: impl Into<String>) -> Self {
        Self::Kind(kind.into())
    }

    fn matches(&self, node: &Section) -> bool {
        match self {
            Self::All => true,
            Self::Kind(kind) => node.get_str(KIND_KEY) == Some(kind.as_str()),
        }
    }
}

/// String-to-string transform over the whole file
pub struct RawMigration {
    pub name: String,
    transform: RawFn,
}

/// Transform over a single entity node; returns whether it changed anything
pub struct EntityMigration {
    pub name: String,
    pub scope: MigrationScope,
    migrate: EntityFn,
}

impl fmt::Debug for RawMigration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RawMigration").field("name", &self.name).finish()
    }
}

impl fmt::Debug for EntityMigration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EntityMigration")
            .field("name", &self.name)
            .field("scope", &self.scope)
            .finish()
    }
}

/// How a stored version relates to the running one
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VersionCheck {
    Current,
    /// Older data; `full_resave` when a storage-format change lies between
    Upgrade { full_resave: bool },
    /// Newer data than this build understands
    Downgrade,
}

/// Ordered migrations plus the version they bring data up to
#[derive(Debug)]
pub struct MigrationPipeline {
    current_version: u32,
    format_changes: BTreeSet<u32>,
    raw: Vec<RawMigration>,
    entity: Vec<EntityMigration>,
}

impl MigrationPipeline {
    pub fn new(current_version: u32) -> Self {
        Self {
            current_version,
            format_changes: BTreeSet::new(),
            raw: Vec::new(),
            entity: Vec::new(),
        }
    }

    pub fn current_version(&self) -> u32 {
        self.current_version
    }

    /// Mark `version` as changing the storage format of every entity
    pub fn format_change(mut self, version: u32) -> Self {
        self.format_changes.insert(version);
        self
    }

    pub fn raw(
        mut self,
        name: impl Into<String>,
        transform: impl Fn(&str) -> String + Send + Sync + 'static,
    ) -> Self {
        self.raw.push(RawMigration {
            name: name.into(),
            transform: Box::new(transform),
        });
        self
    }

    pub fn entity(
        mut self,
        name: impl Into<String>,
        scope: MigrationScope,
        migrate: impl Fn(EntityId, &mut Section) -> bool + Send + Sync + 'static,
    ) -> Self {
        self.entity.push(EntityMigration {
            name: name.into(),
            scope,
            migrate: Box::new(migrate),
        });
        self
    }

    pub fn check_version(&self, stored: u32) -> VersionCheck {
        if stored > self.current_version {
            return VersionCheck::Downgrade;
        }
        if stored == self.current_version {
            return VersionCheck::Current;
        }
        let full_resave = self
            .format_changes
            .range(stored + 1..=self.current_version)
            .next()
            .is_some();
        VersionCheck::Upgrade { full_resave }
    }

    /// Run every raw migration; `None` when the text came out unchanged
    pub fn apply_raw(&self, text: &str) -> Option<String> {
        let mut current: Option<String> = None;
        for migration in &self.raw {
            let input = current.as_deref().unwrap_or(text);
            let output = (migration.transform)(input);
            if output != input {
                tracing::info!(migration = %migration.name, "raw migration changed file content");
                current = Some(output);
            }
        }
        current.filter(|out| out != text)
    }

    /// Run every matching entity migration in order
    ///
    /// Returns the names of migrations that reported a change.
    pub fn migrate_entity(&self, id: EntityId, node: &mut Section) -> Vec<&str> {
        let mut applied = Vec::new();
        for migration in &self.entity {
            if migration.scope.matches(node) && (migration.migrate)(id, node) {
                applied.push(migration.name.as_str());
            }
        }
        applied
    }
}

#[cfg(test)]
#[path = "migration_tests.rs"]
mod tests;
