// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Bookkeeping of what still has to reach disk
//!
//! Four disjoint-in-purpose sets:
//!
//! ```text
//! dirty            changed in memory, not yet captured into the snapshot
//! unsaved          captured into the snapshot, not yet written
//! unsaved_deleted  removed from the snapshot, removal not yet written
//! pending_delete   deleted while a write was running; applied at callback
//! ```
//!
//! All methods take `executing`: whether a save cycle currently owns the
//! snapshot for writing.

use keep_core::EntityId;
use std::collections::BTreeSet;

/// What `delete` did with the entity
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Deletion {
    /// Removed from bookkeeping; the caller must drop its snapshot entry
    Applied,
    /// Deferred until the running cycle's callback
    Deferred,
}

#[derive(Debug, Default)]
pub struct Tracking {
    dirty: BTreeSet<EntityId>,
    unsaved: BTreeSet<EntityId>,
    unsaved_deleted: BTreeSet<EntityId>,
    pending_delete: BTreeSet<EntityId>,
    save_requested: bool,
}

impl Tracking {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn mark_dirty(&mut self, id: EntityId, executing: bool) {
        self.dirty.insert(id);
        if !executing {
            // The newer change supersedes the pending flush
            self.unsaved.remove(&id);
        }
    }

    pub fn delete(&mut self, id: EntityId, executing: bool) -> Deletion {
        if executing {
            self.pending_delete.insert(id);
            return Deletion::Deferred;
        }
        self.dirty.remove(&id);
        self.unsaved.remove(&id);
        self.unsaved_deleted.insert(id);
        Deletion::Applied
    }

    pub fn request_save(&mut self) {
        self.save_requested = true;
    }

    pub fn save_requested(&self) -> bool {
        self.save_requested
    }

    /// Swap out the dirty set for capture, clearing the explicit request
    pub fn begin_capture(&mut self) -> BTreeSet<EntityId> {
        self.save_requested = false;
        std::mem::take(&mut self.dirty)
    }

    /// Everything captured and deleted so far is durable
    pub fn flushed(&mut self) {
        self.unsaved.clear();
        self.unsaved_deleted.clear();
    }

    /// A write failed: captured entities wait for the next flush unless
    /// they were changed again meanwhile
    ///
    /// Entities changed during the write that were already unsaved from an
    /// earlier failure move back to dirty only.
    pub fn flush_failed(&mut self, captured: impl IntoIterator<Item = EntityId>) {
        self.unsaved.extend(captured);
        let dirty = &self.dirty;
        self.unsaved.retain(|id| !dirty.contains(id));
    }

    /// Return entities whose capture failed to the dirty set
    pub fn redirty(&mut self, ids: impl IntoIterator<Item = EntityId>) {
        for id in ids {
            self.unsaved.remove(&id);
            self.dirty.insert(id);
        }
    }

    pub fn take_pending_deletes(&mut self) -> BTreeSet<EntityId> {
        std::mem::take(&mut self.pending_delete)
    }

    pub fn is_dirty(&self, executing: bool) -> bool {
        if self.save_requested || !self.dirty.is_empty() {
            return true;
        }
        if executing {
            !self.pending_delete.is_empty()
        } else {
            !self.unsaved.is_empty() || !self.unsaved_deleted.is_empty()
        }
    }

    /// Whether bookkeeping still holds a record of `id`
    ///
    /// The snapshot itself is checked separately by the caller.
    pub fn holds(&self, id: EntityId) -> bool {
        self.unsaved_deleted.contains(&id)
            || self.pending_delete.contains(&id)
            || self.dirty.contains(&id)
    }

    pub fn is_entity_dirty(&self, id: EntityId) -> bool {
        self.dirty.contains(&id)
    }

    pub fn dirty(&self) -> &BTreeSet<EntityId> {
        &self.dirty
    }

    pub fn unsaved(&self) -> &BTreeSet<EntityId> {
        &self.unsaved
    }

    pub fn unsaved_deleted(&self) -> &BTreeSet<EntityId> {
        &self.unsaved_deleted
    }

    pub fn pending_delete(&self) -> &BTreeSet<EntityId> {
        &self.pending_delete
    }
}

#[cfg(test)]
#[path = "tracking_tests.rs"]
mod tests;
