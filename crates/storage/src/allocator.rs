// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Entity ID allocation
//!
//! The allocator only remembers the highest ID ever used. Whether a given
//! ID is still "in use" (stored, pending deletion, or dirty) is answered
//! by the caller, so the allocator never hands out an ID with any
//! surviving record.

use keep_core::EntityId;

/// Issues unique entity IDs
#[derive(Debug, Clone)]
pub struct IdAllocator {
    max_used: u32,
    limit: EntityId,
}

impl Default for IdAllocator {
    fn default() -> Self {
        Self::new()
    }
}

impl IdAllocator {
    pub fn new() -> Self {
        Self::with_limit(EntityId::MAX)
    }

    /// Allocator whose ID space ends at `limit` instead of `i32::MAX`
    pub fn with_limit(limit: EntityId) -> Self {
        Self { max_used: 0, limit }
    }

    /// Highest ID confirmed so far, if any
    pub fn max_used(&self) -> Option<EntityId> {
        EntityId::new(self.max_used)
    }

    /// Propose an unused ID without committing it
    ///
    /// Tries the ID after the highest one ever used; once that would pass
    /// the end of the ID space, scans from the bottom for a free one.
    /// Returns `None` when every ID is in use.
    pub fn next_id(&self, in_use: impl Fn(EntityId) -> bool) -> Option<EntityId> {
        if let Some(candidate) = EntityId::new(self.max_used.saturating_add(1)) {
            if candidate <= self.limit && !in_use(candidate) {
                return Some(candidate);
            }
        }
        (EntityId::MIN.get()..=self.limit.get())
            .filter_map(EntityId::new)
            .find(|id| !in_use(*id))
    }

    /// Record that an entity with `id` now exists
    pub fn confirm_used(&mut self, id: EntityId) {
        self.max_used = self.max_used.max(id.get());
    }
}

#[cfg(test)]
#[path = "allocator_tests.rs"]
mod tests;
