// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use yare::parameterized;

fn id(n: u32) -> EntityId {
    EntityId::new(n).unwrap()
}

#[test]
fn fresh_tracking_is_clean() {
    let tracking = Tracking::new();
    assert!(!tracking.is_dirty(false));
    assert!(!tracking.is_dirty(true));
}

#[test]
fn mark_dirty_supersedes_unsaved_when_idle() {
    let mut tracking = Tracking::new();
    tracking.flush_failed([id(1)]);
    assert!(tracking.unsaved().contains(&id(1)));

    tracking.mark_dirty(id(1), false);

    assert!(tracking.dirty().contains(&id(1)));
    assert!(!tracking.unsaved().contains(&id(1)));
}

#[test]
fn mark_dirty_leaves_unsaved_alone_while_executing() {
    let mut tracking = Tracking::new();
    tracking.flush_failed([id(1)]);

    tracking.mark_dirty(id(1), true);

    assert!(tracking.dirty().contains(&id(1)));
    assert!(tracking.unsaved().contains(&id(1)));
}

#[test]
fn delete_when_idle_moves_to_unsaved_deleted() {
    let mut tracking = Tracking::new();
    tracking.mark_dirty(id(2), false);

    assert_eq!(tracking.delete(id(2), false), Deletion::Applied);

    assert!(!tracking.dirty().contains(&id(2)));
    assert!(tracking.unsaved_deleted().contains(&id(2)));
    assert!(tracking.holds(id(2)));
}

#[test]
fn delete_while_executing_is_deferred() {
    let mut tracking = Tracking::new();

    assert_eq!(tracking.delete(id(2), true), Deletion::Deferred);

    assert!(tracking.pending_delete().contains(&id(2)));
    assert!(tracking.unsaved_deleted().is_empty());
    assert_eq!(tracking.take_pending_deletes().len(), 1);
    assert!(tracking.pending_delete().is_empty());
}

#[test]
fn begin_capture_swaps_dirty_and_clears_request() {
    let mut tracking = Tracking::new();
    tracking.mark_dirty(id(1), false);
    tracking.mark_dirty(id(2), false);
    tracking.request_save();

    let captured = tracking.begin_capture();

    assert_eq!(captured.len(), 2);
    assert!(tracking.dirty().is_empty());
    assert!(!tracking.save_requested());
}

#[test]
fn flush_failed_skips_redirtied_entities() {
    let mut tracking = Tracking::new();
    tracking.mark_dirty(id(1), true);

    tracking.flush_failed([id(1), id(2)]);

    assert!(!tracking.unsaved().contains(&id(1)));
    assert!(tracking.unsaved().contains(&id(2)));
}

#[test]
fn flush_failed_drops_earlier_unsaved_that_changed_again() {
    let mut tracking = Tracking::new();
    tracking.flush_failed([id(1)]);
    tracking.mark_dirty(id(1), true);

    tracking.flush_failed([id(2)]);

    assert!(tracking.dirty().contains(&id(1)));
    assert_eq!(tracking.unsaved().iter().copied().collect::<Vec<_>>(), vec![id(2)]);
}

#[test]
fn redirty_keeps_sets_disjoint() {
    let mut tracking = Tracking::new();
    tracking.flush_failed([id(3)]);

    tracking.redirty([id(3)]);

    assert!(tracking.dirty().contains(&id(3)));
    assert!(!tracking.unsaved().contains(&id(3)));
}

#[test]
fn flushed_clears_unsaved_sets() {
    let mut tracking = Tracking::new();
    tracking.flush_failed([id(1)]);
    tracking.delete(id(2), false);

    tracking.flushed();

    assert!(!tracking.is_dirty(false));
}

#[parameterized(
    requested_idle = { "requested", false, true },
    requested_executing = { "requested", true, true },
    dirty_idle = { "dirty", false, true },
    dirty_executing = { "dirty", true, true },
    unsaved_idle = { "unsaved", false, true },
    unsaved_executing = { "unsaved", true, false },
    deleted_idle = { "deleted", false, true },
    deleted_executing = { "deleted", true, false },
    pending_idle = { "pending", false, false },
    pending_executing = { "pending", true, true },
)]
fn is_dirty_by_source(source: &str, executing: bool, expected: bool) {
    let mut tracking = Tracking::new();
    match source {
        "requested" => tracking.request_save(),
        "dirty" => tracking.mark_dirty(id(1), false),
        "unsaved" => tracking.flush_failed([id(1)]),
        "deleted" => {
            tracking.delete(id(1), false);
        }
        "pending" => {
            tracking.delete(id(1), true);
        }
        _ => panic!("unknown source: {}", source),
    }

    assert_eq!(tracking.is_dirty(executing), expected);
}
