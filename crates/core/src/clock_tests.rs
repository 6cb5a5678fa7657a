// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use chrono::TimeZone;

#[test]
fn system_clock_is_monotonic() {
    let clock = SystemClock;
    let t1 = clock.now();
    std::thread::sleep(Duration::from_millis(1));
    assert!(clock.now() > t1);
}

#[test]
fn fake_clock_starts_at_given_wall_time() {
    let start = Utc.with_ymd_and_hms(2026, 3, 1, 12, 0, 0).unwrap();
    let clock = FakeClock::at(start);
    assert_eq!(clock.utc(), start);
}

#[test]
fn fake_clock_advances_both_readings() {
    let clock = FakeClock::new();
    let (t1, w1) = (clock.now(), clock.utc());

    clock.advance(Duration::from_secs(90));

    assert_eq!(clock.now().duration_since(t1), Duration::from_secs(90));
    assert_eq!((clock.utc() - w1).num_seconds(), 90);
}

#[test]
fn fake_clock_clones_share_time() {
    let clock = FakeClock::new();
    let other = clock.clone();
    let t1 = clock.now();

    other.advance(Duration::from_secs(5));

    assert_eq!(clock.now().duration_since(t1), Duration::from_secs(5));
}
