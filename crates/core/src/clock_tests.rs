// SPDX-License-Identifier: MIT

use super::*;

#[test]
fn system_clock_returns_nonzero_epoch() {
    let clock = SystemClock;
    assert!(clock.epoch_ms() > 0);
}

#[test]
fn fake_clock_starts_at_given_value() {
    let clock = FakeClock::new(1_000);
    assert_eq!(clock.epoch_ms(), 1_000);
}

#[test]
fn fake_clock_advances() {
    let clock = FakeClock::new(1_000);
    clock.advance_ms(500);
    assert_eq!(clock.epoch_ms(), 1_500);
}

#[test]
fn fake_clock_can_be_set_directly() {
    let clock = FakeClock::new(1_000);
    clock.set_epoch_ms(42);
    assert_eq!(clock.epoch_ms(), 42);
}

#[test]
fn fake_clock_clones_share_state() {
    let clock = FakeClock::new(0);
    let clone = clock.clone();
    clone.advance_ms(10);
    assert_eq!(clock.epoch_ms(), 10);
}
