#![cfg(not(feature = "hydrate"))]

use super::*;

#[test]
fn read_preference_defaults_to_light_outside_browser() {
    assert!(!read_preference());
}

#[test]
fn toggle_returns_the_opposite_value() {
    assert!(toggle(false));
    assert!(!toggle(true));
}
