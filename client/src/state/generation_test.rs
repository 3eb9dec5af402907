use super::*;

#[test]
fn new_ticket_is_current() {
    let generation = RequestGeneration::new();
    let ticket = generation.begin();
    assert!(ticket.is_current());
    assert_eq!(ticket.generation(), generation.current());
}

#[test]
fn newer_request_makes_older_ticket_stale() {
    let generation = RequestGeneration::new();
    let first = generation.begin();
    let second = generation.begin();
    assert!(!first.is_current());
    assert!(second.is_current());
}

#[test]
fn invalidate_makes_every_ticket_stale() {
    let generation = RequestGeneration::new();
    let ticket = generation.begin();
    generation.invalidate();
    assert!(!ticket.is_current());
}

#[test]
fn clones_share_the_counter() {
    let generation = RequestGeneration::new();
    let ticket = generation.begin();
    generation.clone().invalidate();
    assert!(!ticket.is_current());
}
