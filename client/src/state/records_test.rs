use super::*;
use crate::state::generation::RequestGeneration;

fn contact(id: &str, company: Option<&str>) -> Contact {
    Contact {
        id: id.to_owned(),
        name: format!("Contact {id}"),
        email: format!("{id}@example.com"),
        phone: None,
        company: company.map(str::to_owned),
        job_title: None,
        notes: None,
        created_at: None,
    }
}

fn task(id: &str, status: Option<&str>) -> Task {
    Task {
        id: id.to_owned(),
        title: format!("Task {id}"),
        description: None,
        status: status.map(str::to_owned),
        priority: None,
        due_date: None,
        contact_id: None,
        created_at: None,
    }
}

// =============================================================
// Loadable
// =============================================================

#[test]
fn apply_current_ticket_sets_value() {
    let generation = RequestGeneration::new();
    let mut state = Loadable::<Vec<String>>::default();
    state.start();
    let ticket = generation.begin();
    assert!(state.apply(&ticket, Ok(vec!["a".to_owned()])));
    assert!(!state.loading);
    assert_eq!(state.items(), ["a".to_owned()]);
}

#[test]
fn apply_error_keeps_previous_rows() {
    let generation = RequestGeneration::new();
    let mut state = Loadable::default();
    state.apply(&generation.begin(), Ok(vec![1, 2]));
    state.start();
    state.apply(&generation.begin(), Err(ApiError::Network("offline".to_owned())));
    assert_eq!(state.items(), [1, 2]);
    assert_eq!(
        state.error.as_deref(),
        Some("Network error. Please check your connection and try again.")
    );
}

#[test]
fn late_contacts_response_does_not_replace_deals_view() {
    let generation = RequestGeneration::new();
    let mut view = Loadable::<Vec<&str>>::default();

    // Contacts fetch issued, then the user navigates to /deals.
    view.start();
    let contacts_ticket = generation.begin();
    generation.invalidate();
    view.start();
    let deals_ticket = generation.begin();

    assert!(view.apply(&deals_ticket, Ok(vec!["deal-1"])));
    assert!(!view.apply(&contacts_ticket, Ok(vec!["contact-1"])));
    assert_eq!(view.items(), ["deal-1"]);
    assert!(!view.loading);
}

#[test]
fn stale_response_leaves_loading_flag_alone() {
    let generation = RequestGeneration::new();
    let mut view = Loadable::<Vec<u8>>::default();
    let stale = generation.begin();
    view.start();
    let _fresh = generation.begin();
    assert!(!view.apply(&stale, Ok(vec![1])));
    assert!(view.loading);
    assert!(view.items().is_empty());
}

// =============================================================
// Derived views
// =============================================================

#[test]
fn company_options_are_distinct_sorted_and_skip_blanks() {
    let contacts = vec![
        contact("1", Some("Zeta")),
        contact("2", Some("acme")),
        contact("3", None),
        contact("4", Some("  ")),
        contact("5", Some("Zeta ")),
        contact("6", Some("Beta")),
    ];
    assert_eq!(company_options(&contacts), vec!["acme", "Beta", "Zeta"]);
}

#[test]
fn open_tasks_skip_completed_and_respect_limit() {
    let tasks = vec![
        task("1", Some("Completed")),
        task("2", Some("pending")),
        task("3", None),
        task("4", Some("in_progress")),
    ];
    let open: Vec<String> = open_tasks(&tasks, 2).into_iter().map(|t| t.id).collect();
    assert_eq!(open, vec!["2", "3"]);
}
