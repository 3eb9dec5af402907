//! View state for fetched CRM rows.
//!
//! DESIGN
//! ======
//! Every page keeps its rows in a [`Loadable`] and only accepts a response
//! through [`Loadable::apply`], which checks the request ticket first. That
//! keeps a slow `/contacts` fetch from landing after the user moved on.

#[cfg(test)]
#[path = "records_test.rs"]
mod records_test;

use crate::net::error::ApiError;
use crate::net::types::{Contact, Task};
use crate::state::generation::RequestTicket;

/// A value being fetched for the current view.
#[derive(Clone, Debug, PartialEq)]
pub struct Loadable<T> {
    pub value: Option<T>,
    pub loading: bool,
    pub error: Option<String>,
}

impl<T> Default for Loadable<T> {
    fn default() -> Self {
        Self { value: None, loading: false, error: None }
    }
}

impl<T> Loadable<T> {
    /// Mark a fetch as in flight. The previous value stays visible.
    pub fn start(&mut self) {
        self.loading = true;
        self.error = None;
    }

    /// Accept `result` if `ticket` is still current. Returns whether it was
    /// applied.
    pub fn apply(&mut self, ticket: &RequestTicket, result: Result<T, ApiError>) -> bool {
        if !ticket.is_current() {
            log::debug!("discarding stale response from generation {}", ticket.generation());
            return false;
        }
        self.loading = false;
        match result {
            Ok(value) => {
                self.value = Some(value);
                self.error = None;
            }
            Err(err) => self.error = Some(err.to_string()),
        }
        true
    }
}

impl<T> Loadable<Vec<T>> {
    #[must_use]
    pub fn items(&self) -> &[T] {
        self.value.as_deref().unwrap_or_default()
    }
}

/// Distinct, sorted company names for the contacts filter.
#[must_use]
pub fn company_options(contacts: &[Contact]) -> Vec<String> {
    let mut companies: Vec<String> = contacts
        .iter()
        .filter_map(|contact| contact.company.as_deref())
        .map(str::trim)
        .filter(|company| !company.is_empty())
        .map(str::to_owned)
        .collect();
    companies.sort_unstable_by_key(|company| company.to_lowercase());
    companies.dedup();
    companies
}

/// Tasks not yet completed, newest first as fetched, capped at `limit`.
#[must_use]
pub fn open_tasks(tasks: &[Task], limit: usize) -> Vec<Task> {
    tasks
        .iter()
        .filter(|task| !task.status.as_deref().is_some_and(|s| s.eq_ignore_ascii_case("completed")))
        .take(limit)
        .cloned()
        .collect()
}
