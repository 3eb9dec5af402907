//! Presentation of CRM rows as cards and detail tables.
//!
//! DESIGN
//! ======
//! Rows are displayed verbatim: each type only names its heading, its list
//! route, and the ordered `(label, value)` pairs worth showing.

#[cfg(test)]
#[path = "record_card_test.rs"]
mod record_card_test;

use leptos::prelude::*;

use crate::net::rest::Record;
use crate::net::types::{Communication, Contact, Deal, PurchaseHistory, Task};
use crate::util::time::display_date;

const EMPTY: &str = "—";

/// Display metadata for a [`Record`].
pub trait RecordView: Record {
    /// Plural heading, e.g. `"Deals"`.
    const LABEL: &'static str;
    /// List route, e.g. `"/deals"`.
    const PATH: &'static str;

    fn heading(&self) -> String;

    /// Ordered `(label, value)` pairs for cards and detail views.
    fn fields(&self) -> Vec<(&'static str, String)>;

    fn href(&self) -> String {
        format!("{}/{}", Self::PATH, self.id())
    }
}

fn text(value: Option<&String>) -> String {
    value
        .map(|v| v.trim())
        .filter(|v| !v.is_empty())
        .map_or_else(|| EMPTY.to_owned(), str::to_owned)
}

/// Two-decimal currency amount.
pub fn money(value: Option<f64>) -> String {
    value.map_or_else(|| EMPTY.to_owned(), |v| format!("${v:.2}"))
}

fn date(value: Option<&String>) -> String {
    display_date(value.map(String::as_str), EMPTY)
}

impl RecordView for Contact {
    const LABEL: &'static str = "Contacts";
    const PATH: &'static str = "/contacts";

    fn heading(&self) -> String {
        self.name.clone()
    }

    fn fields(&self) -> Vec<(&'static str, String)> {
        vec![
            ("Email", self.email.clone()),
            ("Phone", text(self.phone.as_ref())),
            ("Company", text(self.company.as_ref())),
            ("Job title", text(self.job_title.as_ref())),
            ("Notes", text(self.notes.as_ref())),
            ("Created", date(self.created_at.as_ref())),
        ]
    }
}

impl RecordView for Deal {
    const LABEL: &'static str = "Deals";
    const PATH: &'static str = "/deals";

    fn heading(&self) -> String {
        self.title.clone()
    }

    fn fields(&self) -> Vec<(&'static str, String)> {
        vec![
            ("Value", money(self.value)),
            ("Stage", text(self.stage.as_ref())),
            ("Expected close", date(self.expected_close_date.as_ref())),
            ("Notes", text(self.notes.as_ref())),
            ("Created", date(self.created_at.as_ref())),
        ]
    }
}

impl RecordView for Task {
    const LABEL: &'static str = "Tasks";
    const PATH: &'static str = "/tasks";

    fn heading(&self) -> String {
        self.title.clone()
    }

    fn fields(&self) -> Vec<(&'static str, String)> {
        vec![
            ("Status", text(self.status.as_ref())),
            ("Priority", text(self.priority.as_ref())),
            ("Due", date(self.due_date.as_ref())),
            ("Description", text(self.description.as_ref())),
        ]
    }
}

impl RecordView for Communication {
    const LABEL: &'static str = "Communications";
    const PATH: &'static str = "/communications";

    fn heading(&self) -> String {
        self.subject
            .clone()
            .filter(|s| !s.trim().is_empty())
            .unwrap_or_else(|| format!("{} communication", text(self.kind.as_ref())))
    }

    fn fields(&self) -> Vec<(&'static str, String)> {
        vec![
            ("Type", text(self.kind.as_ref())),
            ("Date", date(self.communication_date.as_ref().or(self.created_at.as_ref()))),
            ("Content", text(self.content.as_ref())),
        ]
    }
}

impl RecordView for PurchaseHistory {
    const LABEL: &'static str = "Purchase history";
    const PATH: &'static str = "/purchase-history";

    fn heading(&self) -> String {
        self.product_name.clone()
    }

    fn fields(&self) -> Vec<(&'static str, String)> {
        vec![
            ("Amount", money(self.amount)),
            ("Quantity", self.quantity.map_or_else(|| EMPTY.to_owned(), |q| q.to_string())),
            ("Purchased", date(self.purchase_date.as_ref())),
        ]
    }
}

/// Linked summary card for a list page.
pub fn record_card<R: RecordView>(record: &R) -> impl IntoView + use<R> {
    let href = record.href();
    let heading = record.heading();
    let fields = record
        .fields()
        .into_iter()
        .take(3)
        .map(|(label, value)| {
            view! {
                <div class="record-card__field">
                    <span class="record-card__label">{label}</span>
                    <span class="record-card__value">{value}</span>
                </div>
            }
        })
        .collect::<Vec<_>>();
    view! {
        <a class="record-card" href=href>
            <h3 class="record-card__heading">{heading}</h3>
            {fields}
        </a>
    }
}

/// Full `(label, value)` table for a detail page.
pub fn record_details<R: RecordView>(record: &R) -> impl IntoView + use<R> {
    let rows = record
        .fields()
        .into_iter()
        .map(|(label, value)| {
            view! {
                <div class="record-details__row">
                    <dt>{label}</dt>
                    <dd>{value}</dd>
                </div>
            }
        })
        .collect::<Vec<_>>();
    view! { <dl class="record-details">{rows}</dl> }
}
