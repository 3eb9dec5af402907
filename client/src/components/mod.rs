//! Reusable UI component modules.
//!
//! SYSTEM CONTEXT
//! ==============
//! Components render page chrome, forms, and record views while reading
//! shared state from Leptos context providers.

pub mod confirm_dialog;
pub mod contact_form;
pub mod form_field;
pub mod layout;
pub mod record_card;
pub mod route_guard;
