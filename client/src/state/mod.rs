//! Client-side state modules.
//!
//! SYSTEM CONTEXT
//! ==============
//! The session store is the only cross-page state with its own lifecycle.
//! Record and UI state are plain values that pages wrap in signals.

pub mod assistant;
pub mod generation;
pub mod records;
pub mod session;
pub mod ui;
