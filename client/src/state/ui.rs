//! Local UI chrome state (theme, sidebar).
//!
//! Kept apart from the session and record state so layout controls can
//! change without touching data flow.

#[cfg(test)]
#[path = "ui_test.rs"]
mod ui_test;

/// Presentation state provided via context by the app root.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct UiState {
    pub dark_mode: bool,
    /// Narrow layouts hide the sidebar until toggled open.
    pub sidebar_open: bool,
}

impl UiState {
    /// Initial state with the stored theme preference applied.
    #[must_use]
    pub fn with_dark_mode(dark_mode: bool) -> Self {
        Self { dark_mode, ..Self::default() }
    }

    /// Close the mobile sidebar after a navigation link is followed.
    pub fn close_sidebar(&mut self) {
        self.sidebar_open = false;
    }
}
