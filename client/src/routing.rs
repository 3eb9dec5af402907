//! Route table and the guard decision.
//!
//! SYSTEM CONTEXT
//! ==============
//! The router mounts a single guarded outlet; every navigation resolves the
//! path against [`RouteTable`] and asks [`decide`] whether to render, wait,
//! or redirect. The decision is a pure function of the path and the current
//! [`SessionState`], so the whole policy is testable without a browser.
//!
//! POLICY
//! ======
//! - `Unknown` session: always `Loading`, never a render or a redirect.
//! - Protected: render when signed in, otherwise go to `/login`.
//! - Public-only: render when signed out, otherwise go to `/dashboard`.
//! - Unconditional: render once the session is resolved.
//! - `/` and unmatched paths: `/dashboard` when signed in, `/login` otherwise.

#[cfg(test)]
#[path = "routing_test.rs"]
mod routing_test;

use crate::state::session::SessionState;

pub const LOGIN_PATH: &str = "/login";
pub const DASHBOARD_PATH: &str = "/dashboard";

/// Who may see a route.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Visibility {
    /// Only while signed out (login, sign-up, password flows).
    PublicOnly,
    /// Only while signed in.
    Protected,
    /// Regardless of session, once it is known.
    Unconditional,
}

/// Screens the router can render.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Page {
    Login,
    SignUp,
    ForgotPassword,
    ResetPassword,
    Dashboard,
    Home,
    Activity,
    Contacts,
    ContactDetail,
    Deals,
    DealDetail,
    Tasks,
    TaskDetail,
    Communications,
    CommunicationDetail,
    PurchaseHistory,
    PurchaseDetail,
    Profile,
    Settings,
    AiAssistant,
}

impl Page {
    /// Heading shown in the page chrome.
    #[must_use]
    pub fn title(self) -> &'static str {
        match self {
            Self::Login => "Sign in",
            Self::SignUp => "Create account",
            Self::ForgotPassword => "Forgot password",
            Self::ResetPassword => "Reset password",
            Self::Dashboard => "Dashboard",
            Self::Home => "Home",
            Self::Activity => "Activity",
            Self::Contacts => "Contacts",
            Self::ContactDetail => "Contact",
            Self::Deals => "Deals",
            Self::DealDetail => "Deal",
            Self::Tasks => "Tasks",
            Self::TaskDetail => "Task",
            Self::Communications => "Communications",
            Self::CommunicationDetail => "Communication",
            Self::PurchaseHistory => "Purchase history",
            Self::PurchaseDetail => "Purchase",
            Self::Profile => "Profile",
            Self::Settings => "Settings",
            Self::AiAssistant => "AI assistant",
        }
    }
}

/// One row of the route table.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RouteEntry {
    /// Path pattern; `:name` segments match any single segment.
    pub pattern: &'static str,
    pub visibility: Visibility,
    pub page: Page,
}

const fn entry(pattern: &'static str, visibility: Visibility, page: Page) -> RouteEntry {
    RouteEntry { pattern, visibility, page }
}

/// The application's routes.
pub const CRM_ROUTES: &[RouteEntry] = &[
    entry("/login", Visibility::PublicOnly, Page::Login),
    entry("/signup", Visibility::PublicOnly, Page::SignUp),
    entry("/forgot-password", Visibility::PublicOnly, Page::ForgotPassword),
    entry("/reset-password", Visibility::PublicOnly, Page::ResetPassword),
    entry("/dashboard", Visibility::Protected, Page::Dashboard),
    entry("/home", Visibility::Protected, Page::Home),
    entry("/activity", Visibility::Protected, Page::Activity),
    entry("/contacts", Visibility::Protected, Page::Contacts),
    entry("/contacts/:id", Visibility::Protected, Page::ContactDetail),
    entry("/deals", Visibility::Protected, Page::Deals),
    entry("/deals/:id", Visibility::Protected, Page::DealDetail),
    entry("/tasks", Visibility::Protected, Page::Tasks),
    entry("/tasks/:id", Visibility::Protected, Page::TaskDetail),
    entry("/communications", Visibility::Protected, Page::Communications),
    entry("/communications/:id", Visibility::Protected, Page::CommunicationDetail),
    entry("/purchase-history", Visibility::Protected, Page::PurchaseHistory),
    entry("/purchase-history/:id", Visibility::Protected, Page::PurchaseDetail),
    entry("/profile", Visibility::Protected, Page::Profile),
    entry("/settings", Visibility::Protected, Page::Settings),
    entry("/ai-assistant", Visibility::Protected, Page::AiAssistant),
];

/// A resolved path: the matching entry plus its `:id` segment, if any.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RouteMatch {
    pub page: Page,
    pub visibility: Visibility,
    pub id: Option<String>,
}

/// Immutable lookup over a list of [`RouteEntry`]s.
#[derive(Clone, Copy, Debug)]
pub struct RouteTable {
    entries: &'static [RouteEntry],
}

impl RouteTable {
    #[must_use]
    pub const fn new(entries: &'static [RouteEntry]) -> Self {
        Self { entries }
    }

    #[must_use]
    pub const fn crm() -> Self {
        Self::new(CRM_ROUTES)
    }

    #[must_use]
    pub fn entries(&self) -> &'static [RouteEntry] {
        self.entries
    }

    /// Match `path` (query, fragment, and trailing slash ignored).
    #[must_use]
    pub fn resolve(&self, path: &str) -> Option<RouteMatch> {
        let path = normalize(path);
        self.entries.iter().find_map(|entry| {
            match_pattern(entry.pattern, path).map(|id| RouteMatch {
                page: entry.page,
                visibility: entry.visibility,
                id,
            })
        })
    }
}

impl Default for RouteTable {
    fn default() -> Self {
        Self::crm()
    }
}

fn normalize(path: &str) -> &str {
    let end = path.find(['?', '#']).unwrap_or(path.len());
    let path = &path[..end];
    let trimmed = path.trim_end_matches('/');
    if trimmed.is_empty() { "/" } else { trimmed }
}

/// `Some(id)` on match, where `id` is the value of the `:param` segment.
fn match_pattern(pattern: &str, path: &str) -> Option<Option<String>> {
    let mut pattern_segments = pattern.split('/');
    let mut path_segments = path.split('/');
    let mut param = None;
    loop {
        match (pattern_segments.next(), path_segments.next()) {
            (None, None) => return Some(param),
            (Some(expected), Some(actual)) => {
                if expected.starts_with(':') {
                    if actual.is_empty() {
                        return None;
                    }
                    param = Some(actual.to_owned());
                } else if expected != actual {
                    return None;
                }
            }
            _ => return None,
        }
    }
}

/// What the guarded outlet should do for the current navigation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum GuardDecision {
    /// Session not restored yet; show a placeholder.
    Loading,
    Render(RouteMatch),
    RedirectToLogin,
    RedirectToDashboard,
}

impl GuardDecision {
    #[must_use]
    pub fn redirect_target(&self) -> Option<&'static str> {
        match self {
            Self::RedirectToLogin => Some(LOGIN_PATH),
            Self::RedirectToDashboard => Some(DASHBOARD_PATH),
            Self::Loading | Self::Render(_) => None,
        }
    }
}

/// Decide what to do with a navigation to `path` under `session`.
#[must_use]
pub fn decide(table: &RouteTable, path: &str, session: &SessionState) -> GuardDecision {
    if !session.is_resolved() {
        return GuardDecision::Loading;
    }
    let signed_in = session.is_authenticated();
    let Some(route) = table.resolve(path) else {
        return if signed_in { GuardDecision::RedirectToDashboard } else { GuardDecision::RedirectToLogin };
    };
    match (route.visibility, signed_in) {
        (Visibility::Protected, false) => GuardDecision::RedirectToLogin,
        (Visibility::PublicOnly, true) => GuardDecision::RedirectToDashboard,
        (Visibility::Protected, true) | (Visibility::PublicOnly, false) | (Visibility::Unconditional, _) => {
            GuardDecision::Render(route)
        }
    }
}
