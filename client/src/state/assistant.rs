//! Conversation state for the AI assistant page.

#[cfg(test)]
#[path = "assistant_test.rs"]
mod assistant_test;

use crate::net::api::AssistantTurn;

/// Turns sent upstream as context with each new message.
pub const HISTORY_TURNS: usize = 10;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AssistantRole {
    User,
    Assistant,
    /// Local failure notice; never sent upstream.
    Error,
}

impl AssistantRole {
    fn wire_name(self) -> Option<&'static str> {
        match self {
            Self::User => Some("user"),
            Self::Assistant => Some("assistant"),
            Self::Error => None,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AssistantMessage {
    pub id: String,
    pub role: AssistantRole,
    pub content: String,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct AssistantState {
    pub messages: Vec<AssistantMessage>,
    pub loading: bool,
}

impl AssistantState {
    fn push(&mut self, role: AssistantRole, content: String) {
        self.messages.push(AssistantMessage { id: uuid::Uuid::new_v4().to_string(), role, content });
    }

    /// Record the user's prompt and return the context to send with it.
    /// Returns `None` when a reply is still pending or the prompt is blank.
    pub fn begin_prompt(&mut self, prompt: &str) -> Option<(String, Vec<AssistantTurn>)> {
        let prompt = prompt.trim();
        if prompt.is_empty() || self.loading {
            return None;
        }
        let history = self.history();
        self.push(AssistantRole::User, prompt.to_owned());
        self.loading = true;
        Some((prompt.to_owned(), history))
    }

    pub fn finish(&mut self, reply: Result<String, String>) {
        self.loading = false;
        match reply {
            Ok(text) => self.push(AssistantRole::Assistant, text),
            Err(message) => self.push(AssistantRole::Error, message),
        }
    }

    /// Last [`HISTORY_TURNS`] user/assistant turns, oldest first.
    #[must_use]
    pub fn history(&self) -> Vec<AssistantTurn> {
        let turns: Vec<AssistantTurn> = self
            .messages
            .iter()
            .filter_map(|message| {
                message.role.wire_name().map(|role| AssistantTurn {
                    role: role.to_owned(),
                    content: message.content.clone(),
                })
            })
            .collect();
        let skip = turns.len().saturating_sub(HISTORY_TURNS);
        turns.into_iter().skip(skip).collect()
    }
}
