//! Caller-supplied persona used to seed a conversation.

use serde::{Deserialize, Serialize};

/// System prompt plus example exchanges, supplied by the caller at prepare
/// time and discarded together with its session.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Persona {
    /// Becomes a leading system message when present and non-empty.
    #[serde(default)]
    pub system: Option<String>,
    /// Example exchanges, expanded in order after the system message.
    #[serde(default)]
    pub examples: Vec<PersonaExample>,
}

/// One example exchange. Either side may be omitted.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersonaExample {
    #[serde(default)]
    pub user: Option<String>,
    #[serde(default)]
    pub assistant: Option<String>,
}

impl Persona {
    /// Creates a persona with only a system prompt.
    pub fn with_system(system: impl Into<String>) -> Self {
        Self {
            system: Some(system.into()),
            examples: Vec::new(),
        }
    }

    /// Appends an example exchange.
    pub fn with_example(mut self, user: impl Into<String>, assistant: impl Into<String>) -> Self {
        self.examples.push(PersonaExample {
            user: Some(user.into()),
            assistant: Some(assistant.into()),
        });
        self
    }

    /// Returns true if the persona contributes no messages.
    pub fn is_empty(&self) -> bool {
        non_empty(&self.system).is_none()
            && self
                .examples
                .iter()
                .all(|ex| non_empty(&ex.user).is_none() && non_empty(&ex.assistant).is_none())
    }
}

/// Blank strings carry no content and are skipped like absent ones.
pub(super) fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|s| !s.is_empty())
}
