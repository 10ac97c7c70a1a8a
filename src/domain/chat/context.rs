//! Context builder - assembles the message sequence sent upstream.

use super::persona::non_empty;
use super::{Message, Persona};

/// Builds the effective request for a prepared session.
///
/// Order: persona system prompt (if any), then each persona example as a
/// user/assistant pair in order, then the client history in order. A persona
/// with no usable fields contributes nothing; no placeholder is injected.
pub fn build_context(persona: Option<&Persona>, history: &[Message]) -> Vec<Message> {
    let mut messages = Vec::with_capacity(history.len() + persona_len(persona));

    if let Some(persona) = persona {
        if let Some(system) = non_empty(&persona.system) {
            messages.push(Message::system(system));
        }
        for example in &persona.examples {
            if let Some(user) = non_empty(&example.user) {
                messages.push(Message::user(user));
            }
            if let Some(assistant) = non_empty(&example.assistant) {
                messages.push(Message::assistant(assistant));
            }
        }
    }

    messages.extend_from_slice(history);
    messages
}

/// Builds the effective request for the single-step endpoint, which always
/// leads with the server's fixed system prompt.
pub fn build_legacy_context(system_prompt: &str, history: &[Message]) -> Vec<Message> {
    let mut messages = Vec::with_capacity(history.len() + 1);
    messages.push(Message::system(system_prompt));
    messages.extend_from_slice(history);
    messages
}

fn persona_len(persona: Option<&Persona>) -> usize {
    persona.map_or(0, |p| 1 + p.examples.len() * 2)
}
