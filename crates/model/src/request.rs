//! Shared chat-completions request body.
//!
//! Used by OpenAI chat and GitHub Models, which speak the same wire format.
//! Sampling fields use `Option` + `skip_serializing_if` so model families
//! that reject them simply omit them.

use rcore::{Role, Turn};
use serde::Serialize;

/// A role/content pair in chat-completions format.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Message {
    /// `system`, `user` or `assistant`.
    pub role: &'static str,
    /// Message text.
    pub content: String,
}

impl Message {
    /// A system message.
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: "system",
            content: content.into(),
        }
    }
}

impl From<&Turn> for Message {
    fn from(turn: &Turn) -> Self {
        Self {
            role: match turn.role {
                Role::User => "user",
                Role::Assistant => "assistant",
            },
            content: turn.content.clone(),
        }
    }
}

/// Chat-completions request body.
#[derive(Debug, Clone, Serialize)]
pub struct Request {
    /// The model identifier.
    pub model: String,
    /// The messages to send.
    pub messages: Vec<Message>,
    /// Temperature.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f64>,
    /// Top-p sampling.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub top_p: Option<f64>,
}

impl Request {
    /// A request with an optional leading system message and no sampling.
    pub fn plain(model: &str, system: &str, turns: &[Turn]) -> Self {
        let mut messages = Vec::with_capacity(turns.len() + 1);
        if !system.is_empty() {
            messages.push(Message::system(system));
        }
        messages.extend(turns.iter().map(Message::from));
        Self {
            model: model.to_owned(),
            messages,
            temperature: None,
            top_p: None,
        }
    }
}
