//! Request body for the Anthropic Messages API.

use crate::request::Message;
use rcore::Conversation;
use serde::Serialize;

/// Output budget sent with every request.
pub const MAX_TOKENS: usize = 32000;

/// The request body for the Anthropic Messages API.
#[derive(Debug, Clone, Serialize)]
pub struct Request {
    /// The model identifier.
    pub model: String,
    /// Maximum tokens to generate.
    pub max_tokens: usize,
    /// System prompt (top-level, not in messages array).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub system: Option<String>,
    /// The messages array.
    pub messages: Vec<Message>,
}

impl From<&Conversation> for Request {
    fn from(conv: &Conversation) -> Self {
        Self {
            model: conv.model.clone(),
            max_tokens: MAX_TOKENS,
            system: Some(conv.system_instruction.clone()).filter(|s| !s.is_empty()),
            messages: conv.transcript().iter().map(Message::from).collect(),
        }
    }
}
