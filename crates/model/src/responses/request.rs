//! Request body for the responses API.

use rcore::{Conversation, Role, Source};
use serde::Serialize;

/// Output budget sent with every request.
pub const MAX_OUTPUT_TOKENS: usize = 1024 * 96;

/// The request body for the responses API.
#[derive(Debug, Clone, Serialize)]
pub struct Request {
    /// The model identifier.
    pub model: String,
    /// System instruction text.
    pub instructions: String,
    /// The flattened markdown document.
    pub input: String,
    /// Maximum tokens to generate.
    pub max_output_tokens: usize,
}

impl From<&Conversation> for Request {
    fn from(conv: &Conversation) -> Self {
        Self {
            model: conv.model.clone(),
            instructions: conv.system_instruction.clone(),
            input: document(conv),
            max_output_tokens: MAX_OUTPUT_TOKENS,
        }
    }
}

/// Render the conversation as one markdown document.
///
/// Project sources list their files first; earlier turns follow under
/// `# Conversation`; the latest user turn always comes last.
fn document(conv: &Conversation) -> String {
    let mut parts = Vec::new();

    if conv.source == Source::Project {
        parts.push("# Project Files".to_owned());
        if conv.documents.is_empty() {
            parts.push("_No files provided._".to_owned());
        }
        for doc in &conv.documents {
            parts.push(format!(
                "## File: {}\n\n```\n{}\n```",
                doc.path, doc.content
            ));
        }
    }

    let mut turns = conv.exchange();
    let prompt = turns.pop().map(|t| t.content).unwrap_or_default();
    if !turns.is_empty() {
        parts.push("# Conversation".to_owned());
        for turn in turns {
            let speaker = match turn.role {
                Role::User => "User",
                Role::Assistant => "Assistant",
            };
            parts.push(format!("## {speaker}\n\n{}", turn.content));
        }
    }

    parts.push(prompt);
    parts.join("\n\n")
}
