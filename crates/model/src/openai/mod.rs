//! OpenAI chat completions.
//!
//! Three model families shape the body differently: reasoning models
//! (`o1`, `o3`, `o4`) take no system message and no sampling, the `gpt-5`
//! family keeps the system message but rejects sampling, and every other
//! model gets both with defaults filled in.

use crate::{
    DispatchError, HttpProvider,
    request::Request,
    utils::{DISABLED_TEXT, now_unix},
};
use rcore::Conversation;
use reqwest::Client;
use serde_json::{Value, json};

/// The chat completions endpoint.
pub const ENDPOINT: &str = "https://api.openai.com/v1/chat/completions";

/// Temperature sent when none was staged.
pub const DEFAULT_TEMPERATURE: f64 = 0.2;

/// Top-p sent when none was staged.
pub const DEFAULT_TOP_P: f64 = 0.1;

const REASONING_PREFIXES: [&str; 3] = ["o1", "o3", "o4"];

/// How a model treats system messages and sampling.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Family {
    /// System message plus sampling.
    Standard,
    /// No system message; instruction folded into the last message.
    Reasoning,
    /// System message, fixed server-side sampling.
    FixedSampling,
}

impl Family {
    /// Detect the family from a model identifier.
    pub fn detect(model: &str) -> Self {
        if REASONING_PREFIXES.iter().any(|p| model.starts_with(p)) {
            Self::Reasoning
        } else if model == "gpt-5" || model.starts_with("gpt-5-") {
            Self::FixedSampling
        } else {
            Self::Standard
        }
    }
}

/// Build the chat completions body.
pub fn request(conv: &Conversation) -> Request {
    let turns = conv.transcript();
    match Family::detect(&conv.model) {
        Family::Standard => Request {
            temperature: Some(conv.temperature.unwrap_or(DEFAULT_TEMPERATURE)),
            top_p: Some(conv.top_p.unwrap_or(DEFAULT_TOP_P)),
            ..Request::plain(&conv.model, &conv.system_instruction, &turns)
        },
        Family::FixedSampling => Request::plain(&conv.model, &conv.system_instruction, &turns),
        Family::Reasoning => {
            let mut req = Request::plain(&conv.model, "", &turns);
            if !conv.system_instruction.is_empty()
                && let Some(last) = req.messages.last_mut()
            {
                last.content = format!("{}\n{}", conv.system_instruction, last.content);
            }
            req
        }
    }
}

/// Bearer-authenticated transport.
pub fn transport(client: Client, key: &str, endpoint: &str) -> Result<HttpProvider, DispatchError> {
    HttpProvider::bearer(client, key, endpoint)
}

/// A `chat.completion` object carrying `content` as the answer.
pub(crate) fn completion(
    id: &str,
    model: &str,
    content: &str,
    finish_reason: &str,
    fingerprint: &str,
) -> Value {
    json!({
        "id": id,
        "object": "chat.completion",
        "created": now_unix(),
        "model": model,
        "choices": [{
            "index": 0,
            "message": { "role": "assistant", "content": content },
            "logprobs": null,
            "finish_reason": finish_reason,
        }],
        "usage": {
            "prompt_tokens": 0,
            "completion_tokens": 0,
            "total_tokens": 0,
        },
        "system_fingerprint": fingerprint,
    })
}

/// Static response for the `disabled` model.
pub fn disabled() -> Value {
    completion("model-disabled", "disabled", DISABLED_TEXT, "stop", "disabled")
}

/// Normalized failure in `chat.completion` shape.
pub fn failure(err: &DispatchError) -> Value {
    completion(
        "error-response",
        "error",
        &format!("OpenAI API Error: {err}"),
        "error",
        "error",
    )
}
