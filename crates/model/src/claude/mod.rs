//! Claude (Anthropic) messages API.
//!
//! The system prompt is top-level rather than a message, and the request
//! carries a fixed output budget instead of sampling parameters.

use crate::{DispatchError, HttpProvider, utils::DISABLED_TEXT};
use reqwest::Client;
use serde_json::{Value, json};

pub use request::Request;

mod request;

/// The Anthropic Messages API endpoint.
pub const ENDPOINT: &str = "https://api.anthropic.com/v1/messages";

/// The Anthropic API version header value.
const API_VERSION: &str = "2023-06-01";

/// Beta flag enabling the 1M-token context window.
const CONTEXT_1M_BETA: &str = "context-1m-2025-08-07";

/// Models that get the extended context window.
const CONTEXT_1M_PREFIX: &str = "claude-sonnet-4";

/// Transport with `x-api-key` and `anthropic-version`, plus the beta header
/// for models that support the extended context window.
pub fn transport(
    client: Client,
    key: &str,
    endpoint: &str,
    model: &str,
) -> Result<HttpProvider, DispatchError> {
    let provider = HttpProvider::custom_header(client, "x-api-key", key, endpoint)?
        .header("anthropic-version", API_VERSION)?;
    if model.starts_with(CONTEXT_1M_PREFIX) {
        provider.header("anthropic-beta", CONTEXT_1M_BETA)
    } else {
        Ok(provider)
    }
}

fn message(id: &str, model: &str, text: &str, stop_reason: &str) -> Value {
    json!({
        "id": id,
        "type": "message",
        "role": "assistant",
        "content": [{ "type": "text", "text": text }],
        "model": model,
        "stop_reason": stop_reason,
        "usage": { "input_tokens": 0, "output_tokens": 0 },
    })
}

/// Static response for the `disabled` model.
pub fn disabled() -> Value {
    message("msg_disabled", "disabled", DISABLED_TEXT, "end_turn")
}

/// Normalized failure in `message` shape.
pub fn failure(err: &DispatchError) -> Value {
    message(
        "error-response",
        "error",
        &format!("Anthropic API Error: {err}"),
        "error",
    )
}
