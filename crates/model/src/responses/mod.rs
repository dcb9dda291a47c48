//! OpenAI responses API.
//!
//! The conversation is flattened into a single markdown document sent as
//! `input`, with the system instruction carried in `instructions`.

use crate::{
    DispatchError, HttpProvider,
    utils::{DISABLED_TEXT, now_unix},
};
use reqwest::Client;
use serde_json::{Value, json};

pub use request::Request;

mod request;

/// The responses endpoint.
pub const ENDPOINT: &str = "https://api.openai.com/v1/responses";

/// Bearer-authenticated transport.
pub fn transport(client: Client, key: &str, endpoint: &str) -> Result<HttpProvider, DispatchError> {
    HttpProvider::bearer(client, key, endpoint)
}

fn response(id: &str, model: &str, status: &str, text: &str, error: Value) -> Value {
    json!({
        "id": id,
        "object": "response",
        "created_at": now_unix(),
        "status": status,
        "error": error,
        "model": model,
        "output": [{
            "type": "message",
            "id": format!("msg_{id}"),
            "status": "completed",
            "role": "assistant",
            "content": [{ "type": "output_text", "text": text, "annotations": [] }],
        }],
        "usage": { "input_tokens": 0, "output_tokens": 0, "total_tokens": 0 },
    })
}

/// Static response for the `disabled` model.
pub fn disabled() -> Value {
    response("resp_disabled", "disabled", "completed", DISABLED_TEXT, Value::Null)
}

/// Normalized failure in `response` shape, with status `failed`.
pub fn failure(err: &DispatchError) -> Value {
    let text = format!("OpenAI API Error: {err}");
    let error = json!({ "code": "provider_error", "message": text });
    response("error-response", "error", "failed", &text, error)
}
