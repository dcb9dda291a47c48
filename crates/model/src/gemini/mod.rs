//! Google Gemini `generateContent`.

use crate::{DispatchError, HttpProvider, utils::DISABLED_TEXT};
use reqwest::Client;
use serde_json::{Value, json};

pub use request::{HARM_CATEGORIES, Request};

mod request;

/// The generateContent endpoint; `{model}` is substituted per call.
pub const ENDPOINT: &str =
    "https://generativelanguage.googleapis.com/v1beta/models/{model}:generateContent";

/// Transport with the `x-goog-api-key` header.
pub fn transport(client: Client, key: &str, endpoint: &str) -> Result<HttpProvider, DispatchError> {
    HttpProvider::custom_header(client, "x-goog-api-key", key, endpoint)
}

fn candidate(text: &str, finish_reason: &str) -> Value {
    let ratings = HARM_CATEGORIES
        .iter()
        .map(|category| json!({ "category": category, "probability": "NEGLIGIBLE" }))
        .collect::<Vec<_>>();
    json!({
        "candidates": [{
            "content": { "parts": [{ "text": text }], "role": "model" },
            "finishReason": finish_reason,
            "index": 0,
            "safetyRatings": ratings,
        }],
        "usageMetadata": {
            "promptTokenCount": 0,
            "candidatesTokenCount": 0,
            "totalTokenCount": 0,
        },
    })
}

/// Static response for the `disabled` model.
pub fn disabled() -> Value {
    candidate(DISABLED_TEXT, "STOP")
}

/// Normalized failure in candidate shape, with finish reason `ERROR`.
pub fn failure(err: &DispatchError) -> Value {
    candidate(&format!("GoogleAI API Error: {err}"), "ERROR")
}
