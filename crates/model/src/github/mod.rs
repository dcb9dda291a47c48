//! GitHub Models inference.
//!
//! Chat-completions wire format with GitHub's content negotiation headers.
//! Sampling is never sent.

use crate::{DispatchError, HttpProvider, openai, request::Request, utils::DISABLED_TEXT};
use rcore::Conversation;
use reqwest::Client;
use serde_json::Value;

/// The GitHub Models chat completions endpoint.
pub const ENDPOINT: &str = "https://models.github.ai/inference/chat/completions";

/// The GitHub REST API version header value.
const API_VERSION: &str = "2022-11-28";

/// Build the request body.
pub fn request(conv: &Conversation) -> Request {
    Request::plain(&conv.model, &conv.system_instruction, &conv.transcript())
}

/// Bearer-authenticated transport with GitHub's accept and version headers.
pub fn transport(client: Client, key: &str, endpoint: &str) -> Result<HttpProvider, DispatchError> {
    HttpProvider::bearer(client, key, endpoint)?
        .header("accept", "application/vnd.github+json")?
        .header("x-github-api-version", API_VERSION)
}

/// Static response for the `disabled` model.
pub fn disabled() -> Value {
    openai::completion("model-disabled", "disabled", DISABLED_TEXT, "stop", "disabled")
}

/// Normalized failure in `chat.completion` shape.
pub fn failure(err: &DispatchError, model: &str) -> Value {
    openai::completion(
        "error",
        model,
        &format!("GitHub Models API Error: {err}"),
        "error",
        "error",
    )
}
