//! Enum dispatch over the provider modules.
//!
//! Each function matches on [`ProviderKind`] and delegates to the module
//! that knows that provider's wire format.

use crate::{DispatchError, HttpProvider, claude, gemini, github, openai, request, responses};
use rcore::{Conversation, ProviderKind};
use reqwest::Client;
use serde::Serialize;
use serde_json::Value;

/// A provider-shaped request body.
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum Body {
    /// Anthropic messages.
    Claude(claude::Request),
    /// Chat completions (OpenAI chat and GitHub Models).
    Chat(request::Request),
    /// OpenAI responses.
    Responses(responses::Request),
    /// Gemini generateContent.
    Gemini(gemini::Request),
}

/// Translate a conversation into the provider's request body.
pub fn translate(kind: ProviderKind, conv: &Conversation) -> Body {
    match kind {
        ProviderKind::Anthropic => Body::Claude(claude::Request::from(conv)),
        ProviderKind::OpenAiChat => Body::Chat(openai::request(conv)),
        ProviderKind::OpenAiResponses => Body::Responses(responses::Request::from(conv)),
        ProviderKind::Gemini => Body::Gemini(gemini::Request::from(conv)),
        ProviderKind::GitHub => Body::Chat(github::request(conv)),
    }
}

/// The built-in endpoint of a provider.
pub fn default_endpoint(kind: ProviderKind) -> &'static str {
    match kind {
        ProviderKind::Anthropic => claude::ENDPOINT,
        ProviderKind::OpenAiChat => openai::ENDPOINT,
        ProviderKind::OpenAiResponses => responses::ENDPOINT,
        ProviderKind::Gemini => gemini::ENDPOINT,
        ProviderKind::GitHub => github::ENDPOINT,
    }
}

/// Build the authenticated transport for one call.
pub fn transport(
    kind: ProviderKind,
    client: Client,
    key: &str,
    endpoint: &str,
    model: &str,
) -> Result<HttpProvider, DispatchError> {
    match kind {
        ProviderKind::Anthropic => claude::transport(client, key, endpoint, model),
        ProviderKind::OpenAiChat => openai::transport(client, key, endpoint),
        ProviderKind::OpenAiResponses => responses::transport(client, key, endpoint),
        ProviderKind::Gemini => gemini::transport(client, key, endpoint),
        ProviderKind::GitHub => github::transport(client, key, endpoint),
    }
}

/// The static disabled-model response of a provider.
pub fn disabled(kind: ProviderKind) -> Value {
    match kind {
        ProviderKind::Anthropic => claude::disabled(),
        ProviderKind::OpenAiChat => openai::disabled(),
        ProviderKind::OpenAiResponses => responses::disabled(),
        ProviderKind::Gemini => gemini::disabled(),
        ProviderKind::GitHub => github::disabled(),
    }
}

/// Wrap a dispatch failure in the provider's success shape.
pub fn failure(kind: ProviderKind, err: &DispatchError, model: &str) -> Value {
    match kind {
        ProviderKind::Anthropic => claude::failure(err),
        ProviderKind::OpenAiChat => openai::failure(err),
        ProviderKind::OpenAiResponses => responses::failure(err),
        ProviderKind::Gemini => gemini::failure(err),
        ProviderKind::GitHub => github::failure(err, model),
    }
}
