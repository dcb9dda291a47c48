//! Dispatch failure classification.

use serde_json::Value;

/// Why a provider call produced no usable answer.
///
/// The `Display` text is what callers see inside the normalized,
/// provider-shaped error payload.
#[derive(Debug, thiserror::Error)]
pub enum DispatchError {
    /// No credential was staged or configured.
    #[error("credential missing: no API key is configured for this provider")]
    CredentialMissing,
    /// The provider answered with a non-2xx status.
    #[error("API Error ({status}): {message}")]
    Api {
        /// HTTP status code.
        status: u16,
        /// Extracted provider message, or the raw body.
        message: String,
    },
    /// The request never got an answer.
    #[error("No response received from the provider")]
    NoResponse {
        /// Transport detail, for logs only.
        reason: String,
    },
    /// Anything else.
    #[error("An unknown error occurred while processing your request.")]
    Unknown {
        /// Underlying detail, for logs only.
        reason: String,
    },
}

impl DispatchError {
    /// Classify a non-2xx response from its status and body text.
    pub fn from_status(status: u16, body: &str) -> Self {
        let message = extract_message(body).unwrap_or_else(|| {
            let raw = body.trim();
            if raw.is_empty() {
                "empty response body".to_owned()
            } else {
                raw.to_owned()
            }
        });
        Self::Api { status, message }
    }

    /// Wrap any other failure as unknown.
    pub fn unknown(reason: impl ToString) -> Self {
        Self::Unknown {
            reason: reason.to_string(),
        }
    }
}

impl From<reqwest::Error> for DispatchError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_connect() || e.is_timeout() || e.is_request() || e.is_body() {
            Self::NoResponse {
                reason: e.to_string(),
            }
        } else {
            Self::unknown(e)
        }
    }
}

impl From<reqwest::header::InvalidHeaderValue> for DispatchError {
    fn from(e: reqwest::header::InvalidHeaderValue) -> Self {
        Self::unknown(e)
    }
}

/// Pull a human message out of a structured provider error body.
///
/// Recognizes `error.message`, `message`, and a string `error`, either at
/// the top level or in the first element of an array body.
fn extract_message(body: &str) -> Option<String> {
    let value: Value = serde_json::from_str(body).ok()?;
    let value = match value {
        Value::Array(mut items) if !items.is_empty() => items.swap_remove(0),
        other => other,
    };

    value
        .pointer("/error/message")
        .and_then(Value::as_str)
        .or_else(|| value.get("message").and_then(Value::as_str))
        .or_else(|| value.get("error").and_then(Value::as_str))
        .map(str::to_owned)
}
