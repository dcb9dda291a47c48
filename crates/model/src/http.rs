//! Shared HTTP transport for every provider.
//!
//! `HttpProvider` wraps a `reqwest::Client` with pre-configured headers and
//! endpoint URL. Providers differ only in how they authenticate, which is
//! expressed through the constructors and [`HttpProvider::header`].

use crate::DispatchError;
use reqwest::{
    Client, Method,
    header::{self, HeaderMap, HeaderName, HeaderValue},
};
use serde::Serialize;
use serde_json::Value;

/// Pre-built outbound call: client, headers, and target URL.
#[derive(Clone, Debug)]
pub struct HttpProvider {
    client: Client,
    headers: HeaderMap,
    endpoint: String,
}

impl HttpProvider {
    /// Create a provider with Bearer token authentication.
    pub fn bearer(client: Client, key: &str, endpoint: &str) -> Result<Self, DispatchError> {
        let mut headers = json_headers();
        headers.insert(header::AUTHORIZATION, format!("Bearer {key}").parse()?);
        Ok(Self {
            client,
            headers,
            endpoint: endpoint.to_owned(),
        })
    }

    /// Create a provider with a custom header for authentication.
    ///
    /// Used by providers that don't use Bearer tokens (Anthropic uses
    /// `x-api-key`, Gemini uses `x-goog-api-key`).
    pub fn custom_header(
        client: Client,
        header_name: &'static str,
        header_value: &str,
        endpoint: &str,
    ) -> Result<Self, DispatchError> {
        let mut headers = json_headers();
        headers.insert(
            HeaderName::from_static(header_name),
            header_value.parse::<HeaderValue>()?,
        );
        Ok(Self {
            client,
            headers,
            endpoint: endpoint.to_owned(),
        })
    }

    /// Add or replace a header. Names must be lowercase.
    pub fn header(mut self, name: &'static str, value: &str) -> Result<Self, DispatchError> {
        self.headers
            .insert(HeaderName::from_static(name), value.parse::<HeaderValue>()?);
        Ok(self)
    }

    /// Send a request and return the provider's JSON body.
    ///
    /// Non-2xx answers are classified into [`DispatchError::Api`].
    pub async fn send(&self, body: &impl Serialize) -> Result<Value, DispatchError> {
        if tracing::enabled!(tracing::Level::TRACE) {
            let body = serde_json::to_string(body).map_err(DispatchError::unknown)?;
            tracing::trace!(endpoint = %self.endpoint, "request: {body}");
        }
        let response = self
            .client
            .request(Method::POST, &self.endpoint)
            .headers(self.headers.clone())
            .json(body)
            .send()
            .await?;

        let status = response.status();
        let text = response.text().await?;
        tracing::trace!(%status, "response: {text}");
        if !status.is_success() {
            return Err(DispatchError::from_status(status.as_u16(), &text));
        }

        serde_json::from_str(&text).map_err(DispatchError::unknown)
    }
}

fn json_headers() -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert(
        header::CONTENT_TYPE,
        HeaderValue::from_static("application/json"),
    );
    headers.insert(header::ACCEPT, HeaderValue::from_static("application/json"));
    headers
}
