//! The dispatch client.

use crate::{DispatchError, provider};
use percent_encoding::{AsciiSet, CONTROLS, utf8_percent_encode};
use rcore::{Conversation, ProviderKind};
use reqwest::Client;
use serde_json::Value;
use std::{
    collections::BTreeMap,
    time::{Duration, Instant},
};

/// Default bound on a single outbound call.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(300);

/// Bytes escaped when a model name is placed in a URL path segment.
const PATH_SEGMENT: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'#')
    .add(b'%')
    .add(b'/')
    .add(b'<')
    .add(b'>')
    .add(b'?')
    .add(b'\\')
    .add(b'^')
    .add(b'`')
    .add(b'{')
    .add(b'|')
    .add(b'}');

/// Sends assembled conversations to their provider.
///
/// Cheap to clone; the underlying `reqwest::Client` is shared.
#[derive(Clone, Debug)]
pub struct Dispatcher {
    client: Client,
    endpoints: BTreeMap<ProviderKind, String>,
}

impl Dispatcher {
    /// Create a dispatcher whose calls time out after `timeout`.
    pub fn new(timeout: Duration) -> anyhow::Result<Self> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            endpoints: BTreeMap::new(),
        })
    }

    /// Override the endpoint of one provider.
    ///
    /// A `{model}` placeholder in the URL is replaced per call.
    pub fn with_endpoint(mut self, kind: ProviderKind, endpoint: impl Into<String>) -> Self {
        self.endpoints.insert(kind, endpoint.into());
        self
    }

    /// The URL a call for `model` on `kind` goes to.
    ///
    /// The model is percent-encoded as a single path segment.
    pub fn endpoint(&self, kind: ProviderKind, model: &str) -> String {
        let segment = utf8_percent_encode(model, PATH_SEGMENT).to_string();
        self.endpoints
            .get(&kind)
            .map(String::as_str)
            .unwrap_or_else(|| provider::default_endpoint(kind))
            .replace("{model}", &segment)
    }

    /// Dispatch and return the raw provider body, or the classified failure.
    ///
    /// The disabled model is not special-cased here; see [`Dispatcher::complete`].
    pub async fn send(
        &self,
        kind: ProviderKind,
        conv: &Conversation,
        credential: Option<&str>,
    ) -> Result<Value, DispatchError> {
        let key = credential
            .filter(|k| !k.is_empty())
            .ok_or(DispatchError::CredentialMissing)?;
        let endpoint = self.endpoint(kind, &conv.model);
        let transport = provider::transport(kind, self.client.clone(), key, &endpoint, &conv.model)?;
        let body = provider::translate(kind, conv);

        let started = Instant::now();
        tracing::info!(provider = %kind, model = %conv.model, "dispatching");
        let result = transport.send(&body).await;
        tracing::info!(
            provider = %kind,
            elapsed_ms = started.elapsed().as_millis() as u64,
            ok = result.is_ok(),
            "dispatch finished"
        );
        result
    }

    /// Dispatch and always produce a provider-shaped body.
    ///
    /// The `disabled` model short-circuits without an outbound call, and
    /// failures are wrapped by [`provider::failure`].
    pub async fn complete(
        &self,
        kind: ProviderKind,
        conv: &Conversation,
        credential: Option<&str>,
    ) -> Value {
        if conv.is_disabled() {
            tracing::info!(provider = %kind, "model disabled, skipping dispatch");
            return provider::disabled(kind);
        }

        match self.send(kind, conv, credential).await {
            Ok(body) => body,
            Err(e) => {
                match &e {
                    DispatchError::NoResponse { reason } | DispatchError::Unknown { reason } => {
                        tracing::error!(provider = %kind, %reason, "dispatch failed: {e}")
                    }
                    _ => tracing::warn!(provider = %kind, "dispatch failed: {e}"),
                }
                provider::failure(kind, &e, &conv.model)
            }
        }
    }
}
