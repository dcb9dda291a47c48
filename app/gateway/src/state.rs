//! Shared application state for the gateway server.

use crate::{backend::StoreBackend, config::GatewayConfig, error::ApiError};
use anyhow::Result;
use model::Dispatcher;
use parking_lot::Mutex;
use rcore::ProviderKind;
use std::{
    collections::{BTreeMap, BTreeSet},
    sync::Arc,
    time::Duration,
};

/// Shared state available to all request handlers.
#[derive(Clone)]
pub struct AppState {
    /// Staging and project workspace store.
    pub store: Arc<StoreBackend>,
    /// Outbound provider client.
    pub dispatcher: Dispatcher,
    /// Configured credential per provider.
    pub credentials: Arc<BTreeMap<ProviderKind, String>>,
    /// Delay between a completion signal and assembly.
    pub quiescence: Duration,
    inflight: Arc<Mutex<BTreeSet<ProviderKind>>>,
}

impl AppState {
    /// Create state over a store and dispatcher with no credentials and no
    /// quiescence delay.
    pub fn new(store: StoreBackend, dispatcher: Dispatcher) -> Self {
        Self {
            store: Arc::new(store),
            dispatcher,
            credentials: Arc::default(),
            quiescence: Duration::ZERO,
            inflight: Arc::default(),
        }
    }

    /// Build the state described by a gateway configuration.
    pub fn from_config(config: &GatewayConfig) -> Result<Self> {
        let store = StoreBackend::from_config(config)?;
        let mut dispatcher = Dispatcher::new(config.dispatch.timeout())?;
        for (kind, endpoint) in config.endpoints() {
            tracing::info!(provider = %kind, "endpoint override: {endpoint}");
            dispatcher = dispatcher.with_endpoint(kind, endpoint);
        }
        let credentials = config.credentials();
        for kind in ProviderKind::ALL {
            if !credentials.contains_key(&kind) {
                tracing::debug!(provider = %kind, "no configured credential");
            }
        }
        Ok(Self::new(store, dispatcher)
            .with_credentials(credentials)
            .with_quiescence(config.dispatch.quiescence()))
    }

    /// Replace the configured credentials.
    pub fn with_credentials(mut self, credentials: BTreeMap<ProviderKind, String>) -> Self {
        self.credentials = Arc::new(credentials);
        self
    }

    /// Replace the quiescence delay.
    pub fn with_quiescence(mut self, quiescence: Duration) -> Self {
        self.quiescence = quiescence;
        self
    }

    /// The credential for a call: a staged key wins over the configured one.
    pub fn credential(&self, kind: ProviderKind, staged: Option<String>) -> Option<String> {
        staged
            .filter(|k| !k.is_empty())
            .or_else(|| self.credentials.get(&kind).cloned())
    }

    /// Claim the completion slot of a provider session.
    pub fn begin(&self, kind: ProviderKind) -> Result<InFlight, ApiError> {
        if !self.inflight.lock().insert(kind) {
            return Err(ApiError::Busy(kind));
        }
        Ok(InFlight {
            kind,
            set: self.inflight.clone(),
        })
    }
}

/// Held while a completion runs; releases the slot on drop.
#[derive(Debug)]
pub struct InFlight {
    kind: ProviderKind,
    set: Arc<Mutex<BTreeSet<ProviderKind>>>,
}

impl Drop for InFlight {
    fn drop(&mut self) {
        self.set.lock().remove(&self.kind);
    }
}
