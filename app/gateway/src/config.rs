//! Gateway configuration loaded from TOML.

use anyhow::{Context, Result};
use rcore::ProviderKind;
use serde::{Deserialize, Serialize};
use std::{
    collections::BTreeMap,
    path::{Path, PathBuf},
    time::Duration,
};

/// Config directory name under platform config dir.
pub const CONFIG_DIR: &str = "relay";
/// Config file name inside the config directory.
pub const CONFIG_FILE: &str = "gateway.toml";
/// Data subdirectory.
pub const DATA_DIR: &str = "data";
/// SQLite database filename.
pub const STORE_DB: &str = "relay.db";

/// Resolve the global configuration directory (`~/.config/relay/` on unix).
pub fn global_config_dir() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join(CONFIG_DIR))
}

/// Top-level gateway configuration.
#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct GatewayConfig {
    /// Server bind configuration.
    pub server: ServerConfig,
    /// Staging store configuration.
    pub store: StoreConfig,
    /// Completion and outbound call tuning.
    pub dispatch: DispatchConfig,
    /// Per-provider overrides, keyed by path segment.
    pub providers: BTreeMap<String, ProviderConfig>,
}

/// Server configuration.
#[derive(Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Bind host.
    pub host: String,
    /// Bind port; 0 picks an ephemeral port.
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_owned(),
            port: 3000,
        }
    }
}

/// Store configuration.
#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// Backend type: "sqlite" or "in_memory".
    pub backend: StoreBackendKind,
    /// SQLite database path. Defaults to `<config_dir>/data/relay.db`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<PathBuf>,
}

/// Store backend kind.
#[derive(Debug, Default, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum StoreBackendKind {
    /// SQLite-backed durable store.
    #[default]
    Sqlite,
    /// In-memory store (no persistence).
    InMemory,
}

/// Dispatch configuration.
#[derive(Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct DispatchConfig {
    /// Delay between a completion signal and reading the session back.
    pub quiescence_ms: u64,
    /// Bound on a single outbound provider call.
    pub timeout_secs: u64,
}

impl Default for DispatchConfig {
    fn default() -> Self {
        Self {
            quiescence_ms: 1000,
            timeout_secs: 300,
        }
    }
}

impl DispatchConfig {
    /// The quiescence delay.
    pub fn quiescence(&self) -> Duration {
        Duration::from_millis(self.quiescence_ms)
    }

    /// The outbound call timeout.
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// Provider override.
#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ProviderConfig {
    /// API key (supports `${ENV_VAR}` expansion).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
    /// Endpoint override; `{model}` is substituted per call.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub endpoint: Option<String>,
}

/// Environment variable consulted when a provider has no configured key.
pub fn default_key_env(kind: ProviderKind) -> &'static str {
    match kind {
        ProviderKind::Anthropic => "ANTHROPIC_API_KEY",
        ProviderKind::OpenAiChat | ProviderKind::OpenAiResponses => "OPENAI_API_KEY",
        ProviderKind::Gemini => "GEMINI_API_KEY",
        ProviderKind::GitHub => "GITHUB_TOKEN",
    }
}

impl GatewayConfig {
    /// Parse a TOML string into a `GatewayConfig`, expanding environment
    /// variables first.
    pub fn from_toml(toml_str: &str) -> Result<Self> {
        let expanded = crate::utils::expand_env_vars(toml_str);
        let config: Self = toml::from_str(&expanded)?;
        for name in config.providers.keys() {
            if ProviderKind::from_path(name).is_none() {
                tracing::warn!("ignoring configuration for unknown provider '{name}'");
            }
        }
        Ok(config)
    }

    /// Load configuration from a file path.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        Self::from_toml(&content).with_context(|| format!("failed to parse {}", path.display()))
    }

    /// Load from an explicit path, else the global config file when it
    /// exists, else built-in defaults.
    pub fn resolve(explicit: Option<&Path>) -> Result<Self> {
        if let Some(path) = explicit {
            tracing::info!("loading configuration from {}", path.display());
            return Self::load(path);
        }
        match global_config_dir().map(|dir| dir.join(CONFIG_FILE)) {
            Some(path) if path.exists() => {
                tracing::info!("loading configuration from {}", path.display());
                Self::load(&path)
            }
            _ => {
                tracing::info!("no configuration file found, using defaults");
                Ok(Self::default())
            }
        }
    }

    /// The `host:port` the server binds to.
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }

    /// The SQLite path, explicit or under the global data directory.
    pub fn store_path(&self) -> PathBuf {
        self.store.path.clone().unwrap_or_else(|| {
            global_config_dir()
                .map(|dir| dir.join(DATA_DIR).join(STORE_DB))
                .unwrap_or_else(|| PathBuf::from(STORE_DB))
        })
    }

    /// The configuration block of one provider, accepting aliases as keys.
    pub fn provider(&self, kind: ProviderKind) -> Option<&ProviderConfig> {
        self.providers
            .iter()
            .find(|(name, _)| ProviderKind::from_path(name) == Some(kind))
            .map(|(_, config)| config)
    }

    /// Configured credentials, falling back to each provider's environment
    /// variable. Empty values count as absent.
    pub fn credentials(&self) -> BTreeMap<ProviderKind, String> {
        ProviderKind::ALL
            .into_iter()
            .filter_map(|kind| {
                let configured = self.provider(kind).and_then(|p| p.api_key.clone());
                configured
                    .filter(|k| !k.is_empty())
                    .or_else(|| std::env::var(default_key_env(kind)).ok())
                    .filter(|k| !k.is_empty())
                    .map(|key| (kind, key))
            })
            .collect()
    }

    /// Endpoint overrides.
    pub fn endpoints(&self) -> impl Iterator<Item = (ProviderKind, &str)> {
        ProviderKind::ALL.into_iter().filter_map(|kind| {
            self.provider(kind)
                .and_then(|p| p.endpoint.as_deref())
                .map(|endpoint| (kind, endpoint))
        })
    }
}
