//! Project workspace abstraction.

use crate::conversation::Document;
use anyhow::Result;
use std::{fmt, str::FromStr};

/// Keyed settings stored in a project workspace.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConfigKey {
    /// Provider credential.
    ApiKey,
    /// System instructions.
    SystemInstructions,
    /// Model identifier.
    Model,
    /// Latest prompt.
    Prompt,
}

impl ConfigKey {
    /// The `type` label used by the project endpoint.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ApiKey => "api key",
            Self::SystemInstructions => "system instructions",
            Self::Model => "model",
            Self::Prompt => "prompt",
        }
    }
}

impl fmt::Display for ConfigKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ConfigKey {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        Ok(match s {
            "api key" => Self::ApiKey,
            "system instructions" => Self::SystemInstructions,
            "model" => Self::Model,
            "prompt" => Self::Prompt,
            other => anyhow::bail!("unknown config key: {other}"),
        })
    }
}

/// Per-session project state: settings plus uploaded documents.
pub trait Workspace: Send + Sync {
    /// Store a setting, replacing any previous value. Returns the row id.
    fn set(&self, session: &str, key: ConfigKey, value: &str) -> Result<i64>;

    /// Read a setting.
    fn get(&self, session: &str, key: ConfigKey) -> Result<Option<String>>;

    /// Append a document. Returns the row id.
    fn add_document(&self, session: &str, path: &str, content: &str) -> Result<i64>;

    /// Documents in upload order.
    fn documents(&self, session: &str) -> Result<Vec<Document>>;

    /// Drop all settings and documents of a session.
    fn reset(&self, session: &str) -> Result<()>;
}
