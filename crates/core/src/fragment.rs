//! Staged conversation fragments.

use std::{fmt, str::FromStr};

/// The kind of state a fragment carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum FragmentKind {
    /// A conversation turn.
    Message,
    /// System instruction text.
    SystemInstruction,
    /// Model identifier.
    ModelToUse,
    /// Sampling temperature.
    Temperature,
    /// Nucleus sampling.
    TopP,
    /// Provider credential.
    ApiKey,
}

impl FragmentKind {
    /// Scalar kinds, in the order the writer stages them.
    pub const SCALARS: [FragmentKind; 5] = [
        Self::SystemInstruction,
        Self::ModelToUse,
        Self::Temperature,
        Self::TopP,
        Self::ApiKey,
    ];

    /// The request field / storage name of this kind.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Message => "message",
            Self::SystemInstruction => "system_instruction",
            Self::ModelToUse => "model_to_use",
            Self::Temperature => "temperature",
            Self::TopP => "top_p",
            Self::ApiKey => "api_key",
        }
    }
}

impl fmt::Display for FragmentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FragmentKind {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> anyhow::Result<Self> {
        Ok(match s {
            "message" => Self::Message,
            "system_instruction" => Self::SystemInstruction,
            "model_to_use" => Self::ModelToUse,
            "temperature" => Self::Temperature,
            "top_p" => Self::TopP,
            "api_key" => Self::ApiKey,
            other => anyhow::bail!("unknown fragment kind: {other}"),
        })
    }
}

/// Author of a conversation turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Role {
    /// The human side of the conversation.
    User,
    /// The model side. Accepts `model` as written by Gemini-style callers.
    Assistant,
}

impl Role {
    /// Parse a writer-side role label.
    ///
    /// `model` is normalized to [`Role::Assistant`].
    pub fn parse(label: &str) -> Option<Self> {
        match label.trim().to_ascii_lowercase().as_str() {
            "user" => Some(Self::User),
            "assistant" | "model" => Some(Self::Assistant),
            _ => None,
        }
    }

    /// The label used in storage and by OpenAI-style providers.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Assistant => "assistant",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One piece of conversation state submitted by a single write.
#[derive(Debug, Clone, PartialEq)]
pub struct Fragment {
    /// What this fragment carries.
    pub kind: FragmentKind,
    /// Per-session sequence number, assigned by the store.
    pub sequence: u64,
    /// Turn author, only set for [`FragmentKind::Message`].
    pub role: Option<Role>,
    /// Text payload.
    pub content: String,
}
