//! Provider selection.

use std::{fmt, str::FromStr};

/// Model identifier that short-circuits dispatch with a static response.
pub const DISABLED_MODEL: &str = "disabled";

/// Upstream provider families reachable through the gateway.
///
/// Each variant is addressed by a path segment; the segment also names the
/// staging session for that provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ProviderKind {
    /// Anthropic messages API.
    Anthropic,
    /// OpenAI chat completions.
    OpenAiChat,
    /// OpenAI responses API.
    OpenAiResponses,
    /// Google Gemini generateContent.
    Gemini,
    /// GitHub Models inference.
    GitHub,
}

impl ProviderKind {
    /// All providers, in routing order.
    pub const ALL: [ProviderKind; 5] = [
        Self::Anthropic,
        Self::OpenAiChat,
        Self::OpenAiResponses,
        Self::Gemini,
        Self::GitHub,
    ];

    /// Canonical path segment, also used as the session key.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Anthropic => "anthropic",
            Self::OpenAiChat => "openai",
            Self::OpenAiResponses => "responses",
            Self::Gemini => "gemini",
            Self::GitHub => "github",
        }
    }

    /// Resolve a path segment, accepting legacy aliases.
    pub fn from_path(segment: &str) -> Option<Self> {
        Some(match segment.to_ascii_lowercase().as_str() {
            "anthropic" => Self::Anthropic,
            "openai" | "chatgpt" => Self::OpenAiChat,
            "responses" => Self::OpenAiResponses,
            "gemini" | "googleai" => Self::Gemini,
            "github" => Self::GitHub,
            _ => return None,
        })
    }

    /// Staging session key for this provider.
    pub fn session(&self) -> &'static str {
        self.as_str()
    }

    /// Human label used when wrapping upstream failures.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Anthropic => "Anthropic",
            Self::OpenAiChat | Self::OpenAiResponses => "OpenAI",
            Self::Gemini => "GoogleAI",
            Self::GitHub => "GitHub Models",
        }
    }
}

impl fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ProviderKind {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> anyhow::Result<Self> {
        Self::from_path(s).ok_or_else(|| anyhow::anyhow!("unknown provider: {s}"))
    }
}
