//! Request body for Gemini `generateContent`.

use rcore::{Conversation, Role};
use serde::Serialize;

/// Temperature sent when none was staged.
pub const DEFAULT_TEMPERATURE: f64 = 0.2;

/// Top-p sent when none was staged.
pub const DEFAULT_TOP_P: f64 = 0.5;

/// Harm categories that are always relaxed to `BLOCK_NONE`.
pub const HARM_CATEGORIES: [&str; 4] = [
    "HARM_CATEGORY_SEXUALLY_EXPLICIT",
    "HARM_CATEGORY_HATE_SPEECH",
    "HARM_CATEGORY_HARASSMENT",
    "HARM_CATEGORY_DANGEROUS_CONTENT",
];

/// A text part.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Part {
    /// The text.
    pub text: String,
}

/// One turn, with Gemini's `user`/`model` roles.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Content {
    /// `user` or `model`.
    pub role: &'static str,
    /// Text parts.
    pub parts: Vec<Part>,
}

/// The system instruction block.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SystemInstruction {
    /// Text parts.
    pub parts: Vec<Part>,
}

/// A safety threshold for one category.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SafetySetting {
    /// Harm category.
    pub category: &'static str,
    /// Blocking threshold.
    pub threshold: &'static str,
}

/// Sampling configuration.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationConfig {
    /// Temperature.
    pub temperature: f64,
    /// Top-p sampling.
    pub top_p: f64,
    /// Top-k sampling.
    pub top_k: u32,
}

/// The request body for `generateContent`. The model goes in the URL.
#[derive(Debug, Clone, Serialize)]
pub struct Request {
    /// Conversation turns.
    pub contents: Vec<Content>,
    /// System instruction, omitted when empty.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub system_instruction: Option<SystemInstruction>,
    /// Safety thresholds.
    #[serde(rename = "safetySettings")]
    pub safety_settings: Vec<SafetySetting>,
    /// Sampling configuration.
    #[serde(rename = "generationConfig")]
    pub generation_config: GenerationConfig,
}

impl From<&Conversation> for Request {
    fn from(conv: &Conversation) -> Self {
        let contents = conv
            .transcript()
            .into_iter()
            .map(|turn| Content {
                role: match turn.role {
                    Role::User => "user",
                    Role::Assistant => "model",
                },
                parts: vec![Part { text: turn.content }],
            })
            .collect();

        let system_instruction = (!conv.system_instruction.is_empty()).then(|| SystemInstruction {
            parts: vec![Part {
                text: conv.system_instruction.clone(),
            }],
        });

        Self {
            contents,
            system_instruction,
            safety_settings: HARM_CATEGORIES
                .iter()
                .map(|&category| SafetySetting {
                    category,
                    threshold: "BLOCK_NONE",
                })
                .collect(),
            generation_config: GenerationConfig {
                temperature: conv.temperature.unwrap_or(DEFAULT_TEMPERATURE),
                top_p: conv.top_p.unwrap_or(DEFAULT_TOP_P),
                top_k: 1,
            },
        }
    }
}
