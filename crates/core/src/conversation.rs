//! Assembled conversations, the input of every provider translator.

use crate::{fragment::Role, provider::DISABLED_MODEL};

/// Synthetic user turn appended when a transcript does not end on the user.
pub const PROCEED_PROMPT: &str = "Please let me know how you would like to proceed.";

const PROJECT_OPENING: &str = "I need your help on this project.";
const PROJECT_NO_CONTEXT: &str = "How would you like to proceed with this project?";
const PROJECT_NEXT_STEP: &str = "What would you like to do next?";

/// A single conversation turn.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Turn {
    /// Who authored the turn.
    pub role: Role,
    /// The turn text.
    pub content: String,
}

impl Turn {
    /// Create a user turn.
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    /// Create an assistant turn.
    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
        }
    }
}

/// A file uploaded into a project workspace.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    /// Path as reported by the caller.
    pub path: String,
    /// File content.
    pub content: String,
}

/// Where a conversation was assembled from.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Source {
    /// Fragments staged through `POST /{provider}`.
    #[default]
    Staged,
    /// Files and a prompt stored through `POST /{provider}/project`.
    Project,
}

/// A fully assembled conversation, built fresh per completion cycle.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Conversation {
    /// How the conversation was collected.
    pub source: Source,
    /// Model identifier; empty when none was staged.
    pub model: String,
    /// System instruction text; empty when none was staged.
    pub system_instruction: String,
    /// Turns in replay order.
    ///
    /// For [`Source::Project`] this holds only the prompt; the file
    /// scaffold is produced by [`Conversation::transcript`].
    pub turns: Vec<Turn>,
    /// Staged temperature, if any.
    pub temperature: Option<f64>,
    /// Staged top_p, if any.
    pub top_p: Option<f64>,
    /// Project documents in upload order.
    pub documents: Vec<Document>,
}

impl Conversation {
    /// Build a project conversation from workspace state.
    pub fn project(
        model: impl Into<String>,
        instructions: impl Into<String>,
        documents: Vec<Document>,
        prompt: Option<String>,
    ) -> Self {
        Self {
            source: Source::Project,
            model: model.into(),
            system_instruction: instructions.into(),
            turns: prompt
                .filter(|p| !p.trim().is_empty())
                .map(|p| vec![Turn::user(p)])
                .unwrap_or_default(),
            documents,
            ..Default::default()
        }
    }

    /// Whether the selected model is the `disabled` sentinel.
    pub fn is_disabled(&self) -> bool {
        self.model == DISABLED_MODEL
    }

    /// The turn sequence a message-based provider should receive.
    ///
    /// Project conversations are expanded into the file scaffold. The
    /// result always ends on a user turn.
    pub fn transcript(&self) -> Vec<Turn> {
        let turns = match self.source {
            Source::Staged => self.turns.clone(),
            Source::Project => self.scaffold(),
        };
        close(turns)
    }

    /// The caller-authored turns, closed on a user turn.
    ///
    /// Used by providers that flatten the conversation into a single
    /// document and render documents separately.
    pub fn exchange(&self) -> Vec<Turn> {
        close(self.turns.clone())
    }

    fn scaffold(&self) -> Vec<Turn> {
        let mut turns = Vec::with_capacity(self.documents.len() * 2 + 3);
        turns.push(Turn::user(PROJECT_OPENING));
        for doc in &self.documents {
            turns.push(Turn::assistant(format!(
                "Please provide the content of the `{}` file.",
                doc.path
            )));
            turns.push(Turn::user(format!(
                "Here is the content of the `{}` file:\n```\n{}\n```\n",
                doc.path, doc.content
            )));
        }

        if self.turns.is_empty() {
            if self.documents.is_empty() {
                turns.push(Turn::assistant(PROJECT_NO_CONTEXT));
            }
        } else {
            turns.push(Turn::assistant(PROJECT_NEXT_STEP));
            turns.extend(self.turns.iter().cloned());
        }
        turns
    }
}

/// Append [`PROCEED_PROMPT`] unless the turns already end on the user.
pub fn close(mut turns: Vec<Turn>) -> Vec<Turn> {
    if turns.last().map(|t| t.role) != Some(Role::User) {
        turns.push(Turn::user(PROCEED_PROMPT));
    }
    turns
}
