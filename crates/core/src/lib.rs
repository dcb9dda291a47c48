//! Core types for the relay gateway.
//!
//! Fragments are staged one HTTP call at a time, assembled into a
//! [`Conversation`] on completion, and handed to a provider translator.
//! The stores are abstracted behind [`Staging`] and [`Workspace`] so the
//! gateway can run against SQLite or the in-memory [`InMemory`] backend.

pub use {
    conversation::{Conversation, Document, PROCEED_PROMPT, Source, Turn},
    fragment::{Fragment, FragmentKind, Role},
    memory::InMemory,
    provider::{DISABLED_MODEL, ProviderKind},
    staging::{Staged, Staging, assemble},
    workspace::{ConfigKey, Workspace},
};

mod conversation;
mod fragment;
mod memory;
mod provider;
mod staging;
mod workspace;
