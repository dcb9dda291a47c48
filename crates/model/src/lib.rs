//! Provider translators and the dispatch client for the relay gateway.
//!
//! Each provider module owns its endpoint, auth headers, request body and
//! the static response shapes used for the disabled model and for
//! normalized failures. [`Dispatcher`] ties them together.

pub use {
    dispatch::{DEFAULT_TIMEOUT, Dispatcher},
    error::DispatchError,
    http::HttpProvider,
    provider::{Body, default_endpoint, disabled, failure, transport, translate},
    request::{Message, Request},
    reqwest::Client,
};

pub mod claude;
pub mod gemini;
pub mod github;
pub mod openai;
pub mod responses;

mod dispatch;
mod error;
mod http;
mod provider;
mod request;
mod utils;
