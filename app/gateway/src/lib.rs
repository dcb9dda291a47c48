//! Relay gateway: HTTP shell over fragment staging, project workspaces and
//! provider dispatch.

pub mod aggregate;
pub mod backend;
pub mod config;
pub mod error;
pub mod project;
pub mod router;
pub mod serve;
pub mod state;
pub mod utils;

pub use backend::StoreBackend;
pub use config::GatewayConfig;
pub use error::ApiError;
pub use router::router;
pub use serve::{ServeHandle, serve, serve_with_state};
pub use state::AppState;
