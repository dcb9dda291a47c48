//! Shared gateway serve entrypoint, used by the binary and the tests.

use crate::{AppState, GatewayConfig, router::router};
use anyhow::Result;
use tokio::sync::oneshot;

/// Handle returned by [`serve`]. Holds the bound port and shutdown trigger.
pub struct ServeHandle {
    /// The port the gateway is listening on.
    pub port: u16,
    /// Send a value to trigger graceful shutdown.
    shutdown_tx: Option<oneshot::Sender<()>>,
    /// Join handle for the server task.
    join: Option<tokio::task::JoinHandle<Result<(), std::io::Error>>>,
}

impl ServeHandle {
    /// Trigger graceful shutdown and wait for the server to stop.
    pub async fn shutdown(mut self) -> Result<()> {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
        if let Some(join) = self.join.take() {
            join.await??;
        }
        Ok(())
    }
}

/// Build state from the configuration, bind, and start serving.
pub async fn serve(config: &GatewayConfig) -> Result<ServeHandle> {
    let state = AppState::from_config(config)?;
    serve_with_state(state, &config.bind_address()).await
}

/// Serve prepared state on `bind`.
///
/// The server runs in a spawned task. Call `handle.shutdown()` to stop it.
pub async fn serve_with_state(state: AppState, bind: &str) -> Result<ServeHandle> {
    let app = router(state);
    let listener = tokio::net::TcpListener::bind(bind).await?;
    let port = listener.local_addr()?.port();
    tracing::info!("gateway listening on {bind} (port {port})");

    let (shutdown_tx, shutdown_rx) = oneshot::channel();
    let join = tokio::spawn(async move {
        axum::serve(listener, app)
            .with_graceful_shutdown(async {
                let _ = shutdown_rx.await;
                tracing::info!("received shutdown signal");
            })
            .await
    });

    Ok(ServeHandle {
        port,
        shutdown_tx: Some(shutdown_tx),
        join: Some(join),
    })
}
