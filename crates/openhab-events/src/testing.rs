//! Test utilities for openhab-events
//!
//! Runs an axum router on an ephemeral port so client code can be exercised
//! against a local stand-in for the hub's `/rest/events` endpoint.

use std::net::SocketAddr;
use std::time::Duration;

use tokio::net::TcpListener;

use crate::{ConnectionConfig, ItemEventClient, Result};

/// A test server that automatically shuts down when dropped
pub struct TestServer {
    pub addr: SocketAddr,
    pub client: ItemEventClient,
    shutdown_tx: Option<tokio::sync::oneshot::Sender<()>>,
    handle: Option<tokio::task::JoinHandle<()>>,
}

impl TestServer {
    /// Start a server with an unauthenticated client
    ///
    /// # Example
    ///
    /// ```ignore
    /// use openhab_events::testing::TestServer;
    ///
    /// let router = axum::Router::new().route("/rest/events", get(events));
    /// let server = TestServer::start(router).await?;
    ///
    /// let mut stream = server.client.all_events().await?;
    /// ```
    pub async fn start<S>(router: axum::Router<S>) -> Result<Self>
    where
        S: Clone + Send + Sync + 'static,
        axum::Router<S>: Into<axum::Router>,
    {
        Self::start_with(router, |config| config).await
    }

    /// Start a server, letting the caller adjust the client's config
    /// (e.g. to add credentials)
    pub async fn start_with<S, F>(router: axum::Router<S>, configure: F) -> Result<Self>
    where
        S: Clone + Send + Sync + 'static,
        axum::Router<S>: Into<axum::Router>,
        F: FnOnce(ConnectionConfig) -> ConnectionConfig,
    {
        // Bind to any available port
        let listener = TcpListener::bind("127.0.0.1:0").await?;
        let addr = listener.local_addr()?;

        let (shutdown_tx, shutdown_rx) = tokio::sync::oneshot::channel();

        let router: axum::Router = router.into();

        let handle = tokio::spawn(async move {
            axum::serve(listener, router)
                .with_graceful_shutdown(async {
                    let _ = shutdown_rx.await;
                })
                .await
                .ok();
        });

        // Give server a moment to start
        tokio::time::sleep(Duration::from_millis(10)).await;

        let config = configure(ConnectionConfig::new(format!("http://{}", addr)));
        let client = ItemEventClient::with_connect_timeout(config, Duration::from_secs(2))?;

        Ok(Self {
            addr,
            client,
            shutdown_tx: Some(shutdown_tx),
            handle: Some(handle),
        })
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
        if let Some(handle) = self.handle.take() {
            handle.abort();
        }
    }
}
