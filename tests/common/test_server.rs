//! Real advodir HTTP server for client and end-to-end harnesses.
//!
//! Spins up the production router on a random TCP port bound to 127.0.0.1,
//! backed by whatever store the test supplies.
//!
//! # Example
//!
//! ```rust,no_run
//! let server = TestServer::start(store_with(StoreKind::Memory, lee_pair()).await).await.unwrap();
//! let fetcher = HttpFetcher::new(server.base_url());
//! ```

use advodir_core::config::SearchConfig;
use advodir_core::{AdvocateStore, SearchExecutor};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

/// Handle to the running server. The server stops when the handle drops.
pub struct TestServer {
    addr: SocketAddr,
    task: JoinHandle<()>,
}

impl TestServer {
    /// Start serving `store` with default pagination limits.
    pub async fn start<S>(store: S) -> std::io::Result<Self>
    where
        S: AdvocateStore + 'static,
    {
        Self::start_with(store, SearchConfig::default()).await
    }

    pub async fn start_with<S>(store: S, limits: SearchConfig) -> std::io::Result<Self>
    where
        S: AdvocateStore + 'static,
    {
        let listener = TcpListener::bind("127.0.0.1:0").await?;
        let addr = listener.local_addr()?;
        let app = advodir::router(Arc::new(SearchExecutor::new(store)), limits);

        let task = tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Ok(Self { addr, task })
    }

    /// Base URL for the API (e.g. `http://127.0.0.1:PORT`).
    pub fn base_url(&self) -> String {
        format!("http://{}", self.addr)
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.task.abort();
    }
}
