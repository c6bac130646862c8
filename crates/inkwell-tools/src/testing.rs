//! In-process backend servers for tests

use axum::Router;
use std::net::SocketAddr;
use tokio::net::TcpListener;

/// A backend served by axum on an ephemeral local port
pub(crate) struct MockBackendServer {
    addr: SocketAddr,
    _handle: tokio::task::JoinHandle<()>,
}

impl MockBackendServer {
    pub(crate) async fn start(app: Router) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let handle = tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        Self {
            addr,
            _handle: handle,
        }
    }

    pub(crate) fn base_url(&self) -> String {
        format!("http://{}", self.addr)
    }
}

/// A local URL nothing is listening on
pub(crate) async fn unreachable_url() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    format!("http://{addr}")
}
