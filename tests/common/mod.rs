//! Shared utilities for integration testing.

use std::net::SocketAddr;

use content_gateway::config::schema::GatewayConfig;
use content_gateway::{HttpServer, Shutdown};
use tempfile::TempDir;
use tokio::net::TcpListener;

/// A gateway running on an ephemeral port with a throwaway upload root.
pub struct TestGateway {
    pub addr: SocketAddr,
    #[allow(dead_code)]
    pub upload_root: TempDir,
    shutdown: Shutdown,
}

impl TestGateway {
    pub fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }
}

impl Drop for TestGateway {
    fn drop(&mut self) {
        self.shutdown.trigger();
    }
}

/// Spawn a gateway with the default config, mutated by the caller.
pub async fn spawn_gateway<F>(mutate: F) -> TestGateway
where
    F: FnOnce(&mut GatewayConfig),
{
    let upload_root = TempDir::new().unwrap();
    let mut config = GatewayConfig::default();
    config.uploads.root_dir = upload_root.path().to_str().unwrap().to_string();
    mutate(&mut config);

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    let shutdown = Shutdown::new();
    let server_shutdown = shutdown.subscribe();
    let server = HttpServer::new(config).unwrap();

    tokio::spawn(async move {
        let _ = server.run(listener, server_shutdown).await;
    });

    TestGateway {
        addr,
        upload_root,
        shutdown,
    }
}
