//! Shared utilities for integration tests.

#![allow(dead_code)]

use std::net::SocketAddr;
use std::time::Duration;

use tokio::net::TcpListener;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use page_mounts::config::{parse_config, MountsConfig};
use page_mounts::http::HttpServer;
use page_mounts::lifecycle::Shutdown;

/// Pages and mounts covering every strategy kind.
pub const CONFIG: &str = r#"
ignore_paths = ["static"]

[[pages]]
name = "app.Wizard"
title = "Signup wizard"

[[pages]]
name = "app.About"
stateless = true

[[pages]]
name = "blog.Article"

[[pages]]
name = "blog.Archive"
stateless = true

[[pages]]
name = "shop.Cart"

[[pages]]
name = "shop.Checkout"

[[mounts]]
path = "wizard"
page = "app.Wizard"
strategy = "hybrid"

[[mounts]]
path = "about"
page = "app.About"

[[mounts]]
path = "blog"
page = "blog.Article"
strategy = "mixed"
parameters = ["year", "slug"]

[[mounts]]
path = "archive"
page = "blog.Archive"
strategy = "indexed"

[[mounts]]
path = "shop"
strategy = "package"
package = "shop"
"#;

pub fn config() -> MountsConfig {
    parse_config(CONFIG).expect("test config is valid")
}

/// A server bound to an ephemeral port.
pub struct TestServer {
    pub addr: SocketAddr,
    pub shutdown: Shutdown,
    pub updates: mpsc::UnboundedSender<MountsConfig>,
    pub handle: JoinHandle<std::io::Result<()>>,
}

impl TestServer {
    pub fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }
}

/// Start a server for `config` on 127.0.0.1:0.
pub async fn spawn_server(config: MountsConfig) -> TestServer {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let server = HttpServer::new(&config).unwrap();
    let shutdown = Shutdown::new();
    let (updates, rx) = mpsc::unbounded_channel();

    let stop = shutdown.clone();
    let handle = tokio::spawn(async move { server.run(listener, Some(rx), &stop).await });

    TestServer {
        addr,
        shutdown,
        updates,
        handle,
    }
}

/// HTTP client that does not follow redirects.
pub fn client() -> reqwest::Client {
    reqwest::Client::builder()
        .redirect(reqwest::redirect::Policy::none())
        .timeout(Duration::from_secs(5))
        .build()
        .unwrap()
}

/// Poll `check` until it returns true or two seconds pass.
pub async fn eventually<F, Fut>(mut check: F) -> bool
where
    F: FnMut() -> Fut,
    Fut: std::future::Future<Output = bool>,
{
    for _ in 0..40 {
        if check().await {
            return true;
        }
        tokio::time::sleep(Duration::from_millis(50)).await;
    }
    false
}
