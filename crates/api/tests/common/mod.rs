#![allow(dead_code)]

use std::sync::Arc;

use chrono::Duration;
use serde_json::Value;

use tours_api::app::{build_app, AppServices};

pub const ADMIN_USERNAME: &str = "admin";
pub const ADMIN_PASSWORD: &str = "pato123";

pub struct TestServer {
    pub base_url: String,
    handle: tokio::task::JoinHandle<()>,
}

impl TestServer {
    pub async fn spawn() -> Self {
        // Same router as prod over in-memory stores, bound to an ephemeral port.
        let services = AppServices::in_memory("test-secret", Duration::minutes(30));
        services
            .seed_account(ADMIN_USERNAME, ADMIN_PASSWORD)
            .await
            .expect("failed to seed account");
        let app = build_app(Arc::new(services));

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("failed to bind ephemeral port");
        let addr = listener.local_addr().unwrap();
        let base_url = format!("http://{}", addr);

        let handle = tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self { base_url, handle }
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

/// Client that reports redirects instead of following them.
pub fn client() -> reqwest::Client {
    reqwest::Client::builder()
        .redirect(reqwest::redirect::Policy::none())
        .build()
        .unwrap()
}

pub async fn post_json(client: &reqwest::Client, url: String, body: Value) -> reqwest::Response {
    client.post(url).json(&body).send().await.unwrap()
}

/// `name=value` of the first `Set-Cookie` header.
pub fn set_cookie_pair(res: &reqwest::Response) -> String {
    let raw = res
        .headers()
        .get(reqwest::header::SET_COOKIE)
        .expect("missing set-cookie")
        .to_str()
        .unwrap();
    raw.split(';').next().unwrap().trim().to_string()
}
