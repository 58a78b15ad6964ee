#![allow(dead_code)]

use std::sync::Arc;

use anyhow::{Context, Result};
use reqwest::{Method, RequestBuilder};
use serde_json::Value;

use cashcard_api::auth::UserDirectory;
use cashcard_api::config::AppConfig;
use cashcard_api::database::{fixtures, MemoryCardStore};
use cashcard_api::{app, AppState};

pub const SARAH: (&str, &str) = ("sarah1", "abc123");
pub const KUMAR: (&str, &str) = ("kumar2", "xyz789");
pub const HANK: (&str, &str) = ("hank-owns-no-cards", "qrs456");

// Minimum bcrypt cost keeps the suite fast
const TEST_BCRYPT_COST: u32 = 4;

pub struct TestServer {
    pub port: u16,
    pub base_url: String,
    client: reqwest::Client,
}

impl TestServer {
    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    pub fn request(&self, method: Method, path: &str) -> RequestBuilder {
        self.client.request(method, self.url(path))
    }

    pub fn as_user(&self, method: Method, path: &str, (user, password): (&str, &str)) -> RequestBuilder {
        self.request(method, path).basic_auth(user, Some(password))
    }
}

/// Start a fresh server seeded with the demo cards. Each test gets its own
/// store so writes never leak between tests.
pub async fn spawn_server() -> Result<TestServer> {
    let mut config = AppConfig::development();
    config.security.bcrypt_cost = TEST_BCRYPT_COST;
    config.api.enable_request_logging = false;

    let store = Arc::new(MemoryCardStore::with_cards(fixtures::demo_cards()));
    let users = UserDirectory::test_users(config.security.bcrypt_cost)?;
    let state = AppState::new(store, users, config.api.clone());

    // Pick an unused port for isolation
    let port = portpicker::pick_unused_port().context("failed to pick free port")?;
    let listener = tokio::net::TcpListener::bind(("127.0.0.1", port))
        .await
        .context("failed to bind test listener")?;

    tokio::spawn(async move {
        let _ = axum::serve(listener, app(state)).await;
    });

    Ok(TestServer {
        port,
        base_url: format!("http://127.0.0.1:{}", port),
        client: reqwest::Client::new(),
    })
}

pub fn amount_of(card: &Value) -> f64 {
    card["amount"].as_f64().expect("amount should be a number")
}

pub fn assert_amount(card: &Value, expected: f64) {
    let actual = amount_of(card);
    assert!(
        (actual - expected).abs() < 1e-9,
        "expected amount {expected}, got {actual}"
    );
}
