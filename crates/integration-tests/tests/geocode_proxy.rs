//! Geocode proxy routes over HTTP, with a fixture upstream.
//!
//! Run with: cargo test -p rideshare-integration-tests

#![allow(clippy::unwrap_used)]

use std::time::{Duration, Instant};

use reqwest::StatusCode;
use rideshare_integration_tests::TestServer;
use rideshare_server::config::ServerConfig;
use serde_json::Value;

async fn search(server: &TestServer, address: &str) -> (StatusCode, Value) {
    let resp = server
        .client
        .get(server.url(&format!(
            "/geocode/search?q={}",
            address.replace(' ', "%20")
        )))
        .send()
        .await
        .unwrap();
    let status = resp.status();
    (status, resp.json().await.unwrap())
}

#[tokio::test]
async fn test_repeated_search_served_from_cache() {
    let server = TestServer::spawn().await;

    let (status, first) = search(&server, "Walton Hall").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(first["status"], "success");
    assert_eq!(first["data"][0]["display_name"], "Walton Hall");

    let (_, second) = search(&server, "  Walton   Hall ").await;
    assert_eq!(second, first);
    assert_eq!(server.resolver.calls(), 1);
}

#[tokio::test]
async fn test_distinct_searches_are_spaced() {
    let delay = Duration::from_millis(400);
    let server = TestServer::spawn_with(ServerConfig::default(), delay).await;

    let started = Instant::now();
    let (a, b) = tokio::join!(search(&server, "Alpha"), search(&server, "Bravo"));
    assert_eq!(a.1["status"], "success");
    assert_eq!(b.1["status"], "success");

    assert!(started.elapsed() >= delay);
    assert_eq!(server.resolver.calls(), 2);
}

#[tokio::test]
async fn test_reverse_lookup() {
    let server = TestServer::spawn().await;
    let resp = server
        .client
        .get(server.url("/geocode/reverse?lat=52.0245&lon=-0.7093"))
        .send()
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["data"]["display_name"], "Walton Hall, Milton Keynes");
}

#[tokio::test]
async fn test_upstream_failure_is_bad_gateway() {
    let server = TestServer::spawn().await;

    let (status, body) = search(&server, "unknown place").await;
    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert_eq!(body["status"], "error");

    // Failures are not cached
    search(&server, "unknown place").await;
    assert_eq!(server.resolver.calls(), 2);
}
