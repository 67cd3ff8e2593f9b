//! End-to-end order lifecycle over HTTP.
//!
//! Run with: cargo test -p rideshare-integration-tests

#![allow(clippy::unwrap_used)]

use reqwest::StatusCode;
use rideshare_integration_tests::TestServer;
use rideshare_server::config::ServerConfig;
use serde_json::{Value, json};

async fn post_order(server: &TestServer, body: Value) -> Value {
    server
        .client
        .post(server.url("/orders"))
        .json(&body)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap()
}

async fn get_json(server: &TestServer, path: &str) -> (StatusCode, Value) {
    let resp = server.client.get(server.url(path)).send().await.unwrap();
    let status = resp.status();
    (status, resp.json().await.unwrap())
}

#[tokio::test]
async fn test_health_endpoint() {
    let server = TestServer::spawn().await;
    let resp = server
        .client
        .get(server.root_url("/health"))
        .send()
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(resp.text().await.unwrap(), "ok");
}

#[tokio::test]
async fn test_offer_and_request_lifecycle() {
    let server = TestServer::spawn().await;

    let offer = post_order(
        &server,
        json!({
            "userid": "driver",
            "type": "0",
            "address": "Virunum",
            "start": "2018-12-05T18:00:00",
            "end": "2018-12-05T20:00:00",
        }),
    )
    .await;
    assert_eq!(offer["status"], "success");
    assert_eq!(offer["data"][0]["id"], "0");

    let request = post_order(
        &server,
        json!({
            "userid": "rider",
            "type": "1",
            "address": "Virunum",
            "start": "2018-12-05T18:09",
            "end": "",
        }),
    )
    .await;
    assert_eq!(request["data"][0]["id"], "1");
    assert_eq!(request["data"][0]["end"], Value::Null);
    assert_eq!(request["data"][0]["start"], "2018-12-05T18:09:00");

    // Trailing slash as sent by existing clients
    let (status, matches) = get_json(&server, "/matches/?userid=rider").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        matches,
        json!({
            "status": "success",
            "data": [{
                "start": "2018-12-05T18:00:00",
                "hire_userid": "rider",
                "hire_address": "Virunum",
                "offer_userid": "driver",
                "offer_address": "Virunum",
            }]
        })
    );

    // The rider withdraws; the driver no longer has a match
    let resp = server
        .client
        .delete(server.url("/orders/1?userid=rider"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.json::<Value>().await.unwrap(), json!({"status": "success"}));

    let (status, matches) = get_json(&server, "/matches?userid=driver").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        matches,
        json!({"status": "error", "message": "404 - No matching records"})
    );

    let (_, orders) = get_json(&server, "/orders?userid=driver").await;
    assert_eq!(orders["data"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_store_capacity_over_http() {
    let config = ServerConfig {
        order_capacity: 2,
        ..ServerConfig::default()
    };
    let server = TestServer::spawn_with(config, std::time::Duration::ZERO).await;

    for user in ["a", "b"] {
        let body = post_order(
            &server,
            json!({"userid": user, "type": "1", "address": "X", "start": "2018-12-05T18:00"}),
        )
        .await;
        assert_eq!(body["status"], "success");
    }

    let body = post_order(
        &server,
        json!({"userid": "c", "type": "1", "address": "X", "start": "2018-12-05T18:00"}),
    )
    .await;
    assert_eq!(
        body,
        json!({"status": "error", "message": "404 - Out of memory"})
    );
}

#[tokio::test]
async fn test_register_user() {
    let server = TestServer::spawn().await;
    let resp = server
        .client
        .post(server.url("/users"))
        .json(&json!({"userid": "u1"}))
        .send()
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(resp.json::<Value>().await.unwrap(), json!({"status": "success"}));
}

#[tokio::test]
async fn test_bad_date_rejected() {
    let server = TestServer::spawn().await;
    let resp = server
        .client
        .post(server.url("/orders"))
        .json(&json!({"userid": "u1", "type": "1", "address": "X", "start": "05/12/2018"}))
        .send()
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["status"], "error");
}

#[tokio::test]
async fn test_cors_headers_present() {
    let server = TestServer::spawn().await;
    let resp = server
        .client
        .get(server.url("/orders?userid=u1"))
        .header("origin", "http://localhost:8080")
        .send()
        .await
        .unwrap();

    assert_eq!(
        resp.headers().get("access-control-allow-origin").unwrap(),
        "*"
    );
}
