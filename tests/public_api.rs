// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

mod common;

use std::time::Duration;

use axum::{
    body::{Body, Bytes},
    extract::Json as ExtractJson,
    http::{header::CONTENT_TYPE, HeaderName, Method, Request, StatusCode},
    routing::post,
    Json, Router,
};
use serde_json::{json, Value};
use solkit_api::{
    clock::Clock,
    config::AppConfig,
    ratelimit::GENERAL_LIMIT,
    storage::{AnalyticsRepository, StatsRepository},
};

use common::{request, TestApp, CLIENT_IP, WALLET};

#[tokio::test]
async fn repeated_reclaims_accumulate_per_wallet() {
    let app = TestApp::new();
    let report = json!({"solReclaimed": 0.5, "accountsClosed": 3, "wallet": WALLET});

    let (status, body) = app
        .json(request(Method::POST, "/api/stats", Some(report.clone())))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"ok": true}));

    app.clock.advance(Duration::from_secs(5));
    let second_at = app.clock.now_ms();
    let (status, _) = app
        .json(request(Method::POST, "/api/stats", Some(report)))
        .await;
    assert_eq!(status, StatusCode::OK);

    let (_, global) = app.json(request(Method::GET, "/api/stats", None)).await;
    assert_eq!(global["totalAccountsClosed"], 6);
    assert_eq!(global["totalWallets"], 1);
    assert!((global["totalSolReclaimed"].as_f64().unwrap() - 1.0).abs() < 1e-9);

    let stats = StatsRepository::new(app.state.kv.as_ref());
    let wallet = stats
        .wallet(&solkit_api::models::SolanaAddress::parse(WALLET).unwrap())
        .await
        .unwrap();
    assert_eq!(wallet.uses, 2);

    let (_, recent) = app
        .json(request(Method::GET, "/api/stats/recent", None))
        .await;
    let recent = recent.as_array().unwrap();
    assert_eq!(recent.len(), 2);
    assert_eq!(recent[0]["timestamp"], second_at);
    assert_ne!(recent[0]["wallet"], WALLET);
}

#[tokio::test]
async fn invalid_reclaim_is_rejected() {
    let app = TestApp::new();

    let (status, body) = app
        .json(request(
            Method::POST,
            "/api/stats",
            Some(json!({"solReclaimed": -1, "accountsClosed": 3, "wallet": WALLET})),
        ))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].is_string());

    let (status, _) = app
        .json(request(
            Method::POST,
            "/api/stats",
            Some(json!({"solReclaimed": 1, "accountsClosed": 3, "wallet": "not-a-wallet"})),
        ))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let malformed = Request::builder()
        .method(Method::POST)
        .uri("/api/stats")
        .header("cf-connecting-ip", CLIENT_IP)
        .body(Body::from("{not json"))
        .unwrap();
    let (status, body) = app.json(malformed).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Invalid JSON body");

    let (_, global) = app.json(request(Method::GET, "/api/stats", None)).await;
    assert_eq!(global["totalWallets"], 0);
}

#[tokio::test]
async fn analytics_endpoints_count_and_validate() {
    let app = TestApp::new();

    let (status, _) = app
        .json(request(
            Method::POST,
            "/api/analytics/heartbeat",
            Some(json!({"sessionId": "abc-123"})),
        ))
        .await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = app
        .json(request(
            Method::POST,
            "/api/analytics/heartbeat",
            Some(json!({"sessionId": ""})),
        ))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let mut view = request(
        Method::POST,
        "/api/analytics/pageview",
        Some(json!({"page": "/reclaim"})),
    );
    view.headers_mut()
        .insert("cf-ipcountry", "DE".parse().unwrap());
    let (status, _) = app.json(view).await;
    assert_eq!(status, StatusCode::OK);

    // sendBeacon posts with an empty body and no content type.
    let beacon = Request::builder()
        .method(Method::POST)
        .uri("/api/analytics/pageview")
        .body(Body::empty())
        .unwrap();
    let (status, _) = app.json(beacon).await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = app
        .json(request(
            Method::POST,
            "/api/analytics/social",
            Some(json!({"button": "telegram"})),
        ))
        .await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = app
        .json(request(
            Method::POST,
            "/api/analytics/social",
            Some(json!({"button": "myspace"})),
        ))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Invalid button");

    let analytics = AnalyticsRepository::new(app.state.kv.as_ref());
    let today = app.clock.today();
    let views = analytics.daily_views(today).await.unwrap();
    assert_eq!(views.total, 2);
    assert_eq!(views.pages.get("/reclaim"), Some(&1));
    assert_eq!(views.countries.get("DE"), Some(&1));
    assert_eq!(views.countries.get("XX"), Some(&1));
    assert_eq!(analytics.active_visitors().await.unwrap(), 1);
}

#[tokio::test]
async fn general_limit_applies_to_public_writes() {
    let app = TestApp::new();
    let body = json!({"button": "x"});

    for _ in 0..GENERAL_LIMIT {
        let (status, _) = app
            .json(request(Method::POST, "/api/analytics/social", Some(body.clone())))
            .await;
        assert_eq!(status, StatusCode::OK);
    }

    let (status, body) = app
        .json(request(Method::POST, "/api/analytics/social", Some(body)))
        .await;
    assert_eq!(status, StatusCode::TOO_MANY_REQUESTS);
    assert_eq!(body["error"], "Too many requests");

    // Reads are not limited.
    let (status, _) = app.json(request(Method::GET, "/api/stats", None)).await;
    assert_eq!(status, StatusCode::OK);

    app.clock.advance(Duration::from_secs(61));
    let (status, _) = app
        .json(request(
            Method::POST,
            "/api/analytics/social",
            Some(json!({"button": "x"})),
        ))
        .await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn rpc_batch_with_disallowed_method_is_rejected() {
    let app = TestApp::new();
    let batch = json!([
        {"jsonrpc": "2.0", "id": 1, "method": "getBalance", "params": [WALLET]},
        {"jsonrpc": "2.0", "id": 2, "method": "requestAirdrop", "params": [WALLET, 1]},
        {"jsonrpc": "2.0", "id": 3, "method": "getSlot"}
    ]);

    let (status, body) = app
        .json(request(Method::POST, "/api/rpc", Some(batch)))
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert!(body["error"].as_str().unwrap().contains("requestAirdrop"));
}

#[tokio::test]
async fn rpc_without_upstream_is_unavailable() {
    let app = TestApp::new();
    let call = json!({"jsonrpc": "2.0", "id": 1, "method": "getSlot"});

    let (status, _) = app
        .json(request(Method::POST, "/api/rpc", Some(call)))
        .await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);

    let (status, _) = app
        .json(request(Method::POST, "/api/rpc", Some(json!([]))))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

async fn fake_upstream(ExtractJson(body): ExtractJson<Value>) -> (StatusCode, Json<Value>) {
    let id = body["id"].clone();
    (
        StatusCode::OK,
        Json(json!({"jsonrpc": "2.0", "id": id, "result": 4242})),
    )
}

async fn failing_upstream() -> (StatusCode, [(HeaderName, &'static str); 1], &'static str) {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        [(CONTENT_TYPE, "application/json")],
        UPSTREAM_ERROR_BODY,
    )
}

async fn echo_upstream(body: Bytes) -> ([(HeaderName, &'static str); 1], Bytes) {
    ([(CONTENT_TYPE, "application/json")], body)
}

const UPSTREAM_ERROR_BODY: &str =
    r#"{"jsonrpc":"2.0","id":1,"error":{"code":-32603,"message":"Internal error"}}"#;

/// Serve `upstream` on a loopback port and return its URL.
async fn spawn_upstream(upstream: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, upstream).await.unwrap();
    });
    format!("http://{addr}/")
}

async fn app_with_upstream(upstream: Router) -> TestApp {
    let url = spawn_upstream(upstream).await;
    TestApp::with_config(AppConfig::default().with_rpc_upstream(url))
}

fn raw_rpc_request(body: &'static str) -> Request<Body> {
    Request::builder()
        .method(Method::POST)
        .uri("/api/rpc")
        .header("cf-connecting-ip", CLIENT_IP)
        .header(CONTENT_TYPE, "application/json")
        .body(Body::from(body))
        .unwrap()
}

#[tokio::test]
async fn rpc_forwards_allowed_calls_unchanged() {
    let app = app_with_upstream(Router::new().route("/", post(fake_upstream))).await;

    let response = app
        .send(request(
            Method::POST,
            "/api/rpc",
            Some(json!({"jsonrpc": "2.0", "id": 7, "method": "getSlot"})),
        ))
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()["content-type"], "application/json");

    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let body: Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(body, json!({"jsonrpc": "2.0", "id": 7, "result": 4242}));
}

#[tokio::test]
async fn rpc_relays_upstream_error_status_and_body() {
    let app = app_with_upstream(Router::new().route("/", post(failing_upstream))).await;

    let response = app
        .send(raw_rpc_request(r#"{"jsonrpc":"2.0","id":1,"method":"getSlot"}"#))
        .await;
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(response.headers()["content-type"], "application/json");

    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    assert_eq!(&bytes[..], UPSTREAM_ERROR_BODY.as_bytes());
}

#[tokio::test]
async fn rpc_batch_reaches_upstream_byte_for_byte() {
    let app = app_with_upstream(Router::new().route("/", post(echo_upstream))).await;
    // Irregular spacing and key order must survive the trip.
    let batch = r#"[ {"id":1, "jsonrpc":"2.0","method":"getBalance","params":["9WzDXwBbmkg8ZTbNMqUxvQRAyrZzDsGYdLVL9zYtAWWM"]},
  {"method":"getSlot","jsonrpc":"2.0","id":"two"} ]"#;

    let response = app.send(raw_rpc_request(batch)).await;
    assert_eq!(response.status(), StatusCode::OK);

    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    assert_eq!(&bytes[..], batch.as_bytes());
}

#[tokio::test]
async fn preflight_and_unknown_routes_carry_cors_headers() {
    let app = TestApp::with_config(AppConfig {
        cors_origin: "https://solkit.example".to_string(),
        ..AppConfig::default()
    });

    let preflight = Request::builder()
        .method(Method::OPTIONS)
        .uri("/api/rpc")
        .header("origin", "https://solkit.example")
        .header("access-control-request-method", "POST")
        .header("access-control-request-headers", "content-type")
        .body(Body::empty())
        .unwrap();
    let response = app.send(preflight).await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);
    assert_eq!(
        response.headers()["access-control-allow-origin"],
        "https://solkit.example"
    );
    assert!(response.headers()["access-control-allow-methods"]
        .to_str()
        .unwrap()
        .contains("POST"));
    assert_eq!(response.headers()["access-control-max-age"], "86400");

    // A bare OPTIONS without preflight headers is answered the same way.
    let bare = Request::builder()
        .method(Method::OPTIONS)
        .uri("/api/stats")
        .body(Body::empty())
        .unwrap();
    let response = app.send(bare).await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);
    assert_eq!(
        response.headers()["access-control-allow-origin"],
        "https://solkit.example"
    );

    let response = app
        .send(request(Method::GET, "/api/nothing-here", None))
        .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(
        response.headers()["access-control-allow-origin"],
        "https://solkit.example"
    );
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let body: Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(body, json!({"error": "Not found"}));
}

#[tokio::test]
async fn responses_carry_a_request_id() {
    let app = TestApp::new();
    let response = app.send(request(Method::GET, "/health/live", None)).await;
    assert_eq!(response.status(), StatusCode::OK);
    let id = response.headers()["x-request-id"].to_str().unwrap();
    assert!(uuid::Uuid::parse_str(id).is_ok());
}

#[tokio::test]
async fn health_reports_store_and_upstream() {
    let app = TestApp::new();
    let (status, body) = app.json(request(Method::GET, "/health/ready", None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    assert_eq!(body["checks"]["store"], "ok");
    assert_eq!(body["checks"]["rpc_upstream"], "not_configured");
}
