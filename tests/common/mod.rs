// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

#![allow(dead_code)]

use std::sync::Arc;

use axum::{
    body::{to_bytes, Body},
    http::{Method, Request, Response, StatusCode},
    Router,
};
use chrono::NaiveDate;
use serde_json::Value;
use solkit_api::{api::router, clock::ManualClock, config::AppConfig, state::AppState};
use tower::ServiceExt;

pub const ADMIN_TOKEN: &str = "test-admin-token";
pub const CLIENT_IP: &str = "203.0.113.7";
pub const WALLET: &str = "9WzDXwBbmkg8ZTbNMqUxvQRAyrZzDsGYdLVL9zYtAWWM";

pub struct TestApp {
    pub state: AppState,
    pub clock: Arc<ManualClock>,
    pub app: Router,
}

impl TestApp {
    pub fn new() -> Self {
        Self::with_config(AppConfig::default().with_admin_token(ADMIN_TOKEN))
    }

    pub fn with_config(config: AppConfig) -> Self {
        let date = NaiveDate::from_ymd_opt(2026, 3, 14).unwrap();
        let clock = Arc::new(ManualClock::at_date(date));
        // Noon, so day boundaries are not crossed by small advances.
        clock.advance(std::time::Duration::from_secs(12 * 3600));
        let state = AppState::with_clock(config, clock.clone()).unwrap();
        let app = router(state.clone());
        Self { state, clock, app }
    }

    pub async fn send(&self, request: Request<Body>) -> Response<Body> {
        self.app.clone().oneshot(request).await.unwrap()
    }

    pub async fn json(&self, request: Request<Body>) -> (StatusCode, Value) {
        let response = self.send(request).await;
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, value)
    }
}

pub fn request(method: Method, uri: &str, body: Option<Value>) -> Request<Body> {
    let builder = Request::builder()
        .method(method)
        .uri(uri)
        .header("cf-connecting-ip", CLIENT_IP)
        .header("content-type", "application/json");
    match body {
        Some(body) => builder.body(Body::from(body.to_string())).unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    }
}

pub fn admin_request(method: Method, uri: &str, token: &str, body: Option<Value>) -> Request<Body> {
    let mut req = request(method, uri, body);
    req.headers_mut()
        .insert("authorization", format!("Bearer {token}").parse().unwrap());
    req
}
