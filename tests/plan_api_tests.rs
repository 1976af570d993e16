// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Plan-building API tests: interval editing, validation surfacing, and the
//! refusal to upload an invalid plan before any network traffic.

use axum::{
    body::Body,
    http::{header, Request, StatusCode},
};
use serde_json::{json, Value};
use tower::ServiceExt;

mod common;

async fn body_json(response: axum::response::Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), 64 * 1024)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

fn request(method: &str, uri: &str, token: &str, body: Option<Value>) -> Request<Body> {
    let builder = Request::builder()
        .method(method)
        .uri(uri)
        .header(header::AUTHORIZATION, format!("Bearer {}", token));
    match body {
        Some(v) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(v.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    }
}

#[tokio::test]
async fn test_interval_editing_preserves_order() {
    let (app, state) = common::create_test_app();
    let (_, token) = common::insert_session(&state, common::test_credential(3600));

    for name in ["Warm Up", "Tempo", "Cool Down"] {
        let kind = match name {
            "Warm Up" => "warmup",
            "Tempo" => "active",
            _ => "cooldown",
        };
        let response = app
            .clone()
            .oneshot(request(
                "POST",
                "/api/plan/intervals",
                &token,
                Some(json!({
                    "name": name,
                    "kind": kind,
                    "duration_secs": 300,
                    "target": { "percent": 100.0 }
                })),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    // Swap first and last, then drop the middle one.
    let response = app
        .clone()
        .oneshot(request(
            "POST",
            "/api/plan/intervals/reorder",
            &token,
            Some(json!({ "a": 0, "b": 2 })),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = app
        .clone()
        .oneshot(request("DELETE", "/api/plan/intervals/1", &token, None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = app
        .oneshot(request("GET", "/api/plan", &token, None))
        .await
        .unwrap();
    let body = body_json(response).await;

    let names: Vec<&str> = body["plan"]["intervals"]
        .as_array()
        .unwrap()
        .iter()
        .map(|i| i["name"].as_str().unwrap())
        .collect();
    assert_eq!(names, ["Cool Down", "Warm Up"]);
    assert_eq!(body["total_duration_secs"], 600);
}

#[tokio::test]
async fn test_remove_out_of_range_is_bad_request() {
    let (app, state) = common::create_test_app();
    let (_, token) = common::insert_session(&state, common::test_credential(3600));

    let response = app
        .oneshot(request("DELETE", "/api/plan/intervals/5", &token, None))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response).await;
    assert_eq!(body["error"], "bad_request");
}

#[tokio::test]
async fn test_threshold_round_trips_as_pace_string() {
    let (app, state) = common::create_test_app();
    let (_, token) = common::insert_session(&state, common::test_credential(3600));

    let response = app
        .clone()
        .oneshot(request(
            "PUT",
            "/api/plan/threshold",
            &token,
            Some(json!({ "threshold": "7:30" })),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["threshold"], "7:30");
}

#[tokio::test]
async fn test_upload_invalid_plan_returns_all_violations() {
    let (app, state) = common::create_test_app();
    let (_, token) = common::insert_session(&state, common::test_credential(3600));

    // One recovery interval with zero duration: no Active interval AND a
    // zero duration. No stub Wahoo server exists here, so this also proves
    // the refusal happens before any network call.
    let response = app
        .clone()
        .oneshot(request(
            "POST",
            "/api/plan/intervals",
            &token,
            Some(json!({
                "name": "Jog",
                "kind": "recovery",
                "duration_secs": 0,
                "target": { "percent": 80.0 }
            })),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = app
        .oneshot(request("POST", "/api/plan/upload", &token, None))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let body = body_json(response).await;
    assert_eq!(body["error"], "plan_invalid");

    let violations: Vec<&str> = body["violations"]
        .as_array()
        .unwrap()
        .iter()
        .map(|v| v.as_str().unwrap())
        .collect();
    assert_eq!(violations.len(), 2);
    assert!(violations.iter().any(|v| v.contains("no Active interval")));
    assert!(violations.iter().any(|v| v.contains("interval 0")));
}

#[tokio::test]
async fn test_upload_without_threshold_is_invalid_configuration() {
    let (app, state) = common::create_test_app();
    let (_, token) = common::insert_session(&state, common::test_credential(3600));

    // Valid plan, but the session never set a threshold pace. Refused
    // before any network call, like validation.
    let response = app
        .clone()
        .oneshot(request(
            "POST",
            "/api/plan/intervals",
            &token,
            Some(json!({
                "name": "Tempo",
                "kind": "active",
                "duration_secs": 600,
                "target": { "pace": "6:30" }
            })),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = app
        .oneshot(request("POST", "/api/plan/upload", &token, None))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response).await;
    assert_eq!(body["error"], "invalid_configuration");
}
