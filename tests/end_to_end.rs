// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Full request flow through the public router: register, log in, own a
//! record, and watch another user bounce off it.

use axum::{
    body::{to_bytes, Body},
    http::{header, Request, StatusCode},
    response::Response,
    Router,
};
use chrono::Duration;
use serde_json::{json, Value};
use tempfile::TempDir;
use tower::ServiceExt;

use portfolio_server::{
    api::router,
    auth::{PasswordHasher, TokenService},
    resources::COLLECTIONS,
    state::AppState,
    storage::{DocumentStore, StoragePaths},
};

fn app() -> (Router, TempDir) {
    let temp_dir = TempDir::new().unwrap();
    let mut storage = DocumentStore::new(StoragePaths::new(temp_dir.path()));
    storage.initialize(COLLECTIONS).unwrap();

    let state = AppState::new(
        storage,
        TokenService::new(b"integration-secret-0123456789abcdef", Duration::days(7)),
        PasswordHasher::new(4),
    );
    (router(state, None), temp_dir)
}

async fn send(app: &Router, request: Request<Body>) -> Response {
    app.clone().oneshot(request).await.unwrap()
}

async fn json_body(response: Response) -> Value {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

fn json_request(method: &str, uri: &str, token: Option<&str>, body: Option<Value>) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    }
}

async fn register_and_login(app: &Router, username: &str) -> String {
    let response = send(
        app,
        json_request(
            "POST",
            "/v1/users",
            None,
            Some(json!({
                "username": username,
                "email": format!("{username}@example.com"),
                "password": "s3cret!!",
            })),
        ),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);

    let response = send(
        app,
        Request::post("/v1/auth/login")
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(Body::from(format!("username={username}&password=s3cret%21%21")))
            .unwrap(),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    let body = json_body(response).await;
    assert_eq!(body["token_type"], "bearer");
    body["access_token"].as_str().unwrap().to_string()
}

#[tokio::test]
async fn owner_controls_record_lifecycle() {
    let (app, _dir) = app();
    let alice = register_and_login(&app, "alice").await;
    let bob = register_and_login(&app, "bobby").await;

    let response = send(
        &app,
        json_request("POST", "/v1/skills", Some(&alice), Some(json!({"name": "Go"}))),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let body = json_body(response).await;
    assert_eq!(body["message"], "Skill created successfully");
    let id = body["id"].as_str().unwrap().to_string();
    let uri = format!("/v1/skills/{id}");

    let response = send(&app, json_request("GET", &uri, Some(&bob), None)).await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let response = send(&app, json_request("GET", &uri, Some(&alice), None)).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(json_body(response).await["name"], "Go");

    let response = send(&app, json_request("DELETE", &uri, Some(&alice), None)).await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let response = send(&app, json_request("GET", &uri, Some(&alice), None)).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn same_key_is_allowed_across_owners() {
    let (app, _dir) = app();
    let alice = register_and_login(&app, "alice").await;
    let bob = register_and_login(&app, "bobby").await;

    for token in [&alice, &bob] {
        let response = send(
            &app,
            json_request("POST", "/v1/skills", Some(token), Some(json!({"name": "Rust"}))),
        )
        .await;
        assert_eq!(response.status(), StatusCode::CREATED);
    }

    let response = send(
        &app,
        json_request("POST", "/v1/skills", Some(&alice), Some(json!({"name": "rust"}))),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CONFLICT);

    let response = send(&app, json_request("GET", "/v1/skills", Some(&bob), None)).await;
    let listed = json_body(response).await;
    assert_eq!(listed.as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn requests_without_valid_token_are_401() {
    let (app, _dir) = app();

    let response = send(&app, json_request("GET", "/v1/projects", None, None)).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(response.headers()[header::WWW_AUTHENTICATE], "Bearer");

    let response = send(&app, json_request("GET", "/v1/projects", Some("not-a-token"), None)).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn public_endpoints_answer_without_token() {
    let (app, _dir) = app();

    let response = send(&app, json_request("GET", "/", None, None)).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(json_body(response).await["message"], "Welcome to the Portfolio API.");

    let response = send(&app, json_request("GET", "/health", None, None)).await;
    assert_eq!(response.status(), StatusCode::OK);

    let response = send(&app, json_request("GET", "/v1/users/count", None, None)).await;
    assert_eq!(json_body(response).await["total_users"], 0);
}

#[tokio::test]
async fn reused_username_starts_empty_and_old_token_stays_dead() {
    let (app, _dir) = app();
    let old_token = register_and_login(&app, "alice").await;

    let created = json_body(
        send(
            &app,
            json_request("POST", "/v1/skills", Some(&old_token), Some(json!({"name": "Go"}))),
        )
        .await,
    )
    .await;
    let skill_uri = format!("/v1/skills/{}", created["id"].as_str().unwrap());

    let me = json_body(send(&app, json_request("GET", "/v1/users/me", Some(&old_token), None)).await).await;
    let response = send(
        &app,
        json_request("DELETE", &format!("/v1/users/{}", me["id"].as_str().unwrap()), Some(&old_token), None),
    )
    .await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let new_token = register_and_login(&app, "alice").await;

    let response = send(&app, json_request("GET", &skill_uri, Some(&new_token), None)).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let listed = json_body(send(&app, json_request("GET", "/v1/skills", Some(&new_token), None)).await).await;
    assert_eq!(listed, json!([]));

    // The same name can be created again by the new owner.
    let response = send(
        &app,
        json_request("POST", "/v1/skills", Some(&new_token), Some(json!({"name": "Go"}))),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);

    for uri in ["/v1/skills", skill_uri.as_str(), "/v1/users/me"] {
        let response = send(&app, json_request("GET", uri, Some(&old_token), None)).await;
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED, "{uri}");
    }
}
