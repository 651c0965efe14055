mod common;

use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode, header},
};
use common::{harness, make_jwt, now_ts};
use pandora_helper::db::{Repository, Share};
use pandora_helper::server::router::{AppState, helper_router};
use serde_json::{Value, json};
use std::sync::Arc;
use tower::ServiceExt;

fn app(services: pandora_helper::service::Services) -> Router {
    let state = AppState::new(services, Arc::from("pwd"));
    helper_router(state)
}

fn json_request(method: &str, uri: &str, token: Option<&str>, body: Value) -> Request<Body> {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json");
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    builder
        .body(Body::from(body.to_string()))
        .expect("build request")
}

async fn body_json(resp: axum::response::Response) -> Value {
    let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX)
        .await
        .expect("read body");
    serde_json::from_slice(&bytes).expect("json body")
}

async fn admin_token(app: &Router) -> String {
    let resp = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/login",
            None,
            json!({ "password": "pwd" }),
        ))
        .await
        .expect("login");
    assert_eq!(resp.status(), StatusCode::OK);
    body_json(resp).await["token"]
        .as_str()
        .expect("token string")
        .to_string()
}

#[tokio::test]
async fn admin_routes_reject_missing_or_wrong_token() {
    let h = harness("routes-unauthorized", false).await;
    let app = app(h.services);

    let resp = app
        .clone()
        .oneshot(
            Request::builder()
                .uri("/api/account/1")
                .body(Body::empty())
                .expect("build request"),
        )
        .await
        .expect("request");
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(body_json(resp).await["error"], "unauthorized");

    let resp = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/share/search",
            Some("not-the-token"),
            json!({}),
        ))
        .await
        .expect("request");
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn wrong_admin_password_is_rejected() {
    let h = harness("routes-bad-login", false).await;
    let app = app(h.services);

    let resp = app
        .oneshot(json_request(
            "POST",
            "/api/login",
            None,
            json!({ "password": "nope" }),
        ))
        .await
        .expect("login");
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(resp).await["error"]["code"], "VALIDATION_ERROR");
}

#[tokio::test]
async fn admin_can_add_and_read_accounts_without_leaking_passwords() {
    let h = harness("routes-account", false).await;
    let app = app(h.services);
    let token = admin_token(&app).await;

    let resp = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/account/add",
            Some(&token),
            json!({
                "accountType": "chatgpt",
                "email": "owner@example.com",
                "password": "secret",
                "accessToken": make_jwt(now_ts() + 3_600),
            }),
        ))
        .await
        .expect("add account");
    assert_eq!(resp.status(), StatusCode::OK);
    let created = body_json(resp).await;
    let id = created["id"].as_i64().expect("id");
    assert!(created.get("password").is_none());

    let resp = app
        .clone()
        .oneshot(
            Request::builder()
                .uri(format!("/api/account/{id}"))
                .header(header::AUTHORIZATION, format!("Bearer {token}"))
                .body(Body::empty())
                .expect("build request"),
        )
        .await
        .expect("get account");
    assert_eq!(resp.status(), StatusCode::OK);
    let fetched = body_json(resp).await;
    assert_eq!(fetched["email"], "owner@example.com");
    assert!(fetched.get("password").is_none());

    let resp = app
        .oneshot(json_request(
            "POST",
            "/api/account/add",
            Some(&token),
            json!({ "accountType": "gemini", "email": "x@example.com" }),
        ))
        .await
        .expect("add account");
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn missing_account_maps_to_404() {
    let h = harness("routes-404", false).await;
    let app = app(h.services);
    let token = admin_token(&app).await;

    let resp = app
        .oneshot(
            Request::builder()
                .uri("/api/account/999")
                .header(header::AUTHORIZATION, format!("Bearer {token}"))
                .body(Body::empty())
                .expect("build request"),
        )
        .await
        .expect("get account");
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    assert_eq!(body_json(resp).await["error"]["code"], "NOT_FOUND");
}

#[tokio::test]
async fn public_account_list_is_empty_when_self_service_is_off() {
    let h = harness("routes-share-accounts", false).await;
    let app = app(h.services);

    let resp = app
        .oneshot(
            Request::builder()
                .uri("/api/share/accounts")
                .body(Body::empty())
                .expect("build request"),
        )
        .await
        .expect("list");
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(
        body_json(resp).await,
        json!({ "accounts": [], "custom": false, "random": false })
    );
}

#[tokio::test]
async fn share_login_checks_password_and_returns_login_url() {
    let h = harness("routes-share-login", false).await;
    h.repo
        .create_share(&Share {
            account_id: 1,
            unique_name: "alice".to_string(),
            share_token: "fk-alice".to_string(),
            password: "hunter2".to_string(),
            ..Default::default()
        })
        .await
        .expect("create share");
    let upstream = h.upstream.clone();
    let app = app(h.services);

    let resp = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/share/login",
            None,
            json!({ "username": "alice", "password": "wrong" }),
        ))
        .await
        .expect("login");
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let resp = app
        .oneshot(json_request(
            "POST",
            "/api/share/login",
            None,
            json!({ "username": "alice", "password": "hunter2" }),
        ))
        .await
        .expect("login");
    assert_eq!(resp.status(), StatusCode::OK);
    let url = body_json(resp).await["url"]
        .as_str()
        .expect("url")
        .to_string();
    assert!(url.ends_with("/auth/login_oauth?token=oauth-1"), "{url}");

    let oauth = upstream.requests_to("/api/auth/oauth_token");
    assert_eq!(oauth.len(), 1);
    assert_eq!(oauth[0].json()["share_token"], "fk-alice");
}

#[tokio::test]
async fn unknown_path_is_404() {
    let h = harness("routes-fallback", false).await;
    let app = app(h.services);

    let resp = app
        .oneshot(
            Request::builder()
                .uri("/nope")
                .body(Body::empty())
                .expect("build request"),
        )
        .await
        .expect("request");
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn admin_reads_single_share_and_shares_by_account() {
    let h = harness("routes-share-read", false).await;
    let mut ids = Vec::new();
    for (account_id, name) in [(3, "alice"), (3, "bob"), (4, "carol")] {
        let id = h
            .repo
            .create_share(&Share {
                account_id,
                unique_name: name.to_string(),
                password: "secret".to_string(),
                ..Default::default()
            })
            .await
            .expect("create share");
        ids.push(id);
    }
    let app = app(h.services);
    let token = admin_token(&app).await;

    let resp = app
        .clone()
        .oneshot(
            Request::builder()
                .uri(format!("/api/share/{}", ids[1]))
                .header(header::AUTHORIZATION, format!("Bearer {token}"))
                .body(Body::empty())
                .expect("build request"),
        )
        .await
        .expect("get share");
    assert_eq!(resp.status(), StatusCode::OK);
    let share = body_json(resp).await;
    assert_eq!(share["uniqueName"], "bob");
    assert!(share.get("password").is_none());

    let resp = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/share/by-account",
            Some(&token),
            json!({ "accountId": 3 }),
        ))
        .await
        .expect("shares by account");
    assert_eq!(resp.status(), StatusCode::OK);
    let names: Vec<String> = body_json(resp)
        .await
        .as_array()
        .expect("array")
        .iter()
        .map(|s| s["uniqueName"].as_str().expect("name").to_string())
        .collect();
    assert_eq!(names, vec!["alice".to_string(), "bob".to_string()]);

    let resp = app
        .oneshot(
            Request::builder()
                .uri("/api/share/999")
                .body(Body::empty())
                .expect("build request"),
        )
        .await
        .expect("get share");
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}
