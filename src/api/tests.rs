//! Router tests against an in-process fake Tradovate.

use super::*;
use crate::config::{Environment, OAuthConfig, TradovateConfig};
use crate::tradovate::build_http_client;
use axum::body::Body;
use axum::http::{HeaderMap, Request, StatusCode, header};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::Json;
use axum::extract::Query;
use chrono::DateTime;
use serde_json::{Value, json};
use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;
use tower::ServiceExt;

const EXPIRED: &str = "Bearer expired";

type Posted = Arc<Mutex<Vec<Value>>>;

fn expired(headers: &HeaderMap) -> bool {
    headers
        .get(header::AUTHORIZATION)
        .is_some_and(|v| v.as_bytes() == EXPIRED.as_bytes())
}

fn unauthorized() -> Response {
    (StatusCode::UNAUTHORIZED, "Unauthorized").into_response()
}

fn fake_tradovate(posted: Posted) -> Router {
    Router::new()
        .route(
            "/v1/account/list",
            get(|headers: HeaderMap| async move {
                if expired(&headers) {
                    return unauthorized();
                }
                Json(json!([
                    { "id": 1, "name": "DEMO1", "userId": 10, "accountType": "Customer", "active": true }
                ]))
                .into_response()
            }),
        )
        .route(
            "/v1/account/item",
            get(|headers: HeaderMap, Query(query): Query<HashMap<String, String>>| async move {
                if expired(&headers) {
                    return unauthorized();
                }
                match query.get("id").map(String::as_str) {
                    Some("1") => Json(json!(
                        { "id": 1, "name": "DEMO1", "userId": 10, "accountType": "Customer", "active": true }
                    ))
                    .into_response(),
                    _ => (StatusCode::NOT_FOUND, "Not found").into_response(),
                }
            }),
        )
        .route(
            "/v1/userAccountAutoLiq/deps",
            get(|headers: HeaderMap| async move {
                if expired(&headers) {
                    return unauthorized();
                }
                Json(json!([{ "id": 10, "dailyLossAutoLiq": 500, "doNotUnlock": true }])).into_response()
            }),
        )
        .route(
            "/v1/permissionedAccountAutoLiq/deps",
            get(|headers: HeaderMap| async move {
                if expired(&headers) {
                    return unauthorized();
                }
                Json(json!([{ "id": 20, "dailyLossAutoLiq": 200 }])).into_response()
            }),
        )
        .route(
            "/v1/userAccountAutoLiq/updateuserautoliq",
            post(move |headers: HeaderMap, Json(body): Json<Value>| {
                let posted = posted.clone();
                async move {
                    if expired(&headers) {
                        return unauthorized();
                    }
                    posted.lock().unwrap().push(body.clone());
                    let mut record = body.as_object().cloned().unwrap_or_default();
                    record.remove("accountId");
                    record.remove("doNotUnlock");
                    record.insert("id".to_string(), json!(20));
                    Json(json!({ "permissionedAccountAutoLiq": record })).into_response()
                }
            }),
        )
        .route(
            "/v1/auth/oauthtoken",
            post(|Json(body): Json<Value>| async move {
                if body["code"] == "bad" {
                    return Json(json!({ "error": "invalid_grant", "error_description": "code expired" }));
                }
                Json(json!({ "access_token": "oauth-token", "expires_in": 4800 }))
            }),
        )
}

struct Harness {
    app: Router,
    posted: Posted,
}

async fn harness() -> Harness {
    let posted: Posted = Arc::new(Mutex::new(Vec::new()));

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let upstream = fake_tradovate(posted.clone());
    tokio::spawn(async move {
        axum::serve(listener, upstream).await.unwrap();
    });
    let base_url = format!("http://{}/v1", addr);

    let http_client = build_http_client().unwrap();
    let tradovate = TradovateConfig {
        environment: Environment::Demo,
        base_url: Some(base_url.clone()),
        access_token: String::new(),
    };
    let oauth = OAuthConfig {
        enabled: true,
        authorize_url: None,
        redirect_uri: Some("http://localhost:4000/oauth/callback".to_string()),
        client_id: "cid".to_string(),
        client_secret: "sec".to_string(),
    };

    let state = AppState {
        service: "tradovate-risk".to_string(),
        sessions: Arc::new(SessionStore::new(
            tradovate,
            Some(Duration::from_secs(30)),
            http_client.clone(),
        )),
        oauth: Some(Arc::new(OAuthClient::new(oauth, &base_url, http_client))),
    };

    Harness {
        app: router(state),
        posted,
    }
}

async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, body)
}

fn get_req(uri: &str, headers: &[(&str, &str)]) -> Request<Body> {
    let mut builder = Request::builder().method("GET").uri(uri);
    for (k, v) in headers {
        builder = builder.header(*k, *v);
    }
    builder.body(Body::empty()).unwrap()
}

fn json_req(method: &str, uri: &str, headers: &[(&str, &str)], body: &str) -> Request<Body> {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json");
    for (k, v) in headers {
        builder = builder.header(*k, *v);
    }
    builder.body(Body::from(body.to_string())).unwrap()
}

async fn connect(app: &Router, role: &str) -> String {
    let body = json!({ "accessToken": "tok", "role": role }).to_string();
    let (status, body) = send(app, json_req("POST", "/connect", &[], &body)).await;
    assert_eq!(status, StatusCode::OK);
    body["sessionId"].as_str().unwrap().to_string()
}

// ==================== Health and session tests ====================

#[tokio::test]
async fn test_health() {
    let h = harness().await;

    let (status, body) = send(&h.app, get_req("/health", &[])).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    assert_eq!(body["service"], "tradovate-risk");
    assert!(body["timestamp"].is_string());
}

#[tokio::test]
async fn test_connect_requires_token() {
    let h = harness().await;

    let (status, body) = send(&h.app, json_req("POST", "/connect", &[], "{}")).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);
    assert!(body["error"].as_str().unwrap().contains("access token"));
}

#[tokio::test]
async fn test_connect_rejects_unknown_environment() {
    let h = harness().await;
    let body = json!({ "accessToken": "tok", "environment": "paper" }).to_string();

    let (status, _) = send(&h.app, json_req("POST", "/connect", &[], &body)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_connect_status_and_disconnect() {
    let h = harness().await;
    let body = json!({ "accessToken": "tok", "environment": "live", "role": "owner" }).to_string();

    let (status, connected) = send(&h.app, json_req("POST", "/connect", &[], &body)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(connected["success"], true);
    assert_eq!(connected["connected"], true);
    assert_eq!(connected["environment"], "live");
    assert_eq!(connected["role"], "owner");
    let id = connected["sessionId"].as_str().unwrap().to_string();

    let (_, status_body) = send(&h.app, get_req("/connect", &[(SESSION_HEADER, id.as_str())])).await;
    assert_eq!(status_body["connected"], true);
    assert_eq!(status_body["role"], "owner");

    let (status, gone) = send(
        &h.app,
        Request::builder()
            .method("DELETE")
            .uri("/connect")
            .header(SESSION_HEADER, id.as_str())
            .body(Body::empty())
            .unwrap(),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(gone["connected"], false);

    let (status, body) = send(&h.app, get_req("/accounts", &[(SESSION_HEADER, id.as_str())])).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(body["error"].as_str().unwrap().contains("not connected"));
}

#[tokio::test]
async fn test_connect_status_without_session() {
    let h = harness().await;

    let (status, body) = send(&h.app, get_req("/connect", &[])).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["connected"], false);
    assert_eq!(body["environment"], "demo");
}

#[tokio::test]
async fn test_request_without_credentials_is_not_connected() {
    let h = harness().await;

    let (status, body) = send(&h.app, get_req("/risk/1", &[])).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["success"], false);
}

// ==================== Account tests ====================

#[tokio::test]
async fn test_accounts_with_session() {
    let h = harness().await;
    let id = connect(&h.app, "owner").await;

    let (status, body) = send(&h.app, get_req("/accounts", &[(SESSION_HEADER, id.as_str())])).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(body["accounts"][0]["name"], "DEMO1");
}

#[tokio::test]
async fn test_accounts_with_expired_bearer() {
    let h = harness().await;

    let (status, body) = send(&h.app, get_req("/accounts", &[("authorization", EXPIRED)])).await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["success"], false);
    assert_eq!(body["code"], "TOKEN_EXPIRED");
}

#[tokio::test]
async fn test_account_by_id() {
    let h = harness().await;
    let id = connect(&h.app, "owner").await;

    let (status, body) = send(&h.app, get_req("/accounts/1", &[(SESSION_HEADER, id.as_str())])).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(body["account"]["name"], "DEMO1");

    let (status, _) = send(&h.app, get_req("/accounts/abc", &[(SESSION_HEADER, id.as_str())])).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = send(&h.app, get_req("/accounts/99", &[(SESSION_HEADER, id.as_str())])).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["success"], false);
}

// ==================== Risk read tests ====================

#[tokio::test]
async fn test_get_risk_merges_records() {
    let h = harness().await;
    let id = connect(&h.app, "owner").await;

    let (status, body) = send(&h.app, get_req("/risk/1", &[(SESSION_HEADER, id.as_str())])).await;

    assert_eq!(status, StatusCode::OK);
    let settings = &body["settings"];
    assert_eq!(settings["dailyLossAutoLiq"].as_f64(), Some(200.0));
    assert_eq!(settings["doNotUnlock"], true);
    assert_eq!(settings["ownerId"], 10);
    assert_eq!(settings["permissionedId"], 20);

    let (_, status_body) = send(&h.app, get_req("/connect", &[(SESSION_HEADER, id.as_str())])).await;
    assert_eq!(status_body["cachedAccounts"], 1);
}

#[tokio::test]
async fn test_get_risk_reports_cache_hits() {
    let h = harness().await;
    let id = connect(&h.app, "owner").await;
    let headers = [(SESSION_HEADER, id.as_str())];

    let (_, first) = send(&h.app, get_req("/risk/1", &headers)).await;
    let (_, second) = send(&h.app, get_req("/risk/1", &headers)).await;

    assert_eq!(first["cached"], false);
    assert_eq!(second["cached"], true);
    assert_eq!(first["settings"], second["settings"]);
}

#[tokio::test]
async fn test_bearer_reads_are_never_cached() {
    let h = harness().await;
    let headers = [("authorization", "Bearer tok")];

    send(&h.app, get_req("/risk/1", &headers)).await;
    let (status, body) = send(&h.app, get_req("/risk/1", &headers)).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["cached"], false);
}

#[tokio::test]
async fn test_get_risk_rejects_non_numeric_id() {
    let h = harness().await;

    let (status, body) = send(&h.app, get_req("/risk/abc", &[("authorization", "Bearer tok")])).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("invalid account id"));
}

#[tokio::test]
async fn test_get_risk_with_expired_token_has_no_settings() {
    let h = harness().await;

    let (status, body) = send(&h.app, get_req("/risk/1", &[("authorization", EXPIRED)])).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert!(body["settings"].is_null());
}

// ==================== Risk write tests ====================

#[tokio::test]
async fn test_post_risk_permissioned_filters_owner_fields() {
    let h = harness().await;
    let body = json!({ "dailyLossAutoLiq": 300, "doNotUnlock": true }).to_string();

    let (status, resp) = send(
        &h.app,
        json_req("POST", "/risk/42", &[("authorization", "Bearer tok")], &body),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(resp["settings"]["dailyLossAutoLiq"].as_f64(), Some(300.0));
    assert_eq!(resp["settings"]["permissionedId"], 20);

    let posted = h.posted.lock().unwrap().clone();
    assert_eq!(posted, vec![json!({ "accountId": 42, "dailyLossAutoLiq": 300 })]);
}

#[tokio::test]
async fn test_post_risk_owner_forwards_do_not_unlock() {
    let h = harness().await;
    let body = json!({ "dailyLossAutoLiq": 300, "doNotUnlock": true }).to_string();

    let (status, _) = send(
        &h.app,
        json_req(
            "POST",
            "/risk/42",
            &[("authorization", "Bearer tok"), (CALLER_ROLE_HEADER, "owner")],
            &body,
        ),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    let posted = h.posted.lock().unwrap().clone();
    assert_eq!(posted[0]["doNotUnlock"], true);
}

#[tokio::test]
async fn test_post_risk_only_disallowed_fields_is_bad_request() {
    let h = harness().await;
    let id = connect(&h.app, "permissioned").await;

    let (status, body) = send(
        &h.app,
        json_req("POST", "/risk/42", &[(SESSION_HEADER, id.as_str())], r#"{"doNotUnlock": true}"#),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);
    assert!(h.posted.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_post_risk_negative_amount_is_bad_request() {
    let h = harness().await;
    let id = connect(&h.app, "owner").await;

    let (status, _) = send(
        &h.app,
        json_req("POST", "/risk/42", &[(SESSION_HEADER, id.as_str())], r#"{"dailyLossAutoLiq": -5}"#),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(h.posted.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_post_risk_rejects_non_object_bodies() {
    let h = harness().await;

    for body in ["[1, 2]", "not json"] {
        let (status, resp) = send(
            &h.app,
            json_req("POST", "/risk/42", &[("authorization", "Bearer tok")], body),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "body {}", body);
        assert_eq!(resp["success"], false);
    }
}

#[tokio::test]
async fn test_post_risk_with_expired_token() {
    let h = harness().await;

    let (status, body) = send(
        &h.app,
        json_req("POST", "/risk/42", &[("authorization", EXPIRED)], r#"{"dailyLossAutoLiq": 100}"#),
    )
    .await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["code"], "TOKEN_EXPIRED");
}

#[tokio::test]
async fn test_invalid_caller_role_header() {
    let h = harness().await;

    let (status, _) = send(
        &h.app,
        get_req("/risk/1", &[("authorization", "Bearer tok"), (CALLER_ROLE_HEADER, "admin")]),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
}

// ==================== OAuth tests ====================

fn location(response: &Response) -> String {
    response
        .headers()
        .get(header::LOCATION)
        .unwrap()
        .to_str()
        .unwrap()
        .to_string()
}

#[tokio::test]
async fn test_oauth_login_redirects_to_provider() {
    let h = harness().await;

    let response = h.app.clone().oneshot(get_req("/oauth/login", &[])).await.unwrap();

    assert!(response.status().is_redirection());
    assert!(location(&response).starts_with("https://trader.tradovate.com/oauth?response_type=code&client_id=cid"));
}

#[tokio::test]
async fn test_oauth_callback_connects_session() {
    let h = harness().await;

    let response = h
        .app
        .clone()
        .oneshot(get_req("/oauth/callback?code=good", &[]))
        .await
        .unwrap();

    assert!(response.status().is_redirection());
    let location = location(&response);
    let id = location
        .strip_prefix("/?connected=true&session=")
        .unwrap()
        .to_string();

    let (_, body) = send(&h.app, get_req("/connect", &[(SESSION_HEADER, id.as_str())])).await;
    assert_eq!(body["connected"], true);
}

#[tokio::test]
async fn test_oauth_callback_reports_provider_error() {
    let h = harness().await;

    let response = h
        .app
        .clone()
        .oneshot(get_req("/oauth/callback?error=access_denied&error_description=denied%20by%20user", &[]))
        .await
        .unwrap();

    assert_eq!(location(&response), "/?error=denied%20by%20user");
}

#[tokio::test]
async fn test_oauth_callback_reports_failed_exchange() {
    let h = harness().await;

    let response = h
        .app
        .clone()
        .oneshot(get_req("/oauth/callback?code=bad", &[]))
        .await
        .unwrap();

    let location = location(&response);
    assert!(location.starts_with("/?error="));
    assert!(location.contains("invalid_grant"));
}

#[tokio::test]
async fn test_oauth_exchange_returns_session() {
    let h = harness().await;

    let (status, body) = send(
        &h.app,
        json_req("POST", "/oauth/exchange", &[], r#"{"code": "good", "role": "owner"}"#),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(body["role"], "owner");
    assert!(body["sessionId"].is_string());
}

#[tokio::test]
async fn test_oauth_session_expires_with_token() {
    let h = harness().await;

    let (_, body) = send(
        &h.app,
        json_req("POST", "/oauth/exchange", &[], r#"{"code": "good"}"#),
    )
    .await;
    let id = body["sessionId"].as_str().unwrap().to_string();

    let (_, status) = send(&h.app, get_req("/connect", &[(SESSION_HEADER, id.as_str())])).await;
    let connected_at = DateTime::parse_from_rfc3339(status["connectedAt"].as_str().unwrap()).unwrap();
    let expires_at = DateTime::parse_from_rfc3339(status["expiresAt"].as_str().unwrap()).unwrap();
    assert_eq!((expires_at - connected_at).num_seconds(), 4800);
}

#[tokio::test]
async fn test_oauth_exchange_requires_code() {
    let h = harness().await;

    let (status, _) = send(&h.app, json_req("POST", "/oauth/exchange", &[], "{}")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_oauth_disabled() {
    let state = AppState {
        service: "tradovate-risk".to_string(),
        sessions: Arc::new(SessionStore::new(
            TradovateConfig::default(),
            None,
            build_http_client().unwrap(),
        )),
        oauth: None,
    };
    let app = router(state);

    let (status, body) = send(&app, get_req("/oauth/login", &[])).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(body["error"].as_str().unwrap().contains("not configured"));
}

// ==================== Cache view tests ====================

#[tokio::test]
async fn test_cache_view_lists_session_reads() {
    let h = harness().await;
    let id = connect(&h.app, "owner").await;
    let headers = [(SESSION_HEADER, id.as_str())];

    let (_, empty) = send(&h.app, get_req("/cache", &headers)).await;
    assert_eq!(empty["entries"], json!([]));

    send(&h.app, get_req("/risk/1", &headers)).await;
    let (status, body) = send(&h.app, get_req("/cache", &headers)).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(body["sessions"], 1);
    assert!(body["timestamp"].is_string());
    let entry = &body["entries"][0];
    assert_eq!(entry["accountId"], 1);
    assert_eq!(entry["settings"]["dailyLossAutoLiq"].as_f64(), Some(200.0));
    assert!(entry["ageMs"].as_u64().unwrap() <= 30_000);
    assert!(entry["expiresInMs"].as_u64().unwrap() <= 30_000);
}

#[tokio::test]
async fn test_cache_view_drops_written_account() {
    let h = harness().await;
    let id = connect(&h.app, "permissioned").await;
    let headers = [(SESSION_HEADER, id.as_str())];

    send(&h.app, get_req("/risk/1", &headers)).await;
    let body = json!({ "dailyLossAutoLiq": 300 }).to_string();
    let (status, _) = send(&h.app, json_req("POST", "/risk/1", &headers, &body)).await;
    assert_eq!(status, StatusCode::OK);

    let (_, view) = send(&h.app, get_req("/cache", &headers)).await;
    assert_eq!(view["entries"], json!([]));
}

#[tokio::test]
async fn test_cache_view_requires_credentials() {
    let h = harness().await;

    let (status, body) = send(&h.app, get_req("/cache", &[])).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(body["error"].as_str().unwrap().contains("not connected"));
}
