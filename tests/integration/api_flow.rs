//! HTTP flows through the full router: accounts, sessions, and the request
//! lifecycle from submission to admin status change, with the store on
//! disk.

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use serde_json::{json, Value};
use std::path::PathBuf;
use std::sync::Arc;
use tower::ServiceExt;

use automation_hub::catalog::WorkflowCatalog;
use automation_hub::config::AppConfig;
use automation_hub::dashboard::{build_router, HubState};
use automation_hub::storage::{
    delete_store, LocalStore, CUSTOM_REQUESTS_KEY, MODIFICATION_REQUESTS_KEY,
};

fn temp_store() -> PathBuf {
    let mut p = std::env::temp_dir();
    p.push(format!("hub_api_flow_{}.json", uuid::Uuid::new_v4()));
    p
}

fn router_with_store(path: &PathBuf) -> Router {
    let mut cfg = AppConfig::default();
    cfg.chat.typing_delay_ms = 0;
    let store = LocalStore::open(path).unwrap();
    let state = HubState::new(&cfg, WorkflowCatalog::builtin().unwrap(), store).unwrap();
    build_router(Arc::new(state))
}

async fn call(
    app: &Router,
    method: &str,
    uri: &str,
    body: Option<Value>,
    token: Option<&str>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(t) = token {
        builder = builder.header("authorization", format!("Bearer {t}"));
    }
    let req = match body {
        Some(b) => builder
            .header("content-type", "application/json")
            .body(Body::from(b.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };
    let resp = app.clone().oneshot(req).await.unwrap();
    let status = resp.status();
    let bytes = axum::body::to_bytes(resp.into_body(), 1_000_000).await.unwrap();
    (status, serde_json::from_slice(&bytes).unwrap_or(Value::Null))
}

async fn admin_token(app: &Router) -> String {
    let (status, json) = call(
        app,
        "POST",
        "/api/admin/login",
        Some(json!({"username": "admin", "password": "admin123"})),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["user"]["role"], "admin");
    json["token"].as_str().unwrap().to_string()
}

#[tokio::test]
async fn test_request_lifecycle_persists() {
    let path = temp_store();
    let app = router_with_store(&path);

    let (status, json) = call(
        &app,
        "POST",
        "/api/requests/modification",
        Some(json!({
            "workflowId": 3,
            "clientName": "Jane Doe",
            "clientEmail": "jane@example.com",
            "modifications": "Post to LinkedIn as well",
            "budget": "$100-200"
        })),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(json["urgency"], "normal");
    assert_eq!(json["status"], "pending");
    let request_id = json["id"].as_str().unwrap().to_string();

    let (status, custom) = call(
        &app,
        "POST",
        "/api/requests/custom",
        Some(json!({
            "title": "Invoice OCR",
            "description": "Read totals from PDFs",
            "budget": "$500-1000",
            "deliveryTime": "1 month",
            "integrations": ["Gmail", "Gmail ", "Xero"]
        })),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let token = admin_token(&app).await;
    let (status, json) = call(&app, "GET", "/api/admin/requests", None, Some(&token)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["pendingCount"], 2);
    assert_eq!(json["custom"][0]["integrations"], json!(["Gmail", "Xero"]));

    let (status, json) = call(
        &app,
        "PUT",
        &format!("/api/admin/requests/{request_id}/status"),
        Some(json!({})),
        Some(&token),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["status"], "in_progress");
    assert_eq!(json["label"], "In Progress");

    let (status, json) = call(
        &app,
        "PUT",
        &format!("/api/admin/requests/{request_id}/status"),
        Some(json!({"status": "bogus"})),
        Some(&token),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["error"], "Unknown request status: bogus");

    let custom_id = custom["id"].as_str().unwrap();
    let (status, json) = call(
        &app,
        "DELETE",
        &format!("/api/admin/requests/{custom_id}"),
        None,
        Some(&token),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["deleted"], true);
    let (status, _) = call(
        &app,
        "DELETE",
        &format!("/api/admin/requests/{custom_id}"),
        None,
        Some(&token),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    // Everything acknowledged is already on disk.
    let reopened = LocalStore::open(&path).unwrap();
    let stored = reopened.get(MODIFICATION_REQUESTS_KEY).unwrap();
    assert_eq!(stored[0]["status"], "in_progress");
    assert_eq!(stored[0]["workflowId"], 3);
    assert_eq!(reopened.get(CUSTOM_REQUESTS_KEY).unwrap(), &json!([]));

    delete_store(&path).unwrap();
}

#[tokio::test]
async fn test_modification_for_unknown_workflow() {
    let path = temp_store();
    let app = router_with_store(&path);
    let (status, json) = call(
        &app,
        "POST",
        "/api/requests/modification",
        Some(json!({
            "workflowId": 404,
            "clientName": "Jane",
            "clientEmail": "jane@example.com",
            "modifications": "Anything"
        })),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(json["error"], "Workflow not found: 404");
    delete_store(&path).unwrap();
}

#[tokio::test]
async fn test_signup_session_logout() {
    let path = temp_store();
    let app = router_with_store(&path);

    let (status, json) = call(
        &app,
        "POST",
        "/api/auth/signup",
        Some(json!({
            "firstName": "Ada",
            "lastName": "Lovelace",
            "email": "ada@example.com",
            "password": "Engine1843",
            "confirmPassword": "Engine1843",
            "acceptTerms": true
        })),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["user"]["name"], "Ada Lovelace");
    assert_eq!(json["user"]["isVerified"], false);
    let token = json["token"].as_str().unwrap().to_string();

    let (status, json) = call(&app, "GET", "/api/auth/me", None, Some(&token)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["user"]["email"], "ada@example.com");

    // A fresh user is not an admin.
    let (status, _) = call(&app, "GET", "/api/admin/requests", None, Some(&token)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    let (status, _) = call(
        &app,
        "DELETE",
        &format!("/api/admin/requests/{}", uuid::Uuid::new_v4()),
        None,
        Some(&token),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, json) = call(&app, "POST", "/api/auth/logout", None, Some(&token)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["loggedOut"], true);

    let (status, _) = call(&app, "GET", "/api/auth/me", None, Some(&token)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    delete_store(&path).unwrap();
}
