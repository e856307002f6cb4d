//! Admin API routes and authentication.

use std::sync::Arc;

use axum::body::Body;
use axum::http::{header, Method, Request, StatusCode};
use axum::Router;
use tower::ServiceExt;

use provider_monitor::admin::{setup_admin_router, AdminState};
use provider_monitor::HealthMonitor;

mod common;

use common::TestEnv;

const API_KEY: &str = "test-admin-key";

fn router(monitor: Arc<HealthMonitor>) -> Router {
    setup_admin_router(AdminState {
        monitor,
        api_key: API_KEY.into(),
    })
}

fn request(method: Method, uri: &str) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(header::AUTHORIZATION, format!("Bearer {}", API_KEY))
        .body(Body::empty())
        .unwrap()
}

async fn json_body(response: axum::response::Response) -> serde_json::Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn test_requests_without_token_are_rejected() {
    let env = TestEnv::new(&[("openai", true)]);
    let app = router(Arc::new(env.monitor()));

    let response = app
        .clone()
        .oneshot(Request::builder().uri("/admin/status").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let response = app
        .oneshot(
            Request::builder()
                .uri("/admin/status")
                .header(header::AUTHORIZATION, "Bearer wrong")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_status_reports_scheduler_and_failover_state() {
    let env = TestEnv::new(&[("openai", true)]);
    let monitor = Arc::new(env.monitor());
    env.script.set_failing(true);
    for _ in 0..3 {
        monitor.check_provider("openai").await.unwrap();
    }

    let response = router(monitor).oneshot(request(Method::GET, "/admin/status")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = json_body(response).await;
    assert_eq!(body["scheduler_running"], false);
    assert_eq!(body["check_interval_secs"], 300);
    assert_eq!(body["failed_over"], serde_json::json!(["openai"]));
}

#[tokio::test]
async fn test_manual_check_then_provider_listing() {
    let env = TestEnv::new(&[("openai", true), ("gemini", false)]);
    let app = router(Arc::new(env.monitor()));

    let response = app
        .clone()
        .oneshot(request(Method::POST, "/admin/providers/openai/check"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let outcome = json_body(response).await;
    assert_eq!(outcome["result"]["success"], true);
    assert_eq!(outcome["health"]["status"], "healthy");

    let response = app.clone().oneshot(request(Method::GET, "/admin/providers")).await.unwrap();
    let providers = json_body(response).await;
    let providers = providers.as_array().unwrap();
    assert_eq!(providers.len(), 2);
    assert_eq!(providers[0]["provider"], "openai");
    assert_eq!(providers[0]["total_checks"], 1);
    assert_eq!(providers[1]["status"], "unknown");
    assert_eq!(providers[1]["is_enabled"], false);

    let response = app
        .oneshot(request(Method::GET, "/admin/providers/openai/history?hours=1"))
        .await
        .unwrap();
    let history = json_body(response).await;
    assert_eq!(history.as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_alert_listing_and_acknowledgement() {
    let env = TestEnv::new(&[("openai", true)]);
    let monitor = Arc::new(env.monitor());
    env.script.set_failing(true);
    for _ in 0..3 {
        monitor.check_provider("openai").await.unwrap();
    }
    let app = router(monitor);

    let response = app
        .clone()
        .oneshot(request(Method::GET, "/admin/alerts?acknowledged=false"))
        .await
        .unwrap();
    let alerts = json_body(response).await;
    let alerts = alerts.as_array().unwrap();
    assert_eq!(alerts.len(), 1);
    let alert_id = alerts[0]["alert_id"].as_str().unwrap().to_string();

    let uri = format!("/admin/alerts/{}/ack", alert_id);
    let response = app.clone().oneshot(request(Method::POST, &uri)).await.unwrap();
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let response = app
        .clone()
        .oneshot(request(Method::POST, "/admin/alerts/missing-failover-0/ack"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = app
        .oneshot(request(Method::GET, "/admin/alerts?acknowledged=false"))
        .await
        .unwrap();
    assert!(json_body(response).await.as_array().unwrap().is_empty());
}
