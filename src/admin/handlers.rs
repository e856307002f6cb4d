use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};

use crate::admin::AdminState;
use crate::alerts::HealthAlert;
use crate::error::MonitorError;
use crate::health::{CheckOutcome, HealthCheckResult, ProviderHealth};

#[derive(Serialize)]
pub struct SystemStatus {
    pub version: &'static str,
    pub scheduler_running: bool,
    pub check_interval_secs: u64,
    pub failed_over: Vec<String>,
}

#[derive(Debug, Deserialize)]
pub struct WindowQuery {
    pub window: Option<u32>,
}

#[derive(Debug, Deserialize)]
pub struct HistoryQuery {
    pub hours: Option<u32>,
}

#[derive(Debug, Deserialize)]
pub struct AlertQuery {
    pub provider: Option<String>,
    pub acknowledged: Option<bool>,
}

/// Monitor errors rendered as JSON 500 responses.
pub struct ApiError(MonitorError);

impl From<MonitorError> for ApiError {
    fn from(e: MonitorError) -> Self {
        Self(e)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        tracing::error!(error = %self.0, "Admin request failed");
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(serde_json::json!({ "error": self.0.to_string() })),
        )
            .into_response()
    }
}

pub async fn get_status(State(state): State<AdminState>) -> Json<SystemStatus> {
    Json(SystemStatus {
        version: env!("CARGO_PKG_VERSION"),
        scheduler_running: state.monitor.is_running(),
        check_interval_secs: state.monitor.settings().interval.as_secs(),
        failed_over: state.monitor.failover().failed_over().await,
    })
}

pub async fn get_providers(
    State(state): State<AdminState>,
    Query(query): Query<WindowQuery>,
) -> Result<Json<Vec<ProviderHealth>>, ApiError> {
    Ok(Json(state.monitor.all_provider_health(query.window).await?))
}

pub async fn get_history(
    State(state): State<AdminState>,
    Path(name): Path<String>,
    Query(query): Query<HistoryQuery>,
) -> Result<Json<Vec<HealthCheckResult>>, ApiError> {
    let hours = query.hours.unwrap_or(24);
    Ok(Json(state.monitor.history(&name, hours).await?))
}

pub async fn post_check(
    State(state): State<AdminState>,
    Path(name): Path<String>,
) -> Result<Json<CheckOutcome>, ApiError> {
    Ok(Json(state.monitor.check_provider(&name).await?))
}

pub async fn get_alerts(
    State(state): State<AdminState>,
    Query(query): Query<AlertQuery>,
) -> Result<Json<Vec<HealthAlert>>, ApiError> {
    let alerts = state
        .monitor
        .alerts()
        .list_alerts(query.acknowledged, query.provider.as_deref())
        .await?;
    Ok(Json(alerts))
}

pub async fn post_ack(
    State(state): State<AdminState>,
    Path(alert_id): Path<String>,
) -> Result<StatusCode, ApiError> {
    if state.monitor.alerts().acknowledge(&alert_id).await? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Ok(StatusCode::NOT_FOUND)
    }
}
