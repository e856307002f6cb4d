//! Alert records.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Kind of failover transition an alert reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AlertType {
    Failover,
    Recovery,
}

impl AlertType {
    pub fn as_str(&self) -> &'static str {
        match self {
            AlertType::Failover => "failover",
            AlertType::Recovery => "recovery",
        }
    }
}

impl std::fmt::Display for AlertType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for AlertType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "failover" => Ok(AlertType::Failover),
            "recovery" => Ok(AlertType::Recovery),
            other => Err(format!("unknown alert type '{}'", other)),
        }
    }
}

/// A persisted failover or recovery notification.
///
/// Only `acknowledged` changes after creation, and only from false to true.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HealthAlert {
    pub alert_id: String,
    pub provider: String,
    pub alert_type: AlertType,
    pub message: String,
    pub timestamp: DateTime<Utc>,
    pub acknowledged: bool,
}

impl HealthAlert {
    /// New unacknowledged alert; the id is `{provider}-{type}-{unix seconds}`.
    ///
    /// [`AlertManager::raise`](crate::alerts::AlertManager::raise) suffixes it on collision.
    pub fn new(
        provider: impl Into<String>,
        alert_type: AlertType,
        message: impl Into<String>,
        timestamp: DateTime<Utc>,
    ) -> Self {
        let provider = provider.into();
        Self {
            alert_id: format!("{}-{}-{}", provider, alert_type, timestamp.timestamp()),
            provider,
            alert_type,
            message: message.into(),
            timestamp,
            acknowledged: false,
        }
    }
}
