//! Persisted failover/recovery alerts.

use rusqlite::{params, Row, ToSql};

use crate::alerts::types::{AlertType, HealthAlert};
use crate::error::{MonitorError, MonitorResult};
use crate::storage::db::DbPool;
use crate::storage::{decode_timestamp, encode_timestamp};

/// Alert table access.
#[derive(Clone)]
pub struct AlertStore {
    pool: DbPool,
}

impl AlertStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    /// Persist an alert. Returns `false` when the `alert_id` already exists.
    pub fn insert(&self, alert: &HealthAlert) -> MonitorResult<bool> {
        let conn = self.pool.get()?;
        let inserted = conn.execute(
            "INSERT OR IGNORE INTO health_alerts (alert_id, provider, alert_type, message, timestamp, acknowledged)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                alert.alert_id,
                alert.provider,
                alert.alert_type.as_str(),
                alert.message,
                encode_timestamp(&alert.timestamp),
                alert.acknowledged,
            ],
        )?;
        Ok(inserted > 0)
    }

    /// Mark an alert acknowledged. Returns `false` if no such alert exists.
    ///
    /// Acknowledging twice leaves the row unchanged.
    pub fn acknowledge(&self, alert_id: &str) -> MonitorResult<bool> {
        let conn = self.pool.get()?;
        let matched = conn.execute(
            "UPDATE health_alerts SET acknowledged = 1 WHERE alert_id = ?1",
            params![alert_id],
        )?;
        Ok(matched > 0)
    }

    pub fn get(&self, alert_id: &str) -> MonitorResult<Option<HealthAlert>> {
        let conn = self.pool.get()?;
        let mut stmt = conn.prepare(
            "SELECT alert_id, provider, alert_type, message, timestamp, acknowledged
             FROM health_alerts WHERE alert_id = ?1",
        )?;
        let mut rows = stmt.query_map(params![alert_id], raw_row)?;
        match rows.next() {
            Some(row) => Ok(Some(decode(row?)?)),
            None => Ok(None),
        }
    }

    /// Alerts matching the optional filters, newest first.
    pub fn list(
        &self,
        acknowledged: Option<bool>,
        provider: Option<&str>,
    ) -> MonitorResult<Vec<HealthAlert>> {
        let mut sql = String::from(
            "SELECT alert_id, provider, alert_type, message, timestamp, acknowledged
             FROM health_alerts WHERE 1 = 1",
        );
        let mut args: Vec<&dyn ToSql> = Vec::new();
        if let Some(ack) = &acknowledged {
            args.push(ack);
            sql.push_str(&format!(" AND acknowledged = ?{}", args.len()));
        }
        if let Some(provider) = &provider {
            args.push(provider);
            sql.push_str(&format!(" AND provider = ?{}", args.len()));
        }
        sql.push_str(" ORDER BY timestamp DESC, id DESC");

        let conn = self.pool.get()?;
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt.query_map(args.as_slice(), raw_row)?;

        let mut alerts = Vec::new();
        for row in rows {
            alerts.push(decode(row?)?);
        }
        Ok(alerts)
    }

    /// Number of alerts of one type recorded for a provider.
    pub fn count(&self, provider: &str, alert_type: AlertType) -> MonitorResult<u64> {
        let conn = self.pool.get()?;
        let count: i64 = conn.query_row(
            "SELECT COUNT(*) FROM health_alerts WHERE provider = ?1 AND alert_type = ?2",
            params![provider, alert_type.as_str()],
            |row| row.get(0),
        )?;
        Ok(count.max(0) as u64)
    }
}

type RawAlert = (String, String, String, String, String, bool);

fn raw_row(row: &Row<'_>) -> rusqlite::Result<RawAlert> {
    Ok((
        row.get(0)?,
        row.get(1)?,
        row.get(2)?,
        row.get(3)?,
        row.get(4)?,
        row.get(5)?,
    ))
}

fn decode(raw: RawAlert) -> MonitorResult<HealthAlert> {
    let (alert_id, provider, alert_type, message, timestamp, acknowledged) = raw;
    Ok(HealthAlert {
        alert_id,
        provider,
        alert_type: alert_type.parse().map_err(MonitorError::Corrupt)?,
        message,
        timestamp: decode_timestamp(&timestamp)?,
        acknowledged,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::db::open;
    use chrono::{Duration, Utc};

    fn test_store() -> (tempfile::TempDir, AlertStore) {
        let dir = tempfile::tempdir().unwrap();
        let pool = open(&dir.path().join("health.sqlite"), 2).unwrap();
        (dir, AlertStore::new(pool))
    }

    #[test]
    fn test_insert_is_unique_by_alert_id() {
        let (_dir, store) = test_store();
        let alert = HealthAlert::new("openai", AlertType::Failover, "down", Utc::now());

        assert!(store.insert(&alert).unwrap());
        assert!(!store.insert(&alert).unwrap());
        assert_eq!(store.list(None, None).unwrap().len(), 1);
    }

    #[test]
    fn test_acknowledge_twice() {
        let (_dir, store) = test_store();
        let alert = HealthAlert::new("openai", AlertType::Failover, "down", Utc::now());
        store.insert(&alert).unwrap();

        assert!(store.acknowledge(&alert.alert_id).unwrap());
        assert!(store.acknowledge(&alert.alert_id).unwrap());

        let all = store.list(None, None).unwrap();
        assert_eq!(all.len(), 1);
        assert!(all[0].acknowledged);
    }

    #[test]
    fn test_acknowledge_unknown_alert() {
        let (_dir, store) = test_store();
        assert!(!store.acknowledge("missing-failover-0").unwrap());
    }

    #[test]
    fn test_list_filters() {
        let (_dir, store) = test_store();
        let now = Utc::now();
        let a = HealthAlert::new("openai", AlertType::Failover, "down", now - Duration::minutes(10));
        let b = HealthAlert::new("openai", AlertType::Recovery, "up", now - Duration::minutes(5));
        let c = HealthAlert::new("gemini", AlertType::Failover, "down", now);
        for alert in [&a, &b, &c] {
            store.insert(alert).unwrap();
        }
        store.acknowledge(&a.alert_id).unwrap();

        let all = store.list(None, None).unwrap();
        assert_eq!(all.iter().map(|x| x.alert_id.as_str()).collect::<Vec<_>>(), vec![
            c.alert_id.as_str(),
            b.alert_id.as_str(),
            a.alert_id.as_str(),
        ]);

        let unacked = store.list(Some(false), None).unwrap();
        assert_eq!(unacked.len(), 2);

        let openai_unacked = store.list(Some(false), Some("openai")).unwrap();
        assert_eq!(openai_unacked.len(), 1);
        assert_eq!(openai_unacked[0].alert_type, AlertType::Recovery);

        assert_eq!(store.count("openai", AlertType::Failover).unwrap(), 1);
        assert_eq!(store.count("gemini", AlertType::Recovery).unwrap(), 0);
        assert_eq!(store.get(&c.alert_id).unwrap().unwrap().provider, "gemini");
    }
}
