use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use sqlx::PgPool;

use voyara_core::repository::EventStore;
use voyara_core::StoreError;
use voyara_domain::{EventRecord, Severity};
use voyara_shared::ids::EventId;

/// Postgres mirror of WEATHER/SECURITY events plus the single-row watchdog
/// cursor.
pub struct PgEventStore {
    pool: PgPool,
}

impl PgEventStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(sqlx::FromRow)]
struct EventRow {
    id: i64,
    kind: String,
    severity: String,
    city: String,
    date_from: NaiveDate,
    date_to: NaiveDate,
    message: String,
    created_at: DateTime<Utc>,
}

impl EventRow {
    fn into_record(self) -> Result<EventRecord, StoreError> {
        Ok(EventRecord {
            id: self.id,
            kind: self.kind,
            severity: self.severity.parse::<Severity>().map_err(StoreError::Backend)?,
            city: self.city,
            date_from: self.date_from,
            date_to: self.date_to,
            message: self.message,
            created_at: self.created_at,
        })
    }
}

#[async_trait]
impl EventStore for PgEventStore {
    async fn record(&self, event: EventRecord) -> Result<(), StoreError> {
        // The feed is at-least-once; replaying an already-mirrored id must
        // not fail the tick.
        sqlx::query(
            r#"
            INSERT INTO events (id, kind, severity, city, date_from, date_to, message, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            ON CONFLICT (id) DO NOTHING
            "#,
        )
        .bind(event.id)
        .bind(&event.kind)
        .bind(event.severity.as_str())
        .bind(&event.city)
        .bind(event.date_from)
        .bind(event.date_to)
        .bind(&event.message)
        .bind(event.created_at)
        .execute(&self.pool)
        .await
        .map_err(|e| StoreError::Backend(e.to_string()))?;
        Ok(())
    }

    async fn blocking_event(
        &self,
        city: &str,
        date_from: NaiveDate,
        date_to: NaiveDate,
    ) -> Result<Option<EventRecord>, StoreError> {
        let row: Option<EventRow> = sqlx::query_as(
            r#"
            SELECT id, kind, severity, city, date_from, date_to, message, created_at
            FROM events
            WHERE lower(city) = lower($1)
              AND date_from <= $3
              AND date_to >= $2
              AND severity IN ('HIGH', 'CRITICAL')
            ORDER BY CASE severity WHEN 'CRITICAL' THEN 2 ELSE 1 END DESC, id DESC
            LIMIT 1
            "#,
        )
        .bind(city)
        .bind(date_from)
        .bind(date_to)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| StoreError::Backend(e.to_string()))?;
        row.map(EventRow::into_record).transpose()
    }

    async fn load_cursor(&self) -> Result<EventId, StoreError> {
        let row: Option<(i64,)> =
            sqlx::query_as("SELECT last_event_id FROM event_cursor WHERE id = 1")
                .fetch_optional(&self.pool)
                .await
                .map_err(|e| StoreError::Backend(e.to_string()))?;
        Ok(row.map(|r| r.0).unwrap_or(0))
    }

    async fn save_cursor(&self, cursor: EventId) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            INSERT INTO event_cursor (id, last_event_id)
            VALUES (1, $1)
            ON CONFLICT (id) DO UPDATE SET last_event_id = EXCLUDED.last_event_id
            "#,
        )
        .bind(cursor)
        .execute(&self.pool)
        .await
        .map_err(|e| StoreError::Backend(e.to_string()))?;
        Ok(())
    }
}
