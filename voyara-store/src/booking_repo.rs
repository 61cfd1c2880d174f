use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use sqlx::PgPool;

use voyara_core::repository::BookingRepository;
use voyara_core::StoreError;
use voyara_domain::{Booking, BookingStatus, DisruptionStamp, PackageKey, Severity};
use voyara_shared::ids::BookingId;

pub struct PgBookingRepository {
    pool: PgPool,
}

impl PgBookingRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(sqlx::FromRow)]
struct BookingRow {
    id: i64,
    status: String,
    hotel_id: i64,
    start_transfer_id: i64,
    end_transfer_id: i64,
    outbound_flight_id: i64,
    return_flight_id: i64,
    start_city_id: i64,
    visited_city_id: i64,
    date_from: NaiveDate,
    date_to: NaiveDate,
    guests: i32,
    total_price: f64,
    rating: f64,
    discount: Option<f64>,
    disruption_type: Option<String>,
    disruption_severity: Option<String>,
    disruption_message: Option<String>,
    parent_booking_id: Option<i64>,
    created_at: DateTime<Utc>,
}

impl BookingRow {
    fn into_booking(self) -> Result<Booking, StoreError> {
        let status: BookingStatus = self.status.parse().map_err(StoreError::Backend)?;
        let disruption = match (self.disruption_type, self.disruption_severity, self.disruption_message)
        {
            (Some(kind), Some(severity), Some(message)) => Some(DisruptionStamp {
                kind,
                severity: severity.parse::<Severity>().map_err(StoreError::Backend)?,
                message,
            }),
            _ => None,
        };
        Ok(Booking {
            id: self.id,
            status,
            hotel_id: self.hotel_id,
            start_transfer_id: self.start_transfer_id,
            end_transfer_id: self.end_transfer_id,
            outbound_flight_id: self.outbound_flight_id,
            return_flight_id: self.return_flight_id,
            start_city_id: self.start_city_id,
            visited_city_id: self.visited_city_id,
            date_from: self.date_from,
            date_to: self.date_to,
            guests: self.guests as u32,
            total_price: self.total_price,
            rating: self.rating,
            discount: self.discount,
            disruption,
            parent_booking_id: self.parent_booking_id,
            created_at: self.created_at,
        })
    }
}

const SELECT_COLUMNS: &str = "id, status, hotel_id, start_transfer_id, end_transfer_id, \
     outbound_flight_id, return_flight_id, start_city_id, visited_city_id, date_from, date_to, \
     guests, total_price, rating, discount, disruption_type, disruption_severity, \
     disruption_message, parent_booking_id, created_at";

async fn insert_booking<'e, E>(executor: E, booking: &Booking) -> Result<BookingId, StoreError>
where
    E: sqlx::Executor<'e, Database = sqlx::Postgres>,
{
    let (kind, severity, message) = match &booking.disruption {
        Some(stamp) => (
            Some(stamp.kind.as_str()),
            Some(stamp.severity.as_str()),
            Some(stamp.message.as_str()),
        ),
        None => (None, None, None),
    };

    let row: (i64,) = sqlx::query_as(
        r#"
        INSERT INTO bookings (
            status, hotel_id, start_transfer_id, end_transfer_id,
            outbound_flight_id, return_flight_id, start_city_id, visited_city_id,
            date_from, date_to, guests, total_price, rating, discount,
            disruption_type, disruption_severity, disruption_message,
            parent_booking_id, created_at
        )
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $17, $18, $19)
        RETURNING id
        "#,
    )
    .bind(booking.status.as_str())
    .bind(booking.hotel_id)
    .bind(booking.start_transfer_id)
    .bind(booking.end_transfer_id)
    .bind(booking.outbound_flight_id)
    .bind(booking.return_flight_id)
    .bind(booking.start_city_id)
    .bind(booking.visited_city_id)
    .bind(booking.date_from)
    .bind(booking.date_to)
    .bind(booking.guests as i32)
    .bind(booking.total_price)
    .bind(booking.rating)
    .bind(booking.discount)
    .bind(kind)
    .bind(severity)
    .bind(message)
    .bind(booking.parent_booking_id)
    .bind(booking.created_at)
    .fetch_one(executor)
    .await
    .map_err(|e| StoreError::Backend(e.to_string()))?;

    Ok(row.0)
}

#[async_trait]
impl BookingRepository for PgBookingRepository {
    async fn create(&self, mut booking: Booking) -> Result<Booking, StoreError> {
        booking.id = insert_booking(&self.pool, &booking).await?;
        Ok(booking)
    }

    async fn create_batch(&self, bookings: Vec<Booking>) -> Result<Vec<Booking>, StoreError> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| StoreError::Backend(e.to_string()))?;

        let mut created = Vec::with_capacity(bookings.len());
        for mut booking in bookings {
            booking.id = insert_booking(&mut *tx, &booking).await?;
            created.push(booking);
        }

        tx.commit()
            .await
            .map_err(|e| StoreError::Backend(e.to_string()))?;
        Ok(created)
    }

    async fn get(&self, id: BookingId) -> Result<Option<Booking>, StoreError> {
        let row: Option<BookingRow> =
            sqlx::query_as(&format!("SELECT {SELECT_COLUMNS} FROM bookings WHERE id = $1"))
                .bind(id)
                .fetch_optional(&self.pool)
                .await
                .map_err(|e| StoreError::Backend(e.to_string()))?;
        row.map(BookingRow::into_booking).transpose()
    }

    async fn list_by_status(&self, status: BookingStatus) -> Result<Vec<Booking>, StoreError> {
        let rows: Vec<BookingRow> = sqlx::query_as(&format!(
            "SELECT {SELECT_COLUMNS} FROM bookings WHERE status = $1 ORDER BY id"
        ))
        .bind(status.as_str())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| StoreError::Backend(e.to_string()))?;
        rows.into_iter().map(BookingRow::into_booking).collect()
    }

    async fn list_children(
        &self,
        parent_id: BookingId,
        status: BookingStatus,
    ) -> Result<Vec<Booking>, StoreError> {
        let rows: Vec<BookingRow> = sqlx::query_as(&format!(
            "SELECT {SELECT_COLUMNS} FROM bookings \
             WHERE parent_booking_id = $1 AND status = $2 ORDER BY total_price"
        ))
        .bind(parent_id)
        .bind(status.as_str())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| StoreError::Backend(e.to_string()))?;
        rows.into_iter().map(BookingRow::into_booking).collect()
    }

    async fn find_by_combination(
        &self,
        key: &PackageKey,
    ) -> Result<Option<Booking>, StoreError> {
        let row: Option<BookingRow> = sqlx::query_as(&format!(
            "SELECT {SELECT_COLUMNS} FROM bookings \
             WHERE outbound_flight_id = $1 AND return_flight_id = $2 AND hotel_id = $3 \
               AND start_transfer_id = $4 AND end_transfer_id = $5 AND status <> 'cancelled' \
             LIMIT 1"
        ))
        .bind(key.outbound_flight_id)
        .bind(key.return_flight_id)
        .bind(key.hotel_id)
        .bind(key.start_transfer_id)
        .bind(key.end_transfer_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| StoreError::Backend(e.to_string()))?;
        row.map(BookingRow::into_booking).transpose()
    }

    async fn update_status(&self, id: BookingId, status: BookingStatus) -> Result<(), StoreError> {
        let result = sqlx::query("UPDATE bookings SET status = $1 WHERE id = $2")
            .bind(status.as_str())
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| StoreError::Backend(e.to_string()))?;
        if result.rows_affected() == 0 {
            return Err(StoreError::unknown("booking", id));
        }
        Ok(())
    }

    async fn mark_disrupted(
        &self,
        id: BookingId,
        stamp: DisruptionStamp,
    ) -> Result<(), StoreError> {
        let result = sqlx::query(
            "UPDATE bookings SET status = 'disrupted', disruption_type = $1, \
             disruption_severity = $2, disruption_message = $3 WHERE id = $4",
        )
        .bind(&stamp.kind)
        .bind(stamp.severity.as_str())
        .bind(&stamp.message)
        .bind(id)
        .execute(&self.pool)
        .await
        .map_err(|e| StoreError::Backend(e.to_string()))?;
        if result.rows_affected() == 0 {
            return Err(StoreError::unknown("booking", id));
        }
        Ok(())
    }

    async fn count_by_status(&self, status: BookingStatus) -> Result<u64, StoreError> {
        let row: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM bookings WHERE status = $1")
            .bind(status.as_str())
            .fetch_one(&self.pool)
            .await
            .map_err(|e| StoreError::Backend(e.to_string()))?;
        Ok(row.0 as u64)
    }
}
