use std::collections::HashSet;

use async_trait::async_trait;
use chrono::NaiveDate;
use sqlx::PgPool;

use voyara_core::repository::InventoryStore;
use voyara_core::supplier::{HotelFilters, InventoryAdapter};
use voyara_core::{StoreError, SupplierError};
use voyara_domain::{
    City, Flight, FlightQuote, FlightStatus, Hotel, HotelQuote, Transfer, TransferKind,
    TransferQuote,
};
use voyara_shared::ids::{CityId, HotelId};

use crate::http::HttpQuoteClient;

#[derive(sqlx::FromRow)]
struct CityRow {
    id: i64,
    name: String,
    description: Option<String>,
}

impl From<CityRow> for City {
    fn from(row: CityRow) -> Self {
        City {
            id: row.id,
            name: row.name,
            description: row.description,
        }
    }
}

#[derive(sqlx::FromRow)]
struct HotelRow {
    id: i64,
    name: String,
    city_id: i64,
    standard: i32,
    nightly_price: f64,
    capacity: i32,
    rating: f64,
    has_wifi: bool,
    has_pool: bool,
    has_parking: bool,
    has_restaurant: bool,
}

impl From<HotelRow> for Hotel {
    fn from(row: HotelRow) -> Self {
        Hotel {
            id: row.id,
            name: row.name,
            city_id: row.city_id,
            standard: row.standard as u8,
            nightly_price: row.nightly_price,
            capacity: row.capacity as u32,
            rating: row.rating,
            has_wifi: row.has_wifi,
            has_pool: row.has_pool,
            has_parking: row.has_parking,
            has_restaurant: row.has_restaurant,
        }
    }
}

#[derive(sqlx::FromRow)]
struct FlightRow {
    id: i64,
    flight_number: String,
    origin_city_id: i64,
    destination_city_id: i64,
    date: NaiveDate,
    price: f64,
    status: String,
}

impl FlightRow {
    fn into_flight(self) -> Result<Flight, StoreError> {
        Ok(Flight {
            id: self.id,
            flight_number: self.flight_number,
            origin_city_id: self.origin_city_id,
            destination_city_id: self.destination_city_id,
            date: self.date,
            price: self.price,
            status: self
                .status
                .parse::<FlightStatus>()
                .map_err(StoreError::Backend)?,
        })
    }
}

#[derive(sqlx::FromRow)]
struct TransferRow {
    id: i64,
    name: String,
    kind: String,
    city_id: i64,
    price: f64,
    rating: f64,
    available: bool,
}

impl TransferRow {
    fn into_transfer(self) -> Result<Transfer, StoreError> {
        Ok(Transfer {
            id: self.id,
            name: self.name,
            kind: self
                .kind
                .parse::<TransferKind>()
                .map_err(StoreError::Backend)?,
            city_id: self.city_id,
            price: self.price,
            rating: self.rating,
            available: self.available,
        })
    }
}

fn backend(e: sqlx::Error) -> StoreError {
    StoreError::Backend(e.to_string())
}

fn supplier_backend(e: sqlx::Error) -> SupplierError {
    SupplierError::Unavailable(e.to_string())
}

/// Postgres city directory and inventory mirror.
pub struct PgInventoryStore {
    pool: PgPool,
}

impl PgInventoryStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl InventoryStore for PgInventoryStore {
    async fn city(&self, id: CityId) -> Result<Option<City>, StoreError> {
        let row: Option<CityRow> =
            sqlx::query_as("SELECT id, name, description FROM cities WHERE id = $1")
                .bind(id)
                .fetch_optional(&self.pool)
                .await
                .map_err(backend)?;
        Ok(row.map(City::from))
    }

    async fn city_by_name(&self, name: &str) -> Result<Option<City>, StoreError> {
        let row: Option<CityRow> =
            sqlx::query_as("SELECT id, name, description FROM cities WHERE lower(name) = lower($1)")
                .bind(name)
                .fetch_optional(&self.pool)
                .await
                .map_err(backend)?;
        Ok(row.map(City::from))
    }

    async fn list_cities(&self) -> Result<Vec<City>, StoreError> {
        let rows: Vec<CityRow> =
            sqlx::query_as("SELECT id, name, description FROM cities ORDER BY id")
                .fetch_all(&self.pool)
                .await
                .map_err(backend)?;
        Ok(rows.into_iter().map(City::from).collect())
    }

    async fn candidate_cities(
        &self,
        exclude: CityId,
        limit: usize,
    ) -> Result<Vec<City>, StoreError> {
        let rows: Vec<CityRow> = sqlx::query_as(
            "SELECT id, name, description FROM cities WHERE id <> $1 ORDER BY id LIMIT $2",
        )
        .bind(exclude)
        .bind(limit as i64)
        .fetch_all(&self.pool)
        .await
        .map_err(backend)?;
        Ok(rows.into_iter().map(City::from).collect())
    }

    async fn upsert_hotel(&self, quote: &HotelQuote, city_id: CityId) -> Result<Hotel, StoreError> {
        let row: HotelRow = sqlx::query_as(
            r#"
            INSERT INTO hotels (name, city_id, standard, nightly_price, capacity, rating,
                                has_wifi, has_pool, has_parking, has_restaurant)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            ON CONFLICT (name) DO UPDATE
                SET nightly_price = EXCLUDED.nightly_price, rating = EXCLUDED.rating
            RETURNING id, name, city_id, standard, nightly_price, capacity, rating,
                      has_wifi, has_pool, has_parking, has_restaurant
            "#,
        )
        .bind(&quote.name)
        .bind(city_id)
        .bind(quote.standard as i32)
        .bind(quote.nightly_price)
        .bind(quote.capacity as i32)
        .bind(quote.rating)
        .bind(quote.has_wifi)
        .bind(quote.has_pool)
        .bind(quote.has_parking)
        .bind(quote.has_restaurant)
        .fetch_one(&self.pool)
        .await
        .map_err(backend)?;
        Ok(row.into())
    }

    async fn upsert_flight(
        &self,
        quote: &FlightQuote,
        origin_city_id: CityId,
        destination_city_id: CityId,
    ) -> Result<Flight, StoreError> {
        let row: FlightRow = sqlx::query_as(
            r#"
            INSERT INTO flights (flight_number, origin_city_id, destination_city_id, date, price, status)
            VALUES ($1, $2, $3, $4, $5, $6)
            ON CONFLICT (flight_number) DO UPDATE SET price = EXCLUDED.price
            RETURNING id, flight_number, origin_city_id, destination_city_id, date, price, status
            "#,
        )
        .bind(&quote.flight_number)
        .bind(origin_city_id)
        .bind(destination_city_id)
        .bind(quote.date)
        .bind(quote.price)
        .bind(quote.status.as_str())
        .fetch_one(&self.pool)
        .await
        .map_err(backend)?;
        row.into_flight()
    }

    async fn upsert_transfer(
        &self,
        quote: &TransferQuote,
        city_id: CityId,
    ) -> Result<Transfer, StoreError> {
        let row: TransferRow = sqlx::query_as(
            r#"
            INSERT INTO transfers (name, kind, city_id, price, rating, available)
            VALUES ($1, $2, $3, $4, $5, $6)
            ON CONFLICT (name) DO UPDATE
                SET price = EXCLUDED.price, rating = EXCLUDED.rating
            RETURNING id, name, kind, city_id, price, rating, available
            "#,
        )
        .bind(&quote.name)
        .bind(quote.kind.as_str())
        .bind(city_id)
        .bind(quote.price)
        .bind(quote.rating)
        .bind(quote.available)
        .fetch_one(&self.pool)
        .await
        .map_err(backend)?;
        row.into_transfer()
    }
}

/// Inventory adapter over the Postgres mirror for listings, delegating
/// quote calls for not-yet-mirrored destinations to the remote provider.
pub struct PgInventoryAdapter {
    pool: PgPool,
    remote: HttpQuoteClient,
}

impl PgInventoryAdapter {
    pub fn new(pool: PgPool, remote: HttpQuoteClient) -> Self {
        Self { pool, remote }
    }
}

#[async_trait]
impl InventoryAdapter for PgInventoryAdapter {
    async fn list_outbound_flights(
        &self,
        origin_city: &str,
        date: NaiveDate,
        destination_city: Option<&str>,
    ) -> Result<Vec<Flight>, SupplierError> {
        let mut sql = String::from(
            "SELECT f.id, f.flight_number, f.origin_city_id, f.destination_city_id, \
                    f.date, f.price, f.status \
             FROM flights f \
             JOIN cities o ON f.origin_city_id = o.id \
             WHERE lower(o.name) = lower($1) AND f.date = $2",
        );
        if destination_city.is_some() {
            sql.push_str(
                " AND f.destination_city_id = \
                  (SELECT id FROM cities WHERE lower(name) = lower($3))",
            );
        }
        let mut query = sqlx::query_as::<_, FlightRow>(&sql).bind(origin_city).bind(date);
        if let Some(destination) = destination_city {
            query = query.bind(destination);
        }
        let rows = query
            .fetch_all(&self.pool)
            .await
            .map_err(supplier_backend)?;
        rows.into_iter()
            .map(|r| r.into_flight().map_err(|e| SupplierError::Malformed(e.to_string())))
            .collect()
    }

    async fn list_return_flights(
        &self,
        destination_city: &str,
        date: NaiveDate,
    ) -> Result<Vec<Flight>, SupplierError> {
        let rows: Vec<FlightRow> = sqlx::query_as(
            "SELECT f.id, f.flight_number, f.origin_city_id, f.destination_city_id, \
                    f.date, f.price, f.status \
             FROM flights f \
             JOIN cities o ON f.origin_city_id = o.id \
             WHERE lower(o.name) = lower($1) AND f.date = $2",
        )
        .bind(destination_city)
        .bind(date)
        .fetch_all(&self.pool)
        .await
        .map_err(supplier_backend)?;
        rows.into_iter()
            .map(|r| r.into_flight().map_err(|e| SupplierError::Malformed(e.to_string())))
            .collect()
    }

    async fn list_hotels(
        &self,
        cities: &[String],
        filters: &HotelFilters,
    ) -> Result<Vec<Hotel>, SupplierError> {
        let mut sql = String::from(
            "SELECT h.id, h.name, h.city_id, h.standard, h.nightly_price, h.capacity, \
                    h.rating, h.has_wifi, h.has_pool, h.has_parking, h.has_restaurant \
             FROM hotels h \
             JOIN cities c ON h.city_id = c.id \
             WHERE c.name = ANY($1)",
        );
        if filters.min_standard.is_some() {
            sql.push_str(" AND h.standard >= $2");
        }
        if filters.require_wifi == Some(true) {
            sql.push_str(" AND h.has_wifi");
        }
        if filters.require_pool == Some(true) {
            sql.push_str(" AND h.has_pool");
        }
        if filters.require_parking == Some(true) {
            sql.push_str(" AND h.has_parking");
        }

        let mut query = sqlx::query_as::<_, HotelRow>(&sql).bind(cities.to_vec());
        if let Some(min) = filters.min_standard {
            query = query.bind(min as i32);
        }
        let rows = query
            .fetch_all(&self.pool)
            .await
            .map_err(supplier_backend)?;
        Ok(rows.into_iter().map(Hotel::from).collect())
    }

    async fn list_available_hotel_ids(
        &self,
        date_from: NaiveDate,
        date_to: NaiveDate,
        guests: u32,
    ) -> Result<HashSet<HotelId>, SupplierError> {
        let rows: Vec<(i64,)> = sqlx::query_as(
            "SELECT hotel_id FROM hotel_availability \
             WHERE is_available AND max_guests >= $1 AND date_from <= $2 AND date_to >= $3",
        )
        .bind(guests as i32)
        .bind(date_from)
        .bind(date_to)
        .fetch_all(&self.pool)
        .await
        .map_err(supplier_backend)?;
        Ok(rows.into_iter().map(|r| r.0).collect())
    }

    async fn list_transfers(&self, cities: &[String]) -> Result<Vec<Transfer>, SupplierError> {
        let rows: Vec<TransferRow> = sqlx::query_as(
            "SELECT t.id, t.name, t.kind, t.city_id, t.price, t.rating, t.available \
             FROM transfers t \
             JOIN cities c ON t.city_id = c.id \
             WHERE c.name = ANY($1)",
        )
        .bind(cities.to_vec())
        .fetch_all(&self.pool)
        .await
        .map_err(supplier_backend)?;
        rows.into_iter()
            .map(|r| {
                r.into_transfer()
                    .map_err(|e| SupplierError::Malformed(e.to_string()))
            })
            .collect()
    }

    async fn quote_hotels(
        &self,
        city: &str,
        date_from: NaiveDate,
        date_to: NaiveDate,
        guests: u32,
    ) -> Result<Vec<HotelQuote>, SupplierError> {
        self.remote.quote_hotels(city, date_from, date_to, guests).await
    }

    async fn quote_flights(
        &self,
        origin_city: &str,
        destination_city: &str,
        date: NaiveDate,
    ) -> Result<Vec<FlightQuote>, SupplierError> {
        self.remote
            .quote_flights(origin_city, destination_city, date)
            .await
    }

    async fn quote_transfers(&self, city: &str) -> Result<Vec<TransferQuote>, SupplierError> {
        self.remote.quote_transfers(city).await
    }
}
