//! HTTP clients for the external provider endpoints.
//!
//! Connection failures, timeouts and 5xx responses surface as
//! `SupplierError::Unavailable`; an undecodable body is `Malformed`. Both
//! are per-call outcomes. The clients hold no circuit state; the callers
//! decide whether to skip a tick or a city.

use std::time::Duration;

use chrono::NaiveDate;
use reqwest::Client;
use serde::Deserialize;
use tracing::debug;

use voyara_core::supplier::EventFeed;
use voyara_core::SupplierError;
use voyara_domain::{DisruptionEvent, FlightQuote, FlightStatus, HotelQuote, TransferKind, TransferQuote};
use voyara_shared::ids::EventId;

fn transport(e: reqwest::Error) -> SupplierError {
    SupplierError::Unavailable(e.to_string())
}

fn decode(e: reqwest::Error) -> SupplierError {
    SupplierError::Malformed(e.to_string())
}

async fn check_status(response: reqwest::Response) -> Result<reqwest::Response, SupplierError> {
    if !response.status().is_success() {
        return Err(SupplierError::Unavailable(format!(
            "provider responded {}",
            response.status()
        )));
    }
    Ok(response)
}

/// Wire shape of the provider's hotel quotes.
#[derive(Debug, Deserialize)]
struct HotelWire {
    name: String,
    #[serde(default)]
    standard: Option<u8>,
    capacity: u32,
    rating: f64,
    price_per_night: f64,
    #[serde(default)]
    has_wifi: bool,
    #[serde(default)]
    has_pool: bool,
    #[serde(default)]
    has_parking: bool,
    #[serde(default)]
    has_restaurant: bool,
}

#[derive(Debug, Deserialize)]
struct FlightWire {
    flight_number: String,
    price: f64,
}

#[derive(Debug, Deserialize)]
struct TransferWire {
    #[serde(rename = "type")]
    kind: String,
    name: String,
    rating: f64,
    price: f64,
}

/// Client for the provider's quote endpoints.
pub struct HttpQuoteClient {
    client: Client,
    base_url: String,
}

impl HttpQuoteClient {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, SupplierError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(transport)?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub async fn quote_hotels(
        &self,
        city: &str,
        date_from: NaiveDate,
        date_to: NaiveDate,
        guests: u32,
    ) -> Result<Vec<HotelQuote>, SupplierError> {
        let response = self
            .client
            .get(format!("{}/external/hotels", self.base_url))
            .query(&[
                ("city", city.to_string()),
                ("date_from", date_from.to_string()),
                ("date_to", date_to.to_string()),
                ("guests", guests.to_string()),
            ])
            .send()
            .await
            .map_err(transport)?;
        let wires: Vec<HotelWire> = check_status(response).await?.json().await.map_err(decode)?;
        debug!(city, count = wires.len(), "fetched hotel quotes");
        Ok(wires
            .into_iter()
            .map(|w| HotelQuote {
                name: w.name,
                city: city.to_string(),
                standard: w.standard.unwrap_or(3),
                nightly_price: w.price_per_night,
                capacity: w.capacity,
                rating: w.rating,
                has_wifi: w.has_wifi,
                has_pool: w.has_pool,
                has_parking: w.has_parking,
                has_restaurant: w.has_restaurant,
            })
            .collect())
    }

    pub async fn quote_flights(
        &self,
        origin_city: &str,
        destination_city: &str,
        date: NaiveDate,
    ) -> Result<Vec<FlightQuote>, SupplierError> {
        let response = self
            .client
            .get(format!("{}/external/flights", self.base_url))
            .query(&[
                ("origin", origin_city.to_string()),
                ("destination", destination_city.to_string()),
                ("date", date.to_string()),
            ])
            .send()
            .await
            .map_err(transport)?;
        let wires: Vec<FlightWire> = check_status(response).await?.json().await.map_err(decode)?;
        Ok(wires
            .into_iter()
            .map(|w| FlightQuote {
                flight_number: w.flight_number,
                origin: origin_city.to_string(),
                destination: destination_city.to_string(),
                date,
                price: w.price,
                status: FlightStatus::Scheduled,
            })
            .collect())
    }

    pub async fn quote_transfers(&self, city: &str) -> Result<Vec<TransferQuote>, SupplierError> {
        let response = self
            .client
            .get(format!("{}/external/transfers", self.base_url))
            .query(&[("city", city)])
            .send()
            .await
            .map_err(transport)?;
        let wires: Vec<TransferWire> =
            check_status(response).await?.json().await.map_err(decode)?;
        wires
            .into_iter()
            .map(|w| {
                let kind = w
                    .kind
                    .to_uppercase()
                    .parse::<TransferKind>()
                    .map_err(SupplierError::Malformed)?;
                Ok(TransferQuote {
                    name: w.name,
                    kind,
                    city: city.to_string(),
                    price: w.price,
                    rating: w.rating,
                    available: true,
                })
            })
            .collect()
    }
}

/// Client for the provider's cursor-based event feed.
pub struct HttpEventFeed {
    client: Client,
    base_url: String,
}

impl HttpEventFeed {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, SupplierError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(transport)?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }
}

#[async_trait::async_trait]
impl EventFeed for HttpEventFeed {
    async fn poll_events(&self, since: EventId) -> Result<Vec<DisruptionEvent>, SupplierError> {
        let response = self
            .client
            .get(format!("{}/external/events", self.base_url))
            .query(&[("since", since)])
            .send()
            .await
            .map_err(transport)?;
        let mut events: Vec<DisruptionEvent> =
            check_status(response).await?.json().await.map_err(decode)?;
        events.sort_by_key(|e| e.id);
        Ok(events)
    }
}
