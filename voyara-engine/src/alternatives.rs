//! Replacement-package generation for disrupted bookings.
//!
//! Re-runs composition against alternative destination cities under a
//! tightened budget ceiling (the original's price) and rating floor (the
//! original's rating, rounded down).

use std::sync::Arc;

use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use voyara_catalog::pricing::{nights_between, package_price, package_rating};
use voyara_core::repository::{BookingRepository, InventoryStore};
use voyara_core::supplier::InventoryAdapter;
use voyara_core::{EngineError, EngineResult};
use voyara_domain::{Booking, BookingStatus};
use voyara_shared::ids::BookingId;

/// Disruption types that tolerate replacement by destination substitution.
/// A cancelled flight or transfer outage on a single leg is not resolved by
/// moving the whole trip.
const REPLACEABLE: [&str; 3] = ["WEATHER", "SECURITY", "HOTEL"];

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AlternativeRules {
    /// Replacement cap across all candidate cities.
    pub max_alternatives: usize,
    /// How many destination cities to try.
    pub candidate_cities: usize,
}

impl Default for AlternativeRules {
    fn default() -> Self {
        Self {
            max_alternatives: 5,
            candidate_cities: 3,
        }
    }
}

pub struct AlternativeGenerator {
    supplier: Arc<dyn InventoryAdapter>,
    bookings: Arc<dyn BookingRepository>,
    inventory: Arc<dyn InventoryStore>,
    rules: AlternativeRules,
}

impl AlternativeGenerator {
    pub fn new(
        supplier: Arc<dyn InventoryAdapter>,
        bookings: Arc<dyn BookingRepository>,
        inventory: Arc<dyn InventoryStore>,
        rules: AlternativeRules,
    ) -> Self {
        Self {
            supplier,
            bookings,
            inventory,
            rules,
        }
    }

    /// Generate replacements for the booking with this id. Returns the
    /// number of replacement bookings created.
    pub async fn generate_for(&self, booking_id: BookingId) -> EngineResult<usize> {
        let original = self
            .bookings
            .get(booking_id)
            .await?
            .ok_or(EngineError::BookingNotFound(booking_id))?;
        self.generate(&original).await
    }

    /// Generate replacements for a disrupted booking.
    ///
    /// No-op for bookings that are not currently `disrupted`, for disruption
    /// types that replacement cannot fix, and for bookings that already have
    /// `prepared` replacements (a repeat event re-stamps the disruption but
    /// does not regenerate).
    pub async fn generate(&self, original: &Booking) -> EngineResult<usize> {
        if original.status != BookingStatus::Disrupted {
            return Ok(0);
        }
        let Some(stamp) = &original.disruption else {
            return Ok(0);
        };
        if !REPLACEABLE.contains(&stamp.kind.as_str()) {
            return Ok(0);
        }
        if !self
            .bookings
            .list_children(original.id, BookingStatus::Prepared)
            .await?
            .is_empty()
        {
            debug!(booking = original.id, "replacements already exist, skipping");
            return Ok(0);
        }

        let rating_floor = original.rating.floor();
        let budget_ceiling = original.total_price;
        let nights = nights_between(original.date_from, original.date_to);

        let start_city = self
            .inventory
            .city(original.start_city_id)
            .await?
            .ok_or_else(|| {
                EngineError::Store(voyara_core::StoreError::unknown(
                    "city",
                    original.start_city_id,
                ))
            })?;
        let candidates = self
            .inventory
            .candidate_cities(original.visited_city_id, self.rules.candidate_cities)
            .await?;

        let mut drafts: Vec<Booking> = Vec::new();

        'cities: for city in candidates {
            if drafts.len() >= self.rules.max_alternatives {
                break;
            }

            // A provider failure for one candidate city skips that city
            // only; the remaining cities still get their chance.
            let (hotels, flights_out, flights_back, transfers) = tokio::join!(
                self.supplier.quote_hotels(
                    &city.name,
                    original.date_from,
                    original.date_to,
                    original.guests,
                ),
                self.supplier
                    .quote_flights(&start_city.name, &city.name, original.date_from),
                self.supplier
                    .quote_flights(&city.name, &start_city.name, original.date_to),
                self.supplier.quote_transfers(&city.name),
            );
            let (hotels, flights_out, flights_back, transfers) =
                match (hotels, flights_out, flights_back, transfers) {
                    (Ok(h), Ok(fo), Ok(fb), Ok(t)) => (h, fo, fb, t),
                    (h, fo, fb, t) => {
                        let error = [
                            h.err().map(|e| e.to_string()),
                            fo.err().map(|e| e.to_string()),
                            fb.err().map(|e| e.to_string()),
                            t.err().map(|e| e.to_string()),
                        ]
                        .into_iter()
                        .flatten()
                        .next()
                        .unwrap_or_default();
                        warn!(city = %city.name, %error, "skipping candidate city");
                        continue;
                    }
                };

            for hotel_quote in &hotels {
                if hotel_quote.rating < rating_floor {
                    continue;
                }
                for flight_to in &flights_out {
                    for flight_back in &flights_back {
                        for start_transfer in &transfers {
                            for end_transfer in &transfers {
                                if drafts.len() >= self.rules.max_alternatives {
                                    break 'cities;
                                }

                                let total_price = package_price(
                                    flight_to.price,
                                    flight_back.price,
                                    hotel_quote.nightly_price,
                                    nights,
                                    start_transfer.price,
                                    end_transfer.price,
                                );
                                if total_price > budget_ceiling {
                                    continue;
                                }
                                let rating = package_rating(
                                    hotel_quote.rating,
                                    start_transfer.rating,
                                    end_transfer.rating,
                                );
                                if rating < rating_floor {
                                    continue;
                                }

                                // Alternative inventory may come from a
                                // source not mirrored yet: get-or-create by
                                // natural key before referencing it.
                                let hotel =
                                    self.inventory.upsert_hotel(hotel_quote, city.id).await?;
                                let outbound = self
                                    .inventory
                                    .upsert_flight(flight_to, original.start_city_id, city.id)
                                    .await?;
                                let returning = self
                                    .inventory
                                    .upsert_flight(flight_back, city.id, original.start_city_id)
                                    .await?;
                                let start = self
                                    .inventory
                                    .upsert_transfer(start_transfer, city.id)
                                    .await?;
                                let end =
                                    self.inventory.upsert_transfer(end_transfer, city.id).await?;

                                drafts.push(Booking {
                                    id: 0,
                                    status: BookingStatus::Prepared,
                                    hotel_id: hotel.id,
                                    start_transfer_id: start.id,
                                    end_transfer_id: end.id,
                                    outbound_flight_id: outbound.id,
                                    return_flight_id: returning.id,
                                    start_city_id: original.start_city_id,
                                    visited_city_id: city.id,
                                    date_from: original.date_from,
                                    date_to: original.date_to,
                                    guests: original.guests,
                                    total_price,
                                    rating,
                                    discount: None,
                                    disruption: None,
                                    parent_booking_id: Some(original.id),
                                    created_at: Utc::now(),
                                });
                            }
                        }
                    }
                }
            }
        }

        if drafts.is_empty() {
            return Ok(0);
        }
        let created = self.bookings.create_batch(drafts).await?;
        debug!(
            booking = original.id,
            count = created.len(),
            "created replacement packages"
        );
        Ok(created.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flight_and_transfer_disruptions_are_not_replaceable() {
        assert!(!REPLACEABLE.contains(&"FLIGHT"));
        assert!(!REPLACEABLE.contains(&"TRANSFER"));
        assert!(REPLACEABLE.contains(&"WEATHER"));
        assert!(REPLACEABLE.contains(&"SECURITY"));
        assert!(REPLACEABLE.contains(&"HOTEL"));
    }

    #[test]
    fn default_rules_match_the_engine_caps() {
        let rules = AlternativeRules::default();
        assert_eq!(rules.max_alternatives, 5);
        assert_eq!(rules.candidate_cities, 3);
    }
}
