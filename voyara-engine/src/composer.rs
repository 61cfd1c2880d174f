//! The itinerary composer: joins outbound flights, return flights, hotels
//! and transfer pairs into priced package candidates, deduplicated against
//! the booking store.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;

use voyara_catalog::{
    filters::{flight_is_bookable, hotel_matches, transfer_is_usable},
    pricing::{nights_between, package_price, package_rating},
};
use voyara_core::repository::{BookingRepository, InventoryStore};
use voyara_core::supplier::{HotelFilters, InventoryAdapter};
use voyara_core::EngineResult;
use voyara_domain::{Booking, BookingStatus, City, Flight, Hotel, Transfer};
use voyara_shared::ids::CityId;

/// Caps applied to composition results.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComposeRules {
    /// Result cap when an explicit destination is requested.
    pub max_results: usize,
    /// Destination-city cap on the open-destination path.
    pub max_cities: usize,
    /// Per-city cap on the open-destination path.
    pub per_city: usize,
}

impl Default for ComposeRules {
    fn default() -> Self {
        Self {
            max_results: 5,
            max_cities: 5,
            per_city: 2,
        }
    }
}

/// A composition request from the booking/presentation layer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchRequest {
    pub start_city: String,
    /// `None` searches every known destination, diversified per
    /// `ComposeRules`.
    pub destination_city: Option<String>,
    pub date_from: NaiveDate,
    pub date_to: NaiveDate,
    pub guests: u32,
    /// Ceiling on the package total; a package priced exactly at the budget
    /// is kept, anything above is excluded.
    pub budget: f64,
    #[serde(default)]
    pub filters: HotelFilters,
}

pub struct PackageComposer {
    supplier: Arc<dyn InventoryAdapter>,
    bookings: Arc<dyn BookingRepository>,
    inventory: Arc<dyn InventoryStore>,
    rules: ComposeRules,
}

impl PackageComposer {
    pub fn new(
        supplier: Arc<dyn InventoryAdapter>,
        bookings: Arc<dyn BookingRepository>,
        inventory: Arc<dyn InventoryStore>,
        rules: ComposeRules,
    ) -> Self {
        Self {
            supplier,
            bookings,
            inventory,
            rules,
        }
    }

    /// Compose priced package candidates for the request.
    ///
    /// Candidates are persisted in status `prepared`, at most once per
    /// inventory 5-tuple: re-running an identical search returns the same
    /// packages without growing the store. An unknown city resolves to an
    /// empty result; an unavailable provider propagates as a distinct
    /// service-unavailable error, never as an empty result.
    pub async fn compose(&self, request: &SearchRequest) -> EngineResult<Vec<Booking>> {
        let Some(start) = self.inventory.city_by_name(&request.start_city).await? else {
            return Ok(Vec::new());
        };

        match &request.destination_city {
            Some(name) => {
                let Some(destination) = self.inventory.city_by_name(name).await? else {
                    return Ok(Vec::new());
                };
                let mut candidates = self.compose_for_city(&start, &destination, request).await?;
                candidates.sort_by(|a, b| a.total_price.total_cmp(&b.total_price));
                candidates.truncate(self.rules.max_results);
                Ok(candidates)
            }
            None => self.compose_anywhere(&start, request).await,
        }
    }

    /// Open-destination search: compose once per known city, then keep the
    /// cheapest candidates subject to the diversity caps (at most
    /// `per_city` per destination across at most `max_cities` cities).
    async fn compose_anywhere(
        &self,
        start: &City,
        request: &SearchRequest,
    ) -> EngineResult<Vec<Booking>> {
        let mut all = Vec::new();
        for city in self.inventory.list_cities().await? {
            if city.id == start.id {
                continue;
            }
            all.extend(self.compose_for_city(start, &city, request).await?);
        }
        all.sort_by(|a, b| a.total_price.total_cmp(&b.total_price));

        let mut per_city: HashMap<CityId, usize> = HashMap::new();
        let mut picked = Vec::new();
        for booking in all {
            let slot = *per_city.entry(booking.visited_city_id).or_insert(0);
            if slot >= self.rules.per_city {
                continue;
            }
            if slot == 0 && per_city.len() > self.rules.max_cities {
                // entry() above already inserted the city; it stays at zero
                // and is never represented.
                continue;
            }
            *per_city.get_mut(&booking.visited_city_id).unwrap() += 1;
            picked.push(booking);
            if picked.len() >= self.rules.max_cities * self.rules.per_city {
                break;
            }
        }
        Ok(picked)
    }

    async fn compose_for_city(
        &self,
        start: &City,
        destination: &City,
        request: &SearchRequest,
    ) -> EngineResult<Vec<Booking>> {
        // The four inventories are independent read-only queries; fetch
        // them concurrently.
        let (outbound, returning, hotels, transfers) = tokio::join!(
            self.supplier.list_outbound_flights(
                &start.name,
                request.date_from,
                Some(destination.name.as_str()),
            ),
            self.supplier
                .list_return_flights(&destination.name, request.date_to),
            self.supplier
                .list_hotels(std::slice::from_ref(&destination.name), &request.filters),
            self.supplier
                .list_transfers(std::slice::from_ref(&destination.name)),
        );

        let outbound: Vec<Flight> = outbound?
            .into_iter()
            .filter(|f| flight_is_bookable(f) && f.destination_city_id == destination.id)
            .collect();
        let returning: Vec<Flight> = returning?
            .into_iter()
            .filter(|f| flight_is_bookable(f) && f.destination_city_id == start.id)
            .collect();
        let mut hotels: Vec<Hotel> = hotels?
            .into_iter()
            .filter(|h| h.city_id == destination.id && hotel_matches(h, &request.filters))
            .collect();
        let transfers: Vec<Transfer> = transfers?
            .into_iter()
            .filter(|t| t.city_id == destination.id && transfer_is_usable(t))
            .collect();

        if outbound.is_empty() || returning.is_empty() || hotels.is_empty() || transfers.is_empty()
        {
            return Ok(Vec::new());
        }

        let available = self
            .supplier
            .list_available_hotel_ids(request.date_from, request.date_to, request.guests)
            .await?;
        hotels.retain(|h| available.contains(&h.id));
        if hotels.is_empty() {
            return Ok(Vec::new());
        }

        let nights = nights_between(request.date_from, request.date_to);
        let mut candidates = Vec::new();

        for flight_out in &outbound {
            for flight_back in &returning {
                for hotel in &hotels {
                    for start_transfer in &transfers {
                        for end_transfer in &transfers {
                            let total_price = package_price(
                                flight_out.price,
                                flight_back.price,
                                hotel.nightly_price,
                                nights,
                                start_transfer.price,
                                end_transfer.price,
                            );
                            if total_price > request.budget {
                                continue;
                            }

                            let draft = Booking {
                                id: 0,
                                status: BookingStatus::Prepared,
                                hotel_id: hotel.id,
                                start_transfer_id: start_transfer.id,
                                end_transfer_id: end_transfer.id,
                                outbound_flight_id: flight_out.id,
                                return_flight_id: flight_back.id,
                                start_city_id: start.id,
                                visited_city_id: destination.id,
                                date_from: request.date_from,
                                date_to: request.date_to,
                                guests: request.guests,
                                total_price,
                                rating: package_rating(
                                    hotel.rating,
                                    start_transfer.rating,
                                    end_transfer.rating,
                                ),
                                discount: None,
                                disruption: None,
                                parent_booking_id: None,
                                created_at: Utc::now(),
                            };

                            // Idempotency guard: a non-cancelled booking with
                            // the same 5-tuple is never re-inserted. Only a
                            // still-prepared one re-enters the results.
                            match self.bookings.find_by_combination(&draft.key()).await? {
                                Some(existing) if existing.status == BookingStatus::Prepared => {
                                    candidates.push(existing)
                                }
                                Some(_) => {}
                                None => candidates.push(self.bookings.create(draft).await?),
                            }
                        }
                    }
                }
            }
        }

        debug!(
            destination = %destination.name,
            count = candidates.len(),
            "composed package candidates"
        );
        Ok(candidates)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_rules_cap_open_search_at_ten() {
        let rules = ComposeRules::default();
        assert_eq!(rules.max_cities * rules.per_city, 10);
        assert_eq!(rules.max_results, 5);
    }
}
