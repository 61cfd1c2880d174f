//! The disruption watchdog: a single perpetual polling loop that maps feed
//! events onto confirmed bookings and kicks off replacement generation.

use std::sync::Arc;
use std::time::Duration;

use tracing::{info, warn};

use voyara_core::repository::{BookingRepository, EventStore, InventoryStore};
use voyara_core::supplier::EventFeed;
use voyara_core::EngineResult;
use voyara_domain::{Booking, BookingStatus, DisruptionEvent, DisruptionStamp, EventKind, EventRecord};
use voyara_shared::ids::{CityId, EventId};

use crate::alternatives::AlternativeGenerator;

#[derive(Debug, Clone)]
pub struct WatchdogConfig {
    pub poll_interval: Duration,
}

impl Default for WatchdogConfig {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_secs(15),
        }
    }
}

/// What one tick did. Mostly interesting to tests and log lines.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct TickOutcome {
    pub events_seen: usize,
    pub bookings_disrupted: usize,
    pub alternatives_created: usize,
}

/// Bookings affected by an event, under the type-specific matching rules.
///
/// Only `booked` bookings whose stay overlaps the event window are
/// considered. City-scoped events need the event's city resolved to an id
/// by the caller; an unresolvable city matches nothing.
pub fn affected_bookings<'a>(
    event: &DisruptionEvent,
    event_city: Option<CityId>,
    bookings: &'a [Booking],
) -> Vec<&'a Booking> {
    bookings
        .iter()
        .filter(|b| b.status == BookingStatus::Booked)
        .filter(|b| b.overlaps(event.date_from, event.date_to))
        .filter(|b| match &event.kind {
            EventKind::Weather { .. } | EventKind::Security { .. } => {
                event_city == Some(b.visited_city_id)
            }
            EventKind::Hotel { hotel_id } => *hotel_id == b.hotel_id,
            EventKind::Flight { flight_id } => {
                *flight_id == b.outbound_flight_id || *flight_id == b.return_flight_id
            }
            EventKind::Transfer { transfer_id } => {
                *transfer_id == b.start_transfer_id || *transfer_id == b.end_transfer_id
            }
        })
        .collect()
}

pub struct DisruptionWatchdog {
    feed: Arc<dyn EventFeed>,
    bookings: Arc<dyn BookingRepository>,
    events: Arc<dyn EventStore>,
    inventory: Arc<dyn InventoryStore>,
    alternatives: Arc<AlternativeGenerator>,
    config: WatchdogConfig,
}

impl DisruptionWatchdog {
    pub fn new(
        feed: Arc<dyn EventFeed>,
        bookings: Arc<dyn BookingRepository>,
        events: Arc<dyn EventStore>,
        inventory: Arc<dyn InventoryStore>,
        alternatives: Arc<AlternativeGenerator>,
        config: WatchdogConfig,
    ) -> Self {
        Self {
            feed,
            bookings,
            events,
            inventory,
            alternatives,
            config,
        }
    }

    /// Run the watchdog forever. The caller owns exactly one of these per
    /// deployment; concurrent instances would race on the cursor.
    pub async fn run(self) {
        let mut cursor = match self.events.load_cursor().await {
            Ok(cursor) => cursor,
            Err(error) => {
                warn!(%error, "could not load event cursor, starting from 0");
                0
            }
        };
        info!(cursor, period = ?self.config.poll_interval, "watchdog started");

        let mut interval = tokio::time::interval(self.config.poll_interval);
        interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
        loop {
            interval.tick().await;
            match self.tick(cursor).await {
                Ok((next_cursor, outcome)) => {
                    if outcome.events_seen > 0 {
                        info!(
                            cursor = next_cursor,
                            events = outcome.events_seen,
                            disrupted = outcome.bookings_disrupted,
                            alternatives = outcome.alternatives_created,
                            "tick reconciled"
                        );
                    }
                    cursor = next_cursor;
                }
                Err(error) => {
                    warn!(%error, "tick failed, retrying next period");
                }
            }
        }
    }

    /// One poll-and-reconcile pass.
    ///
    /// A feed failure skips the whole tick without advancing the cursor. On
    /// a successful poll the cursor advances to the highest id observed (it
    /// tracks feed position, not processing outcome) and is persisted once
    /// the batch is reconciled.
    pub async fn tick(&self, cursor: EventId) -> EngineResult<(EventId, TickOutcome)> {
        let booked = self.bookings.list_by_status(BookingStatus::Booked).await?;

        let events = match self.feed.poll_events(cursor).await {
            Ok(events) => events,
            Err(error) => {
                warn!(%error, "event feed unavailable, skipping tick");
                return Ok((cursor, TickOutcome::default()));
            }
        };
        if events.is_empty() {
            return Ok((cursor, TickOutcome::default()));
        }

        let mut outcome = TickOutcome {
            events_seen: events.len(),
            ..TickOutcome::default()
        };
        let mut next_cursor = cursor;

        for event in &events {
            next_cursor = next_cursor.max(event.id);

            // City-scoped events are mirrored durably before any booking is
            // touched, so the alert surface can show them later.
            if let Some(record) = EventRecord::mirror(event) {
                self.events.record(record).await?;
            }

            let event_city = match event.kind.city() {
                Some(name) => self.inventory.city_by_name(name).await?.map(|c| c.id),
                None => None,
            };

            for booking in affected_bookings(event, event_city, &booked) {
                let stamp = DisruptionStamp {
                    kind: event.kind.type_name().to_string(),
                    severity: event.severity,
                    message: event.message.clone(),
                };
                self.bookings.mark_disrupted(booking.id, stamp).await?;
                outcome.bookings_disrupted += 1;

                // Replacement generation is best-effort per booking; one
                // failure must not stop the remaining matches.
                match self.alternatives.generate_for(booking.id).await {
                    Ok(count) => outcome.alternatives_created += count,
                    Err(error) => {
                        warn!(booking = booking.id, %error, "alternative generation failed");
                    }
                }
            }
        }

        self.events.save_cursor(next_cursor).await?;
        Ok((next_cursor, outcome))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, Utc};
    use voyara_domain::Severity;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn booked(id: i64) -> Booking {
        Booking {
            id,
            status: BookingStatus::Booked,
            hotel_id: 10,
            start_transfer_id: 20,
            end_transfer_id: 21,
            outbound_flight_id: 30,
            return_flight_id: 31,
            start_city_id: 1,
            visited_city_id: 2,
            date_from: date(2026, 5, 1),
            date_to: date(2026, 5, 10),
            guests: 2,
            total_price: 4000.0,
            rating: 8.5,
            discount: None,
            disruption: None,
            parent_booking_id: None,
            created_at: Utc::now(),
        }
    }

    fn event(kind: EventKind, from: NaiveDate, to: NaiveDate) -> DisruptionEvent {
        DisruptionEvent {
            id: 1,
            kind,
            severity: Severity::High,
            date_from: from,
            date_to: to,
            message: "test".into(),
        }
    }

    #[test]
    fn hotel_event_matches_exactly_that_hotel() {
        let bookings = vec![booked(1), {
            let mut other = booked(2);
            other.hotel_id = 99;
            other
        }];
        let e = event(
            EventKind::Hotel { hotel_id: 10 },
            date(2026, 5, 1),
            date(2026, 5, 10),
        );
        let affected = affected_bookings(&e, None, &bookings);
        assert_eq!(affected.len(), 1);
        assert_eq!(affected[0].id, 1);
    }

    #[test]
    fn weather_event_in_another_city_matches_nothing() {
        let bookings = vec![booked(1)]; // visited city 2
        let e = event(
            EventKind::Weather { city: "Rzym".into() },
            date(2026, 5, 2),
            date(2026, 5, 8),
        );
        // "Rzym" resolves to city 7, the booking visits city 2.
        assert!(affected_bookings(&e, Some(7), &bookings).is_empty());
    }

    #[test]
    fn weather_event_matches_on_visited_city() {
        let bookings = vec![booked(1)];
        let e = event(
            EventKind::Weather { city: "Paryż".into() },
            date(2026, 5, 2),
            date(2026, 5, 8),
        );
        assert_eq!(affected_bookings(&e, Some(2), &bookings).len(), 1);
    }

    #[test]
    fn flight_event_matches_either_leg() {
        let bookings = vec![booked(1)];
        let outbound = event(
            EventKind::Flight { flight_id: 30 },
            date(2026, 5, 1),
            date(2026, 5, 1),
        );
        let returning = event(
            EventKind::Flight { flight_id: 31 },
            date(2026, 5, 10),
            date(2026, 5, 10),
        );
        let unrelated = event(
            EventKind::Flight { flight_id: 99 },
            date(2026, 5, 1),
            date(2026, 5, 10),
        );
        assert_eq!(affected_bookings(&outbound, None, &bookings).len(), 1);
        assert_eq!(affected_bookings(&returning, None, &bookings).len(), 1);
        assert!(affected_bookings(&unrelated, None, &bookings).is_empty());
    }

    #[test]
    fn event_window_before_the_stay_matches_nothing() {
        let mut b = booked(1);
        b.date_from = date(2026, 5, 16);
        b.date_to = date(2026, 5, 20);
        let e = event(
            EventKind::Flight { flight_id: 30 },
            date(2026, 5, 15),
            date(2026, 5, 15),
        );
        assert!(affected_bookings(&e, None, &[b]).is_empty());
    }

    #[test]
    fn transfer_event_matches_either_transfer() {
        let bookings = vec![booked(1)];
        let e = event(
            EventKind::Transfer { transfer_id: 21 },
            date(2026, 5, 1),
            date(2026, 5, 10),
        );
        assert_eq!(affected_bookings(&e, None, &bookings).len(), 1);
    }

    #[test]
    fn non_booked_bookings_are_never_matched() {
        let mut b = booked(1);
        b.status = BookingStatus::Disrupted;
        let e = event(
            EventKind::Hotel { hotel_id: 10 },
            date(2026, 5, 1),
            date(2026, 5, 10),
        );
        assert!(affected_bookings(&e, None, &[b]).is_empty());
    }
}
