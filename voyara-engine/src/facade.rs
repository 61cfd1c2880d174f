//! The operation set exposed to the booking/presentation layer.

use std::sync::Arc;

use chrono::NaiveDate;
use tracing::info;

use voyara_core::repository::{BookingRepository, EventStore, InventoryStore};
use voyara_core::supplier::InventoryAdapter;
use voyara_core::{EngineError, EngineResult};
use voyara_domain::{next_status, Booking, BookingAction, BookingStatus, EventRecord};
use voyara_shared::ids::BookingId;

use crate::alternatives::{AlternativeGenerator, AlternativeRules};
use crate::composer::{ComposeRules, PackageComposer, SearchRequest};

/// Facade over the composer, the alternative generator and the booking
/// store. The watchdog runs on its own schedule and is not reachable from
/// here; no user-facing operation blocks on it.
pub struct Engine {
    composer: PackageComposer,
    alternatives: Arc<AlternativeGenerator>,
    bookings: Arc<dyn BookingRepository>,
    events: Arc<dyn EventStore>,
}

impl Engine {
    pub fn new(
        supplier: Arc<dyn InventoryAdapter>,
        bookings: Arc<dyn BookingRepository>,
        inventory: Arc<dyn InventoryStore>,
        events: Arc<dyn EventStore>,
        compose_rules: ComposeRules,
        alternative_rules: AlternativeRules,
    ) -> Self {
        let composer = PackageComposer::new(
            supplier.clone(),
            bookings.clone(),
            inventory.clone(),
            compose_rules,
        );
        let alternatives = Arc::new(AlternativeGenerator::new(
            supplier,
            bookings.clone(),
            inventory,
            alternative_rules,
        ));
        Self {
            composer,
            alternatives,
            bookings,
            events,
        }
    }

    /// The alternative generator, shared with the watchdog.
    pub fn alternative_generator(&self) -> Arc<AlternativeGenerator> {
        self.alternatives.clone()
    }

    /// Compose priced, deduplicated package candidates for a search.
    pub async fn compose_packages(&self, request: &SearchRequest) -> EngineResult<Vec<Booking>> {
        self.composer.compose(request).await
    }

    /// Generate replacements for a disrupted booking; returns how many were
    /// created.
    pub async fn generate_alternatives(&self, booking_id: BookingId) -> EngineResult<usize> {
        self.alternatives.generate_for(booking_id).await
    }

    /// The pure lifecycle transition consumed by the payment flow.
    pub fn transition(&self, current: BookingStatus, action: BookingAction) -> BookingStatus {
        next_status(current, action)
    }

    pub async fn count_disrupted(&self) -> EngineResult<u64> {
        Ok(self.bookings.count_by_status(BookingStatus::Disrupted).await?)
    }

    /// Replacements still open for a disrupted booking, cheapest first.
    /// Empty when the booking is missing or no longer disrupted.
    pub async fn list_alternatives(&self, booking_id: BookingId) -> EngineResult<Vec<Booking>> {
        let Some(original) = self.bookings.get(booking_id).await? else {
            return Ok(Vec::new());
        };
        if original.status != BookingStatus::Disrupted {
            return Ok(Vec::new());
        }
        let mut children = self
            .bookings
            .list_children(booking_id, BookingStatus::Prepared)
            .await?;
        children.sort_by(|a, b| a.total_price.total_cmp(&b.total_price));
        Ok(children)
    }

    /// Accept replacement `alternative_id` for disrupted `original_id`: the
    /// replacement takes over as `booked`, the original is cancelled.
    pub async fn accept_alternative(
        &self,
        original_id: BookingId,
        alternative_id: BookingId,
    ) -> EngineResult<Booking> {
        let original = self
            .bookings
            .get(original_id)
            .await?
            .ok_or(EngineError::BookingNotFound(original_id))?;
        let alternative = self
            .bookings
            .get(alternative_id)
            .await?
            .ok_or(EngineError::BookingNotFound(alternative_id))?;
        if alternative.parent_booking_id != Some(original.id) {
            return Err(EngineError::NotAlternative {
                original: original_id,
                alt: alternative_id,
            });
        }

        self.bookings
            .update_status(original.id, BookingStatus::Cancelled)
            .await?;
        self.bookings
            .update_status(alternative.id, BookingStatus::Booked)
            .await?;
        info!(
            original = original.id,
            replacement = alternative.id,
            "replacement accepted"
        );

        self.bookings
            .get(alternative.id)
            .await?
            .ok_or(EngineError::BookingNotFound(alternative.id))
    }

    /// Explicit user cancellation, from any status.
    pub async fn cancel_booking(&self, booking_id: BookingId) -> EngineResult<()> {
        let booking = self
            .bookings
            .get(booking_id)
            .await?
            .ok_or(EngineError::BookingNotFound(booking_id))?;
        self.bookings
            .update_status(booking.id, BookingStatus::Cancelled)
            .await?;
        Ok(())
    }

    /// Keep a disrupted booking anyway.
    pub async fn accept_risk(&self, booking_id: BookingId) -> EngineResult<()> {
        let booking = self
            .bookings
            .get(booking_id)
            .await?
            .ok_or(EngineError::BookingNotFound(booking_id))?;
        self.bookings
            .update_status(booking.id, BookingStatus::RiskAccepted)
            .await?;
        Ok(())
    }

    /// The most severe HIGH/CRITICAL mirrored event overlapping a planned
    /// stay in `city`, for risk display alongside search results.
    pub async fn blocking_event(
        &self,
        city: &str,
        date_from: NaiveDate,
        date_to: NaiveDate,
    ) -> EngineResult<Option<EventRecord>> {
        Ok(self.events.blocking_event(city, date_from, date_to).await?)
    }
}
