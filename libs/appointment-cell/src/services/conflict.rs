// libs/appointment-cell/src/services/conflict.rs
use chrono::{NaiveDate, NaiveTime};
use tracing::{debug, warn};
use uuid::Uuid;

use provider_cell::models::{BookedSlot, Provider, SuggestedSlot};
use provider_cell::services::AvailabilityResolver;
use shared_config::AppConfig;

use crate::models::{Booking, ConflictCheckResponse};
use crate::services::store::BookingStore;

pub const MAX_SUGGESTED_ALTERNATIVES: usize = 3;

/// Finds bookings that already hold a slot and proposes free slots instead.
#[derive(Debug, Clone)]
pub struct ConflictDetectionService {
    resolver: AvailabilityResolver,
    window_days: u32,
}

impl ConflictDetectionService {
    pub fn with_window(resolver: AvailabilityResolver, window_days: u32) -> Self {
        Self {
            resolver,
            window_days,
        }
    }

    pub fn from_config(resolver: AvailabilityResolver, config: &AppConfig) -> Self {
        Self::with_window(resolver, config.availability_window_days)
    }

    /// Check whether `(provider, date, time)` is already held. `exclude`
    /// names a booking to ignore, typically the one being rescheduled.
    pub fn check_conflicts(
        &self,
        store: &BookingStore,
        provider: &Provider,
        date: NaiveDate,
        time: NaiveTime,
        exclude: Option<Uuid>,
    ) -> ConflictCheckResponse {
        debug!("Checking conflicts for provider {} on {} at {}", provider.id, date, time);

        let conflicting_bookings: Vec<Booking> = store
            .conflicts(provider.id, date, time, exclude)
            .into_iter()
            .cloned()
            .collect();

        let has_conflict = !conflicting_bookings.is_empty();

        let suggested_alternatives = if has_conflict {
            warn!(
                "Conflict detected for provider {} - {} conflicting bookings",
                provider.id,
                conflicting_bookings.len()
            );
            self.generate_alternative_slots(store, provider, date, time, exclude)
        } else {
            vec![]
        };

        ConflictCheckResponse {
            has_conflict,
            conflicting_bookings,
            suggested_alternatives,
        }
    }

    /// Earliest free slot for the provider from `from`, strictly after
    /// `after` on that first day.
    pub fn find_next_available_slot(
        &self,
        store: &BookingStore,
        provider: &Provider,
        from: NaiveDate,
        after: Option<NaiveTime>,
    ) -> Option<SuggestedSlot> {
        debug!("Finding next available slot for provider {} from {}", provider.id, from);
        let held = store.held_slots_for(provider.id);
        self.resolver
            .next_available(provider, from, after, self.window_days, &held)
    }

    fn generate_alternative_slots(
        &self,
        store: &BookingStore,
        provider: &Provider,
        date: NaiveDate,
        time: NaiveTime,
        exclude: Option<Uuid>,
    ) -> Vec<SuggestedSlot> {
        debug!("Generating alternative slots for provider {}", provider.id);

        let held: Vec<BookedSlot> = store
            .all()
            .iter()
            .filter(|b| b.provider_id == provider.id && b.holds_slot() && Some(b.id) != exclude)
            .map(Booking::booked_slot)
            .collect();

        self.resolver.suggest_alternatives(
            provider,
            date,
            time,
            self.window_days,
            &held,
            MAX_SUGGESTED_ALTERNATIVES,
        )
    }
}
