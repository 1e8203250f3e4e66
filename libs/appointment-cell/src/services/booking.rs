// libs/appointment-cell/src/services/booking.rs
use chrono::{Local, NaiveDate, NaiveTime};
use tracing::{debug, info, warn};
use uuid::Uuid;

use checklist_cell::models::ChecklistCatalog;
use checklist_cell::services::RelevanceScorer;
use provider_cell::models::Provider;
use provider_cell::services::{AvailabilityResolver, ProviderDirectory};
use shared_config::{AppConfig, ConflictPolicy};
use shared_models::time::format_time_of_day;

use crate::models::{
    AppointmentError, Booking, BookingConfirmation, BookingRequest, BookingStatus,
    ConflictCheckResponse, NewBooking, Prefill,
};
use crate::services::conflict::ConflictDetectionService;
use crate::services::draft::BookingDraft;
use crate::services::lifecycle::BookingLifecycleService;
use crate::services::store::BookingStore;

/// Drives the booking modal: what can be picked, submitting the form and
/// moving bookings through their lifecycle.
pub struct BookingService {
    config: AppConfig,
    resolver: AvailabilityResolver,
    conflict_service: ConflictDetectionService,
    lifecycle_service: BookingLifecycleService,
    scorer: RelevanceScorer,
}

impl BookingService {
    pub fn new(config: &AppConfig) -> Result<Self, AppointmentError> {
        Self::with_scorer(config, RelevanceScorer::default())
    }

    pub fn with_scorer(config: &AppConfig, scorer: RelevanceScorer) -> Result<Self, AppointmentError> {
        let resolver = AvailabilityResolver::from_config(config)?;
        let conflict_service = ConflictDetectionService::from_config(resolver.clone(), config);

        info!(
            "Booking service ready: {} slots per day, {}-day window, {:?} conflict policy",
            resolver.grid().len(),
            config.availability_window_days,
            config.conflict_policy
        );

        Ok(Self {
            config: config.clone(),
            resolver,
            conflict_service,
            lifecycle_service: BookingLifecycleService::new(),
            scorer,
        })
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    pub fn resolver(&self) -> &AvailabilityResolver {
        &self.resolver
    }

    // ==========================================================================
    // PICKERS
    // ==========================================================================

    pub fn available_dates(
        &self,
        directory: &ProviderDirectory,
        provider_id: Uuid,
        today: NaiveDate,
    ) -> Result<Vec<NaiveDate>, AppointmentError> {
        let provider = directory.get(provider_id)?;
        Ok(self
            .resolver
            .available_dates(provider, today, self.config.availability_window_days))
    }

    pub fn available_dates_from_today(
        &self,
        directory: &ProviderDirectory,
        provider_id: Uuid,
    ) -> Result<Vec<NaiveDate>, AppointmentError> {
        self.available_dates(directory, provider_id, Local::now().date_naive())
    }

    pub fn available_times(
        &self,
        store: &BookingStore,
        directory: &ProviderDirectory,
        provider_id: Uuid,
        date: NaiveDate,
    ) -> Result<Vec<NaiveTime>, AppointmentError> {
        let provider = directory.get(provider_id)?;
        let held = store.held_slots_for(provider_id);
        Ok(self.resolver.available_time_slots(provider, date, &held))
    }

    pub fn check_conflicts(
        &self,
        store: &BookingStore,
        directory: &ProviderDirectory,
        provider_id: Uuid,
        date: NaiveDate,
        time: NaiveTime,
    ) -> Result<ConflictCheckResponse, AppointmentError> {
        let provider = directory.get(provider_id)?;
        Ok(self.conflict_service.check_conflicts(store, provider, date, time, None))
    }

    /// Prepare the modal for a prefill: candidate providers and the
    /// pre-checked checklist items.
    pub fn open_draft(
        &self,
        directory: &ProviderDirectory,
        catalog: &ChecklistCatalog,
        prefill: &Prefill,
    ) -> BookingDraft {
        BookingDraft::from_prefill(prefill, directory, catalog, &self.scorer, self.config.suggestion_limit)
    }

    // ==========================================================================
    // SUBMISSION
    // ==========================================================================

    /// Validate and store a booking. Waits the configured submit delay before
    /// touching the store.
    pub async fn submit(
        &self,
        store: &mut BookingStore,
        directory: &ProviderDirectory,
        catalog: &ChecklistCatalog,
        request: BookingRequest,
    ) -> Result<BookingConfirmation, AppointmentError> {
        debug!("Submitting {:?} booking for '{}'", request.kind, request.patient_name);

        let new_booking = request.validate()?;

        if let Some(unknown) = new_booking
            .checklist_item_ids
            .iter()
            .find(|id| !catalog.contains(id.as_str()))
        {
            return Err(AppointmentError::UnknownChecklistItem(unknown.clone()));
        }

        let provider = directory.get(new_booking.provider_id)?;
        if provider.kind != new_booking.kind.provider_kind() {
            return Err(AppointmentError::ValidationError(format!(
                "{} cannot take {:?} bookings",
                provider.name, new_booking.kind
            )));
        }

        self.ensure_bookable(provider, new_booking.date, new_booking.time)?;

        let delay = self.config.submit_delay();
        if !delay.is_zero() {
            debug!("Waiting {:?} before storing booking", delay);
            tokio::time::sleep(delay).await;
        }

        self.store_booking(store, provider, new_booking)
    }

    /// Move a booking to a new slot. The new slot is reserved before the old
    /// booking is marked rescheduled, so a failure leaves the original intact.
    pub fn reschedule(
        &self,
        store: &mut BookingStore,
        directory: &ProviderDirectory,
        booking_id: Uuid,
        date: NaiveDate,
        time: NaiveTime,
    ) -> Result<BookingConfirmation, AppointmentError> {
        let original = store.get(booking_id)?.clone();

        if !self.lifecycle_service.can_reschedule(original.status) {
            warn!("Booking {} cannot be rescheduled from {}", booking_id, original.status);
            return Err(AppointmentError::InvalidStatusTransition {
                from: original.status,
                to: BookingStatus::Rescheduled,
            });
        }

        let provider = directory.get(original.provider_id)?;
        self.ensure_bookable(provider, date, time)?;

        let new_booking = NewBooking {
            provider_id: original.provider_id,
            kind: original.kind,
            date,
            time,
            patient_name: original.patient_name.clone(),
            appointment_type: original.appointment_type.clone(),
            notes: original.notes.clone(),
            checklist_item_ids: original.checklist_item_ids.clone(),
            rescheduled_from: Some(original.id),
        };

        let confirmation = self.store_booking(store, provider, new_booking)?;
        store.update_status(original.id, BookingStatus::Rescheduled)?;

        info!(
            "Booking {} rescheduled to {} at {} as {}",
            original.id,
            date,
            format_time_of_day(time),
            confirmation.booking.id
        );
        Ok(confirmation)
    }

    pub fn cancel(&self, store: &mut BookingStore, booking_id: Uuid) -> Result<Booking, AppointmentError> {
        self.transition(store, booking_id, BookingStatus::Cancelled)
    }

    pub fn transition(
        &self,
        store: &mut BookingStore,
        booking_id: Uuid,
        new_status: BookingStatus,
    ) -> Result<Booking, AppointmentError> {
        if new_status == BookingStatus::Rescheduled {
            return Err(AppointmentError::ValidationError(
                "Use reschedule to move a booking to a new slot".to_string(),
            ));
        }
        store.update_status(booking_id, new_status).cloned()
    }

    fn ensure_bookable(
        &self,
        provider: &Provider,
        date: NaiveDate,
        time: NaiveTime,
    ) -> Result<(), AppointmentError> {
        if self.resolver.is_bookable(provider, date, time) {
            Ok(())
        } else {
            warn!(
                "{} does not offer {} at {}",
                provider.name,
                date,
                format_time_of_day(time)
            );
            Err(AppointmentError::slot_not_available(date, time))
        }
    }

    fn store_booking(
        &self,
        store: &mut BookingStore,
        provider: &Provider,
        new_booking: NewBooking,
    ) -> Result<BookingConfirmation, AppointmentError> {
        let mut warnings = Vec::new();

        if let Some(limit) = provider.max_daily_bookings {
            let held_that_day = store
                .for_provider_on(provider.id, new_booking.date)
                .into_iter()
                .filter(|b| b.holds_slot() && Some(b.id) != new_booking.rescheduled_from)
                .count();

            if held_that_day >= limit as usize {
                let message = format!(
                    "{} already has {} bookings on {}",
                    provider.name, held_that_day, new_booking.date
                );
                match self.config.conflict_policy {
                    ConflictPolicy::Reject => {
                        warn!("{}", message);
                        return Err(AppointmentError::slot_not_available(new_booking.date, new_booking.time));
                    }
                    ConflictPolicy::Warn => warnings.push(message),
                }
            }
        }

        let booking = match self.config.conflict_policy {
            ConflictPolicy::Reject => store.reserve(new_booking)?.clone(),
            ConflictPolicy::Warn => {
                let clashes = store
                    .conflicts(
                        new_booking.provider_id,
                        new_booking.date,
                        new_booking.time,
                        new_booking.rescheduled_from,
                    )
                    .len();
                if clashes > 0 {
                    let message = format!(
                        "Slot {} with {} is already booked ({} existing)",
                        new_booking.slot_label(),
                        provider.name,
                        clashes
                    );
                    warn!("{}", message);
                    warnings.push(message);
                }
                store.append_unchecked(new_booking).clone()
            }
        };

        info!(
            "Booked {} for {} with {} on {} at {}",
            booking.appointment_type,
            booking.patient_name,
            provider.name,
            booking.date,
            format_time_of_day(booking.time)
        );

        Ok(BookingConfirmation { booking, warnings })
    }
}
