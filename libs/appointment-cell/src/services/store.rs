// libs/appointment-cell/src/services/store.rs
use chrono::{NaiveDate, NaiveTime, Utc};
use tracing::{debug, info, warn};
use uuid::Uuid;

use provider_cell::models::BookedSlot;

use crate::models::{AppointmentError, Booking, BookingStatus, NewBooking};
use crate::services::lifecycle::BookingLifecycleService;

/// In-memory booking repository. Bookings are never removed; cancelling or
/// rescheduling only changes their status.
#[derive(Debug, Clone, Default)]
pub struct BookingStore {
    bookings: Vec<Booking>,
    lifecycle: BookingLifecycleService,
}

impl BookingStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Check and reserve in one step. Fails if a slot-holding booking other
    /// than the one being rescheduled already owns the slot.
    pub fn reserve(&mut self, new_booking: NewBooking) -> Result<&Booking, AppointmentError> {
        let taken = !self
            .conflicts(
                new_booking.provider_id,
                new_booking.date,
                new_booking.time,
                new_booking.rescheduled_from,
            )
            .is_empty();

        if taken {
            warn!(
                "Slot {} for provider {} is already held",
                new_booking.slot_label(),
                new_booking.provider_id
            );
            return Err(AppointmentError::conflict(new_booking.date, new_booking.time));
        }

        Ok(self.push(new_booking))
    }

    /// Record the booking without looking at existing ones.
    pub fn append_unchecked(&mut self, new_booking: NewBooking) -> &Booking {
        self.push(new_booking)
    }

    fn push(&mut self, new_booking: NewBooking) -> &Booking {
        let booking = Booking::from_new(new_booking);
        info!(
            "Stored booking {} for provider {} on {} at {}",
            booking.id, booking.provider_id, booking.date, booking.time
        );
        let index = self.bookings.len();
        self.bookings.push(booking);
        &self.bookings[index]
    }

    pub fn get(&self, booking_id: Uuid) -> Result<&Booking, AppointmentError> {
        self.bookings
            .iter()
            .find(|b| b.id == booking_id)
            .ok_or(AppointmentError::NotFound(booking_id))
    }

    pub fn all(&self) -> &[Booking] {
        &self.bookings
    }

    /// Bookings of one provider on one date, ordered by time.
    pub fn for_provider_on(&self, provider_id: Uuid, date: NaiveDate) -> Vec<&Booking> {
        let mut bookings: Vec<&Booking> = self
            .bookings
            .iter()
            .filter(|b| b.provider_id == provider_id && b.date == date)
            .collect();
        bookings.sort_by_key(|b| b.time);
        bookings
    }

    /// Slots currently held, in the shape the availability resolver takes.
    pub fn held_slots(&self) -> Vec<BookedSlot> {
        self.bookings
            .iter()
            .filter(|b| b.holds_slot())
            .map(Booking::booked_slot)
            .collect()
    }

    pub fn held_slots_for(&self, provider_id: Uuid) -> Vec<BookedSlot> {
        self.bookings
            .iter()
            .filter(|b| b.provider_id == provider_id && b.holds_slot())
            .map(Booking::booked_slot)
            .collect()
    }

    /// Slot-holding bookings on the exact `(provider, date, time)` triple.
    pub fn conflicts(
        &self,
        provider_id: Uuid,
        date: NaiveDate,
        time: NaiveTime,
        exclude: Option<Uuid>,
    ) -> Vec<&Booking> {
        let conflicts: Vec<&Booking> = self
            .bookings
            .iter()
            .filter(|b| Some(b.id) != exclude)
            .filter(|b| b.occupies(provider_id, date, time))
            .collect();

        debug!(
            "Found {} bookings holding provider {} on {} at {}",
            conflicts.len(),
            provider_id,
            date,
            time
        );
        conflicts
    }

    /// Move a booking to `new_status` if the lifecycle allows it.
    pub fn update_status(
        &mut self,
        booking_id: Uuid,
        new_status: BookingStatus,
    ) -> Result<&Booking, AppointmentError> {
        let lifecycle = self.lifecycle;
        let booking = self
            .bookings
            .iter_mut()
            .find(|b| b.id == booking_id)
            .ok_or(AppointmentError::NotFound(booking_id))?;

        lifecycle.validate_status_transition(booking.status, new_status)?;

        booking.status = new_status;
        booking.updated_at = Utc::now();
        info!("Booking {} is now {}", booking.id, new_status);
        Ok(&*booking)
    }

    pub fn len(&self) -> usize {
        self.bookings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bookings.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::BookingKind;
    use assert_matches::assert_matches;

    fn t(h: u32, m: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, m, 0).unwrap()
    }

    fn day() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, 1).unwrap()
    }

    fn new_booking(provider_id: Uuid, time: NaiveTime) -> NewBooking {
        NewBooking {
            provider_id,
            kind: BookingKind::Appointment,
            date: day(),
            time,
            patient_name: "Carmen Ortega".to_string(),
            appointment_type: "Revisión".to_string(),
            notes: None,
            checklist_item_ids: vec![],
            rescheduled_from: None,
        }
    }

    #[test]
    fn test_reserve_rejects_taken_slot() {
        let mut store = BookingStore::new();
        let provider = Uuid::new_v4();

        store.reserve(new_booking(provider, t(9, 0))).unwrap();
        assert_matches!(
            store.reserve(new_booking(provider, t(9, 0))),
            Err(AppointmentError::ConflictDetected { .. })
        );
        assert_eq!(store.len(), 1);

        // Same time, other provider.
        assert!(store.reserve(new_booking(Uuid::new_v4(), t(9, 0))).is_ok());
    }

    #[test]
    fn test_cancelled_booking_frees_slot() {
        let mut store = BookingStore::new();
        let provider = Uuid::new_v4();
        let id = store.reserve(new_booking(provider, t(9, 0))).unwrap().id;

        store.update_status(id, BookingStatus::Cancelled).unwrap();
        assert!(store.held_slots().is_empty());
        assert!(store.reserve(new_booking(provider, t(9, 0))).is_ok());
    }

    #[test]
    fn test_append_unchecked_allows_double_booking() {
        let mut store = BookingStore::new();
        let provider = Uuid::new_v4();

        store.append_unchecked(new_booking(provider, t(9, 0)));
        store.append_unchecked(new_booking(provider, t(9, 0)));

        assert_eq!(store.conflicts(provider, day(), t(9, 0), None).len(), 2);
        assert_eq!(store.held_slots_for(provider).len(), 2);
    }

    #[test]
    fn test_rescheduled_from_is_not_a_conflict() {
        let mut store = BookingStore::new();
        let provider = Uuid::new_v4();
        let original = store.reserve(new_booking(provider, t(9, 0))).unwrap().id;

        let mut replacement = new_booking(provider, t(9, 0));
        replacement.rescheduled_from = Some(original);
        assert!(store.reserve(replacement).is_ok());
    }

    #[test]
    fn test_update_status_follows_lifecycle() {
        let mut store = BookingStore::new();
        let id = store.reserve(new_booking(Uuid::new_v4(), t(9, 0))).unwrap().id;

        assert_matches!(
            store.update_status(id, BookingStatus::InProgress),
            Err(AppointmentError::InvalidStatusTransition { .. })
        );
        assert_eq!(store.get(id).unwrap().status, BookingStatus::Booked);

        let missing = Uuid::new_v4();
        assert_eq!(
            store.update_status(missing, BookingStatus::Confirmed).unwrap_err(),
            AppointmentError::NotFound(missing)
        );
    }

    #[test]
    fn test_for_provider_on_is_time_ordered() {
        let mut store = BookingStore::new();
        let provider = Uuid::new_v4();
        store.reserve(new_booking(provider, t(11, 0))).unwrap();
        store.reserve(new_booking(provider, t(8, 30))).unwrap();

        let times: Vec<NaiveTime> = store
            .for_provider_on(provider, day())
            .iter()
            .map(|b| b.time)
            .collect();
        assert_eq!(times, vec![t(8, 30), t(11, 0)]);
    }
}
