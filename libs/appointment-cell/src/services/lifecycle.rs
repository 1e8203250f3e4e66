// libs/appointment-cell/src/services/lifecycle.rs
use tracing::{debug, info, warn};

use crate::models::{AppointmentError, BookingStatus};

/// Status rules for a booking from reservation to visit outcome.
#[derive(Debug, Clone, Copy, Default)]
pub struct BookingLifecycleService;

impl BookingLifecycleService {
    pub fn new() -> Self {
        Self
    }

    /// Validate that a status transition is allowed
    pub fn validate_status_transition(
        &self,
        current_status: BookingStatus,
        new_status: BookingStatus,
    ) -> Result<(), AppointmentError> {
        debug!("Validating status transition from {} to {}", current_status, new_status);

        if !self.get_valid_transitions(current_status).contains(&new_status) {
            warn!("Invalid status transition attempted: {} -> {}", current_status, new_status);
            return Err(AppointmentError::InvalidStatusTransition {
                from: current_status,
                to: new_status,
            });
        }

        info!("Status transition validated: {} -> {}", current_status, new_status);
        Ok(())
    }

    /// Get all valid next statuses for a given current status
    pub fn get_valid_transitions(&self, current_status: BookingStatus) -> Vec<BookingStatus> {
        match current_status {
            BookingStatus::Booked => vec![
                BookingStatus::Confirmed,
                BookingStatus::Cancelled,
                BookingStatus::Rescheduled,
                BookingStatus::NoShow,
            ],
            BookingStatus::Confirmed => vec![
                BookingStatus::InWaitingRoom,
                BookingStatus::Cancelled,
                BookingStatus::Rescheduled,
                BookingStatus::NoShow,
            ],
            BookingStatus::InWaitingRoom => vec![
                BookingStatus::InProgress,
                BookingStatus::Cancelled,
                BookingStatus::NoShow,
            ],
            BookingStatus::InProgress => vec![BookingStatus::Completed],
            // Terminal states
            BookingStatus::Completed
            | BookingStatus::Cancelled
            | BookingStatus::Rescheduled
            | BookingStatus::NoShow => vec![],
        }
    }

    pub fn can_reschedule(&self, current_status: BookingStatus) -> bool {
        self.get_valid_transitions(current_status)
            .contains(&BookingStatus::Rescheduled)
    }
}
