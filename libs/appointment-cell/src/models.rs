// libs/appointment-cell/src/models.rs
use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

use provider_cell::models::{BookedSlot, ProviderError, ProviderKind, SuggestedSlot};
use shared_models::error::AppError;
use shared_models::time::format_time_of_day;

// ==============================================================================
// CORE BOOKING MODELS
// ==============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BookingKind {
    Appointment,
    Study,
}

impl BookingKind {
    pub fn provider_kind(&self) -> ProviderKind {
        match self {
            BookingKind::Appointment => ProviderKind::Doctor,
            BookingKind::Study => ProviderKind::StudyRoom,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BookingStatus {
    Booked,
    Confirmed,
    InWaitingRoom,
    InProgress,
    Completed,
    Cancelled,
    Rescheduled,
    NoShow,
}

impl BookingStatus {
    /// Whether a booking in this status keeps its (provider, date, time) slot.
    /// Cancelled bookings free it; rescheduled ones hand it over to their successor.
    pub fn holds_slot(&self) -> bool {
        !matches!(self, BookingStatus::Cancelled | BookingStatus::Rescheduled)
    }

    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            BookingStatus::Completed
                | BookingStatus::Cancelled
                | BookingStatus::Rescheduled
                | BookingStatus::NoShow
        )
    }
}

impl fmt::Display for BookingStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BookingStatus::Booked => write!(f, "booked"),
            BookingStatus::Confirmed => write!(f, "confirmed"),
            BookingStatus::InWaitingRoom => write!(f, "in_waiting_room"),
            BookingStatus::InProgress => write!(f, "in_progress"),
            BookingStatus::Completed => write!(f, "completed"),
            BookingStatus::Cancelled => write!(f, "cancelled"),
            BookingStatus::Rescheduled => write!(f, "rescheduled"),
            BookingStatus::NoShow => write!(f, "no_show"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Booking {
    pub id: Uuid,
    pub provider_id: Uuid,
    pub kind: BookingKind,
    pub date: NaiveDate,
    pub time: NaiveTime,
    pub patient_name: String,
    pub appointment_type: String,
    pub notes: Option<String>,
    pub checklist_item_ids: Vec<String>,
    pub status: BookingStatus,
    pub rescheduled_from: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Booking {
    pub fn from_new(new_booking: NewBooking) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            provider_id: new_booking.provider_id,
            kind: new_booking.kind,
            date: new_booking.date,
            time: new_booking.time,
            patient_name: new_booking.patient_name,
            appointment_type: new_booking.appointment_type,
            notes: new_booking.notes,
            checklist_item_ids: new_booking.checklist_item_ids,
            status: BookingStatus::Booked,
            rescheduled_from: new_booking.rescheduled_from,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn booked_slot(&self) -> BookedSlot {
        BookedSlot::new(self.provider_id, self.date, self.time)
    }

    pub fn holds_slot(&self) -> bool {
        self.status.holds_slot()
    }

    pub fn occupies(&self, provider_id: Uuid, date: NaiveDate, time: NaiveTime) -> bool {
        self.holds_slot() && self.provider_id == provider_id && self.date == date && self.time == time
    }
}

/// A booking that passed validation and is ready to be stored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewBooking {
    pub provider_id: Uuid,
    pub kind: BookingKind,
    pub date: NaiveDate,
    pub time: NaiveTime,
    pub patient_name: String,
    pub appointment_type: String,
    pub notes: Option<String>,
    pub checklist_item_ids: Vec<String>,
    /// The booking this one replaces; it does not count as a conflict.
    pub rescheduled_from: Option<Uuid>,
}

impl NewBooking {
    pub fn slot_label(&self) -> String {
        format!("{} {}", self.date, format_time_of_day(self.time))
    }
}

/// Form state submitted by the booking and study modals. Any field may still
/// be missing; `validate` reports every missing one at once.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BookingRequest {
    pub provider_id: Option<Uuid>,
    pub kind: BookingKind,
    pub date: Option<NaiveDate>,
    pub time: Option<NaiveTime>,
    pub patient_name: String,
    pub appointment_type: String,
    pub notes: Option<String>,
    pub checklist_item_ids: Vec<String>,
}

impl BookingRequest {
    pub fn new(kind: BookingKind) -> Self {
        Self {
            provider_id: None,
            kind,
            date: None,
            time: None,
            patient_name: String::new(),
            appointment_type: String::new(),
            notes: None,
            checklist_item_ids: Vec::new(),
        }
    }

    pub fn validate(&self) -> Result<NewBooking, AppointmentError> {
        let mut missing = Vec::new();

        if self.provider_id.is_none() {
            missing.push("provider");
        }
        if self.date.is_none() {
            missing.push("date");
        }
        if self.time.is_none() {
            missing.push("time");
        }
        if self.patient_name.trim().is_empty() {
            missing.push("patient_name");
        }
        if self.appointment_type.trim().is_empty() {
            missing.push("appointment_type");
        }

        match (self.provider_id, self.date, self.time) {
            (Some(provider_id), Some(date), Some(time)) if missing.is_empty() => Ok(NewBooking {
                provider_id,
                kind: self.kind,
                date,
                time,
                patient_name: self.patient_name.trim().to_string(),
                appointment_type: self.appointment_type.trim().to_string(),
                notes: self
                    .notes
                    .as_ref()
                    .map(|n| n.trim().to_string())
                    .filter(|n| !n.is_empty()),
                checklist_item_ids: self.checklist_item_ids.clone(),
                rescheduled_from: None,
            }),
            _ => Err(AppointmentError::ValidationError(format!(
                "Missing required fields: {}",
                missing.join(", ")
            ))),
        }
    }
}

// ==============================================================================
// CONFLICT & CONFIRMATION MODELS
// ==============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConflictCheckResponse {
    pub has_conflict: bool,
    pub conflicting_bookings: Vec<Booking>,
    pub suggested_alternatives: Vec<SuggestedSlot>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BookingConfirmation {
    pub booking: Booking,
    pub warnings: Vec<String>,
}

impl BookingConfirmation {
    pub fn has_warnings(&self) -> bool {
        !self.warnings.is_empty()
    }
}

// ==============================================================================
// PREFILL DATA
// ==============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Eye {
    Right,
    Left,
    Both,
}

impl fmt::Display for Eye {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Eye::Right => write!(f, "OD"),
            Eye::Left => write!(f, "OS"),
            Eye::Both => write!(f, "OU"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppointmentPrefill {
    pub patient_name: String,
    pub appointment_type: String,
    pub specialty: Option<String>,
    pub reason: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StudyPrefill {
    pub patient_name: String,
    pub study_type: String,
    pub eye: Option<Eye>,
    pub equipment: Option<String>,
    pub indication: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentPrefill {
    pub patient_name: String,
    pub document_type: String,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TreatmentPrefill {
    pub patient_name: String,
    pub treatment: String,
    pub eye: Option<Eye>,
    pub session_number: Option<u32>,
    pub notes: Option<String>,
}

/// Context a booking modal is opened with.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Prefill {
    Appointment(AppointmentPrefill),
    Study(StudyPrefill),
    Document(DocumentPrefill),
    Treatment(TreatmentPrefill),
}

impl Prefill {
    pub fn patient_name(&self) -> &str {
        match self {
            Prefill::Appointment(p) => &p.patient_name,
            Prefill::Study(p) => &p.patient_name,
            Prefill::Document(p) => &p.patient_name,
            Prefill::Treatment(p) => &p.patient_name,
        }
    }

    /// The label that becomes the booking's appointment type.
    pub fn appointment_type(&self) -> &str {
        match self {
            Prefill::Appointment(p) => &p.appointment_type,
            Prefill::Study(p) => &p.study_type,
            Prefill::Document(p) => &p.document_type,
            Prefill::Treatment(p) => &p.treatment,
        }
    }

    /// Free text describing the activity that triggered the booking.
    pub fn context_text(&self) -> String {
        let parts: Vec<String> = match self {
            Prefill::Appointment(p) => vec![p.reason.clone()].into_iter().flatten().collect(),
            Prefill::Study(p) => vec![p.indication.clone(), p.eye.map(|e| e.to_string())]
                .into_iter()
                .flatten()
                .collect(),
            Prefill::Document(p) => vec![p.notes.clone()].into_iter().flatten().collect(),
            Prefill::Treatment(p) => vec![
                p.notes.clone(),
                p.eye.map(|e| e.to_string()),
                p.session_number.map(|n| format!("sesion {}", n)),
            ]
            .into_iter()
            .flatten()
            .collect(),
        };
        parts.join(" ")
    }

    pub fn booking_kind(&self) -> BookingKind {
        match self {
            Prefill::Study(_) => BookingKind::Study,
            _ => BookingKind::Appointment,
        }
    }

    /// Specialty or equipment tag used to narrow the provider list.
    pub fn specialty_hint(&self) -> Option<&str> {
        match self {
            Prefill::Appointment(p) => p.specialty.as_deref(),
            Prefill::Study(p) => p.equipment.as_deref().or(Some(p.study_type.as_str())),
            Prefill::Document(_) | Prefill::Treatment(_) => None,
        }
    }
}

// ==============================================================================
// ERROR TYPES
// ==============================================================================

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AppointmentError {
    #[error("Booking not found: {0}")]
    NotFound(Uuid),

    #[error("Provider not found: {0}")]
    ProviderNotFound(Uuid),

    #[error("Slot {date} {time} is outside the provider's schedule")]
    SlotNotAvailable { date: NaiveDate, time: String },

    #[error("Slot {date} {time} is already booked")]
    ConflictDetected { date: NaiveDate, time: String },

    #[error("Booking cannot move from {from} to {to}")]
    InvalidStatusTransition { from: BookingStatus, to: BookingStatus },

    #[error("Unknown checklist item: {0}")]
    UnknownChecklistItem(String),

    #[error("Validation error: {0}")]
    ValidationError(String),
}

impl AppointmentError {
    pub fn conflict(date: NaiveDate, time: NaiveTime) -> Self {
        AppointmentError::ConflictDetected {
            date,
            time: format_time_of_day(time),
        }
    }

    pub fn slot_not_available(date: NaiveDate, time: NaiveTime) -> Self {
        AppointmentError::SlotNotAvailable {
            date,
            time: format_time_of_day(time),
        }
    }
}

impl From<ProviderError> for AppointmentError {
    fn from(err: ProviderError) -> Self {
        match err {
            ProviderError::NotFound(id) => AppointmentError::ProviderNotFound(id),
            other => AppointmentError::ValidationError(other.to_string()),
        }
    }
}

impl From<AppointmentError> for AppError {
    fn from(err: AppointmentError) -> Self {
        match err {
            AppointmentError::NotFound(_)
            | AppointmentError::ProviderNotFound(_)
            | AppointmentError::UnknownChecklistItem(_) => AppError::NotFound(err.to_string()),
            AppointmentError::ConflictDetected { .. } => AppError::Conflict(err.to_string()),
            AppointmentError::InvalidStatusTransition { .. }
            | AppointmentError::SlotNotAvailable { .. } => AppError::BadRequest(err.to_string()),
            AppointmentError::ValidationError(msg) => AppError::ValidationError(msg),
        }
    }
}
