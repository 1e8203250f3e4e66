// libs/provider-cell/src/models.rs
use chrono::{Datelike, Duration, NaiveDate, NaiveTime, Weekday};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use shared_config::AppConfig;
use shared_models::error::AppError;
use shared_models::time::{format_time_of_day, weekday_name};

// ==============================================================================
// PROVIDERS
// ==============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProviderKind {
    Doctor,
    StudyRoom,
}

impl std::fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ProviderKind::Doctor => write!(f, "doctor"),
            ProviderKind::StudyRoom => write!(f, "study_room"),
        }
    }
}

/// Daily operating interval. Both ends are bookable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct OperatingHours {
    pub start: NaiveTime,
    pub end: NaiveTime,
}

impl OperatingHours {
    pub fn new(start: NaiveTime, end: NaiveTime) -> Result<Self, ProviderError> {
        if start > end {
            return Err(ProviderError::InvalidHours {
                start: format_time_of_day(start),
                end: format_time_of_day(end),
            });
        }
        Ok(Self { start, end })
    }

    pub fn contains(&self, time: NaiveTime) -> bool {
        self.start <= time && time <= self.end
    }
}

/// A doctor or a study room with a recurring weekly schedule.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Provider {
    pub id: Uuid,
    pub name: String,
    pub kind: ProviderKind,
    /// Specialty for doctors, equipment tag for study rooms.
    pub specialty: String,
    pub available_days: Vec<Weekday>,
    pub available_hours: OperatingHours,
    pub max_daily_bookings: Option<u32>,
}

impl Provider {
    pub fn doctor(
        name: impl Into<String>,
        specialty: impl Into<String>,
        available_days: Vec<Weekday>,
        available_hours: OperatingHours,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            kind: ProviderKind::Doctor,
            specialty: specialty.into(),
            available_days,
            available_hours,
            max_daily_bookings: None,
        }
    }

    pub fn study_room(
        name: impl Into<String>,
        equipment: impl Into<String>,
        available_days: Vec<Weekday>,
        available_hours: OperatingHours,
    ) -> Self {
        Self {
            kind: ProviderKind::StudyRoom,
            ..Self::doctor(name, equipment, available_days, available_hours)
        }
    }

    pub fn with_max_daily_bookings(mut self, limit: u32) -> Self {
        self.max_daily_bookings = Some(limit);
        self
    }

    pub fn operates_on(&self, date: NaiveDate) -> bool {
        self.available_days.contains(&date.weekday())
    }

    pub fn validate(&self) -> Result<(), ProviderError> {
        if self.name.trim().is_empty() {
            return Err(ProviderError::ValidationError("Provider name cannot be empty".to_string()));
        }
        if self.available_days.is_empty() {
            return Err(ProviderError::NoOperatingDays(self.name.clone()));
        }
        if self.available_hours.start > self.available_hours.end {
            return Err(ProviderError::InvalidHours {
                start: format_time_of_day(self.available_hours.start),
                end: format_time_of_day(self.available_hours.end),
            });
        }
        if self.max_daily_bookings == Some(0) {
            return Err(ProviderError::ValidationError(format!(
                "{} has a daily booking limit of zero",
                self.name
            )));
        }
        Ok(())
    }

    pub fn schedule_summary(&self) -> String {
        let days: Vec<&str> = self.available_days.iter().map(|d| weekday_name(*d)).collect();
        format!(
            "{} ({}): {} {}-{}",
            self.name,
            self.specialty,
            days.join(","),
            format_time_of_day(self.available_hours.start),
            format_time_of_day(self.available_hours.end)
        )
    }
}

// ==============================================================================
// SLOT GRID
// ==============================================================================

/// The canonical bookable times of day, sorted and without duplicates.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SlotGrid {
    slots: Vec<NaiveTime>,
}

impl SlotGrid {
    /// Every `interval_minutes` from `start` up to and including `end`.
    pub fn every(start: NaiveTime, end: NaiveTime, interval_minutes: u32) -> Result<Self, ProviderError> {
        if interval_minutes == 0 {
            return Err(ProviderError::InvalidSlotGrid("Slot interval must be positive".to_string()));
        }
        if start > end {
            return Err(ProviderError::InvalidSlotGrid(format!(
                "Grid start {} is after grid end {}",
                format_time_of_day(start),
                format_time_of_day(end)
            )));
        }

        let step = Duration::minutes(interval_minutes as i64);
        let mut slots = Vec::new();
        let mut current = start;

        loop {
            slots.push(current);
            let (next, wrapped) = current.overflowing_add_signed(step);
            if wrapped != 0 || next > end || next <= current {
                break;
            }
            current = next;
        }

        Ok(Self { slots })
    }

    pub fn from_slots<I>(slots: I) -> Result<Self, ProviderError>
    where
        I: IntoIterator<Item = NaiveTime>,
    {
        let mut slots: Vec<NaiveTime> = slots.into_iter().collect();
        if slots.is_empty() {
            return Err(ProviderError::InvalidSlotGrid("Slot grid cannot be empty".to_string()));
        }
        slots.sort();
        slots.dedup();
        Ok(Self { slots })
    }

    pub fn from_config(config: &AppConfig) -> Result<Self, ProviderError> {
        Self::every(
            config.slot_grid_start,
            config.slot_grid_end,
            config.slot_interval_minutes,
        )
    }

    pub fn slots(&self) -> &[NaiveTime] {
        &self.slots
    }

    pub fn contains(&self, time: NaiveTime) -> bool {
        self.slots.binary_search(&time).is_ok()
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }
}

impl Default for SlotGrid {
    fn default() -> Self {
        Self::from_config(&AppConfig::default()).unwrap_or(Self { slots: Vec::new() })
    }
}

/// A (provider, date, time) triple that is no longer free.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BookedSlot {
    pub provider_id: Uuid,
    pub date: NaiveDate,
    pub time: NaiveTime,
}

impl BookedSlot {
    pub fn new(provider_id: Uuid, date: NaiveDate, time: NaiveTime) -> Self {
        Self { provider_id, date, time }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SuggestedSlot {
    pub date: NaiveDate,
    pub time: NaiveTime,
}

// ==============================================================================
// ERROR TYPES
// ==============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProviderError {
    #[error("Provider not found: {0}")]
    NotFound(Uuid),

    #[error("Provider already registered: {0}")]
    Duplicate(Uuid),

    #[error("Operating hours start {start} is after end {end}")]
    InvalidHours { start: String, end: String },

    #[error("{0} has no operating days")]
    NoOperatingDays(String),

    #[error("Invalid slot grid: {0}")]
    InvalidSlotGrid(String),

    #[error("Validation error: {0}")]
    ValidationError(String),
}

impl From<ProviderError> for AppError {
    fn from(err: ProviderError) -> Self {
        match err {
            ProviderError::NotFound(_) => AppError::NotFound(err.to_string()),
            ProviderError::Duplicate(_) => AppError::Conflict(err.to_string()),
            other => AppError::ValidationError(other.to_string()),
        }
    }
}
