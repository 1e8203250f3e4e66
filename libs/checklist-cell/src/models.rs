// libs/checklist-cell/src/models.rs
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use shared_models::error::AppError;

// ==============================================================================
// CATALOG ITEMS
// ==============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChecklistCategory {
    Documentation,
    Appointment,
    Examination,
    Treatment,
    Other,
}

impl ChecklistCategory {
    /// Starting score before any keyword or context bonus.
    pub fn base_weight(&self) -> i32 {
        match self {
            ChecklistCategory::Appointment => 10,
            ChecklistCategory::Examination => 8,
            ChecklistCategory::Treatment => 6,
            ChecklistCategory::Documentation => 4,
            ChecklistCategory::Other => 0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChecklistPriority {
    High,
    Medium,
    Low,
}

impl ChecklistPriority {
    pub fn bonus(&self) -> i32 {
        match self {
            ChecklistPriority::High => 5,
            ChecklistPriority::Medium => 3,
            ChecklistPriority::Low => 0,
        }
    }

    /// Tie-break order; items without a priority rank below `Low`.
    pub fn rank(priority: Option<ChecklistPriority>) -> u8 {
        match priority {
            Some(ChecklistPriority::High) => 3,
            Some(ChecklistPriority::Medium) => 2,
            Some(ChecklistPriority::Low) => 1,
            None => 0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChecklistStatus {
    Pending,
    Overdue,
    InProgress,
    Completed,
}

impl ChecklistStatus {
    pub fn bonus(&self) -> i32 {
        match self {
            ChecklistStatus::Overdue => 7,
            ChecklistStatus::Pending => 4,
            ChecklistStatus::InProgress | ChecklistStatus::Completed => 0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChecklistItem {
    pub id: String,
    pub label: String,
    pub description: Option<String>,
    pub category: ChecklistCategory,
    pub priority: Option<ChecklistPriority>,
    pub status: Option<ChecklistStatus>,
    pub due_date: Option<NaiveDate>,
}

impl ChecklistItem {
    pub fn new(id: impl Into<String>, label: impl Into<String>, category: ChecklistCategory) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
            description: None,
            category,
            priority: None,
            status: None,
            due_date: None,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_priority(mut self, priority: ChecklistPriority) -> Self {
        self.priority = Some(priority);
        self
    }

    pub fn with_status(mut self, status: ChecklistStatus) -> Self {
        self.status = Some(status);
        self
    }

    pub fn with_due_date(mut self, due_date: NaiveDate) -> Self {
        self.due_date = Some(due_date);
        self
    }

    /// Label and description, the text keyword groups are matched against.
    pub fn searchable_text(&self) -> String {
        match &self.description {
            Some(description) => format!("{} {}", self.label, description),
            None => self.label.clone(),
        }
    }
}

// ==============================================================================
// CATALOG
// ==============================================================================

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ChecklistCatalog {
    items: Vec<ChecklistItem>,
}

impl ChecklistCatalog {
    pub fn from_items(items: Vec<ChecklistItem>) -> Result<Self, ChecklistError> {
        let mut catalog = Self::default();
        for item in items {
            catalog.add(item)?;
        }
        debug!("Checklist catalog loaded with {} items", catalog.items.len());
        Ok(catalog)
    }

    pub fn add(&mut self, item: ChecklistItem) -> Result<(), ChecklistError> {
        if item.id.trim().is_empty() {
            return Err(ChecklistError::ValidationError("Checklist item id cannot be empty".to_string()));
        }
        if item.label.trim().is_empty() {
            return Err(ChecklistError::ValidationError(format!(
                "Checklist item {} has an empty label",
                item.id
            )));
        }
        if self.contains(&item.id) {
            return Err(ChecklistError::DuplicateItem(item.id));
        }
        self.items.push(item);
        Ok(())
    }

    pub fn items(&self) -> &[ChecklistItem] {
        &self.items
    }

    pub fn get(&self, item_id: &str) -> Option<&ChecklistItem> {
        self.items.iter().find(|item| item.id == item_id)
    }

    pub fn contains(&self, item_id: &str) -> bool {
        self.get(item_id).is_some()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

// ==============================================================================
// RANKING RESULTS
// ==============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoredItem {
    pub item_id: String,
    pub score: i32,
}

/// Checked items of a booking form. Suggestions only seed the selection;
/// any catalog item can be toggled afterwards.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChecklistSelection {
    suggested: Vec<String>,
    selected: Vec<String>,
}

impl ChecklistSelection {
    pub fn with_suggestions(suggested: Vec<String>) -> Self {
        Self {
            selected: suggested.clone(),
            suggested,
        }
    }

    /// Flip `item_id`; returns whether it is selected afterwards.
    pub fn toggle(&mut self, catalog: &ChecklistCatalog, item_id: &str) -> Result<bool, ChecklistError> {
        if !catalog.contains(item_id) {
            return Err(ChecklistError::UnknownItem(item_id.to_string()));
        }

        if let Some(position) = self.selected.iter().position(|id| id == item_id) {
            self.selected.remove(position);
            Ok(false)
        } else {
            self.selected.push(item_id.to_string());
            Ok(true)
        }
    }

    pub fn is_selected(&self, item_id: &str) -> bool {
        self.selected.iter().any(|id| id == item_id)
    }

    pub fn is_suggested(&self, item_id: &str) -> bool {
        self.suggested.iter().any(|id| id == item_id)
    }

    pub fn selected(&self) -> &[String] {
        &self.selected
    }

    pub fn suggested(&self) -> &[String] {
        &self.suggested
    }
}

// ==============================================================================
// ERROR TYPES
// ==============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ChecklistError {
    #[error("Unknown checklist item: {0}")]
    UnknownItem(String),

    #[error("Checklist item already exists: {0}")]
    DuplicateItem(String),

    #[error("Validation error: {0}")]
    ValidationError(String),
}

impl From<ChecklistError> for AppError {
    fn from(err: ChecklistError) -> Self {
        match err {
            ChecklistError::UnknownItem(_) => AppError::NotFound(err.to_string()),
            ChecklistError::DuplicateItem(_) => AppError::Conflict(err.to_string()),
            ChecklistError::ValidationError(msg) => AppError::ValidationError(msg),
        }
    }
}
