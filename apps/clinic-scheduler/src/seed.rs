use chrono::{Duration, NaiveDate, NaiveTime, Weekday};

use checklist_cell::models::{
    ChecklistCatalog, ChecklistCategory, ChecklistError, ChecklistItem, ChecklistPriority,
    ChecklistStatus,
};
use provider_cell::models::{OperatingHours, Provider, ProviderError};
use provider_cell::services::ProviderDirectory;

fn hours(start: (u32, u32), end: (u32, u32)) -> Result<OperatingHours, ProviderError> {
    let start = NaiveTime::from_hms_opt(start.0, start.1, 0)
        .ok_or_else(|| ProviderError::ValidationError("invalid start time".to_string()))?;
    let end = NaiveTime::from_hms_opt(end.0, end.1, 0)
        .ok_or_else(|| ProviderError::ValidationError("invalid end time".to_string()))?;
    OperatingHours::new(start, end)
}

/// Mock doctors and study rooms of a small ophthalmology clinic.
pub fn providers() -> Result<ProviderDirectory, ProviderError> {
    use Weekday::*;

    ProviderDirectory::from_providers(vec![
        Provider::doctor("Dra. Carmen Ruiz", "Retina", vec![Mon, Wed, Fri], hours((8, 0), (14, 0))?),
        Provider::doctor("Dr. Javier Herrera", "Glaucoma", vec![Tue, Thu], hours((9, 0), (17, 0))?),
        Provider::doctor("Dra. Lucía Navarro", "Córnea", vec![Mon, Thu], hours((15, 0), (20, 0))?)
            .with_max_daily_bookings(8),
        Provider::doctor("Dr. Andrés Soler", "Oftalmología pediátrica", vec![Wed], hours((9, 0), (13, 0))?),
        Provider::study_room("Sala OCT 1", "OCT", vec![Mon, Tue, Wed, Thu, Fri], hours((8, 0), (20, 0))?),
        Provider::study_room("Sala Campimetría", "Campo visual", vec![Tue, Thu], hours((9, 0), (14, 0))?)
            .with_max_daily_bookings(6),
        Provider::study_room("Sala Biometría", "Biometría", vec![Mon, Fri], hours((10, 0), (13, 0))?),
    ])
}

/// Pending tasks of the patient the demo books for.
pub fn checklist(today: NaiveDate) -> Result<ChecklistCatalog, ChecklistError> {
    ChecklistCatalog::from_items(vec![
        ChecklistItem::new("oct-macular", "OCT macular", ChecklistCategory::Examination)
            .with_description("Tomografía de control tras inyección")
            .with_priority(ChecklistPriority::High)
            .with_status(ChecklistStatus::Overdue)
            .with_due_date(today - Duration::days(3)),
        ChecklistItem::new("visual-field", "Campo visual", ChecklistCategory::Examination)
            .with_priority(ChecklistPriority::Medium)
            .with_status(ChecklistStatus::Pending),
        ChecklistItem::new("follow-up", "Revisión de retina", ChecklistCategory::Appointment)
            .with_description("Seguimiento de edema macular")
            .with_due_date(today + Duration::days(10)),
        ChecklistItem::new("anti-vegf", "Inyección intravítrea anti-VEGF", ChecklistCategory::Treatment)
            .with_priority(ChecklistPriority::High)
            .with_status(ChecklistStatus::Pending),
        ChecklistItem::new("consent", "Consentimiento informado", ChecklistCategory::Documentation)
            .with_description("Firmar antes del tratamiento"),
        ChecklistItem::new("report", "Informe para médico de cabecera", ChecklistCategory::Documentation)
            .with_priority(ChecklistPriority::Low),
        ChecklistItem::new("transport", "Confirmar acompañante", ChecklistCategory::Other),
    ])
}
