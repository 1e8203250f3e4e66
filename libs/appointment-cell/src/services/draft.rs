// libs/appointment-cell/src/services/draft.rs
use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};
use tracing::debug;
use uuid::Uuid;

use checklist_cell::models::{ChecklistCatalog, ChecklistError, ChecklistSelection};
use checklist_cell::services::RelevanceScorer;
use provider_cell::models::Provider;
use provider_cell::services::ProviderDirectory;

use crate::models::{BookingKind, BookingRequest, Prefill};

/// State of a booking modal right after it is opened from a prefill.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BookingDraft {
    pub kind: BookingKind,
    pub patient_name: String,
    pub appointment_type: String,
    pub context: String,
    pub candidate_providers: Vec<Provider>,
    pub checklist: ChecklistSelection,
}

impl BookingDraft {
    /// Providers of the right kind are narrowed by the prefill's specialty;
    /// if nothing matches, every provider of that kind is offered.
    pub fn from_prefill(
        prefill: &Prefill,
        directory: &ProviderDirectory,
        catalog: &ChecklistCatalog,
        scorer: &RelevanceScorer,
        suggestion_limit: usize,
    ) -> Self {
        let kind = prefill.booking_kind();
        let provider_kind = kind.provider_kind();

        let mut candidates =
            directory.search_by_specialty(Some(provider_kind), prefill.specialty_hint().unwrap_or(""));
        if candidates.is_empty() {
            candidates = directory.search_by_specialty(Some(provider_kind), "");
        }

        let context = prefill.context_text();
        let checklist = scorer.suggest(catalog, prefill.appointment_type(), &context, suggestion_limit);

        debug!(
            "Opened {:?} draft for '{}' with {} candidate providers",
            kind,
            prefill.appointment_type(),
            candidates.len()
        );

        Self {
            kind,
            patient_name: prefill.patient_name().to_string(),
            appointment_type: prefill.appointment_type().to_string(),
            context,
            candidate_providers: candidates.into_iter().cloned().collect(),
            checklist,
        }
    }

    pub fn toggle_item(&mut self, catalog: &ChecklistCatalog, item_id: &str) -> Result<bool, ChecklistError> {
        self.checklist.toggle(catalog, item_id)
    }

    /// The form the user submits once a provider, date and time are picked.
    pub fn into_request(
        self,
        provider_id: Option<Uuid>,
        date: Option<NaiveDate>,
        time: Option<NaiveTime>,
    ) -> BookingRequest {
        let notes = Some(self.context).filter(|c| !c.trim().is_empty());
        BookingRequest {
            provider_id,
            kind: self.kind,
            date,
            time,
            patient_name: self.patient_name,
            appointment_type: self.appointment_type,
            notes,
            checklist_item_ids: self.checklist.selected().to_vec(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{AppointmentPrefill, StudyPrefill};
    use checklist_cell::models::{ChecklistCategory, ChecklistItem};
    use chrono::Weekday;
    use provider_cell::models::OperatingHours;

    fn hours() -> OperatingHours {
        OperatingHours::new(
            NaiveTime::from_hms_opt(8, 0, 0).unwrap(),
            NaiveTime::from_hms_opt(14, 0, 0).unwrap(),
        )
        .unwrap()
    }

    fn directory() -> ProviderDirectory {
        ProviderDirectory::from_providers(vec![
            Provider::doctor("Dra. Ruiz", "Retina", vec![Weekday::Mon], hours()),
            Provider::doctor("Dr. Herrera", "Glaucoma", vec![Weekday::Tue], hours()),
            Provider::study_room("Sala OCT", "OCT", vec![Weekday::Mon], hours()),
            Provider::study_room("Sala Campimetría", "Campo visual", vec![Weekday::Wed], hours()),
        ])
        .unwrap()
    }

    fn catalog() -> ChecklistCatalog {
        ChecklistCatalog::from_items(vec![
            ChecklistItem::new("oct", "OCT macular", ChecklistCategory::Examination),
            ChecklistItem::new("dilate", "Dilatar pupila", ChecklistCategory::Examination),
            ChecklistItem::new("consent", "Consentimiento informado", ChecklistCategory::Documentation),
            ChecklistItem::new("call", "Llamar al paciente", ChecklistCategory::Other),
        ])
        .unwrap()
    }

    #[test]
    fn test_study_draft_targets_matching_rooms() {
        let prefill = Prefill::Study(StudyPrefill {
            patient_name: "Elena Campos".to_string(),
            study_type: "OCT".to_string(),
            eye: None,
            equipment: None,
            indication: None,
        });

        let draft = BookingDraft::from_prefill(&prefill, &directory(), &catalog(), &RelevanceScorer::default(), 3);

        assert_eq!(draft.kind, BookingKind::Study);
        let names: Vec<&str> = draft.candidate_providers.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["Sala OCT"]);
        assert_eq!(draft.checklist.suggested()[0], "oct");
        assert_eq!(draft.checklist.suggested().len(), 3);
    }

    #[test]
    fn test_unknown_specialty_offers_every_doctor() {
        let prefill = Prefill::Appointment(AppointmentPrefill {
            patient_name: "Elena Campos".to_string(),
            appointment_type: "Consulta".to_string(),
            specialty: Some("Oculoplastia".to_string()),
            reason: None,
        });

        let draft = BookingDraft::from_prefill(&prefill, &directory(), &catalog(), &RelevanceScorer::default(), 3);
        assert_eq!(draft.candidate_providers.len(), 2);
        assert!(draft.candidate_providers.iter().all(|p| p.name.starts_with("Dr")));
    }

    #[test]
    fn test_accent_free_specialty_finds_accented_doctor() {
        let mut directory = directory();
        directory
            .register(Provider::doctor("Dra. Navarro", "Córnea", vec![Weekday::Thu], hours()))
            .unwrap();
        let prefill = Prefill::Appointment(AppointmentPrefill {
            patient_name: "Elena Campos".to_string(),
            appointment_type: "Consulta".to_string(),
            specialty: Some("cornea".to_string()),
            reason: None,
        });

        let draft = BookingDraft::from_prefill(&prefill, &directory, &catalog(), &RelevanceScorer::default(), 3);
        let names: Vec<&str> = draft.candidate_providers.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["Dra. Navarro"]);
    }

    #[test]
    fn test_into_request_carries_toggled_items() {
        let catalog = catalog();
        let prefill = Prefill::Appointment(AppointmentPrefill {
            patient_name: "Elena Campos".to_string(),
            appointment_type: "Consulta".to_string(),
            specialty: None,
            reason: Some("Dilatar pupila antes".to_string()),
        });

        let mut draft = BookingDraft::from_prefill(&prefill, &directory(), &catalog, &RelevanceScorer::default(), 1);
        assert_eq!(draft.checklist.selected(), &["dilate".to_string()]);
        assert_eq!(draft.toggle_item(&catalog, "call"), Ok(true));

        let request = draft.into_request(None, None, None);
        assert_eq!(request.checklist_item_ids, vec!["dilate".to_string(), "call".to_string()]);
        assert_eq!(request.notes.as_deref(), Some("Dilatar pupila antes"));
        assert!(request.validate().is_err());
    }
}
