use anyhow::{anyhow, Context, Result};
use chrono::{Local, NaiveDate, NaiveTime};
use dotenv::dotenv;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod seed;

use appointment_cell::models::{
    AppointmentError, AppointmentPrefill, BookingStatus, Eye, Prefill, StudyPrefill,
};
use appointment_cell::services::{BookingService, BookingStore};
use provider_cell::services::ProviderDirectory;
use shared_config::AppConfig;
use shared_models::error::AppError;
use shared_models::time::format_time_of_day;
use uuid::Uuid;

#[tokio::main]
async fn main() -> Result<()> {
    // Loading Env Vars
    dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting clinic scheduler demo");

    let config = AppConfig::from_env();
    let today = Local::now().date_naive();

    let directory = seed::providers().context("seeding providers")?;
    let catalog = seed::checklist(today).context("seeding checklist")?;
    let service = BookingService::new(&config)?;
    let mut store = BookingStore::new();

    info!(
        "Loaded {} providers and {} checklist items",
        directory.len(),
        catalog.len()
    );

    // Study booked from an OCT order.
    let study = Prefill::Study(StudyPrefill {
        patient_name: "María López".to_string(),
        study_type: "OCT macular".to_string(),
        eye: Some(Eye::Right),
        equipment: Some("OCT".to_string()),
        indication: Some("Control tras inyección intravítrea".to_string()),
    });
    let draft = service.open_draft(&directory, &catalog, &study);
    info!("Suggested checklist for '{}': {:?}", draft.appointment_type, draft.checklist.suggested());

    let room = draft
        .candidate_providers
        .first()
        .map(|p| p.id)
        .ok_or_else(|| anyhow!("no study room offers {}", draft.appointment_type))?;
    let (date, time) = first_free_slot(&service, &store, &directory, room)?;
    let request = draft.into_request(Some(room), Some(date), Some(time));
    let study_booking = service.submit(&mut store, &directory, &catalog, request).await?;
    info!("Study booked: {}", serde_json::to_string(&study_booking.booking)?);

    // Follow-up consultation with a retina specialist.
    let consultation = Prefill::Appointment(AppointmentPrefill {
        patient_name: "María López".to_string(),
        appointment_type: "Revisión de retina".to_string(),
        specialty: Some("retina".to_string()),
        reason: Some("Revisar resultados de OCT macular".to_string()),
    });
    let draft = service.open_draft(&directory, &catalog, &consultation);
    info!("Suggested checklist for '{}': {:?}", draft.appointment_type, draft.checklist.suggested());

    let doctor = draft
        .candidate_providers
        .first()
        .map(|p| p.id)
        .ok_or_else(|| anyhow!("no doctor for {}", draft.appointment_type))?;
    let (date, time) = first_free_slot(&service, &store, &directory, doctor)?;
    let visit = service
        .submit(
            &mut store,
            &directory,
            &catalog,
            draft.clone().into_request(Some(doctor), Some(date), Some(time)),
        )
        .await?;

    // A second click on the same slot.
    let retry = draft.into_request(Some(doctor), Some(date), Some(time));
    match service.submit(&mut store, &directory, &catalog, retry).await {
        Ok(confirmation) => warn!("Double booking stored: {:?}", confirmation.warnings),
        Err(err) => {
            let app_error = AppError::from(err.clone());
            app_error.log();
            if !app_error.is_recoverable() {
                return Err(err.into());
            }

            if let AppointmentError::ConflictDetected { .. } = err {
                let conflicts = service.check_conflicts(&store, &directory, doctor, date, time)?;
                let alternatives: Vec<String> = conflicts
                    .suggested_alternatives
                    .iter()
                    .map(|s| format!("{} {}", s.date, format_time_of_day(s.time)))
                    .collect();
                warn!("Slot taken, alternatives: {}", alternatives.join(", "));

                if let Some(alternative) = conflicts.suggested_alternatives.first() {
                    let moved = service.reschedule(
                        &mut store,
                        &directory,
                        visit.booking.id,
                        alternative.date,
                        alternative.time,
                    )?;
                    service.transition(&mut store, moved.booking.id, BookingStatus::Confirmed)?;
                    service.transition(&mut store, moved.booking.id, BookingStatus::InWaitingRoom)?;
                }
            }
        }
    }

    service.cancel(&mut store, study_booking.booking.id)?;

    info!("Final bookings:\n{}", serde_json::to_string_pretty(store.all())?);
    Ok(())
}

fn first_free_slot(
    service: &BookingService,
    store: &BookingStore,
    directory: &ProviderDirectory,
    provider_id: Uuid,
) -> Result<(NaiveDate, NaiveTime)> {
    for date in service.available_dates_from_today(directory, provider_id)? {
        if let Some(time) = service
            .available_times(store, directory, provider_id, date)?
            .first()
        {
            return Ok((date, *time));
        }
    }
    Err(anyhow!("provider {} has no free slot in the booking window", provider_id))
}
