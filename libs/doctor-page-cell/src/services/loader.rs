use std::time::Duration;

use futures::future::try_join;
use tokio::time::{sleep, Instant};
use tracing::{debug, info};

use crate::error::PageError;
use crate::models::{Appointment, DoctorProfile};
use crate::services::backend::AppointmentBackend;

#[derive(Debug, Clone, PartialEq)]
pub struct LoadedPage {
    pub profile: DoctorProfile,
    pub appointments: Vec<Appointment>,
}

/// Fetches everything the page needs on activation.
pub struct ProfileLoader;

impl ProfileLoader {
    /// Requests the profile and the appointment list concurrently and returns once
    /// both have arrived and at least `min_display` has elapsed. A failure is
    /// returned as soon as either request fails.
    pub async fn load<B>(backend: &B, doctor_id: &str, min_display: Duration) -> Result<LoadedPage, PageError>
    where
        B: AppointmentBackend + ?Sized,
    {
        debug!("Loading doctor page for {} (minimum display {:?})", doctor_id, min_display);

        let started = Instant::now();
        let (profile, appointments) = try_join(
            backend.fetch_profile(doctor_id),
            backend.fetch_appointments(doctor_id),
        )
        .await?;

        let elapsed = started.elapsed();
        if elapsed < min_display {
            sleep(min_display - elapsed).await;
        }

        info!("Loaded doctor {} with {} appointments", doctor_id, appointments.len());

        Ok(LoadedPage { profile, appointments })
    }
}
