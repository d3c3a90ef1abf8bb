use async_trait::async_trait;
use serde_json::{json, Value};
use tracing::debug;

use shared_backend::DocereClient;
use shared_config::AppConfig;

use crate::error::PageError;
use crate::models::{Appointment, AppointmentStatus, DoctorProfile, PageOperation};

/// The REST operations the doctor page depends on.
#[async_trait]
pub trait AppointmentBackend: Send + Sync {
    async fn fetch_profile(&self, doctor_id: &str) -> Result<DoctorProfile, PageError>;

    /// Appointments in server order.
    async fn fetch_appointments(&self, doctor_id: &str) -> Result<Vec<Appointment>, PageError>;

    async fn update_status(&self, appointment_id: &str, status: &AppointmentStatus) -> Result<(), PageError>;

    async fn update_appointment(&self, appointment: &Appointment) -> Result<(), PageError>;

    async fn delete_appointment(&self, appointment_id: &str) -> Result<(), PageError>;
}

pub struct AppointmentApi {
    client: DocereClient,
}

impl AppointmentApi {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            client: DocereClient::new(config),
        }
    }
}

#[async_trait]
impl AppointmentBackend for AppointmentApi {
    async fn fetch_profile(&self, doctor_id: &str) -> Result<DoctorProfile, PageError> {
        debug!("Fetching doctor profile: {}", doctor_id);

        let value = self.client.get_doctor(doctor_id).await
            .map_err(|e| PageError::backend(PageOperation::Load, e))?;

        serde_json::from_value(value)
            .map_err(|e| PageError::backend(PageOperation::Load, format!("malformed doctor profile: {}", e)))
    }

    async fn fetch_appointments(&self, doctor_id: &str) -> Result<Vec<Appointment>, PageError> {
        debug!("Fetching appointments for doctor: {}", doctor_id);

        let values = self.client.get_appointments(doctor_id).await
            .map_err(|e| PageError::backend(PageOperation::Load, e))?;

        values
            .into_iter()
            .map(serde_json::from_value::<Appointment>)
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| PageError::backend(PageOperation::Load, format!("malformed appointment: {}", e)))
    }

    async fn update_status(&self, appointment_id: &str, status: &AppointmentStatus) -> Result<(), PageError> {
        debug!("Updating appointment {} status to {}", appointment_id, status);

        let body = json!({ "status": status });
        self.client.update_appointment_status(appointment_id, &body).await
            .map_err(|e| PageError::backend(PageOperation::ChangeStatus, e))
    }

    async fn update_appointment(&self, appointment: &Appointment) -> Result<(), PageError> {
        debug!("Updating appointment: {}", appointment.id);

        let body: Value = serde_json::to_value(appointment)
            .map_err(|e| PageError::backend(PageOperation::SaveEdit, e))?;

        self.client.update_appointment(&appointment.id, &body).await
            .map_err(|e| PageError::backend(PageOperation::SaveEdit, e))
    }

    async fn delete_appointment(&self, appointment_id: &str) -> Result<(), PageError> {
        debug!("Deleting appointment: {}", appointment_id);

        self.client.delete_appointment(appointment_id).await
            .map_err(|e| PageError::backend(PageOperation::Delete, e))
    }
}
