use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::RwLock;
use tracing::{error, info, warn};

use shared_config::{AppConfig, SavePolicy};

use crate::error::PageError;
use crate::models::{
    ActionFailure, Appointment, AppointmentRow, AppointmentStatus, DoctorPageView, DoctorProfile,
    FieldEdit, Navigation, NavigationLinks, PageOperation, PageStatus,
};
use crate::services::backend::AppointmentBackend;
use crate::services::editor::Editor;
use crate::services::loader::ProfileLoader;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageSettings {
    pub min_loading_delay: Duration,
    pub save_policy: SavePolicy,
}

impl PageSettings {
    pub fn from_config(config: &AppConfig) -> Self {
        Self {
            min_loading_delay: config.min_loading_delay(),
            save_policy: config.save_policy,
        }
    }
}

impl Default for PageSettings {
    fn default() -> Self {
        Self::from_config(&AppConfig::default())
    }
}

#[derive(Debug)]
struct PageInner {
    status: PageStatus,
    profile: Option<DoctorProfile>,
    appointments: Vec<Appointment>,
    editor: Editor,
    in_flight: HashSet<String>,
    last_failure: Option<ActionFailure>,
}

impl PageInner {
    fn new() -> Self {
        Self {
            status: PageStatus::Idle,
            profile: None,
            appointments: Vec::new(),
            editor: Editor::new(),
            in_flight: HashSet::new(),
            last_failure: None,
        }
    }

    fn ensure_ready(&self) -> Result<(), PageError> {
        match self.status {
            PageStatus::Ready => Ok(()),
            PageStatus::Loading => Err(PageError::LoadInProgress),
            _ => Err(PageError::NotLoaded),
        }
    }

    fn find(&self, appointment_id: &str) -> Result<&Appointment, PageError> {
        self.appointments
            .iter()
            .find(|a| a.id == appointment_id)
            .ok_or_else(|| PageError::AppointmentNotFound(appointment_id.to_string()))
    }

    fn ensure_idle(&self, appointment_id: &str) -> Result<(), PageError> {
        if self.in_flight.contains(appointment_id) {
            return Err(PageError::InFlight(appointment_id.to_string()));
        }
        Ok(())
    }

    /// Marks `appointment_id` in flight after checking it can be acted on.
    fn claim(&mut self, appointment_id: &str) -> Result<(), PageError> {
        self.ensure_ready()?;
        self.find(appointment_id)?;
        self.ensure_idle(appointment_id)?;
        self.in_flight.insert(appointment_id.to_string());
        Ok(())
    }

    fn record_failure(&mut self, operation: PageOperation, appointment_id: &str, err: &PageError) {
        error!("Failed to {} appointment {}: {}", operation, appointment_id, err);
        self.last_failure = Some(ActionFailure {
            operation,
            appointment_id: Some(appointment_id.to_string()),
            reason: err.to_string(),
        });
    }
}

/// View state for one doctor's page.
///
/// Every mutation goes to the backend first and is mirrored locally only after the
/// backend acknowledges it. The state lock is never held across a backend call, so
/// the page can be shared between concurrent callers; a second action on an
/// appointment that still has one outstanding is rejected with
/// [`PageError::InFlight`].
pub struct DoctorPage {
    doctor_id: String,
    backend: Arc<dyn AppointmentBackend>,
    settings: PageSettings,
    inner: RwLock<PageInner>,
}

impl DoctorPage {
    pub fn new(doctor_id: impl Into<String>, backend: Arc<dyn AppointmentBackend>, settings: PageSettings) -> Self {
        Self {
            doctor_id: doctor_id.into(),
            backend,
            settings,
            inner: RwLock::new(PageInner::new()),
        }
    }

    pub fn doctor_id(&self) -> &str {
        &self.doctor_id
    }

    pub async fn status(&self) -> PageStatus {
        self.inner.read().await.status.clone()
    }

    pub async fn profile(&self) -> Option<DoctorProfile> {
        self.inner.read().await.profile.clone()
    }

    pub async fn appointments(&self) -> Vec<Appointment> {
        self.inner.read().await.appointments.clone()
    }

    pub async fn editing_id(&self) -> Option<String> {
        self.inner.read().await.editor.editing_id().map(str::to_string)
    }

    pub async fn last_failure(&self) -> Option<ActionFailure> {
        self.inner.read().await.last_failure.clone()
    }

    /// Fetches the profile and appointments, replacing whatever was shown before.
    /// Allowed from any state except `Loading`, and only once no appointment action
    /// is outstanding, since the fresh list would not reflect it.
    pub async fn load(&self) -> Result<(), PageError> {
        {
            let mut inner = self.inner.write().await;
            if inner.status == PageStatus::Loading {
                return Err(PageError::LoadInProgress);
            }
            if !inner.in_flight.is_empty() {
                return Err(PageError::ActionsPending(inner.in_flight.len()));
            }
            inner.status = PageStatus::Loading;
        }

        let result = ProfileLoader::load(
            self.backend.as_ref(),
            &self.doctor_id,
            self.settings.min_loading_delay,
        )
        .await;

        let mut inner = self.inner.write().await;
        match result {
            Ok(loaded) => {
                inner.profile = Some(loaded.profile);
                inner.appointments = loaded.appointments;
                inner.editor.cancel();
                inner.last_failure = None;
                inner.status = PageStatus::Ready;
                Ok(())
            }
            Err(e) => {
                error!("Error fetching data for doctor {}: {}", self.doctor_id, e);
                inner.status = PageStatus::Failed { reason: e.to_string() };
                Err(e)
            }
        }
    }

    /// Loads a page that has never been loaded. A failed page stays failed until
    /// [`DoctorPage::load`] is called again.
    pub async fn activate(&self) -> Result<(), PageError> {
        if self.status().await != PageStatus::Idle {
            return Ok(());
        }
        match self.load().await {
            Err(PageError::LoadInProgress) => Ok(()),
            other => other,
        }
    }

    pub async fn change_status(&self, appointment_id: &str, status: AppointmentStatus) -> Result<(), PageError> {
        self.inner.write().await.claim(appointment_id)?;

        let result = self.backend.update_status(appointment_id, &status).await;

        let mut inner = self.inner.write().await;
        inner.in_flight.remove(appointment_id);
        match result {
            Ok(()) => {
                if let Some(appointment) = inner.appointments.iter_mut().find(|a| a.id == appointment_id) {
                    appointment.set_status(&status);
                }
                inner.editor.sync_status(appointment_id, &status);
                inner.last_failure = None;
                info!("Appointment {} status changed to {}", appointment_id, status);
                Ok(())
            }
            Err(e) => {
                inner.record_failure(PageOperation::ChangeStatus, appointment_id, &e);
                Err(e)
            }
        }
    }

    pub async fn confirm(&self, appointment_id: &str) -> Result<(), PageError> {
        self.change_status(appointment_id, AppointmentStatus::successful()).await
    }

    pub async fn delete(&self, appointment_id: &str) -> Result<(), PageError> {
        self.inner.write().await.claim(appointment_id)?;

        let result = self.backend.delete_appointment(appointment_id).await;

        let mut inner = self.inner.write().await;
        inner.in_flight.remove(appointment_id);
        match result {
            Ok(()) => {
                inner.appointments.retain(|a| a.id != appointment_id);
                inner.editor.close_if(appointment_id);
                inner.last_failure = None;
                info!("Appointment {} deleted", appointment_id);
                Ok(())
            }
            Err(e) => {
                inner.record_failure(PageOperation::Delete, appointment_id, &e);
                Err(e)
            }
        }
    }

    /// Checks `appointment_id` out into the edit buffer.
    pub async fn begin_edit(&self, appointment_id: &str) -> Result<Appointment, PageError> {
        let mut inner = self.inner.write().await;
        inner.ensure_ready()?;
        inner.ensure_idle(appointment_id)?;

        let appointment = inner.find(appointment_id)?.clone();
        let session = inner.editor.begin(&appointment)?;
        Ok(session.buffer().clone())
    }

    pub async fn edit_field(&self, edit: FieldEdit) -> Result<Appointment, PageError> {
        let mut inner = self.inner.write().await;
        let editing = inner.editor.editing_id().map(str::to_string).ok_or(PageError::NotEditing)?;
        inner.ensure_idle(&editing)?;

        inner.editor.apply(&edit).cloned()
    }

    pub async fn cancel_edit(&self) -> Result<(), PageError> {
        let mut inner = self.inner.write().await;
        let editing = inner.editor.editing_id().map(str::to_string).ok_or(PageError::NotEditing)?;
        inner.ensure_idle(&editing)?;

        inner.editor.cancel();
        Ok(())
    }

    /// Sends the edit buffer as the update body. On success the buffer replaces the
    /// listed appointment and the editor closes. On failure the editor stays open
    /// unless the save policy is [`SavePolicy::CloseRegardless`].
    pub async fn save_edit(&self) -> Result<Appointment, PageError> {
        let buffer = {
            let mut inner = self.inner.write().await;
            inner.ensure_ready()?;
            let buffer = inner
                .editor
                .session()
                .map(|s| s.buffer().clone())
                .ok_or(PageError::NotEditing)?;
            inner.claim(&buffer.id)?;
            buffer
        };

        let result = self.backend.update_appointment(&buffer).await;

        let mut inner = self.inner.write().await;
        inner.in_flight.remove(&buffer.id);
        match result {
            Ok(()) => {
                if let Some(appointment) = inner.appointments.iter_mut().find(|a| a.id == buffer.id) {
                    *appointment = buffer.clone();
                }
                inner.editor.close_if(&buffer.id);
                inner.last_failure = None;
                info!("Appointment {} updated", buffer.id);
                Ok(buffer)
            }
            Err(e) => {
                inner.record_failure(PageOperation::SaveEdit, &buffer.id, &e);
                if self.settings.save_policy == SavePolicy::CloseRegardless {
                    warn!("Closing editor for {} although the save failed", buffer.id);
                    inner.editor.close_if(&buffer.id);
                }
                Err(e)
            }
        }
    }

    pub async fn dismiss_failure(&self) {
        self.inner.write().await.last_failure = None;
    }

    pub fn navigation(&self, target: Navigation) -> String {
        target.path(&self.doctor_id)
    }

    /// Snapshot of everything the page renders, rows in server order.
    pub async fn view(&self) -> DoctorPageView {
        let inner = self.inner.read().await;

        let rows = inner
            .appointments
            .iter()
            .map(|appointment| AppointmentRow {
                summary: appointment.summary(),
                appointment: appointment.clone(),
                editing: inner.editor.buffer_for(&appointment.id).cloned(),
                in_flight: inner.in_flight.contains(&appointment.id),
            })
            .collect();

        DoctorPageView {
            doctor_id: self.doctor_id.clone(),
            status: inner.status.clone(),
            profile: inner.profile.clone(),
            rows,
            editing: inner.editor.editing_id().map(str::to_string),
            last_failure: inner.last_failure.clone(),
            links: NavigationLinks {
                logout: self.navigation(Navigation::Login),
                edit_profile: self.navigation(Navigation::EditProfile),
            },
        }
    }
}
