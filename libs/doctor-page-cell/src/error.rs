use thiserror::Error;

use shared_models::error::AppError;

use crate::models::{AppointmentField, PageOperation};

#[derive(Error, Debug, Clone, PartialEq)]
pub enum PageError {
    #[error("Backend request failed during {operation}: {reason}")]
    Backend { operation: PageOperation, reason: String },

    #[error("Doctor page is not loaded")]
    NotLoaded,

    #[error("Doctor page is already loading")]
    LoadInProgress,

    #[error("Appointment not found: {0}")]
    AppointmentNotFound(String),

    #[error("An action for appointment {0} is still in flight")]
    InFlight(String),

    #[error("Cannot reload while {0} appointment action(s) are in flight")]
    ActionsPending(usize),

    #[error("Appointment {0} is already being edited")]
    AlreadyEditing(String),

    #[error("No appointment is being edited")]
    NotEditing,

    #[error("Invalid value for {field}: {reason}")]
    InvalidField { field: AppointmentField, reason: String },
}

impl PageError {
    pub fn backend(operation: PageOperation, err: impl std::fmt::Display) -> Self {
        PageError::Backend { operation, reason: err.to_string() }
    }
}

impl From<PageError> for AppError {
    fn from(err: PageError) -> Self {
        let message = err.to_string();
        match err {
            PageError::Backend { .. } => AppError::ExternalService(message),
            PageError::AppointmentNotFound(_) => AppError::NotFound(message),
            PageError::NotLoaded
            | PageError::LoadInProgress
            | PageError::InFlight(_)
            | PageError::ActionsPending(_)
            | PageError::AlreadyEditing(_)
            | PageError::NotEditing => AppError::Conflict(message),
            PageError::InvalidField { .. } => AppError::ValidationError(message),
        }
    }
}
