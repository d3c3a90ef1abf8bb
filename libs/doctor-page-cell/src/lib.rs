pub mod error;
pub mod handlers;
pub mod models;
pub mod router;
pub mod services;

pub use error::PageError;
pub use models::*;
pub use services::backend::{AppointmentApi, AppointmentBackend};
pub use services::page::{DoctorPage, PageSettings};
pub use services::registry::PageRegistry;
