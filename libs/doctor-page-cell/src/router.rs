use std::sync::Arc;

use axum::{
    Router,
    routing::{delete, get, patch, post, put},
};

use crate::handlers;
use crate::services::registry::PageRegistry;

pub fn doctor_page_routes(state: Arc<PageRegistry>) -> Router {
    Router::new()
        // Page lifecycle and navigation
        .route("/{doctor_id}", get(handlers::get_page))
        .route("/{doctor_id}/reload", post(handlers::reload_page))
        .route("/{doctor_id}/picture", get(handlers::get_profile_picture))
        .route("/{doctor_id}/edit-profile", get(handlers::edit_profile))
        .route("/{doctor_id}/logout", get(handlers::logout))
        .route("/{doctor_id}/failure", delete(handlers::dismiss_failure))

        // Status transitions and deletion
        .route("/{doctor_id}/appointments/{appointment_id}", delete(handlers::delete_appointment))
        .route("/{doctor_id}/appointments/{appointment_id}/status", put(handlers::change_status))
        .route("/{doctor_id}/appointments/{appointment_id}/confirm", post(handlers::confirm_appointment))

        // Inline editor
        .route("/{doctor_id}/appointments/{appointment_id}/edit", post(handlers::begin_edit))
        .route("/{doctor_id}/edit", patch(handlers::edit_field).delete(handlers::cancel_edit))
        .route("/{doctor_id}/edit/save", post(handlers::save_edit))

        .with_state(state)
}
