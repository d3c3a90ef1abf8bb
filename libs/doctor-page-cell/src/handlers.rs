use std::future::Future;
use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::header,
    response::{IntoResponse, Redirect, Response},
    Json,
};
use serde_json::{json, Value};
use tracing::{debug, error};

use shared_models::error::AppError;

use crate::error::PageError;
use crate::models::{FieldEdit, Navigation, StatusUpdateRequest};
use crate::services::page::DoctorPage;
use crate::services::registry::PageRegistry;

/// Runs a page operation on its own task so a dropped request cannot leave an
/// appointment marked in flight or the page stuck loading.
async fn detached<F, T>(operation: F) -> Result<Result<T, PageError>, AppError>
where
    F: Future<Output = Result<T, PageError>> + Send + 'static,
    T: Send + 'static,
{
    tokio::spawn(operation).await.map_err(|e| {
        error!("Page operation task failed: {}", e);
        AppError::Internal(e.to_string())
    })
}

/// Looks up a page that GET or reload already mounted. Actions never mount one.
async fn mounted_page(registry: &PageRegistry, doctor_id: &str) -> Result<Arc<DoctorPage>, AppError> {
    registry
        .get(doctor_id)
        .await
        .ok_or_else(|| AppError::NotFound(format!("Doctor page {} is not mounted", doctor_id)))
}

async fn view_json(page: &DoctorPage) -> Json<Value> {
    Json(json!(page.view().await))
}

// ==============================================================================
// PAGE LIFECYCLE
// ==============================================================================

#[axum::debug_handler]
pub async fn get_page(
    State(registry): State<Arc<PageRegistry>>,
    Path(doctor_id): Path<String>,
) -> Result<Json<Value>, AppError> {
    let page = registry.page(&doctor_id).await;

    let activating = page.clone();
    if let Err(e) = detached(async move { activating.activate().await }).await? {
        // the failure is part of the rendered state
        debug!("Doctor page {} did not load: {}", page.doctor_id(), e);
    }

    Ok(view_json(&page).await)
}

#[axum::debug_handler]
pub async fn reload_page(
    State(registry): State<Arc<PageRegistry>>,
    Path(doctor_id): Path<String>,
) -> Result<Json<Value>, AppError> {
    let page = registry.page(&doctor_id).await;

    let loading = page.clone();
    match detached(async move { loading.load().await }).await? {
        Ok(()) | Err(PageError::Backend { .. }) => Ok(view_json(&page).await),
        Err(e) => Err(e.into()),
    }
}

pub async fn get_profile_picture(
    State(registry): State<Arc<PageRegistry>>,
    Path(doctor_id): Path<String>,
) -> Result<Response, AppError> {
    let page = mounted_page(&registry, &doctor_id).await?;

    let profile = page.profile().await.ok_or(PageError::NotLoaded)?;
    let bytes = profile
        .picture_bytes()
        .map_err(|e| AppError::Internal(format!("Profile picture is not valid base64: {}", e)))?
        .ok_or_else(|| AppError::NotFound("Doctor has no profile picture".to_string()))?;

    Ok(([(header::CONTENT_TYPE, "image/jpeg")], bytes).into_response())
}

pub async fn edit_profile(Path(doctor_id): Path<String>) -> Redirect {
    Redirect::to(&Navigation::EditProfile.path(&doctor_id))
}

pub async fn logout(
    State(registry): State<Arc<PageRegistry>>,
    Path(doctor_id): Path<String>,
) -> Redirect {
    registry.unmount(&doctor_id).await;
    Redirect::to(&Navigation::Login.path(&doctor_id))
}

#[axum::debug_handler]
pub async fn dismiss_failure(
    State(registry): State<Arc<PageRegistry>>,
    Path(doctor_id): Path<String>,
) -> Result<Json<Value>, AppError> {
    let page = mounted_page(&registry, &doctor_id).await?;
    page.dismiss_failure().await;
    Ok(view_json(&page).await)
}

// ==============================================================================
// APPOINTMENT ACTIONS
// ==============================================================================

#[axum::debug_handler]
pub async fn change_status(
    State(registry): State<Arc<PageRegistry>>,
    Path((doctor_id, appointment_id)): Path<(String, String)>,
    Json(request): Json<StatusUpdateRequest>,
) -> Result<Json<Value>, AppError> {
    let page = mounted_page(&registry, &doctor_id).await?;

    let acting = page.clone();
    detached(async move { acting.change_status(&appointment_id, request.status).await }).await??;

    Ok(view_json(&page).await)
}

#[axum::debug_handler]
pub async fn confirm_appointment(
    State(registry): State<Arc<PageRegistry>>,
    Path((doctor_id, appointment_id)): Path<(String, String)>,
) -> Result<Json<Value>, AppError> {
    let page = mounted_page(&registry, &doctor_id).await?;

    let acting = page.clone();
    detached(async move { acting.confirm(&appointment_id).await }).await??;

    Ok(view_json(&page).await)
}

#[axum::debug_handler]
pub async fn delete_appointment(
    State(registry): State<Arc<PageRegistry>>,
    Path((doctor_id, appointment_id)): Path<(String, String)>,
) -> Result<Json<Value>, AppError> {
    let page = mounted_page(&registry, &doctor_id).await?;

    let acting = page.clone();
    detached(async move { acting.delete(&appointment_id).await }).await??;

    Ok(view_json(&page).await)
}

// ==============================================================================
// INLINE EDITOR
// ==============================================================================

#[axum::debug_handler]
pub async fn begin_edit(
    State(registry): State<Arc<PageRegistry>>,
    Path((doctor_id, appointment_id)): Path<(String, String)>,
) -> Result<Json<Value>, AppError> {
    let page = mounted_page(&registry, &doctor_id).await?;
    page.begin_edit(&appointment_id).await?;
    Ok(view_json(&page).await)
}

#[axum::debug_handler]
pub async fn edit_field(
    State(registry): State<Arc<PageRegistry>>,
    Path(doctor_id): Path<String>,
    Json(edit): Json<FieldEdit>,
) -> Result<Json<Value>, AppError> {
    let page = mounted_page(&registry, &doctor_id).await?;
    page.edit_field(edit).await?;
    Ok(view_json(&page).await)
}

#[axum::debug_handler]
pub async fn cancel_edit(
    State(registry): State<Arc<PageRegistry>>,
    Path(doctor_id): Path<String>,
) -> Result<Json<Value>, AppError> {
    let page = mounted_page(&registry, &doctor_id).await?;
    page.cancel_edit().await?;
    Ok(view_json(&page).await)
}

#[axum::debug_handler]
pub async fn save_edit(
    State(registry): State<Arc<PageRegistry>>,
    Path(doctor_id): Path<String>,
) -> Result<Json<Value>, AppError> {
    let page = mounted_page(&registry, &doctor_id).await?;

    let saving = page.clone();
    detached(async move { saving.save_edit().await }).await??;

    Ok(view_json(&page).await)
}
