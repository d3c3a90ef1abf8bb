use std::sync::Arc;

use axum::{
    Router,
    response::Redirect,
    routing::get,
};

use doctor_page_cell::models::Navigation;
use doctor_page_cell::router::doctor_page_routes;
use doctor_page_cell::PageRegistry;

pub fn create_router(state: Arc<PageRegistry>) -> Router {
    Router::new()
        .route("/", get(|| async { "Docere doctor page is running!" }))
        .route("/logout", get(|| async { Redirect::to(&Navigation::Login.path("")) }))
        .nest("/doctors", doctor_page_routes(state))
}
