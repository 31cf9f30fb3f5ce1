//! Version 1 of the API

use axum::{
    routing::{get, post},
    Json, Router,
};
use utoipa::OpenApi;

use crate::{
    domain::communication::emails::EmailService,
    infrastructure::http::{open_api::ApiDocs, state::AppState},
};

pub mod emails;
pub mod stoplight;
pub mod uptime;

/// The version 1 routes
pub fn router<E: EmailService>() -> Router<AppState<E>> {
    Router::new()
        .route("/", get(stoplight::handler))
        .route("/openapi.json", get(Json(ApiDocs::openapi())))
        .route("/uptime", get(uptime::handler))
        .route("/emails", post(emails::send_email::handler))
}
