//! Send email handler

use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use utoipa::ToSchema;

use crate::{
    domain::communication::emails::{parse_value, EmailService},
    infrastructure::http::{errors::ApiError, state::AppState},
};

/// Send email response body
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SendEmailResponse {
    /// The provider that accepted the email
    #[schema(example = "sendgrid")]
    pub provider: String,

    /// The identifier the provider assigned to the email
    #[schema(example = "14c5d75ce93.dfd.64b469")]
    pub message_id: String,
}

/// Send an email
#[utoipa::path(
    post,
    operation_id = "send_email",
    tag = "Emails",
    path = "/api/v1/emails",
    request_body = EmailDocument,
    responses(
        (status = StatusCode::ACCEPTED, description = "Email accepted by the provider", body = SendEmailResponse),
        (status = StatusCode::UNPROCESSABLE_ENTITY, description = "Invalid email, attachment or template key, or rejected by the provider", body = ErrorResponse),
        (status = StatusCode::INTERNAL_SERVER_ERROR, description = "Broken template or provider credentials", body = ErrorResponse),
        (status = StatusCode::SERVICE_UNAVAILABLE, description = "Provider unreachable, safe to retry", body = ErrorResponse),
    )
)]
pub async fn handler<E: EmailService>(
    State(state): State<AppState<E>>,
    request: Result<Json<Value>, JsonRejection>,
) -> Result<(StatusCode, Json<SendEmailResponse>), ApiError> {
    let Json(document) = request?;

    let email = parse_value(document)?;

    let result = state.emails.send_email(email).await?;

    Ok((
        StatusCode::ACCEPTED,
        Json(SendEmailResponse {
            provider: result.provider.to_string(),
            message_id: result.provider_message_id,
        }),
    ))
}
