use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;

/// Local pre-check failures. Nothing is sent to the endpoint when one of
/// these is raised.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Rejection {
    #[error("Please enter the password.")]
    MissingPassword,

    #[error("Please enter valid, non-negative numbers for points.")]
    InvalidNumber,

    #[error("Please provide a reason.")]
    MissingReason,

    #[error("Please add at least one point.")]
    NothingToAdd,

    #[error("Please redeem at least one point.")]
    NothingToRedeem,

    #[error("That many points would overflow the balance.")]
    TooManyPoints,

    #[error(
        "Update failed. User does not have enough points. Current points - Local: {local}, Global: {global}"
    )]
    InsufficientPoints { local: u64, global: u64 },
}

#[derive(Debug, thiserror::Error)]
pub enum DashboardError {
    /// Credential rejected by the endpoint. Destroys the session.
    #[error("{0}")]
    Auth(String),

    /// Network failure, unreadable body or any non-auth server error.
    #[error("{0}")]
    Transient(String),

    #[error(transparent)]
    Validation(#[from] Rejection),

    /// Endpoint refused an adjustment after submission.
    #[error("Update failed: {0}")]
    Update(String),

    #[error("Not logged in")]
    NotLoggedIn,

    #[error("Unknown user: {0}")]
    UnknownUser(String),

    #[error("Failed to persist session: {0}")]
    Storage(#[from] std::io::Error),
}

#[derive(Serialize)]
struct ErrorResponse {
    error: &'static str,
    details: String,
}

impl IntoResponse for DashboardError {
    fn into_response(self) -> Response {
        let (status, error) = match &self {
            DashboardError::Auth(_) => (StatusCode::UNAUTHORIZED, "auth_error"),
            DashboardError::Transient(_) => (StatusCode::BAD_GATEWAY, "transient_error"),
            DashboardError::Validation(_) => (StatusCode::BAD_REQUEST, "validation_error"),
            DashboardError::Update(_) => (StatusCode::CONFLICT, "update_error"),
            DashboardError::NotLoggedIn => (StatusCode::UNAUTHORIZED, "not_logged_in"),
            DashboardError::UnknownUser(_) => (StatusCode::NOT_FOUND, "unknown_user"),
            DashboardError::Storage(err) => {
                tracing::error!(error = %err, "session storage failure");
                (StatusCode::INTERNAL_SERVER_ERROR, "storage_error")
            }
        };

        let body = ErrorResponse {
            error,
            details: self.to_string(),
        };
        (status, Json(body)).into_response()
    }
}
