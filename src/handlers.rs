use axum::{http::StatusCode, response::Json};

use crate::schemas::ErrorResponse;

pub mod dashboard;
pub mod health;
pub mod properties;
pub mod tenancies;
pub mod tenants;
pub mod units;

/// Standard failure pair for store errors, shared by the handler modules.
/// The caller has already logged the underlying database error.
pub(crate) fn database_error() -> (StatusCode, Json<ErrorResponse>) {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(ErrorResponse {
            error: "The operation could not be completed".to_string(),
            code: "DATABASE_ERROR".to_string(),
            success: false,
        }),
    )
}
