use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::Json,
};
use common::PortfolioSummary;
use serde::Deserialize;
use tracing::{error, instrument};
use utoipa::IntoParams;

use crate::handlers::database_error;
use crate::schemas::{ApiResponse, AppState, ErrorResponse};

/// Query parameters for the portfolio summary
#[derive(Debug, Deserialize, IntoParams)]
pub struct SummaryQuery {
    /// Restrict the summary to one landlord's portfolio
    pub landlord_id: Option<i32>,
}

/// Get the occupancy summary across properties.
///
/// The numbers are recomputed from the property rows on every request;
/// nothing is cached beyond what the rows themselves store.
#[utoipa::path(
    get,
    path = "/api/v1/dashboard/summary",
    tag = "dashboard",
    params(SummaryQuery),
    responses(
        (status = 200, description = "Summary retrieved successfully", body = ApiResponse<PortfolioSummary>),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn get_portfolio_summary(
    Query(query): Query<SummaryQuery>,
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<PortfolioSummary>>, (StatusCode, Json<ErrorResponse>)> {
    match compute::occupancy::portfolio_summary(&state.db, query.landlord_id).await {
        Ok(summary) => {
            let response = ApiResponse {
                data: summary,
                message: "Summary retrieved successfully".to_string(),
                success: true,
            };
            Ok(Json(response))
        }
        Err(compute_error) => {
            error!("Failed to compute portfolio summary: {}", compute_error);
            Err(database_error())
        }
    }
}
