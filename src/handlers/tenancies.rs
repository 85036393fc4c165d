use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::Json,
};
use axum_valid::Valid;
use chrono::NaiveDate;
use model::entities::tenancy;
use rust_decimal::Decimal;
use sea_orm::{
    ActiveEnum, ActiveModelTrait, ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, Set,
};
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info, instrument, warn};
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

use crate::handlers::database_error;
use crate::handlers::properties::find_property;
use crate::handlers::units::find_unit;
use crate::schemas::{ApiResponse, AppState, ErrorResponse};
use crate::workflows::tenancy::{assign_tenant, end_tenancy as end_tenancy_workflow, AssignTenant, TenancyError};

/// Request body for assigning a tenant to a unit
#[derive(Debug, Deserialize, Serialize, ToSchema)]
pub struct CreateTenancyRequest {
    /// Unit to assign the tenant to
    pub unit_id: i32,
    /// Tenant user ID
    pub tenant_id: i32,
    /// When the tenant moves in
    pub move_in_date: NaiveDate,
    /// Agreed monthly rent (must be at least 1)
    pub monthly_rent: Decimal,
    /// Security deposit (default: 0)
    pub deposit_amount: Option<Decimal>,
}

/// Request body for updating a tenancy's agreed terms
#[derive(Debug, Deserialize, Serialize, ToSchema)]
pub struct UpdateTenancyRequest {
    /// When the tenant moves in
    pub move_in_date: Option<NaiveDate>,
    /// Agreed monthly rent (must be at least 1)
    pub monthly_rent: Option<Decimal>,
    /// Security deposit
    pub deposit_amount: Option<Decimal>,
}

/// Query parameters for listing tenancies
#[derive(Debug, Deserialize, ToSchema, IntoParams, Validate)]
pub struct TenancyListQuery {
    /// Page number (default: 1)
    #[validate(range(min = 1, max = 10000))]
    pub page: Option<u64>,
    /// Page size (default: 50)
    #[validate(range(min = 1, max = 1000))]
    pub limit: Option<u64>,
    /// Filter by unit ID
    pub unit_id: Option<i32>,
    /// Filter by property ID
    pub property_id: Option<i32>,
    /// Filter by status ("active" or "ended")
    pub status: Option<String>,
}

/// Tenancy response model
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct TenancyResponse {
    pub id: i32,
    pub property_id: i32,
    pub unit_id: i32,
    pub tenant_id: i32,
    pub move_in_date: NaiveDate,
    pub move_out_date: Option<NaiveDate>,
    pub monthly_rent: Decimal,
    pub deposit_amount: Decimal,
    pub status: String,
}

impl From<tenancy::Model> for TenancyResponse {
    fn from(model: tenancy::Model) -> Self {
        Self {
            id: model.id,
            property_id: model.property_id,
            unit_id: model.unit_id,
            tenant_id: model.tenant_id,
            move_in_date: model.move_in_date,
            move_out_date: model.move_out_date,
            monthly_rent: model.monthly_rent,
            deposit_amount: model.deposit_amount,
            status: model.status.to_value(),
        }
    }
}

// Helper function to parse a status string to TenancyStatus
fn parse_tenancy_status(status: &str) -> Result<tenancy::TenancyStatus, String> {
    match status {
        "active" => Ok(tenancy::TenancyStatus::Active),
        "ended" => Ok(tenancy::TenancyStatus::Ended),
        _ => Err(format!("Invalid tenancy status: {}", status)),
    }
}

/// Map a workflow failure to the transport-level error pair.
fn workflow_error(err: TenancyError) -> (StatusCode, Json<ErrorResponse>) {
    let (status, code) = match &err {
        TenancyError::UnitNotFound(_) => (StatusCode::NOT_FOUND, "UNIT_NOT_FOUND"),
        TenancyError::TenantNotFound(_) => (StatusCode::BAD_REQUEST, "INVALID_TENANT_ID"),
        TenancyError::NotATenant(_) => (StatusCode::BAD_REQUEST, "NOT_A_TENANT"),
        TenancyError::UnitOccupied(_) => (StatusCode::CONFLICT, "UNIT_ALREADY_OCCUPIED"),
        TenancyError::InvalidRent(_) => (StatusCode::BAD_REQUEST, "INVALID_MONTHLY_RENT"),
        TenancyError::InvalidDeposit(_) => (StatusCode::BAD_REQUEST, "INVALID_DEPOSIT_AMOUNT"),
        TenancyError::TenancyNotFound(_) => (StatusCode::NOT_FOUND, "TENANCY_NOT_FOUND"),
        TenancyError::AlreadyEnded(_) => (StatusCode::CONFLICT, "TENANCY_ALREADY_ENDED"),
        TenancyError::Database(db_error) => {
            error!("Tenancy workflow database error: {}", db_error);
            return database_error();
        }
    };

    (
        status,
        Json(ErrorResponse {
            error: err.to_string(),
            code: code.to_string(),
            success: false,
        }),
    )
}

fn tenancy_not_found(tenancy_id: i32) -> (StatusCode, Json<ErrorResponse>) {
    (
        StatusCode::NOT_FOUND,
        Json(ErrorResponse {
            error: format!("Tenancy with id {} does not exist", tenancy_id),
            code: "TENANCY_NOT_FOUND".to_string(),
            success: false,
        }),
    )
}

/// Assign a tenant to a unit, creating an active tenancy
#[utoipa::path(
    post,
    path = "/api/v1/tenancies",
    tag = "tenancies",
    request_body = CreateTenancyRequest,
    responses(
        (status = 201, description = "Tenant assigned successfully", body = ApiResponse<TenancyResponse>),
        (status = 400, description = "Invalid request", body = ErrorResponse),
        (status = 404, description = "Unit not found", body = ErrorResponse),
        (status = 409, description = "Unit already has an active tenancy", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn create_tenancy(
    State(state): State<AppState>,
    Json(request): Json<CreateTenancyRequest>,
) -> Result<(StatusCode, Json<ApiResponse<TenancyResponse>>), (StatusCode, Json<ErrorResponse>)> {
    debug!(
        "Assigning tenant {} to unit {} from {}",
        request.tenant_id, request.unit_id, request.move_in_date
    );

    let input = AssignTenant {
        unit_id: request.unit_id,
        tenant_id: request.tenant_id,
        move_in_date: request.move_in_date,
        monthly_rent: request.monthly_rent,
        deposit_amount: request.deposit_amount.unwrap_or(Decimal::ZERO),
    };

    match assign_tenant(&state.db, input).await {
        Ok(tenancy_model) => {
            let response = ApiResponse {
                data: TenancyResponse::from(tenancy_model),
                message: "Tenant assigned successfully".to_string(),
                success: true,
            };
            Ok((StatusCode::CREATED, Json(response)))
        }
        Err(err) => {
            warn!("Tenant assignment failed: {}", err);
            Err(workflow_error(err))
        }
    }
}

/// End a tenancy
#[utoipa::path(
    post,
    path = "/api/v1/tenancies/{tenancy_id}/end",
    tag = "tenancies",
    params(
        ("tenancy_id" = i32, Path, description = "Tenancy ID"),
    ),
    responses(
        (status = 200, description = "Tenancy ended successfully", body = ApiResponse<TenancyResponse>),
        (status = 404, description = "Tenancy not found", body = ErrorResponse),
        (status = 409, description = "Tenancy already ended", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn end_tenancy(
    Path(tenancy_id): Path<i32>,
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<TenancyResponse>>, (StatusCode, Json<ErrorResponse>)> {
    match end_tenancy_workflow(&state.db, tenancy_id).await {
        Ok(tenancy_model) => {
            let response = ApiResponse {
                data: TenancyResponse::from(tenancy_model),
                message: "Tenancy ended successfully".to_string(),
                success: true,
            };
            Ok(Json(response))
        }
        Err(err) => {
            warn!("Ending tenancy {} failed: {}", tenancy_id, err);
            Err(workflow_error(err))
        }
    }
}

/// Get all tenancies with optional filters and pagination
#[utoipa::path(
    get,
    path = "/api/v1/tenancies",
    tag = "tenancies",
    params(TenancyListQuery),
    responses(
        (status = 200, description = "Tenancies retrieved successfully", body = ApiResponse<Vec<TenancyResponse>>),
        (status = 400, description = "Invalid query parameters", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn get_tenancies(
    State(state): State<AppState>,
    Valid(Query(query)): Valid<Query<TenancyListQuery>>,
) -> Result<Json<ApiResponse<Vec<TenancyResponse>>>, (StatusCode, Json<ErrorResponse>)> {
    let page = query.page.unwrap_or(1);
    let limit = query.limit.unwrap_or(50);

    let mut finder = tenancy::Entity::find().order_by_desc(tenancy::Column::MoveInDate);
    if let Some(unit_id) = query.unit_id {
        finder = finder.filter(tenancy::Column::UnitId.eq(unit_id));
    }
    if let Some(property_id) = query.property_id {
        finder = finder.filter(tenancy::Column::PropertyId.eq(property_id));
    }
    if let Some(status) = &query.status {
        let parsed = parse_tenancy_status(status).map_err(|message| {
            (
                StatusCode::BAD_REQUEST,
                Json(ErrorResponse {
                    error: message,
                    code: "INVALID_STATUS".to_string(),
                    success: false,
                }),
            )
        })?;
        finder = finder.filter(tenancy::Column::Status.eq(parsed));
    }

    match finder.paginate(&state.db, limit).fetch_page(page - 1).await {
        Ok(tenancies) => {
            debug!("Retrieved {} tenancies (page {})", tenancies.len(), page);
            let response = ApiResponse {
                data: tenancies.into_iter().map(TenancyResponse::from).collect(),
                message: "Tenancies retrieved successfully".to_string(),
                success: true,
            };
            Ok(Json(response))
        }
        Err(db_error) => {
            error!("Failed to retrieve tenancies: {}", db_error);
            Err(database_error())
        }
    }
}

/// Get a specific tenancy by ID
#[utoipa::path(
    get,
    path = "/api/v1/tenancies/{tenancy_id}",
    tag = "tenancies",
    params(
        ("tenancy_id" = i32, Path, description = "Tenancy ID"),
    ),
    responses(
        (status = 200, description = "Tenancy retrieved successfully", body = ApiResponse<TenancyResponse>),
        (status = 404, description = "Tenancy not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn get_tenancy(
    Path(tenancy_id): Path<i32>,
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<TenancyResponse>>, (StatusCode, Json<ErrorResponse>)> {
    let tenancy_model = find_tenancy(&state, tenancy_id).await?;

    let response = ApiResponse {
        data: TenancyResponse::from(tenancy_model),
        message: "Tenancy retrieved successfully".to_string(),
        success: true,
    };
    Ok(Json(response))
}

/// Update a tenancy's agreed terms
#[utoipa::path(
    put,
    path = "/api/v1/tenancies/{tenancy_id}",
    tag = "tenancies",
    params(
        ("tenancy_id" = i32, Path, description = "Tenancy ID"),
    ),
    request_body = UpdateTenancyRequest,
    responses(
        (status = 200, description = "Tenancy updated successfully", body = ApiResponse<TenancyResponse>),
        (status = 400, description = "Invalid request", body = ErrorResponse),
        (status = 404, description = "Tenancy not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn update_tenancy(
    Path(tenancy_id): Path<i32>,
    State(state): State<AppState>,
    Json(request): Json<UpdateTenancyRequest>,
) -> Result<Json<ApiResponse<TenancyResponse>>, (StatusCode, Json<ErrorResponse>)> {
    if let Some(monthly_rent) = request.monthly_rent {
        if monthly_rent < Decimal::ONE {
            return Err((
                StatusCode::BAD_REQUEST,
                Json(ErrorResponse {
                    error: format!("Monthly rent must be at least 1, got {}", monthly_rent),
                    code: "INVALID_MONTHLY_RENT".to_string(),
                    success: false,
                }),
            ));
        }
    }
    if let Some(deposit_amount) = request.deposit_amount {
        if deposit_amount < Decimal::ZERO {
            return Err((
                StatusCode::BAD_REQUEST,
                Json(ErrorResponse {
                    error: format!("Deposit amount must not be negative, got {}", deposit_amount),
                    code: "INVALID_DEPOSIT_AMOUNT".to_string(),
                    success: false,
                }),
            ));
        }
    }

    let existing = find_tenancy(&state, tenancy_id).await?;

    let mut tenancy_active: tenancy::ActiveModel = existing.into();
    if let Some(move_in_date) = request.move_in_date {
        tenancy_active.move_in_date = Set(move_in_date);
    }
    if let Some(monthly_rent) = request.monthly_rent {
        tenancy_active.monthly_rent = Set(monthly_rent);
    }
    if let Some(deposit_amount) = request.deposit_amount {
        tenancy_active.deposit_amount = Set(deposit_amount);
    }

    match tenancy_active.update(&state.db).await {
        Ok(updated) => {
            info!("Tenancy {} updated", tenancy_id);
            let response = ApiResponse {
                data: TenancyResponse::from(updated),
                message: "Tenancy updated successfully".to_string(),
                success: true,
            };
            Ok(Json(response))
        }
        Err(db_error) => {
            error!("Failed to update tenancy {}: {}", tenancy_id, db_error);
            Err(database_error())
        }
    }
}

/// Delete a tenancy record
#[utoipa::path(
    delete,
    path = "/api/v1/tenancies/{tenancy_id}",
    tag = "tenancies",
    params(
        ("tenancy_id" = i32, Path, description = "Tenancy ID"),
    ),
    responses(
        (status = 200, description = "Tenancy deleted successfully", body = ApiResponse<String>),
        (status = 404, description = "Tenancy not found", body = ErrorResponse),
        (status = 409, description = "Tenancy is still active", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn delete_tenancy(
    Path(tenancy_id): Path<i32>,
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<String>>, (StatusCode, Json<ErrorResponse>)> {
    let existing = find_tenancy(&state, tenancy_id).await?;

    // Active tenancies are ended, not erased; the record keeps the unit
    // status and the cached counts honest
    if existing.status == tenancy::TenancyStatus::Active {
        warn!("Refused to delete active tenancy {}", tenancy_id);
        return Err((
            StatusCode::CONFLICT,
            Json(ErrorResponse {
                error: format!("Tenancy {} is still active; end it first", tenancy_id),
                code: "TENANCY_ACTIVE".to_string(),
                success: false,
            }),
        ));
    }

    match tenancy::Entity::delete_by_id(tenancy_id).exec(&state.db).await {
        Ok(delete_result) => {
            if delete_result.rows_affected > 0 {
                info!("Tenancy {} deleted", tenancy_id);
                let response = ApiResponse {
                    data: format!("Tenancy {} deleted", tenancy_id),
                    message: "Tenancy deleted successfully".to_string(),
                    success: true,
                };
                Ok(Json(response))
            } else {
                Err(tenancy_not_found(tenancy_id))
            }
        }
        Err(db_error) => {
            error!("Failed to delete tenancy {}: {}", tenancy_id, db_error);
            Err(database_error())
        }
    }
}

/// Get the active tenancies of a property
#[utoipa::path(
    get,
    path = "/api/v1/properties/{property_id}/tenancies",
    tag = "tenancies",
    params(
        ("property_id" = i32, Path, description = "Property ID"),
    ),
    responses(
        (status = 200, description = "Tenancies retrieved successfully", body = ApiResponse<Vec<TenancyResponse>>),
        (status = 404, description = "Property not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn get_property_tenancies(
    Path(property_id): Path<i32>,
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<Vec<TenancyResponse>>>, (StatusCode, Json<ErrorResponse>)> {
    find_property(&state, property_id).await?;

    list_active_tenancies(&state, tenancy::Column::PropertyId, property_id).await
}

/// Get the active tenancies of a unit
#[utoipa::path(
    get,
    path = "/api/v1/units/{unit_id}/tenancies",
    tag = "tenancies",
    params(
        ("unit_id" = i32, Path, description = "Unit ID"),
    ),
    responses(
        (status = 200, description = "Tenancies retrieved successfully", body = ApiResponse<Vec<TenancyResponse>>),
        (status = 404, description = "Unit not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn get_unit_tenancies(
    Path(unit_id): Path<i32>,
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<Vec<TenancyResponse>>>, (StatusCode, Json<ErrorResponse>)> {
    find_unit(&state, unit_id).await?;

    list_active_tenancies(&state, tenancy::Column::UnitId, unit_id).await
}

async fn list_active_tenancies(
    state: &AppState,
    column: tenancy::Column,
    id: i32,
) -> Result<Json<ApiResponse<Vec<TenancyResponse>>>, (StatusCode, Json<ErrorResponse>)> {
    match tenancy::Entity::find()
        .filter(column.eq(id))
        .filter(tenancy::Column::Status.eq(tenancy::TenancyStatus::Active))
        .order_by_desc(tenancy::Column::MoveInDate)
        .all(&state.db)
        .await
    {
        Ok(tenancies) => {
            let response = ApiResponse {
                data: tenancies.into_iter().map(TenancyResponse::from).collect(),
                message: "Tenancies retrieved successfully".to_string(),
                success: true,
            };
            Ok(Json(response))
        }
        Err(db_error) => {
            error!("Failed to retrieve tenancies: {}", db_error);
            Err(database_error())
        }
    }
}

async fn find_tenancy(
    state: &AppState,
    tenancy_id: i32,
) -> Result<tenancy::Model, (StatusCode, Json<ErrorResponse>)> {
    match tenancy::Entity::find_by_id(tenancy_id).one(&state.db).await {
        Ok(Some(tenancy_model)) => Ok(tenancy_model),
        Ok(None) => {
            warn!("Tenancy with ID {} not found", tenancy_id);
            Err(tenancy_not_found(tenancy_id))
        }
        Err(db_error) => {
            error!("Failed to retrieve tenancy {}: {}", tenancy_id, db_error);
            Err(database_error())
        }
    }
}
