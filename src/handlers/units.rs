use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::Json,
};
use model::entities::{tenancy, unit};
use rust_decimal::Decimal;
use sea_orm::{
    ActiveEnum, ActiveModelTrait, ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, Set,
};
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info, instrument, warn};
use utoipa::ToSchema;

use crate::handlers::database_error;
use crate::handlers::properties::find_property;
use crate::schemas::{ApiResponse, AppState, ErrorResponse};

/// Request body for creating a new unit under a property
#[derive(Debug, Deserialize, Serialize, ToSchema)]
pub struct CreateUnitRequest {
    /// Door number or label, unique within the property
    pub unit_number: String,
    /// Unit category ("bedsitter", "1BR", "2BR", "3BR", "4BR", "shop", "office", "warehouse")
    pub unit_type: String,
    /// Asking rent for the unit
    pub monthly_rent: Decimal,
    /// Security deposit (default: 0)
    pub deposit_amount: Option<Decimal>,
    /// Number of bedrooms (default: 0)
    pub bedrooms: Option<i32>,
    /// Number of bathrooms (default: 0)
    pub bathrooms: Option<i32>,
}

/// Request body for updating a unit
#[derive(Debug, Deserialize, Serialize, ToSchema)]
pub struct UpdateUnitRequest {
    /// Unit category
    pub unit_type: Option<String>,
    /// Asking rent for the unit
    pub monthly_rent: Option<Decimal>,
    /// Security deposit
    pub deposit_amount: Option<Decimal>,
    /// Number of bedrooms
    pub bedrooms: Option<i32>,
    /// Number of bathrooms
    pub bathrooms: Option<i32>,
    /// Unit status; only "vacant" and "maintenance" may be set here.
    /// "occupied" is owned by the tenancy workflow.
    pub status: Option<String>,
}

/// Unit response model
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct UnitResponse {
    pub id: i32,
    pub property_id: i32,
    pub unit_number: String,
    pub unit_type: String,
    pub monthly_rent: Decimal,
    pub deposit_amount: Decimal,
    pub bedrooms: i32,
    pub bathrooms: i32,
    pub status: String,
}

impl From<unit::Model> for UnitResponse {
    fn from(model: unit::Model) -> Self {
        Self {
            id: model.id,
            property_id: model.property_id,
            unit_number: model.unit_number,
            unit_type: model.unit_type.to_value(),
            monthly_rent: model.monthly_rent,
            deposit_amount: model.deposit_amount,
            bedrooms: model.bedrooms,
            bathrooms: model.bathrooms,
            status: model.status.to_value(),
        }
    }
}

// Helper function to parse a unit type string to UnitType
fn parse_unit_type(unit_type: &str) -> Result<unit::UnitType, String> {
    match unit_type {
        "bedsitter" => Ok(unit::UnitType::Bedsitter),
        "1BR" => Ok(unit::UnitType::OneBedroom),
        "2BR" => Ok(unit::UnitType::TwoBedroom),
        "3BR" => Ok(unit::UnitType::ThreeBedroom),
        "4BR" => Ok(unit::UnitType::FourBedroom),
        "shop" => Ok(unit::UnitType::Shop),
        "office" => Ok(unit::UnitType::Office),
        "warehouse" => Ok(unit::UnitType::Warehouse),
        _ => Err(format!("Invalid unit type: {}", unit_type)),
    }
}

fn validation_error(message: String, code: &str) -> (StatusCode, Json<ErrorResponse>) {
    (
        StatusCode::BAD_REQUEST,
        Json(ErrorResponse {
            error: message,
            code: code.to_string(),
            success: false,
        }),
    )
}

fn unit_not_found(unit_id: i32) -> (StatusCode, Json<ErrorResponse>) {
    (
        StatusCode::NOT_FOUND,
        Json(ErrorResponse {
            error: format!("Unit with id {} does not exist", unit_id),
            code: "UNIT_NOT_FOUND".to_string(),
            success: false,
        }),
    )
}

/// Create a new unit under a property
#[utoipa::path(
    post,
    path = "/api/v1/properties/{property_id}/units",
    tag = "units",
    params(
        ("property_id" = i32, Path, description = "Owning property ID"),
    ),
    request_body = CreateUnitRequest,
    responses(
        (status = 201, description = "Unit created successfully", body = ApiResponse<UnitResponse>),
        (status = 400, description = "Invalid request", body = ErrorResponse),
        (status = 404, description = "Property not found", body = ErrorResponse),
        (status = 409, description = "Duplicate unit number or property at capacity", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn create_unit(
    Path(property_id): Path<i32>,
    State(state): State<AppState>,
    Json(request): Json<CreateUnitRequest>,
) -> Result<(StatusCode, Json<ApiResponse<UnitResponse>>), (StatusCode, Json<ErrorResponse>)> {
    debug!("Creating unit {} under property {}", request.unit_number, property_id);

    // Validation happens before any write is attempted
    if request.unit_number.trim().is_empty() {
        return Err(validation_error(
            "Unit number is required".to_string(),
            "INVALID_UNIT_NUMBER",
        ));
    }
    let unit_type = parse_unit_type(&request.unit_type)
        .map_err(|message| validation_error(message, "INVALID_UNIT_TYPE"))?;
    if request.monthly_rent < Decimal::ZERO {
        return Err(validation_error(
            format!("Monthly rent must not be negative, got {}", request.monthly_rent),
            "INVALID_MONTHLY_RENT",
        ));
    }
    let deposit_amount = request.deposit_amount.unwrap_or(Decimal::ZERO);
    if deposit_amount < Decimal::ZERO {
        return Err(validation_error(
            format!("Deposit amount must not be negative, got {}", deposit_amount),
            "INVALID_DEPOSIT_AMOUNT",
        ));
    }
    let bedrooms = request.bedrooms.unwrap_or(0);
    let bathrooms = request.bathrooms.unwrap_or(0);
    if bedrooms < 0 || bathrooms < 0 {
        return Err(validation_error(
            "Bedroom and bathroom counts must not be negative".to_string(),
            "INVALID_ROOM_COUNT",
        ));
    }

    let property_model = find_property(&state, property_id).await?;

    // The declared capacity bounds how many units can exist, which keeps
    // occupied_units <= total_units enforceable
    let unit_count = unit::Entity::find()
        .filter(unit::Column::PropertyId.eq(property_id))
        .count(&state.db)
        .await
        .map_err(|db_error| {
            error!("Failed to count units for property {}: {}", property_id, db_error);
            database_error()
        })?;
    if unit_count >= property_model.total_units as u64 {
        warn!(
            "Property {} is at its declared capacity of {} units",
            property_id, property_model.total_units
        );
        return Err((
            StatusCode::CONFLICT,
            Json(ErrorResponse {
                error: format!(
                    "Property {} already has its declared {} units",
                    property_id, property_model.total_units
                ),
                code: "UNIT_LIMIT_REACHED".to_string(),
                success: false,
            }),
        ));
    }

    let duplicate = unit::Entity::find()
        .filter(unit::Column::PropertyId.eq(property_id))
        .filter(unit::Column::UnitNumber.eq(request.unit_number.clone()))
        .count(&state.db)
        .await
        .map_err(|db_error| {
            error!("Failed to check unit number uniqueness: {}", db_error);
            database_error()
        })?;
    if duplicate > 0 {
        return Err((
            StatusCode::CONFLICT,
            Json(ErrorResponse {
                error: format!(
                    "Property {} already has a unit numbered {}",
                    property_id, request.unit_number
                ),
                code: "DUPLICATE_UNIT_NUMBER".to_string(),
                success: false,
            }),
        ));
    }

    let new_unit = unit::ActiveModel {
        property_id: Set(property_id),
        unit_number: Set(request.unit_number),
        unit_type: Set(unit_type),
        monthly_rent: Set(request.monthly_rent),
        deposit_amount: Set(deposit_amount),
        bedrooms: Set(bedrooms),
        bathrooms: Set(bathrooms),
        status: Set(unit::UnitStatus::Vacant),
        ..Default::default()
    };

    match new_unit.insert(&state.db).await {
        Ok(unit_model) => {
            info!("Unit created with ID: {}", unit_model.id);
            let response = ApiResponse {
                data: UnitResponse::from(unit_model),
                message: "Unit created successfully".to_string(),
                success: true,
            };
            Ok((StatusCode::CREATED, Json(response)))
        }
        Err(db_error) => {
            error!("Failed to create unit: {}", db_error);
            Err(database_error())
        }
    }
}

/// Get all units of a property
#[utoipa::path(
    get,
    path = "/api/v1/properties/{property_id}/units",
    tag = "units",
    params(
        ("property_id" = i32, Path, description = "Owning property ID"),
    ),
    responses(
        (status = 200, description = "Units retrieved successfully", body = ApiResponse<Vec<UnitResponse>>),
        (status = 404, description = "Property not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn get_property_units(
    Path(property_id): Path<i32>,
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<Vec<UnitResponse>>>, (StatusCode, Json<ErrorResponse>)> {
    find_property(&state, property_id).await?;

    match unit::Entity::find()
        .filter(unit::Column::PropertyId.eq(property_id))
        .order_by_asc(unit::Column::UnitNumber)
        .all(&state.db)
        .await
    {
        Ok(units) => {
            debug!("Retrieved {} units for property {}", units.len(), property_id);
            let response = ApiResponse {
                data: units.into_iter().map(UnitResponse::from).collect(),
                message: "Units retrieved successfully".to_string(),
                success: true,
            };
            Ok(Json(response))
        }
        Err(db_error) => {
            error!("Failed to retrieve units for property {}: {}", property_id, db_error);
            Err(database_error())
        }
    }
}

/// Get a specific unit by ID
#[utoipa::path(
    get,
    path = "/api/v1/units/{unit_id}",
    tag = "units",
    params(
        ("unit_id" = i32, Path, description = "Unit ID"),
    ),
    responses(
        (status = 200, description = "Unit retrieved successfully", body = ApiResponse<UnitResponse>),
        (status = 404, description = "Unit not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn get_unit(
    Path(unit_id): Path<i32>,
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<UnitResponse>>, (StatusCode, Json<ErrorResponse>)> {
    let unit_model = find_unit(&state, unit_id).await?;

    let response = ApiResponse {
        data: UnitResponse::from(unit_model),
        message: "Unit retrieved successfully".to_string(),
        success: true,
    };
    Ok(Json(response))
}

/// Update a unit
#[utoipa::path(
    put,
    path = "/api/v1/units/{unit_id}",
    tag = "units",
    params(
        ("unit_id" = i32, Path, description = "Unit ID"),
    ),
    request_body = UpdateUnitRequest,
    responses(
        (status = 200, description = "Unit updated successfully", body = ApiResponse<UnitResponse>),
        (status = 400, description = "Invalid request", body = ErrorResponse),
        (status = 404, description = "Unit not found", body = ErrorResponse),
        (status = 409, description = "Unit has an active tenancy", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn update_unit(
    Path(unit_id): Path<i32>,
    State(state): State<AppState>,
    Json(request): Json<UpdateUnitRequest>,
) -> Result<Json<ApiResponse<UnitResponse>>, (StatusCode, Json<ErrorResponse>)> {
    let existing = find_unit(&state, unit_id).await?;

    let mut unit_active: unit::ActiveModel = existing.into();

    if let Some(unit_type) = request.unit_type {
        let parsed = parse_unit_type(&unit_type)
            .map_err(|message| validation_error(message, "INVALID_UNIT_TYPE"))?;
        unit_active.unit_type = Set(parsed);
    }
    if let Some(monthly_rent) = request.monthly_rent {
        if monthly_rent < Decimal::ZERO {
            return Err(validation_error(
                format!("Monthly rent must not be negative, got {}", monthly_rent),
                "INVALID_MONTHLY_RENT",
            ));
        }
        unit_active.monthly_rent = Set(monthly_rent);
    }
    if let Some(deposit_amount) = request.deposit_amount {
        if deposit_amount < Decimal::ZERO {
            return Err(validation_error(
                format!("Deposit amount must not be negative, got {}", deposit_amount),
                "INVALID_DEPOSIT_AMOUNT",
            ));
        }
        unit_active.deposit_amount = Set(deposit_amount);
    }
    if let Some(bedrooms) = request.bedrooms {
        if bedrooms < 0 {
            return Err(validation_error(
                "Bedroom count must not be negative".to_string(),
                "INVALID_ROOM_COUNT",
            ));
        }
        unit_active.bedrooms = Set(bedrooms);
    }
    if let Some(bathrooms) = request.bathrooms {
        if bathrooms < 0 {
            return Err(validation_error(
                "Bathroom count must not be negative".to_string(),
                "INVALID_ROOM_COUNT",
            ));
        }
        unit_active.bathrooms = Set(bathrooms);
    }
    if let Some(status) = request.status {
        // Occupancy transitions belong to the tenancy workflow; landlords
        // can only park a unit in maintenance or bring it back
        let parsed = match status.as_str() {
            "vacant" => unit::UnitStatus::Vacant,
            "maintenance" => unit::UnitStatus::Maintenance,
            other => {
                return Err(validation_error(
                    format!("Unit status cannot be set to '{}' directly", other),
                    "INVALID_STATUS",
                ));
            }
        };

        let active_tenancies = count_active_tenancies(&state, unit_id).await?;
        if active_tenancies > 0 {
            return Err((
                StatusCode::CONFLICT,
                Json(ErrorResponse {
                    error: format!("Unit {} has an active tenancy; end it first", unit_id),
                    code: "UNIT_HAS_ACTIVE_TENANCY".to_string(),
                    success: false,
                }),
            ));
        }
        unit_active.status = Set(parsed);
    }

    match unit_active.update(&state.db).await {
        Ok(updated) => {
            info!("Unit {} updated", unit_id);
            let response = ApiResponse {
                data: UnitResponse::from(updated),
                message: "Unit updated successfully".to_string(),
                success: true,
            };
            Ok(Json(response))
        }
        Err(db_error) => {
            error!("Failed to update unit {}: {}", unit_id, db_error);
            Err(database_error())
        }
    }
}

/// Delete a unit
#[utoipa::path(
    delete,
    path = "/api/v1/units/{unit_id}",
    tag = "units",
    params(
        ("unit_id" = i32, Path, description = "Unit ID"),
    ),
    responses(
        (status = 200, description = "Unit deleted successfully", body = ApiResponse<String>),
        (status = 404, description = "Unit not found", body = ErrorResponse),
        (status = 409, description = "Unit has an active tenancy", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn delete_unit(
    Path(unit_id): Path<i32>,
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<String>>, (StatusCode, Json<ErrorResponse>)> {
    let active_tenancies = count_active_tenancies(&state, unit_id).await?;
    if active_tenancies > 0 {
        warn!("Refused to delete unit {} with an active tenancy", unit_id);
        return Err((
            StatusCode::CONFLICT,
            Json(ErrorResponse {
                error: format!("Unit {} has an active tenancy and cannot be deleted", unit_id),
                code: "UNIT_HAS_ACTIVE_TENANCY".to_string(),
                success: false,
            }),
        ));
    }

    match unit::Entity::delete_by_id(unit_id).exec(&state.db).await {
        Ok(delete_result) => {
            if delete_result.rows_affected > 0 {
                info!("Unit {} deleted", unit_id);
                let response = ApiResponse {
                    data: format!("Unit {} deleted", unit_id),
                    message: "Unit deleted successfully".to_string(),
                    success: true,
                };
                Ok(Json(response))
            } else {
                warn!("Unit {} not found for deletion", unit_id);
                Err(unit_not_found(unit_id))
            }
        }
        Err(db_error) => {
            error!("Failed to delete unit {}: {}", unit_id, db_error);
            Err(database_error())
        }
    }
}

/// Look a unit up or produce the standard 404/500 error pair.
pub(crate) async fn find_unit(
    state: &AppState,
    unit_id: i32,
) -> Result<unit::Model, (StatusCode, Json<ErrorResponse>)> {
    match unit::Entity::find_by_id(unit_id).one(&state.db).await {
        Ok(Some(unit_model)) => Ok(unit_model),
        Ok(None) => {
            warn!("Unit with ID {} not found", unit_id);
            Err(unit_not_found(unit_id))
        }
        Err(db_error) => {
            error!("Failed to retrieve unit {}: {}", unit_id, db_error);
            Err(database_error())
        }
    }
}

async fn count_active_tenancies(
    state: &AppState,
    unit_id: i32,
) -> Result<u64, (StatusCode, Json<ErrorResponse>)> {
    tenancy::Entity::find()
        .filter(tenancy::Column::UnitId.eq(unit_id))
        .filter(tenancy::Column::Status.eq(tenancy::TenancyStatus::Active))
        .count(&state.db)
        .await
        .map_err(|db_error| {
            error!("Failed to count tenancies for unit {}: {}", unit_id, db_error);
            database_error()
        })
}
