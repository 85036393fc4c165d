use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::Json,
};
use common::PropertyOccupancy;
use model::entities::{property, tenancy, unit, user};
use sea_orm::{
    ActiveEnum, ActiveModelTrait, ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, Set,
};
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info, instrument, warn};
use utoipa::{IntoParams, ToSchema};

use crate::handlers::database_error;
use crate::schemas::{ApiResponse, AppState, ErrorResponse};

/// Request body for creating a new property
#[derive(Debug, Deserialize, Serialize, ToSchema)]
pub struct CreatePropertyRequest {
    /// Property name
    pub name: String,
    /// Physical location, e.g. "Kilimani, Nairobi"
    pub location: String,
    /// Land registry identifier, unique per landlord
    pub plot_id: String,
    /// Owning landlord user ID
    pub landlord_id: i32,
    /// Declared number of rentable units (must be at least 1)
    pub total_units: i32,
}

/// Request body for updating a property
#[derive(Debug, Deserialize, Serialize, ToSchema)]
pub struct UpdatePropertyRequest {
    /// Property name
    pub name: Option<String>,
    /// Physical location
    pub location: Option<String>,
    /// Declared number of rentable units
    pub total_units: Option<i32>,
    /// Property status ("active" or "inactive")
    pub status: Option<String>,
}

/// Query parameters for listing properties
#[derive(Debug, Deserialize, IntoParams)]
pub struct PropertyListQuery {
    /// Restrict the listing to one landlord's properties
    pub landlord_id: Option<i32>,
}

/// Property response model
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct PropertyResponse {
    pub id: i32,
    pub name: String,
    pub location: String,
    pub plot_id: String,
    pub landlord_id: i32,
    pub total_units: i32,
    pub occupied_units: i32,
    pub status: String,
}

impl From<property::Model> for PropertyResponse {
    fn from(model: property::Model) -> Self {
        Self {
            id: model.id,
            name: model.name,
            location: model.location,
            plot_id: model.plot_id,
            landlord_id: model.landlord_id,
            total_units: model.total_units,
            occupied_units: model.occupied_units,
            status: model.status.to_value(),
        }
    }
}

// Helper function to parse a status string to PropertyStatus
fn parse_property_status(status: &str) -> Result<property::PropertyStatus, String> {
    match status {
        "active" => Ok(property::PropertyStatus::Active),
        "inactive" => Ok(property::PropertyStatus::Inactive),
        _ => Err(format!("Invalid property status: {}", status)),
    }
}

/// Create a new property
#[utoipa::path(
    post,
    path = "/api/v1/properties",
    tag = "properties",
    request_body = CreatePropertyRequest,
    responses(
        (status = 201, description = "Property created successfully", body = ApiResponse<PropertyResponse>),
        (status = 400, description = "Invalid request", body = ErrorResponse),
        (status = 409, description = "Duplicate plot id", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn create_property(
    State(state): State<AppState>,
    Json(request): Json<CreatePropertyRequest>,
) -> Result<(StatusCode, Json<ApiResponse<PropertyResponse>>), (StatusCode, Json<ErrorResponse>)> {
    debug!("Creating property '{}' on plot {}", request.name, request.plot_id);

    // Validation happens before any write is attempted
    if request.total_units < 1 {
        warn!("Rejected property with total_units = {}", request.total_units);
        return Err((
            StatusCode::BAD_REQUEST,
            Json(ErrorResponse {
                error: format!("A property must have at least 1 unit, got {}", request.total_units),
                code: "INVALID_TOTAL_UNITS".to_string(),
                success: false,
            }),
        ));
    }

    // Validate that the landlord exists and is actually a landlord
    match user::Entity::find_by_id(request.landlord_id).one(&state.db).await {
        Ok(Some(owner)) if owner.user_type == user::UserType::Landlord => {}
        Ok(Some(_)) => {
            return Err((
                StatusCode::BAD_REQUEST,
                Json(ErrorResponse {
                    error: format!("User with id {} is not a landlord", request.landlord_id),
                    code: "INVALID_LANDLORD_ID".to_string(),
                    success: false,
                }),
            ));
        }
        Ok(None) => {
            return Err((
                StatusCode::BAD_REQUEST,
                Json(ErrorResponse {
                    error: format!("Landlord with id {} does not exist", request.landlord_id),
                    code: "INVALID_LANDLORD_ID".to_string(),
                    success: false,
                }),
            ));
        }
        Err(db_error) => {
            error!("Failed to look up landlord {}: {}", request.landlord_id, db_error);
            return Err(database_error());
        }
    }

    // A plot id identifies a property uniquely per landlord; the unique
    // index backs this check up at the store layer
    let duplicate = property::Entity::find()
        .filter(property::Column::LandlordId.eq(request.landlord_id))
        .filter(property::Column::PlotId.eq(request.plot_id.clone()))
        .count(&state.db)
        .await
        .map_err(|db_error| {
            error!("Failed to check plot uniqueness: {}", db_error);
            database_error()
        })?;
    if duplicate > 0 {
        return Err((
            StatusCode::CONFLICT,
            Json(ErrorResponse {
                error: format!(
                    "Landlord {} already has a property on plot {}",
                    request.landlord_id, request.plot_id
                ),
                code: "DUPLICATE_PLOT_ID".to_string(),
                success: false,
            }),
        ));
    }

    let new_property = property::ActiveModel {
        name: Set(request.name),
        location: Set(request.location),
        plot_id: Set(request.plot_id),
        landlord_id: Set(request.landlord_id),
        total_units: Set(request.total_units),
        occupied_units: Set(0),
        status: Set(property::PropertyStatus::Active),
        ..Default::default()
    };

    match new_property.insert(&state.db).await {
        Ok(property_model) => {
            info!("Property created with ID: {}", property_model.id);
            let response = ApiResponse {
                data: PropertyResponse::from(property_model),
                message: "Property created successfully".to_string(),
                success: true,
            };
            Ok((StatusCode::CREATED, Json(response)))
        }
        Err(db_error) => {
            error!("Failed to create property: {}", db_error);
            Err(database_error())
        }
    }
}

/// Get all properties
#[utoipa::path(
    get,
    path = "/api/v1/properties",
    tag = "properties",
    params(PropertyListQuery),
    responses(
        (status = 200, description = "Properties retrieved successfully", body = ApiResponse<Vec<PropertyResponse>>),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn get_properties(
    Query(query): Query<PropertyListQuery>,
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<Vec<PropertyResponse>>>, (StatusCode, Json<ErrorResponse>)> {
    let mut finder = property::Entity::find().order_by_desc(property::Column::Id);
    if let Some(landlord_id) = query.landlord_id {
        finder = finder.filter(property::Column::LandlordId.eq(landlord_id));
    }

    match finder.all(&state.db).await {
        Ok(properties) => {
            debug!("Retrieved {} properties", properties.len());
            let response = ApiResponse {
                data: properties.into_iter().map(PropertyResponse::from).collect(),
                message: "Properties retrieved successfully".to_string(),
                success: true,
            };
            Ok(Json(response))
        }
        Err(db_error) => {
            error!("Failed to retrieve properties: {}", db_error);
            Err(database_error())
        }
    }
}

/// Get a specific property by ID
#[utoipa::path(
    get,
    path = "/api/v1/properties/{property_id}",
    tag = "properties",
    params(
        ("property_id" = i32, Path, description = "Property ID"),
    ),
    responses(
        (status = 200, description = "Property retrieved successfully", body = ApiResponse<PropertyResponse>),
        (status = 404, description = "Property not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn get_property(
    Path(property_id): Path<i32>,
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<PropertyResponse>>, (StatusCode, Json<ErrorResponse>)> {
    let property_model = find_property(&state, property_id).await?;

    let response = ApiResponse {
        data: PropertyResponse::from(property_model),
        message: "Property retrieved successfully".to_string(),
        success: true,
    };
    Ok(Json(response))
}

/// Update a property
#[utoipa::path(
    put,
    path = "/api/v1/properties/{property_id}",
    tag = "properties",
    params(
        ("property_id" = i32, Path, description = "Property ID"),
    ),
    request_body = UpdatePropertyRequest,
    responses(
        (status = 200, description = "Property updated successfully", body = ApiResponse<PropertyResponse>),
        (status = 400, description = "Invalid request", body = ErrorResponse),
        (status = 404, description = "Property not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn update_property(
    Path(property_id): Path<i32>,
    State(state): State<AppState>,
    Json(request): Json<UpdatePropertyRequest>,
) -> Result<Json<ApiResponse<PropertyResponse>>, (StatusCode, Json<ErrorResponse>)> {
    let existing = find_property(&state, property_id).await?;

    if let Some(total_units) = request.total_units {
        if total_units < 1 {
            return Err((
                StatusCode::BAD_REQUEST,
                Json(ErrorResponse {
                    error: format!("A property must have at least 1 unit, got {}", total_units),
                    code: "INVALID_TOTAL_UNITS".to_string(),
                    success: false,
                }),
            ));
        }

        // Shrinking below the units that already exist would break the
        // occupied_units <= total_units invariant
        let unit_count = unit::Entity::find()
            .filter(unit::Column::PropertyId.eq(property_id))
            .count(&state.db)
            .await
            .map_err(|db_error| {
                error!("Failed to count units for property {}: {}", property_id, db_error);
                database_error()
            })?;
        if (total_units as u64) < unit_count {
            return Err((
                StatusCode::BAD_REQUEST,
                Json(ErrorResponse {
                    error: format!(
                        "Property {} already has {} units; total_units cannot be {}",
                        property_id, unit_count, total_units
                    ),
                    code: "INVALID_TOTAL_UNITS".to_string(),
                    success: false,
                }),
            ));
        }
    }

    let mut property_active: property::ActiveModel = existing.into();
    if let Some(name) = request.name {
        property_active.name = Set(name);
    }
    if let Some(location) = request.location {
        property_active.location = Set(location);
    }
    if let Some(total_units) = request.total_units {
        property_active.total_units = Set(total_units);
    }
    if let Some(status) = request.status {
        match parse_property_status(&status) {
            Ok(parsed) => property_active.status = Set(parsed),
            Err(message) => {
                warn!("Rejected property update: {}", message);
                return Err((
                    StatusCode::BAD_REQUEST,
                    Json(ErrorResponse {
                        error: message,
                        code: "INVALID_STATUS".to_string(),
                        success: false,
                    }),
                ));
            }
        }
    }

    match property_active.update(&state.db).await {
        Ok(updated) => {
            info!("Property {} updated", property_id);
            let response = ApiResponse {
                data: PropertyResponse::from(updated),
                message: "Property updated successfully".to_string(),
                success: true,
            };
            Ok(Json(response))
        }
        Err(db_error) => {
            error!("Failed to update property {}: {}", property_id, db_error);
            Err(database_error())
        }
    }
}

/// Delete a property
#[utoipa::path(
    delete,
    path = "/api/v1/properties/{property_id}",
    tag = "properties",
    params(
        ("property_id" = i32, Path, description = "Property ID"),
    ),
    responses(
        (status = 200, description = "Property deleted successfully", body = ApiResponse<String>),
        (status = 404, description = "Property not found", body = ErrorResponse),
        (status = 409, description = "Property still has active tenancies", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn delete_property(
    Path(property_id): Path<i32>,
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<String>>, (StatusCode, Json<ErrorResponse>)> {
    let active_tenancies = tenancy::Entity::find()
        .filter(tenancy::Column::PropertyId.eq(property_id))
        .filter(tenancy::Column::Status.eq(tenancy::TenancyStatus::Active))
        .count(&state.db)
        .await
        .map_err(|db_error| {
            error!("Failed to count tenancies for property {}: {}", property_id, db_error);
            database_error()
        })?;
    if active_tenancies > 0 {
        warn!(
            "Refused to delete property {} with {} active tenancies",
            property_id, active_tenancies
        );
        return Err((
            StatusCode::CONFLICT,
            Json(ErrorResponse {
                error: format!(
                    "Property {} still has {} active tenancies",
                    property_id, active_tenancies
                ),
                code: "PROPERTY_HAS_ACTIVE_TENANCIES".to_string(),
                success: false,
            }),
        ));
    }

    match property::Entity::delete_by_id(property_id).exec(&state.db).await {
        Ok(delete_result) => {
            if delete_result.rows_affected > 0 {
                info!("Property {} deleted", property_id);
                let response = ApiResponse {
                    data: format!("Property {} deleted", property_id),
                    message: "Property deleted successfully".to_string(),
                    success: true,
                };
                Ok(Json(response))
            } else {
                warn!("Property {} not found for deletion", property_id);
                Err(property_not_found(property_id))
            }
        }
        Err(db_error) => {
            error!("Failed to delete property {}: {}", property_id, db_error);
            Err(database_error())
        }
    }
}

/// Get the occupancy snapshot for a property
#[utoipa::path(
    get,
    path = "/api/v1/properties/{property_id}/occupancy",
    tag = "dashboard",
    params(
        ("property_id" = i32, Path, description = "Property ID"),
    ),
    responses(
        (status = 200, description = "Occupancy retrieved successfully", body = ApiResponse<PropertyOccupancy>),
        (status = 404, description = "Property not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn get_property_occupancy(
    Path(property_id): Path<i32>,
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<PropertyOccupancy>>, (StatusCode, Json<ErrorResponse>)> {
    let property_model = find_property(&state, property_id).await?;

    let response = ApiResponse {
        data: compute::occupancy::property_occupancy(&property_model),
        message: "Occupancy retrieved successfully".to_string(),
        success: true,
    };
    Ok(Json(response))
}

/// Look a property up or produce the standard 404/500 error pair.
pub(crate) async fn find_property(
    state: &AppState,
    property_id: i32,
) -> Result<property::Model, (StatusCode, Json<ErrorResponse>)> {
    match property::Entity::find_by_id(property_id).one(&state.db).await {
        Ok(Some(property_model)) => Ok(property_model),
        Ok(None) => {
            warn!("Property with ID {} not found", property_id);
            Err(property_not_found(property_id))
        }
        Err(db_error) => {
            error!("Failed to retrieve property {}: {}", property_id, db_error);
            Err(database_error())
        }
    }
}

fn property_not_found(property_id: i32) -> (StatusCode, Json<ErrorResponse>) {
    (
        StatusCode::NOT_FOUND,
        Json(ErrorResponse {
            error: format!("Property with id {} does not exist", property_id),
            code: "PROPERTY_NOT_FOUND".to_string(),
            success: false,
        }),
    )
}

