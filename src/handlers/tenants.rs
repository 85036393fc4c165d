use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::Json,
};
use model::entities::{tenancy, user};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder, Set,
};
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info, instrument, warn};
use utoipa::ToSchema;
use validator::Validate;

use crate::handlers::database_error;
use crate::schemas::{ApiResponse, AppState, ErrorResponse};

/// Request body for registering a new tenant
#[derive(Debug, Deserialize, Serialize, ToSchema, Validate)]
pub struct CreateTenantRequest {
    /// Contact email, unique across all users
    #[validate(email(message = "Email must be valid"))]
    pub email: String,
    /// Contact phone number
    #[validate(length(min = 1, message = "Phone is required"))]
    pub phone: String,
    #[validate(length(min = 1, message = "First name is required"))]
    pub first_name: String,
    #[validate(length(min = 1, message = "Last name is required"))]
    pub last_name: String,
    /// Tenant's stated occupation
    pub occupation: Option<String>,
    /// Kind of identity document (national id, passport, ...)
    pub id_type: Option<String>,
    pub id_number: Option<String>,
}

/// Request body for updating a tenant
#[derive(Debug, Deserialize, Serialize, ToSchema, Validate)]
pub struct UpdateTenantRequest {
    #[validate(email(message = "Email must be valid"))]
    pub email: Option<String>,
    pub phone: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub occupation: Option<String>,
    pub id_type: Option<String>,
    pub id_number: Option<String>,
}

/// Tenant response model
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct TenantResponse {
    pub id: i32,
    pub email: String,
    pub phone: String,
    pub first_name: String,
    pub last_name: String,
    pub occupation: Option<String>,
    pub id_type: Option<String>,
    pub id_number: Option<String>,
    pub is_verified: bool,
}

impl From<user::Model> for TenantResponse {
    fn from(model: user::Model) -> Self {
        Self {
            id: model.id,
            email: model.email,
            phone: model.phone,
            first_name: model.first_name,
            last_name: model.last_name,
            occupation: model.occupation,
            id_type: model.id_type,
            id_number: model.id_number,
            is_verified: model.is_verified,
        }
    }
}

fn tenant_not_found(tenant_id: i32) -> (StatusCode, Json<ErrorResponse>) {
    (
        StatusCode::NOT_FOUND,
        Json(ErrorResponse {
            error: format!("Tenant with id {} does not exist", tenant_id),
            code: "TENANT_NOT_FOUND".to_string(),
            success: false,
        }),
    )
}

fn invalid_request(errors: validator::ValidationErrors) -> (StatusCode, Json<ErrorResponse>) {
    (
        StatusCode::BAD_REQUEST,
        Json(ErrorResponse {
            error: errors.to_string(),
            code: "VALIDATION_ERROR".to_string(),
            success: false,
        }),
    )
}

/// Register a new tenant
#[utoipa::path(
    post,
    path = "/api/v1/tenants",
    tag = "tenants",
    request_body = CreateTenantRequest,
    responses(
        (status = 201, description = "Tenant created successfully", body = ApiResponse<TenantResponse>),
        (status = 400, description = "Invalid request", body = ErrorResponse),
        (status = 409, description = "Email already registered", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn create_tenant(
    State(state): State<AppState>,
    Json(request): Json<CreateTenantRequest>,
) -> Result<(StatusCode, Json<ApiResponse<TenantResponse>>), (StatusCode, Json<ErrorResponse>)> {
    debug!("Registering tenant {}", request.email);

    // Validation happens before any write is attempted; the store's unique
    // constraint on email remains the authority
    if let Err(errors) = request.validate() {
        warn!("Rejected tenant registration: {}", errors);
        return Err(invalid_request(errors));
    }

    let duplicate = user::Entity::find()
        .filter(user::Column::Email.eq(request.email.clone()))
        .count(&state.db)
        .await
        .map_err(|db_error| {
            error!("Failed to check email uniqueness: {}", db_error);
            database_error()
        })?;
    if duplicate > 0 {
        return Err((
            StatusCode::CONFLICT,
            Json(ErrorResponse {
                error: format!("Email {} is already registered", request.email),
                code: "DUPLICATE_EMAIL".to_string(),
                success: false,
            }),
        ));
    }

    let new_tenant = user::ActiveModel {
        email: Set(request.email),
        phone: Set(request.phone),
        first_name: Set(request.first_name),
        last_name: Set(request.last_name),
        user_type: Set(user::UserType::Tenant),
        occupation: Set(request.occupation),
        id_type: Set(request.id_type),
        id_number: Set(request.id_number),
        is_verified: Set(false),
        ..Default::default()
    };

    match new_tenant.insert(&state.db).await {
        Ok(tenant_model) => {
            info!("Tenant created with ID: {}", tenant_model.id);
            let response = ApiResponse {
                data: TenantResponse::from(tenant_model),
                message: "Tenant created successfully".to_string(),
                success: true,
            };
            Ok((StatusCode::CREATED, Json(response)))
        }
        Err(db_error) => {
            error!("Failed to create tenant: {}", db_error);
            Err(database_error())
        }
    }
}

/// Get all tenants
#[utoipa::path(
    get,
    path = "/api/v1/tenants",
    tag = "tenants",
    responses(
        (status = 200, description = "Tenants retrieved successfully", body = ApiResponse<Vec<TenantResponse>>),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn get_tenants(
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<Vec<TenantResponse>>>, (StatusCode, Json<ErrorResponse>)> {
    match user::Entity::find()
        .filter(user::Column::UserType.eq(user::UserType::Tenant))
        .order_by_desc(user::Column::Id)
        .all(&state.db)
        .await
    {
        Ok(tenants) => {
            debug!("Retrieved {} tenants", tenants.len());
            let response = ApiResponse {
                data: tenants.into_iter().map(TenantResponse::from).collect(),
                message: "Tenants retrieved successfully".to_string(),
                success: true,
            };
            Ok(Json(response))
        }
        Err(db_error) => {
            error!("Failed to retrieve tenants: {}", db_error);
            Err(database_error())
        }
    }
}

/// Get a specific tenant by ID
#[utoipa::path(
    get,
    path = "/api/v1/tenants/{tenant_id}",
    tag = "tenants",
    params(
        ("tenant_id" = i32, Path, description = "Tenant user ID"),
    ),
    responses(
        (status = 200, description = "Tenant retrieved successfully", body = ApiResponse<TenantResponse>),
        (status = 404, description = "Tenant not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn get_tenant(
    Path(tenant_id): Path<i32>,
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<TenantResponse>>, (StatusCode, Json<ErrorResponse>)> {
    let tenant_model = find_tenant(&state, tenant_id).await?;

    let response = ApiResponse {
        data: TenantResponse::from(tenant_model),
        message: "Tenant retrieved successfully".to_string(),
        success: true,
    };
    Ok(Json(response))
}

/// Update a tenant
#[utoipa::path(
    put,
    path = "/api/v1/tenants/{tenant_id}",
    tag = "tenants",
    params(
        ("tenant_id" = i32, Path, description = "Tenant user ID"),
    ),
    request_body = UpdateTenantRequest,
    responses(
        (status = 200, description = "Tenant updated successfully", body = ApiResponse<TenantResponse>),
        (status = 400, description = "Invalid request", body = ErrorResponse),
        (status = 404, description = "Tenant not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn update_tenant(
    Path(tenant_id): Path<i32>,
    State(state): State<AppState>,
    Json(request): Json<UpdateTenantRequest>,
) -> Result<Json<ApiResponse<TenantResponse>>, (StatusCode, Json<ErrorResponse>)> {
    if let Err(errors) = request.validate() {
        warn!("Rejected tenant update: {}", errors);
        return Err(invalid_request(errors));
    }

    let existing = find_tenant(&state, tenant_id).await?;

    let mut tenant_active: user::ActiveModel = existing.into();
    if let Some(email) = request.email {
        tenant_active.email = Set(email);
    }
    if let Some(phone) = request.phone {
        tenant_active.phone = Set(phone);
    }
    if let Some(first_name) = request.first_name {
        tenant_active.first_name = Set(first_name);
    }
    if let Some(last_name) = request.last_name {
        tenant_active.last_name = Set(last_name);
    }
    if let Some(occupation) = request.occupation {
        tenant_active.occupation = Set(Some(occupation));
    }
    if let Some(id_type) = request.id_type {
        tenant_active.id_type = Set(Some(id_type));
    }
    if let Some(id_number) = request.id_number {
        tenant_active.id_number = Set(Some(id_number));
    }

    match tenant_active.update(&state.db).await {
        Ok(updated) => {
            info!("Tenant {} updated", tenant_id);
            let response = ApiResponse {
                data: TenantResponse::from(updated),
                message: "Tenant updated successfully".to_string(),
                success: true,
            };
            Ok(Json(response))
        }
        Err(db_error) => {
            error!("Failed to update tenant {}: {}", tenant_id, db_error);
            Err(database_error())
        }
    }
}

/// Delete a tenant
#[utoipa::path(
    delete,
    path = "/api/v1/tenants/{tenant_id}",
    tag = "tenants",
    params(
        ("tenant_id" = i32, Path, description = "Tenant user ID"),
    ),
    responses(
        (status = 200, description = "Tenant deleted successfully", body = ApiResponse<String>),
        (status = 404, description = "Tenant not found", body = ErrorResponse),
        (status = 409, description = "Tenant has an active tenancy", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn delete_tenant(
    Path(tenant_id): Path<i32>,
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<String>>, (StatusCode, Json<ErrorResponse>)> {
    // Make sure the id really is a tenant before touching tenancies
    find_tenant(&state, tenant_id).await?;

    let active_tenancies = tenancy::Entity::find()
        .filter(tenancy::Column::TenantId.eq(tenant_id))
        .filter(tenancy::Column::Status.eq(tenancy::TenancyStatus::Active))
        .count(&state.db)
        .await
        .map_err(|db_error| {
            error!("Failed to count tenancies for tenant {}: {}", tenant_id, db_error);
            database_error()
        })?;
    if active_tenancies > 0 {
        warn!("Refused to delete tenant {} with an active tenancy", tenant_id);
        return Err((
            StatusCode::CONFLICT,
            Json(ErrorResponse {
                error: format!("Tenant {} still holds an active tenancy", tenant_id),
                code: "TENANT_HAS_ACTIVE_TENANCY".to_string(),
                success: false,
            }),
        ));
    }

    match user::Entity::delete_by_id(tenant_id).exec(&state.db).await {
        Ok(delete_result) => {
            if delete_result.rows_affected > 0 {
                info!("Tenant {} deleted", tenant_id);
                let response = ApiResponse {
                    data: format!("Tenant {} deleted", tenant_id),
                    message: "Tenant deleted successfully".to_string(),
                    success: true,
                };
                Ok(Json(response))
            } else {
                Err(tenant_not_found(tenant_id))
            }
        }
        Err(db_error) => {
            error!("Failed to delete tenant {}: {}", tenant_id, db_error);
            Err(database_error())
        }
    }
}

/// Look a tenant up or produce the standard 404/500 error pair. Users of
/// other types are reported as not found; this repository only serves
/// tenants.
async fn find_tenant(
    state: &AppState,
    tenant_id: i32,
) -> Result<user::Model, (StatusCode, Json<ErrorResponse>)> {
    match user::Entity::find_by_id(tenant_id).one(&state.db).await {
        Ok(Some(user_model)) if user_model.user_type == user::UserType::Tenant => Ok(user_model),
        Ok(_) => {
            warn!("Tenant with ID {} not found", tenant_id);
            Err(tenant_not_found(tenant_id))
        }
        Err(db_error) => {
            error!("Failed to retrieve tenant {}: {}", tenant_id, db_error);
            Err(database_error())
        }
    }
}
