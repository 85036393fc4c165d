use common::{PortfolioSummary, PropertyOccupancy};
use sea_orm::DatabaseConnection;
use serde::{Deserialize, Serialize};
use utoipa::{OpenApi, ToSchema};

/// Application state shared across handlers
#[derive(Clone, Debug)]
pub struct AppState {
    /// Database connection
    pub db: DatabaseConnection,
}

/// API response wrapper
#[derive(Serialize, Deserialize, ToSchema)]
pub struct ApiResponse<T> {
    /// Response data
    pub data: T,
    /// Response message
    pub message: String,
    /// Success status
    pub success: bool,
}

/// Error response
#[derive(Serialize, Deserialize, ToSchema)]
pub struct ErrorResponse {
    /// Error message
    pub error: String,
    /// Error code
    pub code: String,
    /// Success status (always false for errors)
    pub success: bool,
}

/// Health check response
#[derive(Serialize, Deserialize, ToSchema)]
pub struct HealthResponse {
    /// Service status
    pub status: String,
    /// Service version
    pub version: String,
    /// Database connection status
    pub database: String,
}

/// OpenAPI documentation
#[derive(OpenApi)]
#[openapi(
    paths(
        crate::handlers::health::health_check,
        crate::handlers::properties::create_property,
        crate::handlers::properties::get_properties,
        crate::handlers::properties::get_property,
        crate::handlers::properties::update_property,
        crate::handlers::properties::delete_property,
        crate::handlers::properties::get_property_occupancy,
        crate::handlers::units::create_unit,
        crate::handlers::units::get_property_units,
        crate::handlers::units::get_unit,
        crate::handlers::units::update_unit,
        crate::handlers::units::delete_unit,
        crate::handlers::tenants::create_tenant,
        crate::handlers::tenants::get_tenants,
        crate::handlers::tenants::get_tenant,
        crate::handlers::tenants::update_tenant,
        crate::handlers::tenants::delete_tenant,
        crate::handlers::tenancies::create_tenancy,
        crate::handlers::tenancies::get_tenancies,
        crate::handlers::tenancies::get_tenancy,
        crate::handlers::tenancies::update_tenancy,
        crate::handlers::tenancies::delete_tenancy,
        crate::handlers::tenancies::end_tenancy,
        crate::handlers::tenancies::get_property_tenancies,
        crate::handlers::tenancies::get_unit_tenancies,
        crate::handlers::dashboard::get_portfolio_summary,
    ),
    components(
        schemas(
            ApiResponse<crate::handlers::properties::PropertyResponse>,
            ApiResponse<crate::handlers::units::UnitResponse>,
            ApiResponse<crate::handlers::tenants::TenantResponse>,
            ApiResponse<crate::handlers::tenancies::TenancyResponse>,
            ApiResponse<PropertyOccupancy>,
            ApiResponse<PortfolioSummary>,
            ErrorResponse,
            HealthResponse,
            crate::handlers::properties::CreatePropertyRequest,
            crate::handlers::properties::UpdatePropertyRequest,
            crate::handlers::properties::PropertyResponse,
            crate::handlers::units::CreateUnitRequest,
            crate::handlers::units::UpdateUnitRequest,
            crate::handlers::units::UnitResponse,
            crate::handlers::tenants::CreateTenantRequest,
            crate::handlers::tenants::UpdateTenantRequest,
            crate::handlers::tenants::TenantResponse,
            crate::handlers::tenancies::CreateTenancyRequest,
            crate::handlers::tenancies::UpdateTenancyRequest,
            crate::handlers::tenancies::TenancyResponse,
            PropertyOccupancy,
            PortfolioSummary,
        )
    ),
    tags(
        (name = "health", description = "Health check endpoints"),
        (name = "properties", description = "Property CRUD endpoints"),
        (name = "units", description = "Unit CRUD endpoints"),
        (name = "tenants", description = "Tenant CRUD endpoints"),
        (name = "tenancies", description = "Tenancy workflow and CRUD endpoints"),
        (name = "dashboard", description = "Occupancy dashboard endpoints"),
    ),
    info(
        title = "RentRust API",
        description = "Property Management API - landlords, properties, units, tenants and tenancies",
        version = "0.1.0",
        license(
            name = "MIT",
            url = "https://opensource.org/licenses/MIT"
        )
    )
)]
pub struct ApiDoc;
