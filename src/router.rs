use crate::handlers::{
    dashboard::get_portfolio_summary,
    health::health_check,
    properties::{
        create_property, delete_property, get_properties, get_property, get_property_occupancy,
        update_property,
    },
    tenancies::{
        create_tenancy, delete_tenancy, end_tenancy, get_property_tenancies, get_tenancies,
        get_tenancy, get_unit_tenancies, update_tenancy,
    },
    tenants::{create_tenant, delete_tenant, get_tenant, get_tenants, update_tenant},
    units::{create_unit, delete_unit, get_property_units, get_unit, update_unit},
};
use crate::schemas::{ApiDoc, AppState};
use axum::{
    routing::{delete, get, post, put},
    Router,
};
use std::time::Duration;
use tower::ServiceBuilder;
use tower_http::{
    compression::CompressionLayer, cors::CorsLayer, timeout::TimeoutLayer, trace::TraceLayer,
};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

/// Create application router with all routes and middleware
pub fn create_router(state: AppState) -> Router {
    let router = Router::new()
        // Health check
        .route("/health", get(health_check))
        // Property CRUD routes
        .route("/api/v1/properties", post(create_property))
        .route("/api/v1/properties", get(get_properties))
        .route("/api/v1/properties/:property_id", get(get_property))
        .route("/api/v1/properties/:property_id", put(update_property))
        .route("/api/v1/properties/:property_id", delete(delete_property))
        .route(
            "/api/v1/properties/:property_id/occupancy",
            get(get_property_occupancy),
        )
        // Unit CRUD routes
        .route("/api/v1/properties/:property_id/units", post(create_unit))
        .route("/api/v1/properties/:property_id/units", get(get_property_units))
        .route("/api/v1/units/:unit_id", get(get_unit))
        .route("/api/v1/units/:unit_id", put(update_unit))
        .route("/api/v1/units/:unit_id", delete(delete_unit))
        // Tenant CRUD routes
        .route("/api/v1/tenants", post(create_tenant))
        .route("/api/v1/tenants", get(get_tenants))
        .route("/api/v1/tenants/:tenant_id", get(get_tenant))
        .route("/api/v1/tenants/:tenant_id", put(update_tenant))
        .route("/api/v1/tenants/:tenant_id", delete(delete_tenant))
        // Tenancy workflow and CRUD routes
        .route("/api/v1/tenancies", post(create_tenancy))
        .route("/api/v1/tenancies", get(get_tenancies))
        .route("/api/v1/tenancies/:tenancy_id", get(get_tenancy))
        .route("/api/v1/tenancies/:tenancy_id", put(update_tenancy))
        .route("/api/v1/tenancies/:tenancy_id", delete(delete_tenancy))
        .route("/api/v1/tenancies/:tenancy_id/end", post(end_tenancy))
        .route(
            "/api/v1/properties/:property_id/tenancies",
            get(get_property_tenancies),
        )
        .route("/api/v1/units/:unit_id/tenancies", get(get_unit_tenancies))
        // Dashboard routes
        .route("/api/v1/dashboard/summary", get(get_portfolio_summary))
        // Swagger UI
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()));

    // Prometheus metrics clash with the shared global recorder under the
    // test harness, so the endpoint only exists in real builds
    #[cfg(not(test))]
    let router = {
        let (prometheus_layer, metric_handle) = axum_prometheus::PrometheusMetricLayer::pair();
        router
            .route(
                "/metrics",
                get(|| async move { metric_handle.render() }),
            )
            .layer(prometheus_layer)
    };

    router
        // Add middleware
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CompressionLayer::new())
                .layer(TimeoutLayer::new(Duration::from_secs(30)))
                .layer(CorsLayer::permissive()),
        )
        .with_state(state)
}
