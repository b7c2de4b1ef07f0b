//! HTTP route definitions

use crate::api::models::*;
use crate::api::{handlers, imagery_handlers};
use axum::{
    http::HeaderValue,
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use std::time::Duration;
use tower_http::cors::{AllowHeaders, AllowMethods, AllowOrigin, CorsLayer};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;
use tracing::warn;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

/// OpenAPI documentation
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Mask of the Phantasm API",
        version = "0.1.0",
        description = "Generate dark and green walking routes in Berlin",
        license(name = "MIT"),
    ),
    servers(
        (url = "http://localhost:8000", description = "Local development server")
    ),
    paths(
        handlers::root,
        handlers::health_check,
        handlers::generate_route,
        handlers::get_route,
        imagery_handlers::test_ndvi,
        imagery_handlers::test_nightlight,
    ),
    components(schemas(
        RouteRequest,
        RouteResponse,
        PointSampleRequest,
        NdviResponse,
        NightlightResponse,
        StatusResponse,
        HealthResponse,
        ErrorResponse,
    )),
    tags(
        (name = "Routes", description = "Walking route generation"),
        (name = "Imagery", description = "Single-point satellite imagery samples"),
        (name = "Health", description = "Health and status endpoints"),
    )
)]
pub struct ApiDoc;

/// Create the main application router
pub async fn create_router(state: Arc<crate::AppState>) -> Router {
    let (origins, timeout_secs) = {
        let config = state.settings.read().await;
        (
            config.cors.allowed_origins.clone(),
            config.server.request_timeout_secs,
        )
    };

    let api_routes = Router::new()
        .route("/routes/generate", post(handlers::generate_route))
        .route("/routes/:route_id", get(handlers::get_route))
        .route("/test/ndvi", post(imagery_handlers::test_ndvi))
        .route("/test/nightlight", post(imagery_handlers::test_nightlight));

    Router::new()
        .route("/", get(handlers::root))
        .route("/health", get(handlers::health_check))
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .nest("/api", api_routes)
        .with_state(state)
        .layer(cors_layer(&origins))
        .layer(TimeoutLayer::new(Duration::from_secs(timeout_secs)))
        .layer(TraceLayer::new_for_http())
}

/// Credentialed CORS for the configured frontend origins
fn cors_layer(origins: &[String]) -> CorsLayer {
    let origins: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match origin.parse::<HeaderValue>() {
            Ok(value) => Some(value),
            Err(e) => {
                warn!(origin = %origin, error = %e, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_credentials(true)
        .allow_methods(AllowMethods::mirror_request())
        .allow_headers(AllowHeaders::mirror_request())
}
