//! HTTP request handlers for status and routes

use crate::api::extract::ApiJson;
use crate::api::models::{HealthResponse, RouteRequest, RouteResponse, StatusResponse};
use crate::error::AppError;
use crate::geo::GeoPoint;
use crate::AppState;
use axum::{
    extract::{Path, State},
    Json,
};
use std::sync::Arc;
use tracing::info;

/// Service banner
#[utoipa::path(
    get,
    path = "/",
    tag = "Health",
    responses((status = 200, description = "Service is running", body = StatusResponse))
)]
pub async fn root() -> Json<StatusResponse> {
    Json(StatusResponse {
        message: "Mask of the Phantasm API is running".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

/// Liveness and imagery platform status
#[utoipa::path(
    get,
    path = "/health",
    tag = "Health",
    responses((status = 200, description = "Health status", body = HealthResponse))
)]
pub async fn health_check(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        gee_initialized: state.platform.is_initialized(),
    })
}

/// Generate a dark and green walking route
#[utoipa::path(
    post,
    path = "/api/routes/generate",
    tag = "Routes",
    request_body = RouteRequest,
    responses(
        (status = 200, description = "Generated route", body = RouteResponse),
        (status = 400, description = "Invalid start point or distance", body = crate::api::models::ErrorResponse),
        (status = 422, description = "Missing or mistyped fields", body = crate::api::models::ErrorResponse),
    )
)]
pub async fn generate_route(
    State(state): State<Arc<AppState>>,
    ApiJson(request): ApiJson<RouteRequest>,
) -> Result<Json<RouteResponse>, AppError> {
    info!(
        distance = request.distance,
        start_location = request.start_location.as_deref().unwrap_or("-"),
        "Received route generation request"
    );

    let start = GeoPoint::from_lon_lat(&request.start_point)?;
    let route = state
        .planner
        .generate(start, request.distance, request.start_location.as_deref())?;

    Ok(Json(route.into()))
}

/// Fetch a previously generated route
#[utoipa::path(
    get,
    path = "/api/routes/{route_id}",
    tag = "Routes",
    params(("route_id" = String, Path, description = "Route identifier")),
    responses(
        (status = 200, description = "Stored route", body = RouteResponse),
        (status = 404, description = "Route not found", body = crate::api::models::ErrorResponse),
    )
)]
pub async fn get_route(
    State(state): State<Arc<AppState>>,
    Path(route_id): Path<String>,
) -> Result<Json<RouteResponse>, AppError> {
    let route = state.planner.get(&route_id)?;
    Ok(Json(route.into()))
}
