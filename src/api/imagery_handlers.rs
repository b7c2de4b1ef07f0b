//! Single-point imagery sample endpoints

use crate::api::extract::ApiJson;
use crate::api::models::{NdviResponse, NightlightResponse, PointSampleRequest};
use crate::error::AppError;
use crate::imagery::{ndvi, nightlight};
use crate::AppState;
use axum::{extract::State, Json};
use std::sync::Arc;

/// Mean NDVI at a point
#[utoipa::path(
    post,
    path = "/api/test/ndvi",
    tag = "Imagery",
    request_body = PointSampleRequest,
    responses(
        (status = 200, description = "NDVI sample, null when no imagery was available", body = NdviResponse),
        (status = 400, description = "Invalid coordinates or date", body = crate::api::models::ErrorResponse),
        (status = 500, description = "Imagery platform unavailable", body = crate::api::models::ErrorResponse),
    )
)]
pub async fn test_ndvi(
    State(state): State<Arc<AppState>>,
    ApiJson(request): ApiJson<PointSampleRequest>,
) -> Result<Json<NdviResponse>, AppError> {
    let point = request.point()?;
    let date = request.parse_date()?;

    let value = state
        .ndvi
        .get_ndvi_for_point(point, date)
        .await
        .map_err(|e| AppError::Internal(format!("Error fetching NDVI: {}", e)))?;

    Ok(Json(NdviResponse {
        lat: request.lat,
        lon: request.lon,
        ndvi: value,
        interpretation: ndvi::interpret(value).to_string(),
    }))
}

/// Mean night-time radiance at a point
#[utoipa::path(
    post,
    path = "/api/test/nightlight",
    tag = "Imagery",
    request_body = PointSampleRequest,
    responses(
        (status = 200, description = "Radiance sample, null when no imagery was available", body = NightlightResponse),
        (status = 400, description = "Invalid coordinates or date", body = crate::api::models::ErrorResponse),
        (status = 500, description = "Imagery platform unavailable", body = crate::api::models::ErrorResponse),
    )
)]
pub async fn test_nightlight(
    State(state): State<Arc<AppState>>,
    ApiJson(request): ApiJson<PointSampleRequest>,
) -> Result<Json<NightlightResponse>, AppError> {
    let point = request.point()?;
    let date = request.parse_date()?;

    let value = state
        .nightlight
        .get_nightlight_for_point(point, date)
        .await
        .map_err(|e| AppError::Internal(format!("Error fetching nightlight: {}", e)))?;

    Ok(Json(NightlightResponse {
        lat: request.lat,
        lon: request.lon,
        nightlight: value,
        interpretation: nightlight::interpret(value).to_string(),
    }))
}
