//! API request and response models

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::error::{AppError, Result};
use crate::geo::GeoPoint;
use crate::route::PlannedRoute;

/// Route generation request
#[derive(Debug, Clone, Deserialize, Serialize, ToSchema)]
pub struct RouteRequest {
    /// Target distance in meters (e.g. 5000 for 5 km)
    pub distance: f64,

    /// Starting coordinates `[longitude, latitude]`
    pub start_point: Vec<f64>,

    /// Optional district name (e.g. "Mitte")
    #[serde(default)]
    pub start_location: Option<String>,
}

/// Generated route
#[derive(Debug, Clone, Deserialize, Serialize, ToSchema)]
pub struct RouteResponse {
    pub route_id: String,

    /// `[longitude, latitude]` pairs
    pub coordinates: Vec<Vec<f64>>,

    pub distance: f64,

    /// 0-1, higher is darker
    pub darkness_score: f64,

    /// 0-1, higher is greener
    pub greenness_score: f64,

    /// Walking time in minutes
    pub estimated_time: i64,
}

impl From<PlannedRoute> for RouteResponse {
    fn from(route: PlannedRoute) -> Self {
        Self {
            route_id: route.id.to_string(),
            coordinates: route.path.into_iter().map(GeoPoint::to_lon_lat).collect(),
            distance: route.distance_m,
            darkness_score: route.darkness_score,
            greenness_score: route.greenness_score,
            estimated_time: route.estimated_minutes,
        }
    }
}

/// Single-point imagery query
#[derive(Debug, Clone, Deserialize, Serialize, ToSchema)]
pub struct PointSampleRequest {
    pub lat: f64,
    pub lon: f64,

    /// Reference date `YYYY-MM-DD`, defaults to today
    #[serde(default)]
    pub date: Option<String>,
}

impl PointSampleRequest {
    pub fn point(&self) -> Result<GeoPoint> {
        GeoPoint::new(self.lon, self.lat)
    }

    pub fn parse_date(&self) -> Result<Option<NaiveDate>> {
        self.date
            .as_deref()
            .map(|d| {
                NaiveDate::parse_from_str(d, "%Y-%m-%d").map_err(|e| {
                    AppError::BadRequest(format!("date must be YYYY-MM-DD, got '{}': {}", d, e))
                })
            })
            .transpose()
    }
}

#[derive(Debug, Clone, Deserialize, Serialize, ToSchema)]
pub struct NdviResponse {
    pub lat: f64,
    pub lon: f64,
    pub ndvi: Option<f64>,
    pub interpretation: String,
}

#[derive(Debug, Clone, Deserialize, Serialize, ToSchema)]
pub struct NightlightResponse {
    pub lat: f64,
    pub lon: f64,
    /// Mean radiance in nW/cm²/sr
    pub nightlight: Option<f64>,
    pub interpretation: String,
}

#[derive(Debug, Clone, Deserialize, Serialize, ToSchema)]
pub struct StatusResponse {
    pub message: String,
    pub version: String,
}

#[derive(Debug, Clone, Deserialize, Serialize, ToSchema)]
pub struct HealthResponse {
    pub status: String,
    pub gee_initialized: bool,
}

/// Error body
#[derive(Debug, Clone, Deserialize, Serialize, ToSchema)]
pub struct ErrorResponse {
    pub detail: String,
}
