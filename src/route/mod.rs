//! Walking route planning
//!
//! No search over the street graph exists yet. `RoutePlanner::generate`
//! returns a small closed rectangle anchored at the start point with fixed
//! scores so the frontend can be developed against a stable shape.

use tracing::{info, warn};
use uuid::Uuid;

use crate::config::{BoundingBox, RouteConfig};
use crate::error::{AppError, Result};
use crate::geo::GeoPoint;

const PLACEHOLDER_DARKNESS: f64 = 0.75;
const PLACEHOLDER_GREENNESS: f64 = 0.68;

/// A generated loop
#[derive(Debug, Clone, PartialEq)]
pub struct PlannedRoute {
    pub id: Uuid,
    pub path: Vec<GeoPoint>,
    pub distance_m: f64,
    /// 0-1, higher is darker
    pub darkness_score: f64,
    /// 0-1, higher is greener
    pub greenness_score: f64,
    pub estimated_minutes: i64,
}

pub struct RoutePlanner {
    config: RouteConfig,
    service_area: BoundingBox,
}

impl RoutePlanner {
    pub fn new(config: RouteConfig, service_area: BoundingBox) -> Self {
        Self {
            config,
            service_area,
        }
    }

    pub fn generate(
        &self,
        start: GeoPoint,
        distance_m: f64,
        start_location: Option<&str>,
    ) -> Result<PlannedRoute> {
        // Any finite distance is echoed back, negative ones included
        if !distance_m.is_finite() {
            return Err(AppError::BadRequest(format!(
                "distance must be a finite number of meters, got {}",
                distance_m
            )));
        }

        if !self.service_area.contains(start.lon, start.lat) {
            warn!(
                lon = start.lon,
                lat = start.lat,
                "Start point lies outside the service area"
            );
        }

        let d = self.config.loop_offset_deg;
        let path = vec![
            start,
            start.offset(d, 0.0),
            start.offset(d, d),
            start.offset(0.0, d),
            start,
        ];

        let route = PlannedRoute {
            id: Uuid::new_v4(),
            path,
            distance_m,
            darkness_score: PLACEHOLDER_DARKNESS,
            greenness_score: PLACEHOLDER_GREENNESS,
            estimated_minutes: self.estimated_minutes(distance_m),
        };

        info!(
            route_id = %route.id,
            distance_m,
            start_location = start_location.unwrap_or("-"),
            "Generated placeholder route"
        );

        Ok(route)
    }

    /// Routes are not stored, so every lookup misses
    pub fn get(&self, route_id: &str) -> Result<PlannedRoute> {
        info!(route_id, "Route lookup");
        Err(AppError::NotFound(
            "Route not found. Route storage not yet implemented.".to_string(),
        ))
    }

    /// Whole minutes at the configured walking pace, rounded down
    pub fn estimated_minutes(&self, distance_m: f64) -> i64 {
        (distance_m / self.config.walking_speed_m_per_min).floor() as i64
    }
}
