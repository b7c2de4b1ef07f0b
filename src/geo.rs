//! Geographic primitives shared by the route and imagery modules

use crate::error::{AppError, Result};
use serde::{Deserialize, Serialize};

/// WGS84 point in degrees
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub lon: f64,
    pub lat: f64,
}

impl GeoPoint {
    /// Build a point, rejecting non-finite or out-of-range coordinates
    pub fn new(lon: f64, lat: f64) -> Result<Self> {
        if !lon.is_finite() || !(-180.0..=180.0).contains(&lon) {
            return Err(AppError::BadRequest(format!(
                "Longitude must be within [-180, 180], got {}",
                lon
            )));
        }
        if !lat.is_finite() || !(-90.0..=90.0).contains(&lat) {
            return Err(AppError::BadRequest(format!(
                "Latitude must be within [-90, 90], got {}",
                lat
            )));
        }
        Ok(Self { lon, lat })
    }

    /// Parse a `[lon, lat]` pair as sent by the frontend
    pub fn from_lon_lat(pair: &[f64]) -> Result<Self> {
        match pair {
            [lon, lat] => Self::new(*lon, *lat),
            _ => Err(AppError::BadRequest(format!(
                "start_point must be [longitude, latitude], got {} values",
                pair.len()
            ))),
        }
    }

    pub fn offset(&self, d_lon: f64, d_lat: f64) -> Self {
        Self {
            lon: self.lon + d_lon,
            lat: self.lat + d_lat,
        }
    }

    pub fn to_lon_lat(self) -> Vec<f64> {
        vec![self.lon, self.lat]
    }
}
