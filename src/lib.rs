//! Mask of the Phantasm API
//!
//! Backend for a walking route planner that favours dark and green streets,
//! scored from satellite vegetation (NDVI) and night-light (VIIRS) imagery.

pub mod api;
pub mod config;
pub mod error;
pub mod geo;
pub mod imagery;
pub mod route;

pub use error::{AppError, Result};

use std::sync::Arc;
use tokio::sync::RwLock;

use imagery::{ImageryPlatform, NdviService, NightlightService};
use route::RoutePlanner;

/// Application state shared across all handlers
pub struct AppState {
    pub settings: Arc<RwLock<config::Settings>>,
    pub platform: Arc<dyn ImageryPlatform>,
    pub ndvi: NdviService,
    pub nightlight: NightlightService,
    pub planner: RoutePlanner,
}

impl AppState {
    /// Wire the services for `settings` around an imagery platform
    pub fn new(settings: config::Settings, platform: Arc<dyn ImageryPlatform>) -> Self {
        let ndvi = NdviService::new(platform.clone(), settings.datasets.ndvi.clone());
        let nightlight = NightlightService::new(platform.clone(), settings.datasets.nightlight.clone());
        let planner = RoutePlanner::new(settings.routes.clone(), settings.service_area);

        Self {
            settings: Arc::new(RwLock::new(settings)),
            platform,
            ndvi,
            nightlight,
            planner,
        }
    }
}
