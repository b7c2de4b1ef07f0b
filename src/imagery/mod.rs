//! Imagery module - platform client, credentials, and point samplers

pub mod auth;
pub mod earth_engine;
pub mod expression;
pub mod ndvi;
pub mod nightlight;
pub mod sampling;
pub mod traits;

pub use earth_engine::EarthEngineClient;
pub use ndvi::NdviService;
pub use nightlight::NightlightService;
pub use traits::ImageryPlatform;
