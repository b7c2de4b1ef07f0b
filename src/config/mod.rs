//! Configuration module

pub mod settings;

pub use settings::{
    BoundingBox, CorsConfig, DatasetsConfig, EarthEngineConfig, LoggingConfig, NdviDataset,
    NightlightDataset, RouteConfig, ServerConfig, Settings,
};
