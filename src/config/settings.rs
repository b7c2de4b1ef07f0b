//! Application settings and configuration management

use crate::error::{AppError, Result};
use config::{Config, Environment, File, FileFormat};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Root configuration structure
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Settings {
    pub server: ServerConfig,
    #[serde(default)]
    pub cors: CorsConfig,
    pub logging: LoggingConfig,
    pub earth_engine: EarthEngineConfig,
    #[serde(default)]
    pub datasets: DatasetsConfig,
    #[serde(default)]
    pub routes: RouteConfig,
    #[serde(default)]
    pub service_area: BoundingBox,
}

/// Server configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8000
}

fn default_request_timeout() -> u64 {
    60
}

/// Cross-origin configuration for the web frontend
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CorsConfig {
    #[serde(default = "default_allowed_origins")]
    pub allowed_origins: Vec<String>,
}

fn default_allowed_origins() -> Vec<String> {
    vec![
        "http://localhost:3000".to_string(),
        "http://localhost:5173".to_string(),
    ]
}

impl Default for CorsConfig {
    fn default() -> Self {
        Self {
            allowed_origins: default_allowed_origins(),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default = "default_log_format")]
    pub format: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "json".to_string()
}

/// Earth Engine connection and credentials
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct EarthEngineConfig {
    #[serde(default = "default_ee_base_url")]
    pub base_url: String,

    /// Cloud project used for computations
    #[serde(default)]
    pub project_id: Option<String>,

    /// Path to a service account JSON key
    #[serde(default)]
    pub service_account_key: Option<String>,

    /// Pre-issued OAuth access token
    #[serde(default)]
    pub access_token: Option<String>,

    /// Environment variable holding an OAuth access token
    #[serde(default = "default_token_env")]
    pub access_token_env: String,

    #[serde(default = "default_timeout")]
    pub timeout_ms: u64,
}

fn default_ee_base_url() -> String {
    "https://earthengine.googleapis.com".to_string()
}

fn default_token_env() -> String {
    "EARTHENGINE_TOKEN".to_string()
}

fn default_timeout() -> u64 {
    30000
}

impl Default for EarthEngineConfig {
    fn default() -> Self {
        Self {
            base_url: default_ee_base_url(),
            project_id: None,
            service_account_key: None,
            access_token: None,
            access_token_env: default_token_env(),
            timeout_ms: default_timeout(),
        }
    }
}

/// Imagery datasets sampled by the point services
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
pub struct DatasetsConfig {
    #[serde(default)]
    pub ndvi: NdviDataset,
    #[serde(default)]
    pub nightlight: NightlightDataset,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct NdviDataset {
    #[serde(default = "default_ndvi_collection")]
    pub collection: String,
    #[serde(default = "default_ndvi_window")]
    pub temporal_window_days: i64,
    #[serde(default = "default_max_cloud")]
    pub max_cloudy_pixel_percentage: f64,
    #[serde(default = "default_ndvi_scale")]
    pub scale_m: f64,
}

fn default_ndvi_collection() -> String {
    "COPERNICUS/S2_SR_HARMONIZED".to_string()
}

fn default_ndvi_window() -> i64 {
    7
}

fn default_max_cloud() -> f64 {
    20.0
}

fn default_ndvi_scale() -> f64 {
    10.0
}

impl Default for NdviDataset {
    fn default() -> Self {
        Self {
            collection: default_ndvi_collection(),
            temporal_window_days: default_ndvi_window(),
            max_cloudy_pixel_percentage: default_max_cloud(),
            scale_m: default_ndvi_scale(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct NightlightDataset {
    #[serde(default = "default_nightlight_collection")]
    pub collection: String,
    #[serde(default = "default_nightlight_lookback")]
    pub lookback_days: i64,
    #[serde(default = "default_nightlight_scale")]
    pub scale_m: f64,
}

fn default_nightlight_collection() -> String {
    "NOAA/VIIRS/DNB/MONTHLY_V1/VCMSLCFG".to_string()
}

fn default_nightlight_lookback() -> i64 {
    30
}

fn default_nightlight_scale() -> f64 {
    500.0
}

impl Default for NightlightDataset {
    fn default() -> Self {
        Self {
            collection: default_nightlight_collection(),
            lookback_days: default_nightlight_lookback(),
            scale_m: default_nightlight_scale(),
        }
    }
}

/// Placeholder route generation parameters
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RouteConfig {
    #[serde(default = "default_walking_speed")]
    pub walking_speed_m_per_min: f64,
    #[serde(default = "default_loop_offset")]
    pub loop_offset_deg: f64,
}

fn default_walking_speed() -> f64 {
    80.0
}

fn default_loop_offset() -> f64 {
    0.01
}

impl Default for RouteConfig {
    fn default() -> Self {
        Self {
            walking_speed_m_per_min: default_walking_speed(),
            loop_offset_deg: default_loop_offset(),
        }
    }
}

/// Service area as `[min_lon, min_lat, max_lon, max_lat]`
#[derive(Debug, Clone, Copy, Deserialize, Serialize, PartialEq)]
pub struct BoundingBox {
    pub min_lon: f64,
    pub min_lat: f64,
    pub max_lon: f64,
    pub max_lat: f64,
}

impl BoundingBox {
    pub fn contains(&self, lon: f64, lat: f64) -> bool {
        lon >= self.min_lon && lon <= self.max_lon && lat >= self.min_lat && lat <= self.max_lat
    }
}

/// Berlin
impl Default for BoundingBox {
    fn default() -> Self {
        Self {
            min_lon: 13.0883,
            min_lat: 52.3382,
            max_lon: 13.7612,
            max_lat: 52.6755,
        }
    }
}

impl Settings {
    /// Load settings from the default configuration file and environment variables
    pub fn load() -> Result<Self> {
        Self::load_from_path("config/phantasm.yaml")
    }

    /// Load settings from a specific configuration file path (YAML or TOML)
    pub fn load_from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();

        let format = if path.extension().map_or(false, |ext| ext == "yaml" || ext == "yml") {
            FileFormat::Yaml
        } else {
            FileFormat::Toml
        };

        let mut config_builder = Config::builder()
            .set_default("server.host", default_host())?
            .set_default("server.port", default_port() as i64)?
            .set_default("server.request_timeout_secs", default_request_timeout() as i64)?
            .set_default("logging.level", default_log_level())?
            .set_default("logging.format", default_log_format())?
            .set_default("earth_engine.base_url", default_ee_base_url())?
            .set_default("earth_engine.access_token_env", default_token_env())?
            .set_default("earth_engine.timeout_ms", default_timeout() as i64)?;

        if path.exists() {
            config_builder = config_builder.add_source(File::from(path).format(format));
        }

        config_builder = config_builder.add_source(
            Environment::with_prefix("PHANTASM")
                .separator("__")
                .try_parsing(true),
        );

        let config = config_builder.build()?;
        let mut settings: Settings = config.try_deserialize()?;
        settings.apply_legacy_env();

        Ok(settings)
    }

    /// Honour the flat variable names older deployments use in their `.env`
    fn apply_legacy_env(&mut self) {
        if self.earth_engine.project_id.is_none() {
            self.earth_engine.project_id = std::env::var("GCP_PROJECT_ID").ok();
        }
        if self.earth_engine.service_account_key.is_none() {
            self.earth_engine.service_account_key = std::env::var("GCP_SERVICE_ACCOUNT_KEY").ok();
        }
        if let Some(port) = std::env::var("BACKEND_PORT")
            .ok()
            .and_then(|p| p.parse().ok())
        {
            self.server.port = port;
        }
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        if self.server.port == 0 {
            return Err(invalid("Server port cannot be 0"));
        }

        let area = &self.service_area;
        if area.min_lon >= area.max_lon || area.min_lat >= area.max_lat {
            return Err(invalid("Service area bounds are inverted or empty"));
        }

        if !(self.routes.walking_speed_m_per_min > 0.0) {
            return Err(invalid("Walking speed must be positive"));
        }

        if self.datasets.ndvi.collection.is_empty() || self.datasets.nightlight.collection.is_empty() {
            return Err(invalid("Dataset collection ids cannot be empty"));
        }

        if self.earth_engine.base_url.is_empty() {
            return Err(invalid("Earth Engine base URL cannot be empty"));
        }

        Ok(())
    }
}

fn invalid(message: &str) -> AppError {
    AppError::Config(config::ConfigError::Message(message.to_string()))
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            server: ServerConfig {
                host: default_host(),
                port: default_port(),
                request_timeout_secs: default_request_timeout(),
            },
            cors: CorsConfig::default(),
            logging: LoggingConfig {
                level: default_log_level(),
                format: default_log_format(),
            },
            earth_engine: EarthEngineConfig::default(),
            datasets: DatasetsConfig::default(),
            routes: RouteConfig::default(),
            service_area: BoundingBox::default(),
        }
    }
}
