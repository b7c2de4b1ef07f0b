//! Unit tests for configuration module

use phantasm_api::config::{BoundingBox, Settings};
use std::io::Write;
use std::sync::{Mutex, MutexGuard};

/// Variables read by `Settings::load_from_path` beyond the config file
const ENV_VARS: &[&str] = &[
    "PHANTASM__SERVER__PORT",
    "PHANTASM__LOGGING__LEVEL",
    "GCP_PROJECT_ID",
    "GCP_SERVICE_ACCOUNT_KEY",
    "BACKEND_PORT",
];

static ENV_LOCK: Mutex<()> = Mutex::new(());

/// Serializes tests that load settings; clears the variables on both ends
struct EnvGuard {
    _lock: MutexGuard<'static, ()>,
}

impl EnvGuard {
    fn acquire() -> Self {
        let lock = ENV_LOCK.lock().unwrap_or_else(|e| e.into_inner());
        clear_env();
        Self { _lock: lock }
    }

    fn set(&self, key: &str, value: &str) {
        std::env::set_var(key, value);
    }
}

impl Drop for EnvGuard {
    fn drop(&mut self) {
        clear_env();
    }
}

fn clear_env() {
    for key in ENV_VARS {
        std::env::remove_var(key);
    }
}

fn write_config(contents: &str, suffix: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::Builder::new()
        .suffix(suffix)
        .tempfile()
        .unwrap();
    file.write_all(contents.as_bytes()).unwrap();
    file
}

#[test]
fn test_default_settings() {
    let settings = Settings::default();

    assert_eq!(settings.server.host, "0.0.0.0");
    assert_eq!(settings.server.port, 8000);
    assert_eq!(settings.logging.level, "info");
    assert_eq!(
        settings.cors.allowed_origins,
        vec!["http://localhost:3000", "http://localhost:5173"]
    );
    assert_eq!(settings.service_area, BoundingBox::default());
    assert_eq!(settings.routes.walking_speed_m_per_min, 80.0);
    assert_eq!(
        settings.datasets.ndvi.collection,
        "COPERNICUS/S2_SR_HARMONIZED"
    );
    assert_eq!(settings.datasets.nightlight.scale_m, 500.0);
}

#[test]
fn test_load_missing_file_uses_defaults() {
    let _env = EnvGuard::acquire();
    let settings = Settings::load_from_path("/nonexistent/phantasm.yaml").unwrap();
    assert_eq!(settings.server.host, "0.0.0.0");
    assert_eq!(
        settings.earth_engine.base_url,
        "https://earthengine.googleapis.com"
    );
    assert!(settings.validate().is_ok());
}

#[test]
fn test_load_yaml_overrides() {
    let _env = EnvGuard::acquire();
    let file = write_config(
        r#"
server:
  host: 127.0.0.1
  port: 9100
logging:
  format: pretty
earth_engine:
  project_id: dark-green-routes
  timeout_ms: 5000
routes:
  walking_speed_m_per_min: 100.0
service_area:
  min_lon: 2.22
  min_lat: 48.81
  max_lon: 2.47
  max_lat: 48.90
"#,
        ".yaml",
    );

    let settings = Settings::load_from_path(file.path()).unwrap();
    assert_eq!(settings.server.host, "127.0.0.1");
    assert_eq!(settings.server.port, 9100);
    assert_eq!(settings.logging.format, "pretty");
    assert_eq!(settings.logging.level, "info");
    assert_eq!(
        settings.earth_engine.project_id.as_deref(),
        Some("dark-green-routes")
    );
    assert_eq!(settings.earth_engine.timeout_ms, 5000);
    assert_eq!(settings.routes.walking_speed_m_per_min, 100.0);
    assert_eq!(settings.routes.loop_offset_deg, 0.01);
    assert!(settings.service_area.contains(2.35, 48.85));
    assert!(settings.validate().is_ok());
}

#[test]
fn test_load_toml() {
    let _env = EnvGuard::acquire();
    let file = write_config(
        r#"
[server]
port = 9200

[datasets.ndvi]
temporal_window_days = 14
"#,
        ".toml",
    );

    let settings = Settings::load_from_path(file.path()).unwrap();
    assert_eq!(settings.server.port, 9200);
    assert_eq!(settings.datasets.ndvi.temporal_window_days, 14);
    assert_eq!(settings.datasets.ndvi.max_cloudy_pixel_percentage, 20.0);
}

#[test]
fn test_settings_validation_invalid_port() {
    let mut settings = Settings::default();
    settings.server.port = 0;

    assert!(settings.validate().is_err());
}

#[test]
fn test_settings_validation_walking_speed() {
    let mut settings = Settings::default();
    settings.routes.walking_speed_m_per_min = 0.0;
    assert!(settings.validate().is_err());

    settings.routes.walking_speed_m_per_min = f64::NAN;
    assert!(settings.validate().is_err());
}

#[test]
fn test_settings_validation_empty_dataset() {
    let mut settings = Settings::default();
    settings.datasets.nightlight.collection = String::new();

    assert!(settings.validate().is_err());
}

#[test]
fn test_prefixed_env_overrides_file() {
    let env = EnvGuard::acquire();
    let file = write_config("server:\n  port: 9100\n", ".yaml");
    env.set("PHANTASM__SERVER__PORT", "9300");
    env.set("PHANTASM__LOGGING__LEVEL", "debug");

    let settings = Settings::load_from_path(file.path()).unwrap();
    assert_eq!(settings.server.port, 9300);
    assert_eq!(settings.logging.level, "debug");
}

#[test]
fn test_gcp_project_fills_missing_project() {
    let env = EnvGuard::acquire();
    env.set("GCP_PROJECT_ID", "env-project");
    env.set("GCP_SERVICE_ACCOUNT_KEY", "/secrets/gee.json");

    let settings = Settings::load_from_path("/nonexistent/phantasm.yaml").unwrap();
    assert_eq!(
        settings.earth_engine.project_id.as_deref(),
        Some("env-project")
    );
    assert_eq!(
        settings.earth_engine.service_account_key.as_deref(),
        Some("/secrets/gee.json")
    );
}

#[test]
fn test_file_project_beats_gcp_project() {
    let env = EnvGuard::acquire();
    let file = write_config(
        "earth_engine:\n  project_id: file-project\n  service_account_key: /etc/key.json\n",
        ".yaml",
    );
    env.set("GCP_PROJECT_ID", "env-project");
    env.set("GCP_SERVICE_ACCOUNT_KEY", "/secrets/gee.json");

    let settings = Settings::load_from_path(file.path()).unwrap();
    assert_eq!(
        settings.earth_engine.project_id.as_deref(),
        Some("file-project")
    );
    assert_eq!(
        settings.earth_engine.service_account_key.as_deref(),
        Some("/etc/key.json")
    );
}

#[test]
fn test_backend_port_overrides_everything() {
    let env = EnvGuard::acquire();
    let file = write_config("server:\n  port: 9100\n", ".yaml");
    env.set("PHANTASM__SERVER__PORT", "9300");
    env.set("BACKEND_PORT", "8080");

    let settings = Settings::load_from_path(file.path()).unwrap();
    assert_eq!(settings.server.port, 8080);
}
