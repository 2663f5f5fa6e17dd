use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;
use crate::core::{RadiusError, SearchRadius};
use crate::core::matcher::{DEFAULT_MAX_RADIUS_MILES, DEFAULT_RADIUS_STEP_MILES, DEFAULT_START_RADIUS_MILES};

/// Application configuration
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub server: ServerSettings,
    #[serde(default)]
    pub search: SearchSettings,
    #[serde(default)]
    pub data: DataSettings,
    #[serde(default)]
    pub geocoder: GeocoderSettings,
    #[serde(default)]
    pub logging: LoggingSettings,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerSettings {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    pub workers: Option<usize>,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            workers: None,
        }
    }
}

fn default_host() -> String { "0.0.0.0".to_string() }
fn default_port() -> u16 { 8080 }

#[derive(Debug, Clone, Deserialize)]
pub struct SearchSettings {
    #[serde(default = "default_start_radius")]
    pub start_radius_miles: f64,
    #[serde(default = "default_radius_step")]
    pub radius_step_miles: f64,
    #[serde(default = "default_max_radius")]
    pub max_radius_miles: f64,
}

impl Default for SearchSettings {
    fn default() -> Self {
        Self {
            start_radius_miles: default_start_radius(),
            radius_step_miles: default_radius_step(),
            max_radius_miles: default_max_radius(),
        }
    }
}

impl SearchSettings {
    pub fn radius(&self) -> Result<SearchRadius, RadiusError> {
        SearchRadius::new(self.start_radius_miles, self.radius_step_miles, self.max_radius_miles)
    }
}

fn default_start_radius() -> f64 { DEFAULT_START_RADIUS_MILES }
fn default_radius_step() -> f64 { DEFAULT_RADIUS_STEP_MILES }
fn default_max_radius() -> f64 { DEFAULT_MAX_RADIUS_MILES }

/// Where loads and ZIP centroids come from; the built-in sample set when unset
#[derive(Debug, Clone, Default, Deserialize)]
pub struct DataSettings {
    pub dataset_path: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GeocoderSettings {
    pub remote_url: Option<String>,
    #[serde(default = "default_geocoder_timeout")]
    pub timeout_secs: u64,
    /// Budget for all remote lookups of one request
    #[serde(default = "default_geocoder_deadline")]
    pub deadline_ms: u64,
    #[serde(default = "default_geocoder_cache_size")]
    pub cache_size: u64,
    #[serde(default = "default_geocoder_cache_ttl")]
    pub cache_ttl_secs: u64,
}

impl Default for GeocoderSettings {
    fn default() -> Self {
        Self {
            remote_url: None,
            timeout_secs: default_geocoder_timeout(),
            deadline_ms: default_geocoder_deadline(),
            cache_size: default_geocoder_cache_size(),
            cache_ttl_secs: default_geocoder_cache_ttl(),
        }
    }
}

impl GeocoderSettings {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn deadline(&self) -> Duration {
        Duration::from_millis(self.deadline_ms)
    }

    pub fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.cache_ttl_secs)
    }
}

fn default_geocoder_timeout() -> u64 { 5 }
fn default_geocoder_deadline() -> u64 { 8_000 }
fn default_geocoder_cache_size() -> u64 { 10_000 }
fn default_geocoder_cache_ttl() -> u64 { 86_400 }

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingSettings {
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default = "default_log_format")]
    pub format: String,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

fn default_log_level() -> String { "info".to_string() }
fn default_log_format() -> String { "json".to_string() }

impl Settings {
    /// Load configuration from file and environment variables
    ///
    /// Configuration is loaded in the following order (later overrides earlier):
    /// 1. Default values in the struct
    /// 2. Configuration file (config/default.toml)
    /// 3. Local overrides (config/local.toml)
    /// 4. Environment variables (prefixed with RELOAD_)
    pub fn load() -> Result<Self, ConfigError> {
        let mut settings = Config::builder()
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name("config/local").required(false))
            // e.g., RELOAD__SEARCH__MAX_RADIUS_MILES -> search.max_radius_miles
            .add_source(
                Environment::with_prefix("RELOAD")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        settings = substitute_env_vars(settings)?;

        settings.try_deserialize()
    }

    /// Load configuration from a custom path
    pub fn load_from<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let settings = Config::builder()
            .add_source(File::from(path.as_ref()))
            .add_source(
                Environment::with_prefix("RELOAD")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        settings.try_deserialize()
    }
}

/// Apply the unprefixed GEOCODER_URL and DATASET_PATH variables
fn substitute_env_vars(settings: Config) -> Result<Config, ConfigError> {
    use std::env;

    let mut builder = Config::builder().add_source(settings);

    if let Ok(url) = env::var("GEOCODER_URL") {
        builder = builder.set_override("geocoder.remote_url", url)?;
    }
    if let Ok(path) = env::var("DATASET_PATH") {
        builder = builder.set_override("data.dataset_path", path)?;
    }

    builder.build()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_search() {
        let search = SearchSettings::default();
        assert_eq!(search.start_radius_miles, 100.0);
        assert_eq!(search.radius_step_miles, 50.0);
        assert_eq!(search.max_radius_miles, 300.0);
        assert_eq!(search.radius().unwrap(), SearchRadius::default());
    }

    #[test]
    fn test_invalid_search_radius() {
        let search = SearchSettings {
            start_radius_miles: 100.0,
            radius_step_miles: -50.0,
            max_radius_miles: 300.0,
        };
        assert!(search.radius().is_err());
    }

    #[test]
    fn test_default_logging() {
        let level = default_log_level();
        let format = default_log_format();
        assert_eq!(level, "info");
        assert_eq!(format, "json");
    }

    #[test]
    fn test_load_from_file() {
        let settings = Settings::load_from("config/default.toml").unwrap();

        assert_eq!(settings.server.port, 8080);
        assert_eq!(settings.search.max_radius_miles, 300.0);
        assert!(settings.geocoder.remote_url.is_none());
        assert_eq!(settings.geocoder.deadline(), Duration::from_secs(8));
    }
}
