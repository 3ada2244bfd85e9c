//! Planner settings and configuration management.
//!
//! This module provides the configuration options for the run-planner
//! application, supporting multiple configuration sources with proper precedence.

use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

use crate::plan::EXTRA_LOOP_THRESHOLD_KM;
use crate::route::directions::DEFAULT_DIRECTIONS_URL;
use crate::route::geocode::DEFAULT_GEOCODING_URL;
use crate::route::CalibrationParams;

/// Errors that can occur during configuration loading or validation.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to read configuration file.
    #[error("Failed to read configuration file: {0}")]
    IoError(#[from] std::io::Error),

    /// Failed to parse TOML configuration.
    #[error("Failed to parse TOML configuration: {0}")]
    TomlParseError(#[from] toml::de::Error),

    /// Failed to serialize TOML configuration.
    #[error("Failed to serialize TOML configuration: {0}")]
    TomlSerializeError(#[from] toml::ser::Error),

    /// Failed to parse JSON configuration.
    #[error("Failed to parse JSON configuration: {0}")]
    JsonError(#[from] serde_json::Error),

    /// Invalid configuration value.
    #[error("Invalid configuration: {0}")]
    ValidationError(String),

    /// A required API key is not configured.
    #[error("Missing API key: set {0}")]
    MissingApiKey(&'static str),

    /// Unsupported file format.
    #[error("Unsupported configuration file format: {0}")]
    UnsupportedFormat(String),
}

/// Main planner settings configuration.
///
/// API keys live here and are handed to the routing and geocoding clients
/// when they are constructed; library code never reads them from the
/// environment on its own.
///
/// # Configuration Precedence
///
/// Settings are applied in the following order (later sources override earlier):
/// 1. Default values
/// 2. Configuration file (TOML or JSON)
/// 3. Environment variables
/// 4. CLI arguments
///
/// # Example
///
/// ```rust
/// use run_planner::config::PlannerSettings;
///
/// let settings = PlannerSettings::default()
///     .with_directions_key("secret")
///     .with_target_loop_km(7.0);
/// assert!(settings.validate().is_ok());
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlannerSettings {
    /// API key for the directions service.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub directions_api_key: Option<String>,

    /// API key for the geocoding service. Falls back to the directions key.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub geocoding_api_key: Option<String>,

    /// Directions endpoint URL.
    #[serde(default = "default_directions_url")]
    pub directions_url: String,

    /// Geocoding endpoint URL.
    #[serde(default = "default_geocoding_url")]
    pub geocoding_url: String,

    /// Timeout for every outgoing request in milliseconds.
    #[serde(default = "default_request_timeout_ms")]
    pub request_timeout_ms: u64,

    /// Preferred length of a single loop in km.
    #[serde(default = "default_target_loop_km")]
    pub target_loop_km: f64,

    /// Remainders above this many km get an extra loop.
    #[serde(default = "default_extra_loop_threshold_km")]
    pub extra_loop_threshold_km: f64,

    /// Runs within this fraction of the planned distance count as similar.
    #[serde(default = "default_pace_window_ratio")]
    pub pace_window_ratio: f64,

    /// Minutes added to the estimate before rounding the calendar block.
    #[serde(default = "default_calendar_buffer_min")]
    pub calendar_buffer_min: u32,

    /// Number of recent runs to consider.
    #[serde(default = "default_history_limit")]
    pub history_limit: usize,

    /// Loop calibration parameters.
    #[serde(default)]
    pub calibration: CalibrationParams,
}

// Default value functions for serde
fn default_directions_url() -> String {
    DEFAULT_DIRECTIONS_URL.to_string()
}

fn default_geocoding_url() -> String {
    DEFAULT_GEOCODING_URL.to_string()
}

fn default_request_timeout_ms() -> u64 {
    25000
}

fn default_target_loop_km() -> f64 {
    6.2
}

fn default_extra_loop_threshold_km() -> f64 {
    EXTRA_LOOP_THRESHOLD_KM
}

fn default_pace_window_ratio() -> f64 {
    0.3
}

fn default_calendar_buffer_min() -> u32 {
    30
}

fn default_history_limit() -> usize {
    10
}

impl Default for PlannerSettings {
    fn default() -> Self {
        Self {
            directions_api_key: None,
            geocoding_api_key: None,
            directions_url: default_directions_url(),
            geocoding_url: default_geocoding_url(),
            request_timeout_ms: default_request_timeout_ms(),
            target_loop_km: default_target_loop_km(),
            extra_loop_threshold_km: default_extra_loop_threshold_km(),
            pace_window_ratio: default_pace_window_ratio(),
            calendar_buffer_min: default_calendar_buffer_min(),
            history_limit: default_history_limit(),
            calibration: CalibrationParams::default(),
        }
    }
}

impl PlannerSettings {
    /// Loads settings from a configuration file.
    ///
    /// Supports both TOML and JSON formats, detected by file extension.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    ///
    /// # Example
    ///
    /// ```rust,no_run
    /// use run_planner::config::PlannerSettings;
    ///
    /// let settings = PlannerSettings::from_file("planner.toml").unwrap();
    /// ```
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)?;

        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("")
            .to_lowercase();

        match extension.as_str() {
            "toml" => Ok(toml::from_str(&content)?),
            "json" => Ok(serde_json::from_str(&content)?),
            ext => Err(ConfigError::UnsupportedFormat(ext.to_string())),
        }
    }

    /// Saves settings to a configuration file.
    ///
    /// The format is determined by the file extension.
    pub fn to_file<P: AsRef<Path>>(&self, path: P) -> Result<(), ConfigError> {
        let path = path.as_ref();
        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("")
            .to_lowercase();

        let content = match extension.as_str() {
            "toml" => toml::to_string_pretty(self)?,
            "json" => serde_json::to_string_pretty(self)?,
            ext => return Err(ConfigError::UnsupportedFormat(ext.to_string())),
        };

        fs::write(path, content)?;
        Ok(())
    }

    /// Loads settings from environment variables.
    ///
    /// Environment variables are prefixed with `RUN_PLANNER_`:
    /// - `RUN_PLANNER_DIRECTIONS_KEY`, `RUN_PLANNER_GEOCODING_KEY`
    /// - `RUN_PLANNER_DIRECTIONS_URL`, `RUN_PLANNER_GEOCODING_URL`
    /// - `RUN_PLANNER_TIMEOUT_MS`
    /// - `RUN_PLANNER_TARGET_LOOP_KM`
    /// - `RUN_PLANNER_MAX_ITERS`, `RUN_PLANNER_TOLERANCE_KM`
    /// - `RUN_PLANNER_HISTORY_LIMIT`
    pub fn from_env() -> Self {
        let mut settings = Self::default();
        settings.apply_env_overrides();
        settings
    }

    /// Applies environment variable overrides to current settings.
    fn apply_env_overrides(&mut self) {
        if let Ok(val) = env::var("RUN_PLANNER_DIRECTIONS_KEY") {
            self.directions_api_key = Some(val);
        }

        if let Ok(val) = env::var("RUN_PLANNER_GEOCODING_KEY") {
            self.geocoding_api_key = Some(val);
        }

        if let Ok(val) = env::var("RUN_PLANNER_DIRECTIONS_URL") {
            self.directions_url = val;
        }

        if let Ok(val) = env::var("RUN_PLANNER_GEOCODING_URL") {
            self.geocoding_url = val;
        }

        if let Ok(val) = env::var("RUN_PLANNER_TIMEOUT_MS") {
            if let Ok(timeout) = val.parse() {
                self.request_timeout_ms = timeout;
            }
        }

        if let Ok(val) = env::var("RUN_PLANNER_TARGET_LOOP_KM") {
            if let Ok(km) = val.parse() {
                self.target_loop_km = km;
            }
        }

        if let Ok(val) = env::var("RUN_PLANNER_MAX_ITERS") {
            if let Ok(iters) = val.parse() {
                self.calibration.max_iters = iters;
            }
        }

        if let Ok(val) = env::var("RUN_PLANNER_TOLERANCE_KM") {
            if let Ok(tol) = val.parse() {
                self.calibration.tol_km = tol;
            }
        }

        if let Ok(val) = env::var("RUN_PLANNER_HISTORY_LIMIT") {
            if let Ok(limit) = val.parse() {
                self.history_limit = limit;
            }
        }
    }

    /// Merges current settings with environment variable overrides.
    pub fn merge_with_env(mut self) -> Self {
        self.apply_env_overrides();
        self
    }

    /// Merges settings with CLI arguments.
    ///
    /// # Example
    ///
    /// ```rust
    /// use run_planner::config::{CliArgs, PlannerSettings};
    ///
    /// let args = CliArgs {
    ///     target_loop_km: Some(5.0),
    ///     max_iters: Some(8),
    ///     ..Default::default()
    /// };
    ///
    /// let settings = PlannerSettings::default().merge_with_args(&args);
    /// assert_eq!(settings.calibration.max_iters, 8);
    /// ```
    pub fn merge_with_args(mut self, args: &CliArgs) -> Self {
        if let Some(ref key) = args.directions_key {
            self.directions_api_key = Some(key.clone());
        }
        if let Some(ref key) = args.geocoding_key {
            self.geocoding_api_key = Some(key.clone());
        }
        if let Some(timeout) = args.timeout_ms {
            self.request_timeout_ms = timeout;
        }
        if let Some(km) = args.target_loop_km {
            self.target_loop_km = km;
        }
        if let Some(iters) = args.max_iters {
            self.calibration.max_iters = iters;
        }
        if let Some(tol) = args.tol_km {
            self.calibration.tol_km = tol;
        }
        if let Some(limit) = args.history_limit {
            self.history_limit = limit;
        }

        self
    }

    /// Validates all settings.
    ///
    /// API keys are not required here; see [`PlannerSettings::directions_key`].
    ///
    /// # Example
    ///
    /// ```rust
    /// use run_planner::config::PlannerSettings;
    ///
    /// let settings = PlannerSettings::default();
    /// assert!(settings.validate().is_ok());
    /// ```
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.directions_url.trim().is_empty() || self.geocoding_url.trim().is_empty() {
            return Err(ConfigError::ValidationError(
                "Service URLs cannot be empty".to_string(),
            ));
        }

        // Validate timeout
        if self.request_timeout_ms < 1000 {
            return Err(ConfigError::ValidationError(
                "Request timeout must be at least 1000ms".to_string(),
            ));
        }
        if self.request_timeout_ms > 300000 {
            return Err(ConfigError::ValidationError(
                "Request timeout cannot exceed 300000ms (5 minutes)".to_string(),
            ));
        }

        if !(self.target_loop_km > 0.0 && self.target_loop_km <= 50.0) {
            return Err(ConfigError::ValidationError(format!(
                "Target loop length must be in (0, 50] km, got {}",
                self.target_loop_km
            )));
        }

        if !(self.extra_loop_threshold_km >= 0.0 && self.extra_loop_threshold_km.is_finite()) {
            return Err(ConfigError::ValidationError(
                "Extra loop threshold cannot be negative".to_string(),
            ));
        }

        if !(self.pace_window_ratio > 0.0 && self.pace_window_ratio < 1.0) {
            return Err(ConfigError::ValidationError(
                "Pace window ratio must be between 0 and 1".to_string(),
            ));
        }

        if self.history_limit == 0 {
            return Err(ConfigError::ValidationError(
                "History limit must be at least 1".to_string(),
            ));
        }

        // Validate calibration
        let cal = &self.calibration;
        if cal.max_iters == 0 || cal.max_iters > 50 {
            return Err(ConfigError::ValidationError(
                "Calibration iterations must be between 1 and 50".to_string(),
            ));
        }
        if !(cal.tol_km > 0.0 && cal.tol_km.is_finite()) {
            return Err(ConfigError::ValidationError(
                "Calibration tolerance must be positive".to_string(),
            ));
        }
        if !(cal.hop_divisor > 0.0 && cal.hop_divisor.is_finite()) {
            return Err(ConfigError::ValidationError(
                "Hop divisor must be positive".to_string(),
            ));
        }
        if !(cal.min_hop_km > 0.0 && cal.min_hop_km.is_finite()) {
            return Err(ConfigError::ValidationError(
                "Minimum hop length must be positive".to_string(),
            ));
        }
        if !cal.turn_angle_deg.is_finite() {
            return Err(ConfigError::ValidationError(
                "Turn angle must be finite".to_string(),
            ));
        }

        Ok(())
    }

    /// Returns the directions API key or an error naming the variable to set.
    pub fn directions_key(&self) -> Result<&str, ConfigError> {
        self.directions_api_key
            .as_deref()
            .filter(|k| !k.is_empty())
            .ok_or(ConfigError::MissingApiKey("RUN_PLANNER_DIRECTIONS_KEY"))
    }

    /// Returns the geocoding API key, falling back to the directions key.
    pub fn geocoding_key(&self) -> Result<&str, ConfigError> {
        match self.geocoding_api_key.as_deref().filter(|k| !k.is_empty()) {
            Some(key) => Ok(key),
            None => self
                .directions_key()
                .map_err(|_| ConfigError::MissingApiKey("RUN_PLANNER_GEOCODING_KEY")),
        }
    }

    /// Request timeout as a [`Duration`].
    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }

    // Builder-style methods for convenient configuration

    /// Sets the directions API key.
    pub fn with_directions_key(mut self, key: impl Into<String>) -> Self {
        self.directions_api_key = Some(key.into());
        self
    }

    /// Sets the geocoding API key.
    pub fn with_geocoding_key(mut self, key: impl Into<String>) -> Self {
        self.geocoding_api_key = Some(key.into());
        self
    }

    /// Sets the preferred loop length in km.
    pub fn with_target_loop_km(mut self, km: f64) -> Self {
        self.target_loop_km = km;
        self
    }

    /// Sets the request timeout in milliseconds.
    pub fn with_timeout(mut self, timeout_ms: u64) -> Self {
        self.request_timeout_ms = timeout_ms;
        self
    }

    /// Sets the calibration parameters.
    pub fn with_calibration(mut self, calibration: CalibrationParams) -> Self {
        self.calibration = calibration;
        self
    }
}

/// CLI argument structure for parsing command line options.
///
/// All fields are optional to allow partial overrides.
#[derive(Debug, Default, Clone)]
pub struct CliArgs {
    /// Directions API key.
    pub directions_key: Option<String>,
    /// Geocoding API key.
    pub geocoding_key: Option<String>,
    /// Request timeout in milliseconds.
    pub timeout_ms: Option<u64>,
    /// Preferred loop length in km.
    pub target_loop_km: Option<f64>,
    /// Calibration iteration budget.
    pub max_iters: Option<u32>,
    /// Calibration tolerance in km.
    pub tol_km: Option<f64>,
    /// Number of recent runs to consider.
    pub history_limit: Option<usize>,
    /// Configuration file path.
    pub config_file: Option<PathBuf>,
}

impl CliArgs {
    /// Loads the final settings by applying the full configuration chain.
    ///
    /// 1. Default values
    /// 2. Configuration file (if specified)
    /// 3. Environment variables
    /// 4. CLI arguments (self)
    pub fn load_settings(&self) -> Result<PlannerSettings, ConfigError> {
        // Start with defaults or file
        let mut settings = if let Some(ref config_file) = self.config_file {
            PlannerSettings::from_file(config_file)?
        } else {
            PlannerSettings::default()
        };

        // Apply environment overrides
        settings = settings.merge_with_env();

        // Apply CLI overrides
        settings = settings.merge_with_args(self);

        // Validate final settings
        settings.validate()?;

        Ok(settings)
    }
}
