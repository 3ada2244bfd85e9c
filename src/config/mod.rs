//! Configuration module for run-planner.
//!
//! This module provides configuration management for the planner, including:
//! - Loading settings from files (TOML/JSON)
//! - Environment variable overrides
//! - CLI argument merging
//! - Validation and defaults
//!
//! # Example
//!
//! ```rust,no_run
//! use run_planner::config::PlannerSettings;
//!
//! // Load from a specific file
//! let settings = PlannerSettings::from_file("planner.toml").unwrap();
//!
//! // Override with environment variables
//! let settings = settings.merge_with_env();
//! ```

mod settings;

pub use settings::{CliArgs, ConfigError, PlannerSettings};
