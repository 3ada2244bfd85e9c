//! # Run Planner
//!
//! Plans the next long run: reads the planned distance, estimates pace from
//! recent runs, and builds two calibrated walking loops from a start address
//! whose real street distance matches a preferred loop length.
//!
//! ## Features
//!
//! - **Loop Calibration**: Bounded proportional search that tunes loop size
//!   against a routing service until the measured length hits the target
//! - **Two-Loop Composition**: Opposing loops A and B measured in one request,
//!   with a shareable directions link
//! - **Plan Assembly**: A/B cycle count plus an optional extra loop
//! - **Pace Estimate**: Median pace of similar recent runs
//! - **Flexible Configuration**: TOML/JSON files, environment variables, CLI arguments
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use run_planner::{
//!     config::PlannerSettings,
//!     geo::GeoPoint,
//!     plan::assemble_plan,
//!     route::{compose_two_loops, GoogleDirectionsClient},
//! };
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let settings = PlannerSettings::from_env();
//!     let oracle = GoogleDirectionsClient::new(
//!         settings.directions_url.clone(),
//!         settings.directions_key()?,
//!         settings.request_timeout(),
//!     )?;
//!
//!     let start = GeoPoint::new(52.52, 13.405)?;
//!     let route = compose_two_loops(&oracle, start, 6.2, 90.0, &settings.calibration).await?;
//!     let plan = assemble_plan(24.0, route.combined.loop_a_km, route.combined.loop_b_km)?;
//!
//!     println!("{} full cycles, extra: {:?}", plan.full_cycles, plan.extra_loop);
//!     Ok(())
//! }
//! ```
//!
//! ## Module Overview
//!
//! - [`geo`]: Coordinates, bearing normalization, spherical projection
//! - [`route`]: Distance oracle, geocoding, loop calibration and composition
//! - [`plan`]: Plan assembly, pace estimate, schedule and run history
//! - [`config`]: Configuration loading and management
//!
//! ## Configuration
//!
//! Configuration follows a precedence chain:
//! 1. Default values
//! 2. Configuration file (TOML/JSON)
//! 3. Environment variables (`RUN_PLANNER_*`)
//! 4. CLI arguments
//!
//! See [`config::PlannerSettings`] for all available options.

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name
pub const NAME: &str = env!("CARGO_PKG_NAME");

/// Full version string with name
pub const FULL_VERSION: &str = concat!(env!("CARGO_PKG_NAME"), " v", env!("CARGO_PKG_VERSION"));

// ============================================================================
// Module Exports
// ============================================================================

/// Geographic primitives: points, bearings, projection.
pub mod geo;

/// Distance oracle, geocoding, loop calibration and two-loop composition.
pub mod route;

/// Plan assembly, pace estimation, planned runs and activity history.
pub mod plan;

/// Configuration management for loading settings from files, env, and CLI.
pub mod config;

// ============================================================================
// Re-exports for Convenience
// ============================================================================

// Geo types
pub use geo::{GeoError, GeoPoint};

// Route types
pub use route::{
    calibrate, compose_two_loops, CalibrationParams, CalibrationResult, CombinedRoute,
    DistanceOracle, Geocoder, GoogleDirectionsClient, GoogleGeocoder, Loop, MockDistanceOracle,
    RouteError, TwoLoopRoute,
};

// Plan types
pub use plan::{assemble_plan, LoopChoice, PlanError, PlanSummary, PlannedRun, RunActivity};

// Config types
pub use config::{CliArgs, ConfigError, PlannerSettings};

// ============================================================================
// Prelude Module
// ============================================================================

/// Prelude module for convenient imports.
///
/// ```rust
/// use run_planner::prelude::*;
/// ```
pub mod prelude {
    pub use crate::config::{CliArgs, PlannerSettings};
    pub use crate::geo::GeoPoint;
    pub use crate::plan::{assemble_plan, PlanSummary};
    pub use crate::route::{compose_two_loops, CalibrationParams, DistanceOracle};
    pub use crate::{FULL_VERSION, NAME, VERSION};
}
