//! Training plan module for run-planner
//!
//! Everything around the route itself: which run is next, how long it will
//! take, and how to cover its distance with the calibrated loops.
//!
//! # Submodules
//!
//! - [`assembler`] - A/B cycle count and extra-loop recommendation
//! - [`pace`] - Pace and duration estimate from recent runs
//! - [`schedule`] - Planned runs read from a local schedule file
//! - [`history`] - Recent activities read from a local export

pub mod assembler;
pub mod history;
pub mod pace;
pub mod schedule;

// Re-export commonly used types for convenience
pub use assembler::{
    assemble_plan, assemble_plan_with_threshold, LoopChoice, PlanSummary, EXTRA_LOOP_THRESHOLD_KM,
};
pub use history::{load_recent_runs, RunActivity};
pub use pace::{estimate_run_duration, format_pace, round_up_minutes, DEFAULT_PACE_MIN_PER_KM};
pub use schedule::{next_planned_run, PlannedRun, Schedule};

/// Result type for plan operations
pub type PlanResult<T> = Result<T, PlanError>;

/// Errors that can occur while assembling a plan or reading its inputs
#[derive(Debug, thiserror::Error)]
pub enum PlanError {
    /// Loop A and loop B add up to nothing, so no cycle can be counted.
    #[error("Loops have zero combined length ({loop_a_km} km + {loop_b_km} km)")]
    ZeroCycle { loop_a_km: f64, loop_b_km: f64 },

    /// A distance is negative or not finite.
    #[error("Invalid distance: {0}")]
    InvalidDistance(String),

    /// Reading a schedule or history file failed.
    #[error("Failed to read plan input: {0}")]
    Io(#[from] std::io::Error),

    /// A schedule file is not valid TOML.
    #[error("Failed to parse TOML schedule: {0}")]
    Toml(#[from] toml::de::Error),

    /// A schedule or history file is not valid JSON.
    #[error("Failed to parse JSON plan input: {0}")]
    Json(#[from] serde_json::Error),

    /// Unsupported file extension.
    #[error("Unsupported plan input format: {0}")]
    UnsupportedFormat(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = PlanError::ZeroCycle {
            loop_a_km: 0.0,
            loop_b_km: 0.0,
        };
        assert!(err.to_string().contains("zero combined length"));

        let err = PlanError::UnsupportedFormat("xlsx".to_string());
        assert!(err.to_string().contains("xlsx"));
    }
}
