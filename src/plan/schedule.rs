//! Planned runs.
//!
//! A schedule is a local TOML or JSON file listing upcoming long runs:
//!
//! ```toml
//! [[runs]]
//! date = "2026-10-24"
//! distance_km = 24.0
//! week = 12
//! ```

use std::fs;
use std::path::Path;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::{PlanError, PlanResult};

/// One planned run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlannedRun {
    /// Day of the run
    pub date: NaiveDate,
    /// Planned distance in km
    pub distance_km: f64,
    /// Training week number, if the plan has one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub week: Option<u32>,
}

/// All planned runs, in file order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Schedule {
    /// Planned runs
    #[serde(default)]
    pub runs: Vec<PlannedRun>,
}

impl Schedule {
    /// Loads a schedule; the format follows the file extension.
    pub fn from_file<P: AsRef<Path>>(path: P) -> PlanResult<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)?;

        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("")
            .to_lowercase();

        let schedule: Schedule = match extension.as_str() {
            "toml" => toml::from_str(&content)?,
            "json" => serde_json::from_str(&content)?,
            ext => return Err(PlanError::UnsupportedFormat(ext.to_string())),
        };

        for run in &schedule.runs {
            if !run.distance_km.is_finite() || run.distance_km <= 0.0 {
                return Err(PlanError::InvalidDistance(format!(
                    "run on {} has distance {}",
                    run.date, run.distance_km
                )));
            }
        }

        Ok(schedule)
    }
}

/// Returns the earliest run dated `today` or later. Runs sharing a date
/// resolve to the one listed first.
pub fn next_planned_run(schedule: &Schedule, today: NaiveDate) -> Option<&PlannedRun> {
    schedule
        .runs
        .iter()
        .filter(|run| run.date >= today)
        .min_by_key(|run| run.date)
}
