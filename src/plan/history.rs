//! Recent activity history.
//!
//! Reads a JSON activity export (the shape fitness platforms return for an
//! athlete's activity list) and keeps the runs, converted to the units the
//! pace estimator works in.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::PlanResult;

/// A completed run in planner units.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunActivity {
    /// Activity title
    pub name: String,
    /// Distance in km
    pub distance_km: f64,
    /// Moving time in minutes
    pub moving_time_min: f64,
    /// Average speed in km/h
    pub average_speed_kmh: f64,
}

impl RunActivity {
    /// Pace in min/km, if the run covered any distance.
    pub fn pace_min_per_km(&self) -> Option<f64> {
        (self.distance_km > 0.0).then(|| self.moving_time_min / self.distance_km)
    }
}

/// One entry of an activity export, in platform units.
#[derive(Debug, Clone, Deserialize)]
struct RawActivity {
    #[serde(default)]
    name: Option<String>,
    #[serde(default, rename = "type")]
    kind: Option<String>,
    /// meters
    #[serde(default)]
    distance: Option<f64>,
    /// seconds
    #[serde(default)]
    moving_time: Option<f64>,
    /// meters per second
    #[serde(default)]
    average_speed: Option<f64>,
}

impl RawActivity {
    fn into_run(self) -> Option<RunActivity> {
        if self.kind.as_deref() != Some("Run") {
            return None;
        }
        Some(RunActivity {
            name: self.name.unwrap_or_default(),
            distance_km: self.distance.unwrap_or(0.0) / 1000.0,
            moving_time_min: self.moving_time.unwrap_or(0.0) / 60.0,
            average_speed_kmh: self.average_speed.unwrap_or(0.0) * 3.6,
        })
    }
}

/// Parses an activity export and returns up to `limit` runs in file order.
pub fn parse_activities(json: &str, limit: usize) -> PlanResult<Vec<RunActivity>> {
    let raw: Vec<RawActivity> = serde_json::from_str(json)?;
    Ok(raw
        .into_iter()
        .filter_map(RawActivity::into_run)
        .take(limit)
        .collect())
}

/// Loads up to `limit` runs from an activity export file.
pub fn load_recent_runs<P: AsRef<Path>>(path: P, limit: usize) -> PlanResult<Vec<RunActivity>> {
    let path = path.as_ref();
    let content = fs::read_to_string(path)?;
    let runs = parse_activities(&content, limit)?;
    debug!("Loaded {} runs from {}", runs.len(), path.display());
    Ok(runs)
}

#[cfg(test)]
mod tests {
    use super::*;

    const EXPORT: &str = r#"[
        {"name": "Morning Run", "type": "Run", "distance": 10000, "moving_time": 3000, "average_speed": 3.333},
        {"name": "Commute", "type": "Ride", "distance": 12000, "moving_time": 2400, "average_speed": 5.0},
        {"name": "Long Run", "type": "Run", "distance": 21097.5, "moving_time": 7200},
        {"name": "Tempo", "type": "Run", "distance": 8000, "moving_time": 2160, "average_speed": 3.7}
    ]"#;

    #[test]
    fn test_keeps_runs_only() {
        let runs = parse_activities(EXPORT, 10).unwrap();
        assert_eq!(runs.len(), 3);
        assert!(runs.iter().all(|r| r.name != "Commute"));
    }

    #[test]
    fn test_unit_conversion() {
        let runs = parse_activities(EXPORT, 10).unwrap();
        let first = &runs[0];

        assert_eq!(first.distance_km, 10.0);
        assert_eq!(first.moving_time_min, 50.0);
        assert!((first.average_speed_kmh - 12.0).abs() < 0.01);
        assert_eq!(first.pace_min_per_km(), Some(5.0));

        // Missing speed defaults to zero
        assert_eq!(runs[1].average_speed_kmh, 0.0);
    }

    #[test]
    fn test_limit() {
        let runs = parse_activities(EXPORT, 2).unwrap();
        assert_eq!(runs.len(), 2);
        assert_eq!(runs[1].name, "Long Run");
    }

    #[test]
    fn test_zero_distance_has_no_pace() {
        let run = RunActivity {
            name: "treadmill".into(),
            distance_km: 0.0,
            moving_time_min: 30.0,
            average_speed_kmh: 0.0,
        };
        assert_eq!(run.pace_min_per_km(), None);
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("activities.json");
        std::fs::write(&path, EXPORT).unwrap();

        let runs = load_recent_runs(&path, 5).unwrap();
        assert_eq!(runs.len(), 3);

        assert!(load_recent_runs(dir.path().join("missing.json"), 5).is_err());
    }
}
