//! Pace and duration estimate from recent runs.
//!
//! Runs close in distance to the planned one say the most about its pace, so
//! those are preferred. Paces outside 3-10 min/km are treated as GPS noise or
//! walks and ignored.

use super::history::RunActivity;

/// Fallback pace when no usable history exists (6:00 min/km)
pub const DEFAULT_PACE_MIN_PER_KM: f64 = 6.0;

/// Fastest pace considered plausible in min/km
pub const MIN_SANE_PACE: f64 = 3.0;

/// Slowest pace considered plausible in min/km
pub const MAX_SANE_PACE: f64 = 10.0;

/// Default similarity window: runs within ±30% of the planned distance
pub const DEFAULT_WINDOW_RATIO: f64 = 0.3;

fn pace_min_per_km(distance_km: f64, moving_time_min: f64) -> Option<f64> {
    if distance_km <= 0.0 {
        return None;
    }
    Some(moving_time_min / distance_km)
}

fn median(values: &mut [f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    values.sort_by(|a, b| a.total_cmp(b));
    let mid = values.len() / 2;
    if values.len() % 2 == 0 {
        Some((values[mid - 1] + values[mid]) / 2.0)
    } else {
        Some(values[mid])
    }
}

fn sane(values: &[f64]) -> Vec<f64> {
    values
        .iter()
        .copied()
        .filter(|p| (MIN_SANE_PACE..=MAX_SANE_PACE).contains(p))
        .collect()
}

/// Estimates the minutes needed for `distance_km`.
///
/// Uses the median pace of runs within `±window_ratio` of the distance,
/// falling back to all runs and finally to [`DEFAULT_PACE_MIN_PER_KM`].
///
/// # Example
///
/// ```rust
/// use run_planner::plan::estimate_run_duration;
///
/// // No history: 6:00 min/km
/// assert_eq!(estimate_run_duration(10.0, &[], 0.3), 60.0);
/// ```
pub fn estimate_run_duration(distance_km: f64, runs: &[RunActivity], window_ratio: f64) -> f64 {
    let lo = distance_km * (1.0 - window_ratio);
    let hi = distance_km * (1.0 + window_ratio);

    let mut similar = Vec::new();
    let mut all = Vec::new();

    for run in runs {
        let Some(pace) = pace_min_per_km(run.distance_km, run.moving_time_min) else {
            continue;
        };
        all.push(pace);
        if (lo..=hi).contains(&run.distance_km) {
            similar.push(pace);
        }
    }

    let mut pool = sane(&similar);
    if pool.is_empty() {
        pool = sane(&all);
    }

    let pace = median(&mut pool).unwrap_or(DEFAULT_PACE_MIN_PER_KM);
    pace * distance_km
}

/// Formats a pace in min/km as `m:ss min/km`.
///
/// ```rust
/// use run_planner::plan::format_pace;
///
/// assert_eq!(format_pace(5.5), "5:30 min/km");
/// ```
pub fn format_pace(min_per_km: f64) -> String {
    let mut minutes = min_per_km.trunc() as u64;
    let mut seconds = ((min_per_km - min_per_km.trunc()) * 60.0).round() as u64;
    if seconds == 60 {
        minutes += 1;
        seconds = 0;
    }
    format!("{}:{:02} min/km", minutes, seconds)
}

/// Rounds minutes up to the next multiple of `base` (e.g. 66 -> 75).
///
/// Any fractional minute rounds up, so 150.5 becomes 165 with a base of 15.
pub fn round_up_minutes(minutes: f64, base: u32) -> u32 {
    let base = f64::from(base.max(1));
    ((minutes / base).ceil() * base) as u32
}
