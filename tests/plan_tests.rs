//! Integration tests for the plan module
//!
//! Tests for plan assembly, the pace estimate, and reading schedule and
//! history files from disk.

use chrono::NaiveDate;
use std::io::Write;
use tempfile::NamedTempFile;

use run_planner::plan::{
    assemble_plan, estimate_run_duration, load_recent_runs, next_planned_run, round_up_minutes,
    LoopChoice, PlanError, Schedule,
};

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn temp_file(suffix: &str, contents: &str) -> NamedTempFile {
    let mut file = tempfile::Builder::new().suffix(suffix).tempfile().unwrap();
    file.write_all(contents.as_bytes()).unwrap();
    file
}

// ============================================================================
// Assembly Tests
// ============================================================================

#[test]
fn test_long_run_gets_nearest_extra_loop() {
    let plan = assemble_plan(24.0, 6.3, 6.1).unwrap();

    assert_eq!(plan.full_cycles, 1);
    assert!((plan.remainder_km - 11.6).abs() < 1e-9);
    assert_eq!(plan.extra_loop, Some(LoopChoice::A));
}

#[test]
fn test_exact_cycle_has_no_extra_loop() {
    let plan = assemble_plan(12.4, 6.3, 6.1).unwrap();

    assert_eq!(plan.full_cycles, 1);
    assert_eq!(plan.extra_loop, None);
}

#[test]
fn test_remainder_is_below_one_cycle() {
    for planned in [0.0, 3.3, 10.0, 18.9, 42.195] {
        let plan = assemble_plan(planned, 5.4, 6.7).unwrap();
        assert!(plan.remainder_km >= -1e-9);
        assert!(plan.remainder_km < plan.cycle_km);
        let covered = f64::from(plan.full_cycles) * plan.cycle_km + plan.remainder_km;
        assert!((covered - planned).abs() < 1e-9);
    }
}

#[test]
fn test_zero_loops_cannot_be_planned() {
    assert!(matches!(
        assemble_plan(10.0, 0.0, 0.0),
        Err(PlanError::ZeroCycle { .. })
    ));
}

// ============================================================================
// Schedule & History Tests
// ============================================================================

#[test]
fn test_schedule_file_to_next_run() {
    let file = temp_file(
        ".toml",
        r#"
[[runs]]
date = "2026-10-12"
distance_km = 16.0
week = 6

[[runs]]
date = "2026-10-26"
distance_km = 24.0
week = 8

[[runs]]
date = "2026-10-19"
distance_km = 21.0
week = 7
"#,
    );

    let schedule = Schedule::from_file(file.path()).unwrap();
    let run = next_planned_run(&schedule, date(2026, 10, 19)).unwrap();

    assert_eq!(run.date, date(2026, 10, 19));
    assert_eq!(run.distance_km, 21.0);
    assert_eq!(run.week, Some(7));

    assert!(next_planned_run(&schedule, date(2026, 10, 27)).is_none());
}

#[test]
fn test_history_drives_estimate() {
    let file = temp_file(
        ".json",
        r#"[
            {"name": "Sunday long run", "type": "Run", "distance": 20000.0, "moving_time": 7200, "average_speed": 2.7778},
            {"name": "Tempo", "type": "Run", "distance": 10000.0, "moving_time": 3000, "average_speed": 3.3333},
            {"name": "Commute", "type": "Ride", "distance": 15000.0, "moving_time": 2700, "average_speed": 5.5556}
        ]"#,
    );

    let runs = load_recent_runs(file.path(), 10).unwrap();
    assert_eq!(runs.len(), 2);

    // Only the 20 km run falls in the +/-30% window: 6:00 min/km
    let minutes = estimate_run_duration(21.0, &runs, 0.3);
    assert!((minutes - 126.0).abs() < 1e-6);
    assert_eq!(round_up_minutes(minutes + 30.0, 15), 165);
}
