//! Covers a planned distance with A/B loop cycles.
//!
//! Greedy: as many full A then B cycles as fit, then one extra loop if the
//! remainder is worth it. The extra loop is whichever of A and B is closer
//! to the remainder; no attempt is made to balance over- and undershoot.

use serde::Serialize;

use super::{PlanError, PlanResult};

/// Remainders up to this many km do not earn an extra loop
pub const EXTRA_LOOP_THRESHOLD_KM: f64 = 0.4;

/// Which of the two loops to run once more.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum LoopChoice {
    /// The loop along the initial bearing
    A,
    /// The loop along the opposite bearing
    B,
}

impl LoopChoice {
    /// Length of the chosen loop in km.
    pub fn length_km(self, loop_a_km: f64, loop_b_km: f64) -> f64 {
        match self {
            LoopChoice::A => loop_a_km,
            LoopChoice::B => loop_b_km,
        }
    }
}

impl std::fmt::Display for LoopChoice {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LoopChoice::A => write!(f, "A"),
            LoopChoice::B => write!(f, "B"),
        }
    }
}

/// How a planned distance maps onto loop cycles.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PlanSummary {
    /// Distance to cover in km
    pub planned_km: f64,
    /// Loop A plus loop B in km
    pub cycle_km: f64,
    /// Number of complete A then B cycles
    pub full_cycles: u32,
    /// Distance left after the full cycles in km
    pub remainder_km: f64,
    /// Loop to append, if any
    pub extra_loop: Option<LoopChoice>,
}

impl PlanSummary {
    /// Length of the extra loop in km, if one is suggested.
    pub fn extra_loop_km(&self, loop_a_km: f64, loop_b_km: f64) -> Option<f64> {
        self.extra_loop.map(|choice| choice.length_km(loop_a_km, loop_b_km))
    }

    /// Total distance of the suggested plan in km.
    pub fn planned_route_km(&self, loop_a_km: f64, loop_b_km: f64) -> f64 {
        let extra = self.extra_loop_km(loop_a_km, loop_b_km).unwrap_or(0.0);
        f64::from(self.full_cycles) * self.cycle_km + extra
    }
}

/// Assembles a plan with the default extra-loop threshold.
///
/// # Example
///
/// ```rust
/// use run_planner::plan::{assemble_plan, LoopChoice};
///
/// let plan = assemble_plan(24.0, 6.3, 6.1).unwrap();
/// assert_eq!(plan.full_cycles, 1);
/// assert_eq!(plan.extra_loop, Some(LoopChoice::A));
/// ```
pub fn assemble_plan(planned_km: f64, loop_a_km: f64, loop_b_km: f64) -> PlanResult<PlanSummary> {
    assemble_plan_with_threshold(planned_km, loop_a_km, loop_b_km, EXTRA_LOOP_THRESHOLD_KM)
}

/// Assembles a plan; remainders above `threshold_km` get an extra loop.
pub fn assemble_plan_with_threshold(
    planned_km: f64,
    loop_a_km: f64,
    loop_b_km: f64,
    threshold_km: f64,
) -> PlanResult<PlanSummary> {
    for (name, value) in [
        ("planned", planned_km),
        ("loop A", loop_a_km),
        ("loop B", loop_b_km),
    ] {
        if !value.is_finite() || value < 0.0 {
            return Err(PlanError::InvalidDistance(format!("{} distance {}", name, value)));
        }
    }

    let cycle_km = loop_a_km + loop_b_km;
    if cycle_km <= 0.0 {
        return Err(PlanError::ZeroCycle {
            loop_a_km,
            loop_b_km,
        });
    }

    let full_cycles = (planned_km / cycle_km).floor();
    let remainder_km = planned_km - full_cycles * cycle_km;

    let extra_loop = if remainder_km > threshold_km {
        if (remainder_km - loop_a_km).abs() < (remainder_km - loop_b_km).abs() {
            Some(LoopChoice::A)
        } else {
            Some(LoopChoice::B)
        }
    } else {
        None
    };

    Ok(PlanSummary {
        planned_km,
        cycle_km,
        full_cycles: full_cycles as u32,
        remainder_km,
        extra_loop,
    })
}
