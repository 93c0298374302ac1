//! Roster evaluation and reporting.
//!
//! Pure functions over any [`RosterSchedule`], complete or partial,
//! whichever engine produced it. Repeated calls on the same roster give
//! the same numbers.
//!
//! # Submodules
//!
//! - [`audit`]: hard-rule violation detection
//! - [`kpi`]: summary indicators

pub mod audit;
pub mod kpi;

pub use audit::audit;
pub use kpi::RosterKpi;

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::models::{CoverageRequirement, RosterSchedule};
use crate::problem::RosterProblem;

/// (day, shift ID, area ID).
pub type SlotKey = (u32, String, String);

/// Coverage of one required slot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CoverageGap {
    /// Day index.
    pub day: u32,
    /// Shift period ID.
    pub shift: String,
    /// Duty area ID.
    pub area: String,
    /// Required headcount.
    pub required: u32,
    /// Assigned headcount.
    pub assigned: u32,
    /// `max(0, required − assigned)`.
    pub shortfall: u32,
}

/// Load of one worker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkerLoad {
    /// Assigned days.
    pub assigned: u32,
    /// Effective capacity.
    pub cap: u32,
    /// `cap − assigned`; negative when over capacity.
    pub remaining: i64,
}

/// Headcount per (day, shift, area).
pub fn per_slot_headcount(schedule: &RosterSchedule) -> BTreeMap<SlotKey, u32> {
    let mut counts = BTreeMap::new();
    for a in &schedule.assignments {
        *counts
            .entry((a.day, a.shift.clone(), a.area.clone()))
            .or_insert(0) += 1;
    }
    counts
}

/// Headcount per (day, shift), summed over areas.
pub fn per_shift_headcount(schedule: &RosterSchedule) -> BTreeMap<(u32, String), u32> {
    let mut counts = BTreeMap::new();
    for a in &schedule.assignments {
        *counts.entry((a.day, a.shift.clone())).or_insert(0) += 1;
    }
    counts
}

/// One entry per required slot, ordered by (day, shift, area).
///
/// Repeated requirement entries for the same slot are summed.
pub fn coverage_gaps(
    schedule: &RosterSchedule,
    requirements: &CoverageRequirement,
) -> Vec<CoverageGap> {
    let headcount = per_slot_headcount(schedule);
    let mut required: BTreeMap<SlotKey, u32> = BTreeMap::new();
    for e in &requirements.entries {
        *required
            .entry((e.day, e.shift.clone(), e.area.clone()))
            .or_insert(0) += e.min_headcount;
    }

    required
        .into_iter()
        .map(|(key, required)| {
            let assigned = headcount.get(&key).copied().unwrap_or(0);
            let (day, shift, area) = key;
            CoverageGap {
                day,
                shift,
                area,
                required,
                assigned,
                shortfall: required.saturating_sub(assigned),
            }
        })
        .collect()
}

/// Sum of shortfalls.
pub fn total_shortfall(gaps: &[CoverageGap]) -> u64 {
    gaps.iter().map(|g| g.shortfall as u64).sum()
}

/// Assigned days, capacity, and remaining capacity per configured worker.
pub fn per_worker_load(
    schedule: &RosterSchedule,
    problem: &RosterProblem,
) -> BTreeMap<String, WorkerLoad> {
    let days = schedule.days_per_worker();
    problem
        .workers()
        .iter()
        .map(|w| {
            let assigned = days.get(w.id.as_str()).copied().unwrap_or(0);
            let load = WorkerLoad {
                assigned,
                cap: w.capacity,
                remaining: w.capacity as i64 - assigned as i64,
            };
            (w.id.clone(), load)
        })
        .collect()
}
