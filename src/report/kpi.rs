//! Roster quality metrics (KPIs).
//!
//! # Metrics
//!
//! | Metric | Definition |
//! |--------|-----------|
//! | Assigned total | Number of assignments |
//! | Required total | Σ required headcount |
//! | Total shortfall | Σ max(0, required − assigned) over required slots |
//! | Coverage rate | 1 − shortfall / required (1.0 when nothing is required) |
//! | Load statistics | Min / max / mean / std-dev of assigned days per worker |
//! | Band violations | Σ over (day, shift) of distance outside the headcount band |
//!
//! # Reference
//! Burke et al. (2004), "The State of the Art of Nurse Rostering", §5 (evaluation)

use serde::{Deserialize, Serialize};

use super::{coverage_gaps, per_shift_headcount, per_worker_load, total_shortfall};
use crate::models::RosterSchedule;
use crate::problem::RosterProblem;

/// Roster performance indicators.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RosterKpi {
    /// Number of assignments.
    pub assigned_total: u64,
    /// Total required headcount.
    pub required_total: u64,
    /// Total unmet headcount.
    pub total_shortfall: u64,
    /// Fraction of required headcount met (0.0..=1.0).
    pub coverage_rate: f64,
    /// Fewest days assigned to a worker.
    pub min_load: u32,
    /// Most days assigned to a worker.
    pub max_load: u32,
    /// Mean assigned days per worker.
    pub mean_load: f64,
    /// Population standard deviation of assigned days.
    pub load_std_dev: f64,
    /// Headcount outside the per-shift band, summed over (day, shift).
    pub band_violations: u64,
}

impl RosterKpi {
    /// Computes KPIs for a roster of `problem`.
    pub fn calculate(schedule: &RosterSchedule, problem: &RosterProblem) -> Self {
        let config = problem.config();
        let gaps = coverage_gaps(schedule, &config.coverage);
        let required_total: u64 = gaps.iter().map(|g| g.required as u64).sum();
        let total_shortfall = total_shortfall(&gaps);
        let coverage_rate = if required_total == 0 {
            1.0
        } else {
            1.0 - total_shortfall as f64 / required_total as f64
        };

        let loads: Vec<u32> = per_worker_load(schedule, problem)
            .values()
            .map(|l| l.assigned)
            .collect();
        let (mean_load, load_std_dev) = if loads.is_empty() {
            (0.0, 0.0)
        } else {
            let n = loads.len() as f64;
            let mean = loads.iter().map(|&l| l as f64).sum::<f64>() / n;
            let var = loads
                .iter()
                .map(|&l| (l as f64 - mean).powi(2))
                .sum::<f64>()
                / n;
            (mean, var.sqrt())
        };

        let rules = problem.rules();
        let totals = per_shift_headcount(schedule);
        let mut band_violations = 0u64;
        for d in 0..config.days {
            for shift in &config.shifts {
                let total = totals.get(&(d, shift.id.clone())).copied().unwrap_or(0);
                band_violations += rules.min_headcount_per_shift.saturating_sub(total) as u64
                    + total.saturating_sub(rules.max_headcount_per_shift) as u64;
            }
        }

        Self {
            assigned_total: schedule.assignment_count() as u64,
            required_total,
            total_shortfall,
            coverage_rate,
            min_load: loads.iter().copied().min().unwrap_or(0),
            max_load: loads.iter().copied().max().unwrap_or(0),
            mean_load,
            load_std_dev,
            band_violations,
        }
    }

    /// Whether the roster meets the given quality thresholds.
    pub fn meets_thresholds(&self, max_shortfall: u64, min_coverage_rate: f64) -> bool {
        self.total_shortfall <= max_shortfall && self.coverage_rate >= min_coverage_rate
    }
}
