//! Resolved roster problem (domain & constraint model).
//!
//! [`RosterProblem`] is the immutable, dense-index form of a validated
//! [`RosterConfig`]. Both engines and the reports read eligibility,
//! capacity, locks, requirements, and rest legality from it.
//!
//! # Indexing
//!
//! - Workers, days, shifts, and areas are `usize` indices in config order.
//! - A *combination* is a (shift, area) pair: `combo = shift * areas + area`.
//! - A *slot* is a (day, shift, area) triple:
//!   `slot = (day * shifts + shift) * areas + area`.

mod lock;

pub use lock::{Lock, LockTable};

use std::collections::HashMap;

use tracing::debug;

use crate::error::RosterError;
use crate::models::{Assignment, GlobalRules, RosterConfig, RosterSchedule};
use crate::validation::{effective_capacity, validate_config};

/// Per-worker eligibility and capacity, resolved to indices.
#[derive(Debug, Clone)]
pub struct WorkerProfile {
    /// Worker ID.
    pub id: String,
    /// Qualification group index.
    pub group: usize,
    /// Configured monthly cap.
    pub monthly_cap: i32,
    /// Effective capacity (cap limited by the off-days floor).
    pub capacity: u32,
    /// `eligible[combo]`: whether the worker may work that combination.
    pub eligible: Vec<bool>,
    /// Eligible combination indices, ascending.
    pub eligible_combos: Vec<usize>,
}

/// Rough supply/demand check over the horizon.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FeasibilityEstimate {
    /// Worker-days needed: max of total coverage demand and the band floor.
    pub min_needed: u64,
    /// Worker-days available: sum of effective capacities.
    pub max_capacity: u64,
}

impl FeasibilityEstimate {
    /// Whether capacity can cover the minimum demand.
    pub fn is_plausible(&self) -> bool {
        self.min_needed <= self.max_capacity
    }
}

/// Dense, immutable roster problem.
#[derive(Debug, Clone)]
pub struct RosterProblem {
    config: RosterConfig,
    days: usize,
    shift_count: usize,
    area_count: usize,
    workers: Vec<WorkerProfile>,
    requirements: Vec<u32>,
    rest_ok: Vec<bool>,
    locks: LockTable,
    worker_index: HashMap<String, usize>,
    shift_index: HashMap<String, usize>,
    area_index: HashMap<String, usize>,
}

impl RosterProblem {
    /// Validates and resolves a configuration.
    ///
    /// # Errors
    /// [`RosterError::InvalidConfiguration`] with every validation finding.
    pub fn new(config: &RosterConfig) -> Result<Self, RosterError> {
        validate_config(config)?;

        let days = config.days as usize;
        let shift_count = config.shifts.len();
        let area_count = config.areas.len();
        let combos = shift_count * area_count;

        let shift_index: HashMap<String, usize> = config
            .shifts
            .iter()
            .enumerate()
            .map(|(i, s)| (s.id.clone(), i))
            .collect();
        let area_index: HashMap<String, usize> = config
            .areas
            .iter()
            .enumerate()
            .map(|(i, a)| (a.id.clone(), i))
            .collect();
        let group_index: HashMap<&str, usize> = config
            .groups
            .iter()
            .enumerate()
            .map(|(i, g)| (g.id.as_str(), i))
            .collect();
        let worker_index: HashMap<String, usize> = config
            .workers
            .iter()
            .enumerate()
            .map(|(i, w)| (w.id.clone(), i))
            .collect();

        let mut workers = Vec::with_capacity(config.workers.len());
        for w in &config.workers {
            // Validated: the group exists.
            let group = group_index.get(w.group.as_str()).copied().unwrap_or(0);
            let group_def = &config.groups[group];
            let mut eligible = vec![false; combos];
            for (s, shift) in config.shifts.iter().enumerate() {
                if !w.allows_shift(&shift.id) {
                    continue;
                }
                for (a, area) in config.areas.iter().enumerate() {
                    if group_def.allows(&area.id) {
                        eligible[s * area_count + a] = true;
                    }
                }
            }
            let eligible_combos = (0..combos).filter(|&k| eligible[k]).collect();
            workers.push(WorkerProfile {
                id: w.id.clone(),
                group,
                monthly_cap: w.monthly_cap,
                capacity: effective_capacity(
                    w.monthly_cap,
                    config.days,
                    config.rules.min_off_days_per_horizon,
                ),
                eligible,
                eligible_combos,
            });
        }

        let mut requirements = vec![0u32; days * combos];
        for e in &config.coverage.entries {
            let s = shift_index[&e.shift];
            let a = area_index[&e.area];
            requirements[(e.day as usize * shift_count + s) * area_count + a] += e.min_headcount;
        }

        let min_rest = config.rules.min_rest_minutes();
        let mut rest_ok = vec![true; shift_count * shift_count];
        for (s1, prev) in config.shifts.iter().enumerate() {
            for (s2, next) in config.shifts.iter().enumerate() {
                rest_ok[s1 * shift_count + s2] = prev.rest_minutes_before(next) >= min_rest;
            }
        }

        let locks = LockTable::from_workers(&config.workers, days, |shift, area| {
            let s = shift_index.get(shift)?;
            let a = area_index.get(area)?;
            Some(s * area_count + a)
        });

        debug!(
            workers = workers.len(),
            days,
            shifts = shift_count,
            areas = area_count,
            locks = locks.len(),
            "resolved roster problem"
        );

        Ok(Self {
            config: config.clone(),
            days,
            shift_count,
            area_count,
            workers,
            requirements,
            rest_ok,
            locks,
            worker_index,
            shift_index,
            area_index,
        })
    }

    /// The source configuration.
    pub fn config(&self) -> &RosterConfig {
        &self.config
    }

    /// Labor rules.
    pub fn rules(&self) -> &GlobalRules {
        &self.config.rules
    }

    /// Number of workers.
    #[inline]
    pub fn worker_count(&self) -> usize {
        self.workers.len()
    }

    /// Number of days.
    #[inline]
    pub fn days(&self) -> usize {
        self.days
    }

    /// Number of shift periods.
    #[inline]
    pub fn shift_count(&self) -> usize {
        self.shift_count
    }

    /// Number of duty areas.
    #[inline]
    pub fn area_count(&self) -> usize {
        self.area_count
    }

    /// Number of (shift, area) combinations.
    #[inline]
    pub fn combo_count(&self) -> usize {
        self.shift_count * self.area_count
    }

    /// Combination index of (shift, area).
    #[inline]
    pub fn combo(&self, shift: usize, area: usize) -> usize {
        shift * self.area_count + area
    }

    /// Splits a combination into (shift, area).
    #[inline]
    pub fn split_combo(&self, combo: usize) -> (usize, usize) {
        (combo / self.area_count, combo % self.area_count)
    }

    /// Slot index of (day, shift, area).
    #[inline]
    pub fn slot(&self, day: usize, shift: usize, area: usize) -> usize {
        (day * self.shift_count + shift) * self.area_count + area
    }

    /// Worker profiles.
    pub fn workers(&self) -> &[WorkerProfile] {
        &self.workers
    }

    /// One worker's profile.
    pub fn worker(&self, worker: usize) -> &WorkerProfile {
        &self.workers[worker]
    }

    /// Whether `worker` may work `shift` in `area`.
    ///
    /// True iff the area is open to the worker's group and the shift is
    /// in the worker's allowed set.
    #[inline]
    pub fn is_eligible(&self, worker: usize, shift: usize, area: usize) -> bool {
        self.workers[worker].eligible[self.combo(shift, area)]
    }

    /// Effective working-day capacity of a worker.
    #[inline]
    pub fn capacity_of(&self, worker: usize) -> u32 {
        self.workers[worker].capacity
    }

    /// The lock on (worker, day), if any.
    #[inline]
    pub fn lock_of(&self, worker: usize, day: usize) -> Option<Lock> {
        self.locks.get(worker, day)
    }

    /// The full lock table.
    pub fn locks(&self) -> &LockTable {
        &self.locks
    }

    /// Required headcount of a slot.
    #[inline]
    pub fn required(&self, day: usize, shift: usize, area: usize) -> u32 {
        self.requirements[self.slot(day, shift, area)]
    }

    /// Total required headcount over the horizon.
    pub fn total_demand(&self) -> u64 {
        self.requirements.iter().map(|&r| r as u64).sum()
    }

    /// Whether working `prev` on day d and `next` on day d + 1 leaves enough rest.
    #[inline]
    pub fn rest_allows(&self, prev: usize, next: usize) -> bool {
        self.rest_ok[prev * self.shift_count + next]
    }

    /// Index of a worker ID.
    pub fn worker_index(&self, id: &str) -> Option<usize> {
        self.worker_index.get(id).copied()
    }

    /// Index of a shift ID.
    pub fn shift_index(&self, id: &str) -> Option<usize> {
        self.shift_index.get(id).copied()
    }

    /// Index of an area ID.
    pub fn area_index(&self, id: &str) -> Option<usize> {
        self.area_index.get(id).copied()
    }

    /// Shift ID of a shift index.
    pub fn shift_id(&self, shift: usize) -> &str {
        &self.config.shifts[shift].id
    }

    /// Area ID of an area index.
    pub fn area_id(&self, area: usize) -> &str {
        &self.config.areas[area].id
    }

    /// Worker IDs in row order.
    pub fn worker_ids(&self) -> Vec<String> {
        self.workers.iter().map(|w| w.id.clone()).collect()
    }

    /// Supply/demand estimate.
    pub fn feasibility_estimate(&self) -> FeasibilityEstimate {
        let band_floor =
            (self.days * self.shift_count) as u64 * self.rules().min_headcount_per_shift as u64;
        FeasibilityEstimate {
            min_needed: self.total_demand().max(band_floor),
            max_capacity: self.workers.iter().map(|w| w.capacity as u64).sum(),
        }
    }

    /// Decodes dense cells into a roster.
    ///
    /// `cells[worker * days + day]` is the worked combination or `None`.
    /// Assignments come out worker-major, then by day.
    pub fn decode_cells(&self, cells: &[Option<usize>]) -> RosterSchedule {
        let mut schedule = RosterSchedule::new();
        for (w, profile) in self.workers.iter().enumerate() {
            for d in 0..self.days {
                if let Some(Some(combo)) = cells.get(w * self.days + d) {
                    let (s, a) = self.split_combo(*combo);
                    schedule.add_assignment(Assignment::new(
                        &profile.id,
                        d as u32,
                        self.shift_id(s),
                        self.area_id(a),
                    ));
                }
            }
        }
        schedule
    }
}
