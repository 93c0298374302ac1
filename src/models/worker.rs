//! Worker model.
//!
//! Workers are the staff being rostered. Each worker belongs to one
//! qualification group (which decides the duty areas open to them),
//! has a monthly capacity of working days, an optional restriction on
//! shift periods, a few requested off-days, and per-day fixed overrides.
//!
//! Days are 0-based indices into the planning horizon.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// Recommended maximum number of requested off-days per worker.
pub const MAX_OFF_DAYS: usize = 3;

/// A worker to be rostered.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Worker {
    /// Unique worker identifier.
    pub id: String,
    /// Qualification group ID.
    pub group: String,
    /// Maximum number of assigned days over the horizon.
    pub monthly_cap: i32,
    /// Allowed shift period IDs. `None` = all shifts.
    #[serde(default)]
    pub allowed_shifts: Option<BTreeSet<String>>,
    /// Requested off-days (forced rest).
    #[serde(default)]
    pub off_days: BTreeSet<u32>,
    /// Fixed per-day overrides (day → forced work or rest).
    #[serde(default)]
    pub fixed: BTreeMap<u32, FixedOverride>,
}

/// A forced value for one (worker, day) cell.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum FixedOverride {
    /// The worker must rest that day.
    Rest,
    /// The worker must work the given shift in the given area.
    Work {
        /// Shift period ID.
        shift: String,
        /// Duty area ID.
        area: String,
    },
}

impl FixedOverride {
    /// Creates a working override.
    pub fn work(shift: impl Into<String>, area: impl Into<String>) -> Self {
        Self::Work {
            shift: shift.into(),
            area: area.into(),
        }
    }
}

impl Worker {
    /// Creates a worker with the given group and capacity.
    pub fn new(id: impl Into<String>, group: impl Into<String>, monthly_cap: i32) -> Self {
        Self {
            id: id.into(),
            group: group.into(),
            monthly_cap,
            allowed_shifts: None,
            off_days: BTreeSet::new(),
            fixed: BTreeMap::new(),
        }
    }

    /// Restricts the worker to the given shift periods.
    pub fn with_allowed_shifts<I, S>(mut self, shifts: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.allowed_shifts = Some(shifts.into_iter().map(Into::into).collect());
        self
    }

    /// Adds a requested off-day.
    pub fn with_off_day(mut self, day: u32) -> Self {
        self.off_days.insert(day);
        self
    }

    /// Forces rest on `day`.
    pub fn with_fixed_rest(mut self, day: u32) -> Self {
        self.fixed.insert(day, FixedOverride::Rest);
        self
    }

    /// Forces a working assignment on `day`.
    pub fn with_fixed_work(
        mut self,
        day: u32,
        shift: impl Into<String>,
        area: impl Into<String>,
    ) -> Self {
        self.fixed.insert(day, FixedOverride::work(shift, area));
        self
    }

    /// Whether the worker may work `shift_id` (ignores area eligibility).
    pub fn allows_shift(&self, shift_id: &str) -> bool {
        match &self.allowed_shifts {
            None => true,
            Some(set) => set.contains(shift_id),
        }
    }
}
