//! Per-run roster configuration.
//!
//! A `RosterConfig` is the complete, immutable input of one planning
//! run: horizon, catalog, workers, coverage, and rules. It is validated
//! and resolved into a [`RosterProblem`](crate::problem::RosterProblem)
//! before either engine runs.

use serde::{Deserialize, Serialize};

use super::{CoverageRequirement, DutyArea, GlobalRules, QualificationGroup, ShiftPeriod, Worker};
use crate::error::RosterError;

/// Complete input of one roster run.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RosterConfig {
    /// Number of days in the planning horizon.
    pub days: u32,
    /// Shift periods.
    pub shifts: Vec<ShiftPeriod>,
    /// Duty areas.
    pub areas: Vec<DutyArea>,
    /// Qualification groups.
    pub groups: Vec<QualificationGroup>,
    /// Workers.
    pub workers: Vec<Worker>,
    /// Minimum headcount per slot.
    #[serde(default)]
    pub coverage: CoverageRequirement,
    /// Labor rules.
    #[serde(default)]
    pub rules: GlobalRules,
}

impl RosterConfig {
    /// Creates an empty configuration over `days` days.
    pub fn new(days: u32) -> Self {
        Self {
            days,
            ..Self::default()
        }
    }

    /// Parses a configuration from JSON.
    pub fn from_json(json: &str) -> Result<Self, RosterError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Serializes the configuration to pretty JSON.
    pub fn to_json(&self) -> Result<String, RosterError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Adds a shift period.
    pub fn with_shift(mut self, shift: ShiftPeriod) -> Self {
        self.shifts.push(shift);
        self
    }

    /// Adds a duty area.
    pub fn with_area(mut self, id: impl Into<String>) -> Self {
        self.areas.push(DutyArea::new(id));
        self
    }

    /// Adds a qualification group.
    pub fn with_group(mut self, group: QualificationGroup) -> Self {
        self.groups.push(group);
        self
    }

    /// Adds a worker.
    pub fn with_worker(mut self, worker: Worker) -> Self {
        self.workers.push(worker);
        self
    }

    /// Sets the coverage requirements.
    pub fn with_coverage(mut self, coverage: CoverageRequirement) -> Self {
        self.coverage = coverage;
        self
    }

    /// Sets the labor rules.
    pub fn with_rules(mut self, rules: GlobalRules) -> Self {
        self.rules = rules;
        self
    }
}
