//! Roster (solution) model.
//!
//! A roster is the set of (worker, day, shift, area) assignments for a
//! horizon. Both engines emit the same type; a worker with no assignment
//! on a day is resting.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// One worker working one shift in one area on one day.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Assignment {
    /// Worker ID.
    pub worker: String,
    /// Day index (0-based).
    pub day: u32,
    /// Shift period ID.
    pub shift: String,
    /// Duty area ID.
    pub area: String,
}

impl Assignment {
    /// Creates a new assignment.
    pub fn new(
        worker: impl Into<String>,
        day: u32,
        shift: impl Into<String>,
        area: impl Into<String>,
    ) -> Self {
        Self {
            worker: worker.into(),
            day,
            shift: shift.into(),
            area: area.into(),
        }
    }
}

/// A complete roster for one horizon.
///
/// Assignments are kept in the order they were added; engines add them
/// worker-major, then by day.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RosterSchedule {
    /// All assignments.
    pub assignments: Vec<Assignment>,
}

/// A detected rule violation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Violation {
    /// Type of violation.
    pub violation_type: ViolationType,
    /// Worker concerned.
    pub worker: String,
    /// Day concerned (first day of the offending window, if any).
    pub day: Option<u32>,
    /// Human-readable description.
    pub message: String,
}

/// Classification of roster violations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ViolationType {
    /// Two assignments for one worker on one day.
    DoubleBooking,
    /// Shift or area outside the worker's allowed set.
    Ineligible,
    /// More assigned days than the worker's capacity.
    CapacityExceeded,
    /// More than the allowed run of consecutive working days.
    RunLength,
    /// Too little rest between shifts on adjacent days.
    RestInterval,
    /// A locked cell was not honored.
    LockBroken,
    /// Assignment references an unknown worker, shift, area, or day.
    UnknownReference,
}

impl Violation {
    /// Creates a violation.
    pub fn new(
        violation_type: ViolationType,
        worker: impl Into<String>,
        day: Option<u32>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            violation_type,
            worker: worker.into(),
            day,
            message: message.into(),
        }
    }
}

impl RosterSchedule {
    /// Creates an empty roster.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds an assignment.
    pub fn add_assignment(&mut self, assignment: Assignment) {
        self.assignments.push(assignment);
    }

    /// Number of assignments.
    pub fn assignment_count(&self) -> usize {
        self.assignments.len()
    }

    /// Whether nobody is assigned.
    pub fn is_empty(&self) -> bool {
        self.assignments.is_empty()
    }

    /// All assignments of a worker.
    pub fn assignments_for_worker(&self, worker: &str) -> Vec<&Assignment> {
        self.assignments
            .iter()
            .filter(|a| a.worker == worker)
            .collect()
    }

    /// All assignments on a day.
    pub fn assignments_on_day(&self, day: u32) -> Vec<&Assignment> {
        self.assignments.iter().filter(|a| a.day == day).collect()
    }

    /// The assignment of `worker` on `day`, if any.
    pub fn assignment_of(&self, worker: &str, day: u32) -> Option<&Assignment> {
        self.assignments
            .iter()
            .find(|a| a.worker == worker && a.day == day)
    }

    /// Distinct assigned days per worker.
    ///
    /// Double bookings count once per day.
    pub fn days_per_worker(&self) -> BTreeMap<&str, u32> {
        let mut seen: BTreeMap<&str, Vec<u32>> = BTreeMap::new();
        for a in &self.assignments {
            let days = seen.entry(a.worker.as_str()).or_default();
            if !days.contains(&a.day) {
                days.push(a.day);
            }
        }
        seen.into_iter()
            .map(|(w, days)| (w, days.len() as u32))
            .collect()
    }

    /// Assignments in (worker, day, shift, area) order.
    pub fn sorted(&self) -> Vec<&Assignment> {
        let mut list: Vec<&Assignment> = self.assignments.iter().collect();
        list.sort();
        list
    }
}

/// Worker × day matrix view of a roster.
///
/// `cells[w][d]` is `Some((shift, area))` when worker `w` works day `d`,
/// `None` when resting. Rows follow `workers`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RosterGrid {
    /// Row labels (worker IDs).
    pub workers: Vec<String>,
    /// Number of day columns.
    pub days: u32,
    /// Cell contents.
    pub cells: Vec<Vec<Option<(String, String)>>>,
}

impl RosterGrid {
    /// Builds the grid for the given workers and horizon.
    ///
    /// Assignments to unknown workers or days outside the horizon are
    /// dropped; on a double booking the first assignment wins.
    pub fn from_schedule(schedule: &RosterSchedule, workers: &[String], days: u32) -> Self {
        let mut cells = vec![vec![None; days as usize]; workers.len()];
        let row_of: BTreeMap<&str, usize> = workers
            .iter()
            .enumerate()
            .map(|(i, w)| (w.as_str(), i))
            .collect();

        for a in &schedule.assignments {
            if let Some(&row) = row_of.get(a.worker.as_str()) {
                if let Some(cell) = cells[row].get_mut(a.day as usize) {
                    if cell.is_none() {
                        *cell = Some((a.shift.clone(), a.area.clone()));
                    }
                }
            }
        }

        Self {
            workers: workers.to_vec(),
            days,
            cells,
        }
    }

    /// Number of working cells in a row.
    pub fn worked_days(&self, row: usize) -> usize {
        self.cells
            .get(row)
            .map(|r| r.iter().filter(|c| c.is_some()).count())
            .unwrap_or(0)
    }
}
