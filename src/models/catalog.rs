//! Shift-period and duty-area catalog.
//!
//! Shift periods carry clock times used for rest-interval computation.
//! Duty areas are plain identifiers, grouped into eligibility sets by
//! qualification group.
//!
//! # Time Model
//! Shift times are minutes from local midnight, in `[0, 1440)`.
//! A shift whose end is not after its start crosses midnight and ends
//! on the following calendar day.

use serde::{Deserialize, Serialize};

/// Minutes in one day.
pub const MINUTES_PER_DAY: u32 = 1440;

/// A shift period (e.g., morning, evening, night).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShiftPeriod {
    /// Unique shift identifier.
    pub id: String,
    /// Start time (minutes from midnight).
    pub start_minute: u32,
    /// End time (minutes from midnight). `<= start_minute` crosses midnight.
    pub end_minute: u32,
}

impl ShiftPeriod {
    /// Creates a new shift period.
    pub fn new(id: impl Into<String>, start_minute: u32, end_minute: u32) -> Self {
        Self {
            id: id.into(),
            start_minute,
            end_minute,
        }
    }

    /// Whether the shift ends on the next calendar day.
    #[inline]
    pub fn crosses_midnight(&self) -> bool {
        self.end_minute <= self.start_minute
    }

    /// End time measured from the midnight that starts the shift's day.
    #[inline]
    pub fn absolute_end_minute(&self) -> u32 {
        if self.crosses_midnight() {
            self.end_minute + MINUTES_PER_DAY
        } else {
            self.end_minute
        }
    }

    /// Shift length in minutes.
    #[inline]
    pub fn duration_minutes(&self) -> u32 {
        self.absolute_end_minute() - self.start_minute
    }

    /// Rest (minutes) between this shift on day `d` and `next` on day `d + 1`.
    ///
    /// Negative when the shifts overlap.
    pub fn rest_minutes_before(&self, next: &ShiftPeriod) -> i64 {
        (MINUTES_PER_DAY + next.start_minute) as i64 - self.absolute_end_minute() as i64
    }
}

/// A duty area (e.g., triage, resuscitation).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DutyArea {
    /// Unique area identifier.
    pub id: String,
}

impl DutyArea {
    /// Creates a new duty area.
    pub fn new(id: impl Into<String>) -> Self {
        Self { id: id.into() }
    }
}

/// A qualification group: the set of duty areas its members may staff.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QualificationGroup {
    /// Unique group identifier.
    pub id: String,
    /// Duty area IDs open to this group.
    pub areas: Vec<String>,
}

impl QualificationGroup {
    /// Creates a group with no areas.
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            areas: Vec::new(),
        }
    }

    /// Sets the allowed areas.
    pub fn with_areas<I, S>(mut self, areas: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.areas = areas.into_iter().map(Into::into).collect();
        self
    }

    /// Whether members of this group may staff `area_id`.
    pub fn allows(&self, area_id: &str) -> bool {
        self.areas.iter().any(|a| a == area_id)
    }
}
