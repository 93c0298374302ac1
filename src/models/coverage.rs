//! Coverage requirements and roster rules.
//!
//! A coverage requirement maps a slot (day, shift period, duty area)
//! to a minimum headcount. Slots not listed require nobody.
//!
//! `GlobalRules` holds the labor rules that apply to every worker.

use serde::{Deserialize, Serialize};

/// Minimum headcount for one slot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CoverageEntry {
    /// Day index (0-based).
    pub day: u32,
    /// Shift period ID.
    pub shift: String,
    /// Duty area ID.
    pub area: String,
    /// Minimum number of workers.
    pub min_headcount: u32,
}

/// All coverage requirements of a horizon.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CoverageRequirement {
    /// Listed slots.
    pub entries: Vec<CoverageEntry>,
}

impl CoverageRequirement {
    /// Creates an empty requirement set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Same per-area headcount for every day and every shift.
    ///
    /// `per_area` holds `(area_id, min_headcount)` pairs.
    pub fn uniform(days: u32, shifts: &[&str], per_area: &[(&str, u32)]) -> Self {
        let mut req = Self::new();
        for day in 0..days {
            for shift in shifts {
                for (area, count) in per_area {
                    req = req.with(day, *shift, *area, *count);
                }
            }
        }
        req
    }

    /// Adds a slot requirement.
    pub fn with(
        mut self,
        day: u32,
        shift: impl Into<String>,
        area: impl Into<String>,
        min_headcount: u32,
    ) -> Self {
        self.entries.push(CoverageEntry {
            day,
            shift: shift.into(),
            area: area.into(),
            min_headcount,
        });
        self
    }

    /// Required headcount for a slot (0 if unlisted).
    pub fn required(&self, day: u32, shift: &str, area: &str) -> u32 {
        self.entries
            .iter()
            .filter(|e| e.day == day && e.shift == shift && e.area == area)
            .map(|e| e.min_headcount)
            .sum()
    }

    /// Total headcount demanded over the horizon.
    pub fn total_demand(&self) -> u64 {
        self.entries.iter().map(|e| e.min_headcount as u64).sum()
    }

    /// Number of listed slots.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether no slot is listed.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Labor rules applying to every worker and shift.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct GlobalRules {
    /// Minimum rest days per worker over the horizon.
    pub min_off_days_per_horizon: u32,
    /// Maximum run of consecutive working days.
    pub max_consecutive_days: u32,
    /// Minimum hours between the end of one shift and the next day's start.
    pub min_rest_hours: u32,
    /// Lower bound on the total headcount of each (day, shift).
    pub min_headcount_per_shift: u32,
    /// Upper bound on the total headcount of each (day, shift).
    pub max_headcount_per_shift: u32,
}

impl Default for GlobalRules {
    fn default() -> Self {
        Self {
            min_off_days_per_horizon: 0,
            max_consecutive_days: 6,
            min_rest_hours: 0,
            min_headcount_per_shift: 0,
            max_headcount_per_shift: u32::MAX,
        }
    }
}

impl GlobalRules {
    /// Sets the minimum off-days floor.
    pub fn with_min_off_days(mut self, days: u32) -> Self {
        self.min_off_days_per_horizon = days;
        self
    }

    /// Sets the maximum consecutive working days.
    pub fn with_max_consecutive_days(mut self, days: u32) -> Self {
        self.max_consecutive_days = days;
        self
    }

    /// Sets the minimum rest interval (hours).
    pub fn with_min_rest_hours(mut self, hours: u32) -> Self {
        self.min_rest_hours = hours;
        self
    }

    /// Sets the per-shift total headcount band.
    pub fn with_headcount_band(mut self, min: u32, max: u32) -> Self {
        self.min_headcount_per_shift = min;
        self.max_headcount_per_shift = max;
        self
    }

    /// Minimum rest interval in minutes.
    #[inline]
    pub fn min_rest_minutes(&self) -> i64 {
        self.min_rest_hours as i64 * 60
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_uniform_coverage() {
        let req = CoverageRequirement::uniform(
            2,
            &["morning", "night"],
            &[("triage", 2), ("resus", 1)],
        );
        assert_eq!(req.len(), 8);
        assert_eq!(req.required(1, "night", "triage"), 2);
        assert_eq!(req.required(1, "night", "unknown"), 0);
        assert_eq!(req.total_demand(), 12);
    }

    #[test]
    fn test_rules_defaults_from_partial_json() {
        let rules: GlobalRules = serde_json::from_str(r#"{ "minRestHours": 11 }"#).unwrap();
        assert_eq!(rules.min_rest_hours, 11);
        assert_eq!(rules.max_consecutive_days, 6);
        assert_eq!(rules.max_headcount_per_shift, u32::MAX);
        assert_eq!(rules.min_rest_minutes(), 660);
    }

    #[test]
    fn test_coverage_is_a_plain_list_in_json() {
        let req = CoverageRequirement::new().with(0, "morning", "triage", 3);
        let json = serde_json::to_string(&req).unwrap();
        assert!(json.starts_with('['));
        assert!(json.contains("minHeadcount"));
    }
}
