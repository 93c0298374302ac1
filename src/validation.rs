//! Input validation for roster configurations.
//!
//! Checks structural integrity of a [`RosterConfig`] before search.
//! Detects:
//! - Duplicate IDs (shifts, areas, groups, workers, coverage slots)
//! - Unknown group / shift / area references
//! - Negative capacities and too many requested off-days
//! - Days outside the horizon
//! - Conflicting, ineligible, or over-capacity locks
//! - Inconsistent rules and malformed shift times
//!
//! Every check runs; all findings are reported together.

use std::collections::HashSet;

use thiserror::Error;

use crate::models::{FixedOverride, RosterConfig, MAX_OFF_DAYS, MINUTES_PER_DAY};

/// Validation result.
pub type ValidationResult = Result<(), Vec<ConfigurationError>>;

/// A configuration error.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("{message}")]
pub struct ConfigurationError {
    /// Error category.
    pub kind: ConfigurationErrorKind,
    /// Human-readable description.
    pub message: String,
}

/// Categories of configuration errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigurationErrorKind {
    /// Two entities share the same ID.
    DuplicateId,
    /// A reference to a group, shift, or area that doesn't exist.
    UnknownReference,
    /// A worker has a negative monthly capacity.
    NegativeCapacity,
    /// A worker requests more off-days than allowed.
    TooManyOffDays,
    /// A day index lies outside the horizon.
    DayOutOfHorizon,
    /// A working override falls on a requested off-day.
    ConflictingLock,
    /// A working override uses a shift or area the worker may not work.
    IneligibleLock,
    /// Working overrides exceed the worker's effective capacity.
    LockExceedsCapacity,
    /// Global rules are inconsistent.
    InvalidRule,
    /// A shift period has malformed times.
    InvalidShift,
    /// An engine parameter is out of range.
    InvalidParameter,
    /// The (shift, area) catalog is too large to encode.
    ModelTooLarge,
}

impl ConfigurationError {
    pub(crate) fn new(kind: ConfigurationErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

/// Effective working-day capacity of a worker.
///
/// The configured cap, further limited by the off-days floor.
pub fn effective_capacity(monthly_cap: i32, days: u32, min_off_days: u32) -> u32 {
    let cap = monthly_cap.max(0) as u32;
    cap.min(days.saturating_sub(min_off_days))
}

/// Most (shift, area) combinations a roster can encode.
pub const MAX_COMBINATIONS: usize = i16::MAX as usize + 1;

/// Validates a roster configuration.
///
/// # Returns
/// `Ok(())` if all checks pass, `Err(errors)` with all detected issues.
pub fn validate_config(config: &RosterConfig) -> ValidationResult {
    use ConfigurationErrorKind as K;

    let mut errors = Vec::new();
    let days = config.days;
    let rules = &config.rules;

    if days == 0 {
        errors.push(ConfigurationError::new(
            K::InvalidRule,
            "Horizon must contain at least one day",
        ));
    }
    if rules.max_consecutive_days == 0 {
        errors.push(ConfigurationError::new(
            K::InvalidRule,
            "maxConsecutiveDays must be at least 1",
        ));
    }
    if rules.min_headcount_per_shift > rules.max_headcount_per_shift {
        errors.push(ConfigurationError::new(
            K::InvalidRule,
            format!(
                "minHeadcountPerShift ({}) exceeds maxHeadcountPerShift ({})",
                rules.min_headcount_per_shift, rules.max_headcount_per_shift
            ),
        ));
    }
    if rules.min_off_days_per_horizon > days {
        errors.push(ConfigurationError::new(
            K::InvalidRule,
            format!(
                "minOffDaysPerHorizon ({}) exceeds the horizon ({days} days)",
                rules.min_off_days_per_horizon
            ),
        ));
    }

    // Catalog
    let mut shift_ids = HashSet::new();
    for s in &config.shifts {
        if !shift_ids.insert(s.id.as_str()) {
            errors.push(ConfigurationError::new(
                K::DuplicateId,
                format!("Duplicate shift ID: {}", s.id),
            ));
        }
        if s.start_minute >= MINUTES_PER_DAY || s.end_minute >= MINUTES_PER_DAY {
            errors.push(ConfigurationError::new(
                K::InvalidShift,
                format!("Shift '{}' has a time outside [0, 1440) minutes", s.id),
            ));
        } else if s.start_minute == s.end_minute {
            errors.push(ConfigurationError::new(
                K::InvalidShift,
                format!("Shift '{}' starts and ends at the same time", s.id),
            ));
        }
    }

    let mut area_ids = HashSet::new();
    for a in &config.areas {
        if !area_ids.insert(a.id.as_str()) {
            errors.push(ConfigurationError::new(
                K::DuplicateId,
                format!("Duplicate area ID: {}", a.id),
            ));
        }
    }

    let mut group_ids = HashSet::new();
    for g in &config.groups {
        if !group_ids.insert(g.id.as_str()) {
            errors.push(ConfigurationError::new(
                K::DuplicateId,
                format!("Duplicate group ID: {}", g.id),
            ));
        }
        for area in &g.areas {
            if !area_ids.contains(area.as_str()) {
                errors.push(ConfigurationError::new(
                    K::UnknownReference,
                    format!("Group '{}' references unknown area '{area}'", g.id),
                ));
            }
        }
    }

    // Workers
    let mut worker_ids = HashSet::new();
    for w in &config.workers {
        if !worker_ids.insert(w.id.as_str()) {
            errors.push(ConfigurationError::new(
                K::DuplicateId,
                format!("Duplicate worker ID: {}", w.id),
            ));
        }

        let group = config.groups.iter().find(|g| g.id == w.group);
        if group.is_none() {
            errors.push(ConfigurationError::new(
                K::UnknownReference,
                format!("Worker '{}' references unknown group '{}'", w.id, w.group),
            ));
        }

        if w.monthly_cap < 0 {
            errors.push(ConfigurationError::new(
                K::NegativeCapacity,
                format!("Worker '{}' has negative capacity {}", w.id, w.monthly_cap),
            ));
        }

        if let Some(allowed) = &w.allowed_shifts {
            for s in allowed {
                if !shift_ids.contains(s.as_str()) {
                    errors.push(ConfigurationError::new(
                        K::UnknownReference,
                        format!("Worker '{}' allows unknown shift '{s}'", w.id),
                    ));
                }
            }
        }

        if w.off_days.len() > MAX_OFF_DAYS {
            errors.push(ConfigurationError::new(
                K::TooManyOffDays,
                format!(
                    "Worker '{}' requests {} off-days (at most {MAX_OFF_DAYS})",
                    w.id,
                    w.off_days.len()
                ),
            ));
        }
        for &d in &w.off_days {
            if d >= days {
                errors.push(ConfigurationError::new(
                    K::DayOutOfHorizon,
                    format!("Worker '{}' off-day {d} is outside the horizon", w.id),
                ));
            }
        }

        let mut fixed_work = 0u32;
        for (&d, fixed) in &w.fixed {
            if d >= days {
                errors.push(ConfigurationError::new(
                    K::DayOutOfHorizon,
                    format!("Worker '{}' override on day {d} is outside the horizon", w.id),
                ));
            }
            let FixedOverride::Work { shift, area } = fixed else {
                continue;
            };
            fixed_work += 1;

            if w.off_days.contains(&d) {
                errors.push(ConfigurationError::new(
                    K::ConflictingLock,
                    format!(
                        "Worker '{}' is both off and fixed to work on day {d}",
                        w.id
                    ),
                ));
            }
            if !shift_ids.contains(shift.as_str()) || !area_ids.contains(area.as_str()) {
                errors.push(ConfigurationError::new(
                    K::UnknownReference,
                    format!(
                        "Worker '{}' override on day {d} references unknown shift/area '{shift}'/'{area}'",
                        w.id
                    ),
                ));
            } else if !w.allows_shift(shift) || !group.is_some_and(|g| g.allows(area)) {
                errors.push(ConfigurationError::new(
                    K::IneligibleLock,
                    format!(
                        "Worker '{}' may not work '{shift}' in '{area}' (override on day {d})",
                        w.id
                    ),
                ));
            }
        }

        let cap = effective_capacity(w.monthly_cap, days, rules.min_off_days_per_horizon);
        if w.monthly_cap >= 0 && fixed_work > cap {
            errors.push(ConfigurationError::new(
                K::LockExceedsCapacity,
                format!(
                    "Worker '{}' has {fixed_work} fixed working days but capacity {cap}",
                    w.id
                ),
            ));
        }
    }

    // Coverage
    let mut slots = HashSet::new();
    for e in &config.coverage.entries {
        if e.day >= days {
            errors.push(ConfigurationError::new(
                K::DayOutOfHorizon,
                format!("Coverage for day {} is outside the horizon", e.day),
            ));
        }
        if !shift_ids.contains(e.shift.as_str()) {
            errors.push(ConfigurationError::new(
                K::UnknownReference,
                format!("Coverage references unknown shift '{}'", e.shift),
            ));
        }
        if !area_ids.contains(e.area.as_str()) {
            errors.push(ConfigurationError::new(
                K::UnknownReference,
                format!("Coverage references unknown area '{}'", e.area),
            ));
        }
        if !slots.insert((e.day, e.shift.as_str(), e.area.as_str())) {
            errors.push(ConfigurationError::new(
                K::DuplicateId,
                format!(
                    "Duplicate coverage slot: day {} / {} / {}",
                    e.day, e.shift, e.area
                ),
            ));
        }
    }

    let combinations = config.shifts.len().saturating_mul(config.areas.len());
    if combinations > MAX_COMBINATIONS {
        errors.push(ConfigurationError::new(
            K::ModelTooLarge,
            format!(
                "{} shifts x {} areas exceed {MAX_COMBINATIONS} combinations",
                config.shifts.len(),
                config.areas.len()
            ),
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
