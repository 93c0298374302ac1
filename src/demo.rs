//! Ready-made configurations for examples and tests.

use crate::models::{
    CoverageRequirement, GlobalRules, QualificationGroup, RosterConfig, ShiftPeriod, Worker,
};

/// Emergency-department roster.
///
/// - Shifts: morning 07–15, evening 15–23, night 23–07.
/// - Areas: triage, respiratory, observation, resuscitation, needing
///   2 / 1 / 4 / 3 physicians on every shift of every day.
/// - 10 to 13 physicians per shift, at most 6 days in a row, 11 h rest.
/// - Physicians `D1..Dn`, one group open to every area, cap 18 days.
///
/// # Example
/// ```
/// let config = u_roster::demo::emergency_department(40, 30);
/// assert_eq!(config.workers.len(), 40);
/// assert_eq!(config.coverage.total_demand(), 30 * 3 * 10);
/// ```
pub fn emergency_department(workers: usize, days: u32) -> RosterConfig {
    let areas = ["triage", "respiratory", "observation", "resuscitation"];
    let mut config = RosterConfig::new(days)
        .with_shift(ShiftPeriod::new("morning", 420, 900))
        .with_shift(ShiftPeriod::new("evening", 900, 1380))
        .with_shift(ShiftPeriod::new("night", 1380, 420))
        .with_group(QualificationGroup::new("physician").with_areas(areas))
        .with_rules(
            GlobalRules::default()
                .with_max_consecutive_days(6)
                .with_min_rest_hours(11)
                .with_headcount_band(10, 13),
        )
        .with_coverage(CoverageRequirement::uniform(
            days,
            &["morning", "evening", "night"],
            &[
                ("triage", 2),
                ("respiratory", 1),
                ("observation", 4),
                ("resuscitation", 3),
            ],
        ));
    for area in areas {
        config = config.with_area(area);
    }
    for i in 1..=workers {
        config = config.with_worker(Worker::new(format!("D{i}"), "physician", 18));
    }
    config
}
