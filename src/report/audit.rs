//! Hard-rule audit of a roster.
//!
//! Checks a roster against the resolved problem and lists every
//! violation. An empty list means the roster is legal: no double
//! booking, only eligible (shift, area) pairs, capacity respected, no
//! over-long runs, enough rest between adjacent days, and every lock
//! honored. Runs and short rests made entirely of locked cells are not
//! reported.

use crate::models::{RosterSchedule, Violation, ViolationType};
use crate::problem::{Lock, RosterProblem};

/// Lists every hard-rule violation of `schedule`.
///
/// # Example
/// ```
/// use u_roster::models::{Assignment, RosterSchedule};
/// use u_roster::problem::RosterProblem;
/// use u_roster::report::audit;
///
/// let problem = RosterProblem::new(&u_roster::demo::emergency_department(4, 2)).unwrap();
/// let mut roster = RosterSchedule::new();
/// roster.add_assignment(Assignment::new("D1", 0, "morning", "triage"));
/// roster.add_assignment(Assignment::new("D1", 0, "night", "triage"));
/// assert_eq!(audit(&roster, &problem).len(), 1);
/// ```
pub fn audit(schedule: &RosterSchedule, problem: &RosterProblem) -> Vec<Violation> {
    let nw = problem.worker_count();
    let nd = problem.days();
    let mut violations = Vec::new();
    let mut cells: Vec<Option<usize>> = vec![None; nw * nd];

    for a in &schedule.assignments {
        let resolved = (
            problem.worker_index(&a.worker),
            problem.shift_index(&a.shift),
            problem.area_index(&a.area),
        );
        let (Some(w), Some(s), Some(ar)) = resolved else {
            violations.push(Violation::new(
                ViolationType::UnknownReference,
                &a.worker,
                Some(a.day),
                format!("unknown worker, shift, or area in {}/{}/{}", a.worker, a.shift, a.area),
            ));
            continue;
        };
        let d = a.day as usize;
        if d >= nd {
            violations.push(Violation::new(
                ViolationType::UnknownReference,
                &a.worker,
                Some(a.day),
                format!("day {} is outside the {nd}-day horizon", a.day),
            ));
            continue;
        }
        if !problem.is_eligible(w, s, ar) {
            violations.push(Violation::new(
                ViolationType::Ineligible,
                &a.worker,
                Some(a.day),
                format!("{} may not work {} in {}", a.worker, a.shift, a.area),
            ));
        }
        let cell = &mut cells[w * nd + d];
        if cell.is_some() {
            violations.push(Violation::new(
                ViolationType::DoubleBooking,
                &a.worker,
                Some(a.day),
                format!("{} has more than one assignment on day {}", a.worker, a.day),
            ));
        } else {
            *cell = Some(problem.combo(s, ar));
        }
    }

    for w in 0..nw {
        let id = problem.worker(w).id.as_str();
        let row = &cells[w * nd..(w + 1) * nd];
        check_locks(problem, w, id, row, &mut violations);

        let worked = row.iter().filter(|c| c.is_some()).count();
        let cap = problem.capacity_of(w) as usize;
        if worked > cap {
            violations.push(Violation::new(
                ViolationType::CapacityExceeded,
                id,
                None,
                format!("{id} works {worked} days, capacity is {cap}"),
            ));
        }

        let window = problem.rules().max_consecutive_days as usize + 1;
        if nd >= window {
            for start in 0..=nd - window {
                let full = row[start..start + window].iter().all(Option::is_some);
                if full && problem.locks().locked_work_in_window(w, start, window) < window {
                    violations.push(Violation::new(
                        ViolationType::RunLength,
                        id,
                        Some(start as u32),
                        format!("{id} works {window} consecutive days from day {start}"),
                    ));
                }
            }
        }

        for d in 1..nd {
            let (Some(prev), Some(cur)) = (row[d - 1], row[d]) else {
                continue;
            };
            let (s_prev, _) = problem.split_combo(prev);
            let (s_cur, _) = problem.split_combo(cur);
            let both_locked = problem.locks().is_locked(w, d - 1) && problem.locks().is_locked(w, d);
            if !problem.rest_allows(s_prev, s_cur) && !both_locked {
                violations.push(Violation::new(
                    ViolationType::RestInterval,
                    id,
                    Some(d as u32),
                    format!(
                        "{id} gets too little rest between {} on day {} and {} on day {d}",
                        problem.shift_id(s_prev),
                        d - 1,
                        problem.shift_id(s_cur)
                    ),
                ));
            }
        }
    }
    violations
}

fn check_locks(
    problem: &RosterProblem,
    w: usize,
    id: &str,
    row: &[Option<usize>],
    violations: &mut Vec<Violation>,
) {
    for (d, cell) in row.iter().enumerate() {
        let broken = match (problem.lock_of(w, d), cell) {
            (Some(Lock::Rest), Some(_)) => true,
            (Some(Lock::Work { combo }), actual) => *actual != Some(combo),
            _ => false,
        };
        if broken {
            violations.push(Violation::new(
                ViolationType::LockBroken,
                id,
                Some(d as u32),
                format!("{id} does not follow the lock on day {d}"),
            ));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{
        Assignment, GlobalRules, QualificationGroup, RosterConfig, ShiftPeriod, Worker,
    };

    fn problem() -> RosterProblem {
        let cfg = RosterConfig::new(5)
            .with_shift(ShiftPeriod::new("morning", 420, 900))
            .with_shift(ShiftPeriod::new("night", 1380, 420))
            .with_area("triage")
            .with_area("resus")
            .with_group(QualificationGroup::new("senior").with_areas(["triage", "resus"]))
            .with_group(QualificationGroup::new("junior").with_areas(["triage"]))
            .with_rules(
                GlobalRules::default()
                    .with_max_consecutive_days(2)
                    .with_min_rest_hours(11),
            )
            .with_worker(Worker::new("S", "senior", 4))
            .with_worker(Worker::new("J", "junior", 2).with_fixed_rest(4))
            .with_worker(
                Worker::new("L", "senior", 5)
                    .with_fixed_work(0, "night", "resus")
                    .with_fixed_work(1, "morning", "resus")
                    .with_fixed_work(2, "morning", "resus"),
            );
        RosterProblem::new(&cfg).unwrap()
    }

    fn kinds(v: &[Violation]) -> Vec<ViolationType> {
        v.iter().map(|v| v.violation_type).collect()
    }

    #[test]
    fn test_legal_roster() {
        let mut s = RosterSchedule::new();
        s.add_assignment(Assignment::new("S", 0, "morning", "triage"));
        s.add_assignment(Assignment::new("S", 1, "night", "resus"));
        s.add_assignment(Assignment::new("S", 3, "morning", "resus"));
        s.add_assignment(Assignment::new("L", 0, "night", "resus"));
        s.add_assignment(Assignment::new("L", 1, "morning", "resus"));
        s.add_assignment(Assignment::new("L", 2, "morning", "resus"));
        assert!(audit(&s, &problem()).is_empty());
    }

    #[test]
    fn test_detects_each_rule() {
        let mut s = RosterSchedule::new();
        // Ineligible area for a junior.
        s.add_assignment(Assignment::new("J", 0, "morning", "resus"));
        // Double booking.
        s.add_assignment(Assignment::new("J", 1, "morning", "triage"));
        s.add_assignment(Assignment::new("J", 1, "night", "triage"));
        // Locked rest broken, capacity 2 exceeded.
        s.add_assignment(Assignment::new("J", 4, "morning", "triage"));
        // Night then morning: too little rest; three days in a row.
        s.add_assignment(Assignment::new("S", 0, "night", "triage"));
        s.add_assignment(Assignment::new("S", 1, "morning", "triage"));
        s.add_assignment(Assignment::new("S", 2, "morning", "triage"));
        // Locked work missing on day 2.
        s.add_assignment(Assignment::new("L", 0, "night", "resus"));
        s.add_assignment(Assignment::new("L", 1, "morning", "resus"));

        let found = kinds(&audit(&s, &problem()));
        for expected in [
            ViolationType::Ineligible,
            ViolationType::DoubleBooking,
            ViolationType::LockBroken,
            ViolationType::CapacityExceeded,
            ViolationType::RestInterval,
            ViolationType::RunLength,
        ] {
            assert!(found.contains(&expected), "missing {expected:?} in {found:?}");
        }
        assert_eq!(
            found.iter().filter(|&&k| k == ViolationType::LockBroken).count(),
            2
        );
    }

    #[test]
    fn test_locked_runs_are_exempt() {
        // L's three locked days exceed the run limit and the night → morning
        // rest rule, but every cell is locked.
        let mut s = RosterSchedule::new();
        s.add_assignment(Assignment::new("L", 0, "night", "resus"));
        s.add_assignment(Assignment::new("L", 1, "morning", "resus"));
        s.add_assignment(Assignment::new("L", 2, "morning", "resus"));
        assert!(audit(&s, &problem()).is_empty());
    }

    #[test]
    fn test_unknown_references() {
        let mut s = RosterSchedule::new();
        s.add_assignment(Assignment::new("ghost", 0, "morning", "triage"));
        s.add_assignment(Assignment::new("S", 9, "morning", "triage"));
        s.add_assignment(Assignment::new("S", 0, "noon", "triage"));
        let found = kinds(&audit(&s, &problem()));
        assert_eq!(found, vec![ViolationType::UnknownReference; 3]);
    }
}
