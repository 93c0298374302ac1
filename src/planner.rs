//! Roster planner facade.
//!
//! # Algorithm
//!
//! 1. Validate and resolve the configuration into a [`RosterProblem`].
//! 2. Check the supply/demand estimate (logged, never fatal).
//! 3. Run the selected engine.
//! 4. Evaluate the roster: coverage gaps, worker loads, audit, KPIs.
//!
//! The evaluation is the same whichever engine produced the roster.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::cp::{self, ExactConfig, SolveStatus};
use crate::error::RosterError;
use crate::ga::{self, GaConfig};
use crate::models::{RosterConfig, RosterGrid, RosterSchedule, Violation};
use crate::problem::{FeasibilityEstimate, RosterProblem};
use crate::report::{self, CoverageGap, RosterKpi, WorkerLoad};

/// Engine selection with its parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "engine", rename_all = "camelCase")]
pub enum Method {
    /// Genetic search.
    Heuristic(GaConfig),
    /// Exact constraint search.
    Exact(ExactConfig),
}

impl Method {
    /// Engine kind.
    pub fn kind(&self) -> MethodKind {
        match self {
            Self::Heuristic(_) => MethodKind::Heuristic,
            Self::Exact(_) => MethodKind::Exact,
        }
    }
}

/// Engine kind, without parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MethodKind {
    /// Genetic search.
    Heuristic,
    /// Exact constraint search.
    Exact,
}

/// Roster with its evaluation.
#[derive(Debug, Clone)]
pub struct RosterOutcome {
    /// Engine that produced the roster.
    pub method: MethodKind,
    /// Exact-engine status; `None` for the heuristic engine.
    pub status: Option<SolveStatus>,
    /// The roster; `None` only when the exact engine is unsolved.
    pub schedule: Option<RosterSchedule>,
    /// Coverage per required slot.
    pub gaps: Vec<CoverageGap>,
    /// Load per worker.
    pub loads: BTreeMap<String, WorkerLoad>,
    /// Hard-rule violations.
    pub violations: Vec<Violation>,
    /// Summary indicators.
    pub kpi: Option<RosterKpi>,
    /// Worker × day view.
    pub grid: Option<RosterGrid>,
    /// Supply/demand estimate.
    pub estimate: FeasibilityEstimate,
}

impl RosterOutcome {
    /// Whether a roster was produced.
    pub fn has_schedule(&self) -> bool {
        self.schedule.is_some()
    }

    /// Total unmet headcount.
    pub fn total_shortfall(&self) -> u64 {
        report::total_shortfall(&self.gaps)
    }
}

/// Validates, solves, and evaluates roster configurations.
///
/// # Example
///
/// ```
/// use u_roster::ga::GaConfig;
/// use u_roster::planner::{Method, RosterPlanner};
///
/// let config = u_roster::demo::emergency_department(14, 5);
/// let method = Method::Heuristic(
///     GaConfig::default().with_generations(10).with_population_size(12),
/// );
/// let outcome = RosterPlanner::new().plan(&config, &method).unwrap();
/// assert!(outcome.has_schedule());
/// assert_eq!(outcome.loads.len(), 14);
/// ```
#[derive(Debug, Clone, Default)]
pub struct RosterPlanner;

impl RosterPlanner {
    /// Creates a planner.
    pub fn new() -> Self {
        Self
    }

    /// Plans a roster for `config`.
    ///
    /// # Errors
    /// [`RosterError::InvalidConfiguration`] for invalid input or engine
    /// parameters; nothing is searched in that case.
    pub fn plan(&self, config: &RosterConfig, method: &Method) -> Result<RosterOutcome, RosterError> {
        let problem = RosterProblem::new(config)?;
        self.plan_problem(&problem, method)
    }

    /// Plans a roster for an already resolved problem.
    pub fn plan_problem(
        &self,
        problem: &RosterProblem,
        method: &Method,
    ) -> Result<RosterOutcome, RosterError> {
        let estimate = problem.feasibility_estimate();
        if !estimate.is_plausible() {
            warn!(
                needed = estimate.min_needed,
                capacity = estimate.max_capacity,
                "demand exceeds worker capacity; coverage gaps are certain"
            );
        }
        info!(
            method = ?method.kind(),
            workers = problem.worker_count(),
            days = problem.days(),
            "planning roster"
        );

        let (status, schedule) = match method {
            Method::Heuristic(params) => {
                let outcome = ga::solve(problem, params)?;
                (None, Some(outcome.schedule))
            }
            Method::Exact(params) => {
                let outcome = cp::solve(problem, params)?;
                (Some(outcome.status), outcome.schedule)
            }
        };

        let mut result = RosterOutcome {
            method: method.kind(),
            status,
            schedule: None,
            gaps: Vec::new(),
            loads: BTreeMap::new(),
            violations: Vec::new(),
            kpi: None,
            grid: None,
            estimate,
        };
        if let Some(schedule) = schedule {
            result.gaps = report::coverage_gaps(&schedule, &problem.config().coverage);
            result.loads = report::per_worker_load(&schedule, problem);
            result.violations = report::audit(&schedule, problem);
            result.kpi = Some(RosterKpi::calculate(&schedule, problem));
            result.grid = Some(RosterGrid::from_schedule(
                &schedule,
                &problem.worker_ids(),
                problem.days() as u32,
            ));
            if !result.violations.is_empty() {
                warn!(count = result.violations.len(), "roster breaks hard rules");
            }
            result.schedule = Some(schedule);
        }
        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::demo::emergency_department;
    use crate::models::Worker;

    #[test]
    fn test_heuristic_plan_is_evaluated() {
        let config = emergency_department(16, 5);
        let method = Method::Heuristic(
            GaConfig::default()
                .with_generations(20)
                .with_population_size(16)
                .with_seed(1),
        );
        let outcome = RosterPlanner::new().plan(&config, &method).unwrap();
        assert_eq!(outcome.method, MethodKind::Heuristic);
        assert!(outcome.status.is_none());
        assert_eq!(outcome.gaps.len(), 5 * 3 * 4);
        assert!(outcome.violations.is_empty());
        let grid = outcome.grid.as_ref().unwrap();
        assert_eq!(grid.workers.len(), 16);
        let kpi = outcome.kpi.as_ref().unwrap();
        assert_eq!(kpi.total_shortfall, outcome.total_shortfall());
    }

    #[test]
    fn test_exact_plan() {
        let config = emergency_department(12, 3);
        let method = Method::Exact(
            ExactConfig::default()
                .with_time_limit_secs(1.0)
                .with_search_workers(2),
        );
        let outcome = RosterPlanner::new().plan(&config, &method).unwrap();
        assert_eq!(outcome.method, MethodKind::Exact);
        assert!(outcome.status.unwrap().is_solution_found());
        assert!(outcome.has_schedule());
        assert!(outcome.violations.is_empty());
    }

    #[test]
    fn test_unsolved_has_no_schedule() {
        let config = emergency_department(12, 3);
        let method = Method::Exact(ExactConfig::default().with_time_limit_secs(0.0));
        let outcome = RosterPlanner::new().plan(&config, &method).unwrap();
        assert_eq!(outcome.status, Some(SolveStatus::Unsolved));
        assert!(!outcome.has_schedule());
        assert!(outcome.gaps.is_empty());
        assert!(outcome.kpi.is_none());
    }

    #[test]
    fn test_locked_rest_in_both_engines() {
        let mut config = emergency_department(14, 7);
        config.workers[0] = Worker::new("D1", "physician", 18).with_fixed_rest(5);
        let methods = [
            Method::Heuristic(GaConfig::default().with_generations(10).with_population_size(10)),
            Method::Exact(
                ExactConfig::default()
                    .with_time_limit_secs(1.0)
                    .with_search_workers(1),
            ),
        ];
        for method in &methods {
            let outcome = RosterPlanner::new().plan(&config, method).unwrap();
            let schedule = outcome.schedule.unwrap();
            assert!(schedule.assignment_of("D1", 5).is_none());
        }
    }

    #[test]
    fn test_invalid_config_fails_fast() {
        let mut config = emergency_department(4, 7);
        config.workers[1] = Worker::new("D2", "physician", -3);
        let err = RosterPlanner::new()
            .plan(&config, &Method::Heuristic(GaConfig::default()))
            .unwrap_err();
        assert!(!err.configuration_errors().is_empty());
    }

    #[test]
    fn test_method_from_json() {
        let method: Method =
            serde_json::from_str(r#"{"engine": "exact", "timeLimitSecs": 3, "searchWorkers": 2}"#)
                .unwrap();
        match method {
            Method::Exact(cfg) => {
                assert_eq!(cfg.time_limit_secs, 3.0);
                assert_eq!(cfg.search_workers, 2);
            }
            Method::Heuristic(_) => panic!("expected exact"),
        }
    }
}
