//! Shift-roster optimization.
//!
//! Assigns workers to (day, shift period, duty area) slots over a
//! planning horizon. Hard rules (eligibility, capacity, locks, run
//! length, minimum rest) are honored; unmet coverage and workload
//! imbalance are minimized. Two engines share one problem encoding and
//! produce the same output type:
//!
//! - a genetic search that always returns a roster, and
//! - an exact constraint search with coverage slack and a time budget,
//!   reporting `Optimal`, `Feasible`, or `Unsolved`.
//!
//! # Modules
//!
//! - **`models`**: Input and output types: `Worker`, `ShiftPeriod`,
//!   `CoverageRequirement`, `GlobalRules`, `RosterConfig`, `RosterSchedule`
//! - **`validation`**: Configuration checks, all findings collected
//! - **`problem`**: Dense resolved problem: eligibility, capacity, locks
//! - **`ga`**: Heuristic engine (generic GA runner + roster encoding)
//! - **`cp`**: Exact engine (linear model, branch-and-bound and MIP backends,
//!   roster builder)
//! - **`report`**: Headcounts, coverage gaps, worker loads, audit, KPIs
//! - **`planner`**: One-call facade: validate, solve, evaluate
//! - **`demo`**: Sample configurations
//!
//! # Example
//!
//! ```
//! use u_roster::cp::ExactConfig;
//! use u_roster::planner::{Method, RosterPlanner};
//!
//! let config = u_roster::demo::emergency_department(12, 3);
//! let method = Method::Exact(ExactConfig::default().with_time_limit_secs(1.0));
//! let outcome = RosterPlanner::new().plan(&config, &method).unwrap();
//! assert!(outcome.violations.is_empty());
//! ```
//!
//! # References
//!
//! - Burke et al. (2004), "The State of the Art of Nurse Rostering"
//! - Ernst et al. (2004), "Staff scheduling and rostering: A review of
//!   applications, methods and models"

pub mod cp;
pub mod demo;
pub mod error;
pub mod ga;
pub mod models;
pub mod planner;
pub mod problem;
pub mod report;
pub mod validation;

pub use error::RosterError;
