//! Rostering domain models.
//!
//! Provides the input and output data types of a roster run. Inputs are
//! string-keyed for readability; they are resolved into dense indices by
//! [`RosterProblem`](crate::problem::RosterProblem) before search.
//!
//! # Domain Mappings
//!
//! | u-roster | Hospital | Retail | Call center |
//! |----------|----------|--------|-------------|
//! | Worker | Doctor/Nurse | Clerk | Agent |
//! | ShiftPeriod | Morning/Night | Opening/Closing | Early/Late |
//! | DutyArea | Triage/ICU | Till/Stockroom | Queue |
//! | QualificationGroup | Grade | Role | Skill tier |

mod catalog;
mod config;
mod coverage;
mod schedule;
mod worker;

pub use catalog::{DutyArea, QualificationGroup, ShiftPeriod, MINUTES_PER_DAY};
pub use config::RosterConfig;
pub use coverage::{CoverageEntry, CoverageRequirement, GlobalRules};
pub use schedule::{Assignment, RosterGrid, RosterSchedule, Violation, ViolationType};
pub use worker::{FixedOverride, Worker, MAX_OFF_DAYS};
