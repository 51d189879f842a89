//! School timetabling core.
//!
//! Generates weekly class timetables, day-of substitution plans for absent
//! teachers, and exam invigilation rotas. All three are synchronous, pure
//! computations over in-memory inputs; every call owns its own state.
//!
//! # Modules
//!
//! - **`models`**: Domain types: `Catalog`, `SchoolConfig`, `Schedule`,
//!   `ScheduleEntry`, `Period`, `SubstitutionPlan`, `DutyChart`
//! - **`ledger`**: Booking ledger over interned teachers, classes, subjects, slots
//! - **`scheduler`**: Six-pass greedy timetable generator, audit, KPIs
//! - **`planning`**: Substitution planner and invigilation assigner
//! - **`validation`**: Input integrity checks (duplicate ids, unknown references, bad rules)
//! - **`error`**: Planner errors
//!
//! # Soft infeasibility
//!
//! Generators never fail on infeasible input. Cells that cannot be filled
//! become `"---"` gaps, uncovered periods get "No Substitute Available",
//! and invigilation slots may receive fewer teachers than requested.
//!
//! # References
//!
//! - Schaerf (1999), "A Survey of Automated Timetabling"
//! - de Werra (1985), "An Introduction to Timetabling"

pub mod error;
pub mod index;
pub mod ledger;
pub mod models;
pub mod planning;
pub mod scheduler;
pub mod validation;

use std::collections::HashMap;

use chrono::NaiveDate;

pub use error::{PlanError, PlanResult};

use models::{Catalog, DutyChart, Schedule, SchoolConfig, SubstitutionPlan, Teacher, TimeGrid};
use planning::{InvigilationAssigner, SubstitutionPlanner};
use scheduler::TimetableGenerator;

/// Generates a weekly timetable with a fresh random seed.
///
/// Use [`TimetableGenerator`] directly to fix or read back the seed.
pub fn generate_schedule(catalog: &Catalog, config: &SchoolConfig) -> Schedule {
    TimetableGenerator::new(catalog, config).generate().schedule
}

/// Plans substitutes for the `absent` teachers on `date`.
///
/// `weekly_load` is copied onto each substitution for display and never
/// influences who is chosen.
pub fn generate_substitution_plan(
    schedule: &Schedule,
    teachers: &[Teacher],
    absent: &[String],
    date: NaiveDate,
    weekly_load: &HashMap<String, usize>,
) -> PlanResult<SubstitutionPlan> {
    SubstitutionPlanner::new(schedule, teachers)
        .with_weekly_load(weekly_load.clone())
        .plan(absent, date)
}

/// Assigns two invigilators per working day and instructional slot.
pub fn generate_invigilation_duty(
    schedule: &Schedule,
    teachers: &[Teacher],
    grid: &TimeGrid,
) -> DutyChart {
    InvigilationAssigner::new(grid).assign(schedule, teachers)
}
