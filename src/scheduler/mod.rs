//! Timetable generation, auditing, and KPI evaluation.
//!
//! # Algorithm
//!
//! `TimetableGenerator` is a randomized, multi-pass greedy heuristic. It is
//! not optimal and never backtracks, but always returns a complete
//! timetable: cells it cannot fill become explicit gaps.
//!
//! # Audit
//!
//! `audit_schedule` re-checks the hard constraints on any schedule.
//!
//! # KPI
//!
//! `TimetableKpi` computes fill rate, gaps, teacher load, and main-subject
//! coverage.
//!
//! # References
//!
//! - Schaerf (1999), "A Survey of Automated Timetabling"
//! - Burke & Petrovic (2002), "Recent Research Directions in Automated Timetabling"

mod audit;
mod generator;
mod kpi;

pub use audit::audit_schedule;
pub use generator::{GeneratedTimetable, GenerationStats, GeneratorOptions, TimetableGenerator};
pub use kpi::TimetableKpi;
