//! Plans derived from a finished timetable.
//!
//! - `SubstitutionPlanner`: cover for absent teachers on one date.
//! - `InvigilationAssigner`: exam invigilation rota for the week.
//!
//! Both read the schedule without modifying it and rebuild their result
//! from scratch on every call.

mod invigilation;
mod substitution;

pub use invigilation::{InvigilationAssigner, DEFAULT_INVIGILATORS_PER_SLOT};
pub use substitution::SubstitutionPlanner;
