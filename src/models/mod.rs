//! Timetabling domain models.
//!
//! Provides the data types the generators consume and produce. All of them
//! are plain serde values so an outer application can store or transmit them
//! in any format.
//!
//! # Domain Mappings
//!
//! | u-timetable | Meaning |
//! |-------------|---------|
//! | Catalog | Teachers, classes, subjects, ordered time slots |
//! | SchoolConfig | Constraint inputs (qualifications, quotas, rules) |
//! | TimeGrid | Working days × time slots, with break slots |
//! | Schedule | Weekly timetable (flat list of entries) |
//! | SubstitutionPlan | One day's absence cover |
//! | DutyChart | Exam invigilation rota |

mod config;
mod plan;
mod schedule;
mod teacher;
mod week;

pub use config::{
    CombinedClassRule, SchoolConfig, SplitClassRule, SplitPart, SubjectCategory, SubjectPriority,
    Unavailability, DEFAULT_DAILY_PERIOD_QUOTA,
};
pub use plan::{Cover, DutyChart, DutySlot, Substitution, SubstitutionPlan, NO_SUBSTITUTE};
pub use schedule::{
    BreakKind, FlatEntry, Period, PeriodPart, Schedule, ScheduleEntry, ScheduleGrid, Violation,
    ViolationType, CLASS_SEPARATOR, EMPTY_SUBJECT, NO_TEACHER, SUBJECT_SEPARATOR,
};
pub use teacher::{Catalog, Teacher};
pub use week::{ParseWeekdayError, TimeGrid, Weekday};
