//! Hard-constraint audit of a finished schedule.
//!
//! Checks the properties every generated timetable must satisfy:
//!
//! | Check | Violation |
//! |-------|-----------|
//! | Every (day, slot, class) cell has exactly one entry | `MissingCell` / `DuplicateCell` |
//! | No teacher is in two entries at one (day, slot) | `TeacherDoubleBooked` |
//! | Instructional load per teacher per day ≤ quota | `QuotaExceeded` |
//! | No teacher is booked while unavailable | `TeacherUnavailable` |
//! | A main subject appears at most once per class per day | `MainSubjectRepeated` |
//!
//! Works on any [`Schedule`], including hand-edited or imported ones.

use std::collections::{BTreeMap, BTreeSet};

use crate::models::{Catalog, Schedule, SchoolConfig, Violation, ViolationType, Weekday};

/// Audits a schedule against the catalog and configuration.
///
/// Violations are returned in day, then check order.
pub fn audit_schedule(
    schedule: &Schedule,
    catalog: &Catalog,
    config: &SchoolConfig,
) -> Vec<Violation> {
    let grid = config.time_grid(&catalog.time_slots);
    let unavailable = config.unavailable_set();
    let mut violations = Vec::new();

    for &day in &grid.working_days {
        // (slot, class) -> entry count
        let mut cells: BTreeMap<(&str, &str), usize> = BTreeMap::new();
        // (slot, teacher) -> entry count
        let mut teacher_slots: BTreeMap<(&str, &str), usize> = BTreeMap::new();
        let mut load: BTreeMap<&str, BTreeSet<&str>> = BTreeMap::new();
        let mut main_subjects: BTreeMap<(&str, &str), usize> = BTreeMap::new();

        for entry in schedule.entries.iter().filter(|e| e.day == day) {
            let slot = entry.time_slot.as_str();
            for class in entry.classes() {
                *cells.entry((slot, class)).or_default() += 1;
            }
            if !entry.is_taught() {
                continue;
            }

            let mut teachers = entry.teachers();
            teachers.sort_unstable();
            teachers.dedup();
            for teacher in teachers {
                *teacher_slots.entry((slot, teacher)).or_default() += 1;
                if !grid.is_break(slot) {
                    load.entry(teacher).or_default().insert(slot);
                }
                if unavailable.contains(&(teacher, day, slot)) {
                    violations.push(Violation::new(
                        ViolationType::TeacherUnavailable,
                        teacher,
                        day,
                        format!("{teacher} is unavailable at {slot}"),
                    ));
                }
            }

            let subjects: BTreeSet<&str> = entry.subjects().into_iter().collect();
            for subject in subjects.into_iter().filter(|s| config.is_main(s)) {
                for class in entry.classes() {
                    *main_subjects.entry((class, subject)).or_default() += 1;
                }
            }
        }

        check_cells(day, &grid.time_slots, &catalog.classes, &cells, &mut violations);

        for ((slot, teacher), count) in teacher_slots {
            if count > 1 {
                violations.push(Violation::new(
                    ViolationType::TeacherDoubleBooked,
                    teacher,
                    day,
                    format!("{teacher} has {count} periods at {slot}"),
                ));
            }
        }

        for (teacher, slots) in load {
            let quota = config.quota_for(teacher);
            if slots.len() as u32 > quota {
                violations.push(Violation::new(
                    ViolationType::QuotaExceeded,
                    teacher,
                    day,
                    format!("{teacher} teaches {} periods, quota is {quota}", slots.len()),
                ));
            }
        }

        for ((class, subject), count) in main_subjects {
            if count > 1 {
                violations.push(Violation::new(
                    ViolationType::MainSubjectRepeated,
                    class,
                    day,
                    format!("{class} has {subject} {count} times"),
                ));
            }
        }
    }

    violations
}

fn check_cells(
    day: Weekday,
    slots: &[String],
    classes: &[String],
    cells: &BTreeMap<(&str, &str), usize>,
    violations: &mut Vec<Violation>,
) {
    for slot in slots {
        for class in classes {
            match cells.get(&(slot.as_str(), class.as_str())).copied().unwrap_or(0) {
                1 => {}
                0 => violations.push(Violation::new(
                    ViolationType::MissingCell,
                    class,
                    day,
                    format!("{class} has no entry at {slot}"),
                )),
                n => violations.push(Violation::new(
                    ViolationType::DuplicateCell,
                    class,
                    day,
                    format!("{class} has {n} entries at {slot}"),
                )),
            }
        }
    }
}
