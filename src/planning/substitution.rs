//! Day-of substitution planning for absent teachers.
//!
//! # Algorithm
//!
//! 1. Resolve the date to a weekday.
//! 2. Collect the taught periods on that weekday involving an absent teacher.
//! 3. Record the slots every present teacher is already committed to.
//! 4. Walk the affected periods in slot order. Each goes to the free present
//!    teacher with the fewest duties so far (roster order breaks ties), who
//!    is then committed to that slot. With nobody free the period stays
//!    uncovered.
//!
//! No qualification check is made: any free present teacher may cover.
//!
//! # Complexity
//! O(p · t) where p=affected periods, t=roster size.

use std::collections::{BTreeMap, HashMap, HashSet};

use chrono::{Datelike, NaiveDate};
use tracing::debug;

use crate::error::{PlanError, PlanResult};
use crate::models::{Cover, Schedule, Substitution, SubstitutionPlan, Teacher, Weekday};

/// Plans substitutes for one date at a time.
///
/// # Example
///
/// ```
/// use chrono::NaiveDate;
/// use u_timetable::models::{Schedule, ScheduleEntry, Teacher, Weekday};
/// use u_timetable::planning::SubstitutionPlanner;
///
/// let mut schedule = Schedule::new(vec![Weekday::Monday], vec!["10:00".into()]);
/// schedule.add_entry(ScheduleEntry::single(Weekday::Monday, "10:00", "9A", "Math", "X"));
/// let roster = [Teacher::new("X"), Teacher::new("Y")];
///
/// let date = NaiveDate::from_ymd_opt(2024, 9, 2).unwrap(); // a Monday
/// let plan = SubstitutionPlanner::new(&schedule, &roster)
///     .plan(&["X".to_string()], date)
///     .unwrap();
/// assert_eq!(plan.substitutions[0].cover.teacher_id(), Some("Y"));
/// ```
#[derive(Debug, Clone)]
pub struct SubstitutionPlanner<'a> {
    schedule: &'a Schedule,
    teachers: &'a [Teacher],
    working_days: Option<Vec<Weekday>>,
    weekly_load: HashMap<String, usize>,
}

impl<'a> SubstitutionPlanner<'a> {
    /// Creates a planner over a master schedule and the full roster.
    pub fn new(schedule: &'a Schedule, teachers: &'a [Teacher]) -> Self {
        Self {
            schedule,
            teachers,
            working_days: None,
            weekly_load: HashMap::new(),
        }
    }

    /// Rejects dates falling outside these days.
    pub fn with_working_days(mut self, days: Vec<Weekday>) -> Self {
        self.working_days = Some(days);
        self
    }

    /// Weekly teaching load per teacher id, copied onto each substitution.
    pub fn with_weekly_load(mut self, load: HashMap<String, usize>) -> Self {
        self.weekly_load = load;
        self
    }

    /// Plans cover for a `YYYY-MM-DD` date string.
    pub fn plan_for(&self, absent: &[String], date: &str) -> PlanResult<SubstitutionPlan> {
        let date = NaiveDate::parse_from_str(date.trim(), "%Y-%m-%d")
            .map_err(|_| PlanError::InvalidDate(date.to_string()))?;
        self.plan(absent, date)
    }

    /// Plans cover for a date.
    pub fn plan(&self, absent: &[String], date: NaiveDate) -> PlanResult<SubstitutionPlan> {
        let weekday = Weekday::from(date.weekday());
        if let Some(days) = &self.working_days {
            if !days.contains(&weekday) {
                return Err(PlanError::NonWorkingDay { date, weekday });
            }
        }

        let absent: HashSet<&str> = absent.iter().map(String::as_str).collect();
        let mut affected: Vec<_> = self
            .schedule
            .entries
            .iter()
            .filter(|e| e.day == weekday && e.is_taught())
            .filter(|e| e.teachers().iter().any(|t| absent.contains(t)))
            .collect();
        affected.sort_by_key(|e| self.schedule.slot_index(&e.time_slot).unwrap_or(usize::MAX));

        let present: Vec<&Teacher> = self
            .teachers
            .iter()
            .filter(|t| !absent.contains(t.id.as_str()))
            .collect();
        let mut committed: HashMap<&str, HashSet<String>> = present
            .iter()
            .map(|t| {
                let slots = self
                    .schedule
                    .entries
                    .iter()
                    .filter(|e| e.day == weekday && e.involves_teacher(&t.id))
                    .map(|e| e.time_slot.clone())
                    .collect();
                (t.id.as_str(), slots)
            })
            .collect();
        let mut duties: HashMap<&str, u32> = HashMap::new();

        let mut plan = SubstitutionPlan::new(date, weekday);
        for entry in affected {
            let teachers = entry.teachers();
            let Some(absent_teacher) = teachers.iter().find(|t| absent.contains(*t)) else {
                continue;
            };
            let slot = entry.time_slot.as_str();

            // min_by_key keeps the first minimum, so roster order breaks ties
            let pick = present
                .iter()
                .filter(|t| !committed.get(t.id.as_str()).is_some_and(|s| s.contains(slot)))
                .min_by_key(|t| duties.get(t.id.as_str()).copied().unwrap_or(0));

            let cover = match pick {
                Some(teacher) => {
                    let id = teacher.id.as_str();
                    committed.entry(id).or_default().insert(slot.to_string());
                    *duties.entry(id).or_default() += 1;
                    Cover::Substitute(teacher.id.clone())
                }
                None => {
                    debug!(%weekday, slot, class = %entry.class_label(), "no substitute available");
                    Cover::NoSubstituteAvailable
                }
            };

            let substitute_weekly_load = cover
                .teacher_id()
                .and_then(|id| self.weekly_load.get(id).copied());
            plan.substitutions.push(Substitution {
                time_slot: entry.time_slot.clone(),
                class_name: entry.class_label(),
                subject: entry.subject_label(),
                absent_teacher_id: absent_teacher.to_string(),
                cover,
                substitute_weekly_load,
            });
        }

        plan.duty_counts = duties
            .into_iter()
            .map(|(id, n)| (id.to_string(), n))
            .collect::<BTreeMap<_, _>>();
        debug!(
            %date,
            affected = plan.substitutions.len(),
            uncovered = plan.uncovered().len(),
            "substitution plan built"
        );
        Ok(plan)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Period, PeriodPart, ScheduleEntry};

    fn monday() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 9, 2).unwrap()
    }

    fn roster(ids: &[&str]) -> Vec<Teacher> {
        ids.iter().map(|id| Teacher::new(*id)).collect()
    }

    fn schedule(slots: &[&str], entries: Vec<ScheduleEntry>) -> Schedule {
        let mut s = Schedule::new(
            vec![Weekday::Monday, Weekday::Tuesday],
            slots.iter().map(|s| s.to_string()).collect(),
        );
        s.entries = entries;
        s
    }

    fn absent(ids: &[&str]) -> Vec<String> {
        ids.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_single_free_teacher_covers() {
        let s = schedule(
            &["09:00", "10:00"],
            vec![
                ScheduleEntry::single(Weekday::Monday, "10:00", "9A", "Math", "X"),
                ScheduleEntry::single(Weekday::Monday, "10:00", "9B", "Art", "Z"),
            ],
        );
        let teachers = roster(&["X", "Y", "Z"]);

        let plan = SubstitutionPlanner::new(&s, &teachers)
            .plan(&absent(&["X"]), monday())
            .unwrap();
        assert_eq!(plan.weekday, Weekday::Monday);
        assert_eq!(plan.substitutions.len(), 1);

        let sub = &plan.substitutions[0];
        assert_eq!(sub.time_slot, "10:00");
        assert_eq!(sub.class_name, "9A");
        assert_eq!(sub.subject, "Math");
        assert_eq!(sub.absent_teacher_id, "X");
        assert_eq!(sub.cover, Cover::Substitute("Y".into()));
        assert_eq!(plan.duty_counts["Y"], 1);
        assert!(!plan.duty_counts.contains_key("Z"));
    }

    #[test]
    fn test_no_substitute_available() {
        let s = schedule(
            &["10:00"],
            vec![
                ScheduleEntry::single(Weekday::Monday, "10:00", "9A", "Math", "X"),
                ScheduleEntry::single(Weekday::Monday, "10:00", "9B", "Art", "Y"),
            ],
        );
        let teachers = roster(&["X", "Y"]);

        let plan = SubstitutionPlanner::new(&s, &teachers)
            .plan(&absent(&["X"]), monday())
            .unwrap();
        assert_eq!(plan.substitutions[0].cover, Cover::NoSubstituteAvailable);
        assert_eq!(plan.substitutions[0].cover.to_string(), "No Substitute Available");
        assert!(plan.duty_counts.is_empty());
    }

    #[test]
    fn test_duties_are_balanced_and_never_collide() {
        let s = schedule(
            &["08:00", "09:00", "10:00"],
            vec![
                ScheduleEntry::single(Weekday::Monday, "10:00", "9A", "Math", "X"),
                ScheduleEntry::single(Weekday::Monday, "08:00", "9A", "Math", "X"),
                ScheduleEntry::single(Weekday::Monday, "09:00", "9B", "Art", "W"),
                ScheduleEntry::single(Weekday::Monday, "09:00", "9A", "Bio", "X"),
            ],
        );
        let teachers = roster(&["X", "W", "Y", "Z"]);

        let plan = SubstitutionPlanner::new(&s, &teachers)
            .plan(&absent(&["X", "W"]), monday())
            .unwrap();
        let slots: Vec<&str> = plan.substitutions.iter().map(|s| s.time_slot.as_str()).collect();
        assert_eq!(slots, ["08:00", "09:00", "09:00", "10:00"]);

        let covers: Vec<Option<&str>> =
            plan.substitutions.iter().map(|s| s.cover.teacher_id()).collect();
        // 08:00 -> Y (tie, roster order); 09:00 -> Z (fewest); 09:00 -> Y; 10:00 -> Z
        assert_eq!(covers, [Some("Y"), Some("Z"), Some("Y"), Some("Z")]);
        assert_eq!(plan.duty_counts["Y"], 2);
        assert_eq!(plan.duty_counts["Z"], 2);

        let mut seen = HashSet::new();
        for sub in &plan.substitutions {
            if let Some(id) = sub.cover.teacher_id() {
                assert!(seen.insert((id, sub.time_slot.as_str())));
            }
        }
    }

    #[test]
    fn test_breaks_gaps_and_other_days_are_ignored() {
        let s = schedule(
            &["08:00", "09:00"],
            vec![
                ScheduleEntry::empty(Weekday::Monday, "08:00", "9A"),
                ScheduleEntry::single(Weekday::Tuesday, "08:00", "9A", "Math", "X"),
                ScheduleEntry::break_period(
                    Weekday::Monday,
                    "09:00",
                    "9A",
                    crate::models::BreakKind::Lunch,
                ),
            ],
        );
        let teachers = roster(&["X", "Y"]);
        let plan = SubstitutionPlanner::new(&s, &teachers)
            .plan(&absent(&["X"]), monday())
            .unwrap();
        assert!(plan.substitutions.is_empty());
        assert!((plan.coverage_rate() - 1.0).abs() < 1e-10);
    }

    #[test]
    fn test_split_period_reports_first_absent_teacher() {
        let split = ScheduleEntry::new(
            Weekday::Monday,
            "08:00",
            Period::Split {
                class: "9A".into(),
                parts: vec![
                    PeriodPart {
                        subject: "Bio".into(),
                        teacher: "P".into(),
                    },
                    PeriodPart {
                        subject: "Chem".into(),
                        teacher: "Q".into(),
                    },
                ],
            },
        );
        let s = schedule(&["08:00"], vec![split]);
        let teachers = roster(&["P", "Q", "R"]);

        let plan = SubstitutionPlanner::new(&s, &teachers)
            .plan(&absent(&["Q", "P"]), monday())
            .unwrap();
        assert_eq!(plan.substitutions.len(), 1);
        assert_eq!(plan.substitutions[0].absent_teacher_id, "P");
        assert_eq!(plan.substitutions[0].subject, "Bio / Chem");
        assert_eq!(plan.substitutions[0].cover.teacher_id(), Some("R"));
    }

    #[test]
    fn test_weekly_load_is_recorded() {
        let s = schedule(
            &["08:00"],
            vec![ScheduleEntry::single(Weekday::Monday, "08:00", "9A", "Math", "X")],
        );
        let teachers = roster(&["X", "Y"]);
        let load = HashMap::from([("Y".to_string(), 17)]);

        let plan = SubstitutionPlanner::new(&s, &teachers)
            .with_weekly_load(load)
            .plan(&absent(&["X"]), monday())
            .unwrap();
        assert_eq!(plan.substitutions[0].substitute_weekly_load, Some(17));
    }

    #[test]
    fn test_date_errors() {
        let s = schedule(&["08:00"], Vec::new());
        let teachers = roster(&["X"]);
        let planner = SubstitutionPlanner::new(&s, &teachers);

        assert_eq!(
            planner.plan_for(&absent(&["X"]), "2024-02-30"),
            Err(PlanError::InvalidDate("2024-02-30".into()))
        );
        assert!(planner.plan_for(&absent(&["X"]), "2024-09-03").is_ok());

        let sunday = NaiveDate::from_ymd_opt(2024, 9, 8).unwrap();
        // Without working days any weekday is accepted
        assert!(planner.plan(&absent(&["X"]), sunday).is_ok());
        let strict = planner.with_working_days(Weekday::school_week());
        assert_eq!(
            strict.plan(&absent(&["X"]), sunday),
            Err(PlanError::NonWorkingDay {
                date: sunday,
                weekday: Weekday::Sunday
            })
        );
    }
}
