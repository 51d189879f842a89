//! School configuration: every constraint input the generators read.
//!
//! # Hard vs. soft
//! Unavailability, the daily quota, breaks, and teacher qualifications are
//! hard: no generated period ever violates them. Subject priorities are
//! soft: they only order the slots that are tried first.
//!
//! The configuration references teachers, classes, subjects, and slots by
//! name. Nothing here checks those names against a [`Catalog`](super::Catalog);
//! see [`crate::validation`] for that.

use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

use super::{TimeGrid, Weekday};

/// Default number of instructional periods a teacher may teach per day.
pub const DEFAULT_DAILY_PERIOD_QUOTA: u32 = 6;

/// Subject category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SubjectCategory {
    /// Core subject, scheduled at most once per class per day.
    Main,
    /// Elective or filler, may repeat within a day.
    Additional,
}

/// Preferred half of the day for a subject.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SubjectPriority {
    BeforeLunch,
    AfterLunch,
    #[default]
    None,
}

/// A teacher must never be booked at this day and slot.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Unavailability {
    pub teacher_id: String,
    pub day: Weekday,
    pub time_slot: String,
}

impl Unavailability {
    pub fn new(teacher_id: impl Into<String>, day: Weekday, time_slot: impl Into<String>) -> Self {
        Self {
            teacher_id: teacher_id.into(),
            day,
            time_slot: time_slot.into(),
        }
    }
}

/// Several classes taught together in one period by one teacher.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CombinedClassRule {
    /// Participating classes (two or more).
    pub classes: Vec<String>,
    pub subject: String,
    pub teacher_id: String,
}

impl CombinedClassRule {
    pub fn new(
        classes: Vec<String>,
        subject: impl Into<String>,
        teacher_id: impl Into<String>,
    ) -> Self {
        Self {
            classes,
            subject: subject.into(),
            teacher_id: teacher_id.into(),
        }
    }
}

/// One sub-group of a split class period.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SplitPart {
    pub subject: String,
    pub teacher_id: String,
}

impl SplitPart {
    pub fn new(subject: impl Into<String>, teacher_id: impl Into<String>) -> Self {
        Self {
            subject: subject.into(),
            teacher_id: teacher_id.into(),
        }
    }
}

/// One class divided into concurrent sub-groups sharing a time slot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SplitClassRule {
    pub class_name: String,
    /// Sub-groups (two or more).
    pub parts: Vec<SplitPart>,
}

impl SplitClassRule {
    pub fn new(class_name: impl Into<String>, parts: Vec<SplitPart>) -> Self {
        Self {
            class_name: class_name.into(),
            parts,
        }
    }
}

/// All constraint inputs for timetable generation.
///
/// Maps are keyed by name: class name for `class_requirements`,
/// `class_teachers`; subject name for `subject_priorities`,
/// `subject_categories`; teacher id for `teacher_subjects`,
/// `teacher_classes`, `quota_overrides`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SchoolConfig {
    /// Days that are scheduled, in week order.
    pub working_days: Vec<Weekday>,
    /// Subjects each class must be taught.
    pub class_requirements: HashMap<String, Vec<String>>,
    /// Preferred half of the day per subject.
    pub subject_priorities: HashMap<String, SubjectPriority>,
    /// Main/additional classification per subject. Missing = additional.
    pub subject_categories: HashMap<String, SubjectCategory>,
    /// Subjects each teacher is qualified to teach.
    pub teacher_subjects: HashMap<String, Vec<String>>,
    /// Classes each teacher may teach.
    pub teacher_classes: HashMap<String, Vec<String>>,
    /// Class teacher per class (teaches first period when possible).
    pub class_teachers: HashMap<String, String>,
    /// Fixed prayer slot.
    pub prayer_time_slot: Option<String>,
    /// Fixed lunch slot.
    pub lunch_time_slot: Option<String>,
    /// Maximum instructional periods per teacher per day.
    pub daily_period_quota: u32,
    /// Per-teacher quota replacing `daily_period_quota`.
    pub quota_overrides: HashMap<String, u32>,
    /// Keep a teacher out of directly adjacent slots in the main and fill passes.
    pub prevent_consecutive_classes: bool,
    /// Hard exclusions.
    pub unavailability: Vec<Unavailability>,
    pub combined_classes: Vec<CombinedClassRule>,
    pub split_classes: Vec<SplitClassRule>,
}

impl Default for SchoolConfig {
    fn default() -> Self {
        Self {
            working_days: Weekday::school_week(),
            class_requirements: HashMap::new(),
            subject_priorities: HashMap::new(),
            subject_categories: HashMap::new(),
            teacher_subjects: HashMap::new(),
            teacher_classes: HashMap::new(),
            class_teachers: HashMap::new(),
            prayer_time_slot: None,
            lunch_time_slot: None,
            daily_period_quota: DEFAULT_DAILY_PERIOD_QUOTA,
            quota_overrides: HashMap::new(),
            prevent_consecutive_classes: false,
            unavailability: Vec::new(),
            combined_classes: Vec::new(),
            split_classes: Vec::new(),
        }
    }
}

impl SchoolConfig {
    /// Creates a configuration with defaults (Monday-Friday, quota 6).
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the working days.
    pub fn with_working_days(mut self, days: Vec<Weekday>) -> Self {
        self.working_days = days;
        self
    }

    /// Sets the subjects a class requires.
    pub fn with_requirement(mut self, class: impl Into<String>, subjects: Vec<String>) -> Self {
        self.class_requirements.insert(class.into(), subjects);
        self
    }

    /// Sets a subject's category.
    pub fn with_category(mut self, subject: impl Into<String>, category: SubjectCategory) -> Self {
        self.subject_categories.insert(subject.into(), category);
        self
    }

    /// Sets a subject's time-of-day priority.
    pub fn with_priority(mut self, subject: impl Into<String>, priority: SubjectPriority) -> Self {
        self.subject_priorities.insert(subject.into(), priority);
        self
    }

    /// Qualifies a teacher for subjects.
    pub fn with_teacher_subjects(
        mut self,
        teacher_id: impl Into<String>,
        subjects: Vec<String>,
    ) -> Self {
        self.teacher_subjects.insert(teacher_id.into(), subjects);
        self
    }

    /// Qualifies a teacher for classes.
    pub fn with_teacher_classes(
        mut self,
        teacher_id: impl Into<String>,
        classes: Vec<String>,
    ) -> Self {
        self.teacher_classes.insert(teacher_id.into(), classes);
        self
    }

    /// Assigns a class teacher.
    pub fn with_class_teacher(
        mut self,
        class: impl Into<String>,
        teacher_id: impl Into<String>,
    ) -> Self {
        self.class_teachers.insert(class.into(), teacher_id.into());
        self
    }

    /// Sets the prayer slot.
    pub fn with_prayer_slot(mut self, slot: impl Into<String>) -> Self {
        self.prayer_time_slot = Some(slot.into());
        self
    }

    /// Sets the lunch slot.
    pub fn with_lunch_slot(mut self, slot: impl Into<String>) -> Self {
        self.lunch_time_slot = Some(slot.into());
        self
    }

    /// Sets the global daily quota.
    pub fn with_daily_quota(mut self, quota: u32) -> Self {
        self.daily_period_quota = quota;
        self
    }

    /// Overrides the daily quota for one teacher.
    pub fn with_quota_override(mut self, teacher_id: impl Into<String>, quota: u32) -> Self {
        self.quota_overrides.insert(teacher_id.into(), quota);
        self
    }

    /// Enables or disables the consecutive-period rule.
    pub fn with_prevent_consecutive(mut self, prevent: bool) -> Self {
        self.prevent_consecutive_classes = prevent;
        self
    }

    /// Adds an unavailability rule.
    pub fn with_unavailability(mut self, rule: Unavailability) -> Self {
        self.unavailability.push(rule);
        self
    }

    /// Adds a combined-class rule.
    pub fn with_combined(mut self, rule: CombinedClassRule) -> Self {
        self.combined_classes.push(rule);
        self
    }

    /// Adds a split-class rule.
    pub fn with_split(mut self, rule: SplitClassRule) -> Self {
        self.split_classes.push(rule);
        self
    }

    /// Daily quota for a teacher, honouring overrides.
    pub fn quota_for(&self, teacher_id: &str) -> u32 {
        self.quota_overrides
            .get(teacher_id)
            .copied()
            .unwrap_or(self.daily_period_quota)
    }

    /// Category of a subject (uncategorized subjects count as additional).
    pub fn category_of(&self, subject: &str) -> SubjectCategory {
        self.subject_categories
            .get(subject)
            .copied()
            .unwrap_or(SubjectCategory::Additional)
    }

    /// Whether a subject is categorized main.
    pub fn is_main(&self, subject: &str) -> bool {
        self.category_of(subject) == SubjectCategory::Main
    }

    /// Time-of-day priority of a subject.
    pub fn priority_of(&self, subject: &str) -> SubjectPriority {
        self.subject_priorities
            .get(subject)
            .copied()
            .unwrap_or_default()
    }

    /// Required subjects of a class (empty when none are configured).
    pub fn requirements_of(&self, class: &str) -> &[String] {
        self.class_requirements
            .get(class)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Whether a teacher may teach a subject to a class.
    pub fn is_qualified(&self, teacher_id: &str, subject: &str, class: &str) -> bool {
        let teaches_subject = self
            .teacher_subjects
            .get(teacher_id)
            .is_some_and(|s| s.iter().any(|x| x == subject));
        let teaches_class = self
            .teacher_classes
            .get(teacher_id)
            .is_some_and(|c| c.iter().any(|x| x == class));
        teaches_subject && teaches_class
    }

    /// Set of (teacher, day, slot) triples the configuration marks unavailable.
    pub fn unavailable_set(&self) -> HashSet<(&str, Weekday, &str)> {
        self.unavailability
            .iter()
            .map(|u| (u.teacher_id.as_str(), u.day, u.time_slot.as_str()))
            .collect()
    }

    /// Builds the time grid for the given ordered slots.
    pub fn time_grid(&self, time_slots: &[String]) -> TimeGrid {
        let mut grid =
            TimeGrid::new(time_slots.to_vec()).with_working_days(self.working_days.clone());
        grid.prayer_slot = self.prayer_time_slot.clone();
        grid.lunch_slot = self.lunch_time_slot.clone();
        grid
    }
}
