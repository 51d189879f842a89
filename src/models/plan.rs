//! Downstream plans derived from a schedule: substitution cover and
//! invigilation duty charts.
//!
//! Both are regenerated wholesale on every request and never merged with a
//! previous result.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

use super::Weekday;

/// Text shown when no substitute could be found.
pub const NO_SUBSTITUTE: &str = "No Substitute Available";

/// Cover outcome for one affected period.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Cover {
    /// Teacher id of the substitute.
    Substitute(String),
    /// Nobody was free.
    NoSubstituteAvailable,
}

impl Cover {
    /// Substitute id, if covered.
    pub fn teacher_id(&self) -> Option<&str> {
        match self {
            Self::Substitute(id) => Some(id),
            Self::NoSubstituteAvailable => None,
        }
    }

    pub fn is_covered(&self) -> bool {
        matches!(self, Self::Substitute(_))
    }
}

impl fmt::Display for Cover {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Substitute(id) => f.write_str(id),
            Self::NoSubstituteAvailable => f.write_str(NO_SUBSTITUTE),
        }
    }
}

/// Reassignment of one period whose teacher is absent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Substitution {
    pub time_slot: String,
    /// Class text of the period (`"9A & 9B"` for combined periods).
    pub class_name: String,
    /// Subject text of the period.
    pub subject: String,
    pub absent_teacher_id: String,
    pub cover: Cover,
    /// Substitute's weekly teaching load, when the caller supplied it.
    #[serde(default)]
    pub substitute_weekly_load: Option<usize>,
}

/// All substitutions for one date.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubstitutionPlan {
    pub date: NaiveDate,
    pub weekday: Weekday,
    /// In time-slot order.
    pub substitutions: Vec<Substitution>,
    /// Substitute duties handed out in this run, per teacher id.
    pub duty_counts: BTreeMap<String, u32>,
}

impl SubstitutionPlan {
    /// Creates an empty plan.
    pub fn new(date: NaiveDate, weekday: Weekday) -> Self {
        Self {
            date,
            weekday,
            substitutions: Vec::new(),
            duty_counts: BTreeMap::new(),
        }
    }

    /// Fraction of affected periods that got a substitute (1.0 when nothing was affected).
    pub fn coverage_rate(&self) -> f64 {
        if self.substitutions.is_empty() {
            return 1.0;
        }
        let covered = self
            .substitutions
            .iter()
            .filter(|s| s.cover.is_covered())
            .count();
        covered as f64 / self.substitutions.len() as f64
    }

    /// Periods left without cover.
    pub fn uncovered(&self) -> Vec<&Substitution> {
        self.substitutions
            .iter()
            .filter(|s| !s.cover.is_covered())
            .collect()
    }

    /// Substitutions handed to one teacher.
    pub fn duties_of(&self, teacher_id: &str) -> Vec<&Substitution> {
        self.substitutions
            .iter()
            .filter(|s| s.cover.teacher_id() == Some(teacher_id))
            .collect()
    }
}

/// Invigilators for one (day, slot).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DutySlot {
    pub day: Weekday,
    pub time_slot: String,
    /// Invigilating teacher ids, in selection order.
    pub teachers: Vec<String>,
}

/// Invigilation duties across the week.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DutyChart {
    /// In day, then slot order.
    pub duties: Vec<DutySlot>,
    /// Instructional slots the chart covers.
    pub time_slots: Vec<String>,
    /// Total duties per teacher id.
    pub duty_counts: BTreeMap<String, u32>,
}

impl DutyChart {
    /// Invigilators at a day and slot (empty when the cell is not in the chart).
    pub fn teachers_at(&self, day: Weekday, slot: &str) -> &[String] {
        self.duties
            .iter()
            .find(|d| d.day == day && d.time_slot == slot)
            .map(|d| d.teachers.as_slice())
            .unwrap_or(&[])
    }

    /// Cells with fewer invigilators than `target`.
    pub fn understaffed(&self, target: usize) -> Vec<&DutySlot> {
        self.duties
            .iter()
            .filter(|d| d.teachers.len() < target)
            .collect()
    }
}
