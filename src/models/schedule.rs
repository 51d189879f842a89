//! Schedule (solution) model.
//!
//! A schedule is a flat, ordered list of [`ScheduleEntry`] values, one per
//! (day, slot, class) cell. Day × slot matrices for a class or a teacher are
//! derived views computed on demand.
//!
//! # Period variants
//! Combined and split periods are first-class [`Period`] variants. The
//! delimiter-joined text form (`"9A & 9B"`, `"Bio / Chem"`, `"---"`, `"N/A"`)
//! only exists at the boundary, via [`FlatEntry`].

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::HashMap;

use super::Weekday;

/// Subject text of an explicitly empty period.
pub const EMPTY_SUBJECT: &str = "---";
/// Teacher text of a period without a teacher.
pub const NO_TEACHER: &str = "N/A";
/// Separator between class names or teacher ids.
pub const CLASS_SEPARATOR: &str = " & ";
/// Separator between split subjects.
pub const SUBJECT_SEPARATOR: &str = " / ";

/// Fixed break kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BreakKind {
    Prayer,
    Lunch,
}

impl BreakKind {
    /// Subject text used for the break.
    pub fn label(self) -> &'static str {
        match self {
            Self::Prayer => "Prayer",
            Self::Lunch => "Lunch",
        }
    }
}

/// One sub-group of a split period.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PeriodPart {
    pub subject: String,
    pub teacher: String,
}

/// What happens in one cell.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum Period {
    /// One class, one subject, one teacher.
    Single {
        class: String,
        subject: String,
        teacher: String,
    },
    /// Several classes taught together.
    Combined {
        classes: Vec<String>,
        subject: String,
        teacher: String,
    },
    /// One class in concurrent sub-groups.
    Split { class: String, parts: Vec<PeriodPart> },
    /// Prayer or lunch.
    Break { class: String, kind: BreakKind },
    /// Nothing could be placed.
    Empty { class: String },
}

/// A (day, slot) cell assignment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScheduleEntry {
    pub day: Weekday,
    pub time_slot: String,
    pub period: Period,
}

impl ScheduleEntry {
    /// Creates an entry.
    pub fn new(day: Weekday, time_slot: impl Into<String>, period: Period) -> Self {
        Self {
            day,
            time_slot: time_slot.into(),
            period,
        }
    }

    /// Single-class period.
    pub fn single(
        day: Weekday,
        time_slot: impl Into<String>,
        class: impl Into<String>,
        subject: impl Into<String>,
        teacher: impl Into<String>,
    ) -> Self {
        Self::new(
            day,
            time_slot,
            Period::Single {
                class: class.into(),
                subject: subject.into(),
                teacher: teacher.into(),
            },
        )
    }

    /// Fixed break.
    pub fn break_period(
        day: Weekday,
        time_slot: impl Into<String>,
        class: impl Into<String>,
        kind: BreakKind,
    ) -> Self {
        Self::new(
            day,
            time_slot,
            Period::Break {
                class: class.into(),
                kind,
            },
        )
    }

    /// Explicit gap.
    pub fn empty(day: Weekday, time_slot: impl Into<String>, class: impl Into<String>) -> Self {
        Self::new(
            day,
            time_slot,
            Period::Empty {
                class: class.into(),
            },
        )
    }

    /// Classes occupying this cell.
    pub fn classes(&self) -> Vec<&str> {
        match &self.period {
            Period::Combined { classes, .. } => classes.iter().map(String::as_str).collect(),
            Period::Single { class, .. }
            | Period::Split { class, .. }
            | Period::Break { class, .. }
            | Period::Empty { class } => vec![class.as_str()],
        }
    }

    /// Teachers occupying this cell (empty for breaks and gaps).
    pub fn teachers(&self) -> Vec<&str> {
        match &self.period {
            Period::Single { teacher, .. } | Period::Combined { teacher, .. } => {
                vec![teacher.as_str()]
            }
            Period::Split { parts, .. } => parts.iter().map(|p| p.teacher.as_str()).collect(),
            Period::Break { .. } | Period::Empty { .. } => Vec::new(),
        }
    }

    /// Subjects taught in this cell (empty for breaks and gaps).
    pub fn subjects(&self) -> Vec<&str> {
        match &self.period {
            Period::Single { subject, .. } | Period::Combined { subject, .. } => {
                vec![subject.as_str()]
            }
            Period::Split { parts, .. } => parts.iter().map(|p| p.subject.as_str()).collect(),
            Period::Break { .. } | Period::Empty { .. } => Vec::new(),
        }
    }

    /// Whether this is a prayer or lunch break.
    pub fn is_break(&self) -> bool {
        matches!(self.period, Period::Break { .. })
    }

    /// Whether this is an explicit gap.
    pub fn is_empty(&self) -> bool {
        matches!(self.period, Period::Empty { .. })
    }

    /// Whether something is actually taught.
    pub fn is_taught(&self) -> bool {
        !self.is_break() && !self.is_empty()
    }

    /// Whether the teacher takes part in this period.
    pub fn involves_teacher(&self, teacher_id: &str) -> bool {
        self.teachers().contains(&teacher_id)
    }

    /// Whether the class takes part in this period.
    pub fn covers_class(&self, class: &str) -> bool {
        self.classes().contains(&class)
    }

    /// Class text, classes joined by `" & "`.
    pub fn class_label(&self) -> String {
        self.classes().join(CLASS_SEPARATOR)
    }

    /// Subject text: subjects joined by `" / "`, `"---"` for gaps, break name for breaks.
    pub fn subject_label(&self) -> String {
        match &self.period {
            Period::Break { kind, .. } => kind.label().to_string(),
            Period::Empty { .. } => EMPTY_SUBJECT.to_string(),
            _ => self.subjects().join(SUBJECT_SEPARATOR),
        }
    }

    /// Teacher text: ids joined by `" & "`, `"N/A"` when nobody teaches.
    pub fn teacher_label(&self) -> String {
        let teachers = self.teachers();
        if teachers.is_empty() {
            NO_TEACHER.to_string()
        } else {
            teachers.join(CLASS_SEPARATOR)
        }
    }

    /// Decodes a flat record back into a typed entry.
    pub fn from_flat(flat: FlatEntry) -> Self {
        let classes: Vec<String> = split_list(&flat.class_name, CLASS_SEPARATOR);
        let teachers: Vec<String> = split_list(&flat.teacher, CLASS_SEPARATOR);
        let subject = flat.subject.trim();

        let period = if subject == EMPTY_SUBJECT {
            Period::Empty {
                class: flat.class_name.clone(),
            }
        } else if subject == BreakKind::Prayer.label() && flat.teacher == NO_TEACHER {
            Period::Break {
                class: flat.class_name.clone(),
                kind: BreakKind::Prayer,
            }
        } else if subject == BreakKind::Lunch.label() && flat.teacher == NO_TEACHER {
            Period::Break {
                class: flat.class_name.clone(),
                kind: BreakKind::Lunch,
            }
        } else if let Some(parts) = split_parts(subject, teachers) {
            Period::Split {
                class: flat.class_name.clone(),
                parts,
            }
        } else if classes.len() > 1 {
            Period::Combined {
                classes,
                subject: subject.to_string(),
                teacher: flat.teacher.clone(),
            }
        } else {
            Period::Single {
                class: flat.class_name.clone(),
                subject: subject.to_string(),
                teacher: flat.teacher.clone(),
            }
        };

        Self {
            day: flat.day,
            time_slot: flat.time_slot,
            period,
        }
    }
}

/// Pairs split subjects with teachers; `None` unless both lists have the
/// same length of at least two.
fn split_parts(subject: &str, teachers: Vec<String>) -> Option<Vec<PeriodPart>> {
    let subjects = split_list(subject, SUBJECT_SEPARATOR);
    if subjects.len() < 2 || subjects.len() != teachers.len() {
        return None;
    }
    Some(
        subjects
            .into_iter()
            .zip(teachers)
            .map(|(subject, teacher)| PeriodPart { subject, teacher })
            .collect(),
    )
}

fn split_list(text: &str, separator: &str) -> Vec<String> {
    text.split(separator)
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

/// Flat, delimiter-joined form of an entry for text-based storage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FlatEntry {
    pub day: Weekday,
    pub time_slot: String,
    pub class_name: String,
    pub subject: String,
    pub teacher: String,
}

impl From<&ScheduleEntry> for FlatEntry {
    fn from(entry: &ScheduleEntry) -> Self {
        Self {
            day: entry.day,
            time_slot: entry.time_slot.clone(),
            class_name: entry.class_label(),
            subject: entry.subject_label(),
            teacher: entry.teacher_label(),
        }
    }
}

/// A complete weekly timetable.
///
/// `working_days` and `time_slots` give the presentation order used by
/// [`Schedule::sort`] and the grid views.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Schedule {
    pub entries: Vec<ScheduleEntry>,
    pub working_days: Vec<Weekday>,
    pub time_slots: Vec<String>,
}

/// Day × slot matrix of entries, indexed `[day_position][slot_index]`.
pub type ScheduleGrid<'a> = Vec<Vec<Option<&'a ScheduleEntry>>>;

impl Schedule {
    /// Creates an empty schedule with the given presentation order.
    pub fn new(working_days: Vec<Weekday>, time_slots: Vec<String>) -> Self {
        Self {
            entries: Vec::new(),
            working_days,
            time_slots,
        }
    }

    /// Adds an entry.
    pub fn add_entry(&mut self, entry: ScheduleEntry) {
        self.entries.push(entry);
    }

    /// Number of entries.
    pub fn entry_count(&self) -> usize {
        self.entries.len()
    }

    /// Stable sort by working-day order, slot order, then class text.
    ///
    /// Days or slots not in the presentation order sort last.
    pub fn sort(&mut self) {
        let day_rank: HashMap<Weekday, usize> = self
            .working_days
            .iter()
            .enumerate()
            .map(|(i, &d)| (d, i))
            .collect();
        let slot_rank: HashMap<&str, usize> = self
            .time_slots
            .iter()
            .enumerate()
            .map(|(i, s)| (s.as_str(), i))
            .collect();

        let mut keyed: Vec<(usize, usize, String, ScheduleEntry)> = self
            .entries
            .drain(..)
            .map(|e| {
                let d = day_rank.get(&e.day).copied().unwrap_or(usize::MAX);
                let s = slot_rank
                    .get(e.time_slot.as_str())
                    .copied()
                    .unwrap_or(usize::MAX);
                (d, s, e.class_label(), e)
            })
            .collect();
        keyed.sort_by(|a, b| match a.0.cmp(&b.0) {
            Ordering::Equal => a.1.cmp(&b.1).then_with(|| a.2.cmp(&b.2)),
            other => other,
        });
        self.entries = keyed.into_iter().map(|(_, _, _, e)| e).collect();
    }

    /// Position of a slot in the presentation order.
    pub fn slot_index(&self, slot: &str) -> Option<usize> {
        self.time_slots.iter().position(|s| s == slot)
    }

    /// All entries on a day.
    pub fn entries_on(&self, day: Weekday) -> Vec<&ScheduleEntry> {
        self.entries.iter().filter(|e| e.day == day).collect()
    }

    /// All entries a teacher takes part in.
    pub fn entries_for_teacher(&self, teacher_id: &str) -> Vec<&ScheduleEntry> {
        self.entries
            .iter()
            .filter(|e| e.involves_teacher(teacher_id))
            .collect()
    }

    /// All entries covering a class.
    pub fn entries_for_class(&self, class: &str) -> Vec<&ScheduleEntry> {
        self.entries
            .iter()
            .filter(|e| e.covers_class(class))
            .collect()
    }

    /// The entry covering a class at a day and slot.
    pub fn entry_at(&self, day: Weekday, slot: &str, class: &str) -> Option<&ScheduleEntry> {
        self.entries
            .iter()
            .find(|e| e.day == day && e.time_slot == slot && e.covers_class(class))
    }

    /// Day × slot view of one class.
    pub fn class_grid(&self, class: &str) -> ScheduleGrid<'_> {
        self.grid_where(|e| e.covers_class(class))
    }

    /// Day × slot view of one teacher.
    pub fn teacher_grid(&self, teacher_id: &str) -> ScheduleGrid<'_> {
        self.grid_where(|e| e.involves_teacher(teacher_id))
    }

    fn grid_where<F>(&self, keep: F) -> ScheduleGrid<'_>
    where
        F: Fn(&ScheduleEntry) -> bool,
    {
        let mut grid = vec![vec![None; self.time_slots.len()]; self.working_days.len()];
        for entry in self.entries.iter().filter(|e| keep(e)) {
            let day = self.working_days.iter().position(|&d| d == entry.day);
            let slot = self.slot_index(&entry.time_slot);
            if let (Some(d), Some(s)) = (day, slot) {
                grid[d][s] = Some(entry);
            }
        }
        grid
    }

    /// Periods a teacher teaches on a day.
    pub fn teacher_load(&self, teacher_id: &str, day: Weekday) -> usize {
        self.entries
            .iter()
            .filter(|e| e.day == day && e.involves_teacher(teacher_id))
            .count()
    }

    /// Periods a teacher teaches across the week.
    pub fn weekly_load(&self, teacher_id: &str) -> usize {
        self.entries_for_teacher(teacher_id).len()
    }

    /// Number of explicit gaps.
    pub fn gap_count(&self) -> usize {
        self.entries.iter().filter(|e| e.is_empty()).count()
    }

    /// Flat, delimiter-joined records in entry order.
    pub fn to_flat(&self) -> Vec<FlatEntry> {
        self.entries.iter().map(FlatEntry::from).collect()
    }
}

/// A property a schedule fails to satisfy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Violation {
    /// Type of violation.
    pub violation_type: ViolationType,
    /// Related entity (teacher id or class name).
    pub entity_id: String,
    /// Day the violation occurs on.
    pub day: Weekday,
    /// Human-readable description.
    pub message: String,
    /// Severity (0-100, higher = worse).
    pub severity: i32,
}

/// Classification of schedule violations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ViolationType {
    /// A (day, slot, class) cell has no entry.
    MissingCell,
    /// A (day, slot, class) cell has more than one entry.
    DuplicateCell,
    /// A teacher appears twice in the same slot.
    TeacherDoubleBooked,
    /// A teacher exceeds the daily quota.
    QuotaExceeded,
    /// A teacher is booked while configured unavailable.
    TeacherUnavailable,
    /// A main subject appears twice for a class on a day.
    MainSubjectRepeated,
}

impl ViolationType {
    /// Default severity for this type.
    pub fn severity(self) -> i32 {
        match self {
            Self::MissingCell | Self::DuplicateCell => 100,
            Self::TeacherDoubleBooked => 95,
            Self::TeacherUnavailable => 90,
            Self::QuotaExceeded => 70,
            Self::MainSubjectRepeated => 50,
        }
    }
}

impl Violation {
    /// Creates a violation with the type's default severity.
    pub fn new(
        violation_type: ViolationType,
        entity_id: impl Into<String>,
        day: Weekday,
        message: impl Into<String>,
    ) -> Self {
        Self {
            violation_type,
            entity_id: entity_id.into(),
            day,
            message: message.into(),
            severity: violation_type.severity(),
        }
    }
}
