//! Teacher model and the input catalog.
//!
//! Teachers are referenced by `id` everywhere else in the crate. Removing a
//! teacher from the roster does not rewrite existing schedules, so a schedule
//! may still name an id that no longer appears in the catalog.

use serde::{Deserialize, Serialize};

/// A member of teaching staff.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Teacher {
    /// Unique, stable identifier.
    pub id: String,
    /// Display name.
    pub name: String,
    /// Contact email (unique across the roster).
    pub email: String,
    /// Optional school affiliation code.
    #[serde(default)]
    pub school_code: Option<String>,
}

impl Teacher {
    /// Creates a teacher with the given id.
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: String::new(),
            email: String::new(),
            school_code: None,
        }
    }

    /// Sets the display name.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Sets the email.
    pub fn with_email(mut self, email: impl Into<String>) -> Self {
        self.email = email.into();
        self
    }

    /// Sets the school affiliation code.
    pub fn with_school_code(mut self, code: impl Into<String>) -> Self {
        self.school_code = Some(code.into());
        self
    }
}

/// The entity universe a timetable is built over.
///
/// `time_slots` is ordered; every other list is only ordered for
/// reproducibility of seeded runs.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Catalog {
    /// Teaching staff.
    pub teachers: Vec<Teacher>,
    /// Class names (e.g. "9A").
    pub classes: Vec<String>,
    /// Subject names.
    pub subjects: Vec<String>,
    /// Daily time slots in chronological order.
    pub time_slots: Vec<String>,
}

impl Catalog {
    /// Creates an empty catalog.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a teacher.
    pub fn with_teacher(mut self, teacher: Teacher) -> Self {
        self.teachers.push(teacher);
        self
    }

    /// Adds a class.
    pub fn with_class(mut self, class: impl Into<String>) -> Self {
        self.classes.push(class.into());
        self
    }

    /// Adds a subject.
    pub fn with_subject(mut self, subject: impl Into<String>) -> Self {
        self.subjects.push(subject.into());
        self
    }

    /// Appends time slots in order.
    pub fn with_time_slots<I, S>(mut self, slots: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.time_slots.extend(slots.into_iter().map(Into::into));
        self
    }

    /// Finds a teacher by id.
    pub fn teacher(&self, id: &str) -> Option<&Teacher> {
        self.teachers.iter().find(|t| t.id == id)
    }

    /// Removes a teacher from the roster. Schedules referencing the id are untouched.
    pub fn remove_teacher(&mut self, id: &str) -> Option<Teacher> {
        let pos = self.teachers.iter().position(|t| t.id == id)?;
        Some(self.teachers.remove(pos))
    }
}
