//! Input validation for timetabling problems.
//!
//! The generators degrade gracefully on bad input (unknown names are
//! ignored, unusable rules skipped). Callers that want strict input can
//! run [`validate_input`] first. It detects:
//! - Duplicate teacher ids, emails, classes, and time slots
//! - Configuration entries naming unknown teachers, classes, subjects, or slots
//! - Combined rules with fewer than two classes
//! - Split rules with fewer than two parts or a repeated part teacher
//! - Zero daily quotas
//! - Empty catalogs

use std::collections::HashSet;

use crate::models::{Catalog, SchoolConfig};

/// Validation result.
pub type ValidationResult = Result<(), Vec<ValidationError>>;

/// A validation error.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidationError {
    /// Error category.
    pub kind: ValidationErrorKind,
    /// Human-readable description.
    pub message: String,
}

/// Categories of validation errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationErrorKind {
    /// Two teachers, classes, or slots share the same name.
    DuplicateId,
    /// Two teachers share the same email.
    DuplicateEmail,
    /// A configuration entry names a teacher not on the roster.
    UnknownTeacher,
    /// A configuration entry names a class not in the catalog.
    UnknownClass,
    /// A configuration entry names a subject not in the catalog.
    UnknownSubject,
    /// A configuration entry names a slot not in the time-slot list.
    UnknownTimeSlot,
    /// A combined or split rule cannot be applied.
    InvalidRule,
    /// A daily quota of zero.
    InvalidQuota,
    /// Teachers, classes, subjects, or slots are empty.
    EmptyCatalog,
}

impl ValidationError {
    fn new(kind: ValidationErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

/// Name sets of a catalog.
struct Known<'a> {
    teachers: HashSet<&'a str>,
    classes: HashSet<&'a str>,
    subjects: HashSet<&'a str>,
    slots: HashSet<&'a str>,
}

/// Validates a catalog and configuration.
///
/// Checks:
/// 1. No empty catalog lists
/// 2. No duplicate teacher ids, emails, classes, or time slots
/// 3. Every name referenced by the configuration exists in the catalog
/// 4. Prayer and lunch slots are in the time-slot list
/// 5. Combined and split rules are well formed
/// 6. No daily quota is zero
///
/// # Returns
/// `Ok(())` if all checks pass, `Err(errors)` with all detected issues.
pub fn validate_input(catalog: &Catalog, config: &SchoolConfig) -> ValidationResult {
    let mut errors = Vec::new();

    for (list, empty) in [
        ("teachers", catalog.teachers.is_empty()),
        ("classes", catalog.classes.is_empty()),
        ("subjects", catalog.subjects.is_empty()),
        ("time slots", catalog.time_slots.is_empty()),
    ] {
        if empty {
            errors.push(ValidationError::new(
                ValidationErrorKind::EmptyCatalog,
                format!("Catalog has no {list}"),
            ));
        }
    }

    let mut known = Known {
        teachers: HashSet::new(),
        classes: HashSet::new(),
        subjects: catalog.subjects.iter().map(String::as_str).collect(),
        slots: HashSet::new(),
    };
    let mut emails = HashSet::new();
    for t in &catalog.teachers {
        if !known.teachers.insert(t.id.as_str()) {
            errors.push(ValidationError::new(
                ValidationErrorKind::DuplicateId,
                format!("Duplicate teacher ID: {}", t.id),
            ));
        }
        let email = t.email.trim().to_lowercase();
        if !email.is_empty() && !emails.insert(email) {
            errors.push(ValidationError::new(
                ValidationErrorKind::DuplicateEmail,
                format!("Duplicate email: {}", t.email),
            ));
        }
    }
    for c in &catalog.classes {
        if !known.classes.insert(c.as_str()) {
            errors.push(ValidationError::new(
                ValidationErrorKind::DuplicateId,
                format!("Duplicate class: {c}"),
            ));
        }
    }
    for s in &catalog.time_slots {
        if !known.slots.insert(s.as_str()) {
            errors.push(ValidationError::new(
                ValidationErrorKind::DuplicateId,
                format!("Duplicate time slot: {s}"),
            ));
        }
    }

    check_references(&known, config, &mut errors);
    check_rules(config, &mut errors);

    if config.daily_period_quota == 0 {
        errors.push(ValidationError::new(
            ValidationErrorKind::InvalidQuota,
            "Daily period quota is 0",
        ));
    }
    for (teacher, &quota) in &config.quota_overrides {
        if quota == 0 {
            errors.push(ValidationError::new(
                ValidationErrorKind::InvalidQuota,
                format!("Quota override for '{teacher}' is 0"),
            ));
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

impl Known<'_> {
    fn require(
        set: &HashSet<&str>,
        name: &str,
        kind: ValidationErrorKind,
        what: &str,
        context: &str,
        errors: &mut Vec<ValidationError>,
    ) {
        if !set.contains(name) {
            errors.push(ValidationError::new(
                kind,
                format!("{context} references unknown {what} '{name}'"),
            ));
        }
    }

    fn teacher(&self, id: &str, context: &str, errors: &mut Vec<ValidationError>) {
        let kind = ValidationErrorKind::UnknownTeacher;
        Self::require(&self.teachers, id, kind, "teacher", context, errors);
    }

    fn class(&self, name: &str, context: &str, errors: &mut Vec<ValidationError>) {
        let kind = ValidationErrorKind::UnknownClass;
        Self::require(&self.classes, name, kind, "class", context, errors);
    }

    fn subject(&self, name: &str, context: &str, errors: &mut Vec<ValidationError>) {
        let kind = ValidationErrorKind::UnknownSubject;
        Self::require(&self.subjects, name, kind, "subject", context, errors);
    }

    fn slot(&self, name: &str, context: &str, errors: &mut Vec<ValidationError>) {
        let kind = ValidationErrorKind::UnknownTimeSlot;
        Self::require(&self.slots, name, kind, "time slot", context, errors);
    }
}

fn check_references(known: &Known<'_>, config: &SchoolConfig, errors: &mut Vec<ValidationError>) {
    for (c, subjects) in &config.class_requirements {
        known.class(c, "Class requirements", errors);
        for s in subjects {
            known.subject(s, &format!("Requirements of '{c}'"), errors);
        }
    }
    for s in config.subject_priorities.keys() {
        known.subject(s, "Subject priorities", errors);
    }
    for s in config.subject_categories.keys() {
        known.subject(s, "Subject categories", errors);
    }
    for (t, subjects) in &config.teacher_subjects {
        known.teacher(t, "Teacher subjects", errors);
        for s in subjects {
            known.subject(s, &format!("Subjects of '{t}'"), errors);
        }
    }
    for (t, classes) in &config.teacher_classes {
        known.teacher(t, "Teacher classes", errors);
        for c in classes {
            known.class(c, &format!("Classes of '{t}'"), errors);
        }
    }
    for (c, t) in &config.class_teachers {
        known.class(c, "Class teachers", errors);
        known.teacher(t, &format!("Class teacher of '{c}'"), errors);
    }
    for t in config.quota_overrides.keys() {
        known.teacher(t, "Quota overrides", errors);
    }
    if let Some(s) = &config.prayer_time_slot {
        known.slot(s, "Prayer slot", errors);
    }
    if let Some(s) = &config.lunch_time_slot {
        known.slot(s, "Lunch slot", errors);
    }
    for u in &config.unavailability {
        known.teacher(&u.teacher_id, "Unavailability", errors);
        known.slot(&u.time_slot, "Unavailability", errors);
    }
    for rule in &config.combined_classes {
        for c in &rule.classes {
            known.class(c, "Combined rule", errors);
        }
        known.subject(&rule.subject, "Combined rule", errors);
        known.teacher(&rule.teacher_id, "Combined rule", errors);
    }
    for rule in &config.split_classes {
        known.class(&rule.class_name, "Split rule", errors);
        for part in &rule.parts {
            known.subject(&part.subject, "Split rule", errors);
            known.teacher(&part.teacher_id, "Split rule", errors);
        }
    }
}

fn check_rules(config: &SchoolConfig, errors: &mut Vec<ValidationError>) {
    for rule in &config.combined_classes {
        let distinct: HashSet<&str> = rule.classes.iter().map(String::as_str).collect();
        if distinct.len() < 2 {
            errors.push(ValidationError::new(
                ValidationErrorKind::InvalidRule,
                format!(
                    "Combined rule for '{}' needs at least two distinct classes",
                    rule.subject
                ),
            ));
        }
    }

    for rule in &config.split_classes {
        if rule.parts.len() < 2 {
            errors.push(ValidationError::new(
                ValidationErrorKind::InvalidRule,
                format!("Split rule for '{}' needs at least two parts", rule.class_name),
            ));
        }
        let mut teachers = HashSet::new();
        for part in &rule.parts {
            if !teachers.insert(part.teacher_id.as_str()) {
                errors.push(ValidationError::new(
                    ValidationErrorKind::InvalidRule,
                    format!(
                        "Split rule for '{}' uses teacher '{}' twice",
                        rule.class_name, part.teacher_id
                    ),
                ));
            }
        }
    }
}
