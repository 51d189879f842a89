//! Booking ledger: who is busy when, for one generation run.
//!
//! # Representation
//! Teacher ids, class names, subject names, and time slots are interned
//! once per run into dense [`TypedIndex`](crate::index::TypedIndex) keys by
//! a [`Registry`]. Occupancy is then a set of flat boolean tables indexed
//! by (day, slot, teacher), (day, slot, class), and (day, class, subject),
//! so every query is an array lookup.
//!
//! A ledger is owned by the run that created it and is never shared.

use std::collections::HashMap;

use crate::index::{ClassKey, SlotKey, SubjectKey, TeacherKey};
use crate::models::{Catalog, SchoolConfig, ScheduleEntry, Weekday};

const DAYS: usize = 7;

#[derive(Debug, Clone, Default)]
struct Interner {
    names: Vec<String>,
    lookup: HashMap<String, usize>,
}

impl Interner {
    fn intern(&mut self, name: &str) -> usize {
        if let Some(&i) = self.lookup.get(name) {
            return i;
        }
        let i = self.names.len();
        self.names.push(name.to_string());
        self.lookup.insert(name.to_string(), i);
        i
    }

    fn get(&self, name: &str) -> Option<usize> {
        self.lookup.get(name).copied()
    }

    fn name(&self, i: usize) -> &str {
        &self.names[i]
    }

    fn len(&self) -> usize {
        self.names.len()
    }
}

/// Interned names for one run.
///
/// Interning order is deterministic: teachers follow the roster, classes
/// and slots follow the catalog, subjects follow the catalog and then any
/// subject first mentioned by a class requirement, a rule, or a teacher
/// qualification.
#[derive(Debug, Clone, Default)]
pub struct Registry {
    teachers: Interner,
    classes: Interner,
    subjects: Interner,
    slots: Interner,
}

impl Registry {
    /// Interns every name the catalog and configuration mention.
    pub fn build(catalog: &Catalog, config: &SchoolConfig) -> Self {
        let mut reg = Self::default();
        for t in &catalog.teachers {
            reg.teachers.intern(&t.id);
        }
        for c in &catalog.classes {
            reg.classes.intern(c);
        }
        for s in &catalog.time_slots {
            reg.slots.intern(s);
        }
        for s in &catalog.subjects {
            reg.subjects.intern(s);
        }
        for c in &catalog.classes {
            for s in config.requirements_of(c) {
                reg.subjects.intern(s);
            }
        }
        for rule in &config.combined_classes {
            reg.subjects.intern(&rule.subject);
        }
        for rule in &config.split_classes {
            for part in &rule.parts {
                reg.subjects.intern(&part.subject);
            }
        }
        for t in &catalog.teachers {
            if let Some(subjects) = config.teacher_subjects.get(&t.id) {
                for s in subjects {
                    reg.subjects.intern(s);
                }
            }
        }
        reg
    }

    pub fn teacher(&self, id: &str) -> Option<TeacherKey> {
        self.teachers.get(id).map(TeacherKey::new)
    }

    pub fn class(&self, name: &str) -> Option<ClassKey> {
        self.classes.get(name).map(ClassKey::new)
    }

    pub fn subject(&self, name: &str) -> Option<SubjectKey> {
        self.subjects.get(name).map(SubjectKey::new)
    }

    pub fn slot(&self, name: &str) -> Option<SlotKey> {
        self.slots.get(name).map(SlotKey::new)
    }

    pub fn teacher_id(&self, key: TeacherKey) -> &str {
        self.teachers.name(key.get())
    }

    pub fn class_name(&self, key: ClassKey) -> &str {
        self.classes.name(key.get())
    }

    pub fn subject_name(&self, key: SubjectKey) -> &str {
        self.subjects.name(key.get())
    }

    pub fn slot_name(&self, key: SlotKey) -> &str {
        self.slots.name(key.get())
    }

    pub fn teacher_count(&self) -> usize {
        self.teachers.len()
    }

    pub fn class_count(&self) -> usize {
        self.classes.len()
    }

    pub fn subject_count(&self) -> usize {
        self.subjects.len()
    }

    pub fn slot_count(&self) -> usize {
        self.slots.len()
    }

    /// All teacher keys in roster order.
    pub fn teachers(&self) -> impl Iterator<Item = TeacherKey> {
        (0..self.teachers.len()).map(TeacherKey::new)
    }

    /// All class keys in catalog order.
    pub fn classes(&self) -> impl Iterator<Item = ClassKey> {
        (0..self.classes.len()).map(ClassKey::new)
    }

    /// All slot keys in time order.
    pub fn slots(&self) -> impl Iterator<Item = SlotKey> {
        (0..self.slots.len()).map(SlotKey::new)
    }
}

/// Occupancy tracking for one generation run.
#[derive(Debug, Clone)]
pub struct BookingLedger {
    registry: Registry,
    teacher_busy: Vec<bool>,
    class_busy: Vec<bool>,
    main_booked: Vec<bool>,
    unavailable: Vec<bool>,
    load: Vec<u32>,
    is_main: Vec<bool>,
    is_break: Vec<bool>,
}

impl BookingLedger {
    /// Creates an empty ledger over the catalog, loading the static
    /// unavailability rules and subject categories from the configuration.
    ///
    /// Rules naming unknown teachers or slots are ignored.
    pub fn new(catalog: &Catalog, config: &SchoolConfig) -> Self {
        let registry = Registry::build(catalog, config);
        let slots = registry.slot_count();
        let teachers = registry.teacher_count();
        let classes = registry.class_count();
        let subjects = registry.subject_count();

        let mut unavailable = vec![false; DAYS * slots * teachers];
        for rule in &config.unavailability {
            let teacher = registry.teacher(&rule.teacher_id);
            if let (Some(t), Some(s)) = (teacher, registry.slot(&rule.time_slot)) {
                unavailable[(rule.day.index() * slots + s.get()) * teachers + t.get()] = true;
            }
        }

        let is_main = (0..subjects)
            .map(|i| config.is_main(registry.subjects.name(i)))
            .collect();
        let is_break = (0..slots)
            .map(|i| {
                let name = Some(registry.slots.name(i));
                config.prayer_time_slot.as_deref() == name
                    || config.lunch_time_slot.as_deref() == name
            })
            .collect();

        Self {
            teacher_busy: vec![false; DAYS * slots * teachers],
            class_busy: vec![false; DAYS * slots * classes],
            main_booked: vec![false; DAYS * classes * subjects],
            unavailable,
            load: vec![0; DAYS * teachers],
            is_main,
            is_break,
            registry,
        }
    }

    /// The interned names this ledger is keyed by.
    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    #[inline]
    fn teacher_cell(&self, t: TeacherKey, day: Weekday, slot: SlotKey) -> usize {
        (day.index() * self.registry.slot_count() + slot.get()) * self.registry.teacher_count()
            + t.get()
    }

    #[inline]
    fn class_cell(&self, c: ClassKey, day: Weekday, slot: SlotKey) -> usize {
        (day.index() * self.registry.slot_count() + slot.get()) * self.registry.class_count()
            + c.get()
    }

    #[inline]
    fn subject_cell(&self, c: ClassKey, day: Weekday, s: SubjectKey) -> usize {
        (day.index() * self.registry.class_count() + c.get()) * self.registry.subject_count()
            + s.get()
    }

    /// Whether the teacher already has a period at this day and slot.
    pub fn is_teacher_booked(&self, t: TeacherKey, day: Weekday, slot: SlotKey) -> bool {
        self.teacher_busy[self.teacher_cell(t, day, slot)]
    }

    /// Whether the class already has an entry at this day and slot.
    pub fn is_class_booked(&self, c: ClassKey, day: Weekday, slot: SlotKey) -> bool {
        self.class_busy[self.class_cell(c, day, slot)]
    }

    /// Whether a main subject is already booked for the class that day.
    ///
    /// Always `false` for additional subjects, which may repeat.
    pub fn is_class_subject_booked_today(&self, c: ClassKey, day: Weekday, s: SubjectKey) -> bool {
        self.is_main[s.get()] && self.main_booked[self.subject_cell(c, day, s)]
    }

    /// Static lookup against the configured unavailability rules.
    pub fn is_teacher_unavailable(&self, t: TeacherKey, day: Weekday, slot: SlotKey) -> bool {
        self.unavailable[self.teacher_cell(t, day, slot)]
    }

    /// Instructional periods booked for the teacher that day.
    pub fn teacher_load_today(&self, t: TeacherKey, day: Weekday) -> u32 {
        self.load[day.index() * self.registry.teacher_count() + t.get()]
    }

    /// Whether the teacher is booked in a slot directly before or after `slot`.
    pub fn has_adjacent_booking(&self, t: TeacherKey, day: Weekday, slot: SlotKey) -> bool {
        let i = slot.get();
        let before = i > 0 && self.is_teacher_booked(t, day, SlotKey::new(i - 1));
        let after = i + 1 < self.registry.slot_count()
            && self.is_teacher_booked(t, day, SlotKey::new(i + 1));
        before || after
    }

    /// Whether the slot is a prayer or lunch slot.
    pub fn is_break_slot(&self, slot: SlotKey) -> bool {
        self.is_break[slot.get()]
    }

    /// Whether the subject is categorized main.
    pub fn is_main_subject(&self, s: SubjectKey) -> bool {
        self.is_main[s.get()]
    }

    /// Records an entry. Every class and teacher the entry names is booked
    /// individually; booking the same entry twice changes nothing.
    ///
    /// Names unknown to the registry are skipped.
    pub fn book(&mut self, entry: &ScheduleEntry) {
        let Some(slot) = self.registry.slot(&entry.time_slot) else {
            return;
        };
        let day = entry.day;

        let classes: Vec<ClassKey> = entry
            .classes()
            .into_iter()
            .filter_map(|c| self.registry.class(c))
            .collect();
        let teachers: Vec<TeacherKey> = entry
            .teachers()
            .into_iter()
            .filter_map(|t| self.registry.teacher(t))
            .collect();
        let subjects: Vec<SubjectKey> = entry
            .subjects()
            .into_iter()
            .filter_map(|s| self.registry.subject(s))
            .collect();

        for &c in &classes {
            let cell = self.class_cell(c, day, slot);
            self.class_busy[cell] = true;
        }

        let instructional = !self.is_break_slot(slot);
        for &t in &teachers {
            let cell = self.teacher_cell(t, day, slot);
            if !self.teacher_busy[cell] {
                self.teacher_busy[cell] = true;
                if instructional {
                    self.load[day.index() * self.registry.teacher_count() + t.get()] += 1;
                }
            }
        }

        for &s in &subjects {
            if !self.is_main[s.get()] {
                continue;
            }
            for &c in &classes {
                let cell = self.subject_cell(c, day, s);
                self.main_booked[cell] = true;
            }
        }
    }

    /// [`Self::is_teacher_booked`] by name; unknown names are never booked.
    pub fn is_teacher_booked_by_id(&self, teacher_id: &str, day: Weekday, slot: &str) -> bool {
        match (self.registry.teacher(teacher_id), self.registry.slot(slot)) {
            (Some(t), Some(s)) => self.is_teacher_booked(t, day, s),
            _ => false,
        }
    }

    /// [`Self::is_class_booked`] by name; unknown names are never booked.
    pub fn is_class_booked_by_name(&self, class: &str, day: Weekday, slot: &str) -> bool {
        match (self.registry.class(class), self.registry.slot(slot)) {
            (Some(c), Some(s)) => self.is_class_booked(c, day, s),
            _ => false,
        }
    }

    /// [`Self::is_class_subject_booked_today`] by name.
    pub fn is_class_subject_booked_today_by_name(
        &self,
        class: &str,
        day: Weekday,
        subject: &str,
    ) -> bool {
        match (self.registry.class(class), self.registry.subject(subject)) {
            (Some(c), Some(s)) => self.is_class_subject_booked_today(c, day, s),
            _ => false,
        }
    }

    /// [`Self::is_teacher_unavailable`] by name.
    pub fn is_teacher_unavailable_by_id(&self, teacher_id: &str, day: Weekday, slot: &str) -> bool {
        match (self.registry.teacher(teacher_id), self.registry.slot(slot)) {
            (Some(t), Some(s)) => self.is_teacher_unavailable(t, day, s),
            _ => false,
        }
    }

    /// [`Self::teacher_load_today`] by id; unknown teachers have no load.
    pub fn teacher_load_today_by_id(&self, teacher_id: &str, day: Weekday) -> u32 {
        self.registry
            .teacher(teacher_id)
            .map_or(0, |t| self.teacher_load_today(t, day))
    }
}
