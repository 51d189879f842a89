//! Weekdays and the daily time grid.
//!
//! A school week is a list of working days, each divided into the same
//! ordered list of time slots. Up to two slots are fixed breaks (prayer,
//! lunch); the rest are instructional.
//!
//! # Halves of the day
//! When a lunch slot is configured, instructional slots before it form the
//! "before lunch" half and those after it the "after lunch" half. Without a
//! lunch slot both halves are empty and no slot preference applies.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Day of the week.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Weekday {
    Monday,
    Tuesday,
    Wednesday,
    Thursday,
    Friday,
    Saturday,
    Sunday,
}

impl Weekday {
    /// All seven days, Monday first.
    pub const ALL: [Weekday; 7] = [
        Weekday::Monday,
        Weekday::Tuesday,
        Weekday::Wednesday,
        Weekday::Thursday,
        Weekday::Friday,
        Weekday::Saturday,
        Weekday::Sunday,
    ];

    /// Dense index (Monday = 0, Sunday = 6).
    #[inline]
    pub fn index(self) -> usize {
        self as usize
    }

    /// Full English name.
    pub fn name(self) -> &'static str {
        match self {
            Self::Monday => "Monday",
            Self::Tuesday => "Tuesday",
            Self::Wednesday => "Wednesday",
            Self::Thursday => "Thursday",
            Self::Friday => "Friday",
            Self::Saturday => "Saturday",
            Self::Sunday => "Sunday",
        }
    }

    /// Monday through Friday.
    pub fn school_week() -> Vec<Weekday> {
        Self::ALL[..5].to_vec()
    }
}

impl fmt::Display for Weekday {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Error returned when a string is not a weekday name.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown weekday: {0}")]
pub struct ParseWeekdayError(pub String);

impl FromStr for Weekday {
    type Err = ParseWeekdayError;

    /// Accepts full or three-letter names, case-insensitive.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.trim().to_lowercase();
        Self::ALL
            .iter()
            .copied()
            .find(|d| {
                let name = d.name().to_lowercase();
                name == lower || name[..3] == lower
            })
            .ok_or_else(|| ParseWeekdayError(s.to_string()))
    }
}

impl From<chrono::Weekday> for Weekday {
    fn from(day: chrono::Weekday) -> Self {
        Self::ALL[day.num_days_from_monday() as usize]
    }
}

/// Ordered time slots for one school day, shared by every working day.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimeGrid {
    /// Time slots in chronological order.
    pub time_slots: Vec<String>,
    /// Days on which the grid applies, in week order.
    pub working_days: Vec<Weekday>,
    /// Fixed prayer slot, if any.
    pub prayer_slot: Option<String>,
    /// Fixed lunch slot, if any.
    pub lunch_slot: Option<String>,
}

impl TimeGrid {
    /// Creates a grid over the given slots for Monday through Friday, without breaks.
    pub fn new(time_slots: Vec<String>) -> Self {
        Self {
            time_slots,
            working_days: Weekday::school_week(),
            prayer_slot: None,
            lunch_slot: None,
        }
    }

    /// Sets the working days. Duplicates are dropped, first occurrence wins.
    pub fn with_working_days(mut self, days: Vec<Weekday>) -> Self {
        let mut unique = Vec::with_capacity(days.len());
        for day in days {
            if !unique.contains(&day) {
                unique.push(day);
            }
        }
        self.working_days = unique;
        self
    }

    /// Sets the prayer slot.
    pub fn with_prayer_slot(mut self, slot: impl Into<String>) -> Self {
        self.prayer_slot = Some(slot.into());
        self
    }

    /// Sets the lunch slot.
    pub fn with_lunch_slot(mut self, slot: impl Into<String>) -> Self {
        self.lunch_slot = Some(slot.into());
        self
    }

    /// Position of a slot in the grid.
    pub fn slot_index(&self, slot: &str) -> Option<usize> {
        self.time_slots.iter().position(|s| s == slot)
    }

    /// Position of a day among the working days.
    pub fn day_position(&self, day: Weekday) -> Option<usize> {
        self.working_days.iter().position(|&d| d == day)
    }

    /// Whether the slot is the configured prayer or lunch slot.
    pub fn is_break(&self, slot: &str) -> bool {
        self.prayer_slot.as_deref() == Some(slot) || self.lunch_slot.as_deref() == Some(slot)
    }

    /// Indices of all non-break slots, in order.
    pub fn instructional_slots(&self) -> Vec<usize> {
        self.time_slots
            .iter()
            .enumerate()
            .filter(|(_, s)| !self.is_break(s))
            .map(|(i, _)| i)
            .collect()
    }

    /// Names of all non-break slots, in order.
    pub fn instructional_slot_names(&self) -> Vec<String> {
        self.instructional_slots()
            .into_iter()
            .map(|i| self.time_slots[i].clone())
            .collect()
    }

    /// Instructional slot indices before the lunch slot.
    pub fn before_lunch(&self) -> Vec<usize> {
        match self.lunch_index() {
            Some(lunch) => self
                .instructional_slots()
                .into_iter()
                .filter(|&i| i < lunch)
                .collect(),
            None => Vec::new(),
        }
    }

    /// Instructional slot indices after the lunch slot.
    pub fn after_lunch(&self) -> Vec<usize> {
        match self.lunch_index() {
            Some(lunch) => self
                .instructional_slots()
                .into_iter()
                .filter(|&i| i > lunch)
                .collect(),
            None => Vec::new(),
        }
    }

    fn lunch_index(&self) -> Option<usize> {
        self.lunch_slot.as_deref().and_then(|s| self.slot_index(s))
    }
}
