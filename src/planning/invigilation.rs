//! Exam invigilation duty assignment.
//!
//! Every working day × instructional slot receives up to `n` invigilators
//! (default 2) from the teachers not teaching at that time. Candidates are
//! taken in ascending order of duties assigned so far; roster order breaks
//! ties. The result is deterministic for a fixed roster order.
//!
//! Fewer than `n` invigilators (even none) is a valid outcome.

use std::collections::{BTreeMap, HashSet};

use tracing::debug;

use crate::models::{DutyChart, DutySlot, Schedule, Teacher, TimeGrid, Weekday};

/// Default invigilators per slot.
pub const DEFAULT_INVIGILATORS_PER_SLOT: usize = 2;

/// Assigns invigilation duties over a time grid.
#[derive(Debug, Clone)]
pub struct InvigilationAssigner<'a> {
    grid: &'a TimeGrid,
    per_slot: usize,
}

impl<'a> InvigilationAssigner<'a> {
    /// Creates an assigner for a grid.
    pub fn new(grid: &'a TimeGrid) -> Self {
        Self {
            grid,
            per_slot: DEFAULT_INVIGILATORS_PER_SLOT,
        }
    }

    /// Sets the invigilators wanted per slot.
    pub fn with_invigilators_per_slot(mut self, n: usize) -> Self {
        self.per_slot = n;
        self
    }

    /// Builds the duty chart for a schedule and roster.
    pub fn assign(&self, schedule: &Schedule, teachers: &[Teacher]) -> DutyChart {
        let occupied: HashSet<(&str, Weekday, &str)> = schedule
            .entries
            .iter()
            .flat_map(|e| {
                e.teachers()
                    .into_iter()
                    .map(move |t| (t, e.day, e.time_slot.as_str()))
            })
            .collect();

        let slots = self.grid.instructional_slot_names();
        let mut counts: Vec<u32> = vec![0; teachers.len()];
        let mut chart = DutyChart {
            duties: Vec::with_capacity(self.grid.working_days.len() * slots.len()),
            time_slots: slots.clone(),
            duty_counts: BTreeMap::new(),
        };

        for &day in &self.grid.working_days {
            for slot in &slots {
                let mut free: Vec<usize> = (0..teachers.len())
                    .filter(|&i| {
                        !occupied.contains(&(teachers[i].id.as_str(), day, slot.as_str()))
                    })
                    .collect();
                // stable: equal counts keep roster order
                free.sort_by_key(|&i| counts[i]);
                free.truncate(self.per_slot);

                if free.len() < self.per_slot {
                    debug!(
                        %day,
                        slot = %slot,
                        assigned = free.len(),
                        "invigilation slot understaffed"
                    );
                }
                for &i in &free {
                    counts[i] += 1;
                }
                chart.duties.push(DutySlot {
                    day,
                    time_slot: slot.clone(),
                    teachers: free.iter().map(|&i| teachers[i].id.clone()).collect(),
                });
            }
        }

        chart.duty_counts = teachers
            .iter()
            .zip(&counts)
            .filter(|(_, n)| **n > 0)
            .map(|(t, &n)| (t.id.clone(), n))
            .collect();
        chart
    }
}
