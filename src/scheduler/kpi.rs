//! Timetable quality metrics (KPIs).
//!
//! Computes indicators from a finished schedule and the inputs it was
//! generated from.
//!
//! # Metrics
//!
//! | Metric | Definition |
//! |--------|-----------|
//! | Fill Rate | Taught class-cells / instructional class-cells |
//! | Gaps | Number of `"---"` entries |
//! | Weekly Load | Periods per teacher across the week |
//! | Avg Load | Mean weekly load over the roster |
//! | Main Coverage | Placed (day, class, main subject) / required |
//!
//! A class-cell is one class at one (day, slot); a combined period fills
//! one cell per class it covers.

use std::collections::HashMap;

use crate::models::{Catalog, Schedule, SchoolConfig};

/// Timetable performance indicators.
#[derive(Debug, Clone)]
pub struct TimetableKpi {
    /// Total entries.
    pub entry_count: usize,
    /// Class-cells with something taught.
    pub taught_cells: usize,
    /// Explicit gaps.
    pub gaps: usize,
    /// Fraction of instructional class-cells that are taught (0.0..1.0).
    pub fill_rate: f64,
    /// Periods per teacher id across the week.
    pub weekly_load: HashMap<String, usize>,
    /// Mean weekly load over the roster.
    pub avg_weekly_load: f64,
    /// Fraction of required (day, class, main subject) placements made (0.0..1.0).
    pub main_coverage_rate: f64,
}

impl TimetableKpi {
    /// Computes KPIs from a schedule and its inputs.
    ///
    /// # Arguments
    /// * `schedule` - The generated timetable.
    /// * `catalog` - Teachers, classes, and slots it was generated for.
    /// * `config` - Requirements and breaks.
    pub fn calculate(schedule: &Schedule, catalog: &Catalog, config: &SchoolConfig) -> Self {
        let grid = config.time_grid(&catalog.time_slots);

        let taught_cells: usize = schedule
            .entries
            .iter()
            .filter(|e| e.is_taught())
            .map(|e| e.classes().len())
            .sum();
        let instructional_cells =
            grid.working_days.len() * grid.instructional_slots().len() * catalog.classes.len();
        let fill_rate = if instructional_cells == 0 {
            0.0
        } else {
            (taught_cells as f64 / instructional_cells as f64).min(1.0)
        };

        let weekly_load: HashMap<String, usize> = catalog
            .teachers
            .iter()
            .map(|t| (t.id.clone(), schedule.weekly_load(&t.id)))
            .collect();
        let avg_weekly_load = if weekly_load.is_empty() {
            0.0
        } else {
            weekly_load.values().sum::<usize>() as f64 / weekly_load.len() as f64
        };

        let mut required = 0usize;
        let mut placed = 0usize;
        for &day in &grid.working_days {
            for class in &catalog.classes {
                for subject in config.requirements_of(class) {
                    if !config.is_main(subject) {
                        continue;
                    }
                    required += 1;
                    let found = schedule.entries.iter().any(|e| {
                        e.day == day
                            && e.covers_class(class)
                            && e.subjects().contains(&subject.as_str())
                    });
                    if found {
                        placed += 1;
                    }
                }
            }
        }
        // No main requirements → fully covered
        let main_coverage_rate = if required == 0 {
            1.0
        } else {
            placed as f64 / required as f64
        };

        Self {
            entry_count: schedule.entry_count(),
            taught_cells,
            gaps: schedule.gap_count(),
            fill_rate,
            weekly_load,
            avg_weekly_load,
            main_coverage_rate,
        }
    }

    /// Whether the timetable meets the given quality thresholds.
    pub fn meets_thresholds(&self, min_fill_rate: f64, max_gaps: usize) -> bool {
        self.fill_rate >= min_fill_rate && self.gaps <= max_gaps
    }
}
