//! Error types for planning operations.
//!
//! Timetable generation never fails; unfillable cells become gaps. Only the
//! substitution planner can reject its input.

use chrono::NaiveDate;
use thiserror::Error;

use crate::models::Weekday;

/// Result type for planning operations.
pub type PlanResult<T> = std::result::Result<T, PlanError>;

/// Errors a planner can return.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PlanError {
    /// Date string is not `YYYY-MM-DD`.
    #[error("Invalid date: {0}")]
    InvalidDate(String),

    /// Date falls on a day outside the configured working days.
    #[error("{date} is a {weekday}, which is not a working day")]
    NonWorkingDay { date: NaiveDate, weekday: Weekday },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        assert_eq!(
            PlanError::InvalidDate("2024-13-01".into()).to_string(),
            "Invalid date: 2024-13-01"
        );
        let date = NaiveDate::from_ymd_opt(2024, 9, 8).unwrap();
        let err = PlanError::NonWorkingDay {
            date,
            weekday: Weekday::Sunday,
        };
        assert_eq!(err.to_string(), "2024-09-08 is a Sunday, which is not a working day");
    }
}
