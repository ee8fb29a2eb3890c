use thiserror::Error;

use super::calendar::MonthKey;
use super::types::{BusinessType, MAX_MONTHS};

/// Configuration failures that stop a run before the first month is stepped.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum SimulationError {
    #[error("{business_type} simulation requires {missing} inputs")]
    MissingInputs {
        business_type: BusinessType,
        missing: &'static str,
    },
    #[error("invalid start month {0:?}, expected zero-padded YYYY-MM")]
    InvalidStartMonth(String),
    #[error("month count must be between 1 and {}", MAX_MONTHS)]
    InvalidMonthCount,
    #[error("{months} months from {start} run past 9999-12")]
    HorizonPastCalendar { start: MonthKey, months: u32 },
    #[error("duplicate {schedule} entry for Q{quarter} {year}")]
    DuplicateQuarter {
        schedule: &'static str,
        quarter: u8,
        year: i32,
    },
    #[error("{field} must be {expected}, got {value}")]
    OutOfRange {
        field: String,
        expected: &'static str,
        value: f64,
    },
}
