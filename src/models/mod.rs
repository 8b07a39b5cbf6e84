pub mod patient;
pub mod series;
pub mod vital_sign;

pub use patient::*;
pub use series::*;
pub use vital_sign::*;

use thiserror::Error;

/// Rejected input fields. Callers validate before handing data to the
/// alert engine, which assumes well-formed numbers.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ValidationError {
    #[error("{field} out of range: {value} (expected {min}..={max})")]
    OutOfRange {
        field: &'static str,
        value: f64,
        min: f64,
        max: f64,
    },

    #[error("{0} must be a finite number")]
    NonFinite(&'static str),

    #[error("Diastolic pressure {diastolic} exceeds systolic pressure {systolic}")]
    DiastolicAboveSystolic { systolic: i32, diastolic: i32 },

    #[error("{0} must not be empty")]
    Empty(&'static str),
}

pub(crate) fn check_range(
    field: &'static str,
    value: f64,
    min: f64,
    max: f64,
) -> Result<(), ValidationError> {
    if !value.is_finite() {
        return Err(ValidationError::NonFinite(field));
    }
    if value < min || value > max {
        return Err(ValidationError::OutOfRange {
            field,
            value,
            min,
            max,
        });
    }
    Ok(())
}
