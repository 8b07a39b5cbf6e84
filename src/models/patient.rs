use serde::{Deserialize, Serialize};

use super::{check_range, ValidationError};

/// Oldest age accepted at intake.
pub const MAX_PATIENT_AGE: u32 = 130;

/// A ward patient as registered at intake.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Patient {
    pub first_name: String,
    pub last_name: String,
    pub age: u32,
    /// Free-text reason for admission.
    #[serde(default)]
    pub reason: String,
    #[serde(default)]
    pub emergency: bool,
    /// Free-text medication list, edited by doctors.
    #[serde(default)]
    pub medications: String,
}

impl Patient {
    /// "First Last", collapsing missing parts.
    pub fn display_name(&self) -> String {
        let first = self.first_name.trim();
        let last = self.last_name.trim();
        match (first.is_empty(), last.is_empty()) {
            (false, false) => format!("{first} {last}"),
            (false, true) => first.to_string(),
            (true, false) => last.to_string(),
            (true, true) => String::new(),
        }
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.display_name().is_empty() {
            return Err(ValidationError::Empty("patient name"));
        }
        check_range("age", f64::from(self.age), 0.0, f64::from(MAX_PATIENT_AGE))
    }
}

#[cfg(test)]
pub(crate) fn make_patient(first: &str, last: &str, age: u32) -> Patient {
    Patient {
        first_name: first.into(),
        last_name: last.into(),
        age,
        reason: String::new(),
        emergency: false,
        medications: String::new(),
    }
}
