use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::{check_range, ValidationError};

/// Kind of measurement carried by a ward reading.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VitalType {
    BloodPressure,
    HeartRate,
    BloodGlucose,
    Temperature,
}

impl VitalType {
    /// Default unit for this vital type.
    pub fn default_unit(self) -> &'static str {
        match self {
            VitalType::BloodPressure => "mmHg",
            VitalType::HeartRate => "bpm",
            VitalType::BloodGlucose => "mg/dL",
            VitalType::Temperature => "°C",
        }
    }

    /// Accepted measurement range at data entry.
    fn plausible_range(self) -> (f64, f64) {
        match self {
            VitalType::BloodPressure => (20.0, 300.0),
            VitalType::HeartRate => (20.0, 300.0),
            VitalType::BloodGlucose => (10.0, 1500.0),
            VitalType::Temperature => (25.0, 45.0),
        }
    }
}

/// One dated set of vital-sign measurements for a patient.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VitalSignReading {
    pub date: NaiveDate,
    #[serde(alias = "blood_pressure_systolic")]
    pub systolic: i32,
    #[serde(alias = "blood_pressure_diastolic")]
    pub diastolic: i32,
    pub heart_rate: i32,
    pub blood_sugar: i32,
    pub body_temperature: f64,
}

impl VitalSignReading {
    /// Reject physiologically impossible values before alert evaluation.
    pub fn validate(&self) -> Result<(), ValidationError> {
        let (lo, hi) = VitalType::BloodPressure.plausible_range();
        check_range("systolic", f64::from(self.systolic), lo, hi)?;
        check_range("diastolic", f64::from(self.diastolic), lo, hi)?;
        if self.diastolic > self.systolic {
            return Err(ValidationError::DiastolicAboveSystolic {
                systolic: self.systolic,
                diastolic: self.diastolic,
            });
        }

        let (lo, hi) = VitalType::HeartRate.plausible_range();
        check_range("heart_rate", f64::from(self.heart_rate), lo, hi)?;

        let (lo, hi) = VitalType::BloodGlucose.plausible_range();
        check_range("blood_sugar", f64::from(self.blood_sugar), lo, hi)?;

        let (lo, hi) = VitalType::Temperature.plausible_range();
        check_range("body_temperature", self.body_temperature, lo, hi)
    }
}

/// Most recent reading by date. Ties keep the first one seen.
pub fn latest_reading(readings: &[VitalSignReading]) -> Option<&VitalSignReading> {
    readings
        .iter()
        .fold(None, |best: Option<&VitalSignReading>, r| match best {
            Some(b) if b.date >= r.date => Some(b),
            _ => Some(r),
        })
}

/// Order readings newest first, the order every "most recent" consumer expects.
pub fn sort_most_recent_first(readings: &mut [VitalSignReading]) {
    readings.sort_by(|a, b| b.date.cmp(&a.date));
}

#[cfg(test)]
pub(crate) fn make_reading(
    date: &str,
    systolic: i32,
    diastolic: i32,
    heart_rate: i32,
    blood_sugar: i32,
    body_temperature: f64,
) -> VitalSignReading {
    VitalSignReading {
        date: NaiveDate::parse_from_str(date, "%Y-%m-%d").unwrap(),
        systolic,
        diastolic,
        heart_rate,
        blood_sugar,
        body_temperature,
    }
}
