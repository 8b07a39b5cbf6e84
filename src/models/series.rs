use serde::Serialize;

use super::VitalSignReading;

/// Readings charted on the patient detail view.
pub const MAX_CHART_READINGS: usize = 200;

/// Parallel, chronologically ordered arrays for chart rendering.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct VitalSeries {
    pub dates: Vec<String>,
    pub systolic: Vec<i32>,
    pub diastolic: Vec<i32>,
    pub heart_rate: Vec<i32>,
    pub blood_sugar: Vec<i32>,
    pub body_temperature: Vec<f64>,
}

impl VitalSeries {
    /// Build from a newest-first history. Only the newest
    /// `MAX_CHART_READINGS` are kept; output runs oldest first.
    pub fn from_readings(readings: &[VitalSignReading]) -> Self {
        let mut series = VitalSeries::default();
        for r in readings.iter().take(MAX_CHART_READINGS).rev() {
            series.dates.push(r.date.format("%Y-%m-%d").to_string());
            series.systolic.push(r.systolic);
            series.diastolic.push(r.diastolic);
            series.heart_rate.push(r.heart_rate);
            series.blood_sugar.push(r.blood_sugar);
            series.body_temperature.push(r.body_temperature);
        }
        series
    }

    pub fn len(&self) -> usize {
        self.dates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dates.is_empty()
    }
}
