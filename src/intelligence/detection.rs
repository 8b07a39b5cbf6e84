use crate::models::{Patient, VitalSignReading};

use super::messages::MessageTemplates;
use super::types::{AlertKind, GlucoseBracket};

/// Systolic pressure (mmHg) above which the hypertension alert fires.
pub const SYSTOLIC_LIMIT: i32 = 120;
/// Diastolic pressure (mmHg) above which the hypertension alert fires.
pub const DIASTOLIC_LIMIT: i32 = 80;
/// Temperature (°C) above which the fever alert fires.
pub const FEVER_LIMIT: f64 = 38.0;
/// Temperature (°C) above which the seizure-risk alert fires.
pub const SEIZURE_LIMIT: f64 = 40.0;
/// Temperature (°C) below which the hypothermia alert fires.
pub const HYPOTHERMIA_LIMIT: f64 = 35.0;

// ---------------------------------------------------------------------------
// Threshold evaluation
// ---------------------------------------------------------------------------

/// Evaluate one reading against every rule.
///
/// Rules are independent: nothing is suppressed because another rule fired.
/// The result is in rule-table order (pressure, fever, seizure, hypothermia,
/// glucose), not priority order.
pub fn evaluate(patient: &Patient, reading: &VitalSignReading) -> Vec<AlertKind> {
    let mut alerts = Vec::new();

    if reading.systolic > SYSTOLIC_LIMIT || reading.diastolic > DIASTOLIC_LIMIT {
        alerts.push(AlertKind::Hypertension);
    }
    if reading.body_temperature > FEVER_LIMIT {
        alerts.push(AlertKind::Fever);
    }
    if reading.body_temperature > SEIZURE_LIMIT {
        alerts.push(AlertKind::SeizureRisk);
    }
    if reading.body_temperature < HYPOTHERMIA_LIMIT {
        alerts.push(AlertKind::HypothermiaRisk);
    }
    if reading.blood_sugar > glucose_threshold_for_age(patient.age) {
        alerts.push(AlertKind::AbnormalGlucose);
    }

    alerts
}

/// Evaluate one reading and render each alert for the ward.
pub fn evaluate_alerts(patient: &Patient, reading: &VitalSignReading) -> Vec<String> {
    let name = patient.display_name();
    evaluate(patient, reading)
        .into_iter()
        .map(|kind| MessageTemplates::alert(kind, &name))
        .collect()
}

/// Blood sugar (mg/dL) above which a reading is abnormal for this age.
pub fn glucose_threshold_for_age(age: u32) -> i32 {
    GlucoseBracket::for_age(age).threshold()
}
