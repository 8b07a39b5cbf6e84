//! Doctor dashboard aggregation.
//!
//! Each patient contributes the alerts of their most recent reading.
//! Emergency patients are listed separately. Dismissals apply to this
//! view only and are never stored.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::models::{latest_reading, Patient, VitalSignReading};

use super::detection::evaluate_alerts;

/// A patient together with their already-loaded readings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WardPatient {
    pub id: u64,
    pub patient: Patient,
    #[serde(default)]
    pub readings: Vec<VitalSignReading>,
}

/// Items the doctor has dismissed for the current view.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Dismissals {
    #[serde(default)]
    pub alerts: Vec<String>,
    #[serde(default)]
    pub patients: Vec<u64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmergencyPatient {
    pub id: u64,
    pub name: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WardAlerts {
    pub alerts: Vec<String>,
    pub emergency_patients: Vec<EmergencyPatient>,
}

/// Collect dashboard alerts for the whole ward, in patient order.
pub fn ward_alerts(patients: &[WardPatient], dismissals: &Dismissals) -> WardAlerts {
    let dismissed_alerts: HashSet<&str> = dismissals.alerts.iter().map(String::as_str).collect();
    let dismissed_patients: HashSet<u64> = dismissals.patients.iter().copied().collect();

    let mut view = WardAlerts::default();

    for entry in patients {
        if let Some(latest) = latest_reading(&entry.readings) {
            view.alerts.extend(
                evaluate_alerts(&entry.patient, latest)
                    .into_iter()
                    .filter(|a| !dismissed_alerts.contains(a.as_str())),
            );
        }

        if entry.patient.emergency && !dismissed_patients.contains(&entry.id) {
            view.emergency_patients.push(EmergencyPatient {
                id: entry.id,
                name: entry.patient.display_name(),
            });
        }
    }

    tracing::debug!(
        patients = patients.len(),
        alerts = view.alerts.len(),
        emergency = view.emergency_patients.len(),
        "Ward alerts aggregated"
    );

    view
}
