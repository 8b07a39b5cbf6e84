use super::types::AlertKind;

/// Ward-facing alert wording. Every message names the patient so that
/// alerts stay meaningful once aggregated on the doctor dashboard.
pub struct MessageTemplates;

impl MessageTemplates {
    pub fn alert(kind: AlertKind, patient_name: &str) -> String {
        match kind {
            AlertKind::Hypertension => Self::hypertension(patient_name),
            AlertKind::Fever => Self::fever(patient_name),
            AlertKind::SeizureRisk => Self::seizure_risk(patient_name),
            AlertKind::HypothermiaRisk => Self::hypothermia_risk(patient_name),
            AlertKind::AbnormalGlucose => Self::abnormal_glucose(patient_name),
        }
    }

    pub fn hypertension(patient_name: &str) -> String {
        format!("Patient {patient_name}: blood pressure above the permitted range")
    }

    pub fn fever(patient_name: &str) -> String {
        format!("Patient {patient_name}: body temperature above the permitted range (fever)")
    }

    pub fn seizure_risk(patient_name: &str) -> String {
        format!("Patient {patient_name}: seizure risk")
    }

    pub fn hypothermia_risk(patient_name: &str) -> String {
        format!("Patient {patient_name}: hypothermia risk")
    }

    pub fn abnormal_glucose(patient_name: &str) -> String {
        format!("Patient {patient_name}: blood sugar abnormal for age")
    }

    /// Short clinical flag used in prose summaries.
    pub fn flag(kind: AlertKind) -> &'static str {
        match kind {
            AlertKind::Hypertension => "blood pressure above the permitted range",
            AlertKind::Fever => "possible fever",
            AlertKind::SeizureRisk => "temperature high enough to carry seizure risk",
            AlertKind::HypothermiaRisk => "possible hypothermia",
            AlertKind::AbnormalGlucose => "blood sugar above the recommended range for age",
        }
    }
}
