use crate::config::SummaryConfig;
use crate::models::{Patient, VitalSignReading, VitalType};

use super::types::SummaryRequest;

/// Readings included in a prompt. Older history is ignored to bound
/// prompt size and latency.
pub const PROMPT_READINGS: usize = 3;

/// Shown wherever vital signs would be listed but none exist.
pub const NO_VITALS_TEXT: &str = "No vital-sign data recorded.";

pub const SUMMARY_SYSTEM_PROMPT: &str = "You are an AI physician assistant. Your goal is to help \
the care team with accurate, safe and coherent summaries. Use professional language that the care \
team can follow easily. Do not give definitive diagnoses or direct prescriptions. When data is \
missing, say so and suggest collecting more.";

pub(crate) fn yes_no(flag: bool) -> &'static str {
    if flag {
        "Yes"
    } else {
        "No"
    }
}

pub(crate) fn or_not_stated(text: &str) -> &str {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        "not stated"
    } else {
        trimmed
    }
}

/// One line per reading, in the order given.
pub fn format_reading(reading: &VitalSignReading) -> String {
    format!(
        "Date: {} | Blood pressure: {}/{} {} | Heart rate: {} {} | Blood sugar: {} {} | Body temperature: {:.1} {}",
        reading.date.format("%Y-%m-%d"),
        reading.systolic,
        reading.diastolic,
        VitalType::BloodPressure.default_unit(),
        reading.heart_rate,
        VitalType::HeartRate.default_unit(),
        reading.blood_sugar,
        VitalType::BloodGlucose.default_unit(),
        reading.body_temperature,
        VitalType::Temperature.default_unit(),
    )
}

/// Format the most recent readings (history is newest first).
pub fn format_vital_signs(readings: &[VitalSignReading]) -> String {
    if readings.is_empty() {
        return NO_VITALS_TEXT.to_string();
    }
    readings
        .iter()
        .take(PROMPT_READINGS)
        .map(|r| format!("- {}", format_reading(r)))
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn build_user_prompt(patient: &Patient, readings: &[VitalSignReading]) -> String {
    format!(
        "Patient details:
- Name: {name}
- Age: {age}
- Reason for admission: {reason}
- Emergency: {emergency}
- Current medications: {medications}

Recent vital signs:
{vitals}

Instructions:
- Write a short, structured clinical summary of roughly 120 to 180 words.
- Act as an AI physician assistant; emphasise safety, clarity and next steps.
- If data is limited, state the limitations plainly.
- Use these sections:
  1) Status summary
  2) Positive and negative clinical findings
  3) Suggested next actions (not definitive medical orders)
  4) Warning and disclaimer (this text does not replace the physician's decision)",
        name = patient.display_name(),
        age = patient.age,
        reason = or_not_stated(&patient.reason),
        emergency = yes_no(patient.emergency),
        medications = or_not_stated(&patient.medications),
        vitals = format_vital_signs(readings),
    )
}

pub fn build_request(
    config: &SummaryConfig,
    patient: &Patient,
    readings: &[VitalSignReading],
) -> SummaryRequest {
    SummaryRequest {
        system: SUMMARY_SYSTEM_PROMPT.to_string(),
        prompt: build_user_prompt(patient, readings),
        temperature: config.temperature,
        max_tokens: config.max_tokens,
    }
}
