//! Local rule-based summary used when no backend answers in time.
//!
//! Pure and infallible: it reads only the most recent reading and reuses
//! the alert engine's thresholds, phrased as prose.

use crate::intelligence::{evaluate, MessageTemplates};
use crate::models::{Patient, VitalSignReading};

use super::prompt::{format_reading, or_not_stated, yes_no, NO_VITALS_TEXT};

/// Heart rate (bpm) above which the fallback flags tachycardia.
pub const TACHYCARDIA_LIMIT: i32 = 100;
/// Heart rate (bpm) below which the fallback flags bradycardia.
pub const BRADYCARDIA_LIMIT: i32 = 60;

pub const FALLBACK_DISCLAIMER: &str =
    "This text is only an aid for the care team and does not replace clinician judgment.";

const NEXT_ACTIONS: &str = "re-check vital signs, review the medication record, complete the \
patient history and, if needed, refer to the responsible physician.";

/// Clinical flags for one reading, in alert-engine order, then heart rate.
pub fn clinical_flags(patient: &Patient, reading: &VitalSignReading) -> Vec<&'static str> {
    let mut flags: Vec<&'static str> = evaluate(patient, reading)
        .into_iter()
        .map(MessageTemplates::flag)
        .collect();

    if reading.heart_rate > TACHYCARDIA_LIMIT {
        flags.push("possible tachycardia");
    } else if reading.heart_rate < BRADYCARDIA_LIMIT {
        flags.push("possible bradycardia");
    }

    flags
}

/// Build the fallback summary. `readings` is newest first.
pub fn local_fallback_summary(patient: &Patient, readings: &[VitalSignReading]) -> String {
    let latest = readings.first();

    let vitals = latest
        .map(format_reading)
        .unwrap_or_else(|| NO_VITALS_TEXT.to_string());

    let flags = match latest {
        Some(r) => {
            let flags = clinical_flags(patient, r);
            if flags.is_empty() {
                "no clear warning sign in the available data".to_string()
            } else {
                flags.join("; ")
            }
        }
        None => "cannot be assessed without vital-sign data".to_string(),
    };

    format!(
        "Status summary: {name}, age {age}, reason for admission: {reason}. \
Emergency: {emergency}. Current medications: {medications}.

Latest vital signs:
{vitals}

Clinical flags: {flags}.

Suggested next actions: {next_actions}

{disclaimer}",
        name = patient.display_name(),
        age = patient.age,
        reason = or_not_stated(&patient.reason),
        emergency = yes_no(patient.emergency),
        medications = or_not_stated(&patient.medications),
        next_actions = NEXT_ACTIONS,
        disclaimer = FALLBACK_DISCLAIMER,
    )
}
