use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// AlertKind
// ---------------------------------------------------------------------------

/// One threshold violation on a single reading.
///
/// Variant order is the evaluation order, so sorting by kind reproduces
/// the engine's output order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AlertKind {
    Hypertension,
    Fever,
    SeizureRisk,
    HypothermiaRisk,
    AbnormalGlucose,
}

impl AlertKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Hypertension => "hypertension",
            Self::Fever => "fever",
            Self::SeizureRisk => "seizure_risk",
            Self::HypothermiaRisk => "hypothermia_risk",
            Self::AbnormalGlucose => "abnormal_glucose",
        }
    }
}

// ---------------------------------------------------------------------------
// GlucoseBracket
// ---------------------------------------------------------------------------

/// Age bracket for the blood-sugar rule. Upper bounds are inclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum GlucoseBracket {
    UpToThirty,
    ThirtyOneToForty,
    OverForty,
}

impl GlucoseBracket {
    pub fn for_age(age: u32) -> Self {
        match age {
            0..=30 => Self::UpToThirty,
            31..=40 => Self::ThirtyOneToForty,
            _ => Self::OverForty,
        }
    }

    /// Blood sugar (mg/dL) above which the reading is abnormal.
    pub fn threshold(self) -> i32 {
        match self {
            Self::UpToThirty => 100,
            Self::ThirtyOneToForty => 108,
            Self::OverForty => 160,
        }
    }
}
