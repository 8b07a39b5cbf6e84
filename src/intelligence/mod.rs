//! Rule-based vital-sign alerting.
//!
//! `detection` evaluates a single reading against fixed and
//! age-conditioned thresholds. `ward` aggregates those alerts for the
//! doctor dashboard. Nothing here performs I/O or holds state.

pub mod detection;
pub mod messages;
pub mod types;
pub mod ward;

pub use detection::{evaluate, evaluate_alerts, glucose_threshold_for_age};
pub use messages::MessageTemplates;
pub use types::{AlertKind, GlucoseBracket};
pub use ward::{ward_alerts, Dismissals, EmergencyPatient, WardAlerts, WardPatient};
