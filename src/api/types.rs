//! Shared types for the API layer.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::intelligence::{Dismissals, EmergencyPatient, WardPatient};
use crate::models::{Patient, VitalSignReading};
use crate::summary::{SummaryOrchestrator, SummarySource};

// ═══════════════════════════════════════════════════════════
// API context (shared state for the router)
// ═══════════════════════════════════════════════════════════

/// Shared context for all API routes. Holds no patient data.
#[derive(Clone)]
pub struct ApiContext {
    pub orchestrator: Arc<SummaryOrchestrator>,
}

impl ApiContext {
    pub fn new(orchestrator: SummaryOrchestrator) -> Self {
        Self {
            orchestrator: Arc::new(orchestrator),
        }
    }
}

// ═══════════════════════════════════════════════════════════
// Request / response bodies
// ═══════════════════════════════════════════════════════════

#[derive(Debug, Deserialize)]
pub struct AlertsRequest {
    pub patient: Patient,
    pub reading: VitalSignReading,
}

#[derive(Debug, Serialize)]
pub struct AlertsResponse {
    pub alerts: Vec<String>,
    /// Machine-readable kind of each alert, same order as `alerts`.
    pub kinds: Vec<&'static str>,
}

#[derive(Debug, Deserialize)]
pub struct SummaryBody {
    pub patient: Patient,
    #[serde(default)]
    pub readings: Vec<VitalSignReading>,
}

/// `{summary, error}` plus where the text came from.
#[derive(Debug, Serialize)]
pub struct SummaryResponse {
    pub summary: String,
    pub error: Option<String>,
    pub source: SummarySource,
}

#[derive(Debug, Deserialize)]
pub struct WardRequest {
    pub patients: Vec<WardPatient>,
    #[serde(default)]
    pub dismissed_alerts: Vec<String>,
    #[serde(default)]
    pub dismissed_patients: Vec<u64>,
}

impl WardRequest {
    pub fn dismissals(&self) -> Dismissals {
        Dismissals {
            alerts: self.dismissed_alerts.clone(),
            patients: self.dismissed_patients.clone(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct WardResponse {
    pub alerts: Vec<String>,
    pub emergency_patients: Vec<EmergencyPatient>,
}

#[derive(Debug, Deserialize)]
pub struct SeriesRequest {
    #[serde(default)]
    pub readings: Vec<VitalSignReading>,
}
