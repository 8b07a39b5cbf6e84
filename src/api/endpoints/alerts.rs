//! Vital-sign alert endpoints.
//!
//! `POST /api/alerts` evaluates one reading, `POST /api/ward/alerts`
//! builds the doctor dashboard view.

use axum::extract::rejection::JsonRejection;
use axum::Json;

use crate::api::error::ApiError;
use crate::api::types::{AlertsRequest, AlertsResponse, WardRequest, WardResponse};
use crate::intelligence::{self, ward_alerts, AlertKind, MessageTemplates};

/// `POST /api/alerts`: alerts for a single reading, in rule order.
pub async fn evaluate(
    payload: Result<Json<AlertsRequest>, JsonRejection>,
) -> Result<Json<AlertsResponse>, ApiError> {
    let Json(body) = payload?;
    body.patient.validate()?;
    body.reading.validate()?;

    let found = intelligence::evaluate(&body.patient, &body.reading);
    let name = body.patient.display_name();
    let alerts: Vec<String> = found
        .iter()
        .map(|kind| MessageTemplates::alert(*kind, &name))
        .collect();
    let kinds = found.iter().map(AlertKind::as_str).collect();

    tracing::debug!(
        patient = %name,
        count = alerts.len(),
        "Alerts evaluated"
    );

    Ok(Json(AlertsResponse { alerts, kinds }))
}

/// `POST /api/ward/alerts`: latest-reading alerts for every patient.
pub async fn ward(
    payload: Result<Json<WardRequest>, JsonRejection>,
) -> Result<Json<WardResponse>, ApiError> {
    let Json(body) = payload?;
    for entry in &body.patients {
        entry.patient.validate()?;
        for reading in &entry.readings {
            reading.validate()?;
        }
    }

    let view = ward_alerts(&body.patients, &body.dismissals());

    Ok(Json(WardResponse {
        alerts: view.alerts,
        emergency_patients: view.emergency_patients,
    }))
}
