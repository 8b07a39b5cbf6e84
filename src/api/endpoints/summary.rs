//! Patient summary endpoint.

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::Json;

use crate::api::error::ApiError;
use crate::api::types::{ApiContext, SummaryBody, SummaryResponse};
use crate::models::sort_most_recent_first;

/// `POST /api/summary`: always answers with text once the input is valid.
pub async fn summarize(
    State(ctx): State<ApiContext>,
    payload: Result<Json<SummaryBody>, JsonRejection>,
) -> Result<Json<SummaryResponse>, ApiError> {
    let Json(mut body) = payload?;
    body.patient.validate()?;
    for reading in &body.readings {
        reading.validate()?;
    }
    sort_most_recent_first(&mut body.readings);

    let outcome = ctx
        .orchestrator
        .summarize(&body.patient, &body.readings)
        .await;

    Ok(Json(SummaryResponse {
        summary: outcome.text,
        error: outcome.error,
        source: outcome.source,
    }))
}
