//! Chart series for the patient detail view.

use axum::extract::rejection::JsonRejection;
use axum::Json;

use crate::api::error::ApiError;
use crate::api::types::SeriesRequest;
use crate::models::{sort_most_recent_first, VitalSeries};

/// `POST /api/vitals/series`
pub async fn series(
    payload: Result<Json<SeriesRequest>, JsonRejection>,
) -> Result<Json<VitalSeries>, ApiError> {
    let Json(mut body) = payload?;
    for reading in &body.readings {
        reading.validate()?;
    }
    sort_most_recent_first(&mut body.readings);
    Ok(Json(VitalSeries::from_readings(&body.readings)))
}
