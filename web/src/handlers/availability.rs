//! Availability lookup consumed by scripts as JSON.

use super::parse_submission;
use crate::error::AppError;
use axum::Json;
use axum::extract::RawForm;
use serde::Serialize;

/// Wire format of the availability response. Field names are part of the
/// public surface and keep their historical casing.
#[derive(Debug, Serialize)]
pub struct AvailabilityResponse {
    /// Whether the requested window is available.
    pub ok: bool,
    /// Human-readable status.
    pub message: String,
    /// Echo of the requested date.
    #[serde(rename = "Date")]
    pub date: String,
    /// Echo of the requested window start.
    #[serde(rename = "startTime")]
    pub start_time: String,
    /// Echo of the requested window end.
    #[serde(rename = "endTime")]
    pub end_time: String,
}

/// `POST /search-availability-json`
///
/// CSRF-exempt: this endpoint is called from scripts, not rendered forms.
/// Every requested window currently reports as available; the submitted
/// values are echoed back for the caller to confirm.
pub async fn search_availability_json(
    RawForm(body): RawForm,
) -> Result<Json<AvailabilityResponse>, AppError> {
    let submission = parse_submission(&body)?;

    Ok(Json(AvailabilityResponse {
        ok: true,
        message: "This time is available!".to_string(),
        date: submission.value("date").to_string(),
        start_time: submission.value("start-time").to_string(),
        end_time: submission.value("end-time").to_string(),
    }))
}
