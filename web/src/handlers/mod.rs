//! HTTP handlers, one module per workflow.

pub mod admin;
pub mod auth;
pub mod availability;
pub mod counseling;
pub mod newsletter;
pub mod pages;
pub mod registration;

use crate::error::AppError;
use crate::state::AppState;
use axum::response::{Html, IntoResponse, Response};
use bookings_core::{FormSubmission, Session};
use bookings_render::TemplateData;

/// Render a page through the pipeline and wrap it as an HTML response.
pub(crate) fn render_page(
    state: &AppState,
    session: &Session,
    name: &str,
    data: TemplateData,
) -> Result<Response, AppError> {
    let body = state.renderer.render(name, data, session)?;
    Ok(Html(body).into_response())
}

/// Parse a urlencoded POST body into a [`FormSubmission`].
pub(crate) fn parse_submission(body: &[u8]) -> Result<FormSubmission, AppError> {
    let text = std::str::from_utf8(body)
        .map_err(|_| AppError::bad_request("Request body is not valid UTF-8"))?;
    FormSubmission::from_urlencoded(text)
        .map_err(|_| AppError::bad_request("Request body is not a valid form submission"))
}
