//! Static-ish pages: home, about, and the 404 fallback.

use super::render_page;
use crate::error::AppError;
use crate::extractors::CurrentSession;
use crate::state::AppState;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::Response;
use bookings_render::TemplateData;

/// `GET /`
pub async fn home(
    State(state): State<AppState>,
    CurrentSession(session): CurrentSession,
) -> Result<Response, AppError> {
    render_page(&state, &session, "home.page.html", TemplateData::new())
}

/// `GET /about`
pub async fn about(
    State(state): State<AppState>,
    CurrentSession(session): CurrentSession,
) -> Result<Response, AppError> {
    render_page(&state, &session, "about.page.html", TemplateData::new())
}

/// Fallback for every unmatched path.
pub async fn not_found(
    State(state): State<AppState>,
    CurrentSession(session): CurrentSession,
) -> Result<Response, AppError> {
    let mut response = render_page(&state, &session, "404.page.html", TemplateData::new())?;
    *response.status_mut() = StatusCode::NOT_FOUND;
    Ok(response)
}
