//! Admin area: dashboards, reservation listings, detail view/edit, and the
//! mark-as-processed action.
//!
//! All routes here sit behind the authentication guard. Any repository
//! failure is fatal for the request (logged, generic 500 page); admin
//! actions are never retried automatically.

use super::{parse_submission, render_page};
use crate::csrf;
use crate::error::AppError;
use crate::extractors::CurrentSession;
use crate::state::AppState;
use axum::extract::{Path, RawForm, State};
use axum::response::{IntoResponse, Redirect, Response};
use bookings_render::TemplateData;
use tracing::info;

/// `GET /admin/dashboard`
pub async fn dashboard(
    State(state): State<AppState>,
    CurrentSession(session): CurrentSession,
) -> Result<Response, AppError> {
    render_page(
        &state,
        &session,
        "admin.dashboard.page.html",
        TemplateData::new(),
    )
}

/// `GET /admin/all-reservations`
pub async fn all_reservations(
    State(state): State<AppState>,
    CurrentSession(session): CurrentSession,
) -> Result<Response, AppError> {
    let reservations = state.repo.all_reservations().await?;
    let data = TemplateData::new().with_data("reservations", reservations);
    render_page(&state, &session, "admin.all-reservations.page.html", data)
}

/// `GET /admin/new-reservations`
pub async fn new_reservations(
    State(state): State<AppState>,
    CurrentSession(session): CurrentSession,
) -> Result<Response, AppError> {
    let reservations = state.repo.all_new_reservations().await?;
    let data = TemplateData::new().with_data("reservations", reservations);
    render_page(&state, &session, "admin.new-reservations.page.html", data)
}

/// `GET /admin/calender`
pub async fn calendar(
    State(state): State<AppState>,
    CurrentSession(session): CurrentSession,
) -> Result<Response, AppError> {
    render_page(
        &state,
        &session,
        "admin.reservations.calendar.page.html",
        TemplateData::new(),
    )
}

/// `GET /admin/reservations/{src}/{id}`
///
/// `src` names the listing this detail page was reached from ("new" or
/// "all") so the post-action redirect can return there.
pub async fn show_reservation(
    State(state): State<AppState>,
    CurrentSession(session): CurrentSession,
    Path((src, id)): Path<(String, i64)>,
) -> Result<Response, AppError> {
    let reservation = state.repo.get_reservation_by_id(id).await?;
    let data = TemplateData::new()
        .with_string("src", src)
        .with_data("reservation", reservation);
    render_page(&state, &session, "admin.reservations.show.page.html", data)
}

/// `POST /admin/reservations/{src}/{id}`
///
/// Persists the edited contact fields and returns to the originating list.
/// `processed` is untouched here.
pub async fn post_show_reservation(
    State(state): State<AppState>,
    CurrentSession(session): CurrentSession,
    Path((src, id)): Path<(String, i64)>,
    RawForm(body): RawForm,
) -> Result<Response, AppError> {
    let submission = parse_submission(&body)?;
    csrf::require(&session, &submission)?;

    let mut reservation = state.repo.get_reservation_by_id(id).await?;
    reservation.first_name = submission.value("first-name").to_string();
    reservation.last_name = submission.value("last-name").to_string();
    reservation.email = submission.value("email").to_string();

    state.repo.update_reservation(&reservation).await?;

    info!(reservation_id = id, "reservation updated");
    session.set_flash("changes saved");
    Ok(Redirect::to(&format!("/admin/{src}-reservations")).into_response())
}

/// `GET /admin/process-reservation/{src}/{id}`
///
/// The only path that flips `processed`; it never reverts.
pub async fn process_reservation(
    State(state): State<AppState>,
    CurrentSession(session): CurrentSession,
    Path((src, id)): Path<(String, i64)>,
) -> Result<Response, AppError> {
    state.repo.update_processed_for_reservation(id, 1).await?;

    info!(reservation_id = id, "reservation marked as processed");
    session.set_flash("Reservation marked as complete");
    Ok(Redirect::to(&format!("/admin/{src}-reservations")).into_response())
}
