//! Login and logout.

use super::{parse_submission, render_page};
use crate::csrf;
use crate::error::AppError;
use crate::extractors::CurrentSession;
use crate::state::AppState;
use axum::extract::{RawForm, State};
use axum::response::{IntoResponse, Redirect, Response};
use bookings_core::{BookingError, Form};
use bookings_render::TemplateData;
use tracing::{info, warn};

/// `GET /login`
pub async fn show_login(
    State(state): State<AppState>,
    CurrentSession(session): CurrentSession,
) -> Result<Response, AppError> {
    render_page(&state, &session, "login.page.html", TemplateData::new())
}

/// `POST /login`
pub async fn post_login(
    State(state): State<AppState>,
    CurrentSession(session): CurrentSession,
    RawForm(body): RawForm,
) -> Result<Response, AppError> {
    // Rotate the id around authentication, same as on logout.
    session.renew();

    let submission = parse_submission(&body)?;
    csrf::require(&session, &submission)?;

    let email = submission.value("email").to_string();
    let password = submission.value("password").to_string();

    let mut form = Form::new(submission);
    form.required(&["email", "password"]);
    form.is_email("email");

    if !form.valid() {
        let data = TemplateData::new().with_form(&form);
        return render_page(&state, &session, "login.page.html", data);
    }

    match state.repo.authenticate(&email, &password).await {
        Ok((user_id, _)) => {
            session.log_in(user_id);
            session.set_flash("Logged in successfully");
            info!(user_id, "login succeeded");
            Ok(Redirect::to("/").into_response())
        }
        Err(BookingError::InvalidCredentials) => {
            // Generic flash; never says which part was wrong.
            warn!(email = %email, "login rejected");
            session.set_error("Invalid login credentials");
            Ok(Redirect::to("/login").into_response())
        }
        Err(err) => Err(err.into()),
    }
}

/// `GET /logout`
pub async fn logout(CurrentSession(session): CurrentSession) -> Response {
    session.destroy();
    Redirect::to("/login").into_response()
}
