//! Counseling-session reservation workflow.
//!
//! The one submission workflow with persistence: an accepted request
//! inserts the reservation and then its time-restriction record as two
//! independent calls (no compensating rollback on partial failure), stores
//! the registration in the session, enqueues the notification, and
//! redirects to the confirmation page.

use super::{parse_submission, render_page};
use crate::csrf;
use crate::error::AppError;
use crate::extractors::CurrentSession;
use crate::state::AppState;
use axum::extract::{RawForm, State};
use axum::response::{IntoResponse, Redirect, Response};
use bookings_core::mail::MailMessage;
use bookings_core::models::{CounselingTimeRestriction, Reservation};
use bookings_core::{CounselingRegistration, Form};
use bookings_render::TemplateData;
use chrono::{NaiveDate, NaiveTime};
use tracing::info;

/// `GET /counseling-reservation`
pub async fn registration_form(
    State(state): State<AppState>,
    CurrentSession(session): CurrentSession,
) -> Result<Response, AppError> {
    let data = TemplateData::new().with_data("counseling_signup", CounselingRegistration::default());
    render_page(&state, &session, "counseling-registration.page.html", data)
}

/// `POST /make-session-reservation`
pub async fn post_reservation(
    State(state): State<AppState>,
    CurrentSession(session): CurrentSession,
    RawForm(body): RawForm,
) -> Result<Response, AppError> {
    let submission = parse_submission(&body)?;
    csrf::require(&session, &submission)?;

    let registration = CounselingRegistration {
        first_name: submission.value("first-name").to_string(),
        last_name: submission.value("last-name").to_string(),
        email: submission.value("email").to_string(),
        gender: submission.value("gender").to_string(),
        reason: submission.value("reason").to_string(),
    };
    let counseling_session_id = submission
        .value("counseling-session-id")
        .parse::<i64>()
        .unwrap_or(1);

    let mut form = Form::new(submission);
    form.required(&[
        "first-name",
        "last-name",
        "email",
        "gender",
        "date",
        "start-time",
        "end-time",
    ]);
    form.min_length("first-name", 3);
    form.min_length("last-name", 3);
    form.is_email("email");

    let date = parse_date(&mut form, "date");
    let start_time = parse_time(&mut form, "start-time");
    let end_time = parse_time(&mut form, "end-time");

    if !form.valid() {
        let data = TemplateData::new()
            .with_data("counseling_signup", &registration)
            .with_form(&form);
        return render_page(&state, &session, "counseling-registration.page.html", data);
    }
    // All three parsed if the form is valid; the fallbacks are unreachable.
    let date = date.unwrap_or_default();
    let start_time = start_time.unwrap_or(NaiveTime::MIN);
    let end_time = end_time.unwrap_or(NaiveTime::MIN);

    let reservation = Reservation {
        first_name: registration.first_name.clone(),
        last_name: registration.last_name.clone(),
        email: registration.email.clone(),
        date,
        start_time,
        end_time,
        counseling_session_id,
        ..Reservation::default()
    };
    let new_id = state.repo.insert_reservation(&reservation).await?;

    // Second, unguarded call: a failure here leaves the reservation without
    // its restriction row.
    let restriction = CounselingTimeRestriction {
        id: 0,
        start_time,
        end_time,
        date,
        reservation_id: new_id,
        restriction_id: 1,
        created_at: chrono::Utc::now(),
        updated_at: chrono::Utc::now(),
    };
    state
        .repo
        .insert_counseling_time_restriction(&restriction)
        .await?;

    info!(reservation_id = new_id, email = %registration.email, "counseling reservation accepted");

    let content = format!(
        "<strong>Thank you for requesting a counseling session</strong><br>\
         Dear {} {},<br>\
         Your request for {} between {} and {} has been received. \
         Someone will contact you shortly with the time and link for the session.",
        registration.first_name,
        registration.last_name,
        date.format("%Y-%m-%d"),
        start_time.format("%H:%M"),
        end_time.format("%H:%M"),
    );
    state.mail.send(MailMessage {
        to: registration.email.clone(),
        from: state.config.mail_from.clone(),
        subject: "Counseling Session Request Received".to_string(),
        content,
        template: "basic.html".to_string(),
    });

    session.put_counseling_registration(registration);
    Ok(Redirect::to("/counseling-signup-success").into_response())
}

/// `GET /counseling-signup-success`
pub async fn signup_success(
    State(state): State<AppState>,
    CurrentSession(session): CurrentSession,
) -> Result<Response, AppError> {
    let Some(registration) = session.take_counseling_registration() else {
        tracing::warn!("counseling confirmation visited without a pending record");
        session.set_error("Could not get record from session");
        return Ok(Redirect::to("/").into_response());
    };
    let data = TemplateData::new().with_data("counseling_signup", registration);
    render_page(
        &state,
        &session,
        "counseling-signup-success.page.html",
        data,
    )
}

/// `GET /make-reservation`
///
/// Shows the reservation currently being assembled in the session. The
/// record stays in place (it is re-stored, not evicted) so the page can be
/// refreshed while the visitor decides.
pub async fn make_reservation(
    State(state): State<AppState>,
    CurrentSession(session): CurrentSession,
) -> Result<Response, AppError> {
    let Some(reservation) = session.reservation() else {
        session.set_error("can't get reservation from session");
        return Ok(Redirect::to("/").into_response());
    };

    session.put_reservation(reservation.clone());

    let data = TemplateData::new()
        .with_string("date", reservation.date.format("%Y-%m-%d").to_string())
        .with_data("reservation", reservation);
    render_page(&state, &session, "make-reservation.page.html", data)
}

fn parse_date(form: &mut Form, field: &str) -> Option<NaiveDate> {
    let raw = form.value(field).to_string();
    if raw.is_empty() {
        // `required` already flagged it.
        return None;
    }
    match NaiveDate::parse_from_str(&raw, "%Y-%m-%d") {
        Ok(date) => Some(date),
        Err(_) => {
            form.errors.add(field, "This field must be a valid date.");
            None
        }
    }
}

fn parse_time(form: &mut Form, field: &str) -> Option<NaiveTime> {
    let raw = form.value(field).to_string();
    if raw.is_empty() {
        return None;
    }
    match NaiveTime::parse_from_str(&raw, "%H:%M") {
        Ok(time) => Some(time),
        Err(_) => {
            form.errors.add(field, "This field must be a valid time.");
            None
        }
    }
}
