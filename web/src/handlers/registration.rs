//! User registration workflow. Same shape as the newsletter signup, with
//! its own session slot and templates.

use super::{parse_submission, render_page};
use crate::csrf;
use crate::error::AppError;
use crate::extractors::CurrentSession;
use crate::state::AppState;
use axum::extract::{RawForm, State};
use axum::response::{IntoResponse, Redirect, Response};
use bookings_core::mail::MailMessage;
use bookings_core::{Form, UserRegistration};
use bookings_render::TemplateData;
use tracing::info;

/// `GET /create-user`
pub async fn registration_form(
    State(state): State<AppState>,
    CurrentSession(session): CurrentSession,
) -> Result<Response, AppError> {
    let data = TemplateData::new().with_data("user_signup", UserRegistration::default());
    render_page(&state, &session, "create-user.page.html", data)
}

/// `POST /create-user`
pub async fn post_registration(
    State(state): State<AppState>,
    CurrentSession(session): CurrentSession,
    RawForm(body): RawForm,
) -> Result<Response, AppError> {
    let submission = parse_submission(&body)?;
    csrf::require(&session, &submission)?;

    let registration = UserRegistration {
        first_name: submission.value("first-name").to_string(),
        last_name: submission.value("last-name").to_string(),
        email: submission.value("email").to_string(),
    };

    let mut form = Form::new(submission);
    form.required(&["first-name", "last-name", "email"]);
    form.min_length("first-name", 3);
    form.min_length("last-name", 3);
    form.is_email("email");

    if !form.valid() {
        let data = TemplateData::new()
            .with_data("user_signup", &registration)
            .with_form(&form);
        return render_page(&state, &session, "create-user.page.html", data);
    }

    info!(email = %registration.email, "user registration accepted");

    let content = format!(
        "<strong>Thank you for registering your account</strong><br>\
         Dear {} {},<br>\
         Your account has been registered. \
         Please consider signing up for our newsletter as well.",
        registration.first_name, registration.last_name
    );
    state.mail.send(MailMessage {
        to: registration.email.clone(),
        from: state.config.mail_from.clone(),
        subject: "Account Registration Confirmation".to_string(),
        content,
        template: "basic.html".to_string(),
    });

    session.put_user_registration(registration);
    Ok(Redirect::to("/user-created-success").into_response())
}

/// `GET /user-created-success`
pub async fn registration_success(
    State(state): State<AppState>,
    CurrentSession(session): CurrentSession,
) -> Result<Response, AppError> {
    let Some(registration) = session.take_user_registration() else {
        tracing::warn!("registration confirmation visited without a pending record");
        session.set_error("Could not get record from session");
        return Ok(Redirect::to("/").into_response());
    };
    let data = TemplateData::new().with_data("user_signup", registration);
    render_page(
        &state,
        &session,
        "registered-newuser-success.page.html",
        data,
    )
}
