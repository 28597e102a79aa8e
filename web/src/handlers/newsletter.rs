//! Newsletter signup workflow.
//!
//! Form → validation → session record + mail enqueue → redirect to the
//! confirmation page, which reads the record back and evicts it.

use super::{parse_submission, render_page};
use crate::csrf;
use crate::error::AppError;
use crate::extractors::CurrentSession;
use crate::state::AppState;
use axum::extract::{RawForm, State};
use axum::response::{IntoResponse, Redirect, Response};
use bookings_core::mail::MailMessage;
use bookings_core::{Form, Signup};
use bookings_render::TemplateData;
use tracing::info;

/// `GET /signup`
pub async fn signup_form(
    State(state): State<AppState>,
    CurrentSession(session): CurrentSession,
) -> Result<Response, AppError> {
    let data = TemplateData::new().with_data("signup", Signup::default());
    render_page(&state, &session, "signup.page.html", data)
}

/// `POST /signup`
pub async fn post_signup(
    State(state): State<AppState>,
    CurrentSession(session): CurrentSession,
    RawForm(body): RawForm,
) -> Result<Response, AppError> {
    let submission = parse_submission(&body)?;
    csrf::require(&session, &submission)?;

    let signup = Signup {
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
            .with_data("signup", &signup)
            .with_form(&form);
        return render_page(&state, &session, "signup.page.html", data);
    }

    info!(email = %signup.email, "newsletter signup accepted");

    let content = format!(
        "<strong>Thank you for signing up</strong><br>\
         Dear {} {},<br>\
         You have successfully signed up for our newsletter and update list. \
         Please watch your inbox for our next issue.",
        signup.first_name, signup.last_name
    );
    state.mail.send(MailMessage {
        to: signup.email.clone(),
        from: state.config.mail_from.clone(),
        subject: "Newsletter Signup Confirmation".to_string(),
        content,
        template: "basic.html".to_string(),
    });

    session.put_signup(signup);
    Ok(Redirect::to("/signup-success").into_response())
}

/// `GET /signup-success`
///
/// Single-use: the record is evicted on render, so a second visit (or a
/// direct navigation with no prior submission) bounces home with an error
/// flash.
pub async fn signup_success(
    State(state): State<AppState>,
    CurrentSession(session): CurrentSession,
) -> Result<Response, AppError> {
    let Some(signup) = session.take_signup() else {
        tracing::warn!("signup confirmation visited without a pending record");
        session.set_error("Could not get record from session");
        return Ok(Redirect::to("/").into_response());
    };
    let data = TemplateData::new().with_data("signup", signup);
    render_page(&state, &session, "signup-success.page.html", data)
}
