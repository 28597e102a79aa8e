//! Session and authentication middleware.

use crate::state::AppState;
use axum::extract::{Request, State};
use axum::http::HeaderValue;
use axum::http::header::{COOKIE, SET_COOKIE};
use axum::middleware::Next;
use axum::response::{IntoResponse, Redirect, Response};
use bookings_core::session::{Session, SessionId};
use tracing::error;

/// Name of the session cookie.
pub const SESSION_COOKIE: &str = "bookings_session";

/// Load the visitor's session before the handler and persist it after.
///
/// A missing, expired, or unparsable cookie yields a fresh session. After
/// the handler runs, the session is saved with a full TTL (sliding
/// expiration), ids abandoned by renew/destroy are removed, and the cookie
/// is (re)issued: HTTP-only, path `/`, `SameSite=Lax`, `Secure` in
/// production, max-age equal to the session lifetime.
pub async fn session_layer(State(state): State<AppState>, mut req: Request, next: Next) -> Response {
    let session = match cookie_value(&req, SESSION_COOKIE).as_deref().and_then(SessionId::parse) {
        Some(id) => match state.sessions.load(id).await {
            Ok(Some(data)) => Session::from_parts(id, data),
            Ok(None) => Session::fresh(),
            Err(err) => {
                error!(error = %err, "session load failed");
                Session::fresh()
            }
        },
        None => Session::fresh(),
    };
    req.extensions_mut().insert(session.clone());

    let mut response = next.run(req).await;

    let commit = session.commit();
    for stale in commit.stale {
        if let Err(err) = state.sessions.destroy(stale).await {
            error!(error = %err, "stale session removal failed");
        }
    }
    let max_age = match commit.data {
        Some(data) => {
            if let Err(err) = state
                .sessions
                .save(commit.id, data, state.config.session_ttl)
                .await
            {
                error!(error = %err, "session save failed");
            }
            state.config.session_ttl.num_seconds()
        }
        None => {
            if let Err(err) = state.sessions.destroy(commit.id).await {
                error!(error = %err, "session destroy failed");
            }
            0
        }
    };

    let mut cookie = format!(
        "{SESSION_COOKIE}={}; Path=/; HttpOnly; SameSite=Lax; Max-Age={max_age}",
        commit.id
    );
    if state.config.in_production {
        cookie.push_str("; Secure");
    }
    if let Ok(value) = HeaderValue::from_str(&cookie) {
        response.headers_mut().append(SET_COOKIE, value);
    }
    response
}

/// Guard for the admin area.
///
/// Anonymous visitors are bounced to the login page with an error flash;
/// the message survives the redirect through the session.
pub async fn require_auth(req: Request, next: Next) -> Response {
    let Some(session) = req.extensions().get::<Session>() else {
        return crate::error::AppError::internal("session middleware not installed").into_response();
    };
    if !session.is_authenticated() {
        session.set_error("Must be logged in!");
        return Redirect::to("/login").into_response();
    }
    next.run(req).await
}

fn cookie_value(req: &Request, name: &str) -> Option<String> {
    for header in req.headers().get_all(COOKIE) {
        let Ok(raw) = header.to_str() else { continue };
        for pair in raw.split(';') {
            if let Some((key, value)) = pair.trim().split_once('=') {
                if key == name {
                    return Some(value.to_string());
                }
            }
        }
    }
    None
}
