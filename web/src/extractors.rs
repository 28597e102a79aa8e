//! Custom Axum extractors.

use crate::error::AppError;
use axum::async_trait;
use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use bookings_core::Session;

/// The visitor's session, extracted from request extensions.
///
/// The session middleware loads (or creates) the session before routing
/// and persists it after the handler runs; this extractor just hands the
/// shared handle to the handler.
///
/// # Example
///
/// ```ignore
/// async fn handler(CurrentSession(session): CurrentSession) -> Redirect {
///     session.set_flash("saved");
///     Redirect::to("/")
/// }
/// ```
#[derive(Debug, Clone)]
pub struct CurrentSession(pub Session);

#[async_trait]
impl<S> FromRequestParts<S> for CurrentSession
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<Session>()
            .cloned()
            .map(CurrentSession)
            .ok_or_else(|| AppError::internal("session middleware not installed"))
    }
}
