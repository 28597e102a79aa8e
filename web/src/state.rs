//! Application state shared across all HTTP handlers.

use crate::config::AppConfig;
use bookings_core::mail::MailSender;
use bookings_core::repository::ReservationRepository;
use bookings_core::session::SessionStore;
use bookings_render::Renderer;
use std::sync::Arc;

/// Every capability a handler can use, injected once at startup.
///
/// Cheap to clone (everything is behind an `Arc` or a channel handle);
/// Axum clones it per request.
#[derive(Clone)]
pub struct AppState {
    /// Process-wide configuration.
    pub config: Arc<AppConfig>,
    /// Reservation persistence (Postgres in production, mock in tests).
    pub repo: Arc<dyn ReservationRepository>,
    /// Visitor session storage.
    pub sessions: Arc<dyn SessionStore>,
    /// Template cache + render pipeline.
    pub renderer: Arc<Renderer>,
    /// Fire-and-forget mail queue handle.
    pub mail: MailSender,
}

impl AppState {
    /// Assemble the state from its parts.
    #[must_use]
    pub fn new(
        config: AppConfig,
        repo: Arc<dyn ReservationRepository>,
        sessions: Arc<dyn SessionStore>,
        renderer: Renderer,
        mail: MailSender,
    ) -> Self {
        Self {
            config: Arc::new(config),
            repo,
            sessions,
            renderer: Arc::new(renderer),
            mail,
        }
    }
}
