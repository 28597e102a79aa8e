//! # Bookings Web
//!
//! HTTP layer for the bookings server: the route table, the per-request
//! session middleware, CSRF verification, and the workflow handlers that
//! orchestrate Form Validator → Session Store → Reservation Repository →
//! Render Pipeline for each submission type.
//!
//! The [`AppState`] carries every capability as an explicit object
//! (repository, session store, renderer, mail queue, configuration); there
//! is no ambient global state.

#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]

pub mod config;
pub mod csrf;
pub mod error;
pub mod extractors;
pub mod handlers;
pub mod middleware;
pub mod router;
pub mod state;

pub use config::{AppConfig, SmtpConfig};
pub use error::AppError;
pub use extractors::CurrentSession;
pub use router::router;
pub use state::AppState;

/// Result type alias for web handlers.
pub type WebResult<T> = Result<T, AppError>;
