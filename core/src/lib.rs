//! # Bookings Core
//!
//! Domain layer for the bookings server: entities, form validation, the
//! visitor session store, the reservation repository contract, outbound
//! mail dispatch, and password hashing.
//!
//! Everything here is I/O-free or I/O-abstract: persistence lives behind
//! [`repository::ReservationRepository`], session storage behind
//! [`session::SessionStore`], and mail delivery behind
//! [`mail::MailDelivery`]. The web crate wires concrete implementations in
//! at startup; tests wire in the doubles from [`mocks`].

#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]

pub mod error;
pub mod forms;
pub mod mail;
pub mod models;
pub mod password;
pub mod repository;
pub mod session;

#[cfg(any(test, feature = "test-utils"))]
pub mod mocks;

// Re-export main types for convenience
pub use error::{BookingError, Result};
pub use forms::{Form, FormSubmission, ValidationErrors};
pub use mail::{MailMessage, MailSender};
pub use models::{
    CounselingRegistration, CounselingSession, CounselingTimeRestriction, Reservation, Signup,
    User, UserRegistration,
};
pub use repository::ReservationRepository;
pub use session::{Session, SessionData, SessionId, SessionStore};
