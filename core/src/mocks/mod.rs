//! In-memory doubles for testing.
//!
//! These satisfy the same contracts as the production implementations so
//! handler and workflow tests run at memory speed, without Postgres or an
//! SMTP relay.

mod repository;

pub use repository::MockReservationRepository;
