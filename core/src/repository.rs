//! Reservation repository contract.

use crate::error::Result;
use crate::models::{CounselingTimeRestriction, Reservation};
use async_trait::async_trait;

/// Persistence boundary for reservations and admin authentication.
///
/// Satisfied by the Postgres-backed implementation in `bookings-postgres`
/// and by the in-memory double in [`crate::mocks`]; both honor the same
/// contract so workflows can be exercised without a database.
///
/// Every operation is bounded by a short per-call timeout in the
/// persistent implementation; a timeout surfaces as
/// [`crate::BookingError::StorageTimeout`], distinct from
/// [`crate::BookingError::NotFound`] and from constraint violations.
#[async_trait]
pub trait ReservationRepository: Send + Sync {
    /// Look up the account for `email` and verify `password` against its
    /// stored salted hash.
    ///
    /// Returns the user id and the stored hash. Fails with
    /// [`crate::BookingError::InvalidCredentials`] on a mismatch *or* a
    /// missing account; callers cannot tell the two apart.
    async fn authenticate(&self, email: &str, password: &str) -> Result<(i64, String)>;

    /// Insert a reservation; returns the new row id.
    async fn insert_reservation(&self, reservation: &Reservation) -> Result<i64>;

    /// Insert the time-restriction record for a reservation.
    async fn insert_counseling_time_restriction(
        &self,
        restriction: &CounselingTimeRestriction,
    ) -> Result<()>;

    /// All reservations, ascending by date, each enriched with its
    /// counseling session via left join (zero-value session when no match).
    async fn all_reservations(&self) -> Result<Vec<Reservation>>;

    /// Reservations with `processed == 0`, ascending by date.
    async fn all_new_reservations(&self) -> Result<Vec<Reservation>>;

    /// One reservation by id, or [`crate::BookingError::NotFound`].
    async fn get_reservation_by_id(&self, id: i64) -> Result<Reservation>;

    /// Overwrite contact fields, date, and time window by identity.
    ///
    /// Never touches `processed`.
    async fn update_reservation(&self, reservation: &Reservation) -> Result<()>;

    /// Set the `processed` flag. The only path that mutates it.
    async fn update_processed_for_reservation(&self, id: i64, processed: i32) -> Result<()>;

    /// Remove a reservation. Present for contract completeness; no
    /// workflow currently calls it.
    async fn delete_reservation(&self, id: i64) -> Result<()>;
}
