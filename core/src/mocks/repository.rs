//! Mock reservation repository.

use crate::error::{BookingError, Result};
use crate::models::{CounselingSession, CounselingTimeRestriction, Reservation, User};
use crate::password::{hash_password, verify_password};
use crate::repository::ReservationRepository;
use async_trait::async_trait;
use chrono::Utc;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

#[derive(Debug, Default)]
struct State {
    users: Vec<User>,
    reservations: Vec<Reservation>,
    restrictions: Vec<CounselingTimeRestriction>,
    counseling_sessions: HashMap<i64, CounselingSession>,
    next_id: i64,
    fail_storage: bool,
}

/// In-memory [`ReservationRepository`] honoring the full contract:
/// date-ascending listings, the `processed` filter, left-join enrichment,
/// and indistinguishable credential failures.
#[derive(Debug, Clone, Default)]
pub struct MockReservationRepository {
    state: Arc<Mutex<State>>,
}

impl MockReservationRepository {
    /// Create an empty repository.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, State> {
        self.state
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }

    /// Seed an account; the password is stored salted-hashed.
    #[must_use]
    pub fn with_user(self, id: i64, email: &str, password: &str) -> Self {
        let now = Utc::now();
        self.lock().users.push(User {
            id,
            first_name: String::new(),
            last_name: String::new(),
            email: email.to_string(),
            password: hash_password(password),
            access_level: 1,
            created_at: now,
            updated_at: now,
        });
        self
    }

    /// Seed a counseling session for join enrichment.
    #[must_use]
    pub fn with_counseling_session(self, id: i64, counselor_name: &str) -> Self {
        self.lock().counseling_sessions.insert(
            id,
            CounselingSession {
                id,
                counselor_name: counselor_name.to_string(),
                created_at: Some(Utc::now()),
                updated_at: Some(Utc::now()),
            },
        );
        self
    }

    /// Make every storage operation fail, for exercising error paths.
    #[must_use]
    pub fn failing(self) -> Self {
        self.lock().fail_storage = true;
        self
    }

    /// Number of stored time restrictions (for assertions).
    #[must_use]
    pub fn restriction_count(&self) -> usize {
        self.lock().restrictions.len()
    }

    fn check_available(state: &State) -> Result<()> {
        if state.fail_storage {
            return Err(BookingError::Storage("mock storage failure".to_string()));
        }
        Ok(())
    }

    fn enrich(state: &State, mut reservation: Reservation) -> Reservation {
        reservation.counseling_session = state
            .counseling_sessions
            .get(&reservation.counseling_session_id)
            .cloned()
            .unwrap_or_default();
        reservation
    }
}

#[async_trait]
impl ReservationRepository for MockReservationRepository {
    async fn authenticate(&self, email: &str, password: &str) -> Result<(i64, String)> {
        let state = self.lock();
        Self::check_available(&state)?;
        // Missing account and wrong password collapse into one error.
        let user = state
            .users
            .iter()
            .find(|u| u.email == email)
            .ok_or(BookingError::InvalidCredentials)?;
        if !verify_password(password, &user.password) {
            return Err(BookingError::InvalidCredentials);
        }
        Ok((user.id, user.password.clone()))
    }

    async fn insert_reservation(&self, reservation: &Reservation) -> Result<i64> {
        let mut state = self.lock();
        Self::check_available(&state)?;
        state.next_id += 1;
        let id = state.next_id;
        let now = Utc::now();
        let mut stored = reservation.clone();
        stored.id = id;
        stored.created_at = now;
        stored.updated_at = now;
        state.reservations.push(stored);
        Ok(id)
    }

    async fn insert_counseling_time_restriction(
        &self,
        restriction: &CounselingTimeRestriction,
    ) -> Result<()> {
        let mut state = self.lock();
        Self::check_available(&state)?;
        state.next_id += 1;
        let id = state.next_id;
        let mut stored = restriction.clone();
        stored.id = id;
        state.restrictions.push(stored);
        Ok(())
    }

    async fn all_reservations(&self) -> Result<Vec<Reservation>> {
        let state = self.lock();
        Self::check_available(&state)?;
        let mut reservations: Vec<Reservation> = state
            .reservations
            .iter()
            .cloned()
            .map(|r| Self::enrich(&state, r))
            .collect();
        reservations.sort_by_key(|r| r.date);
        Ok(reservations)
    }

    async fn all_new_reservations(&self) -> Result<Vec<Reservation>> {
        let state = self.lock();
        Self::check_available(&state)?;
        let mut reservations: Vec<Reservation> = state
            .reservations
            .iter()
            .filter(|r| r.processed == 0)
            .cloned()
            .collect();
        reservations.sort_by_key(|r| r.date);
        Ok(reservations)
    }

    async fn get_reservation_by_id(&self, id: i64) -> Result<Reservation> {
        let state = self.lock();
        Self::check_available(&state)?;
        state
            .reservations
            .iter()
            .find(|r| r.id == id)
            .cloned()
            .map(|r| Self::enrich(&state, r))
            .ok_or(BookingError::NotFound)
    }

    async fn update_reservation(&self, reservation: &Reservation) -> Result<()> {
        let mut state = self.lock();
        Self::check_available(&state)?;
        let stored = state
            .reservations
            .iter_mut()
            .find(|r| r.id == reservation.id)
            .ok_or(BookingError::NotFound)?;
        stored.first_name = reservation.first_name.clone();
        stored.last_name = reservation.last_name.clone();
        stored.email = reservation.email.clone();
        stored.date = reservation.date;
        stored.start_time = reservation.start_time;
        stored.end_time = reservation.end_time;
        stored.updated_at = Utc::now();
        Ok(())
    }

    async fn update_processed_for_reservation(&self, id: i64, processed: i32) -> Result<()> {
        let mut state = self.lock();
        Self::check_available(&state)?;
        let stored = state
            .reservations
            .iter_mut()
            .find(|r| r.id == id)
            .ok_or(BookingError::NotFound)?;
        stored.processed = processed;
        stored.updated_at = Utc::now();
        Ok(())
    }

    async fn delete_reservation(&self, id: i64) -> Result<()> {
        let mut state = self.lock();
        Self::check_available(&state)?;
        state.reservations.retain(|r| r.id != id);
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, NaiveTime};

    fn reservation(date: NaiveDate) -> Reservation {
        Reservation {
            first_name: "Ali".to_string(),
            last_name: "Khan".to_string(),
            email: "ali@example.com".to_string(),
            start_time: NaiveTime::from_hms_opt(10, 0, 0).unwrap(),
            end_time: NaiveTime::from_hms_opt(11, 0, 0).unwrap(),
            date,
            counseling_session_id: 1,
            ..Reservation::default()
        }
    }

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    #[tokio::test]
    async fn listings_are_ascending_by_date() {
        let repo = MockReservationRepository::new();
        repo.insert_reservation(&reservation(date("2026-09-02")))
            .await
            .unwrap();
        repo.insert_reservation(&reservation(date("2026-09-01")))
            .await
            .unwrap();

        let all = repo.all_reservations().await.unwrap();
        assert_eq!(all[0].date, date("2026-09-01"));
        assert_eq!(all[1].date, date("2026-09-02"));
    }

    #[tokio::test]
    async fn processed_lifecycle_moves_between_listings() {
        let repo = MockReservationRepository::new();
        let id = repo
            .insert_reservation(&reservation(date("2026-09-01")))
            .await
            .unwrap();

        assert_eq!(repo.all_new_reservations().await.unwrap().len(), 1);

        repo.update_processed_for_reservation(id, 1).await.unwrap();

        assert!(repo.all_new_reservations().await.unwrap().is_empty());
        let all = repo.all_reservations().await.unwrap();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].processed, 1);
    }

    #[tokio::test]
    async fn join_enrichment_uses_zero_value_when_session_missing() {
        let repo = MockReservationRepository::new().with_counseling_session(1, "Maryam");
        let mut other = reservation(date("2026-09-01"));
        other.counseling_session_id = 99;
        repo.insert_reservation(&reservation(date("2026-09-01")))
            .await
            .unwrap();
        repo.insert_reservation(&other).await.unwrap();

        let all = repo.all_reservations().await.unwrap();
        assert_eq!(all[0].counseling_session.counselor_name, "Maryam");
        assert_eq!(all[1].counseling_session, CounselingSession::default());
    }

    #[tokio::test]
    async fn update_reservation_leaves_processed_alone() {
        let repo = MockReservationRepository::new();
        let id = repo
            .insert_reservation(&reservation(date("2026-09-01")))
            .await
            .unwrap();
        repo.update_processed_for_reservation(id, 1).await.unwrap();

        let mut edited = repo.get_reservation_by_id(id).await.unwrap();
        edited.first_name = "Aisha".to_string();
        repo.update_reservation(&edited).await.unwrap();

        let stored = repo.get_reservation_by_id(id).await.unwrap();
        assert_eq!(stored.first_name, "Aisha");
        assert_eq!(stored.processed, 1);
    }

    #[tokio::test]
    async fn authenticate_hides_which_part_failed() {
        let repo = MockReservationRepository::new().with_user(1, "admin@example.com", "secret");

        let missing = repo.authenticate("nobody@example.com", "secret").await;
        let wrong = repo.authenticate("admin@example.com", "wrong").await;

        assert_eq!(missing, Err(BookingError::InvalidCredentials));
        assert_eq!(wrong, Err(BookingError::InvalidCredentials));
        assert!(repo.authenticate("admin@example.com", "secret").await.is_ok());
    }

    #[tokio::test]
    async fn get_reservation_by_unknown_id_is_not_found() {
        let repo = MockReservationRepository::new();
        assert_eq!(
            repo.get_reservation_by_id(42).await,
            Err(BookingError::NotFound)
        );
    }
}
