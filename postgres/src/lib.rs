//! # Bookings Postgres
//!
//! PostgreSQL-backed implementation of the
//! [`ReservationRepository`] contract. Every call is bounded by a short
//! per-call timeout; a timeout is reported as
//! [`BookingError::StorageTimeout`], distinct from "not found" and from
//! constraint violations.
//!
//! Queries are runtime-checked (`sqlx::query` + row mapping) so the
//! workspace builds without a live `DATABASE_URL`.

#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]

use async_trait::async_trait;
use bookings_core::error::{BookingError, Result};
use bookings_core::models::{
    CounselingSession, CounselingTimeRestriction, Reservation,
};
use bookings_core::password::verify_password;
use bookings_core::repository::ReservationRepository;
use chrono::Utc;
use sqlx::Row;
use sqlx::postgres::{PgPool, PgPoolOptions, PgRow};
use std::future::Future;
use std::time::Duration;

/// Per-call timeout for every storage operation.
const OP_TIMEOUT: Duration = Duration::from_secs(3);

/// PostgreSQL reservation repository.
#[derive(Debug, Clone)]
pub struct PgReservationRepository {
    pool: PgPool,
}

impl PgReservationRepository {
    /// Wrap an existing connection pool.
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Connect to the database and build the pool.
    ///
    /// # Errors
    ///
    /// Returns [`BookingError::Storage`] if the connection fails.
    pub async fn connect(database_url: &str) -> Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(10)
            .acquire_timeout(OP_TIMEOUT)
            .connect(database_url)
            .await
            .map_err(|e| BookingError::Storage(format!("connect failed: {e}")))?;
        Ok(Self::new(pool))
    }

    /// Run pending schema migrations.
    pub async fn migrate(&self) -> Result<()> {
        sqlx::migrate!("./migrations")
            .run(&self.pool)
            .await
            .map_err(|e| BookingError::Storage(format!("migration failed: {e}")))?;
        Ok(())
    }

    /// The underlying pool, for health checks.
    #[must_use]
    pub const fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Bound a storage future by the per-call timeout.
    async fn bounded<T, F>(fut: F) -> Result<T>
    where
        F: Future<Output = std::result::Result<T, sqlx::Error>> + Send,
    {
        match tokio::time::timeout(OP_TIMEOUT, fut).await {
            Ok(result) => result.map_err(map_sqlx_error),
            Err(_) => Err(BookingError::StorageTimeout),
        }
    }
}

fn map_sqlx_error(err: sqlx::Error) -> BookingError {
    match &err {
        sqlx::Error::RowNotFound => BookingError::NotFound,
        sqlx::Error::Database(db_err)
            if db_err.is_unique_violation() || db_err.is_foreign_key_violation() =>
        {
            BookingError::Constraint(db_err.to_string())
        }
        _ => BookingError::Storage(err.to_string()),
    }
}

/// Columns shared by every reservation query, in select order.
fn base_reservation(row: &PgRow) -> std::result::Result<Reservation, sqlx::Error> {
    Ok(Reservation {
        id: row.try_get("id")?,
        first_name: row.try_get("first_name")?,
        last_name: row.try_get("last_name")?,
        email: row.try_get("email")?,
        start_time: row.try_get("start_time")?,
        end_time: row.try_get("end_time")?,
        date: row.try_get("date")?,
        counseling_session_id: row.try_get("counseling_session_id")?,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
        counseling_session: CounselingSession::default(),
        processed: row.try_get("processed")?,
    })
}

/// Reservation plus its left-joined counseling session. A reservation with
/// no matching session keeps the zero-value session fields.
fn joined_reservation(row: &PgRow) -> std::result::Result<Reservation, sqlx::Error> {
    let mut reservation = base_reservation(row)?;
    let session_id: Option<i64> = row.try_get("session_id")?;
    if let Some(id) = session_id {
        reservation.counseling_session = CounselingSession {
            id,
            counselor_name: row.try_get("counselor_name")?,
            created_at: None,
            updated_at: None,
        };
    }
    Ok(reservation)
}

#[async_trait]
impl ReservationRepository for PgReservationRepository {
    async fn authenticate(&self, email: &str, password: &str) -> Result<(i64, String)> {
        let row = Self::bounded(
            sqlx::query("SELECT id, password FROM users WHERE email = $1")
                .bind(email)
                .fetch_optional(&self.pool),
        )
        .await?;

        // Missing account and wrong password collapse into one error so the
        // login flow cannot be used to enumerate addresses.
        let Some(row) = row else {
            return Err(BookingError::InvalidCredentials);
        };
        let id: i64 = row.try_get("id").map_err(map_sqlx_error)?;
        let stored: String = row.try_get("password").map_err(map_sqlx_error)?;
        if !verify_password(password, &stored) {
            return Err(BookingError::InvalidCredentials);
        }
        Ok((id, stored))
    }

    async fn insert_reservation(&self, reservation: &Reservation) -> Result<i64> {
        let now = Utc::now();
        let row = Self::bounded(
            sqlx::query(
                r"
                INSERT INTO reservations
                    (first_name, last_name, email, date, start_time, end_time,
                     counseling_session_id, created_at, updated_at)
                VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
                RETURNING id
                ",
            )
            .bind(&reservation.first_name)
            .bind(&reservation.last_name)
            .bind(&reservation.email)
            .bind(reservation.date)
            .bind(reservation.start_time)
            .bind(reservation.end_time)
            .bind(reservation.counseling_session_id)
            .bind(now)
            .bind(now)
            .fetch_one(&self.pool),
        )
        .await?;
        row.try_get("id").map_err(map_sqlx_error)
    }

    async fn insert_counseling_time_restriction(
        &self,
        restriction: &CounselingTimeRestriction,
    ) -> Result<()> {
        let now = Utc::now();
        Self::bounded(
            sqlx::query(
                r"
                INSERT INTO counseling_time_restrictions
                    (start_time, end_time, date, reservation_id, restriction_id,
                     created_at, updated_at)
                VALUES ($1, $2, $3, $4, $5, $6, $7)
                ",
            )
            .bind(restriction.start_time)
            .bind(restriction.end_time)
            .bind(restriction.date)
            .bind(restriction.reservation_id)
            .bind(restriction.restriction_id)
            .bind(now)
            .bind(now)
            .execute(&self.pool),
        )
        .await?;
        Ok(())
    }

    async fn all_reservations(&self) -> Result<Vec<Reservation>> {
        let rows = Self::bounded(
            sqlx::query(
                r"
                SELECT r.id, r.first_name, r.last_name, r.email,
                       r.start_time, r.end_time, r.date, r.counseling_session_id,
                       r.created_at, r.updated_at, r.processed,
                       cs.id AS session_id, cs.counselor_name
                FROM reservations r
                LEFT JOIN counseling_sessions cs ON r.counseling_session_id = cs.id
                ORDER BY r.date ASC
                ",
            )
            .fetch_all(&self.pool),
        )
        .await?;

        rows.iter()
            .map(|row| joined_reservation(row).map_err(map_sqlx_error))
            .collect()
    }

    async fn all_new_reservations(&self) -> Result<Vec<Reservation>> {
        let rows = Self::bounded(
            sqlx::query(
                r"
                SELECT r.id, r.first_name, r.last_name, r.email,
                       r.start_time, r.end_time, r.date, r.counseling_session_id,
                       r.created_at, r.updated_at, r.processed
                FROM reservations r
                WHERE r.processed = 0
                ORDER BY r.date ASC
                ",
            )
            .fetch_all(&self.pool),
        )
        .await?;

        rows.iter()
            .map(|row| base_reservation(row).map_err(map_sqlx_error))
            .collect()
    }

    async fn get_reservation_by_id(&self, id: i64) -> Result<Reservation> {
        let row = Self::bounded(
            sqlx::query(
                r"
                SELECT r.id, r.first_name, r.last_name, r.email,
                       r.start_time, r.end_time, r.date, r.counseling_session_id,
                       r.created_at, r.updated_at, r.processed,
                       cs.id AS session_id, cs.counselor_name
                FROM reservations r
                LEFT JOIN counseling_sessions cs ON r.counseling_session_id = cs.id
                WHERE r.id = $1
                ",
            )
            .bind(id)
            .fetch_one(&self.pool),
        )
        .await?;
        joined_reservation(&row).map_err(map_sqlx_error)
    }

    async fn update_reservation(&self, reservation: &Reservation) -> Result<()> {
        Self::bounded(
            sqlx::query(
                r"
                UPDATE reservations
                SET first_name = $1, last_name = $2, email = $3,
                    date = $4, start_time = $5, end_time = $6, updated_at = $7
                WHERE id = $8
                ",
            )
            .bind(&reservation.first_name)
            .bind(&reservation.last_name)
            .bind(&reservation.email)
            .bind(reservation.date)
            .bind(reservation.start_time)
            .bind(reservation.end_time)
            .bind(Utc::now())
            .bind(reservation.id)
            .execute(&self.pool),
        )
        .await?;
        Ok(())
    }

    async fn update_processed_for_reservation(&self, id: i64, processed: i32) -> Result<()> {
        Self::bounded(
            sqlx::query("UPDATE reservations SET processed = $1, updated_at = $2 WHERE id = $3")
                .bind(processed)
                .bind(Utc::now())
                .bind(id)
                .execute(&self.pool),
        )
        .await?;
        Ok(())
    }

    async fn delete_reservation(&self, id: i64) -> Result<()> {
        Self::bounded(
            sqlx::query("DELETE FROM reservations WHERE id = $1")
                .bind(id)
                .execute(&self.pool),
        )
        .await?;
        Ok(())
    }
}
