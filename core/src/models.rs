//! Domain entities.
//!
//! All types are `Clone + Serialize + Deserialize` so they can be stored in
//! the visitor session between a form submission and its confirmation page.

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};

/// A registered account, used only for admin login.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    /// Database identity.
    pub id: i64,
    /// Given name.
    pub first_name: String,
    /// Family name.
    pub last_name: String,
    /// Login email, unique.
    pub email: String,
    /// Salted password hash. Never serialized out to clients.
    #[serde(skip_serializing)]
    pub password: String,
    /// Access level; unused beyond "can log in".
    pub access_level: i32,
    /// Row creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Row update timestamp.
    pub updated_at: DateTime<Utc>,
}

/// Newsletter signup captured from the public form.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Signup {
    /// Given name.
    pub first_name: String,
    /// Family name.
    pub last_name: String,
    /// Contact email.
    pub email: String,
}

/// Account registration captured from the public form.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserRegistration {
    /// Given name.
    pub first_name: String,
    /// Family name.
    pub last_name: String,
    /// Contact email.
    pub email: String,
}

/// Counseling-session request captured from the public form.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CounselingRegistration {
    /// Given name.
    pub first_name: String,
    /// Family name.
    pub last_name: String,
    /// Contact email.
    pub email: String,
    /// Self-reported gender, used to match a counselor.
    pub gender: String,
    /// Free-text reason for the session request.
    pub reason: String,
}

/// A counseling session a reservation can be attached to.
///
/// Read-only join target in listing and detail operations. A reservation
/// with no matching session carries the `Default` zero values.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CounselingSession {
    /// Database identity.
    pub id: i64,
    /// Counselor display name.
    pub counselor_name: String,
    /// Row creation timestamp.
    pub created_at: Option<DateTime<Utc>>,
    /// Row update timestamp.
    pub updated_at: Option<DateTime<Utc>>,
}

/// A counseling-session reservation.
///
/// `processed` is a lifecycle marker: 0 = awaiting admin action, 1 =
/// handled. It only ever transitions 0 → 1, and only through
/// [`crate::repository::ReservationRepository::update_processed_for_reservation`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Reservation {
    /// Database identity; 0 until inserted.
    pub id: i64,
    /// Given name.
    pub first_name: String,
    /// Family name.
    pub last_name: String,
    /// Contact email.
    pub email: String,
    /// Requested start of the time window.
    pub start_time: NaiveTime,
    /// Requested end of the time window.
    pub end_time: NaiveTime,
    /// Requested date.
    pub date: NaiveDate,
    /// Foreign key to [`CounselingSession`].
    pub counseling_session_id: i64,
    /// Row creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Row update timestamp.
    pub updated_at: DateTime<Utc>,
    /// Joined counseling session; zero-value when no match exists.
    pub counseling_session: CounselingSession,
    /// Lifecycle marker: 0 = new, 1 = processed.
    pub processed: i32,
}

impl Default for Reservation {
    fn default() -> Self {
        Self {
            id: 0,
            first_name: String::new(),
            last_name: String::new(),
            email: String::new(),
            start_time: NaiveTime::MIN,
            end_time: NaiveTime::MIN,
            date: NaiveDate::default(),
            counseling_session_id: 0,
            created_at: DateTime::<Utc>::MIN_UTC,
            updated_at: DateTime::<Utc>::MIN_UTC,
            counseling_session: CounselingSession::default(),
            processed: 0,
        }
    }
}

/// Time-window restriction recorded alongside a reservation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CounselingTimeRestriction {
    /// Database identity; 0 until inserted.
    pub id: i64,
    /// Blocked window start.
    pub start_time: NaiveTime,
    /// Blocked window end.
    pub end_time: NaiveTime,
    /// Blocked date.
    pub date: NaiveDate,
    /// Reservation this restriction belongs to.
    pub reservation_id: i64,
    /// Restriction kind.
    pub restriction_id: i64,
    /// Row creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Row update timestamp.
    pub updated_at: DateTime<Utc>,
}
