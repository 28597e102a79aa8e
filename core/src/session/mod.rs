//! Visitor sessions.
//!
//! A session is a per-visitor record keyed by an opaque [`SessionId`]
//! carried in a cookie. Storage lives behind the [`SessionStore`] trait
//! (24-hour sliding TTL); the per-request [`Session`] handle is the
//! capability object handlers and the render pipeline work with.
//!
//! Payload slots are strongly typed: each workflow stores its record in its
//! own field of [`SessionData`], and the accessors fail closed — an absent
//! slot simply reads as `None`.

mod memory;

pub use memory::MemorySessionStore;

use crate::error::Result;
use crate::models::{CounselingRegistration, Reservation, Signup, UserRegistration};
use async_trait::async_trait;
use base64::Engine as _;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use chrono::Duration;
use rand::RngCore;
use serde::{Deserialize, Serialize};
use std::sync::{Arc, Mutex, MutexGuard};

/// Opaque identifier for one visitor's session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SessionId(pub uuid::Uuid);

impl SessionId {
    /// Generate a new random `SessionId`.
    #[must_use]
    pub fn new() -> Self {
        Self(uuid::Uuid::new_v4())
    }

    /// Parse from the cookie value.
    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        uuid::Uuid::parse_str(value).ok().map(Self)
    }
}

impl Default for SessionId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for SessionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

/// Everything one visitor's session can hold.
///
/// Flash, warning, and error are one-shot message slots consumed by the
/// render pipeline. The workflow slots carry a just-submitted record from
/// a POST handler to its confirmation page.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SessionData {
    /// Authenticated user, if logged in.
    pub user_id: Option<i64>,
    /// Cross-request forgery-protection token.
    pub csrf_token: Option<String>,
    /// One-shot informational message.
    pub flash: Option<String>,
    /// One-shot warning message.
    pub warning: Option<String>,
    /// One-shot error message.
    pub error: Option<String>,
    /// Pending newsletter signup awaiting confirmation.
    pub signup: Option<Signup>,
    /// Pending account registration awaiting confirmation.
    pub user_registration: Option<UserRegistration>,
    /// Pending counseling request awaiting confirmation.
    pub counseling_registration: Option<CounselingRegistration>,
    /// Reservation being assembled across requests.
    pub reservation: Option<Reservation>,
}

/// Session persistence boundary.
///
/// Implementations must be safe under concurrent access from multiple
/// simultaneous requests. Entries expire `ttl` after their last save.
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Load a session's data, or `None` if absent or expired.
    async fn load(&self, id: SessionId) -> Result<Option<SessionData>>;

    /// Persist a session's data, resetting its TTL (sliding expiration).
    async fn save(&self, id: SessionId, data: SessionData, ttl: Duration) -> Result<()>;

    /// Remove a session outright.
    async fn destroy(&self, id: SessionId) -> Result<()>;
}

/// What the save middleware needs to persist a session after the handler
/// has run.
#[derive(Debug, Clone)]
pub struct SessionCommit {
    /// Current session id (may differ from the loaded one after a renew).
    pub id: SessionId,
    /// Data to persist. `None` when the session was destroyed.
    pub data: Option<SessionData>,
    /// Ids abandoned by renew/destroy that must be removed from the store.
    pub stale: Vec<SessionId>,
}

#[derive(Debug)]
struct SessionInner {
    id: SessionId,
    data: SessionData,
    stale: Vec<SessionId>,
    destroyed: bool,
}

/// Per-request session handle.
///
/// Cheap to clone; all clones share state. The middleware creates one per
/// request, handlers mutate it synchronously, and the middleware persists
/// it once the response is ready.
#[derive(Debug, Clone)]
pub struct Session {
    inner: Arc<Mutex<SessionInner>>,
}

impl Session {
    /// Wrap loaded data under an existing id.
    #[must_use]
    pub fn from_parts(id: SessionId, data: SessionData) -> Self {
        Self {
            inner: Arc::new(Mutex::new(SessionInner {
                id,
                data,
                stale: Vec::new(),
                destroyed: false,
            })),
        }
    }

    /// Fresh, empty session under a new id.
    #[must_use]
    pub fn fresh() -> Self {
        Self::from_parts(SessionId::new(), SessionData::default())
    }

    fn lock(&self) -> MutexGuard<'_, SessionInner> {
        // A poisoned lock only means another request thread panicked while
        // holding it; the data is still usable.
        self.inner
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }

    /// Current session id.
    #[must_use]
    pub fn id(&self) -> SessionId {
        self.lock().id
    }

    /// Rotate the session id, keeping the data. Used on login and logout.
    pub fn renew(&self) {
        let mut inner = self.lock();
        let old = inner.id;
        inner.stale.push(old);
        inner.id = SessionId::new();
    }

    /// Drop all session state and mark the record for removal.
    pub fn destroy(&self) {
        let mut inner = self.lock();
        let old = inner.id;
        inner.stale.push(old);
        inner.id = SessionId::new();
        inner.data = SessionData::default();
        inner.destroyed = true;
    }

    /// Snapshot for the save middleware.
    #[must_use]
    pub fn commit(&self) -> SessionCommit {
        let mut inner = self.lock();
        let stale = std::mem::take(&mut inner.stale);
        SessionCommit {
            id: inner.id,
            data: if inner.destroyed {
                None
            } else {
                Some(inner.data.clone())
            },
            stale,
        }
    }

    /// Whether a visitor identity is attached.
    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.lock().data.user_id.is_some()
    }

    /// Attach the authenticated user id.
    pub fn log_in(&self, user_id: i64) {
        self.lock().data.user_id = Some(user_id);
    }

    /// Authenticated user id, if any.
    #[must_use]
    pub fn user_id(&self) -> Option<i64> {
        self.lock().data.user_id
    }

    /// Issue-or-fetch the forgery-protection token for this session.
    #[must_use]
    pub fn csrf_token(&self) -> String {
        let mut inner = self.lock();
        if let Some(token) = &inner.data.csrf_token {
            return token.clone();
        }
        let mut bytes = [0u8; 32];
        rand::thread_rng().fill_bytes(&mut bytes);
        let token = URL_SAFE_NO_PAD.encode(bytes);
        inner.data.csrf_token = Some(token.clone());
        token
    }

    /// Set the one-shot flash message.
    pub fn set_flash(&self, message: impl Into<String>) {
        self.lock().data.flash = Some(message.into());
    }

    /// Set the one-shot warning message.
    pub fn set_warning(&self, message: impl Into<String>) {
        self.lock().data.warning = Some(message.into());
    }

    /// Set the one-shot error message.
    pub fn set_error(&self, message: impl Into<String>) {
        self.lock().data.error = Some(message.into());
    }

    /// Read-and-clear the flash message.
    #[must_use]
    pub fn pop_flash(&self) -> Option<String> {
        self.lock().data.flash.take()
    }

    /// Read-and-clear the warning message.
    #[must_use]
    pub fn pop_warning(&self) -> Option<String> {
        self.lock().data.warning.take()
    }

    /// Read-and-clear the error message.
    #[must_use]
    pub fn pop_error(&self) -> Option<String> {
        self.lock().data.error.take()
    }

    /// Store a pending newsletter signup.
    pub fn put_signup(&self, signup: Signup) {
        self.lock().data.signup = Some(signup);
    }

    /// Read-and-evict the pending newsletter signup.
    #[must_use]
    pub fn take_signup(&self) -> Option<Signup> {
        self.lock().data.signup.take()
    }

    /// Store a pending account registration.
    pub fn put_user_registration(&self, registration: UserRegistration) {
        self.lock().data.user_registration = Some(registration);
    }

    /// Read-and-evict the pending account registration.
    #[must_use]
    pub fn take_user_registration(&self) -> Option<UserRegistration> {
        self.lock().data.user_registration.take()
    }

    /// Store a pending counseling request.
    pub fn put_counseling_registration(&self, registration: CounselingRegistration) {
        self.lock().data.counseling_registration = Some(registration);
    }

    /// Read-and-evict the pending counseling request.
    #[must_use]
    pub fn take_counseling_registration(&self) -> Option<CounselingRegistration> {
        self.lock().data.counseling_registration.take()
    }

    /// Store the reservation being assembled.
    pub fn put_reservation(&self, reservation: Reservation) {
        self.lock().data.reservation = Some(reservation);
    }

    /// The reservation being assembled, without evicting it.
    #[must_use]
    pub fn reservation(&self) -> Option<Reservation> {
        self.lock().data.reservation.clone()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn pop_is_read_and_clear() {
        let session = Session::fresh();
        session.set_flash("X");

        assert_eq!(session.pop_flash().as_deref(), Some("X"));
        assert_eq!(session.pop_flash(), None);
    }

    #[test]
    fn csrf_token_is_stable_per_session() {
        let session = Session::fresh();
        let first = session.csrf_token();
        let second = session.csrf_token();

        assert_eq!(first, second);
        assert!(!first.is_empty());
    }

    #[test]
    fn renew_rotates_id_and_keeps_data() {
        let session = Session::fresh();
        session.log_in(7);
        let old = session.id();

        session.renew();

        assert_ne!(session.id(), old);
        assert_eq!(session.user_id(), Some(7));
        let commit = session.commit();
        assert_eq!(commit.stale, vec![old]);
        assert!(commit.data.is_some());
    }

    #[test]
    fn destroy_clears_data_and_marks_removal() {
        let session = Session::fresh();
        session.log_in(7);
        let old = session.id();

        session.destroy();

        assert!(!session.is_authenticated());
        let commit = session.commit();
        assert!(commit.data.is_none());
        assert_eq!(commit.stale, vec![old]);
    }

    #[test]
    fn workflow_slots_are_single_use() {
        let session = Session::fresh();
        session.put_signup(Signup {
            first_name: "Ali".to_string(),
            last_name: "Khan".to_string(),
            email: "ali@example.com".to_string(),
        });

        assert!(session.take_signup().is_some());
        assert!(session.take_signup().is_none());
    }
}
