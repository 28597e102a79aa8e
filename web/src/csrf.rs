//! Cross-request forgery protection.
//!
//! Every rendered page embeds the session's token in its forms (the render
//! pipeline issues it); state-changing POST handlers call [`require`]
//! before acting. The JSON availability endpoint is the one exempted POST
//! route.

use crate::error::AppError;
use bookings_core::{FormSubmission, Session};
use constant_time_eq::constant_time_eq;

/// Form field carrying the token.
pub const CSRF_FIELD: &str = "csrf_token";

/// Whether the submission carries the session's current token.
#[must_use]
pub fn verify(session: &Session, submission: &FormSubmission) -> bool {
    let expected = session.csrf_token();
    let submitted = submission.value(CSRF_FIELD);
    constant_time_eq(submitted.as_bytes(), expected.as_bytes())
}

/// Reject the request with 403 unless the token matches.
pub fn require(session: &Session, submission: &FormSubmission) -> Result<(), AppError> {
    if verify(session, submission) {
        Ok(())
    } else {
        Err(AppError::forbidden("Invalid or missing CSRF token"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_the_session_token() {
        let session = Session::fresh();
        let token = session.csrf_token();
        let submission =
            FormSubmission::from_pairs(vec![(CSRF_FIELD.to_string(), token)]);

        assert!(verify(&session, &submission));
    }

    #[test]
    fn rejects_missing_or_wrong_token() {
        let session = Session::fresh();
        let _ = session.csrf_token();

        let empty = FormSubmission::new();
        let wrong =
            FormSubmission::from_pairs(vec![(CSRF_FIELD.to_string(), "forged".to_string())]);

        assert!(!verify(&session, &empty));
        assert!(!verify(&session, &wrong));
        assert!(require(&session, &wrong).is_err());
    }
}
