// crates/server/src/session.rs
//! Cookie-backed session identity.

use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use taskpulse_core::{SessionId, TrackerError};

/// Name of the cookie carrying the session token.
pub const SESSION_COOKIE: &str = "taskpulse_session";

/// Read the session token from the jar.
pub fn session_from_jar(jar: &CookieJar) -> Result<SessionId, TrackerError> {
    match jar.get(SESSION_COOKIE) {
        Some(cookie) => SessionId::parse(cookie.value()),
        None => Err(TrackerError::MissingSession),
    }
}

/// Return the session from the jar, minting a fresh one if absent or invalid.
///
/// The returned jar carries the `Set-Cookie` for a newly minted token.
pub fn ensure_session(jar: CookieJar) -> (CookieJar, SessionId) {
    match session_from_jar(&jar) {
        Ok(session_id) => (jar, session_id),
        Err(err) => {
            let session_id = SessionId::generate();
            tracing::debug!(session_id = %session_id, reason = %err, "issuing new session");
            let cookie = Cookie::build((SESSION_COOKIE, session_id.to_string()))
                .path("/")
                .http_only(true)
                .same_site(SameSite::Lax)
                .build();
            (jar.add(cookie), session_id)
        }
    }
}
