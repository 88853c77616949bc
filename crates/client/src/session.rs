//! Bearer token + identity session, persisted as a JSON file.
//!
//! The session's lifetime is read by decoding the token's `exp` claim
//! client-side -- without signature verification, since the client never
//! holds the signing secret and only needs the timestamp. A small buffer
//! keeps a token that is about to lapse from being used mid-request.

use std::path::{Path, PathBuf};

use chrono::Utc;
use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use serde::{Deserialize, Serialize};

use matric_core::types::EntityId;

use crate::error::ClientError;

/// Seconds before the token's `exp` at which it is already treated as
/// expired.
pub const EXPIRY_BUFFER_SECS: i64 = 30;

/// Token plus the identity claims shown in the UI.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    pub token: String,
    pub student_id: EntityId,
    pub full_name: String,
    pub profile_code: String,
}

/// The only claim the client reads back out of the token.
#[derive(Debug, Deserialize)]
struct TokenClaims {
    exp: i64,
}

impl Session {
    /// The token's expiry as a Unix timestamp, or `None` when the claim
    /// cannot be decoded.
    pub fn expires_at(&self) -> Option<i64> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.insecure_disable_signature_validation();
        validation.validate_exp = false;
        decode::<TokenClaims>(&self.token, &DecodingKey::from_secret(&[]), &validation)
            .map(|data| data.claims.exp)
            .ok()
    }

    /// Expired (with buffer) at the given Unix timestamp. A token whose
    /// claim cannot be read counts as expired.
    pub fn is_expired_at(&self, now: i64) -> bool {
        match self.expires_at() {
            Some(exp) => exp - now <= EXPIRY_BUFFER_SECS,
            None => true,
        }
    }

    /// Expired (with buffer) right now.
    pub fn is_expired(&self) -> bool {
        self.is_expired_at(Utc::now().timestamp())
    }
}

/// Explicit load/save/clear lifecycle for the persisted session.
///
/// Every consumer goes through this store; there is no ambient state that
/// auto-persists on mutation.
#[derive(Debug, Clone)]
pub struct SessionStore {
    path: PathBuf,
}

impl SessionStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// The persisted session, if any. Does not check expiry.
    pub fn load(&self) -> Result<Option<Session>, ClientError> {
        let raw = match std::fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(ClientError::Store(e.to_string())),
        };
        serde_json::from_str(&raw)
            .map(Some)
            .map_err(|e| ClientError::Store(e.to_string()))
    }

    /// Persist a session, creating the parent directory if needed.
    pub fn save(&self, session: &Session) -> Result<(), ClientError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).map_err(|e| ClientError::Store(e.to_string()))?;
            }
        }
        let json = serde_json::to_string_pretty(session)
            .map_err(|e| ClientError::Store(e.to_string()))?;
        std::fs::write(&self.path, json).map_err(|e| ClientError::Store(e.to_string()))
    }

    /// Remove the persisted session; a missing file is not an error.
    pub fn clear(&self) -> Result<(), ClientError> {
        match std::fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(ClientError::Store(e.to_string())),
        }
    }

    /// The persisted session if it is still usable; an expired one is
    /// cleared and reported as absent.
    pub fn current(&self) -> Result<Option<Session>, ClientError> {
        match self.load()? {
            Some(session) if session.is_expired() => {
                self.clear()?;
                Ok(None)
            }
            other => Ok(other),
        }
    }
}


#[cfg(test)]
mod tests {
    use chrono::Utc;

    use super::test_support::session_expiring_at;
    use super::*;

    #[test]
    fn expiry_claim_is_decoded_without_the_secret() {
        let session = session_expiring_at(2_000_000_000);
        assert_eq!(session.expires_at(), Some(2_000_000_000));
    }

    #[test]
    fn expiry_buffer_is_applied() {
        let session = session_expiring_at(1_000_000);
        // Well before expiry.
        assert!(!session.is_expired_at(1_000_000 - EXPIRY_BUFFER_SECS - 1));
        // Inside the buffer window.
        assert!(session.is_expired_at(1_000_000 - EXPIRY_BUFFER_SECS));
        // Past expiry.
        assert!(session.is_expired_at(1_000_001));
    }

    #[test]
    fn garbage_token_counts_as_expired() {
        let session = Session {
            token: "not-a-jwt".to_string(),
            student_id: 1,
            full_name: String::new(),
            profile_code: String::new(),
        };
        assert!(session.is_expired());
    }

    #[test]
    fn store_lifecycle() {
        let dir = tempfile::tempdir().unwrap();
        let store = SessionStore::new(dir.path().join("nested").join("session.json"));

        assert!(store.load().unwrap().is_none());

        let session = session_expiring_at(Utc::now().timestamp() + 3600);
        store.save(&session).unwrap();

        let loaded = store.load().unwrap().unwrap();
        assert_eq!(loaded.student_id, 7);
        assert_eq!(loaded.profile_code, "TS2026-0007");

        store.clear().unwrap();
        assert!(store.load().unwrap().is_none());
        // Clearing twice is fine.
        store.clear().unwrap();
    }

    #[test]
    fn current_drops_expired_sessions() {
        let dir = tempfile::tempdir().unwrap();
        let store = SessionStore::new(dir.path().join("session.json"));

        store
            .save(&session_expiring_at(Utc::now().timestamp() - 60))
            .unwrap();
        assert!(store.current().unwrap().is_none());
        // The expired file was removed, not just hidden.
        assert!(store.load().unwrap().is_none());

        store
            .save(&session_expiring_at(Utc::now().timestamp() + 3600))
            .unwrap();
        assert!(store.current().unwrap().is_some());
    }
}
