//! Client-side error taxonomy.
//!
//! Shallow by design: field validation failures are typed violations in
//! `matric-core`, so everything here is transport, session, or server.
//! Nothing is retried automatically; recovery is "let the user try again".

use matric_core::error::CoreError;

/// Errors surfaced by the HTTP service layer.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// Transport-level failure: DNS, refused connection, timeout.
    #[error("No connectivity: {0}")]
    NoConnectivity(String),

    /// The stored token is missing or past its expiry buffer, or the
    /// server answered 401. The session has been cleared.
    #[error("Session expired")]
    SessionExpired,

    /// The server replied with a non-2xx status.
    #[error("API error ({status}): {message}")]
    Api { status: u16, message: String },

    /// The HTTP request failed for a non-transport reason (TLS setup,
    /// body decode, invalid part headers).
    #[error("HTTP request failed: {0}")]
    Request(reqwest::Error),

    /// The session file could not be read or written.
    #[error("Session store error: {0}")]
    Store(String),

    /// A domain-level error from `matric-core`.
    #[error(transparent)]
    Core(#[from] CoreError),
}

/// Coarse classification driving user-facing messaging.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    NoConnectivity,
    SessionExpired,
    Server,
}

impl ClientError {
    /// Classify a reqwest error: connection and timeout failures are
    /// "no connectivity", the rest stay as raw request errors.
    pub(crate) fn from_reqwest(err: reqwest::Error) -> Self {
        if err.is_connect() || err.is_timeout() {
            Self::NoConnectivity(err.to_string())
        } else {
            Self::Request(err)
        }
    }

    /// Which of the three user-facing buckets this error falls into.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::NoConnectivity(_) => ErrorKind::NoConnectivity,
            Self::SessionExpired => ErrorKind::SessionExpired,
            _ => ErrorKind::Server,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn errors_classify_into_the_three_buckets() {
        assert_eq!(
            ClientError::NoConnectivity("dns".into()).kind(),
            ErrorKind::NoConnectivity
        );
        assert_eq!(ClientError::SessionExpired.kind(), ErrorKind::SessionExpired);
        assert_eq!(
            ClientError::Api {
                status: 500,
                message: "boom".into()
            }
            .kind(),
            ErrorKind::Server
        );
        assert_eq!(
            ClientError::Store("disk full".into()).kind(),
            ErrorKind::Server
        );
    }
}
