//! Debounced, fail-open uniqueness checks for the passport and mobile
//! fields.
//!
//! Uniqueness is enforced by round-tripping to the server; there is no
//! local index. The checker waits out a quiet window before probing so
//! the backend is not hit on every keystroke, and discards results that
//! a newer check has superseded.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;

use crate::api::ApiClient;
use crate::error::ClientError;

/// Quiet window awaited before a remote check fires.
pub const DEBOUNCE: Duration = Duration::from_secs(1);

/// Remote predicate answering "is this value already registered?".
#[async_trait]
pub trait ExistsProbe: Send + Sync {
    async fn exists(&self, value: &str) -> Result<bool, ClientError>;
}

/// Outcome of one debounced check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CheckOutcome {
    /// No conflict found (or the probe failed -- fail-open).
    Unique,
    /// The value is already registered.
    Taken,
    /// Blank input or the unchanged original value; no remote call made.
    Skipped,
    /// A newer check superseded this one; discard the result.
    Stale,
}

/// Debounces a field's changes and discards superseded results.
///
/// Every call bumps a generation counter. The counter is re-checked after
/// the debounce window *and* after the probe returns, so a result
/// belonging to an older edit can never overwrite a newer one.
pub struct UniquenessChecker<P> {
    probe: P,
    debounce: Duration,
    original: Option<String>,
    generation: AtomicU64,
}

impl<P: ExistsProbe> UniquenessChecker<P> {
    pub fn new(probe: P) -> Self {
        Self {
            probe,
            debounce: DEBOUNCE,
            original: None,
            generation: AtomicU64::new(0),
        }
    }

    /// Override the debounce window (tests use a short one).
    pub fn with_debounce(mut self, debounce: Duration) -> Self {
        self.debounce = debounce;
        self
    }

    /// Edit-mode variant: a value equal to the one loaded from the server
    /// skips the remote call entirely.
    pub fn ignoring_original(mut self, original: impl Into<String>) -> Self {
        self.original = Some(original.into());
        self
    }

    /// Run one debounced check for the field's current value.
    pub async fn check(&self, value: &str) -> CheckOutcome {
        let value = value.trim();
        if value.is_empty() {
            return CheckOutcome::Skipped;
        }
        if self.original.as_deref() == Some(value) {
            return CheckOutcome::Skipped;
        }

        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        tokio::time::sleep(self.debounce).await;
        if self.generation.load(Ordering::SeqCst) != generation {
            return CheckOutcome::Stale;
        }

        let result = self.probe.exists(value).await;
        if self.generation.load(Ordering::SeqCst) != generation {
            return CheckOutcome::Stale;
        }

        match result {
            Ok(true) => CheckOutcome::Taken,
            Ok(false) => CheckOutcome::Unique,
            Err(error) => {
                // Fail-open: a backend outage must never block submission.
                tracing::warn!(error = %error, "Uniqueness check failed; treating value as unique");
                CheckOutcome::Unique
            }
        }
    }
}

/// Probe hitting the passport-exists endpoint.
pub struct PassportProbe {
    pub client: Arc<ApiClient>,
}

#[async_trait]
impl ExistsProbe for PassportProbe {
    async fn exists(&self, value: &str) -> Result<bool, ClientError> {
        self.client.passport_exists(value).await
    }
}

/// Probe hitting the mobile-exists endpoint.
pub struct MobileProbe {
    pub client: Arc<ApiClient>,
}

#[async_trait]
impl ExistsProbe for MobileProbe {
    async fn exists(&self, value: &str) -> Result<bool, ClientError> {
        self.client.mobile_exists(value).await
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::AtomicUsize;

    use super::*;

    /// Probe with a canned answer and a call counter.
    struct CannedProbe {
        taken: bool,
        fail: bool,
        calls: AtomicUsize,
    }

    impl CannedProbe {
        fn answering(taken: bool) -> Self {
            Self {
                taken,
                fail: false,
                calls: AtomicUsize::new(0),
            }
        }

        fn failing() -> Self {
            Self {
                taken: false,
                fail: true,
                calls: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl ExistsProbe for Arc<CannedProbe> {
        async fn exists(&self, _value: &str) -> Result<bool, ClientError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                Err(ClientError::NoConnectivity("connection refused".into()))
            } else {
                Ok(self.taken)
            }
        }
    }

    fn checker(probe: &Arc<CannedProbe>) -> UniquenessChecker<Arc<CannedProbe>> {
        UniquenessChecker::new(Arc::clone(probe)).with_debounce(Duration::from_millis(10))
    }

    #[tokio::test]
    async fn blank_input_is_skipped_without_a_call() {
        let probe = Arc::new(CannedProbe::answering(true));
        let outcome = checker(&probe).check("  ").await;
        assert_eq!(outcome, CheckOutcome::Skipped);
        assert_eq!(probe.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn unchanged_original_is_skipped_without_a_call() {
        let probe = Arc::new(CannedProbe::answering(true));
        let checker = checker(&probe).ignoring_original("C1234567");
        let outcome = checker.check("C1234567").await;
        assert_eq!(outcome, CheckOutcome::Skipped);
        assert_eq!(probe.calls.load(Ordering::SeqCst), 0);

        // A different value still round-trips.
        assert_eq!(checker.check("C7654321").await, CheckOutcome::Taken);
        assert_eq!(probe.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn taken_and_unique_pass_through() {
        let taken = Arc::new(CannedProbe::answering(true));
        assert_eq!(checker(&taken).check("C1234567").await, CheckOutcome::Taken);

        let free = Arc::new(CannedProbe::answering(false));
        assert_eq!(checker(&free).check("C1234567").await, CheckOutcome::Unique);
    }

    #[tokio::test]
    async fn probe_failure_is_fail_open() {
        let probe = Arc::new(CannedProbe::failing());
        let outcome = checker(&probe).check("C1234567").await;
        assert_eq!(outcome, CheckOutcome::Unique);
        assert_eq!(probe.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn superseded_check_is_discarded_as_stale() {
        let probe = Arc::new(CannedProbe::answering(false));
        let checker = Arc::new(
            UniquenessChecker::new(Arc::clone(&probe)).with_debounce(Duration::from_millis(50)),
        );

        let first = {
            let checker = Arc::clone(&checker);
            tokio::spawn(async move { checker.check("C1111111").await })
        };
        // Let the first check enter its debounce window, then supersede it.
        tokio::time::sleep(Duration::from_millis(10)).await;
        let second = checker.check("C2222222").await;

        assert_eq!(first.await.unwrap(), CheckOutcome::Stale);
        assert_eq!(second, CheckOutcome::Unique);
        // The stale check never reached the probe.
        assert_eq!(probe.calls.load(Ordering::SeqCst), 1);
    }
}
