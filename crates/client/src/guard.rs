//! Route gating decisions.
//!
//! Pages are either public, authenticated-only, or guest-only (the login
//! page). The guard is a pure decision function; the caller performs the
//! actual navigation.

use crate::session::Session;

/// Access class of a route.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteAccess {
    Public,
    /// Requires a live session.
    Protected,
    /// Only reachable while logged out (login/OTP pages).
    GuestOnly,
}

/// What the caller should do with the navigation attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GuardDecision {
    Allow,
    RedirectToLogin,
    RedirectAway,
}

/// Gate a navigation attempt. An expired session counts as absent.
pub fn authorize(access: RouteAccess, session: Option<&Session>) -> GuardDecision {
    let authenticated = session.map(|s| !s.is_expired()).unwrap_or(false);
    match access {
        RouteAccess::Public => GuardDecision::Allow,
        RouteAccess::Protected if authenticated => GuardDecision::Allow,
        RouteAccess::Protected => GuardDecision::RedirectToLogin,
        RouteAccess::GuestOnly if authenticated => GuardDecision::RedirectAway,
        RouteAccess::GuestOnly => GuardDecision::Allow,
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use crate::session::test_support::session_expiring_at;

    use super::*;

    fn live_session() -> crate::session::Session {
        session_expiring_at(Utc::now().timestamp() + 3600)
    }

    fn dead_session() -> crate::session::Session {
        session_expiring_at(Utc::now().timestamp() - 60)
    }

    #[test]
    fn protected_requires_a_live_session() {
        assert_eq!(
            authorize(RouteAccess::Protected, None),
            GuardDecision::RedirectToLogin
        );
        assert_eq!(
            authorize(RouteAccess::Protected, Some(&live_session())),
            GuardDecision::Allow
        );
    }

    #[test]
    fn expired_session_counts_as_absent() {
        assert_eq!(
            authorize(RouteAccess::Protected, Some(&dead_session())),
            GuardDecision::RedirectToLogin
        );
        assert_eq!(
            authorize(RouteAccess::GuestOnly, Some(&dead_session())),
            GuardDecision::Allow
        );
    }

    #[test]
    fn guest_only_redirects_authenticated_visitors() {
        assert_eq!(
            authorize(RouteAccess::GuestOnly, Some(&live_session())),
            GuardDecision::RedirectAway
        );
        assert_eq!(authorize(RouteAccess::GuestOnly, None), GuardDecision::Allow);
    }

    #[test]
    fn public_always_allows() {
        assert_eq!(authorize(RouteAccess::Public, None), GuardDecision::Allow);
        assert_eq!(
            authorize(RouteAccess::Public, Some(&live_session())),
            GuardDecision::Allow
        );
    }
}
