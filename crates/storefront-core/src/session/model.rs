//! Session model.

use chrono::{DateTime, Utc};

use crate::account::AccountId;

/// A stored browser session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    /// Digest of the session token; the primary key.
    pub key: String,
    /// Signed-in account, if any. Anonymous sessions still own a cart.
    pub account_id: Option<AccountId>,
    /// When the session was created.
    pub created_at: DateTime<Utc>,
    /// After this instant the session no longer resolves.
    pub expires_at: DateTime<Utc>,
}

impl Session {
    /// Whether the session has lapsed at `now`.
    #[must_use]
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.expires_at <= now
    }
}

/// Explicit per-request authentication state.
///
/// Built by the HTTP layer from the session cookie and passed to handlers.
/// Login issues a fresh session; logout clears the stored account but keeps
/// the session (and its cart).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequestContext {
    session: Option<Session>,
}

impl RequestContext {
    /// A visitor without any session.
    #[must_use]
    pub const fn anonymous() -> Self {
        Self { session: None }
    }

    /// Context for a resolved session.
    #[must_use]
    pub const fn from_session(session: Session) -> Self {
        Self {
            session: Some(session),
        }
    }

    /// The resolved session, if the visitor has one.
    #[must_use]
    pub const fn session(&self) -> Option<&Session> {
        self.session.as_ref()
    }

    /// The signed-in account.
    #[must_use]
    pub fn account_id(&self) -> Option<AccountId> {
        self.session.as_ref().and_then(|s| s.account_id)
    }

    /// True when an account is signed in.
    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.account_id().is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn session(account_id: Option<AccountId>) -> Session {
        let now = Utc::now();
        Session {
            key: "k".to_string(),
            account_id,
            created_at: now,
            expires_at: now + chrono::Duration::hours(1),
        }
    }

    #[test]
    fn test_anonymous_context() {
        let ctx = RequestContext::anonymous();
        assert!(ctx.session().is_none());
        assert!(!ctx.is_authenticated());
        assert_eq!(ctx, RequestContext::default());
    }

    #[test]
    fn test_session_without_account_is_not_authenticated() {
        let ctx = RequestContext::from_session(session(None));
        assert!(ctx.session().is_some());
        assert!(!ctx.is_authenticated());
    }

    #[test]
    fn test_signed_in_session() {
        let ctx = RequestContext::from_session(session(Some(AccountId::new(7))));
        assert!(ctx.is_authenticated());
        assert_eq!(ctx.account_id(), Some(AccountId::new(7)));
        assert_eq!(ctx.session().map(|s| s.key.as_str()), Some("k"));
    }

    #[test]
    fn test_expiry() {
        let s = session(None);
        assert!(!s.is_expired_at(s.created_at));
        assert!(s.is_expired_at(s.expires_at));
    }
}
