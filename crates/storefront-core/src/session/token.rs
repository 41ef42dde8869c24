//! Opaque session tokens.

use sha2::{Digest, Sha256};
use uuid::Uuid;

/// Random token handed to the browser in the session cookie.
///
/// Only its SHA-256 digest is persisted, so a leaked database cannot be
/// replayed as cookies.
#[derive(Clone, PartialEq, Eq)]
pub struct SessionToken(String);

impl SessionToken {
    /// Generate a fresh random token.
    #[must_use]
    pub fn generate() -> Self {
        Self(Uuid::new_v4().simple().to_string())
    }

    /// Wrap a token read back from a cookie.
    ///
    /// Returns `None` for values that could not have been issued by
    /// [`SessionToken::generate`].
    #[must_use]
    pub fn parse(raw: &str) -> Option<Self> {
        let raw = raw.trim();
        let well_formed = raw.len() == 32 && raw.bytes().all(|b| b.is_ascii_hexdigit());
        well_formed.then(|| Self(raw.to_ascii_lowercase()))
    }

    /// The token as sent to the client.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Hex SHA-256 digest, the form stored in the database.
    #[must_use]
    pub fn digest(&self) -> String {
        format!("{:x}", Sha256::digest(self.0.as_bytes()))
    }
}

// Never print the raw token
impl std::fmt::Debug for SessionToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("SessionToken(..)")
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_generated_tokens_are_unique_and_parse() {
        let a = SessionToken::generate();
        let b = SessionToken::generate();
        assert_ne!(a, b);
        assert_eq!(SessionToken::parse(a.as_str()), Some(a));
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!(SessionToken::parse("").is_none());
        assert!(SessionToken::parse("not-a-token").is_none());
        assert!(SessionToken::parse(&"z".repeat(32)).is_none());
        assert!(SessionToken::parse(&"a".repeat(33)).is_none());
    }

    #[test]
    fn test_digest_is_stable_hex_and_hides_token() {
        let token = SessionToken::generate();
        let digest = token.digest();
        assert_eq!(digest.len(), 64);
        assert!(digest.chars().all(|c| c.is_ascii_hexdigit()));
        assert_eq!(digest, token.digest());
        assert!(!digest.contains(token.as_str()));
    }

    #[test]
    fn test_debug_redacts() {
        let token = SessionToken::generate();
        assert!(!format!("{token:?}").contains(token.as_str()));
    }
}
