//! Cookie-backed sessions at the HTTP boundary.
//!
//! [`load_session`] turns the session cookie into a [`RequestContext`]
//! extension; handlers read it with `Extension<RequestContext>`.

use axum::extract::{Request, State};
use axum::http::{HeaderMap, header};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use storefront_core::{AccountId, RequestContext, SessionToken};
use tracing::info;

use crate::error::{AppError, AppResult};
use crate::state::AppState;

/// Session cookie attributes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CookieSettings {
    /// Cookie name.
    pub name: String,
    /// Add the `Secure` attribute.
    pub secure: bool,
    /// `Max-Age` in seconds.
    pub max_age_secs: i64,
}

impl CookieSettings {
    /// `Set-Cookie` value carrying a session token.
    #[must_use]
    pub fn issue(&self, token: &SessionToken) -> String {
        let secure = if self.secure { "; Secure" } else { "" };
        format!(
            "{}={}; Path=/; HttpOnly; SameSite=Lax; Max-Age={}{secure}",
            self.name,
            token.as_str(),
            self.max_age_secs
        )
    }
}

/// Find the session token in the request's `Cookie` headers.
#[must_use]
pub fn read_token(headers: &HeaderMap, cookie_name: &str) -> Option<SessionToken> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, _)| *name == cookie_name)
        .and_then(|(_, value)| SessionToken::parse(value))
}

/// Middleware resolving the session cookie into a [`RequestContext`].
///
/// Missing, malformed, unknown and expired cookies all give an anonymous
/// context. Only a storage failure aborts the request.
pub async fn load_session(State(state): State<AppState>, mut request: Request, next: Next) -> Response {
    let ctx = match read_token(request.headers(), &state.cookie.name) {
        Some(token) => match state.sessions.resolve(&token).await {
            Ok(Some(session)) => RequestContext::from_session(session),
            Ok(None) => RequestContext::anonymous(),
            Err(e) => return AppError::from(e).into_response(),
        },
        None => RequestContext::anonymous(),
    };

    request.extensions_mut().insert(ctx);
    next.run(request).await
}

/// Issue a signed-in session for `account_id`, replacing the visitor's
/// current session.
///
/// The token is rotated on every sign-in; the old session's cart moves to
/// the new one in the same transaction. Returns the `Set-Cookie` value.
///
/// # Errors
///
/// Returns an error if a session or cart query fails.
pub async fn sign_in(state: &AppState, ctx: &RequestContext, account_id: AccountId) -> AppResult<String> {
    let (token, _) = state.sessions.rotate(ctx.session(), Some(account_id)).await?;

    info!("Account {account_id} signed in");
    Ok(state.cookie.issue(&token))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use axum::http::HeaderValue;

    use super::*;

    fn settings(secure: bool) -> CookieSettings {
        CookieSettings {
            name: "sid".to_string(),
            secure,
            max_age_secs: 60,
        }
    }

    #[test]
    fn test_issue() {
        let token = SessionToken::generate();
        let cookie = settings(false).issue(&token);
        assert!(cookie.starts_with(&format!("sid={}; ", token.as_str())));
        assert!(cookie.contains("HttpOnly"));
        assert!(cookie.contains("Max-Age=60"));
        assert!(!cookie.contains("Secure"));

        let secure = settings(true).issue(&token);
        assert!(secure.ends_with("; Secure"));
    }

    #[test]
    fn test_read_token_among_other_cookies() {
        let token = SessionToken::generate();
        let mut headers = HeaderMap::new();
        headers.append(header::COOKIE, HeaderValue::from_static("theme=dark"));
        headers.append(
            header::COOKIE,
            HeaderValue::from_str(&format!("a=1; sid={}; b=2", token.as_str())).unwrap(),
        );

        assert_eq!(read_token(&headers, "sid"), Some(token));
        assert_eq!(read_token(&headers, "other"), None);
    }

    #[test]
    fn test_read_token_rejects_malformed_value() {
        let mut headers = HeaderMap::new();
        headers.insert(header::COOKIE, HeaderValue::from_static("sid=../../etc"));
        assert_eq!(read_token(&headers, "sid"), None);
    }
}
