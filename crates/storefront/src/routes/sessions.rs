//! Login and logout.

use axum::extract::State;
use axum::http::header::SET_COOKIE;
use axum::response::{IntoResponse, Redirect, Response};
use axum::{Extension, Form, Json};
use serde::{Deserialize, Serialize};
use storefront_core::RequestContext;
use tracing::info;

use crate::error::AppResult;
use crate::session::sign_in;
use crate::state::AppState;

/// Login form fields. A missing field is empty and fails like a wrong one.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct LoginForm {
    /// Email as typed.
    pub email: String,
    /// Password.
    pub password: String,
}

/// Login page state.
#[derive(Debug, Serialize)]
pub struct LoginStatus {
    /// Whether the visitor is already signed in.
    pub authenticated: bool,
}

/// `GET /login`
pub async fn new(Extension(ctx): Extension<RequestContext>) -> Json<LoginStatus> {
    Json(LoginStatus {
        authenticated: ctx.is_authenticated(),
    })
}

/// `POST /login`
///
/// Success issues a new session cookie and redirects home. Any failure,
/// unknown email or wrong password alike, redirects back to `/login`.
pub async fn create(
    State(state): State<AppState>,
    Extension(ctx): Extension<RequestContext>,
    Form(form): Form<LoginForm>,
) -> AppResult<Response> {
    let Some(account) = state
        .authenticator
        .authenticate(&form.email, &form.password)
        .await?
    else {
        return Ok(Redirect::to("/login").into_response());
    };

    let cookie = sign_in(&state, &ctx, account.id).await?;
    Ok(([(SET_COOKIE, cookie)], Redirect::to("/")).into_response())
}

/// `GET /logout`, `POST /logout`
///
/// Clears the signed-in account; the session and its cart survive.
pub async fn destroy(
    State(state): State<AppState>,
    Extension(ctx): Extension<RequestContext>,
) -> AppResult<Redirect> {
    if let Some(session) = ctx.session()
        && let Some(account_id) = session.account_id
    {
        state.sessions.sign_out(session).await?;
        info!("Account {account_id} signed out");
    }

    Ok(Redirect::to("/"))
}
