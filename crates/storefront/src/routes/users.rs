//! Registration and the current account.

use axum::extract::State;
use axum::http::header::SET_COOKIE;
use axum::response::{IntoResponse, Redirect, Response};
use axum::{Extension, Form, Json};
use storefront_core::{Account, NewAccount, RequestContext};

use crate::error::{AppError, AppResult};
use crate::session::sign_in;
use crate::state::AppState;

/// `POST /users`
///
/// Registers and signs in. Invalid input is a 422 with per-field messages.
pub async fn create(
    State(state): State<AppState>,
    Extension(ctx): Extension<RequestContext>,
    Form(new): Form<NewAccount>,
) -> AppResult<Response> {
    let account = state.accounts.register(&new, &state.hasher).await?;
    let cookie = sign_in(&state, &ctx, account.id).await?;
    Ok(([(SET_COOKIE, cookie)], Redirect::to("/")).into_response())
}

/// `GET /me`
pub async fn me(
    State(state): State<AppState>,
    Extension(ctx): Extension<RequestContext>,
) -> AppResult<Json<Account>> {
    let id = ctx
        .account_id()
        .ok_or_else(|| AppError::unauthorized("Not signed in"))?;

    // Account rows cascade to their sessions, so this only races a deletion
    let account = state
        .accounts
        .get(id)
        .await?
        .ok_or_else(|| AppError::unauthorized("Not signed in"))?;

    Ok(Json(account))
}
