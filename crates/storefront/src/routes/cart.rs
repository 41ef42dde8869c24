//! Cart endpoints.

use axum::extract::{Path, State};
use axum::http::header::SET_COOKIE;
use axum::response::{IntoResponse, Response};
use axum::{Extension, Json};
use storefront_core::{CartSummary, ProductId, RequestContext};

use crate::error::{AppError, AppResult};
use crate::state::AppState;

/// `GET /cart`
pub async fn show(
    State(state): State<AppState>,
    Extension(ctx): Extension<RequestContext>,
) -> AppResult<Json<CartSummary>> {
    let summary = match ctx.session() {
        Some(session) => state.carts.summary(&session.key).await?,
        None => CartSummary::default(),
    };
    Ok(Json(summary))
}

/// `POST /cart/items/{product_id}`
///
/// A visitor without a session gets an anonymous one, and its cookie.
pub async fn add_item(
    State(state): State<AppState>,
    Extension(ctx): Extension<RequestContext>,
    Path(product_id): Path<i64>,
) -> AppResult<Response> {
    let product_id = ProductId::new(product_id);
    if state.products.get(product_id).await?.is_none() {
        return Err(AppError::not_found(format!("Product not found: {product_id}")));
    }

    let (key, cookie) = match ctx.session() {
        Some(session) => (session.key.clone(), None),
        None => {
            let (token, session) = state.sessions.create(None).await?;
            (session.key, Some(state.cookie.issue(&token)))
        }
    };

    state.carts.add_item(&key, product_id).await?;
    let summary = Json(state.carts.summary(&key).await?);

    Ok(match cookie {
        Some(cookie) => ([(SET_COOKIE, cookie)], summary).into_response(),
        None => summary.into_response(),
    })
}

/// `DELETE /cart/items/{product_id}`
pub async fn remove_item(
    State(state): State<AppState>,
    Extension(ctx): Extension<RequestContext>,
    Path(product_id): Path<i64>,
) -> AppResult<Json<CartSummary>> {
    let Some(session) = ctx.session() else {
        return Ok(Json(CartSummary::default()));
    };

    state
        .carts
        .remove_item(&session.key, ProductId::new(product_id))
        .await?;
    Ok(Json(state.carts.summary(&session.key).await?))
}
