//! Home page and catalog.

use axum::extract::State;
use axum::{Extension, Json};
use serde::Serialize;
use storefront_core::{Account, Product, RequestContext};

use crate::error::AppResult;
use crate::state::AppState;

/// What the storefront header and product grid need.
#[derive(Debug, Serialize)]
pub struct HomePage {
    /// Signed-in account, if any.
    pub account: Option<Account>,
    /// "My Cart (n)".
    pub cart_count: u32,
    /// All products.
    pub products: Vec<Product>,
}

/// `GET /`
pub async fn index(
    State(state): State<AppState>,
    Extension(ctx): Extension<RequestContext>,
) -> AppResult<Json<HomePage>> {
    let account = match ctx.account_id() {
        Some(id) => state.accounts.get(id).await?,
        None => None,
    };
    let cart_count = match ctx.session() {
        Some(session) => state.carts.count(&session.key).await?,
        None => 0,
    };

    Ok(Json(HomePage {
        account,
        cart_count,
        products: state.products.list().await?,
    }))
}

/// `GET /products`
pub async fn products(State(state): State<AppState>) -> AppResult<Json<Vec<Product>>> {
    Ok(Json(state.products.list().await?))
}

/// `GET /health`
pub async fn health() -> &'static str {
    "ok"
}
