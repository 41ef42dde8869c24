//! HTTP routes.

mod cart;
mod home;
mod sessions;
mod users;

use axum::Router;
use axum::middleware;
use axum::routing::{get, post};
use tower_http::trace::TraceLayer;

use crate::session::load_session;
use crate::state::AppState;

/// Build the application router.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(home::index))
        .route("/health", get(home::health))
        .route("/products", get(home::products))
        .route("/me", get(users::me))
        .route("/users", post(users::create))
        .route("/login", get(sessions::new).post(sessions::create))
        .route("/logout", get(sessions::destroy).post(sessions::destroy))
        .route("/cart", get(cart::show))
        .route(
            "/cart/items/{product_id}",
            post(cart::add_item).delete(cart::remove_item),
        )
        .layer(middleware::from_fn_with_state(state.clone(), load_session))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
