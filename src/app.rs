use crate::handlers;
use crate::state::AppState;
use axum::{
    Router,
    routing::{get, post},
};

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(handlers::index))
        .route("/login", post(handlers::login))
        .route("/logout", post(handlers::logout))
        .route("/refresh", post(handlers::refresh))
        .route("/users/:username/add", post(handlers::add_points))
        .route("/users/:username/redeem", post(handlers::redeem_points))
        .route("/icons/:file", get(handlers::icon))
        .route("/api/state", get(handlers::get_state))
        .route("/api/adjust", post(handlers::adjust))
        .with_state(state)
}
