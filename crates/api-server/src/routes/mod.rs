//! Route handlers

pub mod health;
pub mod task;

use axum::Router;

use crate::{middleware::request_logging, state::AppState};

/// Build the full application: every route, wrapped in request logging
pub fn app(state: AppState) -> Router {
    Router::new()
        .merge(health::router())
        .merge(task::router(&state))
        .with_state(state)
        .layer(request_logging())
}
