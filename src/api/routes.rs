//! Route configuration.

use crate::api::handlers;
use crate::state::AppState;
use axum::Router;
use axum::routing::get;
use std::sync::Arc;

/// Creates the API router.
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        // Health check
        .route("/health", get(handlers::health_check))
        // Bonds
        .route(
            "/api/v1/bonds",
            get(handlers::list_bonds).post(handlers::create_bond),
        )
        .route(
            "/api/v1/bonds/{isin}",
            get(handlers::get_bond)
                .patch(handlers::update_bond)
                .delete(handlers::delete_bond),
        )
        // Statistics
        .route(
            "/api/v1/bonds/user/{user_id}",
            get(handlers::get_user_statistics),
        )
        .with_state(state)
}
