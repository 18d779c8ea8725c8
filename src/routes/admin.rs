use crate::{AppState, handlers};
use axum::{
    Router,
    routing::{get, put},
};

/// Admin Router Module
///
/// CRUD over projects and read access to contact messages. Nested under `/api/admin`.
///
/// Access Control:
/// `create_router` wraps this router in a route layer that resolves the bearer token to an
/// `AdminIdentity` before any handler runs, and places that identity in the request
/// extensions.
pub fn admin_routes() -> Router<AppState> {
    Router::new()
        .route("/me", get(handlers::admin_me))
        .route(
            "/projects",
            get(handlers::admin_get_projects).post(handlers::admin_create_project),
        )
        .route(
            "/projects/{id}",
            put(handlers::admin_update_project).delete(handlers::admin_delete_project),
        )
        .route("/contact-messages", get(handlers::admin_get_contact_messages))
}
