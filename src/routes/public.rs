use crate::{AppState, handlers};
use axum::{
    Router,
    routing::{get, post},
};

/// Public Router Module
///
/// Endpoints that need no credentials. Login lives here because it is how a client
/// obtains one.
pub fn public_routes() -> Router<AppState> {
    Router::new()
        // GET /health
        // Liveness probe for load balancers.
        .route("/health", get(|| async { "ok" }))
        .route("/api", get(handlers::api_info))
        .route("/api/", get(handlers::api_info))
        // GET /api/projects?category=...&featured=...
        .route("/api/projects", get(handlers::get_projects))
        .route("/api/projects/featured", get(handlers::get_featured_projects))
        .route("/api/projects/{id}", get(handlers::get_project))
        // POST /api/contact
        .route("/api/contact", post(handlers::send_contact_message))
        // POST /api/admin/login
        // Exchanges the admin credential for a bearer token.
        .route("/api/admin/login", post(handlers::admin_login))
}
