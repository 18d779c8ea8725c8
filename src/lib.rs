use axum::{
    Router,
    extract::{FromRef, Request},
    http::HeaderName,
    middleware::{self, Next},
    response::Response,
};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use tower::ServiceBuilder;
use tower_http::{
    cors::{Any, CorsLayer},
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    trace::{DefaultOnResponse, TraceLayer},
};
use tracing::{Level, Span};

// --- Module Structure ---

pub mod auth;
pub mod bootstrap;
pub mod config;
pub mod error;
pub mod handlers;
pub mod models;
pub mod repository;

// Routing segregated by access level (Public, Admin).
pub mod routes;
use auth::{AuthAdmin, AuthGuard, PasswordHasher, TokenService};
use routes::{admin, public};

// --- Public Re-exports ---

pub use config::AppConfig;
pub use error::ApiError;
pub use repository::{InMemoryRepository, PostgresRepository, RepositoryState};

/// ApiDoc
///
/// OpenAPI document served at `/api-docs/openapi.json` and rendered by Swagger UI.
#[derive(OpenApi)]
#[openapi(
    paths(
        handlers::api_info, handlers::get_projects, handlers::get_featured_projects,
        handlers::get_project, handlers::send_contact_message, handlers::admin_login,
        handlers::admin_me, handlers::admin_get_projects, handlers::admin_create_project,
        handlers::admin_update_project, handlers::admin_delete_project,
        handlers::admin_get_contact_messages
    ),
    components(
        schemas(
            models::Project, models::ProjectCategory, models::CreateProjectRequest,
            models::UpdateProjectRequest, models::ContactMessage,
            models::CreateContactMessageRequest, models::AdminLoginRequest,
            models::AdminLoginResponse, models::AdminIdentity, models::MessageResponse,
            models::ApiInfo,
        )
    ),
    tags(
        (name = "portfolio", description = "Portfolio site API")
    )
)]
struct ApiDoc;

/// AppState
///
/// The single, immutable container of shared services. Built once in `main` after
/// configuration and bootstrap, then cloned into every request.
#[derive(Clone)]
pub struct AppState {
    /// Document store handle.
    pub repo: RepositoryState,
    /// Signs and verifies admin tokens with the process-wide secret.
    pub tokens: TokenService,
    pub hasher: PasswordHasher,
    pub config: AppConfig,
}

impl AppState {
    /// Assembles the state, deriving the token service from `config`.
    pub fn new(repo: RepositoryState, config: AppConfig, hasher: PasswordHasher) -> Self {
        Self {
            tokens: TokenService::from_config(&config),
            repo,
            hasher,
            config,
        }
    }
}

// --- Axum FromRef Extractor Implementations ---

impl FromRef<AppState> for RepositoryState {
    fn from_ref(app_state: &AppState) -> RepositoryState {
        app_state.repo.clone()
    }
}

impl FromRef<AppState> for AppConfig {
    fn from_ref(app_state: &AppState) -> AppConfig {
        app_state.config.clone()
    }
}

impl FromRef<AppState> for TokenService {
    fn from_ref(app_state: &AppState) -> TokenService {
        app_state.tokens.clone()
    }
}

impl FromRef<AppState> for AuthGuard {
    fn from_ref(app_state: &AppState) -> AuthGuard {
        AuthGuard::new(app_state.tokens.clone(), app_state.repo.clone())
    }
}

/// require_admin
///
/// Route layer for the admin router. `AuthAdmin` rejects with 401 before the handler runs;
/// on success the identity is stored in the request extensions.
async fn require_admin(
    AuthAdmin(admin): AuthAdmin,
    mut request: Request,
    next: Next,
) -> Response {
    request.extensions_mut().insert(admin);
    next.run(request).await
}

/// create_router
///
/// Builds the full HTTP surface: the OpenAPI docs, the anonymous routes and the admin
/// routes behind the guard, then wraps everything in the observability and CORS layers.
/// Every route shares the one `AppState`.
pub fn create_router(state: AppState) -> Router {
    // 1. CORS: the portfolio frontend is served from a different origin.
    let cors = CorsLayer::new()
        .allow_methods(Any)
        .allow_origin(Any)
        .allow_headers(Any);

    // Correlation header shared by the request-id layers and the span logger.
    let x_request_id = HeaderName::from_static("x-request-id");

    // 2. Routes
    let base_router = Router::new()
        // Swagger UI over the generated OpenAPI document.
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        // Listings, contact form and login. No credentials required.
        .merge(public::public_routes())
        // Admin CRUD under /api/admin. `require_admin` runs as a route layer, so it only
        // guards routes that matched and unknown paths still fall through to 404.
        .nest(
            "/api/admin",
            admin::admin_routes().route_layer(middleware::from_fn_with_state(
                state.clone(),
                require_admin,
            )),
        )
        .with_state(state);

    // 3. Observability, outermost so every response is traced with its request id.
    base_router
        .layer(
            ServiceBuilder::new()
                // 3a. Assign a UUID to requests that arrive without an x-request-id.
                .layer(SetRequestIdLayer::new(x_request_id.clone(), MakeRequestUuid))
                // 3b. One span per request; the response is logged at INFO with latency in ms.
                .layer(
                    TraceLayer::new_for_http()
                        .make_span_with(trace_span_logger)
                        .on_response(
                            DefaultOnResponse::new()
                                .level(Level::INFO)
                                .latency_unit(tower_http::LatencyUnit::Millis),
                        ),
                )
                // 3c. Echo the request id back so clients can quote it in bug reports.
                .layer(PropagateRequestIdLayer::new(x_request_id)),
        )
        // 4. CORS last, so preflight requests are answered before routing.
        .layer(cors)
}

/// trace_span_logger
///
/// Span factory for `TraceLayer`. Records the method, the URI and the `x-request-id` set
/// by `SetRequestIdLayer`, so every log line emitted while handling a request (guard
/// rejections, store errors, login attempts) can be tied back to it.
fn trace_span_logger(request: &axum::http::Request<axum::body::Body>) -> Span {
    let request_id = request
        .headers()
        .get("x-request-id")
        .and_then(|value| value.to_str().ok())
        .unwrap_or("unknown");

    tracing::info_span!(
        "http_request",
        method = ?request.method(),
        uri = ?request.uri(),
        req_id = %request_id,
    )
}
