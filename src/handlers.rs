use crate::{
    AppState,
    error::ApiError,
    models::{
        AdminIdentity, AdminLoginRequest, AdminLoginResponse, ApiInfo, ContactMessage,
        CreateContactMessageRequest, CreateProjectRequest, MessageResponse, Project,
        ProjectCategory, UpdateProjectRequest,
    },
    repository::ProjectFilter,
};
use axum::{
    Extension, Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use serde::Deserialize;
use uuid::Uuid;

// --- Filter Structs ---

/// ProjectQuery
///
/// Query parameters for GET /api/projects.
#[derive(Debug, Default, Deserialize, utoipa::IntoParams)]
pub struct ProjectQuery {
    /// Category label. `الكل` (all) or absent disables the category filter.
    pub category: Option<String>,
    /// Restrict to featured (or non-featured) projects.
    pub featured: Option<bool>,
}

// --- Public Handlers ---

#[utoipa::path(
    get,
    path = "/api/",
    responses((status = 200, description = "API banner", body = ApiInfo))
)]
pub async fn api_info() -> Json<ApiInfo> {
    Json(ApiInfo {
        message: "Sabrah Soft Portfolio API".to_string(),
        version: "1.0.0".to_string(),
    })
}

/// get_projects
///
/// [Public Route] Lists projects newest first. An unknown category label matches nothing.
#[utoipa::path(
    get,
    path = "/api/projects",
    params(ProjectQuery),
    responses((status = 200, description = "Filtered projects", body = [Project]))
)]
pub async fn get_projects(
    State(state): State<AppState>,
    Query(query): Query<ProjectQuery>,
) -> Result<Json<Vec<Project>>, ApiError> {
    let category = match query.category.as_deref() {
        None | Some(ProjectCategory::ALL_LABEL) | Some("") => None,
        Some(label) => match ProjectCategory::parse(label) {
            Some(category) => Some(category),
            None => return Ok(Json(vec![])),
        },
    };

    let projects = state
        .repo
        .list_projects(ProjectFilter {
            category,
            featured: query.featured,
        })
        .await?;
    Ok(Json(projects))
}

#[utoipa::path(
    get,
    path = "/api/projects/featured",
    responses((status = 200, description = "Featured projects", body = [Project]))
)]
pub async fn get_featured_projects(
    State(state): State<AppState>,
) -> Result<Json<Vec<Project>>, ApiError> {
    let projects = state
        .repo
        .list_projects(ProjectFilter {
            category: None,
            featured: Some(true),
        })
        .await?;
    Ok(Json(projects))
}

#[utoipa::path(
    get,
    path = "/api/projects/{id}",
    params(("id" = Uuid, Path, description = "Project ID")),
    responses(
        (status = 200, description = "Found", body = Project),
        (status = 404, description = "Not Found")
    )
)]
pub async fn get_project(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Project>, ApiError> {
    state
        .repo
        .get_project(id)
        .await?
        .map(Json)
        .ok_or(ApiError::NotFound)
}

/// send_contact_message
///
/// [Public Route] Stores a message from the contact form.
#[utoipa::path(
    post,
    path = "/api/contact",
    request_body = CreateContactMessageRequest,
    responses(
        (status = 200, description = "Stored", body = MessageResponse),
        (status = 422, description = "Invalid payload")
    )
)]
pub async fn send_contact_message(
    State(state): State<AppState>,
    Json(payload): Json<CreateContactMessageRequest>,
) -> Result<Json<MessageResponse>, ApiError> {
    payload.validate().map_err(ApiError::Validation)?;
    state
        .repo
        .insert_contact_message(payload.into_message())
        .await?;

    Ok(Json(MessageResponse {
        message: "تم إرسال رسالتك بنجاح! سنتواصل معك قريباً.".to_string(),
    }))
}

/// admin_login
///
/// [Public Route] Exchanges the admin credential for a bearer token. Unknown usernames and
/// wrong passwords produce the same response. bcrypt runs on the blocking pool.
#[utoipa::path(
    post,
    path = "/api/admin/login",
    request_body = AdminLoginRequest,
    responses(
        (status = 200, description = "Token issued", body = AdminLoginResponse),
        (status = 401, description = "Invalid credentials")
    )
)]
pub async fn admin_login(
    State(state): State<AppState>,
    Json(payload): Json<AdminLoginRequest>,
) -> Result<Json<AdminLoginResponse>, ApiError> {
    let admin = state.repo.find_admin(&payload.username).await?;

    // Unknown usernames still pay for a bcrypt round so timing matches a wrong password.
    let hasher = state.hasher;
    let password_hash = admin.as_ref().map(|a| a.password_hash.clone());
    let verified = tokio::task::spawn_blocking(move || match password_hash {
        Some(hash) => hasher.verify(&payload.password, &hash),
        None => hasher.verify_missing(&payload.password),
    })
    .await
    .map_err(|e| ApiError::Internal(format!("password verification panicked: {e}")))?;

    let admin = match admin {
        Some(admin) if verified => admin,
        Some(admin) => {
            tracing::info!("failed login for admin {}", admin.username);
            return Err(ApiError::InvalidCredentials);
        }
        None => {
            tracing::info!("login attempt for unknown admin");
            return Err(ApiError::InvalidCredentials);
        }
    };

    let access_token = state
        .tokens
        .issue_default(&admin.username)
        .map_err(|e| ApiError::Internal(e.to_string()))?;

    tracing::info!("admin {} logged in", admin.username);
    Ok(Json(AdminLoginResponse {
        access_token,
        token_type: "bearer".to_string(),
        expires_in: state.tokens.ttl().num_seconds(),
    }))
}

// --- Admin Handlers ---
// Reachable only through the admin router, whose middleware resolves the caller first.

#[utoipa::path(
    get,
    path = "/api/admin/me",
    responses(
        (status = 200, description = "Current admin", body = AdminIdentity),
        (status = 401, description = "Unauthorized")
    )
)]
pub async fn admin_me(Extension(admin): Extension<AdminIdentity>) -> Json<AdminIdentity> {
    Json(admin)
}

#[utoipa::path(
    get,
    path = "/api/admin/projects",
    responses((status = 200, description = "All projects", body = [Project]))
)]
pub async fn admin_get_projects(
    State(state): State<AppState>,
) -> Result<Json<Vec<Project>>, ApiError> {
    Ok(Json(state.repo.list_projects(ProjectFilter::default()).await?))
}

#[utoipa::path(
    post,
    path = "/api/admin/projects",
    request_body = CreateProjectRequest,
    responses((status = 201, description = "Created", body = Project))
)]
pub async fn admin_create_project(
    State(state): State<AppState>,
    Json(payload): Json<CreateProjectRequest>,
) -> Result<(StatusCode, Json<Project>), ApiError> {
    if payload.title.trim().is_empty() {
        return Err(ApiError::Validation("title must not be empty".to_string()));
    }
    let project = Project::from_request(payload);
    state.repo.insert_project(project.clone()).await?;
    tracing::info!("created project {}", project.id);
    Ok((StatusCode::CREATED, Json(project)))
}

#[utoipa::path(
    put,
    path = "/api/admin/projects/{id}",
    params(("id" = Uuid, Path, description = "Project ID")),
    request_body = UpdateProjectRequest,
    responses(
        (status = 200, description = "Updated", body = Project),
        (status = 404, description = "Not Found")
    )
)]
pub async fn admin_update_project(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateProjectRequest>,
) -> Result<Json<Project>, ApiError> {
    state
        .repo
        .update_project(id, payload)
        .await?
        .map(Json)
        .ok_or(ApiError::NotFound)
}

#[utoipa::path(
    delete,
    path = "/api/admin/projects/{id}",
    params(("id" = Uuid, Path, description = "Project ID")),
    responses(
        (status = 200, description = "Deleted", body = MessageResponse),
        (status = 404, description = "Not Found")
    )
)]
pub async fn admin_delete_project(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<MessageResponse>, ApiError> {
    if !state.repo.delete_project(id).await? {
        return Err(ApiError::NotFound);
    }
    tracing::info!("deleted project {}", id);
    Ok(Json(MessageResponse {
        message: "تم حذف المشروع بنجاح".to_string(),
    }))
}

#[utoipa::path(
    get,
    path = "/api/admin/contact-messages",
    responses((status = 200, description = "Contact messages", body = [ContactMessage]))
)]
pub async fn admin_get_contact_messages(
    State(state): State<AppState>,
) -> Result<Json<Vec<ContactMessage>>, ApiError> {
    Ok(Json(state.repo.list_contact_messages().await?))
}
