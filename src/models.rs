use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;
use utoipa::ToSchema;
use uuid::Uuid;

// --- Core Records ---

/// AdminIdentity
///
/// The single privilege tier of the system. Created once by the bootstrap initializer,
/// never updated. The hash is never serialized back to clients.
#[derive(Debug, Clone, PartialEq, Serialize, TS, ToSchema)]
#[ts(export)]
pub struct AdminIdentity {
    pub id: Uuid,
    pub username: String,
    #[serde(skip)]
    pub password_hash: String,
    #[ts(type = "string")]
    pub created_at: DateTime<Utc>,
}

impl AdminIdentity {
    pub fn new(username: impl Into<String>, password_hash: String) -> Self {
        Self {
            id: Uuid::new_v4(),
            username: username.into(),
            password_hash,
            created_at: Utc::now(),
        }
    }
}

/// ProjectCategory
///
/// Closed set of portfolio categories. The wire values are the labels the frontend renders.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub enum ProjectCategory {
    #[serde(rename = "نظام ويب")]
    WebSystem,
    #[serde(rename = "تطبيق أندرويد")]
    AndroidApp,
}

impl ProjectCategory {
    /// Filter value meaning "every category".
    pub const ALL_LABEL: &'static str = "الكل";

    pub fn as_str(&self) -> &'static str {
        match self {
            ProjectCategory::WebSystem => "نظام ويب",
            ProjectCategory::AndroidApp => "تطبيق أندرويد",
        }
    }

    pub fn parse(label: &str) -> Option<Self> {
        match label {
            "نظام ويب" => Some(ProjectCategory::WebSystem),
            "تطبيق أندرويد" => Some(ProjectCategory::AndroidApp),
            _ => None,
        }
    }
}

/// Project
///
/// A portfolio entry. `bg_color` is the accent color assigned at creation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct Project {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub category: ProjectCategory,
    pub technologies: Vec<String>,
    pub image: String,
    #[serde(rename = "demoLink")]
    pub demo_link: String,
    #[serde(rename = "githubLink")]
    pub github_link: String,
    pub featured: bool,
    pub bg_color: String,
    #[ts(type = "string")]
    pub created_at: DateTime<Utc>,
    #[ts(type = "string")]
    pub updated_at: DateTime<Utc>,
}

impl Project {
    /// Stamps a fresh identifier, accent color and creation/update timestamps.
    pub fn from_request(req: CreateProjectRequest) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            title: req.title,
            description: req.description,
            category: req.category,
            technologies: req.technologies,
            image: req.image,
            demo_link: req.demo_link,
            github_link: req.github_link,
            featured: req.featured,
            bg_color: accent_color(),
            created_at: now,
            updated_at: now,
        }
    }
}

/// `#` followed by six hex digits taken from a fresh UUIDv4.
pub fn accent_color() -> String {
    let hex = Uuid::new_v4().simple().to_string();
    format!("#{}", &hex[..6])
}

/// ContactMessage
///
/// A message left through the public contact form.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct ContactMessage {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub message: String,
    #[ts(type = "string")]
    pub created_at: DateTime<Utc>,
}

// --- Request Payloads ---

/// CreateProjectRequest
///
/// Input payload for POST /admin/projects and the sample dataset.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct CreateProjectRequest {
    pub title: String,
    pub description: String,
    pub category: ProjectCategory,
    pub technologies: Vec<String>,
    pub image: String,
    #[serde(rename = "demoLink")]
    pub demo_link: String,
    #[serde(rename = "githubLink")]
    pub github_link: String,
    #[serde(default)]
    pub featured: bool,
}

/// UpdateProjectRequest
///
/// Partial update payload for PUT /admin/projects/{id}. Only `Some` fields are written.
#[derive(Debug, Clone, Default, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct UpdateProjectRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<ProjectCategory>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub technologies: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    #[serde(rename = "demoLink", skip_serializing_if = "Option::is_none")]
    pub demo_link: Option<String>,
    #[serde(rename = "githubLink", skip_serializing_if = "Option::is_none")]
    pub github_link: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub featured: Option<bool>,
}

impl UpdateProjectRequest {
    /// Applies the provided fields to `project` and bumps `updated_at`.
    pub fn apply_to(self, project: &mut Project) {
        if let Some(title) = self.title {
            project.title = title;
        }
        if let Some(description) = self.description {
            project.description = description;
        }
        if let Some(category) = self.category {
            project.category = category;
        }
        if let Some(technologies) = self.technologies {
            project.technologies = technologies;
        }
        if let Some(image) = self.image {
            project.image = image;
        }
        if let Some(demo_link) = self.demo_link {
            project.demo_link = demo_link;
        }
        if let Some(github_link) = self.github_link {
            project.github_link = github_link;
        }
        if let Some(featured) = self.featured {
            project.featured = featured;
        }
        project.updated_at = Utc::now();
    }
}

/// CreateContactMessageRequest
///
/// Input payload for POST /contact.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct CreateContactMessageRequest {
    pub name: String,
    pub email: String,
    pub message: String,
}

impl CreateContactMessageRequest {
    /// Rejects blank fields and addresses without an `@`.
    pub fn validate(&self) -> Result<(), String> {
        if self.name.trim().is_empty() {
            return Err("name must not be empty".to_string());
        }
        if self.message.trim().is_empty() {
            return Err("message must not be empty".to_string());
        }
        let email = self.email.trim();
        if email.is_empty() || !email.contains('@') {
            return Err("email is not a valid address".to_string());
        }
        Ok(())
    }

    pub fn into_message(self) -> ContactMessage {
        ContactMessage {
            id: Uuid::new_v4(),
            name: self.name.trim().to_string(),
            email: self.email.trim().to_string(),
            message: self.message,
            created_at: Utc::now(),
        }
    }
}

/// AdminLoginRequest
///
/// Input payload for POST /admin/login.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct AdminLoginRequest {
    pub username: String,
    pub password: String,
}

// --- Response Payloads ---

/// AdminLoginResponse
///
/// Issued bearer token. `expires_in` is in seconds.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct AdminLoginResponse {
    pub access_token: String,
    pub token_type: String,
    pub expires_in: i64,
}

/// MessageResponse
///
/// Plain acknowledgement body.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct MessageResponse {
    pub message: String,
}

/// ApiInfo
///
/// Body of GET /api/.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ApiInfo {
    pub message: String,
    pub version: String,
}
