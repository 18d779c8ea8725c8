use crate::models::{
    AdminIdentity, ContactMessage, Project, ProjectCategory, UpdateProjectRequest,
};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool, query_builder::QueryBuilder};
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::RwLock;
use uuid::Uuid;

/// RepositoryError
///
/// Store failures are surfaced as-is; nothing in this crate retries them.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// A uniqueness constraint rejected the write (e.g. a duplicate admin username).
    #[error("record already exists")]
    Conflict,
    /// A stored row did not map onto the typed record.
    #[error("invalid record: {0}")]
    InvalidRecord(String),
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("store unavailable: {0}")]
    Unavailable(String),
}

pub type RepoResult<T> = Result<T, RepositoryError>;

/// ProjectFilter
///
/// Optional narrowing for project listings. `None` fields do not filter.
#[derive(Debug, Clone, Default)]
pub struct ProjectFilter {
    pub category: Option<ProjectCategory>,
    pub featured: Option<bool>,
}

impl ProjectFilter {
    fn matches(&self, project: &Project) -> bool {
        self.category.is_none_or(|c| project.category == c)
            && self.featured.is_none_or(|f| project.featured == f)
    }
}

/// Repository Trait
///
/// The document-store contract consumed by the bootstrap initializer, the request guard
/// and the handlers. Reads issued after a write in the same task must observe that write.
///
/// **Send + Sync + async_trait** make `Arc<dyn Repository>` shareable across Axum tasks.
#[async_trait]
pub trait Repository: Send + Sync {
    // --- Admin identities ---
    async fn find_admin(&self, username: &str) -> RepoResult<Option<AdminIdentity>>;
    /// Fails with `Conflict` if the username is taken.
    async fn insert_admin(&self, admin: AdminIdentity) -> RepoResult<()>;

    // --- Projects ---
    async fn count_projects(&self) -> RepoResult<i64>;
    async fn insert_project(&self, project: Project) -> RepoResult<()>;
    /// Newest first.
    async fn list_projects(&self, filter: ProjectFilter) -> RepoResult<Vec<Project>>;
    async fn get_project(&self, id: Uuid) -> RepoResult<Option<Project>>;
    async fn update_project(
        &self,
        id: Uuid,
        req: UpdateProjectRequest,
    ) -> RepoResult<Option<Project>>;
    /// Returns true if a row was removed.
    async fn delete_project(&self, id: Uuid) -> RepoResult<bool>;

    // --- Contact messages ---
    async fn insert_contact_message(&self, message: ContactMessage) -> RepoResult<()>;
    /// Newest first.
    async fn list_contact_messages(&self) -> RepoResult<Vec<ContactMessage>>;
}

/// RepositoryState
///
/// The concrete type used to share the persistence layer across the application state.
pub type RepositoryState = Arc<dyn Repository>;

// --- Postgres ---

/// Raw `projects` row. `category` is validated when mapped into a [`Project`].
#[derive(Debug, FromRow)]
struct ProjectRow {
    id: Uuid,
    title: String,
    description: String,
    category: String,
    technologies: Vec<String>,
    image: String,
    demo_link: String,
    github_link: String,
    featured: bool,
    bg_color: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<ProjectRow> for Project {
    type Error = RepositoryError;

    fn try_from(row: ProjectRow) -> Result<Self, Self::Error> {
        let category = ProjectCategory::parse(&row.category).ok_or_else(|| {
            RepositoryError::InvalidRecord(format!(
                "project {} has unknown category {:?}",
                row.id, row.category
            ))
        })?;

        Ok(Project {
            id: row.id,
            title: row.title,
            description: row.description,
            category,
            technologies: row.technologies,
            image: row.image,
            demo_link: row.demo_link,
            github_link: row.github_link,
            featured: row.featured,
            bg_color: row.bg_color,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

#[derive(Debug, FromRow)]
struct AdminRow {
    id: Uuid,
    username: String,
    password_hash: String,
    created_at: DateTime<Utc>,
}

impl TryFrom<AdminRow> for AdminIdentity {
    type Error = RepositoryError;

    fn try_from(row: AdminRow) -> Result<Self, Self::Error> {
        if row.password_hash.is_empty() {
            return Err(RepositoryError::InvalidRecord(format!(
                "admin {} has an empty password hash",
                row.username
            )));
        }
        Ok(AdminIdentity {
            id: row.id,
            username: row.username,
            password_hash: row.password_hash,
            created_at: row.created_at,
        })
    }
}

#[derive(Debug, FromRow)]
struct ContactMessageRow {
    id: Uuid,
    name: String,
    email: String,
    message: String,
    created_at: DateTime<Utc>,
}

impl From<ContactMessageRow> for ContactMessage {
    fn from(row: ContactMessageRow) -> Self {
        ContactMessage {
            id: row.id,
            name: row.name,
            email: row.email,
            message: row.message,
            created_at: row.created_at,
        }
    }
}

const PROJECT_COLUMNS: &str = "id, title, description, category, technologies, image, \
     demo_link, github_link, featured, bg_color, created_at, updated_at";

/// Maps a unique-constraint violation onto `Conflict`; everything else passes through.
fn map_write_error(e: sqlx::Error) -> RepositoryError {
    match &e {
        sqlx::Error::Database(db) if db.is_unique_violation() => RepositoryError::Conflict,
        _ => RepositoryError::Database(e),
    }
}

fn into_projects(rows: Vec<ProjectRow>) -> RepoResult<Vec<Project>> {
    rows.into_iter().map(Project::try_from).collect()
}

/// PostgresRepository
///
/// The production implementation of the `Repository` trait. Queries are checked at
/// runtime, so the crate builds without a live database.
pub struct PostgresRepository {
    pool: PgPool,
}

impl PostgresRepository {
    /// Creates a new repository instance using the initialized connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Applies the bundled schema migrations.
    pub async fn migrate(&self) -> Result<(), sqlx::migrate::MigrateError> {
        sqlx::migrate!("./migrations").run(&self.pool).await
    }
}

#[async_trait]
impl Repository for PostgresRepository {
    async fn find_admin(&self, username: &str) -> RepoResult<Option<AdminIdentity>> {
        let row = sqlx::query_as::<_, AdminRow>(
            "SELECT id, username, password_hash, created_at FROM admin_users WHERE username = $1",
        )
        .bind(username)
        .fetch_optional(&self.pool)
        .await?;

        row.map(AdminIdentity::try_from).transpose()
    }

    /// insert_admin
    ///
    /// Plain INSERT with no `ON CONFLICT` clause. The `username` UNIQUE constraint is what
    /// serializes two instances bootstrapping at once; the loser gets `Conflict` back.
    async fn insert_admin(&self, admin: AdminIdentity) -> RepoResult<()> {
        sqlx::query(
            "INSERT INTO admin_users (id, username, password_hash, created_at) VALUES ($1, $2, $3, $4)",
        )
        .bind(admin.id)
        .bind(&admin.username)
        .bind(&admin.password_hash)
        .bind(admin.created_at)
        .execute(&self.pool)
        .await
        .map_err(map_write_error)?;
        Ok(())
    }

    async fn count_projects(&self) -> RepoResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM projects")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }

    /// insert_project
    ///
    /// The category is stored as its wire label, which `ProjectRow` parses back on read.
    async fn insert_project(&self, project: Project) -> RepoResult<()> {
        sqlx::query(
            r#"
            INSERT INTO projects (
                id, title, description, category, technologies, image,
                demo_link, github_link, featured, bg_color, created_at, updated_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
            "#,
        )
        .bind(project.id)
        .bind(&project.title)
        .bind(&project.description)
        .bind(project.category.as_str())
        .bind(&project.technologies)
        .bind(&project.image)
        .bind(&project.demo_link)
        .bind(&project.github_link)
        .bind(project.featured)
        .bind(&project.bg_color)
        .bind(project.created_at)
        .bind(project.updated_at)
        .execute(&self.pool)
        .await
        .map_err(map_write_error)?;
        Ok(())
    }

    /// list_projects
    ///
    /// Builds the filter with QueryBuilder so every value is a bound parameter.
    async fn list_projects(&self, filter: ProjectFilter) -> RepoResult<Vec<Project>> {
        let mut builder: QueryBuilder<sqlx::Postgres> =
            QueryBuilder::new(format!("SELECT {PROJECT_COLUMNS} FROM projects WHERE TRUE"));

        if let Some(category) = filter.category {
            builder.push(" AND category = ");
            builder.push_bind(category.as_str());
        }
        if let Some(featured) = filter.featured {
            builder.push(" AND featured = ");
            builder.push_bind(featured);
        }
        builder.push(" ORDER BY created_at DESC");

        let rows = builder
            .build_query_as::<ProjectRow>()
            .fetch_all(&self.pool)
            .await?;
        into_projects(rows)
    }

    async fn get_project(&self, id: Uuid) -> RepoResult<Option<Project>> {
        let row = sqlx::query_as::<_, ProjectRow>(&format!(
            "SELECT {PROJECT_COLUMNS} FROM projects WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(Project::try_from).transpose()
    }

    /// update_project
    ///
    /// `COALESCE` keeps the stored value for every field the request leaves as `None`.
    async fn update_project(
        &self,
        id: Uuid,
        req: UpdateProjectRequest,
    ) -> RepoResult<Option<Project>> {
        let row = sqlx::query_as::<_, ProjectRow>(&format!(
            r#"
            UPDATE projects
            SET title = COALESCE($2, title),
                description = COALESCE($3, description),
                category = COALESCE($4, category),
                technologies = COALESCE($5, technologies),
                image = COALESCE($6, image),
                demo_link = COALESCE($7, demo_link),
                github_link = COALESCE($8, github_link),
                featured = COALESCE($9, featured),
                updated_at = NOW()
            WHERE id = $1
            RETURNING {PROJECT_COLUMNS}
            "#
        ))
        .bind(id)
        .bind(req.title)
        .bind(req.description)
        .bind(req.category.map(|c| c.as_str()))
        .bind(req.technologies)
        .bind(req.image)
        .bind(req.demo_link)
        .bind(req.github_link)
        .bind(req.featured)
        .fetch_optional(&self.pool)
        .await?;

        row.map(Project::try_from).transpose()
    }

    async fn delete_project(&self, id: Uuid) -> RepoResult<bool> {
        let result = sqlx::query("DELETE FROM projects WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn insert_contact_message(&self, message: ContactMessage) -> RepoResult<()> {
        sqlx::query(
            "INSERT INTO contact_messages (id, name, email, message, created_at) VALUES ($1, $2, $3, $4, $5)",
        )
        .bind(message.id)
        .bind(&message.name)
        .bind(&message.email)
        .bind(&message.message)
        .bind(message.created_at)
        .execute(&self.pool)
        .await
        .map_err(map_write_error)?;
        Ok(())
    }

    async fn list_contact_messages(&self) -> RepoResult<Vec<ContactMessage>> {
        let rows = sqlx::query_as::<_, ContactMessageRow>(
            "SELECT id, name, email, message, created_at FROM contact_messages ORDER BY created_at DESC",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.into_iter().map(ContactMessage::from).collect())
    }
}

// --- In-memory ---

#[derive(Default)]
struct Collections {
    admins: Vec<AdminIdentity>,
    projects: Vec<Project>,
    contact_messages: Vec<ContactMessage>,
}

/// InMemoryRepository
///
/// A process-local store with the same uniqueness rules as the Postgres schema.
/// Used by the test suite; the failure switches let tests simulate a broken backend.
#[derive(Default)]
pub struct InMemoryRepository {
    data: RwLock<Collections>,
    /// When set, `insert_project` fails once this many projects have been inserted.
    fail_project_inserts_after: Option<usize>,
    /// When true, admin lookups fail.
    fail_admin_lookups: bool,
    /// When true, admin lookups report nothing while inserts still enforce uniqueness.
    /// Models a second instance inserting between our lookup and our insert.
    stale_admin_lookups: bool,
}

impl InMemoryRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// A store whose project inserts start failing after `n` successful ones.
    pub fn failing_project_inserts_after(n: usize) -> Self {
        Self {
            fail_project_inserts_after: Some(n),
            ..Self::default()
        }
    }

    /// A store whose admin lookups always fail.
    pub fn failing_admin_lookups() -> Self {
        Self {
            fail_admin_lookups: true,
            ..Self::default()
        }
    }

    /// A store whose admin lookups always miss, as if read before a concurrent insert.
    pub fn with_stale_admin_lookups() -> Self {
        Self {
            stale_admin_lookups: true,
            ..Self::default()
        }
    }

    /// Removes an admin account. Returns true if one was removed.
    pub async fn remove_admin(&self, username: &str) -> bool {
        let mut data = self.data.write().await;
        let before = data.admins.len();
        data.admins.retain(|a| a.username != username);
        data.admins.len() != before
    }

    /// Number of stored admin accounts with `username`.
    pub async fn admin_count(&self, username: &str) -> usize {
        let data = self.data.read().await;
        data.admins.iter().filter(|a| a.username == username).count()
    }
}

#[async_trait]
impl Repository for InMemoryRepository {
    async fn find_admin(&self, username: &str) -> RepoResult<Option<AdminIdentity>> {
        if self.fail_admin_lookups {
            return Err(RepositoryError::Unavailable("admin lookup disabled".to_string()));
        }
        if self.stale_admin_lookups {
            return Ok(None);
        }
        let data = self.data.read().await;
        Ok(data.admins.iter().find(|a| a.username == username).cloned())
    }

    async fn insert_admin(&self, admin: AdminIdentity) -> RepoResult<()> {
        let mut data = self.data.write().await;
        if data.admins.iter().any(|a| a.username == admin.username) {
            return Err(RepositoryError::Conflict);
        }
        data.admins.push(admin);
        Ok(())
    }

    async fn count_projects(&self) -> RepoResult<i64> {
        let data = self.data.read().await;
        Ok(data.projects.len() as i64)
    }

    async fn insert_project(&self, project: Project) -> RepoResult<()> {
        let mut data = self.data.write().await;
        if let Some(limit) = self.fail_project_inserts_after {
            if data.projects.len() >= limit {
                return Err(RepositoryError::Unavailable("project insert rejected".to_string()));
            }
        }
        if data.projects.iter().any(|p| p.id == project.id) {
            return Err(RepositoryError::Conflict);
        }
        data.projects.push(project);
        Ok(())
    }

    async fn list_projects(&self, filter: ProjectFilter) -> RepoResult<Vec<Project>> {
        let data = self.data.read().await;
        let mut projects: Vec<Project> = data
            .projects
            .iter()
            .filter(|p| filter.matches(p))
            .cloned()
            .collect();
        projects.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(projects)
    }

    async fn get_project(&self, id: Uuid) -> RepoResult<Option<Project>> {
        let data = self.data.read().await;
        Ok(data.projects.iter().find(|p| p.id == id).cloned())
    }

    async fn update_project(
        &self,
        id: Uuid,
        req: UpdateProjectRequest,
    ) -> RepoResult<Option<Project>> {
        let mut data = self.data.write().await;
        match data.projects.iter_mut().find(|p| p.id == id) {
            Some(project) => {
                req.apply_to(project);
                Ok(Some(project.clone()))
            }
            None => Ok(None),
        }
    }

    async fn delete_project(&self, id: Uuid) -> RepoResult<bool> {
        let mut data = self.data.write().await;
        let before = data.projects.len();
        data.projects.retain(|p| p.id != id);
        Ok(data.projects.len() != before)
    }

    async fn insert_contact_message(&self, message: ContactMessage) -> RepoResult<()> {
        let mut data = self.data.write().await;
        data.contact_messages.push(message);
        Ok(())
    }

    async fn list_contact_messages(&self) -> RepoResult<Vec<ContactMessage>> {
        let data = self.data.read().await;
        let mut messages = data.contact_messages.clone();
        messages.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(messages)
    }
}
