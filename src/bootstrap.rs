//! First-boot initialization: default admin account and sample projects.
//!
//! Both steps read current state before writing, so running them on every start is safe.
//! Two instances starting at once can still race: the admin insert is protected by the
//! unique username constraint, while the sample projects may be inserted twice.

use thiserror::Error;

use crate::{
    auth::{PasswordError, PasswordHasher},
    models::{AdminIdentity, CreateProjectRequest, Project, ProjectCategory},
    repository::{Repository, RepositoryError},
};

#[derive(Debug, Error)]
pub enum BootstrapError {
    #[error(transparent)]
    Hash(#[from] PasswordError),
    #[error(transparent)]
    Store(#[from] RepositoryError),
    /// Some sample inserts failed; the store is partially seeded.
    #[error("{failed} of {total} seed records could not be inserted")]
    Seed { failed: usize, total: usize },
}

/// What `ensure_default_admin` did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdminBootstrap {
    Created,
    AlreadyPresent,
    /// Another instance created the account between our lookup and insert.
    CreatedConcurrently,
}

/// Creates the admin account `username` unless it already exists.
pub async fn ensure_default_admin(
    repo: &dyn Repository,
    hasher: &PasswordHasher,
    username: &str,
    plaintext_password: &str,
) -> Result<AdminBootstrap, BootstrapError> {
    if repo.find_admin(username).await?.is_some() {
        tracing::debug!("admin user {} already exists, skipping creation", username);
        return Ok(AdminBootstrap::AlreadyPresent);
    }

    let password_hash = hasher.hash(plaintext_password)?;

    match repo.insert_admin(AdminIdentity::new(username, password_hash)).await {
        Ok(()) => {
            tracing::info!("created default admin user: username={}", username);
            Ok(AdminBootstrap::Created)
        }
        Err(RepositoryError::Conflict) => {
            tracing::warn!("admin user {} was created concurrently, skipping", username);
            Ok(AdminBootstrap::CreatedConcurrently)
        }
        Err(e) => {
            tracing::error!("failed to create default admin user: {}", e);
            Err(e.into())
        }
    }
}

/// ensure_seed_data
///
/// Inserts `records` only when the project collection is empty. Each record gets its own
/// identifier, accent color and timestamps. Every insert is attempted; if any fails the
/// whole call fails so startup can abort. Returns the number of records inserted.
pub async fn ensure_seed_data(
    repo: &dyn Repository,
    records: Vec<CreateProjectRequest>,
) -> Result<usize, BootstrapError> {
    let existing = repo.count_projects().await?;
    if existing != 0 {
        tracing::debug!("{} projects present, skipping sample data", existing);
        return Ok(0);
    }

    let total = records.len();
    let mut failed = 0;
    for record in records {
        let project = Project::from_request(record);
        let title = project.title.clone();
        if let Err(e) = repo.insert_project(project).await {
            tracing::error!("failed to insert sample project {:?}: {}", title, e);
            failed += 1;
        }
    }

    if failed > 0 {
        return Err(BootstrapError::Seed { failed, total });
    }

    tracing::info!("inserted {} sample projects", total);
    Ok(total)
}

/// The portfolio's initial showcase entries.
pub fn sample_projects() -> Vec<CreateProjectRequest> {
    fn stack(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    vec![
        CreateProjectRequest {
            title: "نظام إدارة المحتوى الذكي".to_string(),
            description: "نظام متكامل لإدارة المحتوى مع واجهة إدارة متقدمة وتحكم كامل في البيانات"
                .to_string(),
            category: ProjectCategory::WebSystem,
            technologies: stack(&["React", "Node.js", "MongoDB", "Express"]),
            image: "/api/placeholder/600/400".to_string(),
            demo_link: "#".to_string(),
            github_link: "#".to_string(),
            featured: true,
        },
        CreateProjectRequest {
            title: "تطبيق التجارة الإلكترونية".to_string(),
            description:
                "تطبيق أندرويد متكامل للتجارة الإلكترونية مع نظام دفع آمن وواجهة مستخدم سهلة"
                    .to_string(),
            category: ProjectCategory::AndroidApp,
            technologies: stack(&["Java", "Firebase", "SQLite", "Android Studio"]),
            image: "/api/placeholder/600/400".to_string(),
            demo_link: "#".to_string(),
            github_link: "#".to_string(),
            featured: true,
        },
        CreateProjectRequest {
            title: "منصة التعلم الإلكتروني".to_string(),
            description: "منصة تعليمية تفاعلية مع نظام إدارة الطلاب والمدرسين ومتابعة التقدم"
                .to_string(),
            category: ProjectCategory::WebSystem,
            technologies: stack(&["Vue.js", "Laravel", "MySQL", "WebRTC"]),
            image: "/api/placeholder/600/400".to_string(),
            demo_link: "#".to_string(),
            github_link: "#".to_string(),
            featured: false,
        },
    ]
}

/// Runs both bootstrap steps in order. Any error is fatal to startup.
pub async fn run(
    repo: &dyn Repository,
    hasher: &PasswordHasher,
    admin_username: &str,
    admin_password: &str,
) -> Result<(), BootstrapError> {
    ensure_default_admin(repo, hasher, admin_username, admin_password).await?;
    ensure_seed_data(repo, sample_projects()).await?;
    Ok(())
}
