//! Postgres-backed repository tests. Skipped unless TEST_DATABASE_URL points at a
//! disposable database.

use portfolio_api::{
    models::{AdminIdentity, CreateProjectRequest, Project, ProjectCategory, UpdateProjectRequest},
    repository::{PostgresRepository, ProjectFilter, Repository, RepositoryError},
};
use sqlx::PgPool;
use uuid::Uuid;

// --- Test Context and Setup ---

async fn setup() -> Option<PostgresRepository> {
    dotenv::dotenv().ok();

    let Ok(db_url) = std::env::var("TEST_DATABASE_URL") else {
        eprintln!("TEST_DATABASE_URL not set, skipping Postgres repository test");
        return None;
    };

    let pool = PgPool::connect(&db_url)
        .await
        .expect("Failed to connect to database for integration tests.");

    let repo = PostgresRepository::new(pool);
    repo.migrate()
        .await
        .expect("Failed to run database migrations.");
    Some(repo)
}

// --- Test Data Helpers ---

fn unique(prefix: &str) -> String {
    format!("{prefix}-{}", Uuid::new_v4().simple())
}

fn project(title: &str, category: ProjectCategory, featured: bool) -> Project {
    Project::from_request(CreateProjectRequest {
        title: title.to_string(),
        description: "integration".to_string(),
        category,
        technologies: vec!["Rust".to_string(), "SQL".to_string()],
        image: "/img.png".to_string(),
        demo_link: "#".to_string(),
        github_link: "#".to_string(),
        featured,
    })
}

// --- Admins ---

#[tokio::test]
async fn admin_round_trip_and_unique_username() {
    let Some(repo) = setup().await else { return };
    let username = unique("admin");

    let admin = AdminIdentity::new(username.clone(), "$2b$04$hash".to_string());
    repo.insert_admin(admin.clone()).await.unwrap();

    let found = repo.find_admin(&username).await.unwrap().unwrap();
    assert_eq!(found.id, admin.id);
    assert_eq!(found.password_hash, admin.password_hash);

    let duplicate = AdminIdentity::new(username.clone(), "$2b$04$other".to_string());
    let err = repo.insert_admin(duplicate).await.unwrap_err();
    assert!(matches!(err, RepositoryError::Conflict));

    assert!(repo.find_admin(&unique("missing")).await.unwrap().is_none());
}

// --- Projects ---

#[tokio::test]
async fn project_insert_get_and_filter() {
    let Some(repo) = setup().await else { return };
    let android = project(&unique("android"), ProjectCategory::AndroidApp, true);
    repo.insert_project(android.clone()).await.unwrap();

    let fetched = repo.get_project(android.id).await.unwrap().unwrap();
    assert_eq!(fetched.title, android.title);
    assert_eq!(fetched.category, ProjectCategory::AndroidApp);
    assert_eq!(fetched.technologies, android.technologies);
    assert_eq!(fetched.bg_color, android.bg_color);

    let featured_android = repo
        .list_projects(ProjectFilter {
            category: Some(ProjectCategory::AndroidApp),
            featured: Some(true),
        })
        .await
        .unwrap();
    assert!(featured_android.iter().any(|p| p.id == android.id));
    assert!(
        featured_android
            .iter()
            .all(|p| p.featured && p.category == ProjectCategory::AndroidApp)
    );

    let web = repo
        .list_projects(ProjectFilter {
            category: Some(ProjectCategory::WebSystem),
            featured: None,
        })
        .await
        .unwrap();
    assert!(web.iter().all(|p| p.id != android.id));

    assert!(repo.count_projects().await.unwrap() >= 1);
    repo.delete_project(android.id).await.unwrap();
}

#[tokio::test]
async fn partial_update_and_delete() {
    let Some(repo) = setup().await else { return };
    let original = project(&unique("web"), ProjectCategory::WebSystem, false);
    repo.insert_project(original.clone()).await.unwrap();

    let update = UpdateProjectRequest {
        featured: Some(true),
        description: Some("changed".to_string()),
        ..UpdateProjectRequest::default()
    };
    let updated = repo
        .update_project(original.id, update)
        .await
        .unwrap()
        .unwrap();

    assert!(updated.featured);
    assert_eq!(updated.description, "changed");
    assert_eq!(updated.title, original.title);
    assert_eq!(updated.technologies, original.technologies);
    assert!(updated.updated_at >= original.updated_at);

    assert!(repo.delete_project(original.id).await.unwrap());
    assert!(!repo.delete_project(original.id).await.unwrap());
    assert!(repo.get_project(original.id).await.unwrap().is_none());
    assert!(
        repo.update_project(original.id, UpdateProjectRequest::default())
            .await
            .unwrap()
            .is_none()
    );
}
