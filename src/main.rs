use portfolio_api::{
    AppState,
    auth::PasswordHasher,
    bootstrap,
    config::{AppConfig, DEFAULT_ADMIN_PASSWORD, Env},
    create_router,
    repository::{PostgresRepository, RepositoryState},
};
use sqlx::postgres::PgPoolOptions;
use std::{process::ExitCode, sync::Arc};
use tokio::net::TcpListener;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// main
///
/// Startup order: configuration, logging, database, migrations, bootstrap, HTTP server.
/// The server does not bind until bootstrap has completed successfully.
#[tokio::main]
async fn main() -> ExitCode {
    dotenv::dotenv().ok();

    // APP_ENV is read here too so logging is up before AppConfig::load() can warn.
    let production = std::env::var("APP_ENV").is_ok_and(|v| v == "production");

    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "portfolio_api=debug,tower_http=info".into());

    if production {
        // JSON lines for log aggregators.
        tracing_subscriber::registry()
            .with(env_filter)
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(tracing_subscriber::fmt::layer().pretty())
            .init();
    }

    let config = AppConfig::load();
    tracing::info!("Application starting in {:?} mode", config.env);
    if config.env == Env::Local && config.admin_password == DEFAULT_ADMIN_PASSWORD {
        tracing::warn!("Using the built-in default admin password; set ADMIN_PASSWORD.");
    }

    let pool = match PgPoolOptions::new()
        .max_connections(5)
        .connect(&config.db_url)
        .await
    {
        Ok(pool) => pool,
        Err(e) => {
            tracing::error!("FATAL: failed to connect to Postgres: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let postgres = PostgresRepository::new(pool);
    if let Err(e) = postgres.migrate().await {
        tracing::error!("FATAL: database migration failed: {}", e);
        return ExitCode::FAILURE;
    }
    let repo = Arc::new(postgres) as RepositoryState;

    let hasher = PasswordHasher::default();

    // Bootstrap must finish before the admin surface is reachable.
    if let Err(e) = bootstrap::run(
        repo.as_ref(),
        &hasher,
        &config.admin_username,
        &config.admin_password,
    )
    .await
    {
        tracing::error!("FATAL: bootstrap failed, refusing to serve: {}", e);
        return ExitCode::FAILURE;
    }

    let bind_addr = config.bind_addr.clone();
    let app = create_router(AppState::new(repo, config, hasher));

    let listener = match TcpListener::bind(&bind_addr).await {
        Ok(listener) => listener,
        Err(e) => {
            tracing::error!("FATAL: failed to bind {}: {}", bind_addr, e);
            return ExitCode::FAILURE;
        }
    };

    tracing::info!("Listening on {}", bind_addr);
    tracing::info!("API Documentation (Swagger UI) available at: http://{}/swagger-ui", bind_addr);

    if let Err(e) = axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
    {
        tracing::error!("server error: {}", e);
        return ExitCode::FAILURE;
    }

    tracing::info!("Shut down cleanly");
    ExitCode::SUCCESS
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("failed to listen for shutdown signal: {}", e);
    }
}
