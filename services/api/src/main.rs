use anyhow::Result;
use common::{
    database::{self, DatabaseConfig},
    jwt::{JwtConfig, JwtService},
};
use tokio::net::TcpListener;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use recipe_api::{
    config::{ServerConfig, StorageBackend},
    routes,
    state::AppState,
    storage::MediaStorage,
};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,tower_http=debug")),
        )
        .init();

    info!("Starting recipe API service");

    let config = ServerConfig::from_env()?;

    // Initialize JWT service
    let jwt_service = JwtService::new(JwtConfig::from_env()?)?;

    tokio::fs::create_dir_all(&config.media_root).await?;
    let media = MediaStorage::new(
        config.media_root.clone(),
        &config.media_url,
        config.max_upload_bytes,
    );

    let app_state = match config.storage_backend {
        StorageBackend::Postgres => {
            // Initialize database connection pool
            let db_config = DatabaseConfig::from_env()?;
            let pool = database::init_pool(&db_config).await?;

            // Check database connectivity
            if database::health_check(&pool).await? {
                info!("Database connection successful");
            } else {
                anyhow::bail!("Failed to connect to database");
            }

            database::run_migrations(&pool).await?;
            AppState::postgres(pool, jwt_service, media)
        }
        StorageBackend::Memory => {
            warn!("Using the in-memory store, data is lost on shutdown");
            AppState::in_memory(jwt_service, media)
        }
    };

    info!("Recipe API service initialized successfully");

    // Start the web server
    let app = routes::create_router(app_state);

    let listener = TcpListener::bind(&config.bind_address).await?;
    info!("Recipe API service listening on {}", config.bind_address);

    axum::serve(listener, app).await?;

    Ok(())
}
