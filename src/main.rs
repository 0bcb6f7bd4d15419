use reddit_lite::config::Config;
use reddit_lite::database::{create_pool, run_migrations};
use reddit_lite::{AppState, create_app};
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load .env file
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "reddit_lite=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    let config = Config::from_env().expect("Failed to load configuration");
    tracing::info!("Configuration loaded successfully");

    // Create database connection pool
    let db = create_pool(&config.database_url).await?;
    tracing::info!("Database connection pool created");

    // Run migrations
    run_migrations(&db).await?;
    tracing::info!("Database migrations completed");

    // Create application state
    let state = AppState {
        db,
        config: Arc::new(config.clone()),
    };

    // Create application
    let app = create_app(state);

    // Create listener
    let listener = TcpListener::bind(format!("{}:{}", config.host, config.port)).await?;
    tracing::info!("Server listening on {}:{}", config.host, config.port);

    // Start server
    axum::serve(listener, app).await?;

    Ok(())
}
