//! services/bot/src/bin/bot.rs

use async_openai::{config::OpenAIConfig, Client};
use axum::{
    http::{header::CONTENT_TYPE, HeaderName, Method},
    Router,
};
use bot_lib::{
    adapters::{DbAdapter, InMemoryDb, OpenAiInterpreterAdapter},
    config::{Config, StorageBackend},
    error::ApiError,
    web::{self, middleware::ADMIN_TOKEN_HEADER, rest::ApiDoc, state::AppState},
};
use sqlx::postgres::PgPoolOptions;
use std::sync::Arc;
use tarot_core::deck::{Catalog, Deck};
use tarot_core::ports::{DatabaseService, SystemClock};
use tower_http::cors::{Any, CorsLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

#[tokio::main]
async fn main() -> Result<(), ApiError> {
    // --- 1. Load Configuration & Set Up Logging ---
    let config = Arc::new(Config::from_env()?);
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(config.log_level.to_string()))
        .with(tracing_subscriber::fmt::layer())
        .init();
    info!("Configuration loaded. Starting server...");

    // --- 2. Load the Card Catalog ---
    let catalog = Catalog::embedded()?;
    info!(cards = catalog.len(), "Card catalog loaded.");
    let deck = Arc::new(Deck::from_os_rng(catalog));

    // --- 3. Connect Storage & Run Migrations ---
    let db: Arc<dyn DatabaseService> = match config.storage {
        StorageBackend::Postgres => {
            let database_url = config
                .database_url
                .as_deref()
                .ok_or_else(|| ApiError::Internal("DATABASE_URL is required".to_string()))?;
            info!("Connecting to database...");
            let db_pool = PgPoolOptions::new()
                .max_connections(config.database_max_connections)
                .connect(database_url)
                .await?;
            let db_adapter = DbAdapter::new(db_pool);
            info!("Running database migrations...");
            db_adapter.run_migrations().await?;
            info!("Database migrations complete.");
            Arc::new(db_adapter)
        }
        StorageBackend::Memory => {
            info!("Using in-memory storage; data is lost on restart.");
            Arc::new(InMemoryDb::new())
        }
    };

    // --- 4. Initialize the Interpretation Adapter ---
    let openai_config = OpenAIConfig::new().with_api_key(config.openai_api_key.clone());
    let openai_client = Client::with_config(openai_config);
    let interpreter = Arc::new(OpenAiInterpreterAdapter::new(
        openai_client,
        config.interpreter_model.clone(),
        config.generation_timeout,
    ));

    // --- 5. Build the Shared AppState ---
    let app_state = Arc::new(AppState::new(
        db,
        interpreter,
        deck,
        Arc::new(SystemClock),
        config.clone(),
    ));

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::OPTIONS])
        .allow_headers([CONTENT_TYPE, HeaderName::from_static(ADMIN_TOKEN_HEADER)]);

    // --- 6. Create the Web Router ---
    // Merge the API router with the Swagger UI router for a complete application.
    let app = Router::new()
        .merge(web::router(app_state))
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .layer(cors);

    // --- 7. Start the Server ---
    info!("Starting server on {}", config.bind_address);
    info!(
        "Swagger UI available at http://{}/swagger-ui",
        config.bind_address
    );
    let listener = tokio::net::TcpListener::bind(&config.bind_address).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped.");
    Ok(())
}

async fn shutdown_signal() {
    if tokio::signal::ctrl_c().await.is_ok() {
        info!("Shutdown signal received.");
    }
}
