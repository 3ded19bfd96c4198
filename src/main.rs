//! Bonds API Backend Server
//!
//! REST API server for managing user-owned bonds.

use bonds_api_backend::api::create_router;
use bonds_api_backend::config::Config;
use bonds_api_backend::db::{
    BondRepository, DatabasePool, InMemoryBondRepository, PgBondRepository,
};
use bonds_api_backend::registry::RegistryIsinVerifier;
use bonds_api_backend::state::AppState;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use bonds_api_backend::error::ErrorResponse;
use bonds_api_backend::frequency::PaymentFrequency;
use bonds_api_backend::models::{
    BondResponse, CreateBondRequest, DeleteBondResponse, HealthResponse, UpdateBondRequest,
    UserStatisticsResponse,
};

/// OpenAPI documentation.
#[derive(OpenApi)]
#[openapi(
    paths(
        bonds_api_backend::api::handlers::health_check,
        bonds_api_backend::api::handlers::list_bonds,
        bonds_api_backend::api::handlers::create_bond,
        bonds_api_backend::api::handlers::get_bond,
        bonds_api_backend::api::handlers::update_bond,
        bonds_api_backend::api::handlers::delete_bond,
        bonds_api_backend::api::handlers::get_user_statistics,
    ),
    components(
        schemas(
            HealthResponse,
            BondResponse,
            CreateBondRequest,
            UpdateBondRequest,
            DeleteBondResponse,
            UserStatisticsResponse,
            PaymentFrequency,
            ErrorResponse,
        )
    ),
    tags(
        (name = "Health", description = "Health check endpoints"),
        (name = "Bonds", description = "Bond management"),
        (name = "Statistics", description = "Per-user bond statistics"),
    ),
    info(
        title = "Bonds API",
        version = "0.1.0",
        description = "REST API for managing user-owned bonds",
        license(name = "MIT")
    )
)]
struct ApiDoc;

/// Loads the configuration file named by `BONDS_CONFIG` and applies
/// environment overrides.
fn load_config() -> anyhow::Result<Config> {
    let mut config = match std::env::var("BONDS_CONFIG") {
        Ok(path) => {
            info!("Loading configuration from {}", path);
            Config::load(&path)?
        }
        Err(_) => {
            warn!("BONDS_CONFIG not set, using default configuration");
            Config::default()
        }
    };

    if let Ok(host) = std::env::var("HOST") {
        config.server.host = host;
    }
    if let Ok(port) = std::env::var("PORT") {
        config.server.port = port.parse()?;
    }
    if let Ok(url) = std::env::var("DATABASE_URL") {
        config.database.url = Some(url);
    }
    if let Ok(url) = std::env::var("ISIN_REGISTRY_URL") {
        config.registry.base_url = url;
    }

    config.validate()?;
    Ok(config)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = load_config()?;

    // Storage backend
    let bonds: Arc<dyn BondRepository> = match &config.database.url {
        Some(url) => {
            let db = DatabasePool::connect(url, &config.database).await?;
            db.run_migrations().await?;
            Arc::new(PgBondRepository::new(db))
        }
        None => {
            warn!("No database configured, bonds are kept in memory");
            Arc::new(InMemoryBondRepository::new())
        }
    };

    let verifier = Arc::new(RegistryIsinVerifier::new(&config.registry)?);
    info!("ISIN registry at {}", config.registry.base_url);

    // Create application state
    let state = AppState::with_repository(bonds, verifier);
    for (user_id, key) in state.register_users(&config).await? {
        info!("Generated API key for user {}: {}", user_id, key);
    }
    let state = Arc::new(state);

    let host = &config.server.host;
    let port = config.server.port;

    info!("Starting Bonds API Backend on {}:{}", host, port);
    info!(
        "Swagger UI available at http://{}:{}/swagger-ui/",
        host, port
    );

    // Configure CORS
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    // Build the router
    let app = create_router(state)
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .layer(cors)
        .layer(TraceLayer::new_for_http());

    // Start the server
    let addr = format!("{}:{}", host, port);
    let listener = TcpListener::bind(&addr).await?;
    info!("Listening on {}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
