//! End-to-end tests for the Bonds API.
//!
//! Each test starts its own server on an ephemeral port, backed by in-memory
//! storage and a stub ISIN registry, and talks to it through `bonds-client`.

use axum::Router;
use axum::extract::Path;
use axum::http::StatusCode;
use axum::routing::get;
use bonds_api_backend::api::create_router;
use bonds_api_backend::config::{Config, RegistryConfig, UserConfig};
use bonds_api_backend::registry::RegistryIsinVerifier;
use bonds_api_backend::state::AppState;
use bonds_client::{BondsClient, ClientConfig, CreateBondRequest};
use std::io;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;

/// API key of user 1.
pub const OWNER_KEY: &str = "owner-key";
/// API key of user 2.
pub const OTHER_KEY: &str = "other-key";
/// API key of user 3, a staff member.
pub const STAFF_KEY: &str = "staff-key";

/// A running server.
pub struct TestServer {
    /// Address the API listens on.
    pub addr: SocketAddr,
    /// Shared state, for inspecting storage directly.
    pub state: Arc<AppState>,
}

impl TestServer {
    /// Base URL of the API.
    #[must_use]
    pub fn base_url(&self) -> String {
        format!("http://{}", self.addr)
    }

    /// Client authenticating with `api_key`.
    ///
    /// # Errors
    /// Returns error if client creation fails.
    pub fn client(&self, api_key: &str) -> Result<BondsClient, bonds_client::Error> {
        BondsClient::new(ClientConfig {
            base_url: self.base_url(),
            timeout: Duration::from_secs(10),
            api_key: Some(api_key.to_string()),
        })
    }
}

async fn serve(app: Router) -> io::Result<SocketAddr> {
    let listener = TcpListener::bind("127.0.0.1:0").await?;
    let addr = listener.local_addr()?;
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });
    Ok(addr)
}

/// Starts a registry that knows every ISIN except those starting with `XX`.
///
/// # Errors
/// Returns error if the listener cannot be bound.
pub async fn spawn_registry() -> io::Result<SocketAddr> {
    async fn lookup(Path(isin): Path<String>) -> (StatusCode, String) {
        if isin.starts_with("XX") {
            (StatusCode::NOT_FOUND, "ISIN not found".to_string())
        } else {
            (StatusCode::OK, format!("{{\"isin\":\"{isin}\"}}"))
        }
    }

    serve(Router::new().route("/isin/{isin}", get(lookup))).await
}

/// Test users: 1 and 2 are regular, 3 is staff.
#[must_use]
pub fn test_users() -> Vec<UserConfig> {
    let user = |id, key: &str, is_staff| UserConfig {
        id,
        api_key: Some(key.to_string()),
        is_staff,
        is_superuser: false,
    };
    vec![
        user(1, OWNER_KEY, false),
        user(2, OTHER_KEY, false),
        user(3, STAFF_KEY, true),
    ]
}

/// Starts the API against a fresh registry stub.
///
/// # Errors
/// Returns error if a listener cannot be bound or state setup fails.
pub async fn spawn_test_server() -> io::Result<TestServer> {
    let registry = spawn_registry().await?;
    let config = Config {
        registry: RegistryConfig {
            base_url: format!("http://{registry}/isin/"),
            timeout_ms: 2000,
            ..Default::default()
        },
        users: test_users(),
        ..Default::default()
    };
    spawn_with_config(config).await
}

/// Starts the API with the given configuration and in-memory storage.
///
/// # Errors
/// Returns error if a listener cannot be bound or state setup fails.
pub async fn spawn_with_config(config: Config) -> io::Result<TestServer> {
    let verifier = RegistryIsinVerifier::new(&config.registry).map_err(io::Error::other)?;
    let state = AppState::new(Arc::new(verifier));
    state
        .register_users(&config)
        .await
        .map_err(io::Error::other)?;
    let state = Arc::new(state);

    let addr = serve(create_router(state.clone())).await?;
    Ok(TestServer { addr, state })
}

/// A valid creation request for `isin`.
#[must_use]
pub fn bond_request(isin: &str) -> CreateBondRequest {
    CreateBondRequest {
        emmision_name: "Bond Valid ISIN".to_string(),
        isin: isin.to_string(),
        value: 10.0,
        interest: 2.9,
        purchase_date: "2024-06-16T12:00:00Z".to_string(),
        maturity_date: "2044-06-16T12:00:00Z".to_string(),
        interest_payment_frequency: "Yearly".to_string(),
    }
}
