//! Router-level tests for the bond handlers.

use crate::api::create_router;
use crate::api::middleware::API_KEY_HEADER;
use crate::auth::User;
use crate::db::{BondRepository, InMemoryBondRepository};
use crate::models::{BondResponse, CreateBondRequest, DeleteBondResponse, UserStatisticsResponse};
use crate::registry::{IsinStatus, IsinVerifier, RegistryError};
use crate::state::AppState;
use async_trait::async_trait;
use axum::Router;
use axum::body::Body;
use axum::http::{Method, Request, StatusCode};
use serde_json::{Value, json};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use tower::ServiceExt;

const OWNER_KEY: &str = "owner-key";
const OTHER_KEY: &str = "other-key";
const STAFF_KEY: &str = "staff-key";
const SUPERUSER_KEY: &str = "superuser-key";

/// Rejects ISINs starting with `XX`, accepts the rest, counts calls.
/// When `unreachable`, every lookup fails as a transport error.
#[derive(Default)]
struct StubRegistry {
    calls: AtomicUsize,
    unreachable: bool,
}

impl StubRegistry {
    fn unreachable() -> Self {
        Self {
            unreachable: true,
            ..Default::default()
        }
    }
}

#[async_trait]
impl IsinVerifier for StubRegistry {
    async fn verify(&self, isin: &str) -> Result<IsinStatus, RegistryError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.unreachable {
            Err(RegistryError::Unavailable("connection refused".to_string()))
        } else if isin.starts_with("XX") {
            Ok(IsinStatus::Rejected)
        } else {
            Ok(IsinStatus::Valid)
        }
    }
}

struct Harness {
    router: Router,
    repo: Arc<InMemoryBondRepository>,
    registry: Arc<StubRegistry>,
    state: Arc<AppState>,
}

impl Harness {
    fn new() -> Self {
        Self::with_registry(StubRegistry::default())
    }

    fn with_registry(registry: StubRegistry) -> Self {
        let repo = Arc::new(InMemoryBondRepository::new());
        let registry = Arc::new(registry);
        let state = AppState::with_repository(repo.clone(), registry.clone());

        state.identities.register(User::regular(1), OWNER_KEY);
        state.identities.register(User::regular(2), OTHER_KEY);
        state.identities.register(
            User {
                id: 3,
                is_staff: true,
                is_superuser: false,
            },
            STAFF_KEY,
        );
        state.identities.register(
            User {
                id: 4,
                is_staff: false,
                is_superuser: true,
            },
            SUPERUSER_KEY,
        );

        let state = Arc::new(state);
        Self {
            router: create_router(state.clone()),
            repo,
            registry,
            state,
        }
    }

    fn registry_calls(&self) -> usize {
        self.registry.calls.load(Ordering::SeqCst)
    }

    async fn send(
        &self,
        method: Method,
        uri: &str,
        key: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(key) = key {
            builder = builder.header(API_KEY_HEADER, key);
        }
        let request = match body {
            Some(body) => builder
                .header("content-type", "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let json = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, json)
    }

    async fn create(&self, key: &str, body: Value) -> (StatusCode, Value) {
        self.send(Method::POST, "/api/v1/bonds", Some(key), Some(body))
            .await
    }
}

fn bond_payload(isin: &str) -> Value {
    serde_json::to_value(CreateBondRequest {
        emmision_name: "Bond Valid ISIN".to_string(),
        isin: isin.to_string(),
        value: 11.5,
        interest: 2.8,
        purchase_date: "2024-06-16T12:00:00Z".to_string(),
        maturity_date: "2025-06-16T12:00:00Z".to_string(),
        interest_payment_frequency: "Yearly".to_string(),
    })
    .unwrap()
}

// ============================================================================
// Health & Authentication
// ============================================================================

#[tokio::test]
async fn test_health_needs_no_key() {
    let harness = Harness::new();
    let (status, body) = harness.send(Method::GET, "/health", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");
}

#[tokio::test]
async fn test_missing_key_is_unauthorized() {
    let harness = Harness::new();
    let (status, body) = harness.send(Method::GET, "/api/v1/bonds", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["code"], "UNAUTHORIZED");
}

#[tokio::test]
async fn test_unknown_key_is_unauthorized() {
    let harness = Harness::new();
    let (status, _) = harness
        .send(Method::GET, "/api/v1/bonds", Some("nope"), None)
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

// ============================================================================
// Create & List
// ============================================================================

#[tokio::test]
async fn test_create_bond() {
    let harness = Harness::new();
    let (status, body) = harness
        .create(OWNER_KEY, bond_payload("CZ0003551251"))
        .await;

    assert_eq!(status, StatusCode::CREATED);
    let bond: BondResponse = serde_json::from_value(body).unwrap();
    assert_eq!(bond.emission_name, "Bond Valid ISIN");
    assert_eq!(bond.user, 1);
    assert_eq!(bond.purchase_date, "2024-06-16T12:00:00Z");
    assert_eq!(harness.repo.len(), 1);
    assert_eq!(harness.registry_calls(), 1);
}

#[tokio::test]
async fn test_create_with_rejected_isin() {
    let harness = Harness::new();
    let (status, body) = harness
        .create(OWNER_KEY, bond_payload("XX0003551252"))
        .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Invalid ISIN code");
    assert!(harness.repo.is_empty());
}

#[tokio::test]
async fn test_create_with_unreachable_registry() {
    let harness = Harness::with_registry(StubRegistry::unreachable());
    let (status, body) = harness
        .create(OWNER_KEY, bond_payload("CZ0003551251"))
        .await;

    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert_eq!(body["code"], "REGISTRY_UNAVAILABLE");
    assert_eq!(harness.registry_calls(), 1);
    assert!(harness.repo.is_empty());
}

#[tokio::test]
async fn test_create_isin_with_url_characters() {
    let harness = Harness::new();
    let (status, body) = harness
        .create(OWNER_KEY, bond_payload("AB#forged12"))
        .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "VALIDATION_ERROR");
    assert_eq!(harness.registry_calls(), 0);
    assert!(harness.repo.is_empty());
}

#[tokio::test]
async fn test_create_rejects_dates_out_of_order() {
    let harness = Harness::new();
    let mut payload = bond_payload("CZ0003551251");
    payload["maturity_date"] = json!("2023-06-16T12:00:00Z");

    let (status, body) = harness.create(OWNER_KEY, payload).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Maturity date must be greater than purchase date");
    assert!(harness.repo.is_empty());
}

#[tokio::test]
async fn test_create_duplicate_isin() {
    let harness = Harness::new();
    harness.create(OWNER_KEY, bond_payload("CZ0003551251")).await;
    let (status, _) = harness.create(OTHER_KEY, bond_payload("CZ0003551251")).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(harness.repo.len(), 1);
}

#[tokio::test]
async fn test_create_malformed_json() {
    let harness = Harness::new();
    let request = Request::builder()
        .method(Method::POST)
        .uri("/api/v1/bonds")
        .header(API_KEY_HEADER, OWNER_KEY)
        .header("content-type", "application/json")
        .body(Body::from("{not json"))
        .unwrap();

    let response = harness.router.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_list_returns_only_callers_bonds() {
    let harness = Harness::new();
    harness.create(OWNER_KEY, bond_payload("CZ0003551251")).await;
    harness.create(OTHER_KEY, bond_payload("CZ0003551252")).await;

    let (status, body) = harness
        .send(Method::GET, "/api/v1/bonds", Some(OWNER_KEY), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    let bonds: Vec<BondResponse> = serde_json::from_value(body).unwrap();
    assert_eq!(bonds.len(), 1);
    assert_eq!(bonds[0].isin, "CZ0003551251");
}

// ============================================================================
// Detail, Update & Delete
// ============================================================================

#[tokio::test]
async fn test_get_bond_detail() {
    let harness = Harness::new();
    harness.create(OWNER_KEY, bond_payload("CZ0003551251")).await;

    let (status, body) = harness
        .send(Method::GET, "/api/v1/bonds/CZ0003551251", Some(OWNER_KEY), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["interest_payment_frequency"], "Yearly");
}

#[tokio::test]
async fn test_get_bond_access_rules() {
    let harness = Harness::new();
    harness.create(OWNER_KEY, bond_payload("CZ0003551251")).await;
    let uri = "/api/v1/bonds/CZ0003551251";

    let (status, body) = harness.send(Method::GET, uri, Some(OTHER_KEY), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["error"], "Permission denied");

    let (status, _) = harness.send(Method::GET, uri, Some(STAFF_KEY), None).await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = harness.send(Method::GET, uri, Some(SUPERUSER_KEY), None).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_get_missing_bond_is_not_found_before_forbidden() {
    let harness = Harness::new();
    let (status, body) = harness
        .send(Method::GET, "/api/v1/bonds/CZ0000000000", Some(OTHER_KEY), None)
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "Bond not found");
}

#[tokio::test]
async fn test_patch_name_only() {
    let harness = Harness::new();
    harness.create(OWNER_KEY, bond_payload("CZ0003551251")).await;
    let calls_after_create = harness.registry_calls();

    let (status, body) = harness
        .send(
            Method::PATCH,
            "/api/v1/bonds/CZ0003551251",
            Some(OWNER_KEY),
            Some(json!({"emmision_name": "New name"})),
        )
        .await;

    assert_eq!(status, StatusCode::OK);
    let bond: BondResponse = serde_json::from_value(body).unwrap();
    assert_eq!(bond.emission_name, "New name");
    assert_eq!(bond.isin, "CZ0003551251");
    assert_eq!(bond.value, 11.5);
    assert_eq!(bond.interest, 2.8);
    assert_eq!(bond.purchase_date, "2024-06-16T12:00:00Z");
    assert_eq!(bond.maturity_date, "2025-06-16T12:00:00Z");
    assert_eq!(harness.registry_calls(), calls_after_create);
}

#[tokio::test]
async fn test_patch_frequency_and_dates() {
    let harness = Harness::new();
    harness.create(OWNER_KEY, bond_payload("CZ0003551251")).await;

    let (status, body) = harness
        .send(
            Method::PATCH,
            "/api/v1/bonds/CZ0003551251",
            Some(OWNER_KEY),
            Some(json!({
                "interest_payment_frequency": "w",
                "maturity_date": "2030-06-16T12:00:00+0200",
            })),
        )
        .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["interest_payment_frequency"], "Weekly");
    assert_eq!(body["maturity_date"], "2030-06-16T10:00:00Z");
}

#[tokio::test]
async fn test_patch_rejects_isin_and_unknown_keys() {
    let harness = Harness::new();
    harness.create(OWNER_KEY, bond_payload("CZ0003551251")).await;
    let calls_after_create = harness.registry_calls();
    let uri = "/api/v1/bonds/CZ0003551251";

    let (status, body) = harness
        .send(
            Method::PATCH,
            uri,
            Some(OWNER_KEY),
            Some(json!({"isin": "CZ0003551252"})),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Invalid attribute: isin");
    assert_eq!(harness.registry_calls(), calls_after_create);

    let (status, _) = harness
        .send(Method::PATCH, uri, Some(OWNER_KEY), Some(json!({"colour": "red"})))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_patch_invalid_value_leaves_bond_unchanged() {
    let harness = Harness::new();
    harness.create(OWNER_KEY, bond_payload("CZ0003551251")).await;

    let (status, body) = harness
        .send(
            Method::PATCH,
            "/api/v1/bonds/CZ0003551251",
            Some(OWNER_KEY),
            Some(json!({"value": -4})),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Invalid value: value must be greater than 0");

    let stored = harness.repo.list_by_owner(1).await.unwrap();
    assert_eq!(stored[0].value, 11.5);
}

#[tokio::test]
async fn test_patch_by_other_user_forbidden() {
    let harness = Harness::new();
    harness.create(OWNER_KEY, bond_payload("CZ0003551251")).await;

    let (status, _) = harness
        .send(
            Method::PATCH,
            "/api/v1/bonds/CZ0003551251",
            Some(OTHER_KEY),
            Some(json!({"emmision_name": "Hijacked"})),
        )
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_delete_bond() {
    let harness = Harness::new();
    harness.create(OWNER_KEY, bond_payload("CZ0003551251")).await;

    let (status, body) = harness
        .send(Method::DELETE, "/api/v1/bonds/CZ0003551251", Some(OWNER_KEY), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    let deleted: DeleteBondResponse = serde_json::from_value(body).unwrap();
    assert_eq!(deleted.message, "Bond deleted");
    assert!(harness.repo.is_empty());
}

#[tokio::test]
async fn test_delete_missing_bond() {
    let harness = Harness::new();
    let (status, _) = harness
        .send(Method::DELETE, "/api/v1/bonds/CZ0000000000", Some(OWNER_KEY), None)
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_delete_by_other_user_forbidden() {
    let harness = Harness::new();
    harness.create(OWNER_KEY, bond_payload("CZ0003551251")).await;

    let (status, _) = harness
        .send(Method::DELETE, "/api/v1/bonds/CZ0003551251", Some(OTHER_KEY), None)
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(harness.repo.len(), 1);
}

// ============================================================================
// Statistics
// ============================================================================

#[tokio::test]
async fn test_user_statistics() {
    let harness = Harness::new();
    let mut payload = bond_payload("AA000000000");
    payload["emmision_name"] = json!("X");
    payload["value"] = json!(10.0);
    payload["interest"] = json!(2.9);
    payload["purchase_date"] = json!("2024-01-01T00:00:00Z");
    payload["maturity_date"] = json!("2025-01-01T00:00:00Z");
    let (status, _) = harness.create(OWNER_KEY, payload).await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, body) = harness
        .send(Method::GET, "/api/v1/bonds/user/1", Some(OWNER_KEY), None)
        .await;
    assert_eq!(status, StatusCode::OK);

    let stats: UserStatisticsResponse = serde_json::from_value(body).unwrap();
    assert!((stats.avg_interest - 2.9).abs() < 1e-9);
    assert!((stats.total_value - 10.0).abs() < 1e-9);
    assert!((stats.future_value - 10.0 * 1.029).abs() < 1e-9);
    assert_eq!(stats.next_maturity.isin, "AA000000000");
}

#[tokio::test]
async fn test_user_statistics_without_bonds() {
    let harness = Harness::new();
    let (status, body) = harness
        .send(Method::GET, "/api/v1/bonds/user/1", Some(OWNER_KEY), None)
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "User not found");
}

#[tokio::test]
async fn test_user_statistics_forbidden_before_not_found() {
    let harness = Harness::new();
    let (status, _) = harness
        .send(Method::GET, "/api/v1/bonds/user/1", Some(OTHER_KEY), None)
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = harness
        .send(Method::GET, "/api/v1/bonds/user/1", Some(STAFF_KEY), None)
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

// ============================================================================
// User Removal
// ============================================================================

#[tokio::test]
async fn test_removing_user_removes_their_bonds() {
    let harness = Harness::new();
    harness.create(OWNER_KEY, bond_payload("CZ0003551251")).await;
    harness.create(OTHER_KEY, bond_payload("CZ0003551252")).await;

    assert_eq!(harness.state.remove_user(1).await.unwrap(), 1);
    assert_eq!(harness.repo.len(), 1);

    let (status, _) = harness
        .send(Method::GET, "/api/v1/bonds", Some(OWNER_KEY), None)
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}
