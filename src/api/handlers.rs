//! API request handlers.

use crate::api::middleware::AuthenticatedUser;
use crate::auth::{User, authorize};
use crate::error::{ApiError, ErrorResponse};
use crate::models::{
    Bond, BondResponse, CreateBondRequest, DeleteBondResponse, HealthResponse, UpdateBondRequest,
    UserStatisticsResponse,
};
use crate::state::AppState;
use crate::statistics::aggregate;
use crate::validation::{check_updatable, validate};
use axum::Json;
use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use serde_json::{Map, Value};
use std::sync::Arc;
use tracing::info;

#[cfg(test)]
mod tests;

/// Raw JSON object body; attributes are validated individually.
type RawBody = Result<Json<Map<String, Value>>, JsonRejection>;

/// Loads a bond and checks the caller may act on it.
///
/// Existence is checked before ownership, so unknown ISINs are 404 for every
/// caller while other users' bonds are 403.
async fn load_accessible_bond(state: &AppState, user: &User, isin: &str) -> Result<Bond, ApiError> {
    let bond = state
        .bonds
        .find_by_isin(isin)
        .await?
        .ok_or_else(|| ApiError::NotFound("Bond not found".to_string()))?;
    authorize(user, bond.owner_id)?;
    Ok(bond)
}

// ============================================================================
// Health Check
// ============================================================================

/// Health check endpoint.
#[utoipa::path(
    get,
    path = "/health",
    responses(
        (status = 200, description = "Service is healthy", body = HealthResponse)
    ),
    tag = "Health"
)]
pub async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

// ============================================================================
// Bonds
// ============================================================================

/// List the caller's bonds.
#[utoipa::path(
    get,
    path = "/api/v1/bonds",
    responses(
        (status = 200, description = "Bonds owned by the caller", body = Vec<BondResponse>),
        (status = 401, description = "Missing or unknown API key", body = ErrorResponse)
    ),
    tag = "Bonds"
)]
pub async fn list_bonds(
    State(state): State<Arc<AppState>>,
    AuthenticatedUser(user): AuthenticatedUser,
) -> Result<Json<Vec<BondResponse>>, ApiError> {
    let bonds = state.bonds.list_by_owner(user.id).await?;
    Ok(Json(bonds.iter().map(BondResponse::from).collect()))
}

/// Create a bond owned by the caller.
#[utoipa::path(
    post,
    path = "/api/v1/bonds",
    request_body = CreateBondRequest,
    responses(
        (status = 201, description = "Bond created", body = BondResponse),
        (status = 400, description = "Invalid attributes or ISIN", body = ErrorResponse),
        (status = 401, description = "Missing or unknown API key", body = ErrorResponse),
        (status = 502, description = "ISIN registry unavailable", body = ErrorResponse)
    ),
    tag = "Bonds"
)]
pub async fn create_bond(
    State(state): State<Arc<AppState>>,
    AuthenticatedUser(user): AuthenticatedUser,
    payload: RawBody,
) -> Result<(StatusCode, Json<BondResponse>), ApiError> {
    let Json(raw) = payload?;

    let attributes = validate(&raw, None, false, state.verifier.as_ref()).await?;
    let bond = attributes.into_bond(user.id);
    state.bonds.insert(&bond).await?;

    info!("User {} created bond {}", user.id, bond.isin);
    Ok((StatusCode::CREATED, Json(BondResponse::from(&bond))))
}

/// Get one bond.
#[utoipa::path(
    get,
    path = "/api/v1/bonds/{isin}",
    params(
        ("isin" = String, Path, description = "Bond ISIN")
    ),
    responses(
        (status = 200, description = "Bond details", body = BondResponse),
        (status = 403, description = "Caller is not the owner", body = ErrorResponse),
        (status = 404, description = "Bond not found", body = ErrorResponse)
    ),
    tag = "Bonds"
)]
pub async fn get_bond(
    State(state): State<Arc<AppState>>,
    AuthenticatedUser(user): AuthenticatedUser,
    Path(isin): Path<String>,
) -> Result<Json<BondResponse>, ApiError> {
    let bond = load_accessible_bond(&state, &user, &isin).await?;
    Ok(Json(BondResponse::from(&bond)))
}

/// Update some attributes of a bond.
#[utoipa::path(
    patch,
    path = "/api/v1/bonds/{isin}",
    params(
        ("isin" = String, Path, description = "Bond ISIN")
    ),
    request_body = UpdateBondRequest,
    responses(
        (status = 200, description = "Bond updated", body = BondResponse),
        (status = 400, description = "Unknown or invalid attribute", body = ErrorResponse),
        (status = 403, description = "Caller is not the owner", body = ErrorResponse),
        (status = 404, description = "Bond not found", body = ErrorResponse)
    ),
    tag = "Bonds"
)]
pub async fn update_bond(
    State(state): State<Arc<AppState>>,
    AuthenticatedUser(user): AuthenticatedUser,
    Path(isin): Path<String>,
    payload: RawBody,
) -> Result<Json<BondResponse>, ApiError> {
    let existing = load_accessible_bond(&state, &user, &isin).await?;
    let Json(raw) = payload?;

    check_updatable(&raw)?;
    let attributes = validate(&raw, Some(&existing), true, state.verifier.as_ref()).await?;
    let bond = attributes.into_bond(existing.owner_id);

    if !state.bonds.update(&bond).await? {
        return Err(ApiError::NotFound("Bond not found".to_string()));
    }

    info!("User {} updated bond {}", user.id, bond.isin);
    Ok(Json(BondResponse::from(&bond)))
}

/// Delete a bond.
#[utoipa::path(
    delete,
    path = "/api/v1/bonds/{isin}",
    params(
        ("isin" = String, Path, description = "Bond ISIN")
    ),
    responses(
        (status = 200, description = "Bond deleted", body = DeleteBondResponse),
        (status = 403, description = "Caller is not the owner", body = ErrorResponse),
        (status = 404, description = "Bond not found", body = ErrorResponse)
    ),
    tag = "Bonds"
)]
pub async fn delete_bond(
    State(state): State<Arc<AppState>>,
    AuthenticatedUser(user): AuthenticatedUser,
    Path(isin): Path<String>,
) -> Result<Json<DeleteBondResponse>, ApiError> {
    let bond = load_accessible_bond(&state, &user, &isin).await?;

    if !state.bonds.delete(&bond.isin).await? {
        return Err(ApiError::NotFound("Bond not found".to_string()));
    }

    info!("User {} deleted bond {}", user.id, bond.isin);
    Ok(Json(DeleteBondResponse {
        message: "Bond deleted".to_string(),
        isin: bond.isin,
    }))
}

// ============================================================================
// Statistics
// ============================================================================

/// Aggregate statistics over a user's bonds.
#[utoipa::path(
    get,
    path = "/api/v1/bonds/user/{user_id}",
    params(
        ("user_id" = i64, Path, description = "Owner user id")
    ),
    responses(
        (status = 200, description = "User statistics", body = UserStatisticsResponse),
        (status = 403, description = "Caller may not see this user", body = ErrorResponse),
        (status = 404, description = "User has no bonds", body = ErrorResponse)
    ),
    tag = "Statistics"
)]
pub async fn get_user_statistics(
    State(state): State<Arc<AppState>>,
    AuthenticatedUser(user): AuthenticatedUser,
    Path(user_id): Path<i64>,
) -> Result<Json<UserStatisticsResponse>, ApiError> {
    authorize(&user, user_id)?;

    let bonds = state.bonds.list_by_owner(user_id).await?;
    let stats =
        aggregate(&bonds).ok_or_else(|| ApiError::NotFound("User not found".to_string()))?;

    Ok(Json(UserStatisticsResponse {
        avg_interest: stats.avg_interest,
        future_value: stats.future_value,
        total_value: stats.total_value,
        next_maturity: BondResponse::from(stats.next_maturity),
    }))
}
