//! Unit tests for error module.

use super::*;

// ============================================================================
// ErrorResponse Tests
// ============================================================================

#[test]
fn test_error_response_serialization() {
    let response = ErrorResponse {
        error: "Invalid ISIN code".to_string(),
        code: "VALIDATION_ERROR".to_string(),
    };

    let json = serde_json::to_string(&response).unwrap();
    assert!(json.contains("\"error\":\"Invalid ISIN code\""));
    assert!(json.contains("\"code\":\"VALIDATION_ERROR\""));
}

// ============================================================================
// ApiError Display Tests
// ============================================================================

#[test]
fn test_api_error_validation_display_is_message() {
    let error = ApiError::Validation("Invalid interest payment frequency".to_string());
    assert_eq!(format!("{}", error), "Invalid interest payment frequency");
}

#[test]
fn test_api_error_permission_denied_display() {
    assert_eq!(format!("{}", ApiError::PermissionDenied), "Permission denied");
}

#[test]
fn test_api_error_not_found_display() {
    let error = ApiError::NotFound("Bond not found".to_string());
    assert_eq!(format!("{}", error), "Bond not found");
}

#[test]
fn test_api_error_database_display() {
    let error = ApiError::Database("Connection timeout".to_string());
    assert_eq!(format!("{}", error), "Database error: Connection timeout");
}

// ============================================================================
// ApiError IntoResponse Tests
// ============================================================================

#[test]
fn test_api_error_validation_into_response() {
    let response = ApiError::Validation("bad".to_string()).into_response();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[test]
fn test_api_error_unauthorized_into_response() {
    let response = ApiError::Unauthorized.into_response();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[test]
fn test_api_error_permission_denied_into_response() {
    let response = ApiError::PermissionDenied.into_response();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[test]
fn test_api_error_not_found_into_response() {
    let response = ApiError::NotFound("Bond not found".to_string()).into_response();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[test]
fn test_api_error_registry_into_response() {
    let response = ApiError::RegistryUnavailable("down".to_string()).into_response();
    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
}

#[test]
fn test_api_error_database_into_response() {
    let response = ApiError::Database("DB error".to_string()).into_response();
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
}

#[test]
fn test_api_error_internal_into_response() {
    let response = ApiError::Internal("Server error".to_string()).into_response();
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
}

// ============================================================================
// Conversion Tests
// ============================================================================

#[test]
fn test_validation_error_maps_to_bad_request() {
    let error: ApiError = ValidationError::InvalidIsin.into();
    assert!(matches!(error, ApiError::Validation(ref m) if m == "Invalid ISIN code"));
}

#[test]
fn test_registry_failure_inside_validation_maps_to_bad_gateway() {
    let error: ApiError = ValidationError::Registry(RegistryError::CircuitOpen).into();
    assert_eq!(error.status_and_code().0, StatusCode::BAD_GATEWAY);
}

#[test]
fn test_duplicate_isin_maps_to_bad_request() {
    let error: ApiError = StoreError::DuplicateIsin("CZ0003551251".to_string()).into();
    assert_eq!(error.status_and_code(), (StatusCode::BAD_REQUEST, "VALIDATION_ERROR"));
}

#[test]
fn test_corrupt_row_maps_to_internal() {
    let error: ApiError = StoreError::Corrupt("bad frequency code Q".to_string()).into();
    assert_eq!(error.status_and_code().1, "INTERNAL_ERROR");
}
