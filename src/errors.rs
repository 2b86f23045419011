// src/errors.rs
// DOCUMENTATION: Custom error types and HTTP responses
// PURPOSE: Centralized error handling for providers, geolocation and HTTP layer

use actix_web::{error::ResponseError, http::StatusCode, HttpResponse};
use serde_json::json;
use thiserror::Error;

/// Application-specific error types
/// DOCUMENTATION: Covers provider, geolocation and request failures
/// Each variant maps to appropriate HTTP status code and error response
#[derive(Error, Debug, Clone, PartialEq)]
pub enum PlacesError {
    /// Search service never initialized or API missing
    #[error("Places provider unavailable: {0}")]
    ProviderUnavailable(String),

    /// A search call returned a non-success status
    #[error("Places provider query failed: {0}")]
    ProviderQueryFailed(String),

    #[error("Geolocation permission denied")]
    GeolocationDenied,

    #[error("Geolocation is not supported")]
    GeolocationUnsupported,

    #[error("Geolocation timed out after {0} ms")]
    GeolocationTimeout(u64),

    #[error("Place not found: {0}")]
    PlaceNotFound(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("External API error: {0}")]
    ExternalApiError(String),

    #[error("Rate limit exceeded")]
    RateLimitExceeded,
}

impl PlacesError {
    fn code(&self) -> &'static str {
        match self {
            PlacesError::ProviderUnavailable(_) => "PROVIDER_UNAVAILABLE",
            PlacesError::ProviderQueryFailed(_) => "PROVIDER_QUERY_FAILED",
            PlacesError::GeolocationDenied => "GEOLOCATION_DENIED",
            PlacesError::GeolocationUnsupported => "GEOLOCATION_UNSUPPORTED",
            PlacesError::GeolocationTimeout(_) => "GEOLOCATION_TIMEOUT",
            PlacesError::PlaceNotFound(_) => "PLACE_NOT_FOUND",
            PlacesError::InvalidInput(_) => "INVALID_INPUT",
            PlacesError::ValidationError(_) => "VALIDATION_ERROR",
            PlacesError::ExternalApiError(_) => "EXTERNAL_API_ERROR",
            PlacesError::RateLimitExceeded => "RATE_LIMIT_EXCEEDED",
        }
    }
}

/// Convert PlacesError to HTTP response
/// DOCUMENTATION: Maps error types to HTTP status codes and JSON responses
impl ResponseError for PlacesError {
    fn error_response(&self) -> HttpResponse {
        let body = json!({
            "error": {
                "code": self.code(),
                "message": self.to_string(),
                "timestamp": chrono::Utc::now().to_rfc3339()
            }
        });

        HttpResponse::build(self.status_code()).json(body)
    }

    fn status_code(&self) -> StatusCode {
        match self {
            PlacesError::ProviderUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            PlacesError::ProviderQueryFailed(_) => StatusCode::BAD_GATEWAY,
            PlacesError::GeolocationDenied => StatusCode::FORBIDDEN,
            PlacesError::GeolocationUnsupported => StatusCode::NOT_IMPLEMENTED,
            PlacesError::GeolocationTimeout(_) => StatusCode::GATEWAY_TIMEOUT,
            PlacesError::PlaceNotFound(_) => StatusCode::NOT_FOUND,
            PlacesError::InvalidInput(_) => StatusCode::BAD_REQUEST,
            PlacesError::ValidationError(_) => StatusCode::BAD_REQUEST,
            PlacesError::ExternalApiError(_) => StatusCode::BAD_GATEWAY,
            PlacesError::RateLimitExceeded => StatusCode::TOO_MANY_REQUESTS,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        assert_eq!(
            PlacesError::ProviderUnavailable("no key".to_string()).status_code(),
            StatusCode::SERVICE_UNAVAILABLE
        );
        assert_eq!(
            PlacesError::ValidationError("lat".to_string()).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            PlacesError::PlaceNotFound("ChIJ".to_string()).status_code(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            PlacesError::GeolocationTimeout(10_000).status_code(),
            StatusCode::GATEWAY_TIMEOUT
        );
    }

    #[test]
    fn test_error_messages() {
        let err = PlacesError::GeolocationTimeout(10_000);
        assert_eq!(err.to_string(), "Geolocation timed out after 10000 ms");
        assert_eq!(err.code(), "GEOLOCATION_TIMEOUT");
    }
}
