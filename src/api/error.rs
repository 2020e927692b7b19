use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

use crate::frontegg::ProviderError;

/// JSON error returned by the launcher API
///
/// Rendered as `{"error": ..., "details"?: ...}` with `status`.
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub error: String,
    pub details: Option<String>,
}

impl ApiError {
    pub fn new(status: StatusCode, error: impl Into<String>) -> Self {
        Self {
            status,
            error: error.into(),
            details: None,
        }
    }

    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }

    pub fn no_apps_configured() -> Self {
        Self::new(
            StatusCode::INTERNAL_SERVER_ERROR,
            "No app configurations found in environment variables",
        )
    }

    pub fn missing_tenant() -> Self {
        Self::new(
            StatusCode::BAD_REQUEST,
            "Tenant ID is required. Please ensure tenantId is provided in the request.",
        )
    }

    /// Error for the vendor-token endpoint; upstream rejections keep their status
    pub fn from_vendor_token_error(err: ProviderError) -> Self {
        match err {
            ProviderError::CredentialsMissing => {
                Self::new(StatusCode::INTERNAL_SERVER_ERROR, err.to_string())
            }
            ProviderError::VendorTokenRejected { status, .. } => {
                Self::new(upstream_status(status), "Failed to get vendor token")
            }
            ProviderError::MissingToken => {
                Self::new(StatusCode::INTERNAL_SERVER_ERROR, "No token in response")
            }
            other => Self::internal(other),
        }
    }

    /// Error for the entitlement lookup
    ///
    /// Any failure obtaining the vendor token is reported as a 500; upstream
    /// assignment rejections keep their status.
    pub fn from_entitlement_error(err: ProviderError) -> Self {
        if err.is_vendor_token_failure() {
            return Self::new(StatusCode::INTERNAL_SERVER_ERROR, "Failed to get vendor token");
        }

        match err {
            ProviderError::AssignmentsRejected { status, details } => Self::new(
                upstream_status(status),
                "Failed to get user applications",
            )
            .with_details(details),
            ProviderError::InvalidJson => Self::new(
                StatusCode::INTERNAL_SERVER_ERROR,
                "Invalid response from Frontegg API",
            )
            .with_details(err.to_string()),
            other => Self::internal(other),
        }
    }

    fn internal(err: ProviderError) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, "Internal server error")
            .with_details(err.to_string())
    }
}

/// Map an upstream status onto ours, falling back to 502 for nonsense codes
fn upstream_status(status: u16) -> StatusCode {
    StatusCode::from_u16(status).unwrap_or(StatusCode::BAD_GATEWAY)
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = match self.details {
            Some(details) => json!({ "error": self.error, "details": details }),
            None => json!({ "error": self.error }),
        };
        (self.status, Json(body)).into_response()
    }
}
