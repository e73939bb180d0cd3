use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use b1_core::ServiceLayerError;
use serde::Serialize;
use tracing::error;

/// Envelope every `/api` response is wrapped in
#[derive(Debug, Serialize)]
pub struct ApiResponse<T: Serialize> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }
}

impl ApiResponse<()> {
    /// `{"success": true}` with no payload
    pub fn empty() -> Self {
        Self {
            success: true,
            data: None,
            error: None,
        }
    }

    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(message.into()),
        }
    }
}

impl<T: Serialize> IntoResponse for ApiResponse<T> {
    fn into_response(self) -> Response {
        Json(self).into_response()
    }
}

/// Error type for HTTP handlers
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub message: String,
}

impl ApiError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message)
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::new(StatusCode::UNAUTHORIZED, message)
    }

    pub fn not_found() -> Self {
        Self::new(StatusCode::NOT_FOUND, "Not found")
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, message)
    }

    /// Map a failed Service Layer fetch. A non-2xx answer keeps its status and body;
    /// anything else becomes a 500 with a generic message.
    pub fn upstream(what: &str, err: ServiceLayerError) -> Self {
        match err {
            ServiceLayerError::HttpError {
                status_code,
                message,
            } => {
                let status =
                    StatusCode::from_u16(status_code).unwrap_or(StatusCode::BAD_GATEWAY);
                Self::new(status, format!("Failed to fetch {}: {}", what, message))
            }
            other => {
                error!(error = %other, "Failed to fetch {}", what);
                Self::internal(format!("Failed to fetch {}", what))
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, ApiResponse::failure(self.message)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_envelope_omits_empty_fields() {
        assert_eq!(
            serde_json::to_value(ApiResponse::empty()).unwrap(),
            json!({ "success": true })
        );
        assert_eq!(
            serde_json::to_value(ApiResponse::ok(vec![1, 2])).unwrap(),
            json!({ "success": true, "data": [1, 2] })
        );
        assert_eq!(
            serde_json::to_value(ApiResponse::failure("nope")).unwrap(),
            json!({ "success": false, "error": "nope" })
        );
    }

    #[test]
    fn test_upstream_http_error_keeps_status() {
        let err = ApiError::upstream(
            "items",
            ServiceLayerError::HttpError {
                status_code: 403,
                message: "denied".to_string(),
            },
        );
        assert_eq!(err.status, StatusCode::FORBIDDEN);
        assert_eq!(err.message, "Failed to fetch items: denied");
    }

    #[test]
    fn test_upstream_transport_error_is_500() {
        let err = ApiError::upstream(
            "branches",
            ServiceLayerError::RequestError("connection refused".to_string()),
        );
        assert_eq!(err.status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(err.message, "Failed to fetch branches");
    }
}
