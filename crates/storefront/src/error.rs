//! HTTP error responses.

use std::collections::BTreeMap;
use std::fmt;

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;
use storefront_core::ValidationError;

/// Result alias for handlers.
pub type AppResult<T> = Result<T, AppError>;

/// Error returned by handlers, rendered as JSON.
#[derive(Debug)]
pub struct AppError {
    /// Response status.
    pub status: StatusCode,
    /// Message shown to the client.
    pub message: String,
    /// Per-field validation messages, keyed by field name.
    pub field_errors: Option<BTreeMap<&'static str, Vec<&'static str>>>,
}

impl AppError {
    /// Error with a status and message.
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
            field_errors: None,
        }
    }

    /// 500.
    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, message)
    }

    /// 401.
    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::new(StatusCode::UNAUTHORIZED, message)
    }

    /// 404.
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, message)
    }

    /// 422 with every problem grouped by field.
    #[must_use]
    pub fn validation(errors: &[ValidationError]) -> Self {
        let mut fields: BTreeMap<&'static str, Vec<&'static str>> = BTreeMap::new();
        for error in errors {
            fields.entry(error.field()).or_default().push(error.message());
        }
        Self {
            status: StatusCode::UNPROCESSABLE_ENTITY,
            message: "Validation failed".to_string(),
            field_errors: Some(fields),
        }
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for AppError {}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let body = match self.field_errors {
            Some(fields) => json!({ "errors": fields }),
            None => json!({
                "error": {
                    "message": self.message,
                    "status": self.status.as_u16(),
                }
            }),
        };

        (self.status, Json(body)).into_response()
    }
}

impl From<storefront_core::Error> for AppError {
    fn from(err: storefront_core::Error) -> Self {
        use storefront_core::Error;

        match err {
            Error::Validation(errors) => Self::validation(&errors),
            Error::ProductNotFound(_) | Error::AccountNotFound(_) => Self::not_found(err.to_string()),
            _ => {
                tracing::error!(error = ?err, "request failed");
                Self::internal("Internal server error")
            }
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use storefront_core::ProductId;

    async fn body_json(response: Response) -> serde_json::Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_validation_body_groups_by_field() {
        let err = AppError::validation(&[
            ValidationError::EmptyPassword,
            ValidationError::DuplicateEmail,
            ValidationError::PasswordConfirmationMismatch,
        ]);
        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);

        let body = body_json(response).await;
        assert_eq!(body["errors"]["email"][0], "has already been taken");
        assert_eq!(body["errors"]["password"][0], "can't be blank");
        assert_eq!(body["errors"]["password_confirmation"][0], "doesn't match Password");
    }

    #[tokio::test]
    async fn test_core_errors_map_to_status() {
        let not_found: AppError = storefront_core::Error::ProductNotFound(ProductId::new(3)).into();
        assert_eq!(not_found.status, StatusCode::NOT_FOUND);

        let internal: AppError = storefront_core::Error::Hashing("boom".to_string()).into();
        assert_eq!(internal.status, StatusCode::INTERNAL_SERVER_ERROR);

        let body = body_json(internal.into_response()).await;
        assert_eq!(body["error"]["message"], "Internal server error");
    }
}
