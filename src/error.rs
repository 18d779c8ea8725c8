use axum::{
    Json,
    http::{HeaderValue, StatusCode, header},
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

use crate::repository::RepositoryError;

/// ApiError
///
/// Every failure a handler can return. The response body is always `{"detail": ...}`
/// and never carries internal detail: store errors are logged and answered with a 500,
/// and every authentication failure shares one message.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Login rejected. Unknown user and wrong password are indistinguishable.
    #[error("invalid credentials")]
    InvalidCredentials,
    /// Token missing, malformed, expired, or its subject no longer exists.
    #[error("unauthorized")]
    Unauthorized,
    #[error("not found")]
    NotFound,
    #[error("validation failed: {0}")]
    Validation(String),
    #[error("internal error: {0}")]
    Internal(String),
}

impl From<RepositoryError> for ApiError {
    fn from(e: RepositoryError) -> Self {
        ApiError::Internal(e.to_string())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, detail) = match &self {
            ApiError::InvalidCredentials => {
                (StatusCode::UNAUTHORIZED, "اسم المستخدم أو كلمة المرور غير صحيحة".to_string())
            }
            ApiError::Unauthorized => {
                (StatusCode::UNAUTHORIZED, "تعذر التحقق من بيانات الاعتماد".to_string())
            }
            ApiError::NotFound => (StatusCode::NOT_FOUND, "المشروع غير موجود".to_string()),
            ApiError::Validation(msg) => (StatusCode::UNPROCESSABLE_ENTITY, msg.clone()),
            ApiError::Internal(msg) => {
                tracing::error!("internal error: {}", msg);
                (StatusCode::INTERNAL_SERVER_ERROR, "حدث خطأ داخلي في الخادم".to_string())
            }
        };

        let mut response = (status, Json(json!({ "detail": detail }))).into_response();
        if status == StatusCode::UNAUTHORIZED {
            response
                .headers_mut()
                .insert(header::WWW_AUTHENTICATE, HeaderValue::from_static("Bearer"));
        }
        response
    }
}
