//! HTTP mapping of `AppError`: status code plus a JSON `{ "error": ... }` body.

use std::fmt;

use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};
use mj_core::error::AppError;
use serde_json::json;

/// Newtype so `AppError` can implement actix's `ResponseError`.
#[derive(Debug)]
pub struct ApiError(pub AppError);

pub type ApiResult<T> = Result<T, ApiError>;

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<AppError> for ApiError {
    fn from(err: AppError) -> Self {
        ApiError(err)
    }
}

impl From<anyhow::Error> for ApiError {
    fn from(err: anyhow::Error) -> Self {
        ApiError(AppError::from(err))
    }
}

impl ApiError {
    /// Message safe to show a client.
    fn public_message(&self) -> String {
        match &self.0 {
            AppError::NotFound(kind, _) => format!("{kind} not found"),
            AppError::ValidationError(msg) => msg.clone(),
            AppError::Validation(_) => "Validation failed".into(),
            AppError::Unauthorized(msg) => msg.clone(),
            AppError::Conflict(msg) => msg.clone(),
            AppError::Upstream(msg) => msg.clone(),
            AppError::Export(msg) => format!("Failed to export issue: {msg}"),
            AppError::Internal(_) => "Internal server error".into(),
        }
    }
}

impl ResponseError for ApiError {
    fn status_code(&self) -> StatusCode {
        match &self.0 {
            AppError::NotFound(..) => StatusCode::NOT_FOUND,
            AppError::ValidationError(_) | AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::Upstream(_) => StatusCode::BAD_GATEWAY,
            AppError::Export(_) | AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let status = self.status_code();
        if status.is_server_error() {
            log::error!("❌ {}", self.0);
        } else {
            log::debug!("{status}: {}", self.0);
        }

        let body = match &self.0 {
            AppError::Validation(fields) => json!({ "error": self.public_message(), "fields": fields }),
            _ => json!({ "error": self.public_message() }),
        };
        HttpResponse::build(status).json(body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::body::to_bytes;
    use mj_core::error::FieldError;

    async fn body_of(err: ApiError) -> serde_json::Value {
        let bytes = to_bytes(err.error_response().into_body()).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[actix_web::test]
    async fn statuses_follow_the_error_kind() {
        let cases = [
            (AppError::NotFound("Issue".into(), "x".into()), 404),
            (AppError::ValidationError("bad".into()), 400),
            (AppError::Unauthorized("no".into()), 401),
            (AppError::Conflict("dup".into()), 409),
            (AppError::Upstream("down".into()), 502),
            (AppError::Export("boom".into()), 500),
        ];
        for (err, code) in cases {
            assert_eq!(ApiError(err).status_code().as_u16(), code);
        }
    }

    #[actix_web::test]
    async fn internal_details_stay_private() {
        let body = body_of(ApiError(AppError::Internal("db password wrong".into()))).await;
        assert_eq!(body["error"], "Internal server error");
    }

    #[actix_web::test]
    async fn validation_lists_fields() {
        let err = AppError::Validation(vec![FieldError::new("title", "Title is required")]);
        let body = body_of(ApiError(err)).await;
        assert_eq!(body["error"], "Validation failed");
        assert_eq!(body["fields"][0]["field"], "title");
        assert_eq!(body["fields"][0]["message"], "Title is required");
    }

    #[actix_web::test]
    async fn not_found_names_the_resource() {
        let body = body_of(ApiError(AppError::NotFound("Issue".into(), "42".into()))).await;
        assert_eq!(body["error"], "Issue not found");
    }
}
