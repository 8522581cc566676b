//! Per-request identity taken from the `Authorization: Bearer` header.

use std::future::{ready, Ready};

use actix_web::dev::Payload;
use actix_web::http::header;
use actix_web::{web, FromRequest, HttpRequest};
use mj_core::error::AppError;
use uuid::Uuid;

use crate::error::ApiError;
use crate::handlers::AppState;

/// The authenticated caller. Adding it to a handler's arguments makes the
/// route require a valid access token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub user_id: Uuid,
    pub email: String,
}

fn bearer_token(req: &HttpRequest) -> Option<&str> {
    let value = req.headers().get(header::AUTHORIZATION)?.to_str().ok()?;
    let (scheme, token) = value.split_once(' ')?;
    scheme.eq_ignore_ascii_case("bearer").then(|| token.trim()).filter(|t| !t.is_empty())
}

impl FromRequest for Session {
    type Error = ApiError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        let result = (|| -> Result<Session, AppError> {
            let state = req
                .app_data::<web::Data<AppState>>()
                .ok_or_else(|| AppError::Internal("application state is not configured".into()))?;
            let token = bearer_token(req).ok_or_else(|| AppError::Unauthorized("Missing bearer token".into()))?;
            let claims = state.auth.verify_access_token(token)?;
            Ok(Session { user_id: claims.sub, email: claims.email })
        })();
        ready(result.map_err(ApiError))
    }
}
