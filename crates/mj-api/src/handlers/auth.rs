//! Account routes under `/api/auth`.
//!
//! Access tokens travel in the response body; refresh tokens only ever travel
//! in an HttpOnly cookie scoped to this path. Every refresh rotates the pair.

use actix_web::cookie::{time, Cookie, SameSite};
use actix_web::{web, HttpRequest, HttpResponse};
use chrono::Utc;
use mj_core::error::AppError;
use mj_core::models::{RefreshRecord, User};
use mj_core::validation::validate_signup;
use serde::{Deserialize, Serialize};
use serde_json::json;
use uuid::Uuid;

use super::AppState;
use crate::error::ApiResult;

pub const REFRESH_COOKIE: &str = "mj_refresh";
const COOKIE_PATH: &str = "/api/auth";

#[derive(Debug, Deserialize)]
pub struct SignupRequest {
    pub name: String,
    pub email: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthResponse {
    pub access_token: String,
    pub token_type: &'static str,
    pub expires_in: i64,
    pub user: User,
}

fn refresh_cookie(plain: String, max_age_secs: i64, secure: bool) -> Cookie<'static> {
    Cookie::build(REFRESH_COOKIE, plain)
        .path(COOKIE_PATH)
        .http_only(true)
        .same_site(SameSite::Strict)
        .secure(secure)
        .max_age(time::Duration::seconds(max_age_secs.max(0)))
        .finish()
}

fn removal_cookie(secure: bool) -> Cookie<'static> {
    let mut cookie = Cookie::build(REFRESH_COOKIE, "")
        .path(COOKIE_PATH)
        .http_only(true)
        .same_site(SameSite::Strict)
        .secure(secure)
        .finish();
    cookie.make_removal();
    cookie
}

fn invalid_refresh() -> AppError {
    AppError::Unauthorized("Invalid or expired refresh token".into())
}

/// Mints an access/refresh pair for `user` and builds the response.
async fn issue_session(data: &AppState, user: User, created: bool) -> ApiResult<HttpResponse> {
    let access_token = data.auth.issue_access_token(&user)?;
    let refresh = data.auth.mint_refresh_token();
    data.users
        .store_refresh(RefreshRecord {
            token_hash: refresh.hash.clone(),
            user_id: user.id,
            expires_at: refresh.expires_at,
            revoked: false,
        })
        .await?;

    let max_age = (refresh.expires_at - Utc::now()).num_seconds();
    let body = AuthResponse { access_token, token_type: "Bearer", expires_in: data.auth.access_ttl_secs(), user };
    let mut response = if created { HttpResponse::Created() } else { HttpResponse::Ok() };
    Ok(response.cookie(refresh_cookie(refresh.plain, max_age, data.cookies.secure)).json(body))
}

pub async fn signup(data: web::Data<AppState>, body: web::Json<SignupRequest>) -> ApiResult<HttpResponse> {
    let req = body.into_inner();
    validate_signup(&req.name, &req.email, &req.password)?;

    let email = req.email.trim().to_lowercase();
    if data.users.find_user_by_email(&email).await?.is_some() {
        return Err(AppError::Conflict("An account with this e-mail already exists".into()).into());
    }

    let user = User {
        id: Uuid::now_v7(),
        name: req.name.trim().to_string(),
        email,
        password_hash: data.auth.hash_password(&req.password)?,
        created_at: Utc::now(),
    };
    data.users.create_user(user.clone()).await?;
    log::info!("👤 New account {}", user.email);

    issue_session(&data, user, true).await
}

pub async fn login(data: web::Data<AppState>, body: web::Json<LoginRequest>) -> ApiResult<HttpResponse> {
    let req = body.into_inner();
    let rejected = || AppError::Unauthorized("Invalid email or password".into());

    let user = data.users.find_user_by_email(req.email.trim()).await?.ok_or_else(rejected)?;
    if !data.auth.verify_password(&req.password, &user.password_hash).await {
        log::debug!("Failed login for {}", user.email);
        return Err(rejected().into());
    }

    issue_session(&data, user, false).await
}

/// Rotates the refresh token. Presenting an already revoked token revokes
/// every outstanding token of its owner.
pub async fn refresh(data: web::Data<AppState>, req: HttpRequest) -> ApiResult<HttpResponse> {
    let cookie = req.cookie(REFRESH_COOKIE).ok_or_else(invalid_refresh)?;
    let hash = data.auth.hash_refresh_token(cookie.value());
    let record = data.users.find_refresh(&hash).await?.ok_or_else(invalid_refresh)?;

    if record.revoked {
        let revoked = data.users.revoke_all_refresh(record.user_id).await?;
        log::warn!("⚠️ Refresh token reuse for user {}; revoked {revoked} token(s)", record.user_id);
        return Err(AppError::Unauthorized("Refresh token reuse detected".into()).into());
    }
    if record.expires_at <= Utc::now() {
        data.users.revoke_refresh(&hash).await?;
        return Err(invalid_refresh().into());
    }

    data.users.revoke_refresh(&hash).await?;
    let user = data.users.get_user(record.user_id).await?.ok_or_else(invalid_refresh)?;
    issue_session(&data, user, false).await
}

pub async fn logout(data: web::Data<AppState>, req: HttpRequest) -> ApiResult<HttpResponse> {
    if let Some(cookie) = req.cookie(REFRESH_COOKIE) {
        let hash = data.auth.hash_refresh_token(cookie.value());
        data.users.revoke_refresh(&hash).await?;
    }
    Ok(HttpResponse::Ok().cookie(removal_cookie(data.cookies.secure)).json(json!({ "message": "Logged out" })))
}
