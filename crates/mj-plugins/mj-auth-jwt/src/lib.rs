//! # mj-auth-jwt
//!
//! Argon2 + HS256 JWT implementation of `AuthProvider`.
//! Passwords are hashed with Argon2id, access tokens are short-lived JWTs and
//! refresh tokens are opaque random strings of which only the SHA-256 is stored.

use argon2::{
    password_hash::{
        rand_core::{OsRng, RngCore},
        PasswordHash, PasswordHasher, PasswordVerifier, SaltString,
    },
    Argon2,
};
use async_trait::async_trait;
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use mj_core::error::{AppError, Result};
use mj_core::models::{Claims, RefreshToken, User};
use mj_core::traits::AuthProvider;
use sha2::{Digest, Sha256};

const REFRESH_TOKEN_BYTES: usize = 32;

pub struct JwtAuthProvider {
    encoding: EncodingKey,
    decoding: DecodingKey,
    access_ttl_secs: i64,
    refresh_ttl: Duration,
}

impl JwtAuthProvider {
    /// Accepts the signing secret (e.g., from the settings) and token lifetimes.
    pub fn new(secret: &str, access_ttl_secs: i64, refresh_ttl_days: i64) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            access_ttl_secs,
            refresh_ttl: Duration::days(refresh_ttl_days),
        }
    }

    fn validation() -> Validation {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;
        validation.set_required_spec_claims(&["exp", "sub"]);
        validation
    }
}

#[async_trait]
impl AuthProvider for JwtAuthProvider {
    fn hash_password(&self, password: &str) -> anyhow::Result<String> {
        let salt = SaltString::generate(&mut OsRng);
        let hash = Argon2::default()
            .hash_password(password.as_bytes(), &salt)
            .map_err(|e| anyhow::anyhow!("Failed to hash password: {e}"))?;
        Ok(hash.to_string())
    }

    /// Verifies if a provided password matches a stored Argon2 hash.
    async fn verify_password(&self, password: &str, hash: &str) -> bool {
        let parsed_hash = match PasswordHash::new(hash) {
            Ok(p) => p,
            Err(_) => return false,
        };
        Argon2::default()
            .verify_password(password.as_bytes(), &parsed_hash)
            .is_ok()
    }

    fn issue_access_token(&self, user: &User) -> anyhow::Result<String> {
        let now = Utc::now().timestamp();
        let claims = Claims { sub: user.id, email: user.email.clone(), iat: now, exp: now + self.access_ttl_secs };
        Ok(encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)?)
    }

    fn verify_access_token(&self, token: &str) -> Result<Claims> {
        decode::<Claims>(token, &self.decoding, &Self::validation())
            .map(|data| data.claims)
            .map_err(|e| {
                log::debug!("Rejected access token: {e}");
                AppError::Unauthorized("Invalid or expired token".into())
            })
    }

    /// Generates 32 random bytes, hex-encoded for the cookie.
    fn mint_refresh_token(&self) -> RefreshToken {
        let mut bytes = [0u8; REFRESH_TOKEN_BYTES];
        OsRng.fill_bytes(&mut bytes);
        let plain = hex::encode(bytes);
        let hash = self.hash_refresh_token(&plain);
        RefreshToken { plain, hash, expires_at: Utc::now() + self.refresh_ttl }
    }

    fn hash_refresh_token(&self, plain: &str) -> String {
        let mut hasher = Sha256::new();
        hasher.update(plain.as_bytes());
        hex::encode(hasher.finalize())
    }

    fn access_ttl_secs(&self) -> i64 {
        self.access_ttl_secs
    }
}
