//! # Core Traits (Ports)
//!
//! Any plugin must implement these traits to be used by the binary.

use async_trait::async_trait;
use uuid::Uuid;

use crate::error::Result;
use crate::export::{LaidOutDocument, PreparedImage, TextMeasure};
use crate::models::{Claims, Issue, MusicTrack, RefreshRecord, RefreshToken, User};

#[cfg(any(test, feature = "testing"))]
use mockall::automock;

/// Data persistence contract for issues.
#[cfg_attr(any(test, feature = "testing"), automock)]
#[async_trait]
pub trait IssueRepo: Send + Sync {
    async fn create_issue(&self, issue: Issue) -> anyhow::Result<()>;
    /// All issues, newest first.
    async fn list_issues(&self) -> anyhow::Result<Vec<Issue>>;
    /// The `limit` most recently created issues, newest first.
    async fn latest_issues(&self, limit: i64) -> anyhow::Result<Vec<Issue>>;
    async fn get_issue(&self, id: Uuid) -> anyhow::Result<Option<Issue>>;
    /// Overwrites every stored field. Returns `false` if the id is unknown.
    async fn replace_issue(&self, issue: Issue) -> anyhow::Result<bool>;
    /// Removes the issue and hands back what was stored.
    async fn delete_issue(&self, id: Uuid) -> anyhow::Result<Option<Issue>>;
}

/// Accounts and their refresh tokens.
#[cfg_attr(any(test, feature = "testing"), automock)]
#[async_trait]
pub trait UserRepo: Send + Sync {
    async fn create_user(&self, user: User) -> anyhow::Result<()>;
    /// Lookup is case-insensitive.
    async fn find_user_by_email(&self, email: &str) -> anyhow::Result<Option<User>>;
    async fn get_user(&self, id: Uuid) -> anyhow::Result<Option<User>>;

    async fn store_refresh(&self, record: RefreshRecord) -> anyhow::Result<()>;
    async fn find_refresh(&self, token_hash: &str) -> anyhow::Result<Option<RefreshRecord>>;
    /// Returns `false` if no such token was stored.
    async fn revoke_refresh(&self, token_hash: &str) -> anyhow::Result<bool>;
    async fn revoke_all_refresh(&self, user_id: Uuid) -> anyhow::Result<u64>;
}

/// Identity contract: password hashing and token minting.
#[async_trait]
pub trait AuthProvider: Send + Sync {
    fn hash_password(&self, password: &str) -> anyhow::Result<String>;

    /// Verifies a password against a stored hash.
    async fn verify_password(&self, password: &str, hash: &str) -> bool;

    /// Short-lived bearer token for `user`.
    fn issue_access_token(&self, user: &User) -> anyhow::Result<String>;

    /// Checks signature and expiry.
    fn verify_access_token(&self, token: &str) -> Result<Claims>;

    /// Long-lived opaque token for the refresh cookie.
    fn mint_refresh_token(&self) -> RefreshToken;

    /// Digest under which a presented refresh token is looked up.
    fn hash_refresh_token(&self, plain: &str) -> String;

    /// Seconds an access token stays valid.
    fn access_ttl_secs(&self) -> i64;
}

/// Generative text backend behind the AI proxy routes.
#[cfg_attr(any(test, feature = "testing"), automock)]
#[async_trait]
pub trait TextGenerator: Send + Sync {
    /// Returns the trimmed, non-empty completion for `prompt`.
    async fn complete(&self, prompt: &str) -> Result<String>;
    fn is_configured(&self) -> bool;
}

/// Track catalogue behind the music proxy route.
#[cfg_attr(any(test, feature = "testing"), automock)]
#[async_trait]
pub trait MusicSearch: Send + Sync {
    async fn search(&self, query: &str) -> Result<Vec<MusicTrack>>;
}

/// Output medium for the paginated export: measures glyphs, loads images
/// and serializes laid-out pages into bytes.
#[async_trait]
pub trait DocumentRenderer: TextMeasure + Send + Sync {
    /// Decodes a data URI or fetches a remote image, ready for embedding.
    async fn load_image(&self, reference: &str) -> anyhow::Result<PreparedImage>;

    fn render(&self, doc: &LaidOutDocument, images: &[PreparedImage]) -> anyhow::Result<Vec<u8>>;

    /// MIME type of what `render` produces.
    fn content_type(&self) -> &'static str;
}

/// Stand-ins used when a plugin is compiled out or not configured.
pub mod unavailable {
    use super::*;
    use crate::error::AppError;

    pub struct NoTextGenerator;

    #[async_trait]
    impl TextGenerator for NoTextGenerator {
        async fn complete(&self, _prompt: &str) -> Result<String> {
            Err(AppError::Upstream("text generation is not configured".into()))
        }

        fn is_configured(&self) -> bool {
            false
        }
    }

    pub struct NoMusicSearch;

    #[async_trait]
    impl MusicSearch for NoMusicSearch {
        async fn search(&self, _query: &str) -> Result<Vec<MusicTrack>> {
            Err(AppError::Upstream("music search is not configured".into()))
        }
    }
}
