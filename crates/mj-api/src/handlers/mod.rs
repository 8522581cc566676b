//! # mj-api Handlers
//!
//! This module coordinates the flow between HTTP requests and Core traits.

pub mod ai;
pub mod auth;
pub mod export;
pub mod health;
pub mod issues;
pub mod music;
pub mod views;

use mj_core::error::AppError;
use mj_core::models::Issue;
use mj_core::traits::{AuthProvider, DocumentRenderer, IssueRepo, MusicSearch, TextGenerator, UserRepo};
use uuid::Uuid;

/// Refresh-cookie behaviour.
#[derive(Debug, Clone, Copy, Default)]
pub struct CookiePolicy {
    /// Adds the `Secure` attribute; enable behind HTTPS.
    pub secure: bool,
}

/// State shared across all Actix-web workers.
pub struct AppState {
    pub issues: Box<dyn IssueRepo>,
    pub users: Box<dyn UserRepo>,
    pub auth: Box<dyn AuthProvider>,
    pub ai: Box<dyn TextGenerator>,
    pub music: Box<dyn MusicSearch>,
    pub renderer: Box<dyn DocumentRenderer>,
    pub cookies: CookiePolicy,
}

/// Parses an issue id from the path; ids that cannot exist are simply not found.
pub(crate) fn parse_issue_id(raw: &str) -> Result<Uuid, AppError> {
    Uuid::parse_str(raw.trim()).map_err(|_| AppError::NotFound("Issue".into(), raw.to_string()))
}

pub(crate) async fn load_issue(state: &AppState, raw_id: &str) -> Result<Issue, AppError> {
    let id = parse_issue_id(raw_id)?;
    state.issues.get_issue(id).await?.ok_or_else(|| AppError::NotFound("Issue".into(), id.to_string()))
}
