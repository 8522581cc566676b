//! Shared fixtures: an in-memory store, the real auth and PDF plugins and
//! mocked AI/music ports.

#![allow(dead_code)]

use std::time::Duration;

use actix_web::web;
use chrono::Utc;
use mj_api::{AppState, CookiePolicy};
use mj_auth_jwt::JwtAuthProvider;
use mj_core::models::User;
use mj_core::traits::{MockMusicSearch, MockTextGenerator};
use mj_db_sqlite::SqliteJournalRepo;
use mj_export_pdf::PdfRenderer;
use serde_json::{json, Value};
use uuid::Uuid;

pub async fn state_with(ai: MockTextGenerator, music: MockMusicSearch) -> web::Data<AppState> {
    let repo = SqliteJournalRepo::new("sqlite::memory:").await.expect("in-memory store");
    web::Data::new(AppState {
        issues: Box::new(repo.clone()),
        users: Box::new(repo),
        auth: Box::new(JwtAuthProvider::new("integration-secret", 900, 7)),
        ai: Box::new(ai),
        music: Box::new(music),
        renderer: Box::new(PdfRenderer::new(Duration::from_secs(2)).expect("renderer")),
        cookies: CookiePolicy::default(),
    })
}

pub async fn state() -> web::Data<AppState> {
    state_with(MockTextGenerator::new(), MockMusicSearch::new()).await
}

/// Registers a user straight through the ports and returns a bearer header value.
pub async fn bearer(state: &web::Data<AppState>) -> String {
    let user = User {
        id: Uuid::now_v7(),
        name: "Test Author".into(),
        email: format!("author-{}@example.com", Uuid::now_v7().simple()),
        password_hash: state.auth.hash_password("password123").unwrap(),
        created_at: Utc::now(),
    };
    state.users.create_user(user.clone()).await.unwrap();
    format!("Bearer {}", state.auth.issue_access_token(&user).unwrap())
}

pub fn echoes_body() -> Value {
    json!({
        "title": "Echoes",
        "subtitle": "Sounds of the year",
        "volume": "2",
        "issueNumber": "5",
        "layout": "anime",
        "foreword": "Dear Reader,\n\nWelcome.",
        "reflections": "",
        "lessons": "**Lesson One**\nBe kind."
    })
}

/// Builds the full application around `state`.
macro_rules! app {
    ($state:expr) => {
        actix_web::test::init_service(
            actix_web::App::new()
                .app_data($state.clone())
                .configure(mj_api::configure_routes)
                .default_service(actix_web::web::to(mj_api::handlers::views::not_found)),
        )
        .await
    };
}
