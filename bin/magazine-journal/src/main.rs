//! # Magazine Journal Binary
//!
//! The entry point that assembles the application based on compile-time features.

use std::time::Duration;

use actix_web::{web, App, HttpServer};
use mj_api::handlers::views;
use mj_api::middleware::{cors_policy, security_headers, standard_middleware};
use mj_api::{AppState, CookiePolicy};
use mj_auth_jwt::JwtAuthProvider;
use mj_config::{ExposeSecret, Settings};
use mj_core::traits::{MusicSearch, TextGenerator};
use mj_db_sqlite::SqliteJournalRepo;
use mj_export_pdf::PdfRenderer;

#[cfg(feature = "ai-gemini")]
use mj_gemini::{GeminiClient, GeminiConfig};

#[cfg(feature = "music-deezer")]
use mj_music_deezer::DeezerClient;

/// Remote images referenced by an issue get this long to download during export.
const IMAGE_FETCH_TIMEOUT: Duration = Duration::from_secs(15);

#[cfg(feature = "ai-gemini")]
fn text_generator(settings: &Settings) -> anyhow::Result<Box<dyn TextGenerator>> {
    let gemini = &settings.gemini;
    let client = GeminiClient::new(GeminiConfig {
        api_key: gemini.api_key.as_ref().map(|k| k.expose_secret().to_string()),
        model: gemini.model.clone(),
        base_url: gemini.base_url.clone(),
        timeout: Duration::from_secs(gemini.timeout_secs),
    })?;
    if !client.is_configured() {
        log::warn!("⚠️ GEMINI_API_KEY is not set; generation routes will answer 502");
    }
    Ok(Box::new(client))
}

#[cfg(not(feature = "ai-gemini"))]
fn text_generator(_settings: &Settings) -> anyhow::Result<Box<dyn TextGenerator>> {
    Ok(Box::new(mj_core::traits::unavailable::NoTextGenerator))
}

#[cfg(feature = "music-deezer")]
fn music_search(settings: &Settings) -> anyhow::Result<Box<dyn MusicSearch>> {
    let deezer = &settings.deezer;
    Ok(Box::new(DeezerClient::new(&deezer.base_url, Duration::from_secs(deezer.timeout_secs))?))
}

#[cfg(not(feature = "music-deezer"))]
fn music_search(_settings: &Settings) -> anyhow::Result<Box<dyn MusicSearch>> {
    Ok(Box::new(mj_core::traits::unavailable::NoMusicSearch))
}

async fn build_state(settings: &Settings) -> anyhow::Result<AppState> {
    // 1. Storage
    let repo = SqliteJournalRepo::connect(&settings.database.url, settings.database.max_connections).await?;
    log::info!("🗄️ Database ready at {}", settings.database.url);

    // 2. Auth
    let auth = &settings.auth;
    let provider =
        JwtAuthProvider::new(auth.jwt_secret.expose_secret(), auth.access_ttl_secs, auth.refresh_ttl_days);

    // 3. Outbound services and the document renderer
    Ok(AppState {
        issues: Box::new(repo.clone()),
        users: Box::new(repo),
        auth: Box::new(provider),
        ai: text_generator(settings)?,
        music: music_search(settings)?,
        renderer: Box::new(PdfRenderer::new(IMAGE_FETCH_TIMEOUT)?),
        cookies: CookiePolicy { secure: auth.secure_cookie },
    })
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));

    let settings = Settings::load().map_err(|e| std::io::Error::other(format!("{e:#}")))?;
    if settings.uses_dev_secret() {
        log::warn!("⚠️ Using the built-in development JWT secret; set MJ__AUTH__JWT_SECRET in production");
    }

    let state = web::Data::new(build_state(&settings).await.map_err(|e| std::io::Error::other(format!("{e:#}")))?);
    let cors_origin = settings.server.cors_origin.clone();
    let static_dir = settings.server.static_dir.clone();
    let (host, port) = settings.bind_address();

    log::info!("🚀 Magazine Journal starting on http://{host}:{port}");

    HttpServer::new(move || {
        App::new()
            .app_data(state.clone())
            .wrap(security_headers())
            .wrap(cors_policy(cors_origin.as_deref()))
            .wrap(standard_middleware())
            .configure(mj_api::configure_routes)
            .service(actix_files::Files::new("/static", &static_dir))
            .default_service(web::to(views::not_found))
    })
    .bind((host, port))?
    .run()
    .await
}
