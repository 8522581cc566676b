//! # mj-api
//!
//! The web routing and orchestration layer for Magazine Journal.

pub mod error;
pub mod handlers;
pub mod middleware;
pub mod session;

use actix_web::{web, HttpRequest};
use mj_core::error::AppError;

pub use error::{ApiError, ApiResult};
pub use handlers::{AppState, CookiePolicy};
pub use session::Session;

/// Largest accepted JSON body; issues carry their images as data URIs.
pub const JSON_LIMIT: usize = 10 * 1024 * 1024;

fn bad_json(err: actix_web::error::JsonPayloadError, _req: &HttpRequest) -> actix_web::Error {
    ApiError(AppError::ValidationError(format!("Invalid request body: {err}"))).into()
}

fn bad_query(err: actix_web::error::QueryPayloadError, _req: &HttpRequest) -> actix_web::Error {
    ApiError(AppError::ValidationError(format!("Invalid query string: {err}"))).into()
}

/// Configures the JSON API under `/api` and the HTML pages.
///
/// `/api/issues/latest` is registered before `/api/issues/{id}` so it is not
/// taken for an id.
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    use handlers::{ai, auth, export, health, issues, music, views};

    cfg.app_data(web::JsonConfig::default().limit(JSON_LIMIT).error_handler(bad_json))
        .app_data(web::QueryConfig::default().error_handler(bad_query))
        .service(
            web::scope("/api")
                .route("/health", web::get().to(health::health))
                .service(
                    web::scope("/auth")
                        .route("/signup", web::post().to(auth::signup))
                        .route("/login", web::post().to(auth::login))
                        .route("/refresh", web::post().to(auth::refresh))
                        .route("/logout", web::post().to(auth::logout)),
                )
                .service(
                    web::scope("/issues")
                        .route("", web::get().to(issues::list_issues))
                        .route("", web::post().to(issues::create_issue))
                        .route("/latest", web::get().to(issues::latest_issues))
                        .route("/{id}", web::get().to(issues::get_issue))
                        .route("/{id}", web::put().to(issues::update_issue))
                        .route("/{id}", web::delete().to(issues::delete_issue))
                        .route("/{id}/export", web::get().to(export::export_issue)),
                )
                .service(
                    web::scope("/gemini")
                        .route("/generate-title", web::post().to(ai::generate_title))
                        .route("/generate-subtitle", web::post().to(ai::generate_subtitle))
                        .route("/generate-content", web::post().to(ai::generate_content))
                        .route("/generate-all", web::post().to(ai::generate_all))
                        .route("/generate-image-description", web::post().to(ai::generate_image_description)),
                )
                .route("/music/search", web::get().to(music::search_music))
                .default_service(web::to(views::not_found)),
        )
        .route("/", web::get().to(views::dashboard))
        .route("/library", web::get().to(views::library))
        .route("/view/{id}", web::get().to(views::viewer));
}
