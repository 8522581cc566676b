//! Server-rendered HTML pages.

use actix_web::http::StatusCode;
use actix_web::{web, HttpRequest, HttpResponse};
use askama::Template;
use mj_core::error::AppError;
use mj_core::library::LibraryQuery;
use mj_core::pages::segment;
use mj_ui::{DashboardTemplate, LibraryTemplate, NotFoundTemplate, ViewerTemplate};
use serde::Deserialize;
use serde_json::json;

use super::issues::LATEST_LIMIT;
use super::{load_issue, AppState};
use crate::error::ApiResult;

/// `?page=` is taken as typed; anything that is not a page index opens the cover.
#[derive(Debug, Default, Deserialize)]
pub struct ViewerQuery {
    #[serde(default)]
    pub page: Option<String>,
}

impl ViewerQuery {
    /// Zero-based page index; negatives and garbage fall back to 0, and the
    /// template clamps past-the-end values.
    pub fn index(&self) -> usize {
        self.page
            .as_deref()
            .and_then(|p| p.trim().parse::<i64>().ok())
            .map_or(0, |n| usize::try_from(n).unwrap_or(0))
    }
}

fn html(status: StatusCode, template: &impl Template) -> ApiResult<HttpResponse> {
    let body = template.render().map_err(|e| AppError::Internal(format!("Template rendering failed: {e}")))?;
    Ok(HttpResponse::build(status).content_type("text/html; charset=utf-8").body(body))
}

pub async fn dashboard(data: web::Data<AppState>) -> ApiResult<HttpResponse> {
    let latest = data.issues.latest_issues(LATEST_LIMIT).await?;
    html(StatusCode::OK, &DashboardTemplate::new(&latest))
}

pub async fn library(data: web::Data<AppState>, query: web::Query<LibraryQuery>) -> ApiResult<HttpResponse> {
    let query = query.into_inner().lenient();
    let issues = query.apply(data.issues.list_issues().await?)?;
    html(StatusCode::OK, &LibraryTemplate::new(&issues, &query))
}

/// Flip-book view of one issue; unknown issues get the HTML not-found page.
pub async fn viewer(
    data: web::Data<AppState>,
    path: web::Path<String>,
    query: web::Query<ViewerQuery>,
) -> ApiResult<HttpResponse> {
    let issue = match load_issue(&data, &path).await {
        Ok(issue) => issue,
        Err(AppError::NotFound(..)) => {
            return html(StatusCode::NOT_FOUND, &NotFoundTemplate::new("This issue does not exist or was deleted."))
        }
        Err(e) => return Err(e.into()),
    };
    let pages = segment(&issue);
    html(StatusCode::OK, &ViewerTemplate::new(&issue, &pages, query.index()))
}

/// Fallback for unmatched routes: JSON under `/api`, HTML elsewhere.
pub async fn not_found(req: HttpRequest) -> ApiResult<HttpResponse> {
    if req.path().starts_with("/api") {
        return Ok(HttpResponse::NotFound().json(json!({ "error": "Not found" })));
    }
    html(StatusCode::NOT_FOUND, &NotFoundTemplate::new("We couldn't find that page."))
}
