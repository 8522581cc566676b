//! Issue persistence routes under `/api/issues`.

use actix_web::{web, HttpResponse};
use chrono::Utc;
use mj_core::error::AppError;
use mj_core::library::LibraryQuery;
use mj_core::models::IssueInput;
use mj_core::validation::{validate_issue, IssueCheck};
use serde_json::json;
use uuid::Uuid;

use super::{load_issue, parse_issue_id, AppState};
use crate::error::ApiResult;
use crate::session::Session;

/// How many issues the dashboard shows.
pub const LATEST_LIMIT: i64 = 3;

pub async fn create_issue(
    data: web::Data<AppState>,
    session: Session,
    body: web::Json<IssueInput>,
) -> ApiResult<HttpResponse> {
    let input = body.into_inner();
    validate_issue(&input, IssueCheck::Create)?;

    let issue = input.into_issue(Uuid::now_v7(), Utc::now());
    data.issues.create_issue(issue.clone()).await?;
    log::info!("📝 Issue {} created by {}", issue.id, session.email);

    Ok(HttpResponse::Created().json(issue))
}

/// Newest first, optionally searched, filtered by layout and re-sorted.
/// An unknown layout is rejected with 400.
pub async fn list_issues(data: web::Data<AppState>, query: web::Query<LibraryQuery>) -> ApiResult<HttpResponse> {
    let issues = data.issues.list_issues().await?;
    Ok(HttpResponse::Ok().json(query.apply(issues)?))
}

pub async fn latest_issues(data: web::Data<AppState>) -> ApiResult<HttpResponse> {
    let issues = data.issues.latest_issues(LATEST_LIMIT).await?;
    Ok(HttpResponse::Ok().json(issues))
}

pub async fn get_issue(data: web::Data<AppState>, path: web::Path<String>) -> ApiResult<HttpResponse> {
    let issue = load_issue(&data, &path).await?;
    Ok(HttpResponse::Ok().json(issue))
}

/// Full replace: fields missing from the body are cleared.
pub async fn update_issue(
    data: web::Data<AppState>,
    _session: Session,
    path: web::Path<String>,
    body: web::Json<IssueInput>,
) -> ApiResult<HttpResponse> {
    let input = body.into_inner();
    validate_issue(&input, IssueCheck::Replace)?;

    let existing = load_issue(&data, &path).await?;
    let updated = input.replace(&existing, Utc::now());
    if !data.issues.replace_issue(updated.clone()).await? {
        // deleted between the read and the write
        return Err(AppError::NotFound("Issue".into(), existing.id.to_string()).into());
    }

    Ok(HttpResponse::Ok().json(updated))
}

pub async fn delete_issue(
    data: web::Data<AppState>,
    session: Session,
    path: web::Path<String>,
) -> ApiResult<HttpResponse> {
    let id = parse_issue_id(&path)?;
    let deleted = data
        .issues
        .delete_issue(id)
        .await?
        .ok_or_else(|| AppError::NotFound("Issue".into(), id.to_string()))?;
    log::info!("🗑️ Issue {id} deleted by {}", session.email);

    Ok(HttpResponse::Ok().json(json!({ "message": "Issue deleted successfully", "issue": deleted })))
}
