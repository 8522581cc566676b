//! Text generation proxy under `/api/gemini`. Every route needs a session.

use actix_web::{web, HttpResponse};
use futures_util::future::try_join3;
use mj_core::prompts::{self, ContentKind, PromptContext};
use serde::Deserialize;
use serde_json::json;

use super::AppState;
use crate::error::ApiResult;
use crate::session::Session;

#[derive(Debug, Deserialize)]
pub struct ContentRequest {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(flatten)]
    pub context: PromptContext,
}

pub async fn generate_title(data: web::Data<AppState>, _session: Session) -> ApiResult<HttpResponse> {
    let title = data.ai.complete(&prompts::title_prompt()).await?;
    Ok(HttpResponse::Ok().json(json!({ "data": { "title": title } })))
}

pub async fn generate_subtitle(
    data: web::Data<AppState>,
    _session: Session,
    body: web::Json<PromptContext>,
) -> ApiResult<HttpResponse> {
    let subtitle = data.ai.complete(&prompts::subtitle_prompt(&body)).await?;
    Ok(HttpResponse::Ok().json(json!({ "data": { "subtitle": subtitle } })))
}

pub async fn generate_content(
    data: web::Data<AppState>,
    _session: Session,
    body: web::Json<ContentRequest>,
) -> ApiResult<HttpResponse> {
    let kind: ContentKind = body.kind.parse()?;
    let content = data.ai.complete(&prompts::content_prompt(kind, &body.context)).await?;
    Ok(HttpResponse::Ok().json(json!({ "data": { "content": content } })))
}

/// Generates the three sections concurrently; any failure fails the whole call.
pub async fn generate_all(
    data: web::Data<AppState>,
    _session: Session,
    body: web::Json<PromptContext>,
) -> ApiResult<HttpResponse> {
    let [foreword, reflections, lessons] = ContentKind::ALL.map(|kind| prompts::content_prompt(kind, &body));
    let (foreword, reflections, lessons) =
        try_join3(data.ai.complete(&foreword), data.ai.complete(&reflections), data.ai.complete(&lessons)).await?;

    Ok(HttpResponse::Ok().json(json!({
        "data": { "foreword": foreword, "reflections": reflections, "lessons": lessons }
    })))
}

pub async fn generate_image_description(
    data: web::Data<AppState>,
    _session: Session,
    body: web::Json<PromptContext>,
) -> ApiResult<HttpResponse> {
    let description = data.ai.complete(&prompts::image_description_prompt(&body)).await?;
    Ok(HttpResponse::Ok().json(json!({ "data": { "description": description } })))
}
