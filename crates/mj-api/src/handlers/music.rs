//! Music search proxy.

use actix_web::{web, HttpResponse};
use serde::Deserialize;
use serde_json::json;

use super::AppState;
use crate::error::ApiResult;

/// Query used when the caller sends none.
pub const DEFAULT_QUERY: &str = "lofi";

#[derive(Debug, Default, Deserialize)]
pub struct MusicQuery {
    pub q: Option<String>,
}

pub async fn search_music(data: web::Data<AppState>, query: web::Query<MusicQuery>) -> ApiResult<HttpResponse> {
    let q = query.q.as_deref().map(str::trim).filter(|q| !q.is_empty()).unwrap_or(DEFAULT_QUERY);
    let tracks = data.music.search(q).await?;
    log::debug!("Music search '{q}' returned {} track(s)", tracks.len());
    Ok(HttpResponse::Ok().json(json!({ "data": tracks })))
}
