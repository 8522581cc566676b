//! # mj-music-deezer
//!
//! Track search against the public Deezer catalogue, implementing `MusicSearch`.
//! Only the fields an issue needs survive the mapping to `MusicTrack`.

use std::time::Duration;

use async_trait::async_trait;
use mj_core::error::{AppError, Result};
use mj_core::models::MusicTrack;
use mj_core::traits::MusicSearch;
use reqwest::Client;
use serde::Deserialize;

/// Query used when the caller sends none.
pub const DEFAULT_QUERY: &str = "lofi";

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum SearchResponse {
    Error { error: DeezerError },
    Tracks { data: Vec<DeezerTrack> },
}

#[derive(Debug, Deserialize)]
struct DeezerError {
    #[serde(default)]
    message: String,
}

#[derive(Debug, Deserialize)]
struct DeezerTrack {
    id: u64,
    title: String,
    preview: Option<String>,
    artist: DeezerArtist,
    album: Option<DeezerAlbum>,
}

#[derive(Debug, Deserialize)]
struct DeezerArtist {
    name: String,
}

#[derive(Debug, Deserialize)]
struct DeezerAlbum {
    cover_medium: Option<String>,
}

impl From<DeezerTrack> for MusicTrack {
    fn from(t: DeezerTrack) -> Self {
        MusicTrack {
            id: t.id,
            title: t.title,
            artist_name: t.artist.name,
            cover_url: t.album.and_then(|a| a.cover_medium).filter(|u| !u.is_empty()),
            preview_url: t.preview.filter(|u| !u.is_empty()),
        }
    }
}

fn parse_tracks(body: &str) -> Result<Vec<MusicTrack>> {
    match serde_json::from_str::<SearchResponse>(body) {
        Ok(SearchResponse::Tracks { data }) => Ok(data.into_iter().map(MusicTrack::from).collect()),
        Ok(SearchResponse::Error { error }) => {
            Err(AppError::Upstream(format!("Deezer rejected the search: {}", error.message)))
        }
        Err(e) => Err(AppError::Upstream(format!("Invalid response format from Deezer: {e}"))),
    }
}

pub struct DeezerClient {
    client: Client,
    base_url: String,
}

impl DeezerClient {
    pub fn new(base_url: &str, timeout: Duration) -> anyhow::Result<Self> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self { client, base_url: base_url.trim_end_matches('/').to_string() })
    }
}

#[async_trait]
impl MusicSearch for DeezerClient {
    async fn search(&self, query: &str) -> Result<Vec<MusicTrack>> {
        let query = match query.trim() {
            "" => DEFAULT_QUERY,
            q => q,
        };
        let url = format!("{}/search", self.base_url);
        log::debug!("GET {url}?q={query}");

        let response = self
            .client
            .get(&url)
            .query(&[("q", query)])
            .send()
            .await
            .and_then(|r| r.error_for_status())
            .map_err(|e| {
                log::error!("❌ Music search error: {e}");
                AppError::Upstream("Failed to fetch from Deezer API".into())
            })?;

        let body = response
            .text()
            .await
            .map_err(|e| AppError::Upstream(format!("Failed to read Deezer response: {e}")))?;
        parse_tracks(&body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tracks_are_mapped() {
        let body = r#"{"data":[
            {"id":3135556,"title":"Harder, Better, Faster, Stronger","preview":"https://cdn.example/p.mp3",
             "artist":{"id":27,"name":"Daft Punk"},"album":{"cover_medium":"https://cdn.example/c.jpg"},"rank":900000},
            {"id":7,"title":"Quiet","preview":"","artist":{"name":"Nobody"}}
        ],"total":2}"#;
        let tracks = parse_tracks(body).unwrap();
        assert_eq!(tracks.len(), 2);
        assert_eq!(tracks[0].artist_name, "Daft Punk");
        assert_eq!(tracks[0].cover_url.as_deref(), Some("https://cdn.example/c.jpg"));
        assert_eq!(tracks[1].preview_url, None);
        assert_eq!(tracks[1].cover_url, None);
    }

    #[test]
    fn test_error_payload_and_garbage_are_upstream_errors() {
        let body = r#"{"error":{"type":"DataException","message":"no data","code":800}}"#;
        assert!(matches!(parse_tracks(body), Err(AppError::Upstream(m)) if m.contains("no data")));
        assert!(matches!(parse_tracks("[1,2]"), Err(AppError::Upstream(_))));
    }

    #[test]
    fn test_empty_result_is_ok() {
        assert!(parse_tracks(r#"{"data":[],"total":0}"#).unwrap().is_empty());
    }
}
