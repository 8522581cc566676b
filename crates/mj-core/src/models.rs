//! # Domain Models
//!
//! These structs represent the core entities of the Magazine Journal.
//! We use UUID v7 for time-ordered, globally unique identification.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Visual theme an issue is published in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Layout {
    Anime,
    #[default]
    Retro,
    Fashion,
}

impl Layout {
    pub const ALL: [Layout; 3] = [Layout::Anime, Layout::Retro, Layout::Fashion];

    pub fn as_str(&self) -> &'static str {
        match self {
            Layout::Anime => "anime",
            Layout::Retro => "retro",
            Layout::Fashion => "fashion",
        }
    }
}

impl fmt::Display for Layout {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Layout {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "anime" => Ok(Layout::Anime),
            "retro" => Ok(Layout::Retro),
            "fashion" => Ok(Layout::Fashion),
            other => Err(format!("unknown layout '{other}'")),
        }
    }
}

/// Background music attached to an issue.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MusicTrack {
    pub id: u64,
    pub title: String,
    pub artist_name: String,
    pub cover_url: Option<String>,
    /// 30 second preview clip
    pub preview_url: Option<String>,
}

/// One published or draft magazine issue.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Issue {
    pub id: Uuid,
    pub title: String,
    pub subtitle: Option<String>,
    /// Positive integer kept in its submitted textual form
    pub volume: String,
    pub issue_number: String,
    pub layout: Layout,
    pub foreword: Option<String>,
    pub reflections: Option<String>,
    pub lessons: Option<String>,
    /// Data URIs or remote URLs, in display order
    pub images: Vec<String>,
    pub music_track: Option<MusicTrack>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// The author-submitted part of an issue, used for both create and full replace.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct IssueInput {
    pub title: String,
    pub subtitle: Option<String>,
    pub volume: String,
    pub issue_number: String,
    pub layout: Layout,
    pub foreword: Option<String>,
    pub reflections: Option<String>,
    pub lessons: Option<String>,
    pub images: Vec<String>,
    pub music_track: Option<MusicTrack>,
}

impl IssueInput {
    /// Builds a fresh issue stamped with the given time.
    pub fn into_issue(self, id: Uuid, now: DateTime<Utc>) -> Issue {
        Issue {
            id,
            title: self.title.trim().to_string(),
            subtitle: non_blank(self.subtitle),
            volume: self.volume.trim().to_string(),
            issue_number: self.issue_number.trim().to_string(),
            layout: self.layout,
            foreword: non_blank(self.foreword),
            reflections: non_blank(self.reflections),
            lessons: non_blank(self.lessons),
            images: self.images,
            music_track: self.music_track,
            created_at: now,
            updated_at: now,
        }
    }

    /// Full replace of `existing`, keeping its identity and creation time.
    pub fn replace(self, existing: &Issue, now: DateTime<Utc>) -> Issue {
        let mut issue = self.into_issue(existing.id, now);
        issue.created_at = existing.created_at;
        issue
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

impl Issue {
    /// `true` if at least one of foreword, reflections, lessons has text.
    pub fn has_content(&self) -> bool {
        [&self.foreword, &self.reflections, &self.lessons]
            .iter()
            .any(|s| s.as_deref().is_some_and(|t| !t.trim().is_empty()))
    }
}

/// A registered author.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
}

/// A stored refresh token. Only the SHA-256 of the token is kept.
#[derive(Debug, Clone, PartialEq)]
pub struct RefreshRecord {
    pub token_hash: String,
    pub user_id: Uuid,
    pub expires_at: DateTime<Utc>,
    pub revoked: bool,
}

/// Claims carried by a verified access token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// User id
    pub sub: Uuid,
    pub email: String,
    pub iat: i64,
    pub exp: i64,
}

/// A freshly minted refresh token; `plain` goes to the cookie, `hash` to the store.
#[derive(Debug, Clone)]
pub struct RefreshToken {
    pub plain: String,
    pub hash: String,
    pub expires_at: DateTime<Utc>,
}
