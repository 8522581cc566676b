//! # mj-db-sqlite Implementation
//!
//! This module implements the data mapping between the SQLite relational model
//! and the `mj-core` domain models. Ids are stored as 16-byte BLOBs; the image
//! list and the music track are stored as JSON text.

use std::str::FromStr;

use anyhow::Context;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use mj_core::error::AppError;
use mj_core::models::{Issue, Layout, MusicTrack, RefreshRecord, User};
use mj_core::traits::{IssueRepo, UserRepo};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions, SqliteRow};
use sqlx::Row;
use uuid::Uuid;

const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS issues (
    id           BLOB PRIMARY KEY NOT NULL,
    title        TEXT NOT NULL,
    subtitle     TEXT,
    volume       TEXT NOT NULL,
    issue_number TEXT NOT NULL,
    layout       TEXT NOT NULL DEFAULT 'retro',
    foreword     TEXT,
    reflections  TEXT,
    lessons      TEXT,
    images       TEXT NOT NULL DEFAULT '[]',
    music_track  TEXT,
    created_at   TEXT NOT NULL,
    updated_at   TEXT NOT NULL
);
CREATE INDEX IF NOT EXISTS idx_issues_created_at ON issues (created_at DESC);

CREATE TABLE IF NOT EXISTS users (
    id            BLOB PRIMARY KEY NOT NULL,
    name          TEXT NOT NULL,
    email         TEXT NOT NULL UNIQUE COLLATE NOCASE,
    password_hash TEXT NOT NULL,
    created_at    TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS refresh_tokens (
    token_hash TEXT PRIMARY KEY NOT NULL,
    user_id    BLOB NOT NULL REFERENCES users (id) ON DELETE CASCADE,
    expires_at TEXT NOT NULL,
    revoked    INTEGER NOT NULL DEFAULT 0
);
CREATE INDEX IF NOT EXISTS idx_refresh_user ON refresh_tokens (user_id);
"#;

const ISSUE_COLUMNS: &str = "id, title, subtitle, volume, issue_number, layout, foreword, reflections, \
                             lessons, images, music_track, created_at, updated_at";

#[derive(Clone)]
pub struct SqliteJournalRepo {
    pool: SqlitePool,
}

// Helper for UUID conversion
fn uuid_to_blob(id: Uuid) -> Vec<u8> {
    id.as_bytes().to_vec()
}

fn blob_to_uuid(blob: &[u8]) -> anyhow::Result<Uuid> {
    Uuid::from_slice(blob).context("Corrupt id column")
}

impl SqliteJournalRepo {
    /// Connects with a pool of `max_connections` and creates the schema.
    ///
    /// In-memory URLs are pinned to a single long-lived connection, since
    /// every new connection would see its own empty database.
    pub async fn connect(url: &str, max_connections: u32) -> anyhow::Result<Self> {
        let options = SqliteConnectOptions::from_str(url)
            .with_context(|| format!("Invalid database url '{url}'"))?
            .create_if_missing(true)
            .foreign_keys(true);

        let in_memory = url.contains(":memory:") || url.contains("mode=memory");
        let pool_options = if in_memory {
            SqlitePoolOptions::new().max_connections(1).idle_timeout(None).max_lifetime(None)
        } else {
            SqlitePoolOptions::new().max_connections(max_connections.max(1))
        };

        let pool = pool_options.connect_with(options).await.context("Failed to open SQLite database")?;
        sqlx::raw_sql(SCHEMA).execute(&pool).await.context("Failed to create schema")?;
        log::info!("📦 SQLite store ready ({url})");
        Ok(Self { pool })
    }

    pub async fn new(url: &str) -> anyhow::Result<Self> {
        Self::connect(url, 5).await
    }
}

fn issue_from_row(row: &SqliteRow) -> anyhow::Result<Issue> {
    let layout: String = row.try_get("layout")?;
    let images: String = row.try_get("images")?;
    let music: Option<String> = row.try_get("music_track")?;

    Ok(Issue {
        id: blob_to_uuid(row.try_get::<Vec<u8>, _>("id")?.as_slice())?,
        title: row.try_get("title")?,
        subtitle: row.try_get("subtitle")?,
        volume: row.try_get("volume")?,
        issue_number: row.try_get("issue_number")?,
        layout: Layout::from_str(&layout).unwrap_or_else(|e| {
            log::warn!("{e}; falling back to the default layout");
            Layout::default()
        }),
        foreword: row.try_get("foreword")?,
        reflections: row.try_get("reflections")?,
        lessons: row.try_get("lessons")?,
        images: serde_json::from_str(&images).context("Corrupt images column")?,
        music_track: music
            .map(|m| serde_json::from_str::<MusicTrack>(&m))
            .transpose()
            .context("Corrupt music_track column")?,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}

fn user_from_row(row: &SqliteRow) -> anyhow::Result<User> {
    Ok(User {
        id: blob_to_uuid(row.try_get::<Vec<u8>, _>("id")?.as_slice())?,
        name: row.try_get("name")?,
        email: row.try_get("email")?,
        password_hash: row.try_get("password_hash")?,
        created_at: row.try_get("created_at")?,
    })
}

fn music_json(track: &Option<MusicTrack>) -> anyhow::Result<Option<String>> {
    Ok(track.as_ref().map(serde_json::to_string).transpose()?)
}

#[async_trait]
impl IssueRepo for SqliteJournalRepo {
    async fn create_issue(&self, issue: Issue) -> anyhow::Result<()> {
        sqlx::query(&format!(
            "INSERT INTO issues ({ISSUE_COLUMNS}) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)"
        ))
        .bind(uuid_to_blob(issue.id))
        .bind(&issue.title)
        .bind(&issue.subtitle)
        .bind(&issue.volume)
        .bind(&issue.issue_number)
        .bind(issue.layout.as_str())
        .bind(&issue.foreword)
        .bind(&issue.reflections)
        .bind(&issue.lessons)
        .bind(serde_json::to_string(&issue.images)?)
        .bind(music_json(&issue.music_track)?)
        .bind(issue.created_at)
        .bind(issue.updated_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn list_issues(&self) -> anyhow::Result<Vec<Issue>> {
        let rows = sqlx::query(&format!("SELECT {ISSUE_COLUMNS} FROM issues ORDER BY created_at DESC, id DESC"))
            .fetch_all(&self.pool)
            .await?;
        rows.iter().map(issue_from_row).collect()
    }

    async fn latest_issues(&self, limit: i64) -> anyhow::Result<Vec<Issue>> {
        let rows = sqlx::query(&format!(
            "SELECT {ISSUE_COLUMNS} FROM issues ORDER BY created_at DESC, id DESC LIMIT ?"
        ))
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;
        rows.iter().map(issue_from_row).collect()
    }

    async fn get_issue(&self, id: Uuid) -> anyhow::Result<Option<Issue>> {
        let row = sqlx::query(&format!("SELECT {ISSUE_COLUMNS} FROM issues WHERE id = ?"))
            .bind(uuid_to_blob(id))
            .fetch_optional(&self.pool)
            .await?;
        row.as_ref().map(issue_from_row).transpose()
    }

    async fn replace_issue(&self, issue: Issue) -> anyhow::Result<bool> {
        let result = sqlx::query(
            "UPDATE issues SET title = ?, subtitle = ?, volume = ?, issue_number = ?, layout = ?, \
             foreword = ?, reflections = ?, lessons = ?, images = ?, music_track = ?, updated_at = ? \
             WHERE id = ?",
        )
        .bind(&issue.title)
        .bind(&issue.subtitle)
        .bind(&issue.volume)
        .bind(&issue.issue_number)
        .bind(issue.layout.as_str())
        .bind(&issue.foreword)
        .bind(&issue.reflections)
        .bind(&issue.lessons)
        .bind(serde_json::to_string(&issue.images)?)
        .bind(music_json(&issue.music_track)?)
        .bind(issue.updated_at)
        .bind(uuid_to_blob(issue.id))
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Reads and deletes inside one transaction so the returned issue is
    /// exactly what was removed.
    async fn delete_issue(&self, id: Uuid) -> anyhow::Result<Option<Issue>> {
        let mut tx = self.pool.begin().await?;

        let row = sqlx::query(&format!("SELECT {ISSUE_COLUMNS} FROM issues WHERE id = ?"))
            .bind(uuid_to_blob(id))
            .fetch_optional(&mut *tx)
            .await?;
        let Some(row) = row else {
            return Ok(None);
        };
        let issue = issue_from_row(&row)?;

        sqlx::query("DELETE FROM issues WHERE id = ?").bind(uuid_to_blob(id)).execute(&mut *tx).await?;
        tx.commit().await?;
        Ok(Some(issue))
    }
}

#[async_trait]
impl UserRepo for SqliteJournalRepo {
    async fn create_user(&self, user: User) -> anyhow::Result<()> {
        let result = sqlx::query("INSERT INTO users (id, name, email, password_hash, created_at) VALUES (?, ?, ?, ?, ?)")
            .bind(uuid_to_blob(user.id))
            .bind(&user.name)
            .bind(&user.email)
            .bind(&user.password_hash)
            .bind(user.created_at)
            .execute(&self.pool)
            .await;

        match result {
            Ok(_) => Ok(()),
            Err(sqlx::Error::Database(db)) if db.is_unique_violation() => {
                Err(AppError::Conflict(format!("An account for {} already exists", user.email)).into())
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn find_user_by_email(&self, email: &str) -> anyhow::Result<Option<User>> {
        let row = sqlx::query("SELECT id, name, email, password_hash, created_at FROM users WHERE email = ?")
            .bind(email.trim())
            .fetch_optional(&self.pool)
            .await?;
        row.as_ref().map(user_from_row).transpose()
    }

    async fn get_user(&self, id: Uuid) -> anyhow::Result<Option<User>> {
        let row = sqlx::query("SELECT id, name, email, password_hash, created_at FROM users WHERE id = ?")
            .bind(uuid_to_blob(id))
            .fetch_optional(&self.pool)
            .await?;
        row.as_ref().map(user_from_row).transpose()
    }

    async fn store_refresh(&self, record: RefreshRecord) -> anyhow::Result<()> {
        sqlx::query("INSERT INTO refresh_tokens (token_hash, user_id, expires_at, revoked) VALUES (?, ?, ?, ?)")
            .bind(&record.token_hash)
            .bind(uuid_to_blob(record.user_id))
            .bind(record.expires_at)
            .bind(record.revoked)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn find_refresh(&self, token_hash: &str) -> anyhow::Result<Option<RefreshRecord>> {
        let row = sqlx::query("SELECT token_hash, user_id, expires_at, revoked FROM refresh_tokens WHERE token_hash = ?")
            .bind(token_hash)
            .fetch_optional(&self.pool)
            .await?;

        match row {
            Some(row) => Ok(Some(RefreshRecord {
                token_hash: row.try_get("token_hash")?,
                user_id: blob_to_uuid(row.try_get::<Vec<u8>, _>("user_id")?.as_slice())?,
                expires_at: row.try_get::<DateTime<Utc>, _>("expires_at")?,
                revoked: row.try_get("revoked")?,
            })),
            None => Ok(None),
        }
    }

    async fn revoke_refresh(&self, token_hash: &str) -> anyhow::Result<bool> {
        let result = sqlx::query("UPDATE refresh_tokens SET revoked = 1 WHERE token_hash = ?")
            .bind(token_hash)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn revoke_all_refresh(&self, user_id: Uuid) -> anyhow::Result<u64> {
        let result = sqlx::query("UPDATE refresh_tokens SET revoked = 1 WHERE user_id = ? AND revoked = 0")
            .bind(uuid_to_blob(user_id))
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use mj_core::models::IssueInput;

    async fn repo() -> SqliteJournalRepo {
        SqliteJournalRepo::new("sqlite::memory:").await.unwrap()
    }

    fn issue(title: &str, created_at: DateTime<Utc>) -> Issue {
        IssueInput {
            title: title.into(),
            volume: "1".into(),
            issue_number: "1".into(),
            foreword: Some("Hello".into()),
            images: vec!["https://example.com/a.png".into()],
            music_track: Some(MusicTrack {
                id: 3135556,
                title: "Harder, Better, Faster, Stronger".into(),
                artist_name: "Daft Punk".into(),
                cover_url: None,
                preview_url: Some("https://cdn.example.com/preview.mp3".into()),
            }),
            ..Default::default()
        }
        .into_issue(Uuid::now_v7(), created_at)
    }

    fn user(email: &str) -> User {
        User {
            id: Uuid::now_v7(),
            name: "Ada".into(),
            email: email.into(),
            password_hash: "$argon2id$stub".into(),
            created_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn test_issue_roundtrip_keeps_json_columns() {
        let repo = repo().await;
        let original = issue("Echoes", Utc::now());
        repo.create_issue(original.clone()).await.expect("Failed to create issue");

        let stored = repo.get_issue(original.id).await.unwrap().expect("issue");
        assert_eq!(stored.images, original.images);
        assert_eq!(stored.music_track, original.music_track);
        assert_eq!(stored.layout, Layout::Retro);
        assert!(repo.get_issue(Uuid::now_v7()).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_listing_is_newest_first() {
        let repo = repo().await;
        let now = Utc::now();
        for (i, title) in ["one", "two", "three", "four"].iter().enumerate() {
            repo.create_issue(issue(title, now + Duration::seconds(i as i64))).await.unwrap();
        }

        let titles: Vec<String> = repo.list_issues().await.unwrap().into_iter().map(|i| i.title).collect();
        assert_eq!(titles, vec!["four", "three", "two", "one"]);

        let latest: Vec<String> = repo.latest_issues(3).await.unwrap().into_iter().map(|i| i.title).collect();
        assert_eq!(latest, vec!["four", "three", "two"]);
    }

    #[tokio::test]
    async fn test_replace_and_delete() {
        let repo = repo().await;
        let original = issue("Draft", Utc::now());
        repo.create_issue(original.clone()).await.unwrap();

        let replaced = IssueInput { title: "Final".into(), volume: "2".into(), issue_number: "3".into(), ..Default::default() }
            .replace(&original, Utc::now());
        assert!(repo.replace_issue(replaced).await.unwrap());

        let stored = repo.get_issue(original.id).await.unwrap().unwrap();
        assert_eq!(stored.title, "Final");
        assert!(stored.foreword.is_none(), "full replace clears omitted fields");
        assert!(stored.music_track.is_none());

        let deleted = repo.delete_issue(original.id).await.unwrap().expect("deleted issue");
        assert_eq!(deleted.title, "Final");
        assert!(repo.delete_issue(original.id).await.unwrap().is_none());

        let ghost = issue("Ghost", Utc::now());
        assert!(!repo.replace_issue(ghost).await.unwrap());
    }

    #[tokio::test]
    async fn test_duplicate_email_is_a_conflict() {
        let repo = repo().await;
        repo.create_user(user("ada@example.com")).await.unwrap();

        let err = repo.create_user(user("ADA@example.com")).await.unwrap_err();
        assert!(matches!(AppError::from(err), AppError::Conflict(_)));

        let found = repo.find_user_by_email("Ada@Example.com").await.unwrap();
        assert!(found.is_some());
    }

    #[tokio::test]
    async fn test_refresh_tokens_revoke() {
        let repo = repo().await;
        let owner = user("grace@example.com");
        repo.create_user(owner.clone()).await.unwrap();

        for hash in ["aa", "bb"] {
            repo.store_refresh(RefreshRecord {
                token_hash: hash.into(),
                user_id: owner.id,
                expires_at: Utc::now() + Duration::days(7),
                revoked: false,
            })
            .await
            .unwrap();
        }

        assert!(repo.revoke_refresh("aa").await.unwrap());
        assert!(!repo.revoke_refresh("zz").await.unwrap());
        assert!(repo.find_refresh("aa").await.unwrap().unwrap().revoked);
        assert_eq!(repo.revoke_all_refresh(owner.id).await.unwrap(), 1);
        assert!(repo.find_refresh("bb").await.unwrap().unwrap().revoked);
    }
}
