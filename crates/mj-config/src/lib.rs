//! # Settings
//!
//! Layered configuration for the binary. Later sources win:
//!
//! 1. built-in defaults
//! 2. `config/default.toml` (optional)
//! 3. `config/{MJ_ENV}.toml` (optional, `MJ_ENV` defaults to `development`)
//! 4. environment variables `MJ__SECTION__KEY`, e.g. `MJ__SERVER__PORT=9000`
//!
//! A `.env` file is read into the environment first. `GEMINI_API_KEY` is
//! accepted as a fallback for `MJ__GEMINI__API_KEY`.

use std::path::Path;

use anyhow::Context;
use config::builder::DefaultState;
use config::{Config, ConfigBuilder, Environment, File};
use secrecy::SecretString;
use serde::Deserialize;

pub use secrecy::ExposeSecret;

/// Secret used when none is configured. Only acceptable for local development.
pub const DEV_JWT_SECRET: &str = "magazine-journal-development-secret";

#[derive(Debug, Deserialize)]
pub struct Settings {
    pub server: ServerSettings,
    pub database: DatabaseSettings,
    pub auth: AuthSettings,
    pub gemini: GeminiSettings,
    pub deezer: DeezerSettings,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
    /// Origin allowed by CORS; any origin when unset.
    pub cors_origin: Option<String>,
    /// Where the static assets are served from.
    pub static_dir: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseSettings {
    pub url: String,
    pub max_connections: u32,
}

#[derive(Debug, Deserialize)]
pub struct AuthSettings {
    pub jwt_secret: SecretString,
    pub access_ttl_secs: i64,
    pub refresh_ttl_days: i64,
    /// Sets the `Secure` flag on the refresh cookie.
    pub secure_cookie: bool,
}

#[derive(Debug, Deserialize)]
pub struct GeminiSettings {
    pub api_key: Option<SecretString>,
    pub model: String,
    pub base_url: String,
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DeezerSettings {
    pub base_url: String,
    pub timeout_secs: u64,
}

impl Settings {
    /// Reads `.env`, then every layer relative to the working directory.
    pub fn load() -> anyhow::Result<Self> {
        if let Err(e) = dotenvy::dotenv() {
            if !e.not_found() {
                log::warn!("⚠️ Ignoring unreadable .env file: {e}");
            }
        }
        let env = std::env::var("MJ_ENV").unwrap_or_else(|_| "development".into());
        Self::load_from(Path::new("config"), &env)
    }

    /// Loads with TOML layers taken from `dir`.
    pub fn load_from(dir: &Path, env: &str) -> anyhow::Result<Self> {
        let mut builder = defaults()?
            .add_source(File::from(dir.join("default")).required(false))
            .add_source(File::from(dir.join(env)).required(false))
            .add_source(Environment::with_prefix("MJ").separator("__").try_parsing(true));

        if let Ok(key) = std::env::var("GEMINI_API_KEY") {
            if !key.trim().is_empty() {
                builder = builder.set_default("gemini.api_key", key)?;
            }
        }

        Self::build(builder)
    }

    /// Finishes a builder that already holds the wanted sources.
    pub fn build(builder: ConfigBuilder<DefaultState>) -> anyhow::Result<Self> {
        let settings: Settings = builder
            .build()
            .context("Failed to assemble configuration")?
            .try_deserialize()
            .context("Invalid configuration")?;
        Ok(settings.normalized())
    }

    fn normalized(mut self) -> Self {
        if self.gemini.api_key.as_ref().is_some_and(|k| k.expose_secret().trim().is_empty()) {
            self.gemini.api_key = None;
        }
        self.server.cors_origin = self.server.cors_origin.filter(|o| !o.trim().is_empty());
        self
    }

    pub fn bind_address(&self) -> (String, u16) {
        (self.server.host.clone(), self.server.port)
    }

    pub fn uses_dev_secret(&self) -> bool {
        self.auth.jwt_secret.expose_secret() == DEV_JWT_SECRET
    }
}

/// Built-in defaults; every key the settings need has one except the API key.
pub fn defaults() -> anyhow::Result<ConfigBuilder<DefaultState>> {
    Ok(Config::builder()
        .set_default("server.host", "127.0.0.1")?
        .set_default("server.port", 8080)?
        .set_default("server.static_dir", "./static")?
        .set_default("database.url", "sqlite:magazine_journal.db")?
        .set_default("database.max_connections", 5)?
        .set_default("auth.jwt_secret", DEV_JWT_SECRET)?
        .set_default("auth.access_ttl_secs", 15 * 60)?
        .set_default("auth.refresh_ttl_days", 7)?
        .set_default("auth.secure_cookie", false)?
        .set_default("gemini.model", "gemini-2.0-flash")?
        .set_default("gemini.base_url", "https://generativelanguage.googleapis.com/v1beta")?
        .set_default("gemini.timeout_secs", 30)?
        .set_default("deezer.base_url", "https://api.deezer.com")?
        .set_default("deezer.timeout_secs", 10)?)
}
