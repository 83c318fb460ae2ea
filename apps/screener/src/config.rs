use anyhow::{Context, Result};

/// Application configuration loaded from environment variables.
///
/// The model API key is always required; the database URL is optional so the
/// sheets agent can run without a Postgres instance (and `screener --no-db`
/// skips persistence entirely).
#[derive(Debug, Clone)]
pub struct Config {
    pub anthropic_api_key: String,
    pub database_url: Option<String>,
    /// Google API credentials JSON — service account key or OAuth client file.
    pub google_credentials_file: String,
    /// Where the OAuth token envelope is cached between sessions.
    pub google_token_file: String,
    pub rust_log: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Ok(Config {
            anthropic_api_key: require_env("ANTHROPIC_API_KEY")?,
            database_url: std::env::var("DATABASE_URL").ok(),
            google_credentials_file: std::env::var("GOOGLE_CREDENTIALS_FILE")
                .unwrap_or_else(|_| "credentials.json".to_string()),
            google_token_file: std::env::var("GOOGLE_TOKEN_FILE")
                .unwrap_or_else(|_| "token.json".to_string()),
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
        })
    }
}

fn require_env(key: &str) -> Result<String> {
    std::env::var(key).with_context(|| format!("Required environment variable '{key}' is not set"))
}
