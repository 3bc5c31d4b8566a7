use serde::Deserialize;

/// Settings for the signed session cookie.
#[derive(Debug, Clone, Deserialize)]
pub struct SessionConfig {
    pub secret: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub database_url: String,
    pub session: SessionConfig,
}

impl AppConfig {
    /// Reads configuration from the environment. Both values fall back to
    /// non-production defaults so the app runs out of the box.
    pub fn from_env() -> anyhow::Result<Self> {
        let database_url = std::env::var("DATABASE_URL")
            .ok()
            .filter(|v| !v.trim().is_empty())
            .unwrap_or_else(|| "sqlite:inventoryease.db?mode=rwc".into());
        let secret = std::env::var("SESSION_SECRET")
            .ok()
            .filter(|v| !v.trim().is_empty())
            .unwrap_or_else(|| "dev-secret-key".into());
        Ok(Self {
            database_url,
            session: SessionConfig { secret },
        })
    }
}
