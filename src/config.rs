use anyhow::{Context, Result};

#[derive(Debug, Clone)]
pub struct Config {
    // Storage
    pub database_url: String,

    // HTTP server
    pub port: u16,

    // Admin area (login is disabled when unset)
    pub admin_token: Option<String>,

    // Presentation
    pub site_name: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Ok(Self {
            database_url: std::env::var("DATABASE_URL")
                .unwrap_or_else(|_| "sqlite://movie_booking.db?mode=rwc".to_string()),

            port: match std::env::var("PORT") {
                Ok(v) => v.parse().with_context(|| format!("PORT is not a valid port: {}", v))?,
                Err(_) => 8080,
            },

            admin_token: std::env::var("ADMIN_TOKEN")
                .ok()
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty()),

            site_name: std::env::var("SITE_NAME")
                .unwrap_or_else(|_| "Movie Tickets".to_string()),
        })
    }
}
