//! Environment configuration.

use std::time::Duration;

use anyhow::{Context, Result};

#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    /// Postgres connection string; absent means the in-memory store.
    pub database_url: Option<String>,
    /// NATS server for the notification transport; absent means log-only.
    pub nats_url: Option<String>,
    /// ISO currency code used for payment intents.
    pub currency: String,
    pub session_ttl: Duration,
    pub admin_seed: Option<AdminSeed>,
}

/// Bootstrap admin identity issued a session at startup.
#[derive(Debug, Clone)]
pub struct AdminSeed {
    pub email: String,
    pub token: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        let port = std::env::var("PORT")
            .unwrap_or_else(|_| "8083".to_string())
            .parse()
            .context("invalid PORT")?;
        let session_ttl_secs: u64 = std::env::var("SESSION_TTL_SECS")
            .unwrap_or_else(|_| "86400".to_string())
            .parse()
            .context("invalid SESSION_TTL_SECS")?;
        let admin_seed = match (
            std::env::var("ADMIN_EMAIL").ok(),
            std::env::var("ADMIN_TOKEN").ok(),
        ) {
            (Some(email), Some(token)) => Some(AdminSeed { email, token }),
            _ => None,
        };

        Ok(Self {
            port,
            database_url: std::env::var("DATABASE_URL").ok(),
            nats_url: std::env::var("NATS_URL").ok(),
            currency: std::env::var("CURRENCY").unwrap_or_else(|_| "INR".to_string()),
            session_ttl: Duration::from_secs(session_ttl_secs),
            admin_seed,
        })
    }
}
