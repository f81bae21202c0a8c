use std::time::Duration;

use anyhow::Context;

/// Route prefix for every versioned endpoint.
pub const API_V1_STR: &str = "/api/v1";

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub host: String,
    pub port: u16,
    pub max_connections: u32,
    pub sql_echo: bool,
    pub debug: bool,
    pub project_name: String,
    /// Upper bound for a single replication check (connect + queries).
    pub replication_timeout: Duration,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let timeout_secs: u64 = lookup("REPLICATION_CHECK_TIMEOUT_SECS")
            .unwrap_or_else(|| "10".to_string())
            .parse()
            .context("REPLICATION_CHECK_TIMEOUT_SECS must be a whole number of seconds")?;

        Ok(Self {
            database_url: lookup("DATABASE_URL")
                .or_else(|| lookup("SQL_URL"))
                .context("DATABASE_URL (or SQL_URL) must be set")?,
            host: lookup("HOST").unwrap_or_else(|| "127.0.0.1".to_string()),
            port: lookup("PORT")
                .unwrap_or_else(|| "8000".to_string())
                .parse()
                .context("PORT must be a valid number")?,
            max_connections: lookup("DATABASE_MAX_CONNECTIONS")
                .unwrap_or_else(|| "10".to_string())
                .parse()
                .context("DATABASE_MAX_CONNECTIONS must be a valid number")?,
            sql_echo: flag(lookup("SQL_ECHO")),
            debug: flag(lookup("DEBUG")),
            project_name: lookup("PROJECT_NAME").unwrap_or_else(|| "Product API".to_string()),
            replication_timeout: Duration::from_secs(timeout_secs),
        })
    }
}

fn flag(value: Option<String>) -> bool {
    matches!(value.as_deref(), Some("True" | "true" | "1"))
}
