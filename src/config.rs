use anyhow::Context;
use axum::http::HeaderValue;

/// Which `CustomerStore` implementation backs the service.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreBackend {
    Postgres,
    Memory,
}

impl std::str::FromStr for StoreBackend {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "postgres" | "pg" => Ok(StoreBackend::Postgres),
            "memory" | "in-memory" => Ok(StoreBackend::Memory),
            other => anyhow::bail!("unknown STORE_BACKEND {other:?} (expected postgres or memory)"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub store_backend: StoreBackend,
    pub database_url: Option<String>,
    pub db_max_connections: u32,
    pub cors_allowed_origin: Option<String>,
    pub host: String,
    pub port: u16,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let store_backend = match std::env::var("STORE_BACKEND") {
            Ok(v) => v.parse()?,
            Err(_) => StoreBackend::Postgres,
        };
        let database_url = std::env::var("DATABASE_URL").ok();
        if store_backend == StoreBackend::Postgres && database_url.is_none() {
            anyhow::bail!("DATABASE_URL must be set when STORE_BACKEND=postgres");
        }

        let cors_allowed_origin = std::env::var("CORS_ALLOWED_ORIGIN")
            .ok()
            .filter(|v| !v.trim().is_empty());
        if let Some(origin) = &cors_allowed_origin {
            HeaderValue::from_str(origin)
                .with_context(|| format!("invalid CORS_ALLOWED_ORIGIN {origin:?}"))?;
        }

        Ok(Self {
            store_backend,
            database_url,
            db_max_connections: std::env::var("DB_MAX_CONNECTIONS")
                .ok()
                .and_then(|v| v.parse::<u32>().ok())
                .unwrap_or(10),
            cors_allowed_origin,
            host: std::env::var("APP_HOST").unwrap_or_else(|_| "0.0.0.0".into()),
            port: std::env::var("APP_PORT")
                .ok()
                .and_then(|v| v.parse::<u16>().ok())
                .unwrap_or(8080),
        })
    }

    /// In-memory configuration with no database and permissive CORS.
    #[cfg(test)]
    pub fn in_memory() -> Self {
        Self {
            store_backend: StoreBackend::Memory,
            database_url: None,
            db_max_connections: 1,
            cors_allowed_origin: None,
            host: "127.0.0.1".into(),
            port: 0,
        }
    }
}
