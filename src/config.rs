use std::env;

#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Postgres URL; unset means the in-memory gateway seeded with the sample catalog.
    pub database_url: Option<String>,
    pub host: String,
    pub port: u16,
    pub jwt_secret: String,
    pub jwt_ttl_hours: i64,
    pub request_body_limit: usize,
    pub concurrency_limit: usize,
    /// Shared secret a hosted identity provider presents to exchange its users
    /// for local tokens. Unset disables the exchange.
    pub provider_secret: Option<String>,
}

fn parsed<T: std::str::FromStr>(key: &str, default: T) -> T {
    env::var(key)
        .ok()
        .and_then(|v| v.parse::<T>().ok())
        .unwrap_or(default)
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let database_url = env::var("DATABASE_URL").ok().filter(|url| !url.is_empty());
        let jwt_secret = env::var("JWT_SECRET")
            .map_err(|_| anyhow::anyhow!("JWT_SECRET is not set"))?;
        let host = env::var("APP_HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
        Ok(Self {
            database_url,
            host,
            port: parsed("APP_PORT", 3000),
            jwt_secret,
            jwt_ttl_hours: parsed("JWT_TTL_HOURS", 24),
            request_body_limit: parsed("REQUEST_BODY_LIMIT", 1024 * 1024),
            concurrency_limit: parsed("CONCURRENCY_LIMIT", 100),
            provider_secret: env::var("PROVIDER_SECRET").ok().filter(|s| !s.is_empty()),
        })
    }

    /// The database URL, for binaries that only work against Postgres.
    pub fn require_database(&self) -> anyhow::Result<&str> {
        self.database_url
            .as_deref()
            .ok_or_else(|| anyhow::anyhow!("DATABASE_URL is not set"))
    }
}
