use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct JwtConfig {
    pub secret: String,
    pub issuer: String,
    pub audience: String,
    pub ttl_minutes: i64,
}

/// Session cookie attributes.
#[derive(Debug, Clone, Deserialize)]
pub struct CookieConfig {
    pub name: String,
    pub secure: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub database_url: String,
    pub db_max_connections: u32,
    pub host: String,
    pub port: u16,
    pub jwt: JwtConfig,
    pub cookie: CookieConfig,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let database_url = std::env::var("DATABASE_URL")?;
        let jwt = JwtConfig {
            secret: std::env::var("JWT_SECRET")?,
            issuer: std::env::var("JWT_ISSUER").unwrap_or_else(|_| "course-catalog".into()),
            audience: std::env::var("JWT_AUDIENCE")
                .unwrap_or_else(|_| "course-catalog-users".into()),
            ttl_minutes: session_ttl_minutes(env_parse("JWT_TTL_MINUTES").unwrap_or(60 * 24 * 10))?,
        };
        let cookie = CookieConfig {
            name: std::env::var("SESSION_COOKIE_NAME").unwrap_or_else(|_| "jwt".into()),
            secure: env_parse("COOKIE_SECURE").unwrap_or(true),
        };
        Ok(Self {
            database_url,
            db_max_connections: env_parse("DB_MAX_CONNECTIONS").unwrap_or(10),
            host: std::env::var("APP_HOST").unwrap_or_else(|_| "0.0.0.0".into()),
            port: env_parse("APP_PORT").unwrap_or(4000),
            jwt,
            cookie,
        })
    }

    /// Token and cookie lifetime in seconds.
    pub fn session_ttl_seconds(&self) -> i64 {
        self.jwt.ttl_minutes.saturating_mul(60)
    }
}

/// Longest session accepted from configuration: one year.
const MAX_TTL_MINUTES: i64 = 60 * 24 * 365;

fn session_ttl_minutes(minutes: i64) -> anyhow::Result<i64> {
    if minutes <= 0 || minutes > MAX_TTL_MINUTES {
        anyhow::bail!("JWT_TTL_MINUTES must be between 1 and {MAX_TTL_MINUTES}, got {minutes}");
    }
    minutes
        .checked_mul(60)
        .map(|_| minutes)
        .ok_or_else(|| anyhow::anyhow!("JWT_TTL_MINUTES overflows seconds: {minutes}"))
}

fn env_parse<T: std::str::FromStr>(key: &str) -> Option<T> {
    std::env::var(key).ok().and_then(|v| v.trim().parse::<T>().ok())
}
