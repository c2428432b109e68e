use serde::Deserialize;

#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub database_url: String,
    pub database_max_connections: u32,
    pub jwt_secret: String,
    #[serde(default)]
    pub cors_origins: Vec<String>,
    pub cookie_secure: bool,
    pub session_ttl_hours: i64,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        let host = std::env::var("HOST").unwrap_or_else(|_| "127.0.0.1".into());
        let port = std::env::var("PORT")
            .unwrap_or_else(|_| "8080".into())
            .parse()
            .map_err(|e| anyhow::anyhow!("invalid PORT: {}", e))?;
        let database_url = std::env::var("DATABASE_URL")
            .map_err(|_| anyhow::anyhow!("DATABASE_URL must be set"))?;
        let database_max_connections = std::env::var("DATABASE_MAX_CONNECTIONS")
            .unwrap_or_else(|_| "20".into())
            .parse()
            .map_err(|e| anyhow::anyhow!("invalid DATABASE_MAX_CONNECTIONS: {}", e))?;
        let jwt_secret =
            std::env::var("JWT_SECRET").map_err(|_| anyhow::anyhow!("JWT_SECRET must be set"))?;
        let cors_origins = parse_origins(&std::env::var("CORS_ORIGINS").unwrap_or_default());
        let cookie_secure = std::env::var("COOKIE_SECURE")
            .map(|v| matches!(v.trim().to_ascii_lowercase().as_str(), "1" | "true" | "yes"))
            .unwrap_or(false);
        let session_ttl_hours: i64 = std::env::var("SESSION_TTL_HOURS")
            .unwrap_or_else(|_| "168".into())
            .parse()
            .map_err(|e| anyhow::anyhow!("invalid SESSION_TTL_HOURS: {}", e))?;
        if session_ttl_hours <= 0 {
            anyhow::bail!("SESSION_TTL_HOURS must be positive");
        }

        Ok(Self {
            host,
            port,
            database_url,
            database_max_connections,
            jwt_secret,
            cors_origins,
            cookie_secure,
            session_ttl_hours,
        })
    }
}

fn parse_origins(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::parse_origins;

    #[test]
    fn origins_are_split_and_trimmed() {
        assert_eq!(
            parse_origins(" http://localhost:3000 ,,https://publishly.dev"),
            vec!["http://localhost:3000", "https://publishly.dev"]
        );
        assert!(parse_origins("").is_empty());
    }
}
