use crate::auth::jwt::JwtConfig;

/// Server configuration loaded from environment variables.
///
/// All fields except the JWT secret have defaults suitable for local
/// development. In production, override via environment variables.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind address (default: `0.0.0.0`).
    pub host: String,
    /// Bind port (default: `3000`).
    pub port: u16,
    /// Allowed CORS origins, parsed from comma-separated `CORS_ORIGINS` env var.
    pub cors_origins: Vec<String>,
    /// HTTP request timeout in seconds (default: `30`).
    pub request_timeout_secs: u64,
    /// Burst size for the login/register rate limiter (default: `5`).
    pub auth_rate_burst: u32,
    /// Sustained refill rate for the auth limiter, in requests per second
    /// (default: `0.5`).
    pub auth_rate_refill_per_sec: f64,
    /// JWT token configuration (secret, expiry durations).
    pub jwt: JwtConfig,
}

impl ServerConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                     | Default                    |
    /// |-----------------------------|----------------------------|
    /// | `HOST`                      | `0.0.0.0`                  |
    /// | `PORT`                      | `3000`                     |
    /// | `CORS_ORIGINS`              | `http://localhost:5173`    |
    /// | `REQUEST_TIMEOUT_SECS`      | `30`                       |
    /// | `AUTH_RATE_BURST`           | `5`                        |
    /// | `AUTH_RATE_REFILL_PER_SEC`  | `0.5`                      |
    pub fn from_env() -> Self {
        let host = std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".into());

        let port: u16 = std::env::var("PORT")
            .unwrap_or_else(|_| "3000".into())
            .parse()
            .expect("PORT must be a valid u16");

        let cors_origins: Vec<String> = std::env::var("CORS_ORIGINS")
            .unwrap_or_else(|_| "http://localhost:5173".into())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let request_timeout_secs: u64 = std::env::var("REQUEST_TIMEOUT_SECS")
            .unwrap_or_else(|_| "30".into())
            .parse()
            .expect("REQUEST_TIMEOUT_SECS must be a valid u64");

        let auth_rate_burst: u32 = std::env::var("AUTH_RATE_BURST")
            .unwrap_or_else(|_| "5".into())
            .parse()
            .expect("AUTH_RATE_BURST must be a valid u32");

        let auth_rate_refill_per_sec: f64 = std::env::var("AUTH_RATE_REFILL_PER_SEC")
            .unwrap_or_else(|_| "0.5".into())
            .parse()
            .expect("AUTH_RATE_REFILL_PER_SEC must be a valid f64");

        let jwt = JwtConfig::from_env();

        Self {
            host,
            port,
            cors_origins,
            request_timeout_secs,
            auth_rate_burst,
            auth_rate_refill_per_sec,
            jwt,
        }
    }
}
