use devicegate_core::violation::SeverityPolicy;

use crate::auth::jwt::JwtConfig;

/// Server configuration loaded from environment variables.
///
/// All fields have sensible defaults suitable for local development
/// (except the JWT secret). In production, override via environment
/// variables.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind address (default: `0.0.0.0`).
    pub host: String,
    /// Bind port (default: `3000`).
    pub port: u16,
    /// Allowed CORS origins, parsed from comma-separated `CORS_ORIGINS`.
    pub cors_origins: Vec<String>,
    /// HTTP request timeout in seconds (default: `30`).
    pub request_timeout_secs: u64,
    /// JWT token configuration (secret, expiry durations).
    pub jwt: JwtConfig,
    /// Extra request headers fed into fingerprint derivation, lowercase,
    /// parsed from comma-separated `FINGERPRINT_HEADERS`. The network
    /// address and User-Agent are always included.
    pub fingerprint_headers: Vec<String>,
    /// Severity scoring thresholds for the sharing detector.
    pub severity: SeverityPolicy,
}

impl ServerConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                     | Default             |
    /// |-----------------------------|---------------------|
    /// | `HOST`                      | `0.0.0.0`           |
    /// | `PORT`                      | `3000`              |
    /// | `CORS_ORIGINS`              | `http://localhost:5173` |
    /// | `REQUEST_TIMEOUT_SECS`      | `30`                |
    /// | `FINGERPRINT_HEADERS`       | `accept-language`   |
    /// | `SEVERITY_CRITICAL_ACCOUNTS`| `5`                 |
    /// | `SEVERITY_HIGH_ACCOUNTS`    | `3`                 |
    /// | `SEVERITY_IP_WINDOW_MINS`   | `30`                |
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

        let fingerprint_headers: Vec<String> = std::env::var("FINGERPRINT_HEADERS")
            .unwrap_or_else(|_| "accept-language".into())
            .split(',')
            .map(|s| s.trim().to_ascii_lowercase())
            .filter(|s| !s.is_empty())
            .collect();

        let defaults = SeverityPolicy::default();
        let severity = SeverityPolicy {
            critical_account_threshold: env_parse(
                "SEVERITY_CRITICAL_ACCOUNTS",
                defaults.critical_account_threshold,
            ),
            high_account_threshold: env_parse(
                "SEVERITY_HIGH_ACCOUNTS",
                defaults.high_account_threshold,
            ),
            ip_window_mins: env_parse("SEVERITY_IP_WINDOW_MINS", defaults.ip_window_mins),
        };

        let jwt = JwtConfig::from_env();

        Self {
            host,
            port,
            cors_origins,
            request_timeout_secs,
            jwt,
            fingerprint_headers,
            severity,
        }
    }
}

/// Parse an env var, falling back to `default` when unset.
///
/// # Panics
///
/// Panics when the variable is set but unparseable -- misconfiguration
/// should fail at startup, not at detection time.
fn env_parse<T: std::str::FromStr>(name: &str, default: T) -> T {
    match std::env::var(name) {
        Ok(raw) => raw
            .parse()
            .unwrap_or_else(|_| panic!("{name} must be a valid number, got '{raw}'")),
        Err(_) => default,
    }
}
