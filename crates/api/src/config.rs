use crate::auth::jwt::JwtConfig;

/// Output format of the tracing subscriber.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

/// Credentials of a staff account ensured at startup.
#[derive(Clone)]
pub struct StaffAccount {
    pub username: String,
    pub password: String,
    pub email: String,
    pub phone_number: String,
}

impl std::fmt::Debug for StaffAccount {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StaffAccount")
            .field("username", &self.username)
            .field("email", &self.email)
            .field("phone_number", &self.phone_number)
            .finish_non_exhaustive()
    }
}

/// Server configuration loaded from environment variables.
///
/// All fields except the JWT secret have defaults suitable for local
/// development.
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
    pub log_format: LogFormat,
    pub jwt: JwtConfig,
    /// Staff account created on startup when all four variables are set.
    pub bootstrap_staff: Option<StaffAccount>,
}

impl ServerConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                | Default                    |
    /// |------------------------|----------------------------|
    /// | `HOST`                 | `0.0.0.0`                  |
    /// | `PORT`                 | `3000`                     |
    /// | `CORS_ORIGINS`         | `http://localhost:5173`    |
    /// | `REQUEST_TIMEOUT_SECS` | `30`                       |
    /// | `LOG_FORMAT`           | `text` (or `json`)         |
    ///
    /// `BOOTSTRAP_STAFF_USERNAME`, `BOOTSTRAP_STAFF_PASSWORD`,
    /// `BOOTSTRAP_STAFF_EMAIL` and `BOOTSTRAP_STAFF_PHONE` are optional.
    ///
    /// # Panics
    ///
    /// Panics on malformed values, so misconfiguration fails at startup.
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

        let log_format = match std::env::var("LOG_FORMAT").as_deref() {
            Ok("json") => LogFormat::Json,
            Ok("text") | Err(_) => LogFormat::Text,
            Ok(other) => panic!("LOG_FORMAT must be 'text' or 'json', got '{other}'"),
        };

        Self {
            host,
            port,
            cors_origins,
            request_timeout_secs,
            log_format,
            jwt: JwtConfig::from_env(),
            bootstrap_staff: staff_account_from_env(),
        }
    }
}

fn staff_account_from_env() -> Option<StaffAccount> {
    let var = |name: &str| std::env::var(name).ok().filter(|v| !v.trim().is_empty());
    Some(StaffAccount {
        username: var("BOOTSTRAP_STAFF_USERNAME")?,
        password: var("BOOTSTRAP_STAFF_PASSWORD")?,
        email: var("BOOTSTRAP_STAFF_EMAIL")?,
        phone_number: var("BOOTSTRAP_STAFF_PHONE")?,
    })
}
