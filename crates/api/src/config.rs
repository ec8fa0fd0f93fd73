use crate::auth::jwt::JwtConfig;

/// Default Supabase Storage bucket for uploaded media.
pub const DEFAULT_STORAGE_BUCKET: &str = "housephotos";

/// Server configuration loaded from environment variables.
///
/// All fields except the JWT secret and `DATABASE_URL` have defaults
/// suitable for local development.
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
    /// How long in-flight requests may drain after a shutdown signal.
    pub shutdown_timeout_secs: u64,
    pub jwt: JwtConfig,
    pub storage: StorageConfig,
    pub sms: SmsConfig,
    /// Credentials for the first admin account, created only when the
    /// `users` table is empty.
    pub bootstrap_admin: Option<BootstrapAdminConfig>,
}

/// Object storage settings. Supabase is used when both URL and key are set;
/// otherwise files go to `local_dir`.
#[derive(Debug, Clone)]
pub struct StorageConfig {
    pub supabase_url: Option<String>,
    pub service_role_key: Option<String>,
    pub bucket: String,
    pub local_dir: String,
}

/// SMS/WhatsApp gateway settings. Without an endpoint, messages are only logged.
#[derive(Debug, Clone)]
pub struct SmsConfig {
    pub endpoint_url: Option<String>,
    pub api_key: Option<String>,
    pub from_number: String,
}

#[derive(Debug, Clone)]
pub struct BootstrapAdminConfig {
    pub username: String,
    pub email: String,
    pub password: String,
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
    /// | `SHUTDOWN_TIMEOUT_SECS`     | `30`                       |
    /// | `SUPABASE_URL`              | unset (local storage)      |
    /// | `SUPABASE_SERVICE_ROLE_KEY` | unset                      |
    /// | `STORAGE_BUCKET`            | `housephotos`              |
    /// | `LOCAL_STORAGE_DIR`         | `storage/uploads`          |
    /// | `SMS_ENDPOINT_URL`          | unset (log only)           |
    /// | `SMS_API_KEY`               | unset                      |
    /// | `SMS_FROM_NUMBER`           | `+15555550100`             |
    /// | `BOOTSTRAP_ADMIN_USERNAME`  | unset                      |
    /// | `BOOTSTRAP_ADMIN_EMAIL`     | unset                      |
    /// | `BOOTSTRAP_ADMIN_PASSWORD`  | unset                      |
    ///
    /// JWT settings are documented on [`JwtConfig::from_env`].
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

        let shutdown_timeout_secs: u64 = std::env::var("SHUTDOWN_TIMEOUT_SECS")
            .unwrap_or_else(|_| "30".into())
            .parse()
            .expect("SHUTDOWN_TIMEOUT_SECS must be a valid u64");

        let storage = StorageConfig {
            supabase_url: non_empty_var("SUPABASE_URL")
                .map(|url| url.trim_end_matches('/').to_string()),
            service_role_key: non_empty_var("SUPABASE_SERVICE_ROLE_KEY"),
            bucket: non_empty_var("STORAGE_BUCKET")
                .unwrap_or_else(|| DEFAULT_STORAGE_BUCKET.to_string()),
            local_dir: non_empty_var("LOCAL_STORAGE_DIR")
                .unwrap_or_else(|| "storage/uploads".to_string()),
        };

        let sms = SmsConfig {
            endpoint_url: non_empty_var("SMS_ENDPOINT_URL"),
            api_key: non_empty_var("SMS_API_KEY"),
            from_number: non_empty_var("SMS_FROM_NUMBER")
                .unwrap_or_else(|| "+15555550100".to_string()),
        };

        let bootstrap_admin = match (
            non_empty_var("BOOTSTRAP_ADMIN_USERNAME"),
            non_empty_var("BOOTSTRAP_ADMIN_EMAIL"),
            non_empty_var("BOOTSTRAP_ADMIN_PASSWORD"),
        ) {
            (Some(username), Some(email), Some(password)) => Some(BootstrapAdminConfig {
                username,
                email,
                password,
            }),
            _ => None,
        };

        Self {
            host,
            port,
            cors_origins,
            request_timeout_secs,
            shutdown_timeout_secs,
            jwt: JwtConfig::from_env(),
            storage,
            sms,
            bootstrap_admin,
        }
    }
}

impl StorageConfig {
    /// Supabase URL and key, when both are configured.
    pub fn supabase(&self) -> Option<(&str, &str)> {
        match (&self.supabase_url, &self.service_role_key) {
            (Some(url), Some(key)) => Some((url.as_str(), key.as_str())),
            _ => None,
        }
    }
}

fn non_empty_var(name: &str) -> Option<String> {
    std::env::var(name)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
