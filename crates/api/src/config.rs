//! Environment configuration for the API process.

/// Runtime configuration, read once at startup.
#[derive(Debug, Clone)]
pub struct Config {
    pub access_token_secret: String,
    pub refresh_token_secret: String,
    /// Expiry string, e.g. `"15m"`.
    pub access_token_expiry: String,
    /// Expiry string, e.g. `"7d"`.
    pub refresh_token_expiry: String,
    pub bind_addr: String,
    /// Exact origin allowed by CORS; absent means no CORS layer.
    pub cors_origin: Option<String>,
    /// Project id a real identity-provider integration authenticates
    /// against; the in-memory provider ignores it.
    pub identity_project_id: Option<String>,
}

impl Config {
    pub fn from_env() -> Self {
        Self {
            access_token_secret: secret_env("JWT_SECRET", "dev-secret"),
            refresh_token_secret: secret_env("JWT_REFRESH_SECRET", "dev-refresh-secret"),
            access_token_expiry: std::env::var("JWT_EXPIRES_IN").unwrap_or_else(|_| "15m".to_string()),
            refresh_token_expiry: std::env::var("JWT_REFRESH_EXPIRES_IN")
                .unwrap_or_else(|_| "7d".to_string()),
            bind_addr: std::env::var("BIND_ADDR").unwrap_or_else(|_| "0.0.0.0:8080".to_string()),
            cors_origin: std::env::var("CORS_ORIGIN").ok(),
            identity_project_id: std::env::var("IDENTITY_PROJECT_ID").ok(),
        }
    }
}

fn secret_env(name: &str, insecure_default: &str) -> String {
    std::env::var(name).unwrap_or_else(|_| {
        tracing::warn!("{name} not set; using insecure dev default");
        insecure_default.to_string()
    })
}
