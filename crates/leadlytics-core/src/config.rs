use std::time::Duration;

#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub data_dir: String,
    pub duckdb_memory_limit: String,
    pub auth_mode: AuthMode,
    /// Organization scope used for every request when `auth_mode` is `None`.
    pub default_organization: Option<String>,
    pub fetch_timeout_ms: u64,
    pub cors_origins: Vec<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum AuthMode {
    None,
    /// Holds the HS256 secret read from `LEADLYTICS_JWT_SECRET`.
    Jwt(String),
}

impl Config {
    pub fn from_env() -> Result<Self, String> {
        Ok(Self {
            port: std::env::var("LEADLYTICS_PORT")
                .unwrap_or_else(|_| "3000".to_string())
                .parse()
                .map_err(|e| format!("invalid port: {e}"))?,
            data_dir: std::env::var("LEADLYTICS_DATA_DIR")
                .unwrap_or_else(|_| "./data".to_string()),
            duckdb_memory_limit: std::env::var("LEADLYTICS_DUCKDB_MEMORY")
                .unwrap_or_else(|_| "1GB".to_string()),
            auth_mode: {
                let raw =
                    std::env::var("LEADLYTICS_AUTH").unwrap_or_else(|_| "jwt".to_string());
                match raw.as_str() {
                    "none" => AuthMode::None,
                    _ => {
                        let secret = std::env::var("LEADLYTICS_JWT_SECRET").map_err(|_| {
                            "LEADLYTICS_JWT_SECRET required when AUTH=jwt".to_string()
                        })?;
                        AuthMode::Jwt(secret)
                    }
                }
            },
            default_organization: std::env::var("LEADLYTICS_DEFAULT_ORG")
                .ok()
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty()),
            fetch_timeout_ms: std::env::var("LEADLYTICS_FETCH_TIMEOUT_MS")
                .unwrap_or_else(|_| "5000".to_string())
                .parse()
                .unwrap_or(5000),
            cors_origins: std::env::var("LEADLYTICS_CORS_ORIGINS")
                .map(|v| v.split(',').map(str::to_string).collect())
                .unwrap_or_default(),
        })
    }

    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_millis(self.fetch_timeout_ms)
    }
}
