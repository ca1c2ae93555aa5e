use config::{Config, ConfigError, Environment};
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Settings {
    pub debug: bool,
    pub port: u16,
    pub enable_swagger: bool,
    pub jwt_secret: String,
    pub token_ttl_hours: i64,
    /// Minutes after class start during which booking is still allowed.
    pub booking_grace_minutes: i64,
}

impl Settings {
    pub fn from_env() -> Result<Self, ConfigError> {
        let _ = dotenvy::dotenv();

        let config = Config::builder()
            // Load from environment variables with APP_ prefix
            .add_source(Environment::with_prefix("APP"))
            .set_default("debug", false)?
            .set_default("port", 8080)?
            .set_default("enable_swagger", true)?
            .set_default("jwt_secret", "default-secret-change-me")?
            .set_default("token_ttl_hours", 24)?
            .set_default("booking_grace_minutes", 30)?
            .build()?;

        config.try_deserialize()
    }
}
