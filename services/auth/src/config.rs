//! Service configuration

use config::{Config, ConfigError, Environment};
use serde::Deserialize;

/// Authentication service configuration
#[derive(Debug, Clone, Deserialize)]
pub struct AuthConfig {
    /// Socket address to listen on
    pub bind_address: String,
}

impl AuthConfig {
    /// Load the configuration from `AUTH_*` environment variables
    ///
    /// # Environment Variables
    /// - `AUTH_BIND_ADDRESS` (default: "0.0.0.0:3000")
    pub fn from_env() -> Result<Self, ConfigError> {
        Config::builder()
            .set_default("bind_address", "0.0.0.0:3000")?
            .add_source(Environment::with_prefix("AUTH").try_parsing(true))
            .build()?
            .try_deserialize()
    }
}
