//! Service configuration
//!
//! Settings are read from `API_*` environment variables on top of the
//! defaults below, e.g. `API_BIND_ADDRESS=127.0.0.1:8080`.

use config::{Config, ConfigError, Environment};
use serde::Deserialize;
use std::path::PathBuf;

/// Where entities are persisted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    Postgres,
    Memory,
}

/// API service configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Socket address to listen on
    pub bind_address: String,
    /// Directory holding uploaded media
    pub media_root: PathBuf,
    /// URL prefix under which media is served
    pub media_url: String,
    /// Largest accepted upload body in bytes
    pub max_upload_bytes: usize,
    /// Entity store backend
    pub storage_backend: StorageBackend,
}

impl ServerConfig {
    /// Load the configuration from the environment
    ///
    /// # Environment Variables
    /// - `API_BIND_ADDRESS` (default: "0.0.0.0:3001")
    /// - `API_MEDIA_ROOT` (default: "./media")
    /// - `API_MEDIA_URL` (default: "/media")
    /// - `API_MAX_UPLOAD_BYTES` (default: 10 MiB)
    /// - `API_STORAGE_BACKEND`: `postgres` or `memory` (default: "postgres")
    pub fn from_env() -> Result<Self, ConfigError> {
        Config::builder()
            .set_default("bind_address", "0.0.0.0:3001")?
            .set_default("media_root", "./media")?
            .set_default("media_url", "/media")?
            .set_default("max_upload_bytes", 10_i64 * 1024 * 1024)?
            .set_default("storage_backend", "postgres")?
            .add_source(Environment::with_prefix("API").try_parsing(true))
            .build()?
            .try_deserialize()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[test]
    #[serial]
    fn test_server_config_defaults() {
        let config = ServerConfig::from_env().unwrap();
        assert_eq!(config.bind_address, "0.0.0.0:3001");
        assert_eq!(config.media_root, PathBuf::from("./media"));
        assert_eq!(config.media_url, "/media");
        assert_eq!(config.max_upload_bytes, 10 * 1024 * 1024);
        assert_eq!(config.storage_backend, StorageBackend::Postgres);
    }

    #[test]
    #[serial]
    fn test_server_config_from_env() {
        unsafe {
            std::env::set_var("API_BIND_ADDRESS", "127.0.0.1:8080");
            std::env::set_var("API_MAX_UPLOAD_BYTES", "2048");
            std::env::set_var("API_STORAGE_BACKEND", "memory");
        }

        let config = ServerConfig::from_env().unwrap();
        assert_eq!(config.bind_address, "127.0.0.1:8080");
        assert_eq!(config.max_upload_bytes, 2048);
        assert_eq!(config.storage_backend, StorageBackend::Memory);

        unsafe {
            std::env::remove_var("API_BIND_ADDRESS");
            std::env::remove_var("API_MAX_UPLOAD_BYTES");
            std::env::remove_var("API_STORAGE_BACKEND");
        }
    }
}
