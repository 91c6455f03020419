//! JWT service for token generation and validation
//!
//! Tokens are signed with RS256 when a PEM key pair is configured and with
//! HS256 when only a shared secret is available. The auth service issues
//! tokens; the API service only needs the verifying half of the keys.

use anyhow::Result;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use std::time::{SystemTime, UNIX_EPOCH};
use uuid::Uuid;

/// Signing material for tokens
#[derive(Debug, Clone)]
pub enum KeyMaterial {
    /// RSA key pair in PEM format. The private key is optional for verify-only services.
    Rsa {
        private_key: Option<String>,
        public_key: String,
    },
    /// Shared HMAC secret
    Secret(String),
}

/// JWT configuration
#[derive(Debug, Clone)]
pub struct JwtConfig {
    /// Keys used for signing and verifying tokens
    pub keys: KeyMaterial,
    /// Access token expiration time in seconds (default: 15 minutes)
    pub access_token_expiry: u64,
    /// Refresh token expiration time in seconds (default: 7 days)
    pub refresh_token_expiry: u64,
}

impl JwtConfig {
    /// Create a new JwtConfig from environment variables
    ///
    /// # Environment Variables
    /// - `JWT_PUBLIC_KEY`: Public key (PEM format) or path to the public key file
    /// - `JWT_PRIVATE_KEY`: Private key (PEM format) or path to the private key file
    /// - `JWT_SECRET`: Shared secret, used when no public key is configured
    /// - `JWT_ACCESS_TOKEN_EXPIRY`: Access token expiry in seconds (default: 900)
    /// - `JWT_REFRESH_TOKEN_EXPIRY`: Refresh token expiry in seconds (default: 604800)
    pub fn from_env() -> Result<Self> {
        let keys = match std::env::var("JWT_PUBLIC_KEY") {
            Ok(public_key) => KeyMaterial::Rsa {
                private_key: std::env::var("JWT_PRIVATE_KEY")
                    .ok()
                    .map(|key| read_pem(&key))
                    .transpose()?,
                public_key: read_pem(&public_key)?,
            },
            Err(_) => KeyMaterial::Secret(std::env::var("JWT_SECRET").map_err(|_| {
                anyhow::anyhow!("Neither JWT_PUBLIC_KEY nor JWT_SECRET environment variable is set")
            })?),
        };

        let access_token_expiry = std::env::var("JWT_ACCESS_TOKEN_EXPIRY")
            .unwrap_or_else(|_| "900".to_string()) // 15 minutes
            .parse()
            .unwrap_or(900);

        let refresh_token_expiry = std::env::var("JWT_REFRESH_TOKEN_EXPIRY")
            .unwrap_or_else(|_| "604800".to_string()) // 7 days
            .parse()
            .unwrap_or(604800);

        Ok(JwtConfig {
            keys,
            access_token_expiry,
            refresh_token_expiry,
        })
    }

    /// Configuration signing with a shared secret and default expiries
    pub fn with_secret(secret: impl Into<String>) -> Self {
        JwtConfig {
            keys: KeyMaterial::Secret(secret.into()),
            access_token_expiry: 900,
            refresh_token_expiry: 604800,
        }
    }
}

/// If the value looks like a file path, read the key from file (try CWD, then crate root)
fn read_pem(value: &str) -> Result<String> {
    if value.starts_with("-----BEGIN") {
        return Ok(value.to_string());
    }

    let contents = std::fs::read_to_string(value)
        .or_else(|_| {
            let mut path = std::path::PathBuf::from(env!("CARGO_MANIFEST_DIR"));
            path.push(value);
            std::fs::read_to_string(path)
        })
        .map_err(|e| anyhow::anyhow!("Failed to read key file {}: {}", value, e))?;

    Ok(contents.trim().to_string())
}

/// JWT claims structure
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    /// User ID
    pub sub: Uuid,
    /// Issued at time
    pub iat: u64,
    /// Expiration time
    pub exp: u64,
    /// Token type (access or refresh)
    pub token_type: TokenType,
}

/// Token type enum
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq)]
pub enum TokenType {
    /// Access token
    Access,
    /// Refresh token
    Refresh,
}

/// JWT service
#[derive(Clone)]
pub struct JwtService {
    encoding_key: Option<EncodingKey>,
    decoding_key: DecodingKey,
    algorithm: Algorithm,
    validation: Validation,
    config: JwtConfig,
}

impl JwtService {
    /// Initialize a new JWT service
    pub fn new(config: JwtConfig) -> Result<Self> {
        let (algorithm, encoding_key, decoding_key) = match &config.keys {
            KeyMaterial::Rsa {
                private_key,
                public_key,
            } => (
                Algorithm::RS256,
                private_key
                    .as_ref()
                    .map(|key| EncodingKey::from_rsa_pem(key.as_bytes()))
                    .transpose()?,
                DecodingKey::from_rsa_pem(public_key.as_bytes())?,
            ),
            KeyMaterial::Secret(secret) => (
                Algorithm::HS256,
                Some(EncodingKey::from_secret(secret.as_bytes())),
                DecodingKey::from_secret(secret.as_bytes()),
            ),
        };

        let mut validation = Validation::new(algorithm);
        validation.validate_exp = true;

        Ok(JwtService {
            encoding_key,
            decoding_key,
            algorithm,
            validation,
            config,
        })
    }

    /// Generate an access token for a user
    pub fn generate_access_token(&self, user_id: Uuid) -> Result<String> {
        self.generate(user_id, TokenType::Access, self.config.access_token_expiry)
    }

    /// Generate a refresh token for a user
    pub fn generate_refresh_token(&self, user_id: Uuid) -> Result<String> {
        self.generate(user_id, TokenType::Refresh, self.config.refresh_token_expiry)
    }

    fn generate(&self, user_id: Uuid, token_type: TokenType, ttl: u64) -> Result<String> {
        let encoding_key = self
            .encoding_key
            .as_ref()
            .ok_or_else(|| anyhow::anyhow!("No signing key configured"))?;

        let now = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map_err(|e| anyhow::anyhow!("Failed to get current time: {}", e))?
            .as_secs();

        let claims = Claims {
            sub: user_id,
            iat: now,
            exp: now + ttl,
            token_type,
        };

        let token = encode(&Header::new(self.algorithm), &claims, encoding_key)?;
        Ok(token)
    }

    /// Validate a token and return the claims
    pub fn validate_token(&self, token: &str) -> Result<Claims> {
        let token_data = decode::<Claims>(token, &self.decoding_key, &self.validation)?;
        Ok(token_data.claims)
    }

    /// Validate a token and require it to be an access token
    pub fn validate_access_token(&self, token: &str) -> Result<Claims> {
        let claims = self.validate_token(token)?;
        if claims.token_type != TokenType::Access {
            anyhow::bail!("Token is not an access token");
        }
        Ok(claims)
    }

    /// Get the access token expiry time
    pub fn access_token_expiry(&self) -> u64 {
        self.config.access_token_expiry
    }

    /// Get the refresh token expiry time
    pub fn refresh_token_expiry(&self) -> u64 {
        self.config.refresh_token_expiry
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn service() -> JwtService {
        JwtService::new(JwtConfig::with_secret("test-secret")).unwrap()
    }

    #[test]
    fn test_access_token_round_trip() {
        let service = service();
        let user_id = Uuid::new_v4();

        let token = service.generate_access_token(user_id).unwrap();
        let claims = service.validate_access_token(&token).unwrap();

        assert_eq!(claims.sub, user_id);
        assert_eq!(claims.token_type, TokenType::Access);
        assert_eq!(claims.exp - claims.iat, 900);
    }

    #[test]
    fn test_refresh_token_is_not_an_access_token() {
        let service = service();
        let token = service.generate_refresh_token(Uuid::new_v4()).unwrap();

        assert!(service.validate_token(&token).is_ok());
        assert!(service.validate_access_token(&token).is_err());
    }

    #[test]
    fn test_token_signed_with_other_secret_is_rejected() {
        let other = JwtService::new(JwtConfig::with_secret("another-secret")).unwrap();
        let token = other.generate_access_token(Uuid::new_v4()).unwrap();

        assert!(service().validate_token(&token).is_err());
    }

    #[test]
    fn test_expired_token_is_rejected() {
        // Default leeway is 60 seconds, so the token expired well before that.
        let now = SystemTime::now().duration_since(UNIX_EPOCH).unwrap().as_secs();
        let claims = Claims {
            sub: Uuid::new_v4(),
            iat: now - 3600,
            exp: now - 1800,
            token_type: TokenType::Access,
        };
        let token = encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(b"test-secret"),
        )
        .unwrap();

        assert!(service().validate_token(&token).is_err());
    }

    #[test]
    fn test_garbage_token_is_rejected() {
        assert!(service().validate_token("not-a-jwt").is_err());
    }
}
