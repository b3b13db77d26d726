use crate::auth::{
    password::{Argon2Hasher, PasswordHasher},
    token::TokenIssuer,
};
use secrecy::SecretString;
use std::sync::Arc;

pub const DEFAULT_ACCESS_TTL_SECONDS: i64 = 900;
pub const DEFAULT_REFRESH_TTL_SECONDS: i64 = 7 * 24 * 3600;
pub const DEFAULT_EXTENDED_REFRESH_TTL_SECONDS: i64 = 30 * 24 * 3600;
pub const DEFAULT_PASSWORD_RESET_TTL_SECONDS: i64 = 3600;
pub const DEFAULT_EMAIL_VERIFICATION_TTL_SECONDS: i64 = 24 * 3600;
pub const DEFAULT_PURGE_INTERVAL_SECONDS: u64 = 3600;

/// Tunables for the authentication engine.
#[derive(Debug, Clone)]
pub struct AuthConfig {
    pub base_url: String,
    pub access_ttl_seconds: i64,
    pub refresh_ttl_seconds: i64,
    pub extended_refresh_ttl_seconds: i64,
    pub password_reset_ttl_seconds: i64,
    pub email_verification_ttl_seconds: i64,
    pub purge_interval_seconds: u64,
}

impl AuthConfig {
    #[must_use]
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            access_ttl_seconds: DEFAULT_ACCESS_TTL_SECONDS,
            refresh_ttl_seconds: DEFAULT_REFRESH_TTL_SECONDS,
            extended_refresh_ttl_seconds: DEFAULT_EXTENDED_REFRESH_TTL_SECONDS,
            password_reset_ttl_seconds: DEFAULT_PASSWORD_RESET_TTL_SECONDS,
            email_verification_ttl_seconds: DEFAULT_EMAIL_VERIFICATION_TTL_SECONDS,
            purge_interval_seconds: DEFAULT_PURGE_INTERVAL_SECONDS,
        }
    }

    #[must_use]
    pub fn with_access_ttl_seconds(mut self, seconds: i64) -> Self {
        self.access_ttl_seconds = seconds;
        self
    }

    #[must_use]
    pub fn with_refresh_ttl_seconds(mut self, seconds: i64) -> Self {
        self.refresh_ttl_seconds = seconds;
        self
    }

    #[must_use]
    pub fn with_extended_refresh_ttl_seconds(mut self, seconds: i64) -> Self {
        self.extended_refresh_ttl_seconds = seconds;
        self
    }

    #[must_use]
    pub fn with_password_reset_ttl_seconds(mut self, seconds: i64) -> Self {
        self.password_reset_ttl_seconds = seconds;
        self
    }

    #[must_use]
    pub fn with_email_verification_ttl_seconds(mut self, seconds: i64) -> Self {
        self.email_verification_ttl_seconds = seconds;
        self
    }

    #[must_use]
    pub fn with_purge_interval_seconds(mut self, seconds: u64) -> Self {
        self.purge_interval_seconds = seconds;
        self
    }
}

/// Shared immutable state handed to the orchestrators.
#[derive(Clone)]
pub struct AuthState {
    pub config: AuthConfig,
    pub issuer: TokenIssuer,
    pub hasher: Arc<dyn PasswordHasher>,
}

impl AuthState {
    #[must_use]
    pub fn new(config: AuthConfig, secret: SecretString) -> Self {
        let issuer = TokenIssuer::new(
            secret,
            config.access_ttl_seconds,
            config.refresh_ttl_seconds,
            config.extended_refresh_ttl_seconds,
        );
        Self {
            config,
            issuer,
            hasher: Arc::new(Argon2Hasher),
        }
    }

    #[must_use]
    pub fn with_hasher(mut self, hasher: Arc<dyn PasswordHasher>) -> Self {
        self.hasher = hasher;
        self
    }
}
