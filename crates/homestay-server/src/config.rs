//! Server configuration loaded from environment variables.
//!
//! Every key has a default except the optional secrets. A `.env` file is
//! read by the binary before this runs.

use std::{env, fmt::Display, str::FromStr};

use homestay_auth::AuthConfig;
use homestay_db::DbConfig;
use thiserror::Error;
use tracing::{info, warn};

use crate::mail::MailConfig;
use crate::media::MediaConfig;

#[derive(Debug, Error)]
#[error("invalid value for {key}: {reason}")]
pub struct ConfigError {
    pub key: String,
    pub reason: String,
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub port: u16,
    pub db: DbConfig,
    pub auth: AuthConfig,
    /// Sets the `Secure` attribute on the session cookie.
    pub cookie_secure: bool,
    /// Origins allowed to make credentialed cross-origin requests.
    pub cors_origins: Vec<String>,
    pub mail: MailConfig,
    pub media: MediaConfig,
}

impl ServerConfig {
    pub fn load() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build from an arbitrary key lookup. `load` passes the process
    /// environment.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let db_defaults = DbConfig::default();
        let auth_defaults = AuthConfig::default();
        let mail_defaults = MailConfig::default();
        let media_defaults = MediaConfig::default();

        Ok(Self {
            port: try_load(&lookup, "HOMESTAY_PORT", "8080")?,
            db: DbConfig {
                url: try_load(&lookup, "DATABASE_URL", &db_defaults.url)?,
                namespace: try_load(&lookup, "DATABASE_NAMESPACE", &db_defaults.namespace)?,
                database: try_load(&lookup, "DATABASE_NAME", &db_defaults.database)?,
                username: optional(&lookup, "DATABASE_USER"),
                password: optional(&lookup, "DATABASE_PASSWORD"),
            },
            auth: AuthConfig {
                session_lifetime_secs: try_load(
                    &lookup,
                    "SESSION_LIFETIME_SECS",
                    &auth_defaults.session_lifetime_secs.to_string(),
                )?,
                pepper: optional(&lookup, "PASSWORD_PEPPER"),
                ..auth_defaults
            },
            cookie_secure: try_load(&lookup, "SESSION_COOKIE_SECURE", "true")?,
            cors_origins: optional(&lookup, "CORS_ORIGINS")
                .map(|raw| {
                    raw.split(',')
                        .map(str::trim)
                        .filter(|s| !s.is_empty())
                        .map(String::from)
                        .collect()
                })
                .unwrap_or_default(),
            mail: MailConfig {
                api_key: optional(&lookup, "RESEND_API_KEY"),
                from: try_load(&lookup, "MAIL_FROM", &mail_defaults.from)?,
                ..mail_defaults
            },
            media: MediaConfig {
                private_key: optional(&lookup, "IMAGEKIT_PRIVATE_KEY"),
                upload_url: try_load(&lookup, "IMAGEKIT_UPLOAD_URL", &media_defaults.upload_url)?,
            },
        })
    }
}

fn try_load<T, F>(lookup: &F, key: &str, default: &str) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: Display,
    F: Fn(&str) -> Option<String>,
{
    lookup(key)
        .unwrap_or_else(|| {
            info!("{key} not set, using default: {default}");
            default.to_string()
        })
        .trim()
        .parse()
        .map_err(|e: T::Err| {
            warn!("Invalid {key} value: {e}");
            ConfigError {
                key: key.into(),
                reason: e.to_string(),
            }
        })
}

/// Unset and blank values are both treated as absent.
fn optional<F>(lookup: &F, key: &str) -> Option<String>
where
    F: Fn(&str) -> Option<String>,
{
    lookup(key)
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
