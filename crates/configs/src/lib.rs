//! ironchan/crates/configs/src/lib.rs
//!
//! Typed application configuration. Values layer defaults under
//! `IRONCHAN__`-prefixed environment variables (`IRONCHAN__SERVER__BIND`,
//! `IRONCHAN__GLOBAL_LIMITS__FIELD_LENGTH__BAN_REASON`, ...), with `.env`
//! support for development. Secrets never leave their `SecretString`
//! wrappers except at the point of use.

use config::{Config, Environment};
use secrecy::SecretString;
use serde::Deserialize;
use thiserror::Error;
use tracing::warn;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("configuration error: {0}")]
    Load(#[from] config::ConfigError),
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub bind: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: "127.0.0.1:7000".to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PostsLimit {
    pub anon: usize,
    pub staff: usize,
}

impl Default for PostsLimit {
    fn default() -> Self {
        Self {
            anon: 10,
            staff: 100,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct MultiInputs {
    pub posts: PostsLimit,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct FieldLength {
    pub postpassword: usize,
    pub report_reason: usize,
    pub ban_reason: usize,
    pub log_message: usize,
}

impl Default for FieldLength {
    fn default() -> Self {
        Self {
            postpassword: 64,
            report_reason: 50,
            ban_reason: 50,
            log_message: 50,
        }
    }
}

/// Ceilings consumed by the moderation pipeline.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct GlobalLimits {
    pub multi_inputs: MultiInputs,
    pub field_length: FieldLength,
}

const DEV_SECRET: &str = "insecure-dev-secret";

fn dev_secret() -> SecretString {
    SecretString::from(DEV_SECRET.to_string())
}

/// Salts for post passwords and ip cloaks.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct Secrets {
    pub post_password_secret: SecretString,
    pub ip_hash_secret: SecretString,
}

impl Default for Secrets {
    fn default() -> Self {
        Self {
            post_password_secret: dev_secret(),
            ip_hash_secret: dev_secret(),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub global_limits: GlobalLimits,
    pub secrets: Secrets,
}

/// Load configuration from the environment, reading `.env` first if present.
pub fn load() -> Result<AppConfig, ConfigError> {
    dotenvy::dotenv().ok();
    let settings = Config::builder()
        .add_source(Environment::with_prefix("IRONCHAN").separator("__"))
        .build()?;
    let app: AppConfig = settings.try_deserialize()?;
    if std::env::var("IRONCHAN__SECRETS__POST_PASSWORD_SECRET").is_err() {
        warn!("post password secret not set, using the development default");
    }
    Ok(app)
}
