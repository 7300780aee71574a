use std::env;
use std::path::PathBuf;

use thiserror::Error;

pub const ENV_BOT_TOKEN: &str = "BOT_TOKEN";
pub const ENV_OUTPUT_DIR: &str = "COURIER_OUTPUT_DIR";
pub const ENV_KEEPALIVE_URL: &str = "COURIER_KEEPALIVE_URL";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("BOT_TOKEN is not set")]
    MissingToken,
}

/// Process configuration; the transport token is the only required secret.
#[derive(Debug, Clone)]
pub struct Config {
    pub bot_token: String,
    pub output_dir: PathBuf,
    pub keepalive_url: String,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        let bot_token = env::var(ENV_BOT_TOKEN)
            .ok()
            .filter(|token| !token.trim().is_empty())
            .ok_or(ConfigError::MissingToken)?;
        let output_dir = env::var(ENV_OUTPUT_DIR)
            .unwrap_or_else(|_| "downloads".to_string())
            .into();
        let keepalive_url =
            env::var(ENV_KEEPALIVE_URL).unwrap_or_else(|_| "http://0.0.0.0:8080".to_string());
        Ok(Self {
            bot_token,
            output_dir,
            keepalive_url,
        })
    }
}
