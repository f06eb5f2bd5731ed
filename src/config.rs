//! Server Configuration
//!
//! Settings are read from the environment, after loading an optional `.env`.

use std::net::SocketAddr;
use thiserror::Error;

pub const ADDR_VAR: &str = "STOREFRONT_ADDR";
pub const ADMINS_VAR: &str = "STOREFRONT_ADMINS";
pub const SEED_VAR: &str = "STOREFRONT_SEED";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{var} is not a valid socket address: {value}")]
    InvalidAddr { var: &'static str, value: String },

    #[error("{var} must be true or false, got {value}")]
    InvalidBool { var: &'static str, value: String },
}

#[derive(Debug, Clone, PartialEq)]
pub struct AppConfig {
    pub bind_addr: SocketAddr,
    /// Principals allowed to run admin operations
    pub admins: Vec<String>,
    /// Populate the starter menu at startup
    pub seed: bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from(([0, 0, 0, 0], 8000)),
            admins: Vec::new(),
            seed: false,
        }
    }
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        // A missing .env file is normal outside development.
        let _ = dotenvy::dotenv();
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    /// Builds a config from an arbitrary variable source
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(value) = lookup(ADDR_VAR) {
            config.bind_addr = value.trim().parse::<SocketAddr>().map_err(|_| ConfigError::InvalidAddr {
                var: ADDR_VAR,
                value: value.clone(),
            })?;
        }

        if let Some(value) = lookup(ADMINS_VAR) {
            config.admins = value
                .split(',')
                .map(str::trim)
                .filter(|p| !p.is_empty())
                .map(String::from)
                .collect();
        }

        if let Some(value) = lookup(SEED_VAR) {
            config.seed = match value.trim().to_ascii_lowercase().as_str() {
                "1" | "true" | "yes" => true,
                "0" | "false" | "no" | "" => false,
                _ => {
                    return Err(ConfigError::InvalidBool {
                        var: SEED_VAR,
                        value,
                    })
                }
            };
        }

        Ok(config)
    }
}
