use std::collections::HashMap;
use thiserror::Error;

use crate::datasource::coingecko::DEFAULT_PRICE_API_URL;
use crate::query::{SortConfig, SortDirection};

#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub database_path: String,
    pub price_api_url: String,
    pub quote_currency: String,
    /// Sort applied to list endpoints when the request names none.
    pub default_sort: SortConfig,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingEnv(String),
    #[error("Invalid value for {0}: {1}")]
    InvalidValue(String, String),
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_env_map(std::env::vars().collect())
    }

    pub fn from_env_map(env_map: HashMap<String, String>) -> Result<Self, ConfigError> {
        let port = env_map
            .get("PORT")
            .map(|s| s.as_str())
            .unwrap_or("8080")
            .parse::<u16>()
            .map_err(|_| {
                ConfigError::InvalidValue("PORT".to_string(), "must be a valid u16".to_string())
            })?;

        let database_path = env_map
            .get("DATABASE_PATH")
            .filter(|s| !s.trim().is_empty())
            .cloned()
            .ok_or_else(|| ConfigError::MissingEnv("DATABASE_PATH".to_string()))?;

        let price_api_url = env_map
            .get("PRICE_API_URL")
            .cloned()
            .unwrap_or_else(|| DEFAULT_PRICE_API_URL.to_string());
        if !price_api_url.starts_with("http://") && !price_api_url.starts_with("https://") {
            return Err(ConfigError::InvalidValue(
                "PRICE_API_URL".to_string(),
                format!("must be an http(s) URL, got {}", price_api_url),
            ));
        }

        let quote_currency = env_map
            .get("QUOTE_CURRENCY")
            .map(|s| s.trim().to_lowercase())
            .unwrap_or_else(|| "usd".to_string());
        if quote_currency.is_empty() || !quote_currency.chars().all(|c| c.is_ascii_alphanumeric()) {
            return Err(ConfigError::InvalidValue(
                "QUOTE_CURRENCY".to_string(),
                format!("must be a currency code, got {:?}", quote_currency),
            ));
        }

        let sort_key = env_map
            .get("DEFAULT_SORT_KEY")
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| "entryDate".to_string());

        let sort_direction = match env_map.get("DEFAULT_SORT_DIR") {
            None => SortDirection::Desc,
            Some(raw) => raw.parse::<SortDirection>().map_err(|_| {
                ConfigError::InvalidValue(
                    "DEFAULT_SORT_DIR".to_string(),
                    format!("must be asc or desc, got {}", raw),
                )
            })?,
        };

        Ok(Config {
            port,
            database_path,
            price_api_url,
            quote_currency,
            default_sort: SortConfig::new(sort_key, sort_direction),
        })
    }
}
