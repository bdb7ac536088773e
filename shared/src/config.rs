//! Configuration management for Lambda functions.

use std::env;

use crate::error::{Error, Result};

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    /// Static bearer credential for the upstream API
    pub api_token: String,
    /// Identifier of the single database we query
    pub database_id: String,
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// Both variables are required; a missing one is reported by name so the
    /// handler can surface a configuration error without touching upstream.
    pub fn from_env() -> Result<Self> {
        Ok(Self {
            api_token: env::var("NOTION_API_TOKEN")
                .map_err(|_| Error::Config("NOTION_API_TOKEN not set".to_string()))?,
            database_id: env::var("NOTION_DATABASE_ID")
                .map_err(|_| Error::Config("NOTION_DATABASE_ID not set".to_string()))?,
        })
    }
}
