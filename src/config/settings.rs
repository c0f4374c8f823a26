//! Application settings management
//!
//! This module defines the configuration structure and provides methods
//! for loading settings from config files and environment variables.

use serde::{Deserialize, Serialize};

/// Main application configuration structure
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct Settings {
    pub strapi: StrapiConfig,
    pub invitations: InvitationConfig,
    pub membership: MembershipConfig,
    pub logging: LoggingConfig,
    pub features: FeaturesConfig,
}

/// Strapi REST API configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct StrapiConfig {
    pub base_url: String,
    pub api_prefix: String,
    pub api_token: Option<String>,
    pub timeout_seconds: u64,
    pub page_size: u32,
}

/// Invitation workflow configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct InvitationConfig {
    /// Also scan every invitation and filter client-side when listing received ones
    pub full_scan_fallback: bool,
    pub max_message_length: usize,
}

/// Group membership write configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct MembershipConfig {
    pub max_write_attempts: u32,
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    pub file_path: Option<String>,
    pub json: bool,
}

/// Feature flags configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct FeaturesConfig {
    pub interactions: bool,
}

impl Settings {
    /// Load settings from configuration file and environment variables
    pub fn new() -> Result<Self, config::ConfigError> {
        let settings = config::Config::builder()
            .add_source(config::File::with_name("config").required(false))
            .add_source(config::Environment::with_prefix("INSTRUCTOR_HUB").separator("__"))
            .build()?;

        settings.try_deserialize()
    }

    /// Validate configuration settings
    pub fn validate(&self) -> Result<(), crate::utils::errors::HubError> {
        super::validation::validate_settings(self)
    }
}

impl Default for StrapiConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:1337".to_string(),
            api_prefix: "/api".to_string(),
            api_token: None,
            timeout_seconds: 10,
            page_size: 100,
        }
    }
}

impl Default for InvitationConfig {
    fn default() -> Self {
        Self {
            full_scan_fallback: false,
            max_message_length: 1000,
        }
    }
}

impl Default for MembershipConfig {
    fn default() -> Self {
        Self { max_write_attempts: 3 }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            file_path: None,
            json: false,
        }
    }
}

impl Default for FeaturesConfig {
    fn default() -> Self {
        Self { interactions: true }
    }
}
