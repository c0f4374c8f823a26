//! Configuration validation module
//!
//! This module provides validation functions for application configuration
//! to ensure all required settings are properly configured.

use crate::utils::errors::{HubError, Result};
use super::Settings;

/// Validate all configuration settings
pub fn validate_settings(settings: &Settings) -> Result<()> {
    validate_strapi_config(&settings.strapi)?;
    validate_invitation_config(&settings.invitations)?;
    validate_membership_config(&settings.membership)?;
    validate_logging_config(&settings.logging)?;

    Ok(())
}

/// Validate Strapi configuration
fn validate_strapi_config(config: &super::StrapiConfig) -> Result<()> {
    if config.base_url.is_empty() {
        return Err(HubError::Config(
            "Strapi base URL is required".to_string()
        ));
    }

    url::Url::parse(&config.base_url)
        .map_err(|e| HubError::Config(format!("Invalid Strapi base URL '{}': {}", config.base_url, e)))?;

    if !config.api_prefix.is_empty() && !config.api_prefix.starts_with('/') {
        return Err(HubError::Config(
            "Strapi API prefix must start with '/'".to_string()
        ));
    }

    if config.timeout_seconds == 0 {
        return Err(HubError::Config(
            "Strapi timeout must be greater than 0".to_string()
        ));
    }

    if config.page_size == 0 || config.page_size > 100 {
        return Err(HubError::Config(
            "Strapi page size must be between 1 and 100".to_string()
        ));
    }

    if matches!(config.api_token.as_deref(), Some(token) if token.trim().is_empty()) {
        return Err(HubError::Config(
            "Strapi API token must not be blank when set".to_string()
        ));
    }

    Ok(())
}

/// Validate invitation configuration
fn validate_invitation_config(config: &super::InvitationConfig) -> Result<()> {
    if config.max_message_length == 0 {
        return Err(HubError::Config(
            "Max invitation message length must be greater than 0".to_string()
        ));
    }

    Ok(())
}

/// Validate membership configuration
fn validate_membership_config(config: &super::MembershipConfig) -> Result<()> {
    if config.max_write_attempts == 0 {
        return Err(HubError::Config(
            "Membership write attempts must be at least 1".to_string()
        ));
    }

    Ok(())
}

/// Validate logging configuration
fn validate_logging_config(config: &super::LoggingConfig) -> Result<()> {
    if config.level.is_empty() {
        return Err(HubError::Config(
            "Log level is required".to_string()
        ));
    }

    let valid_levels = ["trace", "debug", "info", "warn", "error"];
    if !valid_levels.contains(&config.level.as_str()) {
        return Err(HubError::Config(
            format!("Invalid log level: {}. Valid levels: {:?}", config.level, valid_levels)
        ));
    }

    Ok(())
}
