//! Logging configuration and setup
//!
//! This module provides logging initialization and structured logging utilities
//! for the invitation and group workflows.

use std::path::Path;

use tracing::{info, warn, error};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

use crate::config::LoggingConfig;
use crate::utils::errors::{HubError, Result};

/// Initialize logging based on configuration.
///
/// The returned guard flushes the file appender on drop and must be held for
/// the lifetime of the process.
pub fn init_logging(config: &LoggingConfig) -> Result<Option<WorkerGuard>> {
    let filter = EnvFilter::try_new(&config.level)
        .map_err(|e| HubError::Config(format!("Invalid log filter '{}': {}", config.level, e)))?;

    let stdout_layer = if config.json {
        tracing_subscriber::fmt::layer().json().with_writer(std::io::stdout).boxed()
    } else {
        tracing_subscriber::fmt::layer().with_writer(std::io::stdout).boxed()
    };

    let (file_layer, guard) = match config.file_path.as_deref() {
        Some(file_path) => {
            let path = Path::new(file_path);
            let directory = path.parent().filter(|p| !p.as_os_str().is_empty()).unwrap_or(Path::new("."));
            let file_name = path
                .file_name()
                .map(|n| n.to_string_lossy().to_string())
                .unwrap_or_else(|| "instructor-hub.log".to_string());

            let file_appender = tracing_appender::rolling::daily(directory, file_name);
            let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);
            let layer = tracing_subscriber::fmt::layer()
                .with_ansi(false)
                .with_writer(non_blocking)
                .boxed();
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(stdout_layer)
        .with(file_layer)
        .try_init()
        .map_err(|e| HubError::Config(format!("Logging already initialized: {}", e)))?;

    info!("Logging initialized with level: {}", config.level);
    Ok(guard)
}

/// Log invitation lifecycle transitions
pub fn log_invitation_event(invitation: &str, event: &str, user_id: Option<u64>, details: Option<&str>) {
    info!(
        invitation = invitation,
        event = event,
        user_id = user_id,
        details = details,
        "Invitation event occurred"
    );
}

/// Log group events
pub fn log_group_event(group_id: u64, event: &str, user_id: Option<u64>, details: Option<&str>) {
    info!(
        group_id = group_id,
        event = event,
        user_id = user_id,
        details = details,
        "Group event occurred"
    );
}

/// Log capacity denials
pub fn log_capacity_denied(kind: &str, subject: u64, used: u32, limit: u32) {
    warn!(
        kind = kind,
        subject = subject,
        used = used,
        limit = limit,
        "Capacity limit reached"
    );
}

/// Log API errors with context
pub fn log_api_error(api: &str, error: &str, context: Option<&str>) {
    error!(
        api = api,
        error = error,
        context = context,
        "API error occurred"
    );
}
