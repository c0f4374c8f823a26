//! Helper functions and utilities
//!
//! This module contains common helper functions used throughout the crate.

use std::collections::HashSet;
use std::hash::Hash;

use chrono::{DateTime, Duration, Utc};

/// Maximum length of a group display name
pub const MAX_GROUP_NAME_LENGTH: usize = 100;

/// Format a timestamp for display
pub fn format_timestamp(timestamp: DateTime<Utc>) -> String {
    timestamp.format("%Y-%m-%d %H:%M:%S UTC").to_string()
}

/// Format a timestamp for user display (relative time)
pub fn format_relative_time(timestamp: DateTime<Utc>) -> String {
    let now = Utc::now();
    let diff = now.signed_duration_since(timestamp);

    if diff < Duration::minutes(1) {
        "just now".to_string()
    } else if diff < Duration::hours(1) {
        format!("{} minutes ago", diff.num_minutes())
    } else if diff < Duration::days(1) {
        format!("{} hours ago", diff.num_hours())
    } else if diff < Duration::weeks(1) {
        format!("{} days ago", diff.num_days())
    } else {
        format_timestamp(timestamp)
    }
}

/// Normalize whitespace in text
pub fn normalize_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Normalize a group name, returning `None` when it is empty or too long
pub fn normalize_group_name(name: &str) -> Option<String> {
    let normalized = normalize_whitespace(name);
    if normalized.is_empty() || normalized.chars().count() > MAX_GROUP_NAME_LENGTH {
        None
    } else {
        Some(normalized)
    }
}

/// Keep the first item for every key, preserving order
pub fn dedupe_by_key<T, K, F>(items: Vec<T>, mut key: F) -> Vec<T>
where
    K: Eq + Hash,
    F: FnMut(&T) -> K,
{
    let mut seen = HashSet::new();
    items.into_iter().filter(|item| seen.insert(key(item))).collect()
}

/// Build a "X of Y used" message
pub fn usage_summary(used: u32, limit: Option<u32>) -> String {
    match limit {
        Some(limit) => format!("{} of {} used", used, limit),
        None => format!("{} used (unlimited)", used),
    }
}
