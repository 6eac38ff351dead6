//! Configuration management for ACE contact search

use crate::utils::DisplayZone;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Main configuration structure
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// Remote API configuration
    #[serde(default)]
    pub api: ApiConfig,

    /// Filter session behavior
    #[serde(default)]
    pub session: SessionConfig,

    /// Result display configuration
    #[serde(default)]
    pub display: DisplayConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Remote API configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Base URL the `/api/ace/...` paths are appended to
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Maximum number of contacts a query returns
    #[serde(default = "default_count_max")]
    pub count_max: u32,

    /// Offset of the first contact returned
    #[serde(default)]
    pub count_min: u32,

    /// Request timeout in seconds
    #[serde(default = "default_request_timeout")]
    pub request_timeout: u64,

    /// Session cookie forwarded with every request
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub session_cookie: Option<String>,

    /// API key sent as `X-API-Key`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
}

/// What happens to a selected team or agent that stops matching its parent
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StaleSelectionPolicy {
    /// Drop the selection when it no longer appears in the selectable list
    #[default]
    Clear,
    /// Keep filtering on the hidden selection
    Preserve,
}

/// How an empty contact response affects displayed rows
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EmptyResultsPolicy {
    /// Leave the previous rows on display
    #[default]
    Retain,
    /// Replace the previous rows with an empty list
    Clear,
}

/// How an evaluation state id without a label is projected
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnknownStatePolicy {
    /// Show a fallback label
    #[default]
    Fallback,
    /// Fail the projection
    Reject,
}

/// Filter session behavior
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Stale team/agent selection handling
    #[serde(default)]
    pub stale_selection: StaleSelectionPolicy,

    /// Empty contact response handling
    #[serde(default)]
    pub empty_results: EmptyResultsPolicy,

    /// Unknown evaluation state handling
    #[serde(default)]
    pub unknown_eval_state: UnknownStatePolicy,

    /// Where an unauthorized session is sent
    #[serde(default = "default_login_path")]
    pub login_path: String,

    /// Capacity of the session event channel
    #[serde(default = "default_event_capacity")]
    pub event_capacity: usize,
}

/// Result display configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DisplayConfig {
    /// Fixed UTC offset for dates and times; the local zone when unset
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub utc_offset_minutes: Option<i32>,
}

impl DisplayConfig {
    /// Zone that contact timestamps are rendered in
    #[must_use]
    pub fn zone(&self) -> DisplayZone {
        self.utc_offset_minutes
            .and_then(DisplayZone::from_offset_minutes)
            .unwrap_or(DisplayZone::Local)
    }
}

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Log format (json or text)
    #[serde(default = "default_log_format")]
    pub format: String,
}

// Default value functions
fn default_base_url() -> String {
    "http://localhost:8080".to_string()
}

const fn default_count_max() -> u32 {
    49
}

const fn default_request_timeout() -> u64 {
    30
}

fn default_login_path() -> String {
    "/ace/nouserinsession".to_string()
}

const fn default_event_capacity() -> usize {
    64
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "json".to_string()
}

impl ApiConfig {
    /// Request timeout as a duration
    #[must_use]
    pub const fn timeout(&self) -> std::time::Duration {
        std::time::Duration::from_secs(self.request_timeout)
    }
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            count_max: default_count_max(),
            count_min: 0,
            request_timeout: default_request_timeout(),
            session_cookie: None,
            api_key: None,
        }
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            stale_selection: StaleSelectionPolicy::default(),
            empty_results: EmptyResultsPolicy::default(),
            unknown_eval_state: UnknownStatePolicy::default(),
            login_path: default_login_path(),
            event_capacity: default_event_capacity(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

impl Config {
    /// Load configuration from an optional `ace-search` file and `ACE_*`
    /// environment variables
    ///
    /// # Errors
    ///
    /// Returns an error if configuration cannot be loaded or parsed.
    pub fn load() -> crate::Result<Self> {
        Self::build(config::File::with_name("ace-search").required(false))
    }

    /// Load configuration from an explicit file, still honoring `ACE_*`
    /// environment overrides
    ///
    /// # Errors
    ///
    /// Returns an error if the file is missing or cannot be parsed.
    pub fn from_file(path: &Path) -> crate::Result<Self> {
        Self::build(config::File::from(path).required(true))
    }

    fn build<S>(file: S) -> crate::Result<Self>
    where
        S: config::Source + Send + Sync + 'static,
    {
        let config = config::Config::builder()
            .add_source(file)
            .add_source(
                config::Environment::with_prefix("ACE")
                    .prefix_separator("_")
                    .separator("__"),
            )
            .build()?;

        Ok(config.try_deserialize()?)
    }
}
