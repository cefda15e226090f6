//! Configuration management for Citescope
//!
//! Supports loading configuration from:
//! - Environment variables (prefixed with APP__)
//! - Configuration files (config/default, config/{APP_ENV}, config/local)
//! - Default values

use crate::errors::{AppError, Result};
use config::{Config, ConfigError, Environment, File};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Main application configuration
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct AppConfig {
    /// Backend API configuration
    #[serde(default)]
    pub api: ApiConfig,

    /// Radial layout geometry
    #[serde(default)]
    pub layout: LayoutConfig,

    /// Render model presentation
    #[serde(default)]
    pub render: RenderConfig,

    /// Chat transcript configuration
    #[serde(default)]
    pub chat: ChatConfig,

    /// Observability configuration
    #[serde(default)]
    pub observability: ObservabilityConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ApiConfig {
    /// Base URL of the paper backend
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Request timeout in seconds (applies to connect and non-streaming calls)
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,

    /// Citation depth requested from the graph endpoint; omitted when unset
    #[serde(default = "default_graph_depth")]
    pub graph_depth: Option<u32>,

    /// Number of search hits requested
    #[serde(default = "default_search_k")]
    pub search_k: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Deserialize, Serialize)]
pub struct LayoutConfig {
    /// X coordinate of the focal node
    #[serde(default = "default_center_x")]
    pub center_x: f64,

    /// Y coordinate of the focal node
    #[serde(default = "default_center_y")]
    pub center_y: f64,

    /// Distance of every neighbour from the focal node
    #[serde(default = "default_radius")]
    pub radius: f64,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RenderConfig {
    /// Maximum number of characters kept from a node label
    #[serde(default = "default_label_max_chars")]
    pub label_max_chars: usize,

    /// Suffix appended to truncated labels
    #[serde(default = "default_ellipsis")]
    pub ellipsis: String,

    /// Node box width in layout units
    #[serde(default = "default_node_width")]
    pub node_width: u32,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ChatConfig {
    /// Text of the ai message shown before the first chunk arrives
    #[serde(default = "default_placeholder")]
    pub placeholder: String,

    /// Greeting template; `{title}` is replaced by the opened paper title
    #[serde(default = "default_greeting")]
    pub greeting: String,

    /// Maximum accepted user message length in characters
    #[serde(default = "default_max_message_chars")]
    pub max_message_chars: u64,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error); RUST_LOG wins when set
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Enable JSON logging
    #[serde(default)]
    pub json_logging: bool,
}

// Default value functions
fn default_base_url() -> String { "http://localhost:8000".to_string() }
fn default_timeout() -> u64 { 30 }
fn default_graph_depth() -> Option<u32> { Some(1) }
fn default_search_k() -> usize { 9 }
fn default_center_x() -> f64 { 400.0 }
fn default_center_y() -> f64 { 300.0 }
fn default_radius() -> f64 { 300.0 }
fn default_label_max_chars() -> usize { 30 }
fn default_ellipsis() -> String { "...".to_string() }
fn default_node_width() -> u32 { 160 }
fn default_placeholder() -> String { "...".to_string() }
fn default_greeting() -> String { "System ready. Analyzing \"{title}\"...".to_string() }
fn default_max_message_chars() -> u64 { 2000 }
fn default_log_level() -> String { "info".to_string() }

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout_secs: default_timeout(),
            graph_depth: default_graph_depth(),
            search_k: default_search_k(),
        }
    }
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            center_x: default_center_x(),
            center_y: default_center_y(),
            radius: default_radius(),
        }
    }
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            label_max_chars: default_label_max_chars(),
            ellipsis: default_ellipsis(),
            node_width: default_node_width(),
        }
    }
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            placeholder: default_placeholder(),
            greeting: default_greeting(),
            max_message_chars: default_max_message_chars(),
        }
    }
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            json_logging: false,
        }
    }
}

impl AppConfig {
    /// Load configuration from environment and files
    pub fn load() -> std::result::Result<Self, ConfigError> {
        let env = std::env::var("APP_ENV").unwrap_or_else(|_| "development".to_string());

        let config = Config::builder()
            // Load base config file
            .add_source(File::with_name("config/default").required(false))

            // Load environment-specific config
            .add_source(File::with_name(&format!("config/{}", env)).required(false))

            // Load local overrides
            .add_source(File::with_name("config/local").required(false))

            // e.g., APP__API__BASE_URL=http://papers.internal:8000
            .add_source(
                Environment::with_prefix("APP")
                    .separator("__")
                    .try_parsing(true)
            )

            .build()?;

        config.try_deserialize()
    }

    /// Load from a specific file
    pub fn from_file(path: &str) -> std::result::Result<Self, ConfigError> {
        let config = Config::builder()
            .add_source(File::with_name(path))
            .add_source(
                Environment::with_prefix("APP")
                    .separator("__")
                    .try_parsing(true)
            )
            .build()?;

        config.try_deserialize()
    }

    /// Reject values the pipeline cannot work with
    pub fn validate(&self) -> Result<()> {
        if self.api.base_url.trim().is_empty() {
            return Err(AppError::Configuration {
                message: "api.base_url must not be empty".to_string(),
            });
        }
        if !self.layout.radius.is_finite() || self.layout.radius <= 0.0 {
            return Err(AppError::Configuration {
                message: format!("layout.radius must be positive, got {}", self.layout.radius),
            });
        }
        if !self.layout.center_x.is_finite() || !self.layout.center_y.is_finite() {
            return Err(AppError::Configuration {
                message: "layout center must be finite".to_string(),
            });
        }
        if self.render.label_max_chars == 0 {
            return Err(AppError::Configuration {
                message: "render.label_max_chars must be at least 1".to_string(),
            });
        }
        Ok(())
    }

    /// Get request timeout as Duration
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.api.timeout_secs)
    }
}

impl ChatConfig {
    /// Render the greeting for a freshly opened paper
    pub fn greeting_for(&self, title: &str) -> String {
        self.greeting.replace("{title}", title)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert_eq!(config.api.base_url, "http://localhost:8000");
        assert_eq!(config.api.graph_depth, Some(1));
        assert_eq!(config.layout.radius, 300.0);
        assert_eq!(config.render.label_max_chars, 30);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_rejects_degenerate_radius() {
        let mut config = AppConfig::default();
        config.layout.radius = 0.0;
        assert!(config.validate().is_err());

        config.layout.radius = f64::NAN;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_greeting_template() {
        let chat = ChatConfig::default();
        assert_eq!(
            chat.greeting_for("Attention Is All You Need"),
            "System ready. Analyzing \"Attention Is All You Need\"..."
        );
    }

    #[test]
    fn test_partial_sections_fill_defaults() {
        let config: AppConfig = Config::builder()
            .set_override("layout.radius", 250.0)
            .and_then(|b| b.set_override("api.base_url", "http://papers:9000"))
            .and_then(|b| b.build())
            .and_then(|c| c.try_deserialize())
            .unwrap();

        assert_eq!(config.layout.radius, 250.0);
        assert_eq!(config.layout.center_x, 400.0);
        assert_eq!(config.api.base_url, "http://papers:9000");
        assert_eq!(config.api.search_k, 9);
    }
}
