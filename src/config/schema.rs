//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the router.
//! All types derive Serde traits for deserialization from config files.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Root configuration.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct AppConfig {
    /// Route discovery settings.
    pub routing: RoutingSettings,

    /// Server settings used by `serve`.
    pub server: ServerConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// Route discovery settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct RoutingSettings {
    /// Absolute root of the route tree.
    pub path: PathBuf,

    /// Which naming convention family is active.
    pub mode: ConventionMode,

    /// File extensions recognised in standard mode (without the dot).
    pub extensions: Vec<String>,

    /// Template mode settings.
    pub template: TemplateSettings,

    /// Handling of matched files that export nothing usable.
    pub missing_export: MissingExportPolicy,
}

impl Default for RoutingSettings {
    fn default() -> Self {
        Self {
            path: PathBuf::new(),
            mode: ConventionMode::Standard,
            extensions: vec!["rs".to_string()],
            template: TemplateSettings::default(),
            missing_export: MissingExportPolicy::default(),
        }
    }
}

/// Convention family.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ConventionMode {
    /// Method files, `page` and `route` files.
    #[default]
    Standard,
    /// Pattern-matched template files.
    Template,
}

/// Template file matching.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TemplateSettings {
    /// Literal file name to match (e.g. "post.md").
    pub pattern: Option<String>,

    /// Regex to match file names against. Exclusive with `pattern`.
    pub regex: Option<String>,

    /// Render export to serve.
    pub export: String,

    /// How template source becomes HTML.
    pub renderer: RendererKind,
}

impl Default for TemplateSettings {
    fn default() -> Self {
        Self {
            pattern: None,
            regex: None,
            export: "render".to_string(),
            renderer: RendererKind::Markdown,
        }
    }
}

/// Built-in template renderers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum RendererKind {
    /// CommonMark to HTML.
    #[default]
    Markdown,
    /// Serve the file content unchanged.
    Raw,
}

/// What to do when a matched route file exports none of the expected handlers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum MissingExportPolicy {
    /// Skip silently (debug log only).
    #[default]
    Ignore,
    /// Skip with a warning.
    Warn,
    /// Fail discovery.
    Deny,
}

/// Server configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Bind address (e.g., "127.0.0.1:3000").
    pub bind_address: String,

    /// Request timeout in seconds.
    pub request_timeout_secs: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_address: "127.0.0.1:3000".to_string(),
            request_timeout_secs: 30,
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Log output format.
    pub log_format: LogFormat,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            log_format: LogFormat::Pretty,
        }
    }
}

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}
