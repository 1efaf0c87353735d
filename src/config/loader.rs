//! Configuration loading from disk.

use std::fs;
use std::path::Path;

use crate::config::schema::AppConfig;
use crate::config::validation::{validate_config, ValidationError};

/// Error type for configuration loading.
#[derive(Debug)]
pub enum ConfigError {
    Io(std::io::Error),
    Parse(toml::de::Error),
    Validation(Vec<ValidationError>),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::Io(e) => write!(f, "IO error: {}", e),
            ConfigError::Parse(e) => write!(f, "Parse error: {}", e),
            ConfigError::Validation(errors) => {
                write!(f, "Validation failed: ")?;
                for (i, err) in errors.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", err)?;
                }
                Ok(())
            }
        }
    }
}

impl std::error::Error for ConfigError {}

/// Parse and validate configuration from TOML text.
pub fn parse_config(content: &str) -> Result<AppConfig, ConfigError> {
    let config: AppConfig = toml::from_str(content).map_err(ConfigError::Parse)?;
    validate_config(&config).map_err(ConfigError::Validation)?;
    Ok(config)
}

/// Load and validate configuration from a TOML file.
pub fn load_config(path: &Path) -> Result<AppConfig, ConfigError> {
    let content = fs::read_to_string(path).map_err(ConfigError::Io)?;
    parse_config(&content)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::schema::{ConventionMode, MissingExportPolicy, RendererKind};

    #[test]
    fn test_parse_minimal() {
        let config = parse_config(
            r#"
            [routing]
            path = "/srv/routes"
            "#,
        )
        .unwrap();
        assert_eq!(config.routing.mode, ConventionMode::Standard);
        assert_eq!(config.routing.extensions, vec!["rs".to_string()]);
        assert_eq!(config.server.request_timeout_secs, 30);
    }

    #[test]
    fn test_parse_template_mode() {
        let config = parse_config(
            r#"
            [routing]
            path = "/srv/site"
            mode = "template"
            missing_export = "warn"

            [routing.template]
            regex = '^(\w+)\.md$'
            export = "render"
            renderer = "raw"

            [observability]
            log_format = "json"
            "#,
        )
        .unwrap();
        assert_eq!(config.routing.mode, ConventionMode::Template);
        assert_eq!(config.routing.missing_export, MissingExportPolicy::Warn);
        assert_eq!(config.routing.template.renderer, RendererKind::Raw);
    }

    #[test]
    fn test_validation_error_display() {
        let err = parse_config("[routing]\npath = \"relative\"").unwrap_err();
        assert_eq!(
            err.to_string(),
            "Validation failed: routing.path relative is not absolute"
        );
    }

    #[test]
    fn test_parse_error() {
        assert!(matches!(
            parse_config("[routing\n"),
            Err(ConfigError::Parse(_))
        ));
    }
}
