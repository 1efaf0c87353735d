//! Startup orchestration.
//!
//! # Responsibilities
//! - Turn a validated AppConfig into a discovery run
//! - Pick the template loader matching the configured renderer
//! - Build the composed router before any listener is bound
//!
//! # Design Decisions
//! - Only template mode can be driven from config alone; standard mode
//!   handlers are compiled in, so callers use `get_routes` with a registry

use axum::Router;
use thiserror::Error;

use crate::config::schema::{AppConfig, ConventionMode, RendererKind, TemplateSettings};
use crate::config::ConfigError;
use crate::routing::{
    ResolvedRoute, RouteDiscovery, RoutingConfig, RoutingError, TemplateLoader,
};

/// Errors that stop the process from starting.
#[derive(Debug, Error)]
pub enum StartupError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Routing(#[from] RoutingError),

    #[error("Standard mode needs compiled-in handlers; use `get_routes` with a ModuleRegistry")]
    StandardModeUnsupported,

    #[error("Failed to initialize logging: {0}")]
    Logging(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Template loader for the configured renderer.
pub fn template_loader(settings: &TemplateSettings) -> TemplateLoader {
    match settings.renderer {
        RendererKind::Markdown => TemplateLoader::markdown(settings.export.clone()),
        RendererKind::Raw => TemplateLoader::new()
            .renderer(settings.export.clone(), |source| Ok(source.to_string())),
    }
}

fn template_discovery(config: &AppConfig) -> Result<RouteDiscovery<TemplateLoader>, StartupError> {
    if config.routing.mode != ConventionMode::Template {
        return Err(StartupError::StandardModeUnsupported);
    }
    let routing = RoutingConfig::try_from(&config.routing)?;
    let loader = template_loader(&config.routing.template);
    Ok(RouteDiscovery::new(routing, loader)?)
}

/// Discover the route table described by `config`.
pub async fn discover_routes(config: &AppConfig) -> Result<Vec<ResolvedRoute>, StartupError> {
    Ok(template_discovery(config)?.resolve().await?)
}

/// Discover and assemble the router described by `config`.
pub async fn build_router(config: &AppConfig) -> Result<Router, StartupError> {
    Ok(template_discovery(config)?.router().await?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::routing::RouteMethod;

    fn site() -> (tempfile::TempDir, AppConfig) {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(dir.path().join("blog")).unwrap();
        std::fs::write(dir.path().join("index.md"), "# Home").unwrap();
        std::fs::write(dir.path().join("blog/index.md"), "# Blog").unwrap();

        let mut config = AppConfig::default();
        config.routing.path = dir.path().to_path_buf();
        config.routing.mode = ConventionMode::Template;
        config.routing.template.pattern = Some("index.md".into());
        (dir, config)
    }

    #[tokio::test]
    async fn test_discover_template_site() {
        let (_dir, config) = site();
        let routes = discover_routes(&config).await.unwrap();
        let paths: Vec<_> = routes.iter().map(|r| r.url_path.as_str()).collect();
        assert_eq!(paths, vec!["/", "/blog"]);
        assert!(routes
            .iter()
            .all(|r| r.methods.keys().eq([RouteMethod::Get].iter())));
    }

    #[tokio::test]
    async fn test_standard_mode_unsupported() {
        let (_dir, mut config) = site();
        config.routing.mode = ConventionMode::Standard;
        assert!(matches!(
            build_router(&config).await,
            Err(StartupError::StandardModeUnsupported)
        ));
    }
}
