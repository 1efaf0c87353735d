//! Recursive route discovery.
//!
//! # Responsibilities
//! - Walk the root directory tree
//! - Classify entries and reject conflicting layouts per directory
//! - Load matched files and build one method table per file
//! - Normalize, validate and sort the final route list
//!
//! # Design Decisions
//! - Sibling walks and loads of one directory run concurrently within the
//!   calling task (`try_join_all`), no spawning
//! - First failure aborts the run; no partial results escape
//! - The structural check runs before any load of that directory
//! - Output is sorted by URL path so listing order never leaks out

use std::path::{Path, PathBuf};
use std::time::Instant;

use axum::http::StatusCode;
use axum::response::{Html, IntoResponse};
use axum::Router;
use futures_util::future::{try_join, try_join_all, BoxFuture};

use crate::config::schema::{ConventionMode, RoutingSettings};
use crate::observability::metrics;
use crate::routing::error::{RoutingError, RoutingResult};
use crate::routing::fs::{FileSystem, LocalFs};
use crate::routing::loader::{LoadOutcome, ModuleExports, ModuleLoader, Renderer};
use crate::routing::matcher::{
    check_conflicts, Classification, Conventions, FileKind, FilePattern, Matcher,
    TemplateConvention,
};
use crate::routing::normalize::normalize;
use crate::routing::router::{assemble, ensure_unique};
use crate::routing::types::{
    DirectoryEntry, MethodHandler, MethodTable, ResolvedRoute, RouteMethod, RouteResult,
};
use crate::routing::utils::{compact, flatten};

// Shared with the config schema.
pub use crate::config::schema::MissingExportPolicy;

/// Input to a discovery run.
#[derive(Debug, Clone)]
pub struct RoutingConfig {
    /// Absolute directory the tree is rooted at; served as `/`.
    pub root: PathBuf,
    pub conventions: Conventions,
    /// What to do with a matched file that exports nothing usable.
    pub missing_export: MissingExportPolicy,
}

impl RoutingConfig {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            conventions: Conventions::default(),
            missing_export: MissingExportPolicy::default(),
        }
    }

    pub fn with_conventions(mut self, conventions: Conventions) -> Self {
        self.conventions = conventions;
        self
    }

    pub fn with_missing_export(mut self, policy: MissingExportPolicy) -> Self {
        self.missing_export = policy;
        self
    }

    /// Checks that need no I/O.
    pub fn validate(&self) -> RoutingResult<()> {
        if !self.root.is_absolute() {
            return Err(RoutingError::Configuration(format!(
                "Path {} is not absolute",
                self.root.display()
            )));
        }
        match &self.conventions {
            Conventions::Standard { extensions } if extensions.is_empty() => Err(
                RoutingError::Configuration("No route file extensions configured".into()),
            ),
            Conventions::Template(template) if template.export.is_empty() => Err(
                RoutingError::Configuration("Template export name is empty".into()),
            ),
            _ => Ok(()),
        }
    }
}

impl TryFrom<&RoutingSettings> for RoutingConfig {
    type Error = RoutingError;

    fn try_from(settings: &RoutingSettings) -> RoutingResult<Self> {
        let conventions = match settings.mode {
            ConventionMode::Standard => Conventions::Standard {
                extensions: settings.extensions.clone(),
            },
            ConventionMode::Template => {
                let template = &settings.template;
                let pattern = match (&template.pattern, &template.regex) {
                    (Some(literal), None) => FilePattern::Literal(literal.clone()),
                    (None, Some(re)) => FilePattern::Regex(regex::Regex::new(re).map_err(
                        |e| RoutingError::Configuration(format!("Invalid template regex: {e}")),
                    )?),
                    _ => {
                        return Err(RoutingError::Configuration(
                            "Template mode needs exactly one of `pattern` or `regex`".into(),
                        ))
                    }
                };
                Conventions::Template(TemplateConvention {
                    pattern,
                    export: template.export.clone(),
                })
            }
        };

        let config = RoutingConfig::new(&settings.path)
            .with_conventions(conventions)
            .with_missing_export(settings.missing_export);
        config.validate()?;
        Ok(config)
    }
}

/// A configured discovery run.
pub struct RouteDiscovery<L, F = LocalFs> {
    config: RoutingConfig,
    matcher: Box<dyn Matcher>,
    loader: L,
    fs: F,
}

impl<L: ModuleLoader> RouteDiscovery<L, LocalFs> {
    /// Validate `config` and prepare a run against the local filesystem.
    ///
    /// Fails before any I/O if the root is not absolute.
    pub fn new(config: RoutingConfig, loader: L) -> RoutingResult<Self> {
        config.validate()?;
        Ok(Self {
            matcher: config.conventions.matcher(),
            config,
            loader,
            fs: LocalFs,
        })
    }
}

impl<L: ModuleLoader, F: FileSystem> RouteDiscovery<L, F> {
    /// Swap the filesystem collaborator.
    pub fn with_fs<G: FileSystem>(self, fs: G) -> RouteDiscovery<L, G> {
        RouteDiscovery {
            config: self.config,
            matcher: self.matcher,
            loader: self.loader,
            fs,
        }
    }

    pub fn config(&self) -> &RoutingConfig {
        &self.config
    }

    /// Walk `path` and return one result per file that produced handlers.
    pub async fn discover(&self, path: &Path) -> RoutingResult<Vec<RouteResult>> {
        self.walk(path.to_path_buf()).await
    }

    /// Discover from the root and address every result by URL path.
    pub async fn resolve(&self) -> RoutingResult<Vec<ResolvedRoute>> {
        let start = Instant::now();
        let root = &self.config.root;
        tracing::info!(root = %root.display(), "Discovering routes");

        let outcome = self.discover(root).await.and_then(|results| {
            let mut routes = results
                .into_iter()
                .map(|result| {
                    Ok(ResolvedRoute {
                        url_path: normalize(&result.filesystem_path, root)?,
                        source: result.source,
                        capture: result.capture,
                        methods: result.methods,
                    })
                })
                .collect::<RoutingResult<Vec<_>>>()?;
            routes.sort_by(|a, b| {
                a.url_path
                    .cmp(&b.url_path)
                    .then_with(|| a.source.cmp(&b.source))
            });
            ensure_unique(&routes)?;
            Ok(routes)
        });

        match &outcome {
            Ok(routes) => {
                tracing::info!(
                    routes = routes.len(),
                    elapsed_ms = start.elapsed().as_millis() as u64,
                    "Route discovery complete"
                );
                metrics::record_discovery("success", start, routes.len());
            }
            Err(e) => {
                tracing::error!(error = %e, "Route discovery failed");
                metrics::record_discovery("failure", start, 0);
            }
        }
        outcome
    }

    /// Discover and assemble the composed router.
    pub async fn router(&self) -> RoutingResult<Router> {
        let routes = self.resolve().await?;
        assemble(routes)
    }

    fn walk<'a>(&'a self, dir: PathBuf) -> BoxFuture<'a, RoutingResult<Vec<RouteResult>>> {
        Box::pin(async move {
            let entries = self
                .fs
                .list(&dir)
                .await
                .map_err(|source| RoutingError::Filesystem {
                    path: dir.clone(),
                    source,
                })?;
            tracing::debug!(dir = %dir.display(), entries = entries.len(), "Listed directory");

            let mut subdirs: Vec<DirectoryEntry> = Vec::new();
            let mut files: Vec<(String, Classification)> = Vec::new();
            for entry in entries {
                if entry.is_dir {
                    subdirs.push(entry);
                } else {
                    let classification = self.matcher.classify(&entry.name);
                    if classification.is_match() {
                        files.push((entry.name, classification));
                    }
                }
            }

            {
                let named: Vec<(&str, &Classification)> =
                    files.iter().map(|(n, c)| (n.as_str(), c)).collect();
                check_conflicts(&dir, &named)?;
            }

            let dir = &dir;
            let walks = subdirs
                .into_iter()
                .map(|entry| self.walk(dir.join(entry.name)));
            let loads = files
                .into_iter()
                .map(|(name, classification)| self.load_file(dir, name, classification));

            let (nested, loaded) = try_join(try_join_all(walks), try_join_all(loads)).await?;

            let mut results = compact(loaded);
            results.extend(flatten(nested));
            Ok(results)
        })
    }

    async fn load_file(
        &self,
        dir: &Path,
        name: String,
        classification: Classification,
    ) -> RoutingResult<Option<RouteResult>> {
        let path = dir.join(name);
        let exports = match self.loader.load(&path).await {
            LoadOutcome::Found(exports) => {
                metrics::record_module_load("found");
                exports
            }
            LoadOutcome::NotFound => {
                metrics::record_module_load("not_found");
                tracing::debug!(file = %path.display(), "No module for route file, skipping");
                return Ok(None);
            }
            LoadOutcome::LoadError(source) => {
                metrics::record_module_load("error");
                return Err(RoutingError::ModuleLoad { path, source });
            }
        };

        let methods = method_table(&classification, &exports);
        if methods.is_empty() {
            return self.missing_export(path, &classification);
        }

        tracing::debug!(
            file = %path.display(),
            methods = ?methods.keys().collect::<Vec<_>>(),
            "Loaded route file"
        );
        let capture = match classification {
            Classification::TemplateMatch { capture, .. } => capture,
            _ => None,
        };
        Ok(Some(RouteResult {
            filesystem_path: dir.to_path_buf(),
            source: path,
            capture,
            methods,
        }))
    }

    fn missing_export(
        &self,
        path: PathBuf,
        classification: &Classification,
    ) -> RoutingResult<Option<RouteResult>> {
        let expected = classification.expected_exports();
        match self.config.missing_export {
            MissingExportPolicy::Ignore => {
                tracing::debug!(file = %path.display(), ?expected, "Route file exports no handlers");
                Ok(None)
            }
            MissingExportPolicy::Warn => {
                tracing::warn!(file = %path.display(), ?expected, "Route file exports no handlers");
                Ok(None)
            }
            MissingExportPolicy::Deny => Err(RoutingError::MissingExport { path, expected }),
        }
    }
}

/// Pick the exports `classification` asks for.
fn method_table(classification: &Classification, exports: &ModuleExports) -> MethodTable {
    let mut table = MethodTable::new();
    match classification {
        Classification::None => {}
        Classification::SingleFile {
            kind: FileKind::Page,
            method,
        } => {
            if let Some(handler) = &exports.default {
                table.insert(*method, handler.clone());
            }
        }
        Classification::SingleFile {
            kind: FileKind::Method,
            method,
        } => {
            if let Some(handler) = exports.method(*method) {
                table.insert(*method, handler.clone());
            }
        }
        Classification::MultiFile => {
            for method in RouteMethod::ALL {
                if let Some(handler) = exports.method(method) {
                    table.insert(method, handler.clone());
                }
            }
        }
        Classification::TemplateMatch { export, .. } => {
            if let Some(render) = exports.renderer(export) {
                table.insert(RouteMethod::Get, template_handler(render.clone()));
            }
        }
    }
    table
}

/// GET handler serving the render output as HTML.
fn template_handler(render: Renderer) -> MethodHandler {
    MethodHandler::new(move |_req| {
        let render = render.clone();
        async move {
            match render() {
                Ok(body) => Html(body).into_response(),
                Err(e) => {
                    tracing::error!(error = %e, "Template render failed");
                    (StatusCode::INTERNAL_SERVER_ERROR, "Template render failed").into_response()
                }
            }
        }
    })
}

/// Discover every route under `config.root` and compose them into one router.
///
/// Fails before any I/O if the root is not absolute. Any structural
/// conflict, filesystem error or module load failure fails the whole call;
/// no partially registered router is returned.
pub async fn get_routes<L: ModuleLoader>(config: RoutingConfig, loader: L) -> RoutingResult<Router> {
    RouteDiscovery::new(config, loader)?.router().await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::routing::fs::MemoryFs;
    use crate::routing::loader::ModuleRegistry;

    fn ok() -> MethodHandler {
        MethodHandler::new(|_req| async { "ok" })
    }

    fn tree() -> MemoryFs {
        let mut fs = MemoryFs::new();
        fs.add_file("/app/routes/page.rs")
            .add_file("/app/routes/users/route.rs")
            .add_file("/app/routes/users/helpers.rs")
            .add_file("/app/routes/users/admins/get.rs")
            .add_file("/app/routes/users/admins/post.rs")
            .add_dir("/app/routes/empty");
        fs
    }

    fn registry() -> ModuleRegistry {
        ModuleRegistry::new("/app/routes")
            .module("page.rs", ModuleExports::new().with_default(ok()))
            .module(
                "users/route.rs",
                ModuleExports::new()
                    .with_method(RouteMethod::Get, ok())
                    .with_method(RouteMethod::Post, ok()),
            )
            .module(
                "users/admins/get.rs",
                ModuleExports::new().with_method(RouteMethod::Get, ok()),
            )
            .module(
                "users/admins/post.rs",
                // Wrong export for a post file
                ModuleExports::new().with_method(RouteMethod::Get, ok()),
            )
    }

    fn shape(routes: &[ResolvedRoute]) -> Vec<(String, Vec<RouteMethod>)> {
        routes
            .iter()
            .map(|r| (r.url_path.clone(), r.methods.keys().copied().collect()))
            .collect()
    }

    #[tokio::test]
    async fn test_resolves_tree() {
        let discovery = RouteDiscovery::new(RoutingConfig::new("/app/routes"), registry())
            .unwrap()
            .with_fs(tree());

        let routes = discovery.resolve().await.unwrap();
        assert_eq!(
            shape(&routes),
            vec![
                ("/".to_string(), vec![RouteMethod::Get]),
                ("/users".to_string(), vec![RouteMethod::Get, RouteMethod::Post]),
                ("/users/admins".to_string(), vec![RouteMethod::Get]),
            ]
        );
    }

    #[tokio::test]
    async fn test_listing_order_does_not_matter() {
        let forward = RouteDiscovery::new(RoutingConfig::new("/app/routes"), registry())
            .unwrap()
            .with_fs(tree());
        let mut reversed_tree = tree();
        reversed_tree.reverse_listings();
        let reversed = RouteDiscovery::new(RoutingConfig::new("/app/routes"), registry())
            .unwrap()
            .with_fs(reversed_tree);

        let a = forward.resolve().await.unwrap();
        let b = reversed.resolve().await.unwrap();
        assert_eq!(shape(&a), shape(&b));
    }

    #[tokio::test]
    async fn test_conflict_fails_whole_run() {
        let mut fs = tree();
        fs.add_file("/app/routes/users/admins/deep/page.rs")
            .add_file("/app/routes/users/admins/deep/route.rs");

        let discovery = RouteDiscovery::new(RoutingConfig::new("/app/routes"), registry())
            .unwrap()
            .with_fs(fs);
        match discovery.resolve().await {
            Err(RoutingError::StructuralConflict { directory, .. }) => {
                assert_eq!(directory, PathBuf::from("/app/routes/users/admins/deep"));
            }
            other => panic!("expected conflict, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_load_error_is_fatal() {
        let registry = registry().module_with("users/route.rs", || Err("syntax error".into()));
        let discovery = RouteDiscovery::new(RoutingConfig::new("/app/routes"), registry)
            .unwrap()
            .with_fs(tree());
        assert!(matches!(
            discovery.resolve().await,
            Err(RoutingError::ModuleLoad { .. })
        ));
    }

    #[tokio::test]
    async fn test_missing_export_policy() {
        let config = RoutingConfig::new("/app/routes").with_missing_export(MissingExportPolicy::Deny);
        let discovery = RouteDiscovery::new(config, registry())
            .unwrap()
            .with_fs(tree());
        match discovery.resolve().await {
            Err(RoutingError::MissingExport { path, expected }) => {
                assert_eq!(path, PathBuf::from("/app/routes/users/admins/post.rs"));
                assert_eq!(expected, vec!["POST".to_string()]);
            }
            other => panic!("expected missing export, got {other:?}"),
        }

        let config = RoutingConfig::new("/app/routes").with_missing_export(MissingExportPolicy::Warn);
        let discovery = RouteDiscovery::new(config, registry())
            .unwrap()
            .with_fs(tree());
        assert_eq!(discovery.resolve().await.unwrap().len(), 3);
    }

    #[tokio::test]
    async fn test_missing_root_is_filesystem_error() {
        let discovery = RouteDiscovery::new(RoutingConfig::new("/nowhere"), registry())
            .unwrap()
            .with_fs(tree());
        assert!(matches!(
            discovery.resolve().await,
            Err(RoutingError::Filesystem { .. })
        ));
    }

    #[test]
    fn test_relative_root_rejected() {
        let err = RouteDiscovery::new(RoutingConfig::new("routes"), registry())
            .err()
            .unwrap();
        assert!(matches!(err, RoutingError::Configuration(_)));
    }

    #[test]
    fn test_settings_conversion() {
        let mut settings = RoutingSettings {
            path: PathBuf::from("/srv/site"),
            mode: ConventionMode::Template,
            ..Default::default()
        };
        settings.template.regex = Some("(".into());
        assert!(RoutingConfig::try_from(&settings).is_err());

        settings.template.regex = Some(r"^(\w+)\.md$".into());
        let config = RoutingConfig::try_from(&settings).unwrap();
        assert!(matches!(config.conventions, Conventions::Template(_)));

        settings.template.pattern = Some("index.md".into());
        assert!(RoutingConfig::try_from(&settings).is_err());
    }
}
