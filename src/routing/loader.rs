//! Module loading.
//!
//! # Responsibilities
//! - Resolve a route file to the handlers it exports
//! - Keep "not found" apart from "found but failed to load"
//!
//! # Design Decisions
//! - Exports are typed: one optional field per method plus `default`; only
//!   template renderers are looked up by name, once, at load time
//! - Loaders are plain trait objects so discovery can run against stubs
//! - Loaders never retry

use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use futures_util::future::BoxFuture;
use pulldown_cmark::{html, Options, Parser};

use crate::routing::error::BoxError;
use crate::routing::types::{MethodHandler, RouteMethod};

/// A render export: produces an HTML body.
pub type Renderer = Arc<dyn Fn() -> Result<String, BoxError> + Send + Sync>;

/// Handlers a loaded module provides.
#[derive(Clone, Default)]
pub struct ModuleExports {
    pub get: Option<MethodHandler>,
    pub put: Option<MethodHandler>,
    pub post: Option<MethodHandler>,
    pub delete: Option<MethodHandler>,
    pub patch: Option<MethodHandler>,
    pub head: Option<MethodHandler>,
    pub options: Option<MethodHandler>,
    /// Whole-page handler, served on GET.
    pub default: Option<MethodHandler>,
    pub renderers: BTreeMap<String, Renderer>,
}

impl ModuleExports {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_method(mut self, method: RouteMethod, handler: MethodHandler) -> Self {
        *self.slot_mut(method) = Some(handler);
        self
    }

    pub fn with_default(mut self, handler: MethodHandler) -> Self {
        self.default = Some(handler);
        self
    }

    pub fn with_renderer<F>(mut self, name: impl Into<String>, render: F) -> Self
    where
        F: Fn() -> Result<String, BoxError> + Send + Sync + 'static,
    {
        self.renderers.insert(name.into(), Arc::new(render));
        self
    }

    /// The handler exported for `method`, if any.
    pub fn method(&self, method: RouteMethod) -> Option<&MethodHandler> {
        match method {
            RouteMethod::Get => self.get.as_ref(),
            RouteMethod::Put => self.put.as_ref(),
            RouteMethod::Post => self.post.as_ref(),
            RouteMethod::Delete => self.delete.as_ref(),
            RouteMethod::Patch => self.patch.as_ref(),
            RouteMethod::Head => self.head.as_ref(),
            RouteMethod::Options => self.options.as_ref(),
        }
    }

    pub fn renderer(&self, name: &str) -> Option<&Renderer> {
        self.renderers.get(name)
    }

    fn slot_mut(&mut self, method: RouteMethod) -> &mut Option<MethodHandler> {
        match method {
            RouteMethod::Get => &mut self.get,
            RouteMethod::Put => &mut self.put,
            RouteMethod::Post => &mut self.post,
            RouteMethod::Delete => &mut self.delete,
            RouteMethod::Patch => &mut self.patch,
            RouteMethod::Head => &mut self.head,
            RouteMethod::Options => &mut self.options,
        }
    }
}

impl fmt::Debug for ModuleExports {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let methods: Vec<RouteMethod> = RouteMethod::ALL
            .into_iter()
            .filter(|m| self.method(*m).is_some())
            .collect();
        f.debug_struct("ModuleExports")
            .field("methods", &methods)
            .field("default", &self.default.is_some())
            .field("renderers", &self.renderers.keys().collect::<Vec<_>>())
            .finish()
    }
}

/// Result of loading one module.
#[derive(Debug)]
pub enum LoadOutcome {
    Found(ModuleExports),
    /// Nothing to load at this path. Recoverable.
    NotFound,
    /// The module exists but failed while loading. Fatal to discovery.
    LoadError(BoxError),
}

/// Loads the module behind a route file.
pub trait ModuleLoader: Send + Sync {
    fn load<'a>(&'a self, path: &'a Path) -> BoxFuture<'a, LoadOutcome>;
}

impl<L: ModuleLoader + ?Sized> ModuleLoader for Arc<L> {
    fn load<'a>(&'a self, path: &'a Path) -> BoxFuture<'a, LoadOutcome> {
        (**self).load(path)
    }
}

type ModuleFactory = Arc<dyn Fn() -> Result<ModuleExports, BoxError> + Send + Sync>;

/// Compiled-in modules addressed by their path below a base directory.
///
/// ```ignore
/// let registry = ModuleRegistry::new("/app/routes")
///     .module("users/route.rs", ModuleExports::new()
///         .with_method(RouteMethod::Get, MethodHandler::new(list_users)));
/// ```
#[derive(Clone)]
pub struct ModuleRegistry {
    base: PathBuf,
    modules: HashMap<PathBuf, ModuleFactory>,
}

impl ModuleRegistry {
    pub fn new(base: impl Into<PathBuf>) -> Self {
        Self {
            base: base.into(),
            modules: HashMap::new(),
        }
    }

    /// Register fixed exports for a file.
    pub fn module(self, relative: impl AsRef<Path>, exports: ModuleExports) -> Self {
        self.module_with(relative, move || Ok(exports.clone()))
    }

    /// Register a factory run on every load; an error is a load failure.
    pub fn module_with<F>(mut self, relative: impl AsRef<Path>, factory: F) -> Self
    where
        F: Fn() -> Result<ModuleExports, BoxError> + Send + Sync + 'static,
    {
        self.modules
            .insert(relative.as_ref().to_path_buf(), Arc::new(factory));
        self
    }

    pub fn len(&self) -> usize {
        self.modules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.modules.is_empty()
    }
}

impl fmt::Debug for ModuleRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ModuleRegistry")
            .field("base", &self.base)
            .field("modules", &self.modules.keys().collect::<Vec<_>>())
            .finish()
    }
}

impl ModuleLoader for ModuleRegistry {
    fn load<'a>(&'a self, path: &'a Path) -> BoxFuture<'a, LoadOutcome> {
        Box::pin(async move {
            let factory = path
                .strip_prefix(&self.base)
                .ok()
                .and_then(|relative| self.modules.get(relative));

            match factory {
                Some(factory) => match factory() {
                    Ok(exports) => LoadOutcome::Found(exports),
                    Err(e) => LoadOutcome::LoadError(e),
                },
                None => LoadOutcome::NotFound,
            }
        })
    }
}

type RenderFn = Arc<dyn Fn(&str) -> Result<String, BoxError> + Send + Sync>;

/// Loads template files from disk and binds render functions to their source.
#[derive(Clone, Default)]
pub struct TemplateLoader {
    renderers: BTreeMap<String, RenderFn>,
}

impl TemplateLoader {
    pub fn new() -> Self {
        Self::default()
    }

    /// Loader exporting the markdown renderer under `export`.
    pub fn markdown(export: impl Into<String>) -> Self {
        Self::new().renderer(export, render_markdown)
    }

    /// Export `render` under `name` for every loaded template.
    pub fn renderer<F>(mut self, name: impl Into<String>, render: F) -> Self
    where
        F: Fn(&str) -> Result<String, BoxError> + Send + Sync + 'static,
    {
        self.renderers.insert(name.into(), Arc::new(render));
        self
    }
}

impl fmt::Debug for TemplateLoader {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TemplateLoader")
            .field("renderers", &self.renderers.keys().collect::<Vec<_>>())
            .finish()
    }
}

impl ModuleLoader for TemplateLoader {
    fn load<'a>(&'a self, path: &'a Path) -> BoxFuture<'a, LoadOutcome> {
        Box::pin(async move {
            let source: Arc<str> = match tokio::fs::read_to_string(path).await {
                Ok(source) => source.into(),
                Err(e) if e.kind() == io::ErrorKind::NotFound => return LoadOutcome::NotFound,
                Err(e) => return LoadOutcome::LoadError(Box::new(e)),
            };

            let mut exports = ModuleExports::new();
            for (name, render) in &self.renderers {
                let render = render.clone();
                let source = source.clone();
                exports = exports.with_renderer(name.clone(), move || render(&*source));
            }
            LoadOutcome::Found(exports)
        })
    }
}

/// Render CommonMark (with tables, footnotes, strikethrough, task lists) to HTML.
pub fn render_markdown(source: &str) -> Result<String, BoxError> {
    let options = Options::ENABLE_TABLES
        | Options::ENABLE_FOOTNOTES
        | Options::ENABLE_STRIKETHROUGH
        | Options::ENABLE_TASKLISTS;
    let parser = Parser::new_ext(source, options);
    let mut out = String::with_capacity(source.len() * 3 / 2);
    html::push_html(&mut out, parser);
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hello() -> MethodHandler {
        MethodHandler::new(|_req| async { "hello" })
    }

    #[tokio::test]
    async fn test_registry_found_and_not_found() {
        let registry = ModuleRegistry::new("/app/routes").module(
            "users/route.rs",
            ModuleExports::new().with_method(RouteMethod::Get, hello()),
        );

        match registry.load(Path::new("/app/routes/users/route.rs")).await {
            LoadOutcome::Found(exports) => {
                assert!(exports.method(RouteMethod::Get).is_some());
                assert!(exports.method(RouteMethod::Post).is_none());
            }
            other => panic!("expected Found, got {other:?}"),
        }

        assert!(matches!(
            registry.load(Path::new("/app/routes/posts/route.rs")).await,
            LoadOutcome::NotFound
        ));
        assert!(matches!(
            registry.load(Path::new("/elsewhere/users/route.rs")).await,
            LoadOutcome::NotFound
        ));
    }

    #[tokio::test]
    async fn test_registry_factory_error_is_load_error() {
        let registry = ModuleRegistry::new("/app/routes")
            .module_with("page.rs", || Err("boom".into()));

        match registry.load(Path::new("/app/routes/page.rs")).await {
            LoadOutcome::LoadError(e) => assert_eq!(e.to_string(), "boom"),
            other => panic!("expected LoadError, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_template_loader_binds_source() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("post.md");
        std::fs::write(&file, "# Hello").unwrap();

        let loader = TemplateLoader::markdown("render");
        let LoadOutcome::Found(exports) = loader.load(&file).await else {
            panic!("template should load");
        };
        let render = exports.renderer("render").unwrap();
        assert_eq!(render().unwrap(), "<h1>Hello</h1>\n");
        assert!(exports.renderer("other").is_none());
    }

    #[tokio::test]
    async fn test_template_loader_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let loader = TemplateLoader::markdown("render");
        assert!(matches!(
            loader.load(&dir.path().join("gone.md")).await,
            LoadOutcome::NotFound
        ));
    }

    #[tokio::test]
    async fn test_template_loader_directory_is_load_error() {
        let dir = tempfile::tempdir().unwrap();
        let loader = TemplateLoader::markdown("render");
        assert!(matches!(loader.load(dir.path()).await, LoadOutcome::LoadError(_)));
    }
}
