//! Route table types shared across discovery stages.

use std::collections::BTreeMap;
use std::fmt;
use std::future::Future;
use std::path::PathBuf;
use std::sync::Arc;

use axum::extract::Request;
use axum::response::{IntoResponse, Response};
use axum::routing::MethodFilter;
use futures_util::future::BoxFuture;
use serde::Serialize;

/// HTTP methods a route file can provide.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum RouteMethod {
    Get,
    Put,
    Post,
    Delete,
    Patch,
    Head,
    Options,
}

impl RouteMethod {
    /// All supported methods, in registration order.
    pub const ALL: [RouteMethod; 7] = [
        RouteMethod::Get,
        RouteMethod::Put,
        RouteMethod::Post,
        RouteMethod::Delete,
        RouteMethod::Patch,
        RouteMethod::Head,
        RouteMethod::Options,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            RouteMethod::Get => "GET",
            RouteMethod::Put => "PUT",
            RouteMethod::Post => "POST",
            RouteMethod::Delete => "DELETE",
            RouteMethod::Patch => "PATCH",
            RouteMethod::Head => "HEAD",
            RouteMethod::Options => "OPTIONS",
        }
    }

    /// The axum filter this method registers under.
    pub fn filter(&self) -> MethodFilter {
        match self {
            RouteMethod::Get => MethodFilter::GET,
            RouteMethod::Put => MethodFilter::PUT,
            RouteMethod::Post => MethodFilter::POST,
            RouteMethod::Delete => MethodFilter::DELETE,
            RouteMethod::Patch => MethodFilter::PATCH,
            RouteMethod::Head => MethodFilter::HEAD,
            RouteMethod::Options => MethodFilter::OPTIONS,
        }
    }
}

impl fmt::Display for RouteMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

type HandlerFn = dyn Fn(Request) -> BoxFuture<'static, Response> + Send + Sync;
type PreProcessorFn =
    dyn Fn(Request) -> BoxFuture<'static, Result<Request, Response>> + Send + Sync;

/// A handler plus the ordered steps that run before it.
///
/// A pre-processor receives the request and either hands it on (possibly
/// modified) or short-circuits with its own response. Steps run in the order
/// they were added.
#[derive(Clone)]
pub struct MethodHandler {
    pre_processors: Vec<Arc<PreProcessorFn>>,
    handler: Arc<HandlerFn>,
}

impl MethodHandler {
    /// Wrap an async function as a handler.
    pub fn new<F, Fut, R>(handler: F) -> Self
    where
        F: Fn(Request) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = R> + Send + 'static,
        R: IntoResponse,
    {
        let handler: Arc<HandlerFn> = Arc::new(move |req: Request| -> BoxFuture<'static, Response> {
            let fut = handler(req);
            Box::pin(async move { fut.await.into_response() })
        });
        Self {
            pre_processors: Vec::new(),
            handler,
        }
    }

    /// Append a pre-processing step.
    pub fn with_pre_processor<F, Fut>(mut self, step: F) -> Self
    where
        F: Fn(Request) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<Request, Response>> + Send + 'static,
    {
        self.pre_processors.push(Arc::new(
            move |req: Request| -> BoxFuture<'static, Result<Request, Response>> {
                Box::pin(step(req))
            },
        ));
        self
    }

    pub fn pre_processor_count(&self) -> usize {
        self.pre_processors.len()
    }

    /// Run the pre-processing chain, then the handler.
    pub async fn call(&self, mut req: Request) -> Response {
        for step in &self.pre_processors {
            match step(req).await {
                Ok(next) => req = next,
                Err(response) => return response,
            }
        }
        (self.handler)(req).await
    }
}

impl fmt::Debug for MethodHandler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MethodHandler")
            .field("pre_processors", &self.pre_processors.len())
            .finish_non_exhaustive()
    }
}

/// Handlers keyed by method. Keys are unique by construction.
pub type MethodTable = BTreeMap<RouteMethod, MethodHandler>;

/// One listing row from the filesystem collaborator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirectoryEntry {
    pub name: String,
    pub is_dir: bool,
}

impl DirectoryEntry {
    pub fn file(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            is_dir: false,
        }
    }

    pub fn dir(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            is_dir: true,
        }
    }
}

/// Handlers discovered from one file, before path normalization.
#[derive(Debug, Clone)]
pub struct RouteResult {
    /// Directory the route is mounted at.
    pub filesystem_path: PathBuf,
    /// File the handlers came from.
    pub source: PathBuf,
    /// First capture group of a regex template match.
    pub capture: Option<String>,
    pub methods: MethodTable,
}

/// A [`RouteResult`] addressed by URL path.
#[derive(Debug, Clone)]
pub struct ResolvedRoute {
    /// `/` or a `/`-prefixed path without trailing slash.
    pub url_path: String,
    pub source: PathBuf,
    pub capture: Option<String>,
    pub methods: MethodTable,
}

impl ResolvedRoute {
    pub fn summary(&self) -> RouteSummary {
        RouteSummary {
            path: self.url_path.clone(),
            methods: self.methods.keys().copied().collect(),
            source: self.source.display().to_string(),
            capture: self.capture.clone(),
        }
    }
}

/// Serializable view of a resolved route, for listings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RouteSummary {
    pub path: String,
    pub methods: Vec<RouteMethod>,
    pub source: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub capture: Option<String>,
}
