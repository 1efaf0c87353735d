//! Router assembly.
//!
//! # Responsibilities
//! - Register every discovered (path, method) handler into an axum Router
//! - Run pre-processors ahead of the handler
//! - Report duplicate or unroutable paths instead of panicking in axum
//! - Register directory names literally, never as axum captures
//!
//! # Design Decisions
//! - Routes are grouped per path so each path is registered exactly once
//! - A method without a handler is simply not registered
//! - Immutable after construction (the Router is handed to the caller)

use std::collections::{BTreeMap, HashSet};

use axum::extract::Request;
use axum::routing::MethodRouter;
use axum::Router;

use crate::routing::error::{RoutingError, RoutingResult};
use crate::routing::types::{MethodTable, ResolvedRoute};

/// Fail on the first `(url_path, method)` pair seen twice.
pub fn ensure_unique(routes: &[ResolvedRoute]) -> RoutingResult<()> {
    let mut seen = HashSet::new();
    for route in routes {
        for method in route.methods.keys() {
            if !seen.insert((route.url_path.as_str(), *method)) {
                return Err(RoutingError::DuplicateRoute {
                    path: route.url_path.clone(),
                    method: *method,
                });
            }
        }
    }
    Ok(())
}

/// Compose resolved routes into one router.
pub fn assemble(routes: Vec<ResolvedRoute>) -> RoutingResult<Router> {
    let mut grouped: BTreeMap<String, MethodTable> = BTreeMap::new();
    for route in routes {
        let table = grouped.entry(route.url_path.clone()).or_default();
        for (method, handler) in route.methods {
            if table.insert(method, handler).is_some() {
                return Err(RoutingError::DuplicateRoute {
                    path: route.url_path,
                    method,
                });
            }
        }
    }

    let mut router = Router::new();
    for (path, table) in grouped {
        let pattern = route_pattern(&path)?;
        let mut method_router: MethodRouter = MethodRouter::new();
        for (method, handler) in table {
            tracing::debug!(
                path = %path,
                method = %method,
                pre_processors = handler.pre_processor_count(),
                "Registering route"
            );
            method_router = method_router.on(method.filter(), move |req: Request| async move {
                handler.call(req).await
            });
        }
        router = router.route(&pattern, method_router);
    }
    Ok(router)
}

/// axum path syntax matching `path` literally.
///
/// Braces are doubled so a `{id}` directory stays a literal segment. axum
/// has no escape for a leading `:` or `*`, so those segments are rejected.
fn route_pattern(path: &str) -> RoutingResult<String> {
    if let Some(segment) = path
        .split('/')
        .find(|segment| segment.starts_with(':') || segment.starts_with('*'))
    {
        return Err(RoutingError::Configuration(format!(
            "Route {path} has unsupported segment `{segment}`"
        )));
    }
    Ok(path.replace('{', "{{").replace('}', "}}"))
}
