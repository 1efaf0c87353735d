//! File-system driven route discovery for axum.
//!
//! Walks a directory tree, reads its file names as routing conventions,
//! loads the handlers each file provides and composes them into one
//! `axum::Router`.

pub mod config;
pub mod http;
pub mod lifecycle;
pub mod observability;
pub mod routing;

pub use config::schema::AppConfig;
pub use http::HttpServer;
pub use lifecycle::Shutdown;
pub use routing::{get_routes, RouteDiscovery, RoutingConfig, RoutingError};
