//! HTTP serving for a discovered router.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (axum::serve, tracing + timeout layers)
//!     → composed Router from routing::router
//!     → pre-processors → handler
//! ```

pub mod server;

pub use server::HttpServer;
