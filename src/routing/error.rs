//! Route discovery error definitions.

use std::path::PathBuf;
use thiserror::Error;

use crate::routing::types::RouteMethod;

/// Boxed error carried by loaders and renderers.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Errors that abort a discovery run.
///
/// Every variant is fatal: a run that returns one of these never produces a
/// router. A module that simply does not exist is not an error, see
/// [`LoadOutcome::NotFound`](crate::routing::loader::LoadOutcome::NotFound).
#[derive(Debug, Error)]
pub enum RoutingError {
    /// Invalid configuration, raised before any I/O.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Two mutually exclusive convention files share a directory.
    #[error("Conflicting route files in {}: {}", directory.display(), files.join(", "))]
    StructuralConflict {
        directory: PathBuf,
        files: Vec<String>,
    },

    /// Directory listing failed (missing, not a directory, permissions).
    #[error("Filesystem error at {}: {source}", path.display())]
    Filesystem {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A module exists but failed while loading.
    #[error("Failed to load module {}: {source}", path.display())]
    ModuleLoad {
        path: PathBuf,
        #[source]
        source: BoxError,
    },

    /// A module loaded but exported none of the expected handlers.
    #[error("Module {} exports none of: {}", path.display(), expected.join(", "))]
    MissingExport {
        path: PathBuf,
        expected: Vec<String>,
    },

    /// A discovered path does not live under the configured root.
    #[error("Path {} is outside root {}", path.display(), root.display())]
    PathOutsideRoot { path: PathBuf, root: PathBuf },

    /// The same path and method were discovered twice.
    #[error("Duplicate route {method} {path}")]
    DuplicateRoute { path: String, method: RouteMethod },
}

/// Result type for routing operations.
pub type RoutingResult<T> = Result<T, RoutingError>;
