//! Routing subsystem: file-system driven route discovery.
//!
//! # Data Flow
//! ```text
//! RoutingConfig (absolute root, conventions)
//!     → discovery.rs (walk tree, concurrent per directory)
//!         → fs.rs (list entries)
//!         → matcher.rs (classify names, reject conflicting layouts)
//!         → loader.rs (load module, typed exports)
//!     → utils.rs (flatten / compact branch results)
//!     → normalize.rs (filesystem path → URL path)
//!     → router.rs (register into axum Router)
//! ```
//!
//! # Design Decisions
//! - Routes discovered once at startup, immutable afterwards
//! - Deterministic: same tree always yields the same (path, method) set
//! - Not-found modules are skipped; everything else that fails is fatal

pub mod discovery;
pub mod error;
pub mod fs;
pub mod loader;
pub mod matcher;
pub mod normalize;
pub mod router;
pub mod types;
pub mod utils;

pub use discovery::{get_routes, MissingExportPolicy, RouteDiscovery, RoutingConfig};
pub use error::{BoxError, RoutingError, RoutingResult};
pub use fs::{FileSystem, LocalFs, MemoryFs};
pub use loader::{LoadOutcome, ModuleExports, ModuleLoader, ModuleRegistry, TemplateLoader};
pub use matcher::{Conventions, FilePattern, TemplateConvention};
pub use types::{MethodHandler, ResolvedRoute, RouteMethod, RouteResult, RouteSummary};
