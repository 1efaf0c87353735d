//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML)
//!     → loader.rs (parse & deserialize)
//!     → validation.rs (semantic checks)
//!     → AppConfig (validated, immutable)
//!     → RoutingConfig::try_from(&config.routing) for discovery
//! ```
//!
//! # Design Decisions
//! - Config is read once at startup; routes are never reloaded
//! - All fields have defaults to allow minimal configs
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{load_config, ConfigError};
pub use schema::AppConfig;
pub use schema::ObservabilityConfig;
pub use schema::RoutingSettings;
pub use schema::ServerConfig;
