//! file-router
//!
//! Discovers routes from a directory tree and either prints the resulting
//! table or serves it.
//!
//! ```text
//!   routes dir ──▶ discovery ──▶ normalize ──▶ axum Router ──▶ HttpServer
//!                  (walk, match, load)
//! ```
//!
//! The binary drives template mode (e.g. a tree of markdown pages). Trees of
//! compiled handlers are mounted from code with `file_router::get_routes`.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use tokio::net::TcpListener;

use file_router::config::schema::ConventionMode;
use file_router::config::validation::validate_config;
use file_router::config::{load_config, AppConfig, ConfigError};
use file_router::lifecycle::startup::{self, StartupError};
use file_router::lifecycle::{signals, Shutdown};
use file_router::observability::logging::init_logging;
use file_router::routing::{ResolvedRoute, RouteSummary};
use file_router::HttpServer;

#[derive(Parser)]
#[command(name = "file-router")]
#[command(about = "Discover and serve file-system routed trees", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the discovered route table
    Routes {
        #[command(flatten)]
        source: SourceArgs,

        /// Print JSON instead of a table
        #[arg(long)]
        json: bool,
    },
    /// Serve the discovered routes
    Serve {
        #[command(flatten)]
        source: SourceArgs,

        /// Bind address, overrides the config
        #[arg(short, long)]
        bind: Option<String>,
    },
}

#[derive(Args)]
struct SourceArgs {
    /// TOML configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Route tree root, overrides the config
    #[arg(short, long)]
    path: Option<PathBuf>,

    /// Literal template file name (e.g. post.md)
    #[arg(long, conflicts_with = "regex")]
    pattern: Option<String>,

    /// Template file name regex
    #[arg(long)]
    regex: Option<String>,

    /// Render export to serve
    #[arg(long)]
    export: Option<String>,
}

impl SourceArgs {
    /// Config file (or defaults) with command-line overrides applied.
    fn load(&self) -> Result<AppConfig, Box<dyn std::error::Error>> {
        let mut config = match &self.config {
            Some(path) => load_config(path)?,
            None => AppConfig {
                routing: file_router::config::RoutingSettings {
                    mode: ConventionMode::Template,
                    ..Default::default()
                },
                ..Default::default()
            },
        };

        if let Some(path) = &self.path {
            config.routing.path = std::env::current_dir()?.join(path);
        }
        if self.pattern.is_some() || self.regex.is_some() {
            config.routing.mode = ConventionMode::Template;
            config.routing.template.pattern = self.pattern.clone();
            config.routing.template.regex = self.regex.clone();
        }
        if let Some(export) = &self.export {
            config.routing.template.export = export.clone();
        }

        validate_config(&config).map_err(ConfigError::Validation)?;
        Ok(config)
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Routes { source, json } => {
            let config = source.load()?;
            init_logging(&config.observability)
                .map_err(|e| StartupError::Logging(e.to_string()))?;

            let routes = startup::discover_routes(&config).await?;
            print_routes(&routes, json)?;
        }
        Commands::Serve { source, bind } => {
            let mut config = source.load()?;
            if let Some(bind) = bind {
                config.server.bind_address = bind;
            }
            init_logging(&config.observability)
                .map_err(|e| StartupError::Logging(e.to_string()))?;

            tracing::info!("file-router v{} starting", env!("CARGO_PKG_VERSION"));

            // Discovery must succeed before anything is bound.
            let routes = startup::build_router(&config).await?;

            let listener = TcpListener::bind(&config.server.bind_address).await?;
            tracing::info!(
                address = %listener.local_addr()?,
                root = %config.routing.path.display(),
                "Listening for connections"
            );

            let shutdown = Shutdown::new();
            tokio::spawn(signals::wait_for_signal(shutdown.clone()));

            let server = HttpServer::new(routes, config.server.clone());
            server.run(listener, shutdown.subscribe()).await?;

            tracing::info!("Shutdown complete");
        }
    }

    Ok(())
}

fn print_routes(routes: &[ResolvedRoute], json: bool) -> Result<(), Box<dyn std::error::Error>> {
    let summaries: Vec<RouteSummary> = routes.iter().map(ResolvedRoute::summary).collect();
    if json {
        println!("{}", serde_json::to_string_pretty(&summaries)?);
        return Ok(());
    }

    for summary in &summaries {
        let methods: Vec<&str> = summary.methods.iter().map(|m| m.as_str()).collect();
        match &summary.capture {
            Some(capture) => println!(
                "{:<32} {:<24} {} ({capture})",
                summary.path,
                methods.join(","),
                summary.source
            ),
            None => println!("{:<32} {:<24} {}", summary.path, methods.join(","), summary.source),
        }
    }
    Ok(())
}
