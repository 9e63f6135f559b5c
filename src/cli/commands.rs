//! CLI command implementations
//!
//! `serve` boot sequence:
//! 1. Resolve configuration (file, then `--port` override)
//! 2. Open the store (failure is fatal)
//! 3. Load the catalog (failure is logged, serving continues empty)
//! 4. Serve HTTP until the listener stops

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::catalog::Catalog;
use crate::http_server::{HttpServer, HttpServerConfig};
use crate::observability::{log_event, Event, Logger};
use crate::storage::FileStore;

use super::args::Command;
use super::errors::{CliError, CliResult};

/// Configuration file structure
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// Directory holding `movies.db` (default: "./data")
    #[serde(default = "default_data_dir")]
    pub data_dir: String,

    #[serde(flatten)]
    pub server: HttpServerConfig,
}

fn default_data_dir() -> String {
    "./data".to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            server: HttpServerConfig::default(),
        }
    }
}

impl Config {
    /// Load configuration from a JSON file
    pub fn load(path: &Path) -> CliResult<Self> {
        let content = fs::read_to_string(path).map_err(|e| {
            CliError::config_error(format!("Failed to read config {}: {}", path.display(), e))
        })?;

        let config: Config = serde_json::from_str(&content)
            .map_err(|e| CliError::config_error(format!("Invalid config JSON: {}", e)))?;

        config.validate()?;
        Ok(config)
    }

    /// Load from `path` when given, otherwise use defaults
    pub fn resolve(path: Option<&Path>, port: Option<u16>) -> CliResult<Self> {
        let mut config = match path {
            Some(path) => Self::load(path)?,
            None => Self::default(),
        };
        if let Some(port) = port {
            config.server.port = port;
        }
        Ok(config)
    }

    fn validate(&self) -> CliResult<()> {
        if self.data_dir.trim().is_empty() {
            return Err(CliError::config_error("data_dir must not be empty"));
        }
        if self.server.host.trim().is_empty() {
            return Err(CliError::config_error("host must not be empty"));
        }
        Ok(())
    }

    pub fn data_path(&self) -> &Path {
        Path::new(&self.data_dir)
    }
}

/// Main CLI entry point
pub fn run() -> CliResult<()> {
    let cli = super::args::Cli::parse_args();
    run_command(cli.command)
}

pub fn run_command(cmd: Command) -> CliResult<()> {
    match cmd {
        Command::Serve { config, port } => serve(config.as_deref(), port),
    }
}

/// Open the store and build the catalog over it.
pub fn boot_catalog(config: &Config) -> CliResult<Arc<Catalog>> {
    let store = FileStore::open(config.data_path()).map_err(|e| {
        let message = e.to_string();
        Logger::fatal(Event::StoreOpenFailed, &[("error", message.as_str())]);
        CliError::boot_failed(format!("Failed to open store: {}", e))
    })?;
    log_event(Event::StoreOpened, &[("data_dir", config.data_dir.as_str())]);

    Ok(Arc::new(Catalog::load(store)))
}

pub fn serve(config_path: Option<&Path>, port: Option<u16>) -> CliResult<()> {
    log_event(Event::StartupBegin, &[]);

    let config = Config::resolve(config_path, port)?;
    let source = config_path
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from("<defaults>"));
    let source = source.display().to_string();
    log_event(Event::ConfigLoaded, &[("source", source.as_str())]);

    let catalog = boot_catalog(&config)?;
    let server = HttpServer::with_config(config.server.clone(), catalog);

    let rt = tokio::runtime::Runtime::new()
        .map_err(|e| CliError::boot_failed(format!("Failed to create tokio runtime: {}", e)))?;

    rt.block_on(async {
        server
            .start()
            .await
            .map_err(|e| CliError::serve_failed(format!("HTTP server failed: {}", e)))
    })
}
