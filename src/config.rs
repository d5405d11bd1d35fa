//! In-memory runtime configuration (SPEC_FULL.md §A.3). Config-file
//! parsing is out of scope; values come from CLI args and environment
//! variables only.

use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;

/// Process-level arguments the binary accepts (spec §1: the console/TTY
/// wrapper around this is explicitly out of core scope, so this is kept
/// to what `Config` needs).
#[derive(Debug, Parser)]
#[command(name = "commissioner", about = "Thread Network Commissioner core")]
pub struct Cli {
    /// Path to the registry store file.
    #[arg(long)]
    pub registry: Option<PathBuf>,

    /// Root directory for per-domain/per-network credential files.
    #[arg(long)]
    pub credentials: Option<PathBuf>,

    /// Default mDNS discovery timeout in milliseconds.
    #[arg(long)]
    pub discovery_timeout_ms: Option<u64>,

    /// Network interface to bind the discovery socket to.
    #[arg(long)]
    pub interface: Option<String>,

    /// Raise the default log filter to debug (also read from the
    /// `VERBOSE` environment variable).
    #[arg(long, env = "VERBOSE")]
    pub verbose: bool,
}

/// Everything the binary needs to wire up a `Registry`, `JobManager`,
/// and discovery engine.
#[derive(Debug, Clone)]
pub struct Config {
    pub registry_path: PathBuf,
    pub discovery_timeout: Duration,
    pub discovery_interface: Option<String>,
    pub credential_root: PathBuf,
    pub verbose: bool,
}

impl Config {
    pub fn default_registry_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(std::env::temp_dir)
            .join("commissioner")
            .join("registry.json")
    }

    pub fn default_credential_root() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(std::env::temp_dir)
            .join("commissioner")
            .join("credentials")
    }
}

impl Default for Config {
    fn default() -> Self {
        Config {
            registry_path: Self::default_registry_path(),
            discovery_timeout: commissioner_discovery::DEFAULT_TIMEOUT,
            discovery_interface: None,
            credential_root: Self::default_credential_root(),
            verbose: std::env::var_os("VERBOSE").is_some(),
        }
    }
}

impl From<Cli> for Config {
    fn from(cli: Cli) -> Self {
        Config {
            registry_path: cli.registry.unwrap_or_else(Config::default_registry_path),
            discovery_timeout: cli
                .discovery_timeout_ms
                .map(Duration::from_millis)
                .unwrap_or(commissioner_discovery::DEFAULT_TIMEOUT),
            discovery_interface: cli.interface,
            credential_root: cli.credentials.unwrap_or_else(Config::default_credential_root),
            verbose: cli.verbose,
        }
    }
}
