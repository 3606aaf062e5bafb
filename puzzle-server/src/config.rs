//! Configuration resolution from CLI args

use crate::cli::Args;
use crate::error::ServerError;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Resolved runtime configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Address to listen on
    pub bind: SocketAddr,
    /// Solver plugin root; collection directories live below it
    pub solvers_dir: PathBuf,
    /// Number of solver worker threads
    pub thread_count: usize,
    /// Whether to hot-reload changed plugins
    pub watch: bool,
    /// Coalescing window for change events
    pub reload_debounce: Duration,
    /// Tags every built-in set must carry (empty = all)
    pub tags: Vec<String>,
    /// Default log filter
    pub log_level: String,
    /// JSON log output
    pub log_json: bool,
}

impl Config {
    /// Build config from CLI args
    pub fn from_args(args: Args) -> Result<Self, ServerError> {
        if args.threads == Some(0) {
            return Err(ServerError::Config("--threads must be at least 1".to_string()));
        }

        Ok(Config {
            bind: args.bind,
            solvers_dir: resolve_dir(&expand_tilde(&args.solvers_dir)),
            thread_count: args.threads.unwrap_or_else(num_cpus),
            watch: !args.no_watch,
            reload_debounce: Duration::from_millis(args.reload_debounce_ms),
            tags: args.tags,
            log_level: args.log_level,
            log_json: args.log_json,
        })
    }
}

/// Expand ~ to home directory
fn expand_tilde(path: &Path) -> PathBuf {
    if let Some(path_str) = path.to_str()
        && (path_str.starts_with("~/") || path_str == "~")
        && let Some(home) = dirs::home_dir()
    {
        return home.join(path_str.trim_start_matches('~').trim_start_matches('/'));
    }
    path.to_path_buf()
}

/// Absolute form of `dir`, so it compares equal to paths reported by the file watcher
fn resolve_dir(dir: &Path) -> PathBuf {
    dir.canonicalize().unwrap_or_else(|_| {
        std::env::current_dir()
            .map(|cwd| cwd.join(dir))
            .unwrap_or_else(|_| dir.to_path_buf())
    })
}

/// Get number of CPUs
fn num_cpus() -> usize {
    std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1)
}
