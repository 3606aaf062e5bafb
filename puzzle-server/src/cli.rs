//! CLI argument parsing using clap

use clap::Parser;
use std::net::SocketAddr;
use std::path::PathBuf;

/// Puzzle solver server
#[derive(Parser, Debug)]
#[command(name = "puzzled", about = "Serve puzzle solvers over WebSocket", version)]
pub struct Args {
    /// Address to listen on
    #[arg(short, long, default_value = "127.0.0.1:5000")]
    pub bind: SocketAddr,

    /// Root directory of hot-reloadable solver plugins
    #[arg(short, long, default_value = "./solvers")]
    pub solvers_dir: PathBuf,

    /// Number of threads for solver execution
    #[arg(long)]
    pub threads: Option<usize>,

    /// Do not watch the solvers directory for changes
    #[arg(long)]
    pub no_watch: bool,

    /// Quiet period for coalescing file change events, in milliseconds
    #[arg(long, default_value_t = 250)]
    pub reload_debounce_ms: u64,

    /// Tags to filter built-in problem sets (comma-separated)
    #[arg(short, long, value_delimiter = ',')]
    pub tags: Vec<String>,

    /// Log filter used when RUST_LOG is not set
    #[arg(long, default_value = "info")]
    pub log_level: String,

    /// Emit logs as JSON lines
    #[arg(long)]
    pub log_json: bool,
}
