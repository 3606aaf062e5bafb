//! Puzzle solver server
//!
//! Serves every registered problem over a WebSocket per request: the client sends
//! the puzzle input as one message and receives `start`, progress updates, and a
//! final `finished` update. Problem sets come from the built-in registration table
//! and from shared-library plugins that are reloaded while the server runs.

pub mod app;
pub mod cli;
pub mod compiler;
pub mod config;
pub mod error;
pub mod executor;
pub mod loader;
pub mod logging;
pub mod server;
pub mod session;
pub mod trace;

pub use app::App;
pub use config::Config;
pub use error::{LoaderError, ServerError, TransportError};
pub use executor::{Executor, Failure, Outcome};
pub use loader::{LoadReport, ProblemLoaderService, WatchHandle};
pub use server::{AppState, build_router, serve};
pub use session::{NO_RESULT_MESSAGE, Session, SessionSummary, Transport};
