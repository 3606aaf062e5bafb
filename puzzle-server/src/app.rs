//! Wiring of collections, registry, loader and executor

use crate::compiler::DylibCompiler;
use crate::config::Config;
use crate::error::ServerError;
use crate::executor::Executor;
use crate::loader::{LoadReport, ProblemLoaderService, WatchHandle};
use crate::server::AppState;
use puzzle_solver::{Collection, ProblemRegistry, builtin_collections};
use puzzle_solutions as _;
use std::sync::Arc;
use tokio::task::JoinHandle;
use tracing::{error, info, warn};

/// A running instance: the shared state plus its background loaders
pub struct App {
    state: AppState,
    loader: Arc<ProblemLoaderService>,
    watch: Option<WatchHandle>,
    initial_load: JoinHandle<LoadReport>,
}

impl App {
    /// Build everything from `config` and start loading plugins
    ///
    /// Built-in problem sets are registered before this returns; plugins under the
    /// solvers directory appear as the background load reaches them.
    pub fn start(config: &Config) -> Result<Self, ServerError> {
        let collections: Vec<Arc<Collection>> = builtin_collections()
            .map(|plugin| Arc::new(plugin.collection_under(&config.solvers_dir)))
            .collect();
        for collection in &collections {
            info!(
                source = collection.source(),
                year = collection.year(),
                dir = %collection.directory().display(),
                "declared collection"
            );
        }

        let registry = ProblemRegistry::new(collections.clone());
        let compiler = Arc::new(DylibCompiler::new()?);
        let loader = Arc::new(ProblemLoaderService::new(collections, compiler));

        let tags = config.tags.clone();
        loader.load_builtins(|plugin| tags.iter().all(|tag| plugin.tags.contains(&tag.as_str())));

        let watch = if config.watch {
            if let Err(e) = std::fs::create_dir_all(&config.solvers_dir) {
                warn!(dir = %config.solvers_dir.display(), error = %e, "cannot create solvers directory");
            }
            Some(Arc::clone(&loader).watch(config.reload_debounce)?)
        } else {
            None
        };

        let bulk = Arc::clone(&loader);
        let initial_load = tokio::task::spawn_blocking(move || bulk.load_all());

        let executor = Arc::new(Executor::new(config.thread_count)?);
        info!(
            threads = executor.thread_count(),
            problems = registry.len(),
            "solver registry ready"
        );

        Ok(Self {
            state: AppState::new(registry, executor),
            loader,
            watch,
            initial_load,
        })
    }

    pub fn state(&self) -> AppState {
        self.state.clone()
    }

    pub fn loader(&self) -> &Arc<ProblemLoaderService> {
        &self.loader
    }

    /// Stop background work
    pub async fn shutdown(self) {
        if let Some(watch) = self.watch {
            watch.shutdown().await;
        }
        if let Err(e) = self.initial_load.await {
            error!(error = %e, "initial solver load did not complete");
        }
    }
}
