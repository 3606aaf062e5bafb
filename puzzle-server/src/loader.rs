//! Discovers solver sources under the collection directories and keeps them loaded

use crate::error::LoaderError;
use notify::{Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use parking_lot::Mutex;
use puzzle_solver::{Collection, Compiler, Origin, ProblemSetPlugin, builtin_problem_sets};
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};
use walkdir::WalkDir;

/// Totals of a bulk load
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct LoadReport {
    /// Files that compiled
    pub loaded: usize,
    /// Files that failed to compile; their previous definitions stay in place
    pub failed: usize,
    /// Problem sets merged across all collections
    pub merged: usize,
}

/// Feeds compiled problem sets into every registered collection
pub struct ProblemLoaderService {
    collections: Vec<Arc<Collection>>,
    compiler: Arc<dyn Compiler>,
    // Held from compile to merge so a stale compile never lands after a newer one.
    reload_lock: Mutex<()>,
}

impl ProblemLoaderService {
    pub fn new(collections: Vec<Arc<Collection>>, compiler: Arc<dyn Compiler>) -> Self {
        Self {
            collections,
            compiler,
            reload_lock: Mutex::new(()),
        }
    }

    pub fn collections(&self) -> &[Arc<Collection>] {
        &self.collections
    }

    /// Merge the problem sets compiled into this binary
    pub fn load_builtins<F>(&self, filter: F) -> usize
    where
        F: Fn(&ProblemSetPlugin) -> bool,
    {
        let sets = builtin_problem_sets(filter);
        let merged: usize = self
            .collections
            .iter()
            .map(|collection| collection.merge(sets.iter().cloned()))
            .sum();
        info!(available = sets.len(), merged, "registered built-in problem sets");
        merged
    }

    /// Compile and merge every accepted file below every collection directory
    ///
    /// Failures are logged per file and do not stop the scan.
    pub fn load_all(&self) -> LoadReport {
        let mut report = LoadReport::default();
        for path in self.sources() {
            match self.load_file(&path) {
                Ok(merged) => {
                    report.loaded += 1;
                    report.merged += merged;
                }
                Err(e) => {
                    report.failed += 1;
                    error!(path = %path.display(), error = %e, "failed to load solver source");
                }
            }
        }
        info!(
            loaded = report.loaded,
            failed = report.failed,
            merged = report.merged,
            "initial solver load complete"
        );
        report
    }

    /// Compile one file and merge its sets into the collections whose directory contains it
    ///
    /// Returns the number of merged sets; `Ok(0)` for paths no collection owns.
    pub fn load_file(&self, path: &Path) -> Result<usize, LoaderError> {
        if !self.is_watched(path) {
            debug!(path = %path.display(), "ignoring path outside collection directories");
            return Ok(0);
        }

        let _guard = self.reload_lock.lock();
        let sets = self.compiler.compile(path)?;
        let origin = Origin::File(path.to_path_buf());
        let merged: usize = self
            .collections
            .iter()
            .map(|collection| {
                collection.merge(sets.iter().map(|set| (origin.clone(), Arc::clone(set))))
            })
            .sum();
        info!(path = %path.display(), sets = sets.len(), merged, "loaded solver source");
        Ok(merged)
    }

    /// Whether `path` is a source this loader compiles
    pub fn is_watched(&self, path: &Path) -> bool {
        self.compiler.accepts(path)
            && self
                .collections
                .iter()
                .any(|collection| path.starts_with(collection.directory()))
    }

    fn roots(&self) -> Vec<PathBuf> {
        let mut roots: Vec<PathBuf> = self
            .collections
            .iter()
            .map(|collection| collection.directory().to_path_buf())
            .collect();
        roots.sort();
        roots.dedup();
        roots
    }

    fn sources(&self) -> Vec<PathBuf> {
        let mut sources = BTreeSet::new();
        for root in self.roots().into_iter().filter(|root| root.is_dir()) {
            self.scan(&root, &mut sources);
        }
        sources.into_iter().collect()
    }

    fn scan(&self, dir: &Path, sources: &mut BTreeSet<PathBuf>) {
        for entry in WalkDir::new(dir).follow_links(true) {
            match entry {
                Ok(entry) if entry.file_type().is_file() && self.is_watched(entry.path()) => {
                    sources.insert(entry.into_path());
                }
                Ok(_) => {}
                Err(source) => {
                    let e = LoaderError::Scan {
                        path: dir.to_path_buf(),
                        source,
                    };
                    warn!(error = %e, "skipping unreadable entry");
                }
            }
        }
    }

    /// Directories to watch recursively
    ///
    /// A collection directory that does not exist yet is covered by its nearest
    /// existing ancestor. Directories below another target are dropped.
    fn watch_targets(&self) -> Vec<PathBuf> {
        let mut targets: Vec<PathBuf> = Vec::new();
        for root in self.roots() {
            let Some(dir) = root.ancestors().find(|dir| dir.is_dir()) else {
                warn!(dir = %root.display(), "no existing ancestor of collection directory; not watching");
                continue;
            };
            if dir != root {
                warn!(
                    dir = %root.display(),
                    ancestor = %dir.display(),
                    "collection directory does not exist yet; watching its ancestor"
                );
            }
            targets.push(dir.to_path_buf());
        }
        targets.sort();
        targets.dedup();
        let mut covering: Vec<PathBuf> = Vec::new();
        for dir in targets {
            if !covering.iter().any(|outer| dir.starts_with(outer)) {
                covering.push(dir);
            }
        }
        covering
    }

    /// Whether `dir` is a collection directory, inside one, or on the way to one
    fn leads_to_collection(&self, dir: &Path) -> bool {
        self.collections.iter().any(|collection| {
            dir.starts_with(collection.directory()) || collection.directory().starts_with(dir)
        })
    }

    /// Start reloading changed sources
    ///
    /// Must be called inside a tokio runtime. Changes stop being picked up when the
    /// returned handle is dropped.
    pub fn watch(self: Arc<Self>, debounce: Duration) -> Result<WatchHandle, LoaderError> {
        let (tx, rx) = mpsc::unbounded_channel();
        let mut watcher = notify::recommended_watcher(move |res: notify::Result<Event>| {
            let _ = tx.send(res);
        })?;

        for dir in self.watch_targets() {
            watcher.watch(&dir, RecursiveMode::Recursive)?;
            info!(dir = %dir.display(), "watching for solver sources");
        }

        let task = tokio::spawn(self.reload_loop(rx, debounce));
        Ok(WatchHandle {
            _watcher: watcher,
            task,
        })
    }

    async fn reload_loop(
        self: Arc<Self>,
        mut events: mpsc::UnboundedReceiver<notify::Result<Event>>,
        debounce: Duration,
    ) {
        while let Some(first) = events.recv().await {
            tokio::time::sleep(debounce).await;
            let mut pending = BTreeSet::new();
            self.collect_changed(first, &mut pending);
            while let Ok(next) = events.try_recv() {
                self.collect_changed(next, &mut pending);
            }

            for path in pending {
                let loader = Arc::clone(&self);
                let compiled = tokio::task::spawn_blocking(move || {
                    let result = loader.load_file(&path);
                    (path, result)
                })
                .await;
                match compiled {
                    Ok((path, Ok(merged))) => {
                        info!(path = %path.display(), merged, "reloaded solver source");
                    }
                    Ok((path, Err(e))) => {
                        error!(path = %path.display(), error = %e, "reload failed; keeping previous definitions");
                    }
                    Err(e) => error!(error = %e, "reload task aborted"),
                }
            }
        }
        debug!("file watcher closed");
    }

    fn collect_changed(&self, event: notify::Result<Event>, pending: &mut BTreeSet<PathBuf>) {
        match event {
            Ok(event) if matches!(event.kind, EventKind::Create(_) | EventKind::Modify(_)) => {
                let created = matches!(event.kind, EventKind::Create(_));
                for path in event.paths {
                    if path.is_file() && self.is_watched(&path) {
                        pending.insert(path);
                    } else if created && path.is_dir() && self.leads_to_collection(&path) {
                        // Files written before the new directory got its own watch
                        // raise no events of their own.
                        self.scan(&path, pending);
                    }
                }
            }
            Ok(_) => {}
            Err(e) => warn!(error = %e, "file watcher error"),
        }
    }
}

/// Keeps the file watcher alive
pub struct WatchHandle {
    _watcher: RecommendedWatcher,
    task: JoinHandle<()>,
}

impl WatchHandle {
    /// Stop watching and wait for an in-progress reload to finish
    pub async fn shutdown(self) {
        let WatchHandle {
            _watcher: watcher,
            task,
        } = self;
        drop(watcher);
        if let Err(e) = task.await {
            warn!(error = %e, "reload task ended abnormally");
        }
    }
}
