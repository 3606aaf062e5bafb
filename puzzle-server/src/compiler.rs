//! Loads problem sets from shared-library plugins
//!
//! A plugin is a `cdylib` built with `puzzle_solver::export_problem_sets!`. Every
//! load goes through a fresh copy of the file, so a rebuilt plugin at the same
//! path is mapped anew instead of resolving to the already loaded image. The
//! copy is removed as soon as it is mapped.

use chrono::{DateTime, Utc};
use libloading::{Library, Symbol};
use puzzle_solver::{
    CompileError, Compiler, PLUGIN_ABI_SYMBOL, PLUGIN_ABI_VERSION, PLUGIN_ENTRY_SYMBOL,
    PluginEntry, PluginRegistrar, Problem, ProblemError, ProblemSet, Reporter,
};
use std::ffi::OsStr;
use std::panic::{self, AssertUnwindSafe};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use tempfile::TempDir;
use tracing::debug;

/// [`Compiler`] for platform shared libraries (`.so`, `.dylib`, `.dll`)
pub struct DylibCompiler {
    shadow_dir: TempDir,
    loads: AtomicU64,
}

impl DylibCompiler {
    pub fn new() -> std::io::Result<Self> {
        let shadow_dir = tempfile::Builder::new().prefix("puzzled-plugins-").tempdir()?;
        Ok(Self {
            shadow_dir,
            loads: AtomicU64::new(0),
        })
    }

    fn shadow_path(&self, path: &Path) -> PathBuf {
        let n = self.loads.fetch_add(1, Ordering::Relaxed);
        let stem = path.file_stem().and_then(OsStr::to_str).unwrap_or("plugin");
        self.shadow_dir
            .path()
            .join(format!("{stem}-{n}.{}", std::env::consts::DLL_EXTENSION))
    }
}

impl Compiler for DylibCompiler {
    fn accepts(&self, path: &Path) -> bool {
        path.extension() == Some(OsStr::new(std::env::consts::DLL_EXTENSION))
    }

    fn compile(&self, path: &Path) -> Result<Vec<Arc<dyn ProblemSet>>, CompileError> {
        let shadow = self.shadow_path(path);
        if let Err(e) = std::fs::copy(path, &shadow) {
            discard(&shadow);
            return Err(CompileError::new(
                path,
                format!("copying to {} failed: {e}", shadow.display()),
            ));
        }

        // SAFETY: loading runs the library's initialisers. Plugins are trusted code
        // built against this crate's `puzzle-solver`.
        let loaded = unsafe { Library::new(&shadow) };
        discard(&shadow);
        let library = loaded.map_err(|e| CompileError::new(path, format!("loading failed: {e}")))?;

        let sets = {
            // SAFETY: the symbol is declared by `export_problem_sets!` as a `u32` static.
            let version = unsafe {
                let symbol: Symbol<*const u32> = library
                    .get(PLUGIN_ABI_SYMBOL)
                    .map_err(|e| CompileError::new(path, format!("not a puzzle plugin: {e}")))?;
                **symbol
            };
            if version != PLUGIN_ABI_VERSION {
                return Err(CompileError::new(
                    path,
                    format!("plugin ABI version {version}, host expects {PLUGIN_ABI_VERSION}"),
                ));
            }

            // SAFETY: matching ABI version means the entry has the `PluginEntry` signature.
            let entry: Symbol<PluginEntry> = unsafe { library.get(PLUGIN_ENTRY_SYMBOL) }
                .map_err(|e| CompileError::new(path, format!("missing entry point: {e}")))?;

            let mut registrar = PluginRegistrar::new();
            panic::catch_unwind(AssertUnwindSafe(|| (*entry)(&mut registrar)))
                .map_err(|_| CompileError::new(path, "plugin entry point panicked"))?;
            registrar.into_sets()
        };

        if sets.is_empty() {
            return Err(CompileError::new(path, "plugin exports no problem sets"));
        }

        let library = Arc::new(library);
        Ok(sets
            .into_iter()
            .map(|inner| {
                Arc::new(LoadedProblemSet {
                    inner,
                    library: Arc::clone(&library),
                }) as Arc<dyn ProblemSet>
            })
            .collect())
    }
}

/// Remove a shadow copy; a mapped image outlives its file on Unix
///
/// Where the platform refuses (Windows keeps loaded DLLs locked) the copy stays
/// until the shadow directory is dropped.
fn discard(shadow: &Path) {
    match std::fs::remove_file(shadow) {
        Ok(()) => {}
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
        Err(e) => debug!(path = %shadow.display(), error = %e, "shadow copy left in place"),
    }
}

/// Keeps the library mapped for as long as anything from it is reachable
struct LoadedProblemSet {
    inner: Arc<dyn ProblemSet>,
    library: Arc<Library>,
}

impl ProblemSet for LoadedProblemSet {
    fn name(&self) -> &str {
        self.inner.name()
    }

    fn release_time(&self) -> DateTime<Utc> {
        self.inner.release_time()
    }

    fn problems(&self) -> Vec<Arc<dyn Problem>> {
        self.inner
            .problems()
            .into_iter()
            .map(|inner| {
                Arc::new(LoadedProblem {
                    inner,
                    _library: Arc::clone(&self.library),
                }) as Arc<dyn Problem>
            })
            .collect()
    }
}

struct LoadedProblem {
    inner: Arc<dyn Problem>,
    _library: Arc<Library>,
}

impl Problem for LoadedProblem {
    fn name(&self) -> &str {
        self.inner.name()
    }

    fn description(&self) -> Option<&str> {
        self.inner.description()
    }

    fn solve(&self, input: &str, reporter: &Reporter) -> Result<(), ProblemError> {
        self.inner.solve(input, reporter)
    }
}
