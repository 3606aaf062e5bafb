//! Boundary to whatever turns solver sources into invocable problem sets

use crate::error::CompileError;
use crate::problem::ProblemSet;
use std::path::Path;
use std::sync::Arc;

/// Turns one solver source file into problem sets
///
/// Implementations decide what a "source" is: a shared library to load, a script
/// to interpret, or an entry in a build-time table. A failed compile yields no
/// sets at all.
pub trait Compiler: Send + Sync {
    /// Whether `path` is a source this compiler understands
    fn accepts(&self, path: &Path) -> bool;

    /// Compile `path`
    ///
    /// # Returns
    /// * `Ok(sets)` - Every problem set defined by the file
    /// * `Err(CompileError)` - All diagnostics for the file
    fn compile(&self, path: &Path) -> Result<Vec<Arc<dyn ProblemSet>>, CompileError>;
}
