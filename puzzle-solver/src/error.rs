//! Error types for the solver library

use itertools::Itertools;
use std::backtrace::{Backtrace, BacktraceStatus};
use std::path::PathBuf;
use thiserror::Error;

/// Error type for an invalid puzzle identifier
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IdentifierError {
    /// Year lies outside the supported range
    #[error("Year {0} is outside the supported range {min}..={max}", min = crate::identifier::MIN_YEAR, max = crate::identifier::MAX_YEAR)]
    YearOutOfRange(u16),
    /// A required name component is empty
    #[error("Identifier field `{0}` must not be empty")]
    EmptyField(&'static str),
}

/// Error type for parsing input data
#[derive(Debug, Clone, Error)]
pub enum ParseError {
    /// Input format doesn't match expected structure
    #[error("Invalid format: {0}")]
    InvalidFormat(String),
    /// Required data is missing from input
    #[error("Missing data: {0}")]
    MissingData(String),
    /// Other parsing errors
    #[error("Parse error: {0}")]
    Other(String),
}

/// Error type for solving an already parsed input
#[derive(Debug, Error)]
pub enum SolveError {
    /// The puzzle has no answer for this input
    #[error("No solution: {0}")]
    NoSolution(String),
    /// An error occurred while solving
    #[error("Solve failed: {0}")]
    SolveFailed(#[source] Box<dyn std::error::Error + Send + Sync>),
}

/// Error returned by [`Problem::solve`](crate::Problem::solve)
///
/// This is the "throw" of a running problem: the session handler turns it into an
/// unsuccessful `finished` update regardless of anything the problem reported before.
#[derive(Debug, Error)]
pub enum ProblemError {
    /// Input could not be parsed
    #[error(transparent)]
    Parse(#[from] ParseError),
    /// Solving the parsed input failed
    #[error(transparent)]
    Solve(#[from] SolveError),
    /// Any other failure raised inside a problem body
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl ProblemError {
    /// Shorthand for an ad-hoc failure message
    pub fn msg(message: impl std::fmt::Display) -> Self {
        Self::Other(anyhow::anyhow!("{message}"))
    }

    /// Render the error and every source below it on a single line
    pub fn chain(&self) -> String {
        let mut parts = vec![self.to_string()];
        let mut source = std::error::Error::source(self);
        while let Some(err) = source {
            let text = err.to_string();
            if !parts.last().is_some_and(|last| last.ends_with(&text)) {
                parts.push(text);
            }
            source = err.source();
        }
        parts.join(": ")
    }

    /// Backtrace captured when an [`Other`](Self::Other) error was created
    ///
    /// Only present when capture is enabled through `RUST_BACKTRACE` or
    /// `RUST_LIB_BACKTRACE`.
    pub fn backtrace(&self) -> Option<&Backtrace> {
        match self {
            Self::Other(e) if e.backtrace().status() == BacktraceStatus::Captured => {
                Some(e.backtrace())
            }
            _ => None,
        }
    }
}

/// Error type for turning a solver source file into invocable problem sets
#[derive(Debug, Clone, Error)]
#[error("Failed to compile {}: {}", .path.display(), .diagnostics.iter().join("; "))]
pub struct CompileError {
    /// The file that failed to compile
    pub path: PathBuf,
    /// Every diagnostic produced for the file
    pub diagnostics: Vec<String>,
}

impl CompileError {
    /// Create a compile error with a single diagnostic
    pub fn new(path: impl Into<PathBuf>, diagnostic: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            diagnostics: vec![diagnostic.into()],
        }
    }
}

/// Error type for an inconsistent metadata snapshot
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// Collection year lies outside the supported range
    #[error("Collection {source_name} has year {year} outside the supported range")]
    YearOutOfRange { source_name: String, year: u16 },
    /// A collection has no source name
    #[error("Collection for year {0} has an empty source")]
    EmptySource(u16),
    /// An author entry has no name
    #[error("Collection {source_name}/{year} has an empty author name")]
    EmptyAuthor { source_name: String, year: u16 },
    /// A problem set has no name
    #[error("Problem set by {author} in {source_name}/{year} has an empty name")]
    EmptySetName {
        source_name: String,
        year: u16,
        author: String,
    },
    /// A problem has no name
    #[error("Problem in set {set} by {author} ({source_name}/{year}) has an empty name")]
    EmptyProblemName {
        source_name: String,
        year: u16,
        author: String,
        set: String,
    },
    /// A set was released in a different year than its collection
    #[error("Problem set {set} by {author} was released in {released}, not {year} ({source_name})")]
    ReleaseYearMismatch {
        source_name: String,
        year: u16,
        author: String,
        set: String,
        released: i32,
    },
}
