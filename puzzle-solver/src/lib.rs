//! Puzzle Solver Library
//!
//! A registry of puzzle problems that can be replaced while the process runs, and the
//! channel a running problem uses to stream progress back to whoever asked for it.
//!
//! # Overview
//!
//! This library provides:
//! - The [`Problem`] / [`ProblemSet`] contract and a typed [`PuzzleParser`] + [`PartSolver`] adaptor
//! - [`Collection`]: the live sets for one (source, year), with the replace-or-append merge
//! - [`ProblemRegistry`]: a lock-free lookup index rebuilt on every collection change
//! - [`Reporter`] / [`Updates`]: the per-execution update channel
//! - Registration tables for built-in sets and the ABI for dynamically loaded ones
//!
//! # Quick Example
//!
//! ```
//! use puzzle_solver::{
//!     Collection, Identifier, Origin, ParseError, Part, PartSolver, ProblemRegistry,
//!     PuzzleParser, Reporter, SimpleProblemSet, SolveError, advent_release, update_channel,
//! };
//! use std::sync::Arc;
//!
//! struct SumLines;
//!
//! impl PuzzleParser for SumLines {
//!     type Parsed<'a> = Vec<i64>;
//!
//!     fn parse(input: &str) -> Result<Self::Parsed<'_>, ParseError> {
//!         input
//!             .lines()
//!             .map(|l| l.parse().map_err(|_| ParseError::InvalidFormat(l.to_string())))
//!             .collect()
//!     }
//! }
//!
//! impl PartSolver<1> for SumLines {
//!     fn solve(parsed: &mut Self::Parsed<'_>, _: &Reporter) -> Result<String, SolveError> {
//!         Ok(parsed.iter().sum::<i64>().to_string())
//!     }
//! }
//!
//! let collection = Arc::new(Collection::new("Advent of Code", 2023, "solutions::y2023", "solvers/y2023"));
//! let registry = ProblemRegistry::new(vec![Arc::clone(&collection)]);
//!
//! let day_one = SimpleProblemSet::new("Day 1", advent_release(2023, 1).unwrap())
//!     .with_problem(Part::<SumLines, 1>::new().shared());
//! collection.merge([(Origin::Module("solutions::y2023::alice".into()), day_one.shared())]);
//!
//! let id = Identifier::new("Advent of Code", 2023, "alice", "Day 1", "Part 1").unwrap();
//! let problem = registry.get(&id).unwrap();
//!
//! let (reporter, mut updates) = update_channel(id);
//! problem.solve("7\n4", &reporter).unwrap();
//! assert!(updates.read_all_current().last().unwrap().is_finished());
//! ```

mod collection;
mod compile;
mod error;
mod identifier;
mod metadata;
mod plugin;
mod problem;
mod registry;
mod reporter;
mod update;

// Re-export public API
pub use collection::{Collection, Origin, UNKNOWN_AUTHOR};
pub use compile::Compiler;
pub use error::{CompileError, IdentifierError, ParseError, ProblemError, SolveError, ValidationError};
pub use identifier::{Identifier, MAX_YEAR, MIN_YEAR};
pub use metadata::{CollectionMetadata, ProblemMetadata, ProblemSetMetadata, Snapshot};
pub use plugin::{
    CollectionPlugin, PLUGIN_ABI_SYMBOL, PLUGIN_ABI_VERSION, PLUGIN_ENTRY_SYMBOL, PluginEntry,
    PluginRegistrar, ProblemSetPlugin, builtin_collections, builtin_problem_sets,
};
pub use problem::{
    FnProblem, Part, PartSolver, Problem, ProblemSet, PuzzleParser, SimpleProblemSet,
    advent_release,
};
pub use registry::{ProblemRegistry, validate};
pub use reporter::{Reporter, Updates, update_channel};
pub use update::{Glyph, Update, UpdateKind};

// Re-export inventory for use by the derive macro
pub use inventory;

// Re-export the derive macro
pub use puzzle_solver_macros::AutoRegisterProblemSet;
