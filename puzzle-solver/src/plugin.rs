//! Registration tables for built-in and dynamically loaded problem sets

use crate::collection::{Collection, Origin};
use crate::problem::ProblemSet;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Plugin information for automatic problem-set registration
///
/// Usually submitted by `#[derive(AutoRegisterProblemSet)]`; can also be written by hand:
///
/// ```no_run
/// use puzzle_solver::{ProblemSet, ProblemSetPlugin, SimpleProblemSet, advent_release};
/// use std::sync::Arc;
///
/// fn day_one() -> Arc<dyn ProblemSet> {
///     SimpleProblemSet::new("Day 1", advent_release(2023, 1).unwrap()).shared()
/// }
///
/// inventory::submit! {
///     ProblemSetPlugin {
///         module: module_path!(),
///         factory: day_one,
///         tags: &["easy"],
///     }
/// }
/// ```
pub struct ProblemSetPlugin {
    /// Module the set was declared in; the segment below its collection's module is the author
    pub module: &'static str,
    /// Creates a fresh instance of the set
    pub factory: fn() -> Arc<dyn ProblemSet>,
    /// Optional tags for filtering (e.g., "easy", "grid", "wip")
    pub tags: &'static [&'static str],
}

inventory::collect!(ProblemSetPlugin);

/// Declares a collection rooted at the module it is submitted from
pub struct CollectionPlugin {
    pub source: &'static str,
    pub year: u16,
    pub module: &'static str,
}

inventory::collect!(CollectionPlugin);

impl CollectionPlugin {
    /// Directory mirroring this collection's module below `root`
    ///
    /// The crate name is dropped: `solutions::advent_of_code::year_2023` maps to
    /// `<root>/advent_of_code/year_2023`.
    pub fn directory_under(&self, root: &Path) -> PathBuf {
        self.module.split("::").skip(1).fold(root.to_path_buf(), |dir, segment| dir.join(segment))
    }

    /// Create the (empty) collection this plugin declares
    pub fn collection_under(&self, root: &Path) -> Collection {
        Collection::new(self.source, self.year, self.module, self.directory_under(root))
    }
}

/// Every collection declared with [`declare_collection!`](crate::declare_collection)
pub fn builtin_collections() -> impl Iterator<Item = &'static CollectionPlugin> {
    inventory::iter::<CollectionPlugin>.into_iter()
}

/// Instantiate every registered problem set accepted by `filter`
pub fn builtin_problem_sets<F>(filter: F) -> Vec<(Origin, Arc<dyn ProblemSet>)>
where
    F: Fn(&ProblemSetPlugin) -> bool,
{
    inventory::iter::<ProblemSetPlugin>
        .into_iter()
        .filter(|plugin| filter(plugin))
        .map(|plugin| (Origin::Module(plugin.module.to_string()), (plugin.factory)()))
        .collect()
}

/// Declare the collection for the enclosing module
///
/// Sub-modules of the enclosing module are author namespaces.
///
/// ```ignore
/// // solutions/src/advent_of_code/year_2023/mod.rs
/// puzzle_solver::declare_collection!("Advent of Code", 2023);
/// ```
#[macro_export]
macro_rules! declare_collection {
    ($source:expr, $year:expr) => {
        $crate::inventory::submit! {
            $crate::CollectionPlugin {
                source: $source,
                year: $year,
                module: ::core::module_path!(),
            }
        }
    };
}

/// ABI version a dynamically loaded plugin must export
pub const PLUGIN_ABI_VERSION: u32 = 1;
/// Symbol name of the exported ABI version static
pub const PLUGIN_ABI_SYMBOL: &[u8] = b"PUZZLE_PLUGIN_ABI_VERSION";
/// Symbol name of the plugin entry point
pub const PLUGIN_ENTRY_SYMBOL: &[u8] = b"puzzle_plugin_entry";

/// Signature of the entry point generated by [`export_problem_sets!`](crate::export_problem_sets)
pub type PluginEntry = fn(&mut PluginRegistrar);

/// Collects the problem sets a dynamic plugin hands to the host
#[derive(Default)]
pub struct PluginRegistrar {
    sets: Vec<Arc<dyn ProblemSet>>,
}

impl PluginRegistrar {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, set: Arc<dyn ProblemSet>) {
        self.sets.push(set);
    }

    pub fn into_sets(self) -> Vec<Arc<dyn ProblemSet>> {
        self.sets
    }
}

/// Export problem sets from a `cdylib`/`dylib` plugin crate
///
/// Generates the ABI version static and the entry point the host loader looks up.
/// Each listed type must implement `ProblemSet + Default`. Host and plugin must be
/// built by the same compiler against the same `puzzle-solver` version.
///
/// ```ignore
/// puzzle_solver::export_problem_sets!(Day1, Day2);
/// ```
#[macro_export]
macro_rules! export_problem_sets {
    ($($set:ty),* $(,)?) => {
        #[unsafe(no_mangle)]
        pub static PUZZLE_PLUGIN_ABI_VERSION: u32 = $crate::PLUGIN_ABI_VERSION;

        #[unsafe(no_mangle)]
        pub fn puzzle_plugin_entry(registrar: &mut $crate::PluginRegistrar) {
            $(
                registrar.register(::std::sync::Arc::new(<$set as ::core::default::Default>::default()));
            )*
        }
    };
}
