//! Live, mutable set of problem definitions for one (source, year)

use crate::metadata::{CollectionMetadata, ProblemMetadata, ProblemSetMetadata};
use crate::problem::ProblemSet;
use parking_lot::RwLock;
use std::collections::BTreeMap;
use std::fmt;
use std::path::{Component, Path, PathBuf};
use std::sync::Arc;

/// Author assigned to sets that sit directly in a collection root
pub const UNKNOWN_AUTHOR: &str = "Unknown";

/// Where a compiled problem set came from
///
/// The first segment below the owning collection's root names the author.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Origin {
    /// A file under the collection directory
    File(PathBuf),
    /// A Rust module path (`module_path!()`) under the collection module
    Module(String),
}

impl fmt::Display for Origin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Origin::File(path) => write!(f, "{}", path.display()),
            Origin::Module(module) => f.write_str(module),
        }
    }
}

type Listener = Box<dyn Fn(&Collection) + Send + Sync>;

/// Problem sets for one (source, year), keyed by author
///
/// Mutated only through [`Collection::merge`]. Merges are mutually exclusive, and
/// subscribers are notified after the merged state is visible.
pub struct Collection {
    source: String,
    year: u16,
    module: String,
    directory: PathBuf,
    authors: RwLock<BTreeMap<String, Vec<Arc<dyn ProblemSet>>>>,
    listeners: RwLock<Vec<Listener>>,
}

impl Collection {
    /// Create an empty collection
    ///
    /// # Arguments
    /// * `source` - Puzzle source name, e.g. `Advent of Code`
    /// * `year` - Puzzle year; every merged set should be released in this year
    /// * `module` - Module root whose sub-modules are author namespaces
    /// * `directory` - Directory root whose sub-directories are author namespaces
    pub fn new(
        source: impl Into<String>,
        year: u16,
        module: impl Into<String>,
        directory: impl Into<PathBuf>,
    ) -> Self {
        Self {
            source: source.into(),
            year,
            module: module.into(),
            directory: directory.into(),
            authors: RwLock::new(BTreeMap::new()),
            listeners: RwLock::new(Vec::new()),
        }
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn year(&self) -> u16 {
        self.year
    }

    pub fn module(&self) -> &str {
        &self.module
    }

    pub fn directory(&self) -> &Path {
        &self.directory
    }

    /// Author namespace of `origin`, or `None` when it lies outside this collection
    pub fn author_of(&self, origin: &Origin) -> Option<String> {
        match origin {
            Origin::File(path) => {
                let relative = path.strip_prefix(&self.directory).ok()?;
                let mut parts = relative.components().filter_map(|c| match c {
                    Component::Normal(part) => Some(part),
                    _ => None,
                });
                let first = parts.next()?;
                Some(match parts.next() {
                    Some(_) => first.to_string_lossy().into_owned(),
                    None => UNKNOWN_AUTHOR.to_string(),
                })
            }
            Origin::Module(module) => {
                if module == &self.module {
                    return Some(UNKNOWN_AUTHOR.to_string());
                }
                let rest = module.strip_prefix(&self.module)?.strip_prefix("::")?;
                rest.split("::")
                    .next()
                    .filter(|author| !author.is_empty())
                    .map(str::to_string)
            }
        }
    }

    /// Fold newly compiled sets into this collection
    ///
    /// Sets whose origin lies outside the collection are skipped. Within an author,
    /// a set replaces any existing set with the same release time; otherwise it is
    /// appended. Each author's list stays sorted by release time. Subscribers are
    /// notified once if anything was merged.
    ///
    /// # Returns
    /// The number of sets merged
    pub fn merge<I>(&self, incoming: I) -> usize
    where
        I: IntoIterator<Item = (Origin, Arc<dyn ProblemSet>)>,
    {
        let mut merged = 0;
        {
            let mut authors = self.authors.write();
            for (origin, set) in incoming {
                let Some(author) = self.author_of(&origin) else {
                    continue;
                };
                let sets = authors.entry(author.clone()).or_default();
                let released = set.release_time();
                match sets.iter_mut().find(|s| s.release_time() == released) {
                    Some(existing) => {
                        tracing::debug!(
                            source = %self.source, year = self.year, %author, set = set.name(),
                            %origin, "replacing problem set"
                        );
                        *existing = set;
                    }
                    None => {
                        tracing::debug!(
                            source = %self.source, year = self.year, %author, set = set.name(),
                            %origin, "adding problem set"
                        );
                        sets.push(set);
                    }
                }
                sets.sort_by_key(|s| s.release_time());
                merged += 1;
            }
        }

        if merged > 0 {
            for listener in self.listeners.read().iter() {
                listener(self);
            }
        }
        merged
    }

    /// Register a callback fired after every merge that changed this collection
    pub fn subscribe<F>(&self, listener: F)
    where
        F: Fn(&Collection) + Send + Sync + 'static,
    {
        self.listeners.write().push(Box::new(listener));
    }

    /// Point-in-time copy of the author → sets mapping
    pub fn authors(&self) -> BTreeMap<String, Vec<Arc<dyn ProblemSet>>> {
        self.authors.read().clone()
    }

    /// Sets by one author, ordered by release time
    pub fn sets_by(&self, author: &str) -> Vec<Arc<dyn ProblemSet>> {
        self.authors.read().get(author).cloned().unwrap_or_default()
    }

    pub fn metadata(&self) -> CollectionMetadata {
        let authors = self
            .authors()
            .into_iter()
            .map(|(author, sets)| {
                let sets = sets
                    .iter()
                    .map(|set| ProblemSetMetadata {
                        name: set.name().to_string(),
                        author: author.clone(),
                        release_time: set.release_time(),
                        problems: set
                            .problems()
                            .iter()
                            .map(|p| ProblemMetadata {
                                name: p.name().to_string(),
                                description: p.description().map(str::to_string),
                            })
                            .collect(),
                    })
                    .collect();
                (author, sets)
            })
            .collect();

        CollectionMetadata {
            source: self.source.clone(),
            year: self.year,
            authors,
        }
    }
}

impl fmt::Debug for Collection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Collection")
            .field("source", &self.source)
            .field("year", &self.year)
            .field("module", &self.module)
            .field("directory", &self.directory)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::problem::{FnProblem, SimpleProblemSet, advent_release};
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn collection() -> Collection {
        Collection::new("Advent of Code", 2023, "solutions::aoc::y2023", "/solvers/aoc/y2023")
    }

    fn set(name: &str, day: u32, problems: &[&str]) -> Arc<dyn ProblemSet> {
        problems
            .iter()
            .fold(
                SimpleProblemSet::new(name, advent_release(2023, day).unwrap()),
                |set, p| set.with_problem(FnProblem::new(*p, |_, _| Ok(())).shared()),
            )
            .shared()
    }

    fn file(path: &str) -> Origin {
        Origin::File(PathBuf::from(path))
    }

    #[test]
    fn test_author_from_directory() {
        let c = collection();
        assert_eq!(c.author_of(&file("/solvers/aoc/y2023/alice/day01.so")).as_deref(), Some("alice"));
        assert_eq!(
            c.author_of(&file("/solvers/aoc/y2023/alice/nested/day01.so")).as_deref(),
            Some("alice")
        );
        assert_eq!(c.author_of(&file("/solvers/aoc/y2023/day01.so")).as_deref(), Some(UNKNOWN_AUTHOR));
        assert_eq!(c.author_of(&file("/solvers/aoc/y2022/alice/day01.so")), None);
    }

    #[test]
    fn test_author_from_module() {
        let c = collection();
        let module = |m: &str| Origin::Module(m.to_string());
        assert_eq!(c.author_of(&module("solutions::aoc::y2023::bob::day_02")).as_deref(), Some("bob"));
        assert_eq!(c.author_of(&module("solutions::aoc::y2023::bob")).as_deref(), Some("bob"));
        assert_eq!(c.author_of(&module("solutions::aoc::y2023")).as_deref(), Some(UNKNOWN_AUTHOR));
        assert_eq!(c.author_of(&module("solutions::aoc::y20234::bob")), None);
        assert_eq!(c.author_of(&module("other::bob")), None);
    }

    #[test]
    fn test_merge_replaces_same_release_time() {
        let c = collection();
        let origin = file("/solvers/aoc/y2023/alice/day01.so");
        c.merge([(origin.clone(), set("Day 1", 1, &["Part 1"]))]);
        c.merge([(origin, set("Day 1 (v2)", 1, &["Part 1", "Part 2"]))]);

        let sets = c.sets_by("alice");
        assert_eq!(sets.len(), 1);
        assert_eq!(sets[0].name(), "Day 1 (v2)");
        assert_eq!(sets[0].problems().len(), 2);
    }

    #[test]
    fn test_merge_appends_and_sorts() {
        let c = collection();
        c.merge([
            (file("/solvers/aoc/y2023/alice/day03.so"), set("Day 3", 3, &["Part 1"])),
            (file("/solvers/aoc/y2023/alice/day01.so"), set("Day 1", 1, &["Part 1"])),
        ]);
        c.merge([(file("/solvers/aoc/y2023/alice/day02.so"), set("Day 2", 2, &["Part 1"]))]);

        let names: Vec<String> = c.sets_by("alice").iter().map(|s| s.name().to_string()).collect();
        assert_eq!(names, ["Day 1", "Day 2", "Day 3"]);
    }

    #[test]
    fn test_merge_skips_foreign_origins_and_notifies_once() {
        let c = collection();
        let fired = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&fired);
        c.subscribe(move |collection| {
            assert_eq!(collection.sets_by("alice").len(), 1);
            counter.fetch_add(1, Ordering::SeqCst);
        });

        let merged = c.merge([
            (file("/elsewhere/alice/day01.so"), set("Day 1", 1, &["Part 1"])),
            (file("/solvers/aoc/y2023/alice/day01.so"), set("Day 1", 1, &["Part 1"])),
        ]);
        assert_eq!(merged, 1);
        assert_eq!(fired.load(Ordering::SeqCst), 1);

        assert_eq!(c.merge([(file("/elsewhere/x.so"), set("Day 9", 9, &["Part 1"]))]), 0);
        assert_eq!(fired.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_metadata() {
        let c = collection();
        c.merge([(file("/solvers/aoc/y2023/alice/day01.so"), set("Day 1", 1, &["Part 1", "Part 2"]))]);
        let meta = c.metadata();
        assert_eq!(meta.source, "Advent of Code");
        assert_eq!(meta.year, 2023);
        let alice = &meta.authors["alice"];
        assert_eq!(alice[0].author, "alice");
        assert_eq!(alice[0].problems.len(), 2);
        assert_eq!(alice[0].problems[1].name, "Part 2");
    }
}
