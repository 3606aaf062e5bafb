//! Read-mostly lookup index over every collection
//!
//! The index is an immutable snapshot behind an [`ArcSwap`]. Lookups load the current
//! snapshot without locking; every collection update rebuilds a complete replacement
//! and publishes it in one store, so a lookup sees either the old or the new index.

use crate::collection::Collection;
use crate::error::ValidationError;
use crate::identifier::{Identifier, year_in_range};
use crate::metadata::Snapshot;
use crate::problem::Problem;
use arc_swap::ArcSwap;
use chrono::Datelike;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::{Arc, Weak};

type ProblemMap = HashMap<String, Arc<dyn Problem>>;
type SetMap = HashMap<String, ProblemMap>;
type AuthorMap = HashMap<String, SetMap>;

/// year → source → author → set name → problem name → problem
#[derive(Default)]
struct ProblemIndex {
    years: HashMap<u16, HashMap<String, AuthorMap>>,
    len: usize,
}

impl ProblemIndex {
    fn build(collections: &[Arc<Collection>]) -> Self {
        let mut index = Self::default();
        for collection in collections {
            let authors = index
                .years
                .entry(collection.year())
                .or_default()
                .entry(collection.source().to_string())
                .or_default();
            for (author, sets) in collection.authors() {
                let by_set = authors.entry(author).or_default();
                for set in sets {
                    let problems = by_set.entry(set.name().to_string()).or_default();
                    for problem in set.problems() {
                        if problems
                            .insert(problem.name().to_string(), problem)
                            .is_none()
                        {
                            index.len += 1;
                        }
                    }
                }
            }
        }
        index
    }

    fn get(&self, id: &Identifier) -> Option<&Arc<dyn Problem>> {
        self.years
            .get(&id.year)?
            .get(&id.source)?
            .get(&id.author)?
            .get(&id.set_name)?
            .get(&id.problem_name)
    }
}

/// Registry of every runnable problem across all collections
pub struct ProblemRegistry {
    collections: Vec<Arc<Collection>>,
    index: ArcSwap<ProblemIndex>,
    rebuild_lock: Mutex<()>,
}

impl ProblemRegistry {
    /// Create a registry over `collections` and subscribe to their updates
    ///
    /// The registry holds only a weak reference in each subscription, so dropping
    /// the returned `Arc` detaches it.
    pub fn new(collections: Vec<Arc<Collection>>) -> Arc<Self> {
        let registry = Arc::new(Self {
            collections,
            index: ArcSwap::from_pointee(ProblemIndex::default()),
            rebuild_lock: Mutex::new(()),
        });
        for collection in &registry.collections {
            let weak: Weak<Self> = Arc::downgrade(&registry);
            collection.subscribe(move |_| {
                if let Some(registry) = weak.upgrade() {
                    registry.rebuild();
                }
            });
        }
        registry.rebuild();
        registry
    }

    pub fn collections(&self) -> &[Arc<Collection>] {
        &self.collections
    }

    /// The collection for `(source, year)`, if one is registered
    pub fn collection(&self, source: &str, year: u16) -> Option<&Arc<Collection>> {
        self.collections
            .iter()
            .find(|c| c.year() == year && c.source() == source)
    }

    /// Resolve an identifier; absence is an ordinary outcome
    pub fn get(&self, id: &Identifier) -> Option<Arc<dyn Problem>> {
        self.index.load().get(id).cloned()
    }

    /// Number of problems in the current index
    pub fn len(&self) -> usize {
        self.index.load().len
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Recompute the whole index from the collections and publish it
    ///
    /// Rebuilds are serialized, so the last published index always reflects
    /// every merge that completed before it started.
    pub fn rebuild(&self) {
        let _guard = self.rebuild_lock.lock();
        let index = ProblemIndex::build(&self.collections);
        tracing::debug!(problems = index.len, "problem index rebuilt");
        self.index.store(Arc::new(index));
    }

    /// Every identifier resolvable in the current index, sorted
    pub fn identifiers(&self) -> Vec<Identifier> {
        let index = self.index.load();
        let mut ids = Vec::with_capacity(index.len);
        for (year, sources) in &index.years {
            for (source, authors) in sources {
                for (author, sets) in authors {
                    for (set_name, problems) in sets {
                        for problem_name in problems.keys() {
                            ids.push(Identifier {
                                source: source.clone(),
                                year: *year,
                                author: author.clone(),
                                set_name: set_name.clone(),
                                problem_name: problem_name.clone(),
                            });
                        }
                    }
                }
            }
        }
        ids.sort();
        ids
    }

    /// Metadata for every collection, without validation
    pub fn snapshot(&self) -> Snapshot {
        let mut snapshot = Snapshot::default();
        for collection in &self.collections {
            snapshot
                .collections
                .entry(collection.year())
                .or_default()
                .push(collection.metadata());
        }
        snapshot
    }

    /// Metadata for every collection, rejected if inconsistent
    pub fn validated_snapshot(&self) -> Result<Snapshot, ValidationError> {
        let snapshot = self.snapshot();
        validate(&snapshot)?;
        Ok(snapshot)
    }
}

/// Check a metadata snapshot for out-of-range years, empty names, and sets
/// released outside their collection's year
///
/// Read-only; the first violation found is returned.
pub fn validate(snapshot: &Snapshot) -> Result<(), ValidationError> {
    for collection in snapshot.collections.values().flatten() {
        let source_name = &collection.source;
        let year = collection.year;
        if !year_in_range(year) {
            return Err(ValidationError::YearOutOfRange {
                source_name: source_name.clone(),
                year,
            });
        }
        if source_name.trim().is_empty() {
            return Err(ValidationError::EmptySource(year));
        }
        for (author, sets) in &collection.authors {
            if author.trim().is_empty() {
                return Err(ValidationError::EmptyAuthor {
                    source_name: source_name.clone(),
                    year,
                });
            }
            for set in sets {
                if set.name.trim().is_empty() {
                    return Err(ValidationError::EmptySetName {
                        source_name: source_name.clone(),
                        year,
                        author: author.clone(),
                    });
                }
                if set.release_time.year() != i32::from(year) {
                    return Err(ValidationError::ReleaseYearMismatch {
                        source_name: source_name.clone(),
                        year,
                        author: author.clone(),
                        set: set.name.clone(),
                        released: set.release_time.year(),
                    });
                }
                if set.problems.iter().any(|p| p.name.trim().is_empty()) {
                    return Err(ValidationError::EmptyProblemName {
                        source_name: source_name.clone(),
                        year,
                        author: author.clone(),
                        set: set.name.clone(),
                    });
                }
            }
        }
    }
    Ok(())
}
