//! Problem and problem-set contracts

use crate::error::{ParseError, ProblemError, SolveError};
use crate::reporter::Reporter;
use chrono::{DateTime, TimeZone, Utc};
use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;

/// A named unit of work
///
/// `solve` runs to completion on a worker thread. Everything the client sees,
/// including the answer, goes through the [`Reporter`]; returning `Err` (or
/// panicking) marks the run as failed no matter what was reported before.
pub trait Problem: Send + Sync {
    fn name(&self) -> &str;

    fn description(&self) -> Option<&str> {
        None
    }

    fn solve(&self, input: &str, reporter: &Reporter) -> Result<(), ProblemError>;
}

/// A group of problems released together by one author
pub trait ProblemSet: Send + Sync {
    /// Display name, unique per author within a collection
    fn name(&self) -> &str;

    /// When the set was published; its year must match the owning collection's year
    fn release_time(&self) -> DateTime<Utc>;

    /// Problems in display order
    fn problems(&self) -> Vec<Arc<dyn Problem>>;
}

impl fmt::Debug for dyn Problem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Problem").field("name", &self.name()).finish()
    }
}

impl fmt::Debug for dyn ProblemSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProblemSet")
            .field("name", &self.name())
            .field("release_time", &self.release_time())
            .finish()
    }
}

/// Release time of a daily puzzle: December `day`, midnight UTC-5
///
/// Returns `None` for a day that does not exist in December.
pub fn advent_release(year: i32, day: u32) -> Option<DateTime<Utc>> {
    Utc.with_ymd_and_hms(year, 12, day, 5, 0, 0).single()
}

/// Trait for parsing puzzle input into the data shared by all parts
///
/// # Example
///
/// ```
/// use puzzle_solver::{PuzzleParser, ParseError};
///
/// struct Day1;
///
/// impl PuzzleParser for Day1 {
///     type Parsed<'a> = Vec<i64>;
///
///     fn parse(input: &str) -> Result<Self::Parsed<'_>, ParseError> {
///         input
///             .lines()
///             .map(|l| l.trim().parse().map_err(|_| ParseError::InvalidFormat("bad int".into())))
///             .collect()
///     }
/// }
/// ```
pub trait PuzzleParser {
    /// Parsed representation of the input.
    ///
    /// Borrow from the input (`&'a str`) when no transformation is needed.
    type Parsed<'a>;

    fn parse<'a>(input: &'a str) -> Result<Self::Parsed<'a>, ParseError>;
}

/// Solves part `N` of a puzzle from its parsed input
///
/// Progress may be streamed through `reporter`; the returned string is reported as
/// the solution by [`Part`].
pub trait PartSolver<const N: u8>: PuzzleParser {
    fn solve(parsed: &mut Self::Parsed<'_>, reporter: &Reporter) -> Result<String, SolveError>;
}

/// [`Problem`] adaptor running `P::parse` then `<P as PartSolver<N>>::solve`
pub struct Part<P, const N: u8> {
    name: String,
    description: Option<String>,
    _solver: PhantomData<fn() -> P>,
}

impl<P, const N: u8> Part<P, N>
where
    P: PartSolver<N> + 'static,
{
    /// A part named `Part N`
    pub fn new() -> Self {
        Self {
            name: format!("Part {N}"),
            description: None,
            _solver: PhantomData,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn shared(self) -> Arc<dyn Problem> {
        Arc::new(self)
    }
}

impl<P, const N: u8> Default for Part<P, N>
where
    P: PartSolver<N> + 'static,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<P, const N: u8> Problem for Part<P, N>
where
    P: PartSolver<N> + 'static,
{
    fn name(&self) -> &str {
        &self.name
    }

    fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    fn solve(&self, input: &str, reporter: &Reporter) -> Result<(), ProblemError> {
        let mut parsed = P::parse(input)?;
        let answer = <P as PartSolver<N>>::solve(&mut parsed, reporter)?;
        reporter.solved(answer);
        Ok(())
    }
}

type SolveFn = dyn Fn(&str, &Reporter) -> Result<(), ProblemError> + Send + Sync;

/// Closure-backed [`Problem`], handy for plugins and tests
pub struct FnProblem {
    name: String,
    description: Option<String>,
    solve: Box<SolveFn>,
}

impl FnProblem {
    pub fn new<F>(name: impl Into<String>, solve: F) -> Self
    where
        F: Fn(&str, &Reporter) -> Result<(), ProblemError> + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            description: None,
            solve: Box::new(solve),
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn shared(self) -> Arc<dyn Problem> {
        Arc::new(self)
    }
}

impl Problem for FnProblem {
    fn name(&self) -> &str {
        &self.name
    }

    fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    fn solve(&self, input: &str, reporter: &Reporter) -> Result<(), ProblemError> {
        (self.solve)(input, reporter)
    }
}

/// Data-driven [`ProblemSet`]
#[derive(Clone)]
pub struct SimpleProblemSet {
    name: String,
    release_time: DateTime<Utc>,
    problems: Vec<Arc<dyn Problem>>,
}

impl SimpleProblemSet {
    pub fn new(name: impl Into<String>, release_time: DateTime<Utc>) -> Self {
        Self {
            name: name.into(),
            release_time,
            problems: Vec::new(),
        }
    }

    pub fn with_problem(mut self, problem: Arc<dyn Problem>) -> Self {
        self.problems.push(problem);
        self
    }

    pub fn shared(self) -> Arc<dyn ProblemSet> {
        Arc::new(self)
    }
}

impl ProblemSet for SimpleProblemSet {
    fn name(&self) -> &str {
        &self.name
    }

    fn release_time(&self) -> DateTime<Utc> {
        self.release_time
    }

    fn problems(&self) -> Vec<Arc<dyn Problem>> {
        self.problems.clone()
    }
}
