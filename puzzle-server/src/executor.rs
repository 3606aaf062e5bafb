//! Worker pool running problem bodies off the async runtime

use crate::error::ServerError;
use crate::trace;
use puzzle_solver::{Problem, ProblemError, Reporter};
use std::any::Any;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::oneshot;

/// How one run of a problem ended
#[derive(Debug)]
pub struct Outcome {
    /// `Err` when the problem returned an error or panicked
    pub result: Result<(), Failure>,
    /// Wall time of the `solve` call alone
    pub elapsed: Duration,
}

impl Outcome {
    /// Outcome for a worker that went away without reporting back
    pub(crate) fn lost() -> Self {
        Self {
            result: Err(Failure {
                message: "worker exited without reporting an outcome".to_string(),
                panicked: true,
                trace: Vec::new(),
            }),
            elapsed: Duration::ZERO,
        }
    }
}

/// A failed run, rendered for the client
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Failure {
    pub message: String,
    pub panicked: bool,
    /// Abbreviated stack trace for the log; never sent to the client
    pub trace: Vec<String>,
}

impl Failure {
    fn from_error(e: &ProblemError) -> Self {
        Self {
            message: e.chain(),
            panicked: false,
            trace: e
                .backtrace()
                .map(|bt| trace::abbreviate(&bt.to_string()))
                .unwrap_or_default(),
        }
    }

    fn from_panic(payload: Box<dyn Any + Send>, trace: Vec<String>) -> Self {
        let message = if let Some(s) = payload.downcast_ref::<&str>() {
            (*s).to_string()
        } else if let Some(s) = payload.downcast_ref::<String>() {
            s.clone()
        } else {
            "solver panicked".to_string()
        };
        Self {
            message,
            panicked: true,
            trace,
        }
    }
}

/// Fixed-size pool of solver threads
pub struct Executor {
    thread_pool: rayon::ThreadPool,
}

impl Executor {
    /// Create a pool with `thread_count` workers
    pub fn new(thread_count: usize) -> Result<Self, ServerError> {
        let thread_pool = rayon::ThreadPoolBuilder::new()
            .num_threads(thread_count)
            .thread_name(|i| format!("solver-{i}"))
            .build()
            .map_err(|e| ServerError::ThreadPool(e.to_string()))?;
        trace::install_panic_hook();

        Ok(Self { thread_pool })
    }

    pub fn thread_count(&self) -> usize {
        self.thread_pool.current_num_threads()
    }

    /// Run `problem` on a pool thread
    ///
    /// The reporter is dropped as soon as `solve` returns, so the paired
    /// [`Updates`](puzzle_solver::Updates) reader sees the end of the stream once
    /// every clone handed out by the problem is gone too. Dropping the returned
    /// receiver does not stop the run.
    pub fn spawn(
        &self,
        problem: Arc<dyn Problem>,
        input: String,
        reporter: Reporter,
    ) -> oneshot::Receiver<Outcome> {
        let (tx, rx) = oneshot::channel();

        self.thread_pool.spawn(move || {
            let start = Instant::now();
            let result = trace::catch_traced(|| problem.solve(&input, &reporter));
            let elapsed = start.elapsed();
            drop(reporter);

            let result = match result {
                Ok(Ok(())) => Ok(()),
                Ok(Err(e)) => Err(Failure::from_error(&e)),
                Err((payload, trace)) => Err(Failure::from_panic(payload, trace)),
            };

            if tx.send(Outcome { result, elapsed }).is_err() {
                tracing::debug!(problem = problem.name(), "session ended before the solver finished");
            }
        });

        rx
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use puzzle_solver::{FnProblem, Identifier, SolveError, update_channel};

    fn id() -> Identifier {
        Identifier::new("Test", 2023, "tester", "Day 1", "Part 1").unwrap()
    }

    #[tokio::test]
    async fn test_successful_run() {
        let executor = Executor::new(2).unwrap();
        let problem = FnProblem::new("Part 1", |input, reporter| {
            reporter.solved(input.trim().len().to_string());
            Ok(())
        })
        .shared();
        let (reporter, mut updates) = update_channel(id());

        let outcome = executor.spawn(problem, "abc\n".to_string(), reporter).await.unwrap();
        assert!(outcome.result.is_ok());

        let update = updates.read().await.unwrap();
        assert!(update.is_finished());
        assert!(updates.read().await.is_none());
    }

    #[tokio::test]
    async fn test_error_is_rendered() {
        let executor = Executor::new(1).unwrap();
        let problem = FnProblem::new("Part 1", |_, _| {
            Err(SolveError::NoSolution("empty input".to_string()).into())
        })
        .shared();
        let (reporter, _updates) = update_channel(id());

        let outcome = executor.spawn(problem, String::new(), reporter).await.unwrap();
        let failure = outcome.result.unwrap_err();
        assert_eq!(failure.message, "No solution: empty input");
        assert!(!failure.panicked);
        assert!(failure.trace.is_empty());
    }

    #[tokio::test]
    async fn test_panic_is_caught_and_pool_survives() {
        let executor = Executor::new(1).unwrap();
        let boom = FnProblem::new("Part 1", |_, _| panic!("index out of bounds")).shared();
        let fine = FnProblem::new("Part 2", |_, _| Ok(())).shared();

        let (reporter, _updates) = update_channel(id());
        let outcome = executor.spawn(boom, String::new(), reporter).await.unwrap();
        let failure = outcome.result.unwrap_err();
        assert_eq!(failure.message, "index out of bounds");
        assert!(failure.panicked);
        assert!(
            failure.trace.iter().any(|frame| frame.contains("executor.rs")),
            "{:?}",
            failure.trace
        );

        let (reporter, _updates) = update_channel(id());
        let outcome = executor.spawn(fine, String::new(), reporter).await.unwrap();
        assert!(outcome.result.is_ok());
    }

    #[tokio::test]
    async fn test_elapsed_covers_solve() {
        let executor = Executor::new(1).unwrap();
        let problem = FnProblem::new("Part 1", |_, _| {
            std::thread::sleep(Duration::from_millis(30));
            Ok(())
        })
        .shared();
        let (reporter, _updates) = update_channel(id());

        let outcome = executor.spawn(problem, String::new(), reporter).await.unwrap();
        assert!(outcome.elapsed >= Duration::from_millis(30));
    }
}
