//! A minimal plugin: build it, drop the library under a collection directory and
//! the server picks it up.
//!
//! `PUZZLE_SAMPLE_REVISION` is baked in at build time and prefixed to every
//! answer, which tells rebuilt copies apart.

use chrono::{DateTime, Utc};
use puzzle_solver::{FnProblem, Problem, ProblemError, ProblemSet, advent_release};
use std::sync::Arc;

const REVISION: &str = match option_env!("PUZZLE_SAMPLE_REVISION") {
    Some(revision) => revision,
    None => "dev",
};

#[derive(Default)]
struct LineCount;

impl ProblemSet for LineCount {
    fn name(&self) -> &str {
        "Line Count"
    }

    fn release_time(&self) -> DateTime<Utc> {
        advent_release(2024, 1).unwrap_or_default()
    }

    fn problems(&self) -> Vec<Arc<dyn Problem>> {
        vec![
            FnProblem::new("Part 1", |input, reporter| {
                let lines = input.lines().count();
                reporter.text(format!("counted {lines} lines"));
                reporter.solved(format!("{REVISION}:{lines}"));
                Ok(())
            })
            .with_description("Number of input lines")
            .shared(),
            FnProblem::new("Part 2", |input, reporter| {
                let total = input
                    .lines()
                    .map(|line| line.trim().parse::<i64>())
                    .sum::<Result<i64, _>>()
                    .map_err(ProblemError::msg)?;
                reporter.solved(format!("{REVISION}:{total}"));
                Ok(())
            })
            .with_description("Sum of the input lines")
            .shared(),
        ]
    }
}

puzzle_solver::export_problem_sets!(LineCount);
