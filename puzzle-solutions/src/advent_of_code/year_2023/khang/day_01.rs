use chrono::{DateTime, Utc};
use puzzle_solver::{
    AutoRegisterProblemSet, ParseError, Part, PartSolver, Problem, ProblemSet, PuzzleParser,
    Reporter, SolveError,
};
use rayon::prelude::*;
use std::sync::Arc;

const CHUNK: usize = 64;
const SPELLED: [&str; 9] = [
    "one", "two", "three", "four", "five", "six", "seven", "eight", "nine",
];

#[derive(Default, AutoRegisterProblemSet)]
#[puzzle(tags = ["khang", "parsing"])]
pub struct Trebuchet;

impl ProblemSet for Trebuchet {
    fn name(&self) -> &str {
        "Day 1: Trebuchet?!"
    }

    fn release_time(&self) -> DateTime<Utc> {
        crate::released(2023, 1)
    }

    fn problems(&self) -> Vec<Arc<dyn Problem>> {
        vec![
            Part::<Self, 1>::new()
                .with_description("Sum of first and last digit per line")
                .shared(),
            Part::<Self, 2>::new()
                .with_description("Same, counting spelled-out digits")
                .shared(),
        ]
    }
}

impl PuzzleParser for Trebuchet {
    type Parsed<'a> = Vec<&'a str>;

    fn parse(input: &str) -> Result<Self::Parsed<'_>, ParseError> {
        let lines: Vec<&str> = input.lines().map(str::trim).filter(|l| !l.is_empty()).collect();
        if lines.is_empty() {
            return Err(ParseError::MissingData("no calibration lines".into()));
        }
        Ok(lines)
    }
}

impl PartSolver<1> for Trebuchet {
    fn solve(parsed: &mut Self::Parsed<'_>, reporter: &Reporter) -> Result<String, SolveError> {
        calibrate(parsed, reporter, |line, at| {
            line.as_bytes()[at].is_ascii_digit().then(|| u32::from(line.as_bytes()[at] - b'0'))
        })
    }
}

impl PartSolver<2> for Trebuchet {
    fn solve(parsed: &mut Self::Parsed<'_>, reporter: &Reporter) -> Result<String, SolveError> {
        calibrate(parsed, reporter, |line, at| {
            let byte = line.as_bytes()[at];
            if byte.is_ascii_digit() {
                return Some(u32::from(byte - b'0'));
            }
            SPELLED
                .iter()
                .position(|word| line.as_bytes()[at..].starts_with(word.as_bytes()))
                .map(|i| i as u32 + 1)
        })
    }
}

/// Sum first and last digit of every line, in parallel chunks
fn calibrate<F>(lines: &[&str], reporter: &Reporter, digit_at: F) -> Result<String, SolveError>
where
    F: Fn(&str, usize) -> Option<u32> + Sync,
{
    let subtotals = lines
        .par_chunks(CHUNK)
        .enumerate()
        .map(|(chunk, lines)| -> Result<u32, SolveError> {
            let subtotal = lines
                .iter()
                .enumerate()
                .map(|(offset, line)| {
                    let first = (0..line.len()).find_map(|at| digit_at(line, at));
                    let last = (0..line.len()).rev().find_map(|at| digit_at(line, at));
                    match (first, last) {
                        (Some(first), Some(last)) => Ok(first * 10 + last),
                        _ => Err(SolveError::NoSolution(format!(
                            "line {} has no digits",
                            chunk * CHUNK + offset + 1
                        ))),
                    }
                })
                .sum::<Result<u32, _>>()?;
            reporter.text(format!("chunk {chunk}: {subtotal}"));
            Ok(subtotal)
        })
        .collect::<Result<Vec<u32>, SolveError>>()?;

    Ok(subtotals.iter().map(|&s| u64::from(s)).sum::<u64>().to_string())
}
