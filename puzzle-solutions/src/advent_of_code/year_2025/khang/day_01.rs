use anyhow::anyhow;
use chrono::{DateTime, Utc};
use puzzle_solver::{
    AutoRegisterProblemSet, ParseError, Part, PartSolver, Problem, ProblemSet, PuzzleParser,
    Reporter, SolveError,
};
use std::str::FromStr;
use std::sync::Arc;

/// Secret Entrance: count how often a dial of 0..100 rests on (or passes) zero
#[derive(Default, AutoRegisterProblemSet)]
#[puzzle(tags = ["khang", "dial"])]
pub struct SecretEntrance;

impl ProblemSet for SecretEntrance {
    fn name(&self) -> &str {
        "Day 1: Secret Entrance"
    }

    fn release_time(&self) -> DateTime<Utc> {
        crate::released(2025, 1)
    }

    fn problems(&self) -> Vec<Arc<dyn Problem>> {
        vec![
            Part::<Self, 1>::new()
                .with_description("Times the dial stops at zero")
                .shared(),
            Part::<Self, 2>::new()
                .with_description("Times the dial points at zero, including mid-rotation")
                .shared(),
        ]
    }
}

#[derive(Debug)]
pub struct Rotations {
    parsed_input: Vec<i32>,
}

#[derive(Debug)]
struct Counts {
    zero_counts: u64,
    pass_zero_counts: u64,
}

impl PuzzleParser for SecretEntrance {
    type Parsed<'a> = Rotations;

    fn parse(input: &str) -> Result<Self::Parsed<'_>, ParseError> {
        input
            .trim()
            .lines()
            .map(|line| -> Result<i32, anyhow::Error> {
                let negative = match line.as_bytes().first() {
                    Some(b'L') => true,
                    Some(b'R') => false,
                    _ => return Err(anyhow!("first character need to be 'L' or 'R'")),
                };

                <i32 as FromStr>::from_str(&line[1..])
                    .map_err(anyhow::Error::from)
                    .and_then(|val| {
                        if val < 0 {
                            Err(anyhow!("Rotate value must be non negative"))
                        } else if negative {
                            Ok(-val)
                        } else {
                            Ok(val)
                        }
                    })
            })
            .enumerate()
            .map(|(line_idx, line_val_res)| {
                line_val_res.map_err(|e| anyhow!("(line {}) {}", line_idx + 1, e))
            })
            .collect::<Result<Vec<_>, _>>()
            .map(|parsed_input| Rotations { parsed_input })
            .map_err(|e| ParseError::InvalidFormat(e.to_string()))
    }
}

impl PartSolver<1> for SecretEntrance {
    fn solve(parsed: &mut Self::Parsed<'_>, reporter: &Reporter) -> Result<String, SolveError> {
        Ok(count(parsed, reporter).zero_counts.to_string())
    }
}

impl PartSolver<2> for SecretEntrance {
    fn solve(parsed: &mut Self::Parsed<'_>, reporter: &Reporter) -> Result<String, SolveError> {
        Ok(count(parsed, reporter).pass_zero_counts.to_string())
    }
}

fn count(parsed: &Rotations, reporter: &Reporter) -> Counts {
    reporter.text(format!("Turning the dial {} times", parsed.parsed_input.len()));
    let (_, zero_counts, pass_zero_counts) = parsed.parsed_input.iter().fold(
        (50i64, 0u64, 0u64),
        |(mut dial_value, mut zero_counts, mut pass_zero_counts), &rotate_val| {
            let old_dial_value = dial_value;
            dial_value += i64::from(rotate_val);
            if dial_value <= 0 && old_dial_value != 0 {
                pass_zero_counts += 1;
            }
            pass_zero_counts += (dial_value / 100).unsigned_abs();
            dial_value %= 100;
            if dial_value < 0 {
                dial_value += 100;
            }
            if dial_value == 0 {
                zero_counts += 1;
            }
            (dial_value, zero_counts, pass_zero_counts)
        },
    );

    reporter.table(
        vec!["stops at zero".into(), "points at zero".into()],
        vec![vec![zero_counts.to_string(), pass_zero_counts.to_string()]],
    );
    Counts {
        zero_counts,
        pass_zero_counts,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use puzzle_solver::{Identifier, UpdateKind, update_channel};

    const EXAMPLE: &str = "L68\nL30\nR48\nL5\nR60\nL55\nL1\nL99\nR14\nL82\n";

    fn solution(problem: &dyn Problem, input: &str) -> Option<String> {
        let id = Identifier::new("Advent of Code", 2025, "khang", "Day 1", problem.name()).unwrap();
        let (reporter, mut updates) = update_channel(id);
        problem.solve(input, &reporter).unwrap();
        updates
            .read_all_current()
            .into_iter()
            .find_map(|u| match u.kind {
                UpdateKind::Finished { solution, .. } => solution,
                _ => None,
            })
    }

    #[test]
    fn test_example() {
        let problems = SecretEntrance.problems();
        assert_eq!(solution(&*problems[0], EXAMPLE).as_deref(), Some("3"));
        assert_eq!(solution(&*problems[1], EXAMPLE).as_deref(), Some("6"));
    }

    #[test]
    fn test_large_rotations() {
        let input = format!("R{max}\nL{max}\n", max = i32::MAX);
        let problems = SecretEntrance.problems();
        // 50 + i32::MAX rests on 97 after 21474836 passes, the left turn adds 21474836 more.
        assert_eq!(solution(&*problems[0], &input).as_deref(), Some("0"));
        assert_eq!(solution(&*problems[1], &input).as_deref(), Some("42949672"));
    }

    #[test]
    fn test_rejects_bad_direction() {
        let err = SecretEntrance::parse("X10").unwrap_err();
        assert!(err.to_string().contains("line 1"));
    }
}
