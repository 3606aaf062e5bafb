//! Built-in puzzle solutions with automatic registration
//!
//! Solutions are organized by collection module: `advent_of_code::year_2023` is the
//! collection for Advent of Code 2023, and each module below it is an author. The
//! same layout under the solvers directory (`advent_of_code/year_2023/<author>/`) is
//! where hot-reloaded plugins for that collection are picked up.

#[cfg(feature = "builtin-solutions")]
pub mod advent_of_code;

use chrono::{DateTime, Utc};

/// Release time of an Advent of Code day
pub(crate) fn released(year: i32, day: u32) -> DateTime<Utc> {
    puzzle_solver::advent_release(year, day).unwrap_or_default()
}
