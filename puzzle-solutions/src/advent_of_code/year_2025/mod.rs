puzzle_solver::declare_collection!("Advent of Code", 2025);

pub mod khang;
