puzzle_solver::declare_collection!("Advent of Code", 2023);

pub mod khang;
