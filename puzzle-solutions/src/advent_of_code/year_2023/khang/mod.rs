pub mod day_01;
pub mod day_14;
