pub mod day_01;
