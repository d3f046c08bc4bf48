pub mod day;

pub use day::{apply_corrections, run_day};
