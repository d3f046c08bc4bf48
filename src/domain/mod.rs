pub mod constraints;
pub mod solution;
pub mod types;
