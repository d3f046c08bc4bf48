//! Batch entry point behind the `dispatch-day` binary.

pub mod report;
pub mod run;

pub use run::run;
