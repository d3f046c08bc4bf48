pub mod app;
pub mod config;
pub mod constraints;
pub mod dispatch;
pub mod distance;
pub mod domain;
pub mod error;
pub mod evaluation;
pub mod fixtures;
pub mod planning;
pub mod routing;
pub mod setup;
pub mod simulation;
pub mod utils;
