pub mod simulator;

pub use simulator::{simulate, write_back, TravelOutcome, Trip};
