pub mod processor;
mod runner;

pub use processor::{fetch_timestamp, process_permits};
pub use runner::{CycleOutcome, PermitSync};
