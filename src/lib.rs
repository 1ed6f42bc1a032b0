pub mod error;
pub mod models;
pub mod parser;
pub mod platform;
pub mod services;
pub mod utils;

pub use error::{CheckError, Result};
pub use models::{DiskHealthRecord, HealthCode, HealthReport};
pub use services::acquire::{run_check, spawn_check, CheckOutcome};
