pub mod cli;
pub mod command;
pub mod error;
pub mod forge;
pub mod orchestrator;

pub use error::{ReleaseError, Result};
pub use orchestrator::{Orchestrator, RunOutcome};
