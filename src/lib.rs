#![forbid(unsafe_code)]

pub mod batch;
pub mod cli;
pub mod error;
pub mod logging;
pub mod model;
pub mod orchestrator;
pub mod process;
pub mod recipe;
pub mod stage;

pub use error::{AlignError, AlignResult};
pub use model::{BatchOutcome, ModelBundle, RunReport};
pub use orchestrator::{AlignmentRun, RunConfig};
pub use recipe::Recipe;
