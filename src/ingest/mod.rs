//! Feed ingestion: per-item processing, concurrent rounds and the
//! periodic scheduler that drives them.

pub mod bootstrap;
pub mod pipeline;
pub mod round;
pub mod scheduler;

pub use bootstrap::{BootstrapError, build_pipeline};
pub use pipeline::{ItemOutcome, Pipeline, SourceReport};
pub use round::{RoundReport, run_round};
pub use scheduler::Scheduler;
