pub mod runner;

pub use runner::{PipelineRunner, RunReport};
