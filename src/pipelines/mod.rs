//! Pipelines.
//!
//! The module provides a light [pipeline::Pipeline] trait,
//! implemented by [CorpusPipeline], which chains the corpus stages.
mod corpus;
#[allow(clippy::module_inception)]
pub mod pipeline;

pub use corpus::{CorpusPipeline, PipelineSummary};
pub use pipeline::Pipeline;
