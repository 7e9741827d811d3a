//! Shared types for rillflow pipelines: connector descriptors and the
//! pipeline error model.

pub mod descriptor;
pub mod error;

pub use descriptor::ConnectorDescriptor;
pub use error::PipelineError;
