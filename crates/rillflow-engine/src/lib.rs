//! Core execution crate for rillflow pipelines: configuration resolution,
//! connector factory, and the fetch-enrich-write run loop.

pub mod config;
pub mod connector;
pub mod pipeline;

pub use connector::factory;
pub use connector::{DestinationConnector, SourceConnector};
pub use pipeline::{Enrichment, PassThrough, Pipeline, PipelineBuilder, PipelineState};
pub use rillflow_types::{ConnectorDescriptor, PipelineError};
