//! Connector traits and the kind-keyed factory.
//!
//! A source connector exposes a readiness predicate and a fetch operation
//! returning one record batch or an absence signal; a destination connector
//! exposes a write operation. Concrete connectors are constructed through
//! [`factory`] from a [`rillflow_types::ConnectorDescriptor`].

pub mod factory;
pub mod memory_queue;
pub mod sink;
pub mod source;

use arrow::record_batch::RecordBatch;
use async_trait::async_trait;
use rillflow_types::PipelineError;

/// Polymorphic handle to an external data source.
#[async_trait]
pub trait SourceConnector: Send {
    /// Whether more data exists or might still arrive.
    ///
    /// Finite sources flip to `false` after one exhaustive pass; unbounded
    /// sources report `true` forever.
    fn has_data(&self) -> bool;

    /// Fetch one record batch, or `Ok(None)` when nothing was available this
    /// poll. For unbounded sources `None` is expected between arrivals and is
    /// distinct from end-of-source.
    async fn fetch(&mut self) -> Result<Option<RecordBatch>, PipelineError>;
}

impl std::fmt::Debug for dyn SourceConnector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("dyn SourceConnector")
    }
}

/// Polymorphic handle to an external data sink.
#[async_trait]
pub trait DestinationConnector: Send {
    /// Write one record batch.
    async fn write(&mut self, batch: RecordBatch) -> Result<(), PipelineError>;
}

impl std::fmt::Debug for dyn DestinationConnector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("dyn DestinationConnector")
    }
}
