//! Queue-backed destination connector publishing to an in-process topic.

use arrow::record_batch::RecordBatch;
use async_trait::async_trait;
use rillflow_types::{ConnectorDescriptor, PipelineError};
use tokio::sync::broadcast;

use crate::connector::memory_queue;
use crate::connector::DestinationConnector;

pub struct MemorySink {
    topic: String,
    sender: broadcast::Sender<RecordBatch>,
}

impl MemorySink {
    /// Build from a descriptor with a required `topic` and optional
    /// `capacity` parameter.
    pub fn from_descriptor(descriptor: &ConnectorDescriptor) -> Result<Self, PipelineError> {
        let topic = descriptor.require_str("topic")?.to_string();
        let capacity = descriptor.param_usize("capacity")?;
        let sender = memory_queue::registry().publisher(&topic, capacity)?;
        tracing::debug!(topic, "opened memory sink");
        Ok(Self { topic, sender })
    }
}

#[async_trait]
impl DestinationConnector for MemorySink {
    async fn write(&mut self, batch: RecordBatch) -> Result<(), PipelineError> {
        // A broadcast send only fails when the topic has no subscribers;
        // for a pub/sub sink that means the batch simply has no audience.
        if self.sender.send(batch).is_err() {
            tracing::debug!(topic = %self.topic, "no subscribers on memory topic, dropping batch");
        }
        Ok(())
    }
}
